mod collect;
mod r#impl;
mod markup;

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    Result,
    backend::{Backend, BackendInit, Collection, MarkupSource, ResourceIden},
    model::{ActionModel, AlgorithmModel, MarkupResult, PipelineElement, PipelineModel, TaskModel},
};
pub(crate) use collect::Collect;

/// Rows of every in-memory collection, shared by all of them so that
/// reference checks can look across collections.
#[derive(Debug, Default)]
pub(crate) struct MemData {
    /// held by every create and delete from its checks through its write
    changes: Mutex<()>,
    algorithms: RwLock<Vec<AlgorithmModel>>,
    actions: RwLock<Vec<ActionModel>>,
    tasks: RwLock<Vec<TaskModel>>,
    pipelines: RwLock<Vec<PipelineModel>>,
    markup: RwLock<Vec<MarkupResult>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn change(data: &MemData) -> MutexGuard<'_, ()> {
    data.changes.lock().unwrap_or_else(|e| e.into_inner())
}

/// An element kept in a [`Collect`].
pub(crate) trait MemDocument: PipelineElement + ResourceIden + Clone + PartialEq + Send + Sync + 'static {
    /// The rows holding this kind of element.
    fn rows(data: &MemData) -> &RwLock<Vec<Self>>;

    /// Normalizes names before the element is stored.
    fn normalize(&mut self);

    /// Server-side checks run before the element is stored.
    fn check(
        &self,
        data: &MemData,
    ) -> Result<()>;

    /// Name of an element that still references `name`, if any.
    fn referenced_by(
        name: &str,
        data: &MemData,
    ) -> Option<String>;
}

/// In-memory backend. Applies the same rules the workflow manager applies
/// on create and delete.
#[derive(Debug, Clone)]
pub struct MemBackend {
    data: Arc<MemData>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendInit for MemBackend {
    fn init(
        &self,
        backend: &Backend,
    ) {
        backend.register(self.algorithms());
        backend.register(self.actions());
        backend.register(self.tasks());
        backend.register(self.pipelines());
        backend.register_markup(self.markup());
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self {
            data: Arc::new(MemData::default()),
        }
    }

    /// Seeds the read-only algorithm catalog.
    pub fn with_algorithms(
        self,
        algorithms: impl IntoIterator<Item = AlgorithmModel>,
    ) -> Self {
        {
            let mut rows = write(&self.data.algorithms);
            for mut algorithm in algorithms {
                algorithm.normalize();
                rows.retain(|a| a.name != algorithm.name);
                rows.push(algorithm);
            }
        }
        self
    }

    /// Records a markup result; later results are listed first.
    pub fn add_markup(
        &self,
        result: MarkupResult,
    ) {
        write(&self.data.markup).push(result);
    }

    pub fn algorithms(&self) -> Arc<dyn Collection<Item = AlgorithmModel>> {
        Arc::new(Collect::<AlgorithmModel>::new(self.data.clone()))
    }

    pub fn actions(&self) -> Arc<dyn Collection<Item = ActionModel>> {
        Arc::new(Collect::<ActionModel>::new(self.data.clone()))
    }

    pub fn tasks(&self) -> Arc<dyn Collection<Item = TaskModel>> {
        Arc::new(Collect::<TaskModel>::new(self.data.clone()))
    }

    pub fn pipelines(&self) -> Arc<dyn Collection<Item = PipelineModel>> {
        Arc::new(Collect::<PipelineModel>::new(self.data.clone()))
    }

    pub fn markup(&self) -> Arc<dyn MarkupSource> {
        Arc::new(markup::MemMarkup::new(self.data.clone()))
    }
}
