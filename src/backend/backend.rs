use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    BackendType, Config, PipeforgeError, Result, ShareLock,
    backend::{BackendInit, Collection, HttpBackend, MarkupSource, MemBackend, ResourceIden},
    model::{ActionModel, AlgorithmModel, PipelineModel, TaskModel},
};

use super::Resource;

#[derive(Clone)]
struct DynCollectionRef<T>(Arc<dyn Collection<Item = T>>);

/// Registry of the collections the editor works with.
pub struct Backend {
    collections: ShareLock<HashMap<Resource, Arc<dyn Any + Send + Sync + 'static>>>,
    markup: ShareLock<Option<Arc<dyn MarkupSource>>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E>(_: E) -> PipeforgeError {
    PipeforgeError::Config("backend registry lock poisoned".to_string())
}

impl Backend {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            markup: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a backend and lets `init` register its collections.
    pub fn with(init: &dyn BackendInit) -> Self {
        let backend = Self::new();
        init.init(&backend);
        backend
    }

    /// Creates the backend selected by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let init: Box<dyn BackendInit> = match config.backend.backend_type {
            BackendType::Mem => Box::new(MemBackend::new()),
            BackendType::Http => {
                let http = config.backend.http.as_ref().ok_or(PipeforgeError::Config("http configuration is required when backend type is http".to_string()))?;
                Box::new(HttpBackend::new(http)?)
            }
        };
        Ok(Self::with(init.as_ref()))
    }

    pub fn collection<DATA>(&self) -> Result<Arc<dyn Collection<Item = DATA>>>
    where
        DATA: ResourceIden + Send + Sync + 'static,
    {
        let collections = self.collections.read().map_err(poisoned)?;

        let collection = collections.get(&DATA::iden()).ok_or(PipeforgeError::Config(format!("no collection registered for {}", DATA::iden().as_ref())))?;

        collection
            .downcast_ref::<DynCollectionRef<DATA>>()
            .map(|v| v.0.clone())
            .ok_or(PipeforgeError::Config(format!("collection {} has an unexpected item type", DATA::iden().as_ref())))
    }

    pub fn register<DATA>(
        &self,
        collection: Arc<dyn Collection<Item = DATA>>,
    ) where
        DATA: ResourceIden + Send + Sync + 'static,
    {
        trace!("backend::register({})", DATA::iden().as_ref());
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections.insert(DATA::iden(), Arc::new(DynCollectionRef::<DATA>(collection)));
    }

    pub fn register_markup(
        &self,
        source: Arc<dyn MarkupSource>,
    ) {
        let mut markup = self.markup.write().unwrap_or_else(|e| e.into_inner());
        *markup = Some(source);
    }

    pub fn algorithms(&self) -> Result<Arc<dyn Collection<Item = AlgorithmModel>>> {
        self.collection()
    }

    pub fn actions(&self) -> Result<Arc<dyn Collection<Item = ActionModel>>> {
        self.collection()
    }

    pub fn tasks(&self) -> Result<Arc<dyn Collection<Item = TaskModel>>> {
        self.collection()
    }

    pub fn pipelines(&self) -> Result<Arc<dyn Collection<Item = PipelineModel>>> {
        self.collection()
    }

    pub fn markup(&self) -> Result<Arc<dyn MarkupSource>> {
        let markup = self.markup.read().map_err(poisoned)?;
        markup.clone().ok_or(PipeforgeError::Config("no markup source registered".to_string()))
    }
}
