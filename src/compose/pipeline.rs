use std::sync::Arc;

use futures::future::join_all;
use tracing::{trace, warn};

use crate::{
    PipeforgeError, Result,
    backend::Collection,
    compose::task::{ResolvedTask, TaskComposer},
    model::{PipelineModel, TaskModel},
    utils::name::{same_name, trim_and_upper},
    validate::{require, verify_nothing_follows_parallel},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDraft {
    pub name: String,
    pub description: String,
    pub tasks: Vec<String>,
}

impl PipelineDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tasks: Vec::new(),
        }
    }

    pub fn add_task(
        &mut self,
        name: impl Into<String>,
    ) -> &mut Self {
        self.tasks.push(name.into());
        self
    }

    /// Inserts a task before position `index`, or appends it when `index` is
    /// past the end.
    pub fn insert_task(
        &mut self,
        index: usize,
        name: impl Into<String>,
    ) -> &mut Self {
        let index = index.min(self.tasks.len());
        self.tasks.insert(index, name.into());
        self
    }

    /// Removes the task at `index`. Out of range is a no-op.
    pub fn remove_task(
        &mut self,
        index: usize,
    ) -> Option<String> {
        (index < self.tasks.len()).then(|| self.tasks.remove(index))
    }

    fn to_model(&self) -> PipelineModel {
        PipelineModel {
            name: trim_and_upper(&self.name),
            description: self.description.trim().to_string(),
            tasks: self.tasks.iter().map(|t| trim_and_upper(t)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEntry {
    Resolved(ResolvedTask),
    Unavailable { name: String, reason: PipeforgeError },
}

impl PipelineEntry {
    pub fn name(&self) -> &str {
        match self {
            PipelineEntry::Resolved(task) => &task.name,
            PipelineEntry::Unavailable { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPipeline {
    pub name: String,
    pub description: String,
    pub tasks: Vec<PipelineEntry>,
}

/// Checks task ordering of pipelines and stores them.
pub struct PipelineComposer {
    pipelines: Arc<dyn Collection<Item = PipelineModel>>,
    tasks: Arc<TaskComposer>,
}

impl PipelineComposer {
    pub fn new(
        pipelines: Arc<dyn Collection<Item = PipelineModel>>,
        tasks: Arc<TaskComposer>,
    ) -> Self {
        Self {
            pipelines,
            tasks,
        }
    }

    /// Validates `draft` against the tasks known locally and stores it.
    ///
    /// A parallel task is accepted only as the final element.
    pub async fn save(
        &self,
        draft: &PipelineDraft,
        known_tasks: &[TaskModel],
    ) -> Result<PipelineModel> {
        require("Pipeline", "name", &draft.name)?;
        require("Pipeline", "description", &draft.description)?;
        if draft.tasks.is_empty() {
            return Err(PipeforgeError::Validation("Pipelines must contain at least one task.".to_string()));
        }
        let model = draft.to_model();

        let mut tasks = Vec::with_capacity(model.tasks.len());
        let mut missing = Vec::new();
        for name in &model.tasks {
            match known_tasks.iter().find(|t| same_name(&t.name, name)) {
                Some(task) => tasks.push(task),
                None => missing.push(name.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(PipeforgeError::Validation(format!("{}: The following tasks are missing: {}.", model.name, missing.join(", "))));
        }
        verify_nothing_follows_parallel(&model, &tasks)?;

        trace!("PipelineComposer::save({})", model.name);
        self.pipelines.create(&model).await?;
        Ok(model)
    }

    pub async fn delete(
        &self,
        name: &str,
    ) -> Result<()> {
        trace!("PipelineComposer::delete({})", name);
        self.pipelines.delete(name).await
    }

    /// Fetches a pipeline and resolves each of its tasks, in order.
    pub async fn resolve(
        &self,
        name: &str,
    ) -> Result<ResolvedPipeline> {
        trace!("PipelineComposer::resolve({})", name);
        let pipeline = self.pipelines.find(name).await?;

        let tasks = join_all(pipeline.tasks.iter().map(|task| async move {
            match self.tasks.resolve(task).await {
                Ok(resolved) => PipelineEntry::Resolved(resolved),
                Err(reason) => {
                    warn!("pipeline task {} is unavailable: {}", task, reason);
                    PipelineEntry::Unavailable {
                        name: task.clone(),
                        reason,
                    }
                }
            }
        }))
        .await;

        Ok(ResolvedPipeline {
            name: pipeline.name,
            description: pipeline.description,
            tasks,
        })
    }
}
