use serde::{Deserialize, Serialize};

use crate::model::PipelineElement;

/// How the actions of a task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// exactly one action
    Normal,
    /// two or more actions running concurrently, only allowed as a pipeline's final task
    Parallel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// names of the actions, in order
    #[serde(default)]
    pub actions: Vec<String>,
}

impl TaskModel {
    pub fn kind(&self) -> TaskKind {
        TaskKind::of(self.actions.len())
    }

    pub fn is_parallel(&self) -> bool {
        self.kind() == TaskKind::Parallel
    }
}

impl TaskKind {
    pub fn of(action_count: usize) -> Self {
        if action_count > 1 {
            TaskKind::Parallel
        } else {
            TaskKind::Normal
        }
    }
}

impl PipelineElement for TaskModel {
    fn name(&self) -> &str {
        &self.name
    }
}
