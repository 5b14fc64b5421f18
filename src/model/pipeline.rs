use serde::{Deserialize, Serialize};

use crate::model::PipelineElement;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// names of the tasks, in execution order
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl PipelineElement for PipelineModel {
    fn name(&self) -> &str {
        &self.name
    }
}
