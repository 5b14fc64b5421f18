use std::sync::RwLock;

use crate::{
    PipeforgeError, Result,
    backend::mem::{MemData, MemDocument, read},
    model::PipelineModel,
    utils::name::{same_name, trim_and_upper},
};

impl MemDocument for PipelineModel {
    fn rows(data: &MemData) -> &RwLock<Vec<Self>> {
        &data.pipelines
    }

    fn normalize(&mut self) {
        self.name = trim_and_upper(&self.name);
        self.description = self.description.trim().to_string();
        self.tasks = self.tasks.iter().map(|t| trim_and_upper(t)).collect();
    }

    fn check(
        &self,
        data: &MemData,
    ) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(PipeforgeError::Validation("Pipelines must contain at least one task.".to_string()));
        }

        let tasks = read(&data.tasks);
        let mut missing = Vec::new();
        for (idx, task_name) in self.tasks.iter().enumerate() {
            let Some(task) = tasks.iter().find(|t| same_name(&t.name, task_name)) else {
                missing.push(task_name.clone());
                continue;
            };
            if task.is_parallel() && idx + 1 < self.tasks.len() {
                return Err(PipeforgeError::Validation(format!("{}: No tasks may follow the multi-detection task of {}.", self.name, task.name)));
            }
        }
        if !missing.is_empty() {
            return Err(PipeforgeError::Validation(format!("{}: The following tasks are missing: {}.", self.name, missing.join(", "))));
        }
        Ok(())
    }

    fn referenced_by(
        _name: &str,
        _data: &MemData,
    ) -> Option<String> {
        None
    }
}
