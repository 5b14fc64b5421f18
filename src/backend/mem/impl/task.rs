use std::sync::RwLock;

use crate::{
    PipeforgeError, Result,
    backend::mem::{MemData, MemDocument, read},
    model::TaskModel,
    utils::name::{duplicates, same_name, trim_and_upper},
};

impl MemDocument for TaskModel {
    fn rows(data: &MemData) -> &RwLock<Vec<Self>> {
        &data.tasks
    }

    fn normalize(&mut self) {
        self.name = trim_and_upper(&self.name);
        self.description = self.description.trim().to_string();
        self.actions = self.actions.iter().map(|a| trim_and_upper(a)).collect();
    }

    fn check(
        &self,
        _data: &MemData,
    ) -> Result<()> {
        if self.actions.is_empty() {
            return Err(PipeforgeError::Validation("Tasks must contain at least one action.".to_string()));
        }
        let dups = duplicates(&self.actions);
        if !dups.is_empty() {
            return Err(PipeforgeError::Validation(format!("{}: The following action names were duplicated: {}.", self.name, dups.join(", "))));
        }
        Ok(())
    }

    fn referenced_by(
        name: &str,
        data: &MemData,
    ) -> Option<String> {
        read(&data.pipelines).iter().find(|p| p.tasks.iter().any(|t| same_name(t, name))).map(|p| p.name.clone())
    }
}
