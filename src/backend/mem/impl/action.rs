use std::sync::RwLock;

use crate::{
    PipeforgeError, Result,
    backend::mem::{MemData, MemDocument, read},
    model::ActionModel,
    utils::name::{same_name, trim_and_upper},
};

impl MemDocument for ActionModel {
    fn rows(data: &MemData) -> &RwLock<Vec<Self>> {
        &data.actions
    }

    fn normalize(&mut self) {
        self.name = trim_and_upper(&self.name);
        self.description = self.description.trim().to_string();
        self.algorithm = trim_and_upper(&self.algorithm);
        for property in &mut self.properties {
            property.name = trim_and_upper(&property.name);
        }
    }

    fn check(
        &self,
        _data: &MemData,
    ) -> Result<()> {
        // the algorithm itself is only required when a pipeline using this action runs
        if self.algorithm.is_empty() {
            return Err(PipeforgeError::Validation(format!("{} has errors in the following fields:\nalgorithm=\"\": may not be empty", self.name)));
        }
        Ok(())
    }

    fn referenced_by(
        name: &str,
        data: &MemData,
    ) -> Option<String> {
        read(&data.tasks).iter().find(|t| t.actions.iter().any(|a| same_name(a, name))).map(|t| t.name.clone())
    }
}
