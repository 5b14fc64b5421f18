use std::sync::RwLock;

use crate::{
    Result,
    backend::mem::{MemData, MemDocument, read},
    model::AlgorithmModel,
    utils::name::{same_name, trim_and_upper},
};

impl MemDocument for AlgorithmModel {
    fn rows(data: &MemData) -> &RwLock<Vec<Self>> {
        &data.algorithms
    }

    fn normalize(&mut self) {
        self.name = trim_and_upper(&self.name);
        self.description = self.description.trim().to_string();
        for property in &mut self.provides_collection.properties {
            property.name = trim_and_upper(&property.name);
        }
    }

    fn check(
        &self,
        _data: &MemData,
    ) -> Result<()> {
        Ok(())
    }

    fn referenced_by(
        name: &str,
        data: &MemData,
    ) -> Option<String> {
        read(&data.actions).iter().find(|a| same_name(&a.algorithm, name)).map(|a| a.name.clone())
    }
}
