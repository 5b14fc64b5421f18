use serde::{Deserialize, Serialize};

use crate::model::PipelineElement;

/// A single overridden algorithm property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProperty {
    pub name: String,
    pub value: String,
}

impl ActionProperty {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An algorithm plus the property values that differ from its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// name of the referenced algorithm
    pub algorithm: String,
    #[serde(default)]
    pub properties: Vec<ActionProperty>,
}

impl ActionModel {
    /// The overridden value of `name`, if any. Property names ignore case.
    pub fn override_for(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name)).map(|p| p.value.as_str())
    }
}

impl PipelineElement for ActionModel {
    fn name(&self) -> &str {
        &self.name
    }
}
