use serde::{Deserialize, Serialize};

use crate::model::{PipelineElement, ValueType};

/// What an algorithm produces when it runs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    #[default]
    Detection,
    Markup,
}

/// A configurable property declared by an algorithm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiresCollection {
    #[serde(default)]
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidesCollection {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

/// Server-defined detection or markup capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub requires_collection: RequiresCollection,
    #[serde(default)]
    pub provides_collection: ProvidesCollection,
    #[serde(default)]
    pub supports_batch_processing: bool,
    #[serde(default)]
    pub supports_stream_processing: bool,
}

impl AlgorithmModel {
    /// Declared properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.provides_collection.properties
    }

    /// Looks a property up by name, ignoring case.
    pub fn property(
        &self,
        name: &str,
    ) -> Option<&PropertyDescriptor> {
        self.properties().iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl PipelineElement for AlgorithmModel {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_algorithm_from_wire() {
        let algo: AlgorithmModel = serde_json::from_value(json!({
            "name": "FACE",
            "description": "face detection",
            "actionType": "DETECTION",
            "providesCollection": {
                "states": ["DETECTION_FACE"],
                "properties": [
                    { "name": "MIN_SIZE", "description": "min face size", "type": "INT", "defaultValue": "16" },
                    { "name": "VERBOSE", "description": "verbosity", "type": "BOOLEAN", "defaultValue": null }
                ]
            },
            "requiresCollection": { "states": [] },
            "supportsBatchProcessing": true
        }))
        .unwrap();

        assert_eq!(algo.action_type, ActionType::Detection);
        assert_eq!(algo.properties().len(), 2);
        assert_eq!(algo.properties()[0].default_value.as_deref(), Some("16"));
        assert_eq!(algo.properties()[1].default_value, None);
        assert!(algo.supports_batch_processing);
        assert!(!algo.supports_stream_processing);
    }

    #[test]
    fn test_property_lookup_ignores_case() {
        let algo = AlgorithmModel {
            name: "FACE".into(),
            provides_collection: ProvidesCollection {
                states: vec![],
                properties: vec![PropertyDescriptor {
                    name: "MIN_SIZE".into(),
                    value_type: ValueType::Int,
                    ..Default::default()
                }],
            },
            ..Default::default()
        };
        assert!(algo.property("min_size").is_some());
        assert!(algo.property("MAX_SIZE").is_none());
    }
}
