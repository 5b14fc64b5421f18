use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::{
    Result,
    backend::Collection,
    catalog::AlgorithmCatalog,
    model::{ActionModel, ActionProperty, AlgorithmModel, PropertyDescriptor, PropertyRenderer, ValueType},
    utils::name::trim_and_upper,
    validate::{check_action_properties, require},
};

/// The algorithm an action points at, or a placeholder when it is unknown.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmSlot {
    Found(AlgorithmModel),
    Missing { name: String },
}

impl AlgorithmSlot {
    pub fn name(&self) -> &str {
        match self {
            AlgorithmSlot::Found(algorithm) => &algorithm.name,
            AlgorithmSlot::Missing { name } => name,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AlgorithmSlot::Missing { .. })
    }

    pub fn algorithm(&self) -> Option<&AlgorithmModel> {
        match self {
            AlgorithmSlot::Found(algorithm) => Some(algorithm),
            AlgorithmSlot::Missing { .. } => None,
        }
    }
}

/// A property descriptor merged with the action's override.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveProperty {
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
    pub default_value: String,
    pub current_value: String,
    /// `true` when the current value differs from the default
    pub changed: bool,
}

impl EffectiveProperty {
    fn merge(
        descriptor: &PropertyDescriptor,
        value: Option<&str>,
    ) -> Self {
        let default_value = descriptor.default_value.clone().unwrap_or_default();
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            value_type: descriptor.value_type,
            current_value: value.map(str::to_string).unwrap_or_else(|| default_value.clone()),
            changed: value.is_some_and(|v| v != default_value),
            default_value,
        }
    }

    /// Overrides the current value. An empty value falls back to the default.
    pub fn set(
        &mut self,
        value: impl Into<String>,
    ) {
        let value = value.into();
        if value.is_empty() {
            self.reset();
        } else {
            self.changed = value != self.default_value;
            self.current_value = value;
        }
    }

    pub fn reset(&mut self) {
        self.current_value = self.default_value.clone();
        self.changed = false;
    }

    pub fn render<R: PropertyRenderer>(
        &self,
        renderer: &mut R,
    ) -> R::Output {
        self.value_type.render(&self.name, &self.current_value, renderer)
    }
}

/// An action together with its algorithm and effective properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    pub name: String,
    pub description: String,
    pub algorithm: AlgorithmSlot,
    /// one entry per descriptor, in the algorithm's declared order
    pub properties: Vec<EffectiveProperty>,
    /// overrides naming no declared property
    pub unmatched: Vec<ActionProperty>,
}

impl ResolvedAction {
    pub fn property(
        &self,
        name: &str,
    ) -> Option<&EffectiveProperty> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn property_mut(
        &mut self,
        name: &str,
    ) -> Option<&mut EffectiveProperty> {
        self.properties.iter_mut().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Editable form of an action before it is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionDraft {
    pub name: String,
    pub description: String,
    pub algorithm: String,
    pub overrides: Vec<ActionProperty>,
}

impl ActionDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            algorithm: algorithm.into(),
            overrides: Vec::new(),
        }
    }

    /// Sets an override, replacing an existing one with the same name.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let property = ActionProperty::new(name, value);
        match self.overrides.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&property.name)) {
            Some(existing) => existing.value = property.value,
            None => self.overrides.push(property),
        }
        self
    }

    fn to_model(&self) -> ActionModel {
        ActionModel {
            name: trim_and_upper(&self.name),
            description: self.description.trim().to_string(),
            algorithm: trim_and_upper(&self.algorithm),
            properties: self.overrides.iter().filter(|p| !p.value.is_empty()).cloned().collect(),
        }
    }
}

/// Binds actions to their algorithms.
pub struct ActionResolver {
    actions: Arc<dyn Collection<Item = ActionModel>>,
    catalog: Arc<AlgorithmCatalog>,
}

impl ActionResolver {
    pub fn new(
        actions: Arc<dyn Collection<Item = ActionModel>>,
        catalog: Arc<AlgorithmCatalog>,
    ) -> Self {
        Self {
            actions,
            catalog,
        }
    }

    /// Fetches the action and merges it with its algorithm.
    ///
    /// An unknown algorithm never fails the resolve: the result carries
    /// [`AlgorithmSlot::Missing`] and no properties.
    pub async fn resolve(
        &self,
        name: &str,
    ) -> Result<ResolvedAction> {
        trace!("ActionResolver::resolve({})", name);
        let action = self.actions.find(name).await?;

        let algorithm = match self.catalog.get(&action.algorithm).await {
            Ok(algorithm) => algorithm,
            Err(err) => {
                warn!("action {} references algorithm {} which could not be resolved: {}", action.name, action.algorithm, err);
                return Ok(ResolvedAction {
                    name: action.name,
                    description: action.description,
                    algorithm: AlgorithmSlot::Missing {
                        name: action.algorithm,
                    },
                    properties: Vec::new(),
                    unmatched: action.properties,
                });
            }
        };

        let properties = algorithm.properties().iter().map(|d| EffectiveProperty::merge(d, action.override_for(&d.name))).collect();
        let unmatched = action.properties.iter().filter(|p| algorithm.property(&p.name).is_none()).cloned().collect();
        debug!("resolved action {} against {}", action.name, algorithm.name);

        Ok(ResolvedAction {
            name: action.name,
            description: action.description,
            algorithm: AlgorithmSlot::Found(algorithm),
            properties,
            unmatched,
        })
    }

    /// Validates and stores a new action. Only properties that differ from
    /// their default are sent.
    pub async fn save(
        &self,
        draft: &ActionDraft,
    ) -> Result<ActionModel> {
        require("Action", "name", &draft.name)?;
        require("Action", "algorithm", &draft.algorithm)?;
        let mut model = draft.to_model();

        // unknown algorithms are left to the backend to judge
        if let Ok(algorithm) = self.catalog.get(&model.algorithm).await {
            check_action_properties(&model, &algorithm)?;
            model.properties.retain(|p| algorithm.property(&p.name).and_then(|d| d.default_value.as_deref()) != Some(p.value.as_str()));
        }

        trace!("ActionResolver::save({})", model.name);
        self.actions.create(&model).await?;
        Ok(model)
    }

    pub async fn delete(
        &self,
        name: &str,
    ) -> Result<()> {
        trace!("ActionResolver::delete({})", name);
        self.actions.delete(name).await
    }

    /// Editable copy of a resolved action carrying only its changed properties.
    pub fn draft_from(resolved: &ResolvedAction) -> ActionDraft {
        ActionDraft {
            name: resolved.name.clone(),
            description: resolved.description.clone(),
            algorithm: resolved.algorithm.name().to_string(),
            overrides: resolved.properties.iter().filter(|p| p.changed).map(|p| ActionProperty::new(p.name.clone(), p.current_value.clone())).collect(),
        }
    }
}
