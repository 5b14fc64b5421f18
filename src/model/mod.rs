mod action;
mod algorithm;
mod markup;
mod pipeline;
mod property;
mod task;

pub use action::{ActionModel, ActionProperty};
pub use algorithm::{ActionType, AlgorithmModel, PropertyDescriptor, ProvidesCollection, RequiresCollection};
pub use markup::{MarkupPage, MarkupQuery, MarkupResult};
pub use pipeline::PipelineModel;
pub use property::{PropertyRenderer, PropertyValue, ValueType};
pub use task::{TaskKind, TaskModel};

/// Anything stored in a backend collection and identified by its name.
pub trait PipelineElement {
    fn name(&self) -> &str;
}
