//! Backend layer: the workflow manager collections the editor talks to.
//!
//! Provides an abstraction over different backends:
//! - `MemBackend`: in-memory collections enforcing the server rules, for tests
//! - `HttpBackend`: the workflow manager REST endpoints

mod backend;
mod http;
mod mem;

use async_trait::async_trait;
use strum::{AsRefStr, EnumIter};

use crate::{
    Result,
    model::{ActionModel, AlgorithmModel, MarkupPage, MarkupQuery, PipelineModel, TaskModel},
};

pub use backend::Backend;
pub use http::HttpBackend;
pub use mem::MemBackend;

/// REST collections of the workflow manager. The string form is the URL path.
#[derive(Debug, Clone, Copy, AsRefStr, PartialEq, Hash, Eq, EnumIter)]
pub enum Resource {
    /// Algorithm catalog, read-only.
    #[strum(serialize = "algorithms")]
    Algorithms,
    /// Algorithms with property overrides.
    #[strum(serialize = "actions")]
    Actions,
    /// Groups of actions.
    #[strum(serialize = "pipeline-tasks")]
    Tasks,
    /// Ordered task lists.
    #[strum(serialize = "pipelines")]
    Pipelines,
}

impl Resource {
    /// Human readable element kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Algorithms => "Algorithm",
            Resource::Actions => "Action",
            Resource::Tasks => "Task",
            Resource::Pipelines => "Pipeline",
        }
    }
}

/// Trait for types that can identify their backend collection.
pub trait ResourceIden {
    /// Returns the collection identifier for this type.
    fn iden() -> Resource;
}

impl ResourceIden for AlgorithmModel {
    fn iden() -> Resource {
        Resource::Algorithms
    }
}

impl ResourceIden for ActionModel {
    fn iden() -> Resource {
        Resource::Actions
    }
}

impl ResourceIden for TaskModel {
    fn iden() -> Resource {
        Resource::Tasks
    }
}

impl ResourceIden for PipelineModel {
    fn iden() -> Resource {
        Resource::Pipelines
    }
}

/// Operations on one backend collection.
#[async_trait]
pub trait Collection: Send + Sync {
    /// The type of items stored in this collection.
    type Item: Send + Sync;

    /// Lists every element.
    async fn list(&self) -> Result<Vec<Self::Item>>;

    /// Finds an element by name, `NotFound` if absent.
    async fn find(
        &self,
        name: &str,
    ) -> Result<Self::Item>;

    /// Creates a new element.
    async fn create(
        &self,
        item: &Self::Item,
    ) -> Result<()>;

    /// Deletes an element by name, `Conflict` if something still references it.
    async fn delete(
        &self,
        name: &str,
    ) -> Result<()>;
}

/// Paged markup results.
#[async_trait]
pub trait MarkupSource: Send + Sync {
    async fn markup_results(
        &self,
        query: &MarkupQuery,
    ) -> Result<MarkupPage>;
}

/// Trait for backend initialization.
pub trait BackendInit {
    /// Registers the collections and the markup source with the backend.
    fn init(
        &self,
        backend: &Backend,
    );
}
