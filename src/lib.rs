//! # Pipeforge
//!
//! Pipeforge is the editing core for media-processing pipelines of a workflow
//! manager. It composes algorithms into actions, actions into tasks and tasks
//! into pipelines, and checks every draft before it reaches the server.
//!
//! ## Core Features
//!
//! - **Catalog Resolution**: Actions are merged with their algorithm's property descriptors; unknown algorithms degrade instead of failing
//! - **Concurrent Composition**: Task members are resolved concurrently with `tokio` and keep their stored order
//! - **Pluggable Backend**: In-memory collections (testing) and the workflow manager REST API (production)
//! - **Runnable Checks**: Pipelines are validated against the local catalog snapshot
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pipeforge::{Config, EditorBuilder, EntityKind, Modal};
//!
//! let mut editor = EditorBuilder::new().config(Config::create("pipeforge.toml")?).build()?;
//! editor.reload().await?;
//!
//! editor.open_add(EntityKind::Action);
//! if let Some(Modal::Action(draft)) = editor.modal_mut() {
//!     draft.name = "FACE SMALL".into();
//!     draft.algorithm = "FACE".into();
//!     draft.set("MIN_SIZE", "8");
//! }
//! editor.confirm().await?;
//! ```

mod backend;
mod builder;
mod catalog;
mod common;
mod compose;
mod config;
mod editor;
mod error;
mod markup;
mod model;
mod utils;
mod validate;

use std::sync::{Arc, RwLock};

pub use backend::{Backend, BackendInit, Collection, HttpBackend, MarkupSource, MemBackend, Resource, ResourceIden};
pub use builder::EditorBuilder;
pub use catalog::AlgorithmCatalog;
pub use common::{Sequenced, Ticket};
pub use compose::*;
pub use config::{BackendConfig, BackendType, Config, HttpConfig};
pub use editor::{Catalogs, Detail, Editor, EditorState, EntityKind, Modal, Mode, Notice, NoticeChannel, NoticeLevel, Selection};
pub use error::PipeforgeError;
pub use markup::MarkupBrowser;
pub use model::*;
pub use validate::{PartLookup, check_action_properties, verify_runnable};

/// Result type alias for Pipeforge operations.
pub type Result<T> = std::result::Result<T, PipeforgeError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
