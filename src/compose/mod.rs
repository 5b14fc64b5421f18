//! Composers turn reference-only elements into editable views and check
//! drafts before they are sent to the backend.

mod action;
mod pipeline;
mod task;

pub use action::{ActionDraft, ActionResolver, AlgorithmSlot, EffectiveProperty, ResolvedAction};
pub use pipeline::{PipelineComposer, PipelineDraft, PipelineEntry, ResolvedPipeline};
pub use task::{ResolvedTask, TaskComposer, TaskDraft, TaskMember};
