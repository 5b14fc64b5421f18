use strum::{AsRefStr, Display};

use crate::compose::{ActionDraft, PipelineDraft, TaskDraft};

/// The kinds of element the editor creates and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum EntityKind {
    Pipeline,
    Task,
    Action,
}

/// What the editing pane shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Pipeline(String),
    Task(String),
    Action(String),
}

impl Selection {
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Selection::None => None,
            Selection::Pipeline(_) => Some(EntityKind::Pipeline),
            Selection::Task(_) => Some(EntityKind::Task),
            Selection::Action(_) => Some(EntityKind::Action),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Pipeline(name) | Selection::Task(name) | Selection::Action(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Viewing,
    Editing(Selection),
}

/// An open add dialog and its draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Pipeline(PipelineDraft),
    Task(TaskDraft),
    Action(ActionDraft),
}

impl Modal {
    /// A modal with an empty draft.
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Pipeline => Modal::Pipeline(PipelineDraft::default()),
            EntityKind::Task => Modal::Task(TaskDraft::default()),
            EntityKind::Action => Modal::Action(ActionDraft::default()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Modal::Pipeline(_) => EntityKind::Pipeline,
            Modal::Task(_) => EntityKind::Task,
            Modal::Action(_) => EntityKind::Action,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Modal::Pipeline(draft) => &draft.name,
            Modal::Task(draft) => &draft.name,
            Modal::Action(draft) => &draft.name,
        }
    }
}

/// Editor state. Transitions consume the current value and return the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub mode: Mode,
    pub modal: Option<Modal>,
}

impl EditorState {
    pub fn select(
        self,
        selection: Selection,
    ) -> Self {
        Self {
            mode: Mode::Editing(selection),
            modal: self.modal,
        }
    }

    /// Opens the add dialog for `kind`, replacing any open one.
    pub fn open_add(
        self,
        kind: EntityKind,
    ) -> Self {
        Self {
            mode: self.mode,
            modal: Some(Modal::empty(kind)),
        }
    }

    pub fn cancel(self) -> Self {
        Self::default()
    }

    /// After a successful save or delete.
    pub fn saved(self) -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.mode {
            Mode::Viewing => None,
            Mode::Editing(selection) => Some(selection),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }
}
