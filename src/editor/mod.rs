//! The pipeline editor.
//!
//! [`Editor`] owns an [`EditorState`], a local snapshot of the four catalogs
//! and the composers. Every save or delete is followed by a full reload;
//! failures are published as [`Notice`]s and leave the state untouched.

mod notice;
mod state;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{
    Result,
    backend::{Backend, Collection},
    catalog::AlgorithmCatalog,
    compose::{ActionResolver, PipelineComposer, ResolvedAction, ResolvedPipeline, ResolvedTask, TaskComposer},
    markup::MarkupBrowser,
    model::{ActionModel, AlgorithmModel, PipelineModel, TaskModel},
    utils::name::same_name,
    validate::{self, PartLookup},
};

pub use notice::{Notice, NoticeChannel, NoticeLevel};
pub use state::{EditorState, EntityKind, Modal, Mode, Selection};

/// Capacity of the notice channel.
const NOTICE_CAPACITY: usize = 64;

/// Local copy of everything the backend lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub algorithms: Vec<AlgorithmModel>,
    pub actions: Vec<ActionModel>,
    pub tasks: Vec<TaskModel>,
    pub pipelines: Vec<PipelineModel>,
}

impl PartLookup for Catalogs {
    fn pipeline(
        &self,
        name: &str,
    ) -> Option<&PipelineModel> {
        self.pipelines.iter().find(|p| same_name(&p.name, name))
    }

    fn task(
        &self,
        name: &str,
    ) -> Option<&TaskModel> {
        self.tasks.iter().find(|t| same_name(&t.name, name))
    }

    fn action(
        &self,
        name: &str,
    ) -> Option<&ActionModel> {
        self.actions.iter().find(|a| same_name(&a.name, name))
    }

    fn algorithm(
        &self,
        name: &str,
    ) -> Option<&AlgorithmModel> {
        self.algorithms.iter().find(|a| same_name(&a.name, name))
    }
}

/// The resolved detail of the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Pipeline(ResolvedPipeline),
    Task(ResolvedTask),
    Action(ResolvedAction),
}

pub struct Editor {
    state: EditorState,
    catalogs: Catalogs,
    detail: Option<Detail>,

    algorithms: Arc<AlgorithmCatalog>,
    actions: Arc<dyn Collection<Item = ActionModel>>,
    tasks: Arc<dyn Collection<Item = TaskModel>>,
    pipelines: Arc<dyn Collection<Item = PipelineModel>>,

    action_resolver: Arc<ActionResolver>,
    task_composer: Arc<TaskComposer>,
    pipeline_composer: PipelineComposer,
    markup: MarkupBrowser,

    notices: NoticeChannel,
}

impl Editor {
    /// Wires the composers to the collections of `backend`. The catalogs
    /// stay empty until [`Editor::reload`] is called.
    pub fn new(
        backend: &Backend,
        cache_capacity: u64,
    ) -> Result<Self> {
        let algorithms = Arc::new(AlgorithmCatalog::new(backend.algorithms()?, cache_capacity));
        let actions = backend.actions()?;
        let tasks = backend.tasks()?;
        let pipelines = backend.pipelines()?;

        let action_resolver = Arc::new(ActionResolver::new(actions.clone(), algorithms.clone()));
        let task_composer = Arc::new(TaskComposer::new(tasks.clone(), action_resolver.clone()));
        let pipeline_composer = PipelineComposer::new(pipelines.clone(), task_composer.clone());

        Ok(Self {
            state: EditorState::default(),
            catalogs: Catalogs::default(),
            detail: None,
            algorithms,
            actions,
            tasks,
            pipelines,
            action_resolver,
            task_composer,
            pipeline_composer,
            markup: MarkupBrowser::new(backend.markup()?),
            notices: NoticeChannel::new(NOTICE_CAPACITY),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Detail of the current selection, if any.
    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn markup(&self) -> &MarkupBrowser {
        &self.markup
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn publish(
        &self,
        notice: Notice,
    ) {
        let level = notice.level;
        if !self.notices.publish(notice) {
            trace!("no subscriber for {} notice", level.as_ref());
        }
    }

    /// Fetches the detail of `selection` and starts editing it.
    pub async fn select(
        &mut self,
        selection: Selection,
    ) -> Result<()> {
        trace!("Editor::select({:?})", selection);
        let detail = match &selection {
            Selection::None => Ok(None),
            Selection::Pipeline(name) => self.pipeline_composer.resolve(name).await.map(|p| Some(Detail::Pipeline(p))),
            Selection::Task(name) => self.task_composer.resolve(name).await.map(|t| Some(Detail::Task(t))),
            Selection::Action(name) => self.action_resolver.resolve(name).await.map(|a| Some(Detail::Action(a))),
        };

        match detail {
            Ok(detail) => {
                self.detail = detail;
                self.state = std::mem::take(&mut self.state).select(selection);
                Ok(())
            }
            Err(err) => {
                self.publish(Notice::error(&err));
                Err(err)
            }
        }
    }

    /// Opens the add dialog with an empty draft.
    pub fn open_add(
        &mut self,
        kind: EntityKind,
    ) {
        self.state = std::mem::take(&mut self.state).open_add(kind);
    }

    /// The open add dialog's draft.
    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.state.modal.as_mut()
    }

    pub fn cancel(&mut self) {
        self.state = std::mem::take(&mut self.state).cancel();
        self.detail = None;
    }

    /// Saves the draft of the open add dialog, then reloads.
    ///
    /// Does nothing when no dialog is open.
    pub async fn confirm(&mut self) -> Result<()> {
        let Some(modal) = self.state.modal.clone() else {
            debug!("Editor::confirm without an open dialog");
            return Ok(());
        };
        trace!("Editor::confirm({} {})", modal.kind(), modal.name());

        let saved = match &modal {
            Modal::Action(draft) => self.action_resolver.save(draft).await.map(|a| a.name),
            Modal::Task(draft) => {
                let affected = TaskComposer::advise(draft, &self.catalogs.pipelines);
                if !affected.is_empty() {
                    self.publish(Notice::warning(format!(
                        "\"{}\" runs several actions in parallel and would not be the last task in: {}.",
                        draft.name,
                        affected.join(", ")
                    )));
                }
                self.task_composer.save(draft).await.map(|t| t.name)
            }
            Modal::Pipeline(draft) => self.pipeline_composer.save(draft, &self.catalogs.tasks).await.map(|p| p.name),
        };
        self.finish_save(saved).await
    }

    /// Saves the open action draft as a custom action together with a task
    /// running only that action, then reloads.
    ///
    /// Does nothing unless an action dialog is open.
    pub async fn confirm_with_task(&mut self) -> Result<()> {
        let Some(Modal::Action(draft)) = self.state.modal.clone() else {
            debug!("Editor::confirm_with_task without an open action dialog");
            return Ok(());
        };
        trace!("Editor::confirm_with_task({})", draft.name);

        let saved = self.task_composer.save_with_action(&draft).await.map(|(_, task)| task.name);
        self.finish_save(saved).await
    }

    async fn finish_save(
        &mut self,
        saved: Result<String>,
    ) -> Result<()> {
        match saved {
            Ok(name) => {
                self.publish(Notice::success(format!("\"{}\" was successfully saved.", name)));
                self.state = std::mem::take(&mut self.state).saved();
                self.detail = None;
                self.reload().await
            }
            Err(err) => {
                self.publish(Notice::error(&err));
                Err(err)
            }
        }
    }

    /// Deletes the selected element, then reloads.
    pub async fn delete_selected(&mut self) -> Result<()> {
        let Some(selection) = self.state.selection().cloned() else {
            return Ok(());
        };
        trace!("Editor::delete_selected({:?})", selection);

        let deleted = match &selection {
            Selection::None => return Ok(()),
            Selection::Pipeline(name) => self.pipeline_composer.delete(name).await,
            Selection::Task(name) => self.task_composer.delete(name).await,
            Selection::Action(name) => self.action_resolver.delete(name).await,
        };

        match deleted {
            Ok(()) => {
                self.publish(Notice::success(format!("\"{}\" was successfully deleted.", selection.name().unwrap_or_default())));
                self.state = std::mem::take(&mut self.state).saved();
                self.detail = None;
                self.reload().await
            }
            Err(err) => {
                self.publish(Notice::error(&err));
                Err(err)
            }
        }
    }

    /// Drops the algorithm cache and fetches all four catalogs concurrently.
    pub async fn reload(&mut self) -> Result<()> {
        trace!("Editor::reload");
        self.algorithms.invalidate();

        let fetched = tokio::try_join!(self.algorithms.get_all(), self.actions.list(), self.tasks.list(), self.pipelines.list());
        match fetched {
            Ok((algorithms, actions, tasks, pipelines)) => {
                debug!(
                    "reloaded {} algorithms, {} actions, {} tasks, {} pipelines",
                    algorithms.len(),
                    actions.len(),
                    tasks.len(),
                    pipelines.len()
                );
                self.catalogs = Catalogs {
                    algorithms,
                    actions,
                    tasks,
                    pipelines,
                };
                Ok(())
            }
            Err(err) => {
                self.publish(Notice::error(&err));
                Err(err)
            }
        }
    }

    /// Checks against the local snapshot that `pipeline` can run.
    pub fn verify_runnable(
        &self,
        pipeline: &str,
    ) -> Result<()> {
        validate::verify_runnable(pipeline, &self.catalogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        PipeforgeError,
        backend::MemBackend,
        model::{ActionProperty, PropertyDescriptor, ProvidesCollection, ValueType},
    };

    fn face() -> AlgorithmModel {
        AlgorithmModel {
            name: "FACE".into(),
            description: "face detection".into(),
            provides_collection: ProvidesCollection {
                states: vec!["DETECTION".into()],
                properties: vec![PropertyDescriptor {
                    name: "MIN_SIZE".into(),
                    description: "minimum face size".into(),
                    value_type: ValueType::Int,
                    default_value: Some("16".into()),
                    properties_key: None,
                }],
            },
            supports_batch_processing: true,
            ..Default::default()
        }
    }

    async fn editor() -> Editor {
        let backend = Backend::with(&MemBackend::new().with_algorithms(vec![face()]));
        let mut editor = Editor::new(&backend, 16).unwrap();
        editor.reload().await.unwrap();
        editor
    }

    async fn add_action(
        editor: &mut Editor,
        name: &str,
    ) {
        editor.open_add(EntityKind::Action);
        if let Some(Modal::Action(draft)) = editor.modal_mut() {
            draft.name = name.into();
            draft.description = "test action".into();
            draft.algorithm = "FACE".into();
            draft.set("MIN_SIZE", "8");
        }
        editor.confirm().await.unwrap();
    }

    async fn add_task(
        editor: &mut Editor,
        name: &str,
        actions: &[&str],
    ) {
        editor.open_add(EntityKind::Task);
        if let Some(Modal::Task(draft)) = editor.modal_mut() {
            draft.name = name.into();
            draft.description = "test task".into();
            for action in actions {
                draft.add_action(*action);
            }
        }
        editor.confirm().await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_saves_and_reloads() {
        let mut editor = editor().await;
        let mut notices = editor.subscribe();
        assert_eq!(editor.catalogs().algorithms.len(), 1);

        add_action(&mut editor, "face small").await;
        assert_eq!(editor.state(), &EditorState::default());
        assert_eq!(editor.catalogs().actions.len(), 1);
        assert_eq!(editor.catalogs().actions[0].properties, vec![ActionProperty::new("MIN_SIZE", "8")]);

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice, Notice::success("\"FACE SMALL\" was successfully saved."));
    }

    #[tokio::test]
    async fn test_confirm_failure_keeps_state() {
        let mut editor = editor().await;
        let mut notices = editor.subscribe();

        editor.open_add(EntityKind::Task);
        let before = editor.state().clone();
        let err = editor.confirm().await.unwrap_err();

        assert!(matches!(err, PipeforgeError::Validation(_)));
        assert_eq!(editor.state(), &before);
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
        assert!(editor.catalogs().tasks.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_with_task() {
        let mut editor = editor().await;
        let mut notices = editor.subscribe();

        editor.open_add(EntityKind::Action);
        if let Some(Modal::Action(draft)) = editor.modal_mut() {
            draft.name = "tiny".into();
            draft.description = "tiny faces".into();
            draft.algorithm = "FACE".into();
            draft.set("MIN_SIZE", "4");
        }
        editor.confirm_with_task().await.unwrap();

        assert_eq!(editor.state(), &EditorState::default());
        assert_eq!(editor.catalogs().actions[0].name, "CUSTOM TINY ACTION");
        assert_eq!(editor.catalogs().tasks[0].name, "CUSTOM TINY TASK");
        assert_eq!(editor.catalogs().tasks[0].actions, vec!["CUSTOM TINY ACTION".to_string()]);
        assert_eq!(notices.recv().await.unwrap(), Notice::success("\"CUSTOM TINY TASK\" was successfully saved."));

        editor.open_add(EntityKind::Task);
        let before = editor.state().clone();
        editor.confirm_with_task().await.unwrap();
        assert_eq!(editor.state(), &before);
    }

    #[tokio::test]
    async fn test_select_and_cancel() {
        let mut editor = editor().await;
        add_action(&mut editor, "FACE SMALL").await;

        editor.select(Selection::Action("FACE SMALL".into())).await.unwrap();
        assert_eq!(editor.state().selection(), Some(&Selection::Action("FACE SMALL".into())));
        let Some(Detail::Action(action)) = editor.detail() else {
            panic!("expected an action detail");
        };
        assert_eq!(action.properties[0].current_value, "8");
        assert!(action.properties[0].changed);

        editor.cancel();
        assert_eq!(editor.state().mode, Mode::Viewing);
        assert!(editor.detail().is_none());
    }

    #[tokio::test]
    async fn test_select_missing_keeps_state() {
        let mut editor = editor().await;
        let mut notices = editor.subscribe();

        let err = editor.select(Selection::Pipeline("NOPE".into())).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(editor.state().mode, Mode::Viewing);
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_delete_referenced_action_conflicts() {
        let mut editor = editor().await;
        add_action(&mut editor, "A").await;
        add_task(&mut editor, "T", &["A"]).await;
        let mut notices = editor.subscribe();

        editor.select(Selection::Action("A".into())).await.unwrap();
        let err = editor.delete_selected().await.unwrap_err();
        assert!(matches!(err, PipeforgeError::Conflict(_)));
        assert!(editor.state().is_editing());
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);

        editor.select(Selection::Task("T".into())).await.unwrap();
        editor.delete_selected().await.unwrap();
        assert_eq!(editor.state().mode, Mode::Viewing);
        assert!(editor.catalogs().tasks.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_flow_and_runnable() {
        let mut editor = editor().await;
        add_action(&mut editor, "A").await;
        add_action(&mut editor, "B").await;
        add_task(&mut editor, "SINGLE", &["A"]).await;
        add_task(&mut editor, "BOTH", &["A", "B"]).await;

        editor.open_add(EntityKind::Pipeline);
        if let Some(Modal::Pipeline(draft)) = editor.modal_mut() {
            draft.name = "P".into();
            draft.description = "test pipeline".into();
            draft.add_task("BOTH").add_task("SINGLE");
        }
        let err = editor.confirm().await.unwrap_err();
        assert_eq!(err, PipeforgeError::Validation("P: No tasks may follow the multi-detection task of BOTH.".to_string()));
        assert!(editor.state().modal.is_some());

        if let Some(Modal::Pipeline(draft)) = editor.modal_mut() {
            draft.tasks = vec!["SINGLE".into(), "BOTH".into()];
        }
        editor.confirm().await.unwrap();
        assert_eq!(editor.catalogs().pipelines.len(), 1);
        editor.verify_runnable("P").unwrap();

        editor.select(Selection::Pipeline("P".into())).await.unwrap();
        let Some(Detail::Pipeline(pipeline)) = editor.detail() else {
            panic!("expected a pipeline detail");
        };
        assert_eq!(pipeline.tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_task_advisory() {
        let mut editor = editor().await;
        add_action(&mut editor, "A").await;
        add_action(&mut editor, "B").await;
        add_task(&mut editor, "SINGLE", &["A"]).await;
        add_task(&mut editor, "LAST", &["B"]).await;

        editor.open_add(EntityKind::Pipeline);
        if let Some(Modal::Pipeline(draft)) = editor.modal_mut() {
            draft.name = "P".into();
            draft.description = "p".into();
            draft.add_task("SINGLE").add_task("LAST");
        }
        editor.confirm().await.unwrap();

        let mut notices = editor.subscribe();
        editor.open_add(EntityKind::Task);
        if let Some(Modal::Task(draft)) = editor.modal_mut() {
            draft.name = "SINGLE".into();
            draft.description = "now parallel".into();
            draft.add_action("A").add_action("B");
        }
        // advisory only; the backend then refuses the duplicate name
        assert!(editor.confirm().await.is_err());
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Warning);
        assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Error);
    }
}
