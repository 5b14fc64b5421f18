use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, trace, warn};

use crate::{
    PipeforgeError, Result,
    backend::Collection,
    compose::action::{ActionDraft, ActionResolver, ResolvedAction},
    model::{ActionModel, PipelineModel, TaskKind, TaskModel},
    utils::name::{custom_action_name, custom_task_name, duplicates, same_name, trim_and_upper},
    validate::require,
};

/// One action slot of a resolved task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskMember {
    Resolved(ResolvedAction),
    /// the action itself could not be fetched
    Unavailable { name: String, reason: PipeforgeError },
}

impl TaskMember {
    pub fn name(&self) -> &str {
        match self {
            TaskMember::Resolved(action) => &action.name,
            TaskMember::Unavailable { name, .. } => name,
        }
    }

    /// Unavailable, or resolved against a missing algorithm.
    pub fn is_degraded(&self) -> bool {
        match self {
            TaskMember::Resolved(action) => action.algorithm.is_missing(),
            TaskMember::Unavailable { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTask {
    pub name: String,
    pub description: String,
    pub kind: TaskKind,
    /// in stored order
    pub members: Vec<TaskMember>,
}

impl ResolvedTask {
    pub fn is_degraded(&self) -> bool {
        self.members.iter().any(TaskMember::is_degraded)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub actions: Vec<String>,
}

impl TaskDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    pub fn add_action(
        &mut self,
        name: impl Into<String>,
    ) -> &mut Self {
        self.actions.push(name.into());
        self
    }

    pub fn kind(&self) -> TaskKind {
        TaskKind::of(self.actions.len())
    }

    fn to_model(&self) -> TaskModel {
        TaskModel {
            name: trim_and_upper(&self.name),
            description: self.description.trim().to_string(),
            actions: self.actions.iter().map(|a| trim_and_upper(a)).collect(),
        }
    }
}

/// Resolves and saves tasks.
pub struct TaskComposer {
    tasks: Arc<dyn Collection<Item = TaskModel>>,
    resolver: Arc<ActionResolver>,
}

impl TaskComposer {
    pub fn new(
        tasks: Arc<dyn Collection<Item = TaskModel>>,
        resolver: Arc<ActionResolver>,
    ) -> Self {
        Self {
            tasks,
            resolver,
        }
    }

    /// Fetches the task and resolves all of its actions concurrently.
    ///
    /// Members keep the stored order whatever order the resolves finish in.
    /// Only a failure to fetch the task itself is an error.
    pub async fn resolve(
        &self,
        name: &str,
    ) -> Result<ResolvedTask> {
        trace!("TaskComposer::resolve({})", name);
        let task = self.tasks.find(name).await?;
        let task_name = &task.name;

        let members = join_all(task.actions.iter().map(|action| async move {
            match self.resolver.resolve(action).await {
                Ok(resolved) => TaskMember::Resolved(resolved),
                Err(reason) => {
                    warn!("task {} member {} is unavailable: {}", task_name, action, reason);
                    TaskMember::Unavailable {
                        name: action.clone(),
                        reason,
                    }
                }
            }
        }))
        .await;
        debug!("resolved task {} with {} members", task.name, members.len());

        Ok(ResolvedTask {
            kind: task.kind(),
            name: task.name,
            description: task.description,
            members,
        })
    }

    /// Validates and stores a new task.
    pub async fn save(
        &self,
        draft: &TaskDraft,
    ) -> Result<TaskModel> {
        require("Task", "name", &draft.name)?;
        require("Task", "description", &draft.description)?;
        if draft.actions.is_empty() {
            return Err(PipeforgeError::Validation("Tasks must contain at least one action.".to_string()));
        }
        let model = draft.to_model();
        let dups = duplicates(&model.actions);
        if !dups.is_empty() {
            return Err(PipeforgeError::Validation(format!("{}: The following action names were duplicated: {}.", model.name, dups.join(", "))));
        }

        trace!("TaskComposer::save({})", model.name);
        self.tasks.create(&model).await?;
        Ok(model)
    }

    /// Stores `draft` as the action `CUSTOM <NAME> ACTION`, then a task
    /// `CUSTOM <NAME> TASK` running only that action.
    ///
    /// The task takes the action's description, so it is required up front.
    /// A failed task save leaves the action stored.
    pub async fn save_with_action(
        &self,
        draft: &ActionDraft,
    ) -> Result<(ActionModel, TaskModel)> {
        require("Action", "name", &draft.name)?;
        require("Task", "description", &draft.description)?;

        let action = self.resolver.save(&ActionDraft {
            name: custom_action_name(&draft.name),
            ..draft.clone()
        })
        .await?;

        let mut task = TaskDraft::new(custom_task_name(&draft.name), action.description.clone());
        task.add_action(action.name.clone());
        let task = self.save(&task).await?;
        debug!("saved {} with its task {}", action.name, task.name);
        Ok((action, task))
    }

    /// Pipelines in which a parallel version of this task would not be the
    /// last task. Saving is still allowed; the result is advisory.
    pub fn advise(
        draft: &TaskDraft,
        pipelines: &[PipelineModel],
    ) -> Vec<String> {
        if draft.kind() != TaskKind::Parallel {
            return Vec::new();
        }
        let affected: Vec<String> = pipelines
            .iter()
            .filter(|p| p.tasks.iter().enumerate().any(|(idx, t)| same_name(t, &draft.name) && idx + 1 < p.tasks.len()))
            .map(|p| p.name.clone())
            .collect();
        if !affected.is_empty() {
            warn!("parallel task {} would not be last in: {}", draft.name, affected.join(", "));
        }
        affected
    }

    pub async fn delete(
        &self,
        name: &str,
    ) -> Result<()> {
        trace!("TaskComposer::delete({})", name);
        self.tasks.delete(name).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        backend::MemBackend,
        catalog::AlgorithmCatalog,
        model::{ActionProperty, AlgorithmModel, PropertyDescriptor, ProvidesCollection, ValueType},
    };

    /// Delays each find so that earlier names finish last.
    struct Slow {
        inner: Arc<dyn Collection<Item = ActionModel>>,
    }

    #[async_trait]
    impl Collection for Slow {
        type Item = ActionModel;

        async fn list(&self) -> Result<Vec<ActionModel>> {
            self.inner.list().await
        }

        async fn find(
            &self,
            name: &str,
        ) -> Result<ActionModel> {
            let delay = match name {
                "FIRST" => 30,
                "SECOND" => 20,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.inner.find(name).await
        }

        async fn create(
            &self,
            item: &ActionModel,
        ) -> Result<()> {
            self.inner.create(item).await
        }

        async fn delete(
            &self,
            name: &str,
        ) -> Result<()> {
            self.inner.delete(name).await
        }
    }

    fn algorithm(name: &str) -> AlgorithmModel {
        AlgorithmModel {
            name: name.into(),
            description: name.into(),
            provides_collection: ProvidesCollection {
                states: vec![],
                properties: vec![PropertyDescriptor {
                    name: "MIN_SIZE".into(),
                    description: "min size".into(),
                    value_type: ValueType::Int,
                    default_value: Some("16".into()),
                    properties_key: None,
                }],
            },
            ..Default::default()
        }
    }

    async fn setup() -> (MemBackend, TaskComposer) {
        let mem = MemBackend::new().with_algorithms(vec![algorithm("FACE"), algorithm("OCV")]);
        let catalog = Arc::new(AlgorithmCatalog::new(mem.algorithms(), 16));
        let actions: Arc<dyn Collection<Item = ActionModel>> = Arc::new(Slow {
            inner: mem.actions(),
        });
        let resolver = Arc::new(ActionResolver::new(actions, catalog));
        for (name, algo) in [("FIRST", "FACE"), ("SECOND", "OCV"), ("THIRD", "FACE"), ("GHOSTLY", "GHOST")] {
            resolver.save(&ActionDraft::new(name, name, algo)).await.unwrap();
        }
        (mem.clone(), TaskComposer::new(mem.tasks(), resolver))
    }

    #[tokio::test]
    async fn test_resolve_keeps_stored_order() {
        let (_mem, composer) = setup().await;
        let mut draft = TaskDraft::new("ALL", "all of them");
        draft.add_action("FIRST").add_action("SECOND").add_action("THIRD");
        composer.save(&draft).await.unwrap();

        let task = composer.resolve("all").await.unwrap();
        let names: Vec<&str> = task.members.iter().map(TaskMember::name).collect();
        assert_eq!(names, vec!["FIRST", "SECOND", "THIRD"]);
        assert_eq!(task.kind, TaskKind::Parallel);
        assert!(!task.is_degraded());
    }

    #[tokio::test]
    async fn test_resolve_degraded_members() {
        let (mem, composer) = setup().await;
        mem.tasks()
            .create(&TaskModel {
                name: "MIXED".into(),
                description: "mixed".into(),
                actions: vec!["GHOSTLY".into(), "VANISHED".into(), "THIRD".into()],
            })
            .await
            .unwrap();

        let task = composer.resolve("MIXED").await.unwrap();
        assert_eq!(task.members.len(), 3);
        assert!(matches!(&task.members[0], TaskMember::Resolved(a) if a.algorithm.is_missing()));
        assert!(matches!(&task.members[1], TaskMember::Unavailable { name, reason } if name == "VANISHED" && reason.is_not_found()));
        assert!(!task.members[2].is_degraded());
        assert!(task.is_degraded());
    }

    #[tokio::test]
    async fn test_resolve_missing_task() {
        let (_mem, composer) = setup().await;
        assert!(composer.resolve("NOPE").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_save_validation() {
        let (mem, composer) = setup().await;

        let err = composer.save(&TaskDraft::new("T", "")).await.unwrap_err();
        assert_eq!(err, PipeforgeError::Validation("Task description may not be empty.".to_string()));

        let err = composer.save(&TaskDraft::new("T", "t")).await.unwrap_err();
        assert_eq!(err, PipeforgeError::Validation("Tasks must contain at least one action.".to_string()));

        let mut draft = TaskDraft::new("t", "t");
        draft.add_action("first").add_action("FIRST ");
        let err = composer.save(&draft).await.unwrap_err();
        assert_eq!(err, PipeforgeError::Validation("T: The following action names were duplicated: FIRST.".to_string()));

        assert!(mem.tasks().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_with_action() {
        let (mem, composer) = setup().await;
        let mut draft = ActionDraft::new("face small", "small faces", "FACE");
        draft.set("MIN_SIZE", "8");

        let (action, task) = composer.save_with_action(&draft).await.unwrap();
        assert_eq!(action.name, "CUSTOM FACE SMALL ACTION");
        assert_eq!(action.properties, vec![ActionProperty::new("MIN_SIZE", "8")]);
        assert_eq!(
            task,
            TaskModel {
                name: "CUSTOM FACE SMALL TASK".into(),
                description: "small faces".into(),
                actions: vec!["CUSTOM FACE SMALL ACTION".into()],
            }
        );
        assert_eq!(mem.tasks().find("custom face small task").await.unwrap(), task);

        let resolved = composer.resolve(&task.name).await.unwrap();
        assert_eq!(resolved.kind, TaskKind::Normal);
        assert_eq!(resolved.members[0].name(), "CUSTOM FACE SMALL ACTION");
    }

    #[tokio::test]
    async fn test_save_with_action_needs_description_first() {
        let (mem, composer) = setup().await;
        let err = composer.save_with_action(&ActionDraft::new("face", " ", "FACE")).await.unwrap_err();
        assert_eq!(err, PipeforgeError::Validation("Task description may not be empty.".to_string()));
        assert!(mem.actions().find("CUSTOM FACE ACTION").await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_advise_lists_pipelines_where_not_last() {
        let pipelines = vec![
            PipelineModel {
                name: "P1".into(),
                description: "p1".into(),
                tasks: vec!["T".into(), "OTHER".into()],
            },
            PipelineModel {
                name: "P2".into(),
                description: "p2".into(),
                tasks: vec!["OTHER".into(), "T".into()],
            },
        ];
        let mut draft = TaskDraft::new("t", "t");
        draft.add_action("A");
        assert!(TaskComposer::advise(&draft, &pipelines).is_empty());

        draft.add_action("B");
        assert_eq!(TaskComposer::advise(&draft, &pipelines), vec!["P1".to_string()]);
    }
}
