//! Field checks and runnable-pipeline checks.
//!
//! The editor runs the field checks before every save so that obviously
//! invalid elements never reach the network. [`verify_runnable`] performs the
//! checks the workflow manager applies before a pipeline may run.

use std::collections::{BTreeSet, HashSet};

use crate::{
    PipeforgeError, Result,
    model::{ActionModel, ActionType, AlgorithmModel, PipelineModel, PropertyValue, TaskModel},
};

/// Fails with a validation error naming `field` when `value` is blank.
pub fn require(
    kind: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipeforgeError::Validation(format!("{} {} may not be empty.", kind, field)));
    }
    Ok(())
}

/// Resolves names to the elements of a pipeline.
pub trait PartLookup {
    fn pipeline(
        &self,
        name: &str,
    ) -> Option<&PipelineModel>;

    fn task(
        &self,
        name: &str,
    ) -> Option<&TaskModel>;

    fn action(
        &self,
        name: &str,
    ) -> Option<&ActionModel>;

    fn algorithm(
        &self,
        name: &str,
    ) -> Option<&AlgorithmModel>;
}

/// Checks every override of `action` against the properties `algorithm` declares.
pub fn check_action_properties(
    action: &ActionModel,
    algorithm: &AlgorithmModel,
) -> Result<()> {
    for property in &action.properties {
        let Some(descriptor) = algorithm.property(&property.name) else {
            return Err(PipeforgeError::Validation(format!(
                "The \"{}\" property from the \"{}\" action does not exist in \"{}\" algorithm.",
                property.name, action.name, algorithm.name
            )));
        };
        if PropertyValue::parse(descriptor.value_type, &property.value).is_err() {
            return Err(PipeforgeError::Validation(format!(
                "The \"{}\" property from the \"{}\" action has a value of \"{}\", which is not a valid \"{}\".",
                property.name, action.name, property.value, descriptor.value_type
            )));
        }
    }
    Ok(())
}

/// Verifies that the pipeline named `pipeline_name` can run.
pub fn verify_runnable(
    pipeline_name: &str,
    lookup: &dyn PartLookup,
) -> Result<()> {
    let pipeline = lookup.pipeline(pipeline_name).ok_or(PipeforgeError::Validation(format!("No pipeline named: {}", pipeline_name)))?;
    verify_all_parts_present(pipeline, lookup)?;

    // every part is known from here on
    let tasks: Vec<&TaskModel> = pipeline.tasks.iter().filter_map(|t| lookup.task(t)).collect();

    verify_batch_support(pipeline, &tasks, lookup)?;
    verify_states(pipeline, &tasks, lookup)?;

    for task in &tasks {
        for action in task.actions.iter().filter_map(|a| lookup.action(a)) {
            if let Some(algorithm) = lookup.algorithm(&action.algorithm) {
                check_action_properties(action, algorithm)?;
            }
        }
    }

    for task in &tasks {
        let action_types: BTreeSet<String> = algorithms_of(task, lookup).iter().map(|a| a.action_type.to_string()).collect();
        if action_types.len() > 1 {
            return Err(PipeforgeError::Validation(format!(
                "{}: tasks cannot contain actions which have different ActionTypes. It had the following ActionTypes, but only one type was expected: {}",
                task.name,
                action_types.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    verify_nothing_follows_parallel(pipeline, &tasks)?;
    verify_markup(pipeline, &tasks, lookup)?;
    Ok(())
}

fn algorithms_of<'a>(
    task: &TaskModel,
    lookup: &'a dyn PartLookup,
) -> Vec<&'a AlgorithmModel> {
    task.actions.iter().filter_map(|a| lookup.action(a)).filter_map(|a| lookup.algorithm(&a.algorithm)).collect()
}

fn verify_all_parts_present(
    pipeline: &PipelineModel,
    lookup: &dyn PartLookup,
) -> Result<()> {
    let mut missing_tasks = BTreeSet::new();
    let mut missing_actions = BTreeSet::new();
    let mut missing_algorithms = BTreeSet::new();

    for task_name in &pipeline.tasks {
        let Some(task) = lookup.task(task_name) else {
            missing_tasks.insert(task_name.clone());
            continue;
        };
        for action_name in &task.actions {
            let Some(action) = lookup.action(action_name) else {
                missing_actions.insert(action_name.clone());
                continue;
            };
            if lookup.algorithm(&action.algorithm).is_none() {
                missing_algorithms.insert(action.algorithm.clone());
            }
        }
    }

    if missing_tasks.is_empty() && missing_actions.is_empty() && missing_algorithms.is_empty() {
        return Ok(());
    }

    let mut msg = format!("Cannot run pipeline {} due to the following issues: ", pipeline.name);
    for (kind, missing) in [("tasks", missing_tasks), ("actions", missing_actions), ("algorithms", missing_algorithms)] {
        if !missing.is_empty() {
            msg.push_str(&format!("The following {} are missing: {}. ", kind, missing.into_iter().collect::<Vec<_>>().join(", ")));
        }
    }
    Err(PipeforgeError::Validation(msg.trim_end().to_string()))
}

fn verify_batch_support(
    pipeline: &PipelineModel,
    tasks: &[&TaskModel],
    lookup: &dyn PartLookup,
) -> Result<()> {
    let unsupported: Vec<&str> = tasks.iter().flat_map(|t| algorithms_of(t, lookup)).filter(|a| !a.supports_batch_processing).map(|a| a.name.as_str()).collect();
    if unsupported.is_empty() {
        return Ok(());
    }
    Err(PipeforgeError::Validation(format!(
        "Expected entire \"{}\" pipeline to support batch processing, but the following algorithms do not: {}",
        pipeline.name,
        unsupported.join(", ")
    )))
}

fn verify_states(
    pipeline: &PipelineModel,
    tasks: &[&TaskModel],
    lookup: &dyn PartLookup,
) -> Result<()> {
    for pair in tasks.windows(2) {
        let provided: HashSet<&String> = algorithms_of(pair[0], lookup).into_iter().flat_map(|a| a.provides_collection.states.iter()).collect();
        let required: BTreeSet<&String> = algorithms_of(pair[1], lookup).into_iter().flat_map(|a| a.requires_collection.states.iter()).collect();
        if !required.iter().all(|s| provided.contains(s)) {
            let mut provided: Vec<&String> = provided.into_iter().collect();
            provided.sort();
            return Err(PipeforgeError::Validation(format!(
                "{}: The states for \"{}\" are not satisfied. Provided: {:?}. Required: {:?}.",
                pipeline.name, pair[1].name, provided, required
            )));
        }
    }
    Ok(())
}

/// A task with several actions must be the last one of its pipeline.
pub fn verify_nothing_follows_parallel(
    pipeline: &PipelineModel,
    tasks: &[&TaskModel],
) -> Result<()> {
    if let Some((idx, task)) = tasks.iter().enumerate().find(|(_, t)| t.is_parallel()) {
        if idx + 1 < tasks.len() {
            return Err(PipeforgeError::Validation(format!("{}: No tasks may follow the multi-detection task of {}.", pipeline.name, task.name)));
        }
    }
    Ok(())
}

fn verify_markup(
    pipeline: &PipelineModel,
    tasks: &[&TaskModel],
    lookup: &dyn PartLookup,
) -> Result<()> {
    for (idx, task) in tasks.iter().enumerate() {
        let has_markup = algorithms_of(task, lookup).iter().any(|a| a.action_type == ActionType::Markup);
        if !has_markup {
            continue;
        }
        if idx + 1 != tasks.len() {
            return Err(PipeforgeError::Validation(format!("{}: No tasks may follow a markup task of {}.", pipeline.name, task.name)));
        }
        if idx == 0 {
            return Err(PipeforgeError::Validation(format!("{}: A markup task may not be the first task in a pipeline.", pipeline.name)));
        }
        if task.actions.len() != 1 {
            return Err(PipeforgeError::Validation(format!("{}: A markup task may only contain one action.", task.name)));
        }
    }
    Ok(())
}
