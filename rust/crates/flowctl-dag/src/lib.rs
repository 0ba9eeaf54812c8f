//! DAG validation and dependency-graph structures for workflow definitions.
//!
//! A workflow definition arrives as opaque JSON; [`validate_definition`] is
//! the only place that interprets its structure. Downstream code works from
//! the validated [`TaskDef`] list rather than re-parsing JSON.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::instrument;

/// DAG-related errors (distinct from the structural validation error list
/// `validate_definition` returns; this is for callers that need a typed
/// dependency-graph error, e.g. building a `WorkflowDag` from already
/// validated data).
#[derive(Debug, Error)]
pub enum DagError {
    #[error("cycle detected in workflow DAG")]
    CycleDetected,

    #[error("task '{task}' has unknown dependency: '{dependency}'")]
    MissingDependency { task: String, dependency: String },
}

/// A single task within a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub max_retries: i64,
}

/// A validated workflow definition: an id plus its task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDef {
    pub id: String,
    pub tasks: Vec<TaskDef>,
}

/// Validate a raw workflow definition (as deserialized JSON) against the
/// structural rules. Returns a list of human-readable error strings; an
/// empty list means the definition is valid.
///
/// All structural errors are collected in one pass. Cycle detection runs
/// only if no structural errors were found, since it presupposes valid task
/// ids and dependency references.
#[instrument(skip(definition), fields(workflow_id))]
pub fn validate_definition(definition: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = definition.as_object() else {
        errors.push("Workflow definition must be a JSON object".to_string());
        return errors;
    };

    if !obj.contains_key("id") {
        errors.push("Workflow must have an 'id' field".to_string());
    }

    let Some(tasks_value) = obj.get("tasks") else {
        errors.push("Workflow must have a 'tasks' field".to_string());
        return errors;
    };

    let Some(tasks) = tasks_value.as_array() else {
        errors.push("'tasks' must be a non-empty list".to_string());
        return errors;
    };

    if tasks.is_empty() {
        errors.push("'tasks' must be a non-empty list".to_string());
        return errors;
    }

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut known_ids: HashSet<String> = HashSet::new();
    // (task_id, dependencies) pairs for tasks that have a usable id, in
    // definition order, for the dependency and cycle-detection passes below.
    let mut dep_entries: Vec<(String, Vec<String>)> = Vec::new();

    for task in tasks {
        let Some(task_obj) = task.as_object() else {
            errors.push("Each task must be a JSON object".to_string());
            continue;
        };

        let task_id = match task_obj.get("id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => {
                errors.push("Each task must have an 'id' field".to_string());
                continue;
            }
        };

        if !task_obj.contains_key("command") {
            errors.push(format!("Task '{task_id}' must have a 'command' field"));
        }

        if !seen_ids.insert(task_id.clone()) {
            errors.push(format!("Duplicate task id: '{task_id}'"));
        }
        known_ids.insert(task_id.clone());

        let dependencies: Vec<String> = task_obj
            .get("dependencies")
            .and_then(|v| v.as_array())
            .map(|deps| {
                deps.iter()
                    .filter_map(|d| d.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        dep_entries.push((task_id, dependencies));
    }

    for (task_id, dependencies) in &dep_entries {
        for dep in dependencies {
            if !known_ids.contains(dep) {
                errors.push(format!(
                    "Task '{task_id}' has unknown dependency: '{dep}'"
                ));
            }
        }
    }

    if errors.is_empty() {
        if let Some(cycle_error) = find_cycle(&dep_entries) {
            errors.push(cycle_error);
        }
    }

    errors
}

/// Three-color DFS cycle detection (WHITE → GRAY → BLACK). A self-dependency
/// is a one-node cycle (the neighbor is already GRAY when visited).
fn find_cycle(dep_entries: &[(String, Vec<String>)]) -> Option<String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let adjacency: HashMap<&str, &[String]> = dep_entries
        .iter()
        .map(|(id, deps)| (id.as_str(), deps.as_slice()))
        .collect();

    let mut colors: HashMap<&str, Color> = dep_entries
        .iter()
        .map(|(id, _)| (id.as_str(), Color::White))
        .collect();

    fn visit<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, &'a [String]>,
        colors: &mut HashMap<&'a str, Color>,
    ) -> bool {
        colors.insert(node, Color::Gray);
        if let Some(deps) = adjacency.get(node) {
            for dep in deps.iter() {
                match colors.get(dep.as_str()) {
                    Some(Color::Gray) => return true,
                    Some(Color::White) => {
                        if visit(dep, adjacency, colors) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
        }
        colors.insert(node, Color::Black);
        false
    }

    for (id, _) in dep_entries {
        if colors.get(id.as_str()) == Some(&Color::White)
            && visit(id, &adjacency, &mut colors)
        {
            return Some("Workflow definition contains a cycle".to_string());
        }
    }

    None
}

/// A dependency graph built from an already-validated workflow definition,
/// used by the scheduler to determine which tasks are runnable.
#[derive(Debug, Clone)]
pub struct WorkflowDag {
    /// task_id -> [dependency task_id]
    dependencies: HashMap<String, Vec<String>>,
}

impl WorkflowDag {
    /// Build a dependency map from a validated definition. Panics-free: a
    /// definition that failed `validate_definition` should never reach
    /// here, since only validated definitions are ever persisted.
    pub fn from_definition(definition: &serde_json::Value) -> Result<Self, DagError> {
        let tasks = definition
            .get("tasks")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut dependencies = HashMap::new();
        let mut known_ids = HashSet::new();

        for task in &tasks {
            if let Some(id) = task.get("id").and_then(|v| v.as_str()) {
                known_ids.insert(id.to_string());
            }
        }

        for task in &tasks {
            let Some(id) = task.get("id").and_then(|v| v.as_str()) else {
                continue;
            };
            let deps: Vec<String> = task
                .get("dependencies")
                .and_then(|v| v.as_array())
                .map(|deps| {
                    deps.iter()
                        .filter_map(|d| d.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            for dep in &deps {
                if !known_ids.contains(dep) {
                    return Err(DagError::MissingDependency {
                        task: id.to_string(),
                        dependency: dep.clone(),
                    });
                }
            }

            dependencies.insert(id.to_string(), deps);
        }

        Ok(Self { dependencies })
    }

    /// The dependency task ids for a given task, or an empty slice if the
    /// task has no entry (e.g. it was not found in the definition).
    pub fn dependencies_of(&self, task_id: &str) -> &[String] {
        self.dependencies
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &String> {
        self.dependencies.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_dag_has_no_errors() {
        let def = json!({
            "id": "wf1",
            "tasks": [
                {"id": "A", "command": "echo A"},
                {"id": "B", "command": "echo B", "dependencies": ["A"]}
            ]
        });
        assert!(validate_definition(&def).is_empty());
    }

    #[test]
    fn missing_id_is_an_error() {
        let def = json!({"tasks": [{"id": "A", "command": "echo A"}]});
        let errors = validate_definition(&def);
        assert!(errors.iter().any(|e| e.contains("'id'")));
    }

    #[test]
    fn missing_tasks_short_circuits() {
        let def = json!({"id": "wf1"});
        let errors = validate_definition(&def);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("tasks"));
    }

    #[test]
    fn empty_tasks_list_short_circuits() {
        let def = json!({"id": "wf1", "tasks": []});
        let errors = validate_definition(&def);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("non-empty"));
    }

    #[test]
    fn duplicate_task_id_is_an_error() {
        let def = json!({
            "id": "wf1",
            "tasks": [
                {"id": "A", "command": "echo 1"},
                {"id": "A", "command": "echo 2"}
            ]
        });
        let errors = validate_definition(&def);
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn unknown_dependency_is_an_error() {
        let def = json!({
            "id": "wf1",
            "tasks": [{"id": "A", "command": "echo A", "dependencies": ["Z"]}]
        });
        let errors = validate_definition(&def);
        assert!(errors.iter().any(|e| e.contains("unknown dependency") && e.contains("Z")));
    }

    #[test]
    fn cycle_is_detected() {
        let def = json!({
            "id": "wf1",
            "tasks": [
                {"id": "A", "command": "echo A", "dependencies": ["B"]},
                {"id": "B", "command": "echo B", "dependencies": ["A"]}
            ]
        });
        let errors = validate_definition(&def);
        assert!(errors.iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let def = json!({
            "id": "wf1",
            "tasks": [{"id": "A", "command": "echo A", "dependencies": ["A"]}]
        });
        let errors = validate_definition(&def);
        assert!(errors.iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn cycle_detection_does_not_run_when_structural_errors_exist() {
        // "Z" is both an unknown dependency and would otherwise form a
        // cycle-free graph; cycle detection must not mask the real error.
        let def = json!({
            "id": "wf1",
            "tasks": [{"id": "A", "command": "echo A", "dependencies": ["Z"]}]
        });
        let errors = validate_definition(&def);
        assert!(!errors.iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn cycle_detection_is_invariant_under_permutation() {
        let forward = json!({
            "id": "wf1",
            "tasks": [
                {"id": "A", "command": "x", "dependencies": ["B"]},
                {"id": "B", "command": "x", "dependencies": ["C"]},
                {"id": "C", "command": "x", "dependencies": ["A"]}
            ]
        });
        let reversed = json!({
            "id": "wf1",
            "tasks": [
                {"id": "C", "command": "x", "dependencies": ["A"]},
                {"id": "B", "command": "x", "dependencies": ["C"]},
                {"id": "A", "command": "x", "dependencies": ["B"]}
            ]
        });
        assert!(validate_definition(&forward).iter().any(|e| e.contains("cycle")));
        assert!(validate_definition(&reversed).iter().any(|e| e.contains("cycle")));
    }

    #[test]
    fn workflow_dag_dependencies_of() {
        let def = json!({
            "id": "wf1",
            "tasks": [
                {"id": "A", "command": "echo A"},
                {"id": "B", "command": "echo B", "dependencies": ["A"]},
                {"id": "C", "command": "echo C", "dependencies": ["A"]},
                {"id": "D", "command": "echo D", "dependencies": ["B", "C"]}
            ]
        });
        let dag = WorkflowDag::from_definition(&def).unwrap();
        assert_eq!(dag.dependencies_of("A"), &[] as &[String]);
        assert_eq!(dag.dependencies_of("D"), &["B".to_string(), "C".to_string()]);
    }
}
