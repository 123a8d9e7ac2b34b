//! Reassembles a flat issue list into the epic -> task -> subtask tree.
//!
//! The nested shape is the one structural contract external renderers
//! depend on: `epic key -> { display fields, tasks: { task key ->
//! { display fields, subtasks: { subtask key -> display fields } } } }`.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueType};

pub type Hierarchy = HashMap<String, EpicNode>;

/// Display fields carried by every node in the nested view, copied through
/// from the flat issue unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeFields {
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub reporter: String,
    pub priority: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub time_spent: Option<i64>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
}

impl NodeFields {
    fn from_issue(issue: &Issue) -> Self {
        Self {
            summary: issue.summary.clone(),
            status: issue.status.clone(),
            assignee: issue.assignee.clone(),
            reporter: issue.reporter.clone(),
            priority: issue.priority.clone(),
            start_date: issue.start_date,
            due_date: issue.due_date,
            created: issue.created.clone(),
            updated: issue.updated.clone(),
            time_spent: issue.time_spent,
            components: issue.components.clone(),
            labels: issue.labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpicNode {
    #[serde(flatten)]
    pub fields: NodeFields,
    pub tasks: HashMap<String, TaskNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskNode {
    #[serde(flatten)]
    pub fields: NodeFields,
    pub subtasks: HashMap<String, NodeFields>,
}

/// Lookup tables owned by a single assembly pass. `task_owner` and
/// `subtask_owner` map a child's key to the key of the node it was
/// attached under, so later stages resolve insertion points in O(1) and
/// duplicate keys are detected without scanning the tree.
#[derive(Default)]
struct Assembly {
    epics: HashMap<String, EpicNode>,
    task_owner: HashMap<String, String>,
    subtask_owner: HashMap<String, String>,
}

/// Builds the three-level hierarchy from one flat, already-filtered issue
/// list. Pure computation: no I/O, no failure modes. A missing parent is a
/// data-quality condition, and the issue is dropped from the nested view
/// (it stays reachable through the flat query path). Duplicate keys: the
/// first occurrence wins, later ones are no-ops.
pub fn assemble(issues: &[Issue]) -> Hierarchy {
    let (epics, tasks, subtasks) = partition(issues);
    let mut assembly = Assembly::default();
    seed_epics(&mut assembly, &epics);
    attach_tasks(&mut assembly, &tasks);
    attach_subtasks(&mut assembly, &subtasks);
    assembly.epics
}

fn partition(issues: &[Issue]) -> (Vec<&Issue>, Vec<&Issue>, Vec<&Issue>) {
    let mut epics = Vec::new();
    let mut tasks = Vec::new();
    let mut subtasks = Vec::new();

    for issue in issues {
        match issue.issue_type {
            IssueType::Epic => epics.push(issue),
            IssueType::Task => tasks.push(issue),
            IssueType::Subtask => subtasks.push(issue),
            // Stories and unknown types have no place in the tree.
            IssueType::Story | IssueType::Other => {}
        }
    }

    (epics, tasks, subtasks)
}

fn seed_epics(assembly: &mut Assembly, epics: &[&Issue]) {
    for epic in epics {
        assembly
            .epics
            .entry(epic.key.clone())
            .or_insert_with(|| EpicNode {
                fields: NodeFields::from_issue(epic),
                tasks: HashMap::new(),
            });
    }
}

fn attach_tasks(assembly: &mut Assembly, tasks: &[&Issue]) {
    for task in tasks {
        if assembly.task_owner.contains_key(&task.key) {
            continue;
        }
        let Some(parent) = &task.parent else {
            continue;
        };
        let Some(epic) = assembly.epics.get_mut(parent) else {
            // Orphan: its epic is not in this result set.
            continue;
        };
        epic.tasks.insert(
            task.key.clone(),
            TaskNode {
                fields: NodeFields::from_issue(task),
                subtasks: HashMap::new(),
            },
        );
        assembly.task_owner.insert(task.key.clone(), parent.clone());
    }
}

fn attach_subtasks(assembly: &mut Assembly, subtasks: &[&Issue]) {
    for subtask in subtasks {
        if assembly.subtask_owner.contains_key(&subtask.key) {
            continue;
        }
        let Some(parent) = &subtask.parent else {
            continue;
        };
        let Some(epic_key) = assembly.task_owner.get(parent) else {
            continue;
        };
        let Some(task) = assembly
            .epics
            .get_mut(epic_key)
            .and_then(|epic| epic.tasks.get_mut(parent))
        else {
            continue;
        };
        task.subtasks
            .insert(subtask.key.clone(), NodeFields::from_issue(subtask));
        assembly
            .subtask_owner
            .insert(subtask.key.clone(), parent.clone());
    }
}
