use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel assignee for issues nobody owns. Downstream consumers match on
/// the literal string, so this is part of the serialized contract.
pub const UNASSIGNED: &str = "Unassigned";

/// Issue-type vocabulary. Only Epic, Task and Subtask participate in
/// hierarchy nesting; Story and everything else stay flat-query-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IssueType {
    Epic,
    Task,
    Subtask,
    Story,
    #[default]
    Other,
}

impl IssueType {
    /// Maps a remote type name. Jira Cloud spells subtasks "Sub-task".
    pub fn from_name(name: &str) -> Self {
        match name {
            "Epic" => IssueType::Epic,
            "Task" => IssueType::Task,
            "Subtask" | "Sub-task" => IssueType::Subtask,
            "Story" => IssueType::Story,
            _ => IssueType::Other,
        }
    }

    /// Type name as it appears in a JQL `issuetype` clause.
    pub fn jql_name(&self) -> &'static str {
        match self {
            IssueType::Epic => "Epic",
            IssueType::Task => "Task",
            IssueType::Subtask => "Subtask",
            IssueType::Story => "Story",
            IssueType::Other => "Issue",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_assignee")]
    pub assignee: String,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
    /// Key of the logically-containing issue. Meaningful only for Task
    /// (owning epic) and Subtask (owning task).
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub reporter: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub time_spent: Option<i64>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_assignee() -> String {
    UNASSIGNED.to_string()
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_name() {
        assert_eq!(IssueType::from_name("Epic"), IssueType::Epic);
        assert_eq!(IssueType::from_name("Sub-task"), IssueType::Subtask);
        assert_eq!(IssueType::from_name("Subtask"), IssueType::Subtask);
        assert_eq!(IssueType::from_name("Bug"), IssueType::Other);
    }

    #[test]
    fn test_display() {
        let issue = Issue {
            key: "PROJ-1".into(),
            summary: "Ship the dashboard".into(),
            description: String::new(),
            status: "In Progress".into(),
            assignee: UNASSIGNED.into(),
            issue_type: IssueType::Epic,
            parent: None,
            reporter: String::new(),
            priority: String::new(),
            start_date: None,
            due_date: None,
            created: None,
            updated: None,
            time_spent: None,
            components: vec![],
            labels: vec![],
        };
        assert_eq!(issue.to_string(), "PROJ-1: Ship the dashboard");
    }
}
