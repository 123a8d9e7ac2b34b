//! Serde models for the Jira Cloud search payload and their mapping onto
//! the domain record.
//!
//! Every field the remote API may send as null is optional here; mapping
//! never fails, it degrades to defaults (empty strings, `None` dates, the
//! assignee sentinel).

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::config::FieldConfig;
use crate::issue::{Issue, IssueType, UNASSIGNED};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFields {
    #[serde(default)]
    pub summary: String,
    pub description: Option<Value>,
    pub issuetype: Option<Named>,
    pub status: Option<Named>,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub priority: Option<Named>,
    pub parent: Option<ParentRef>,
    pub duedate: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub timespent: Option<i64>,
    pub components: Option<Vec<Named>>,
    pub labels: Option<Vec<String>>,
    /// Site-specific custom fields (epic link, start date) land here.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct User {
    #[serde(default, rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ParentRef {
    pub key: String,
}

impl RawIssue {
    pub fn into_issue(self, fields_config: &FieldConfig) -> Issue {
        let fields = self.fields;

        let issue_type = fields
            .issuetype
            .map(|t| IssueType::from_name(&t.name))
            .unwrap_or_default();

        // Subtasks carry `parent.key`; tasks reference their epic through
        // the site's epic-link custom field.
        let parent = fields
            .parent
            .map(|p| p.key)
            .or_else(|| string_field(&fields.extra, &fields_config.epic_link));

        let assignee = fields
            .assignee
            .map(|u| u.display_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNASSIGNED.to_string());

        let start_date = string_field(&fields.extra, &fields_config.start_date)
            .as_deref()
            .and_then(parse_date);

        Issue {
            key: self.key,
            summary: fields.summary,
            description: fields
                .description
                .as_ref()
                .map(flatten_text)
                .unwrap_or_default(),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            assignee,
            issue_type,
            parent,
            reporter: fields.reporter.map(|u| u.display_name).unwrap_or_default(),
            priority: fields.priority.map(|p| p.name).unwrap_or_default(),
            start_date,
            due_date: fields.duedate.as_deref().and_then(parse_date),
            created: fields.created,
            updated: fields.updated,
            time_spent: fields.timespent,
            components: fields
                .components
                .unwrap_or_default()
                .into_iter()
                .map(|c| c.name)
                .collect(),
            labels: fields.labels.unwrap_or_default(),
        }
    }
}

fn string_field(extra: &HashMap<String, Value>, name: &str) -> Option<String> {
    match extra.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Unparseable or absent dates become `None`, never errors.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Flattens an Atlassian document-format description to plain text by
/// collecting the text leaves. Plain-string descriptions (API v2 payloads)
/// pass through as-is.
fn flatten_text(value: &Value) -> String {
    let mut out = String::new();
    collect_text(value, &mut out);
    out
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
            if let Some(Value::Array(children)) = map.get("content") {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_config() -> FieldConfig {
        FieldConfig::default()
    }

    fn parse_one(payload: Value) -> Issue {
        let response: SearchResponse = serde_json::from_value(payload).expect("parse payload");
        let raw = response.issues.into_iter().next().expect("one issue");
        raw.into_issue(&field_config())
    }

    #[test]
    fn test_maps_populated_fields() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-7",
                "fields": {
                    "summary": "Wire up the board",
                    "issuetype": {"name": "Task"},
                    "status": {"name": "In Progress"},
                    "assignee": {"displayName": "Mina"},
                    "reporter": {"displayName": "Jun"},
                    "priority": {"name": "High"},
                    "duedate": "2024-11-30",
                    "created": "2024-10-01T10:30:00.000+0900",
                    "timespent": 5400,
                    "components": [{"name": "backend"}],
                    "labels": ["dashboard"],
                    "customfield_10014": "PROJ-1",
                    "customfield_10015": "2024-10-15"
                }
            }]
        }));

        assert_eq!(issue.key, "PROJ-7");
        assert_eq!(issue.issue_type, IssueType::Task);
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.assignee, "Mina");
        assert_eq!(issue.parent.as_deref(), Some("PROJ-1"));
        assert_eq!(issue.due_date, NaiveDate::from_ymd_opt(2024, 11, 30));
        assert_eq!(issue.start_date, NaiveDate::from_ymd_opt(2024, 10, 15));
        assert_eq!(issue.created.as_deref(), Some("2024-10-01T10:30:00.000+0900"));
        assert_eq!(issue.time_spent, Some(5400));
        assert_eq!(issue.components, vec!["backend".to_string()]);
    }

    #[test]
    fn test_null_fields_degrade_to_defaults() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-8",
                "fields": {
                    "summary": "Nobody owns this",
                    "issuetype": {"name": "Sub-task"},
                    "status": null,
                    "assignee": null,
                    "duedate": null
                }
            }]
        }));

        assert_eq!(issue.issue_type, IssueType::Subtask);
        assert_eq!(issue.assignee, UNASSIGNED);
        assert_eq!(issue.status, "");
        assert_eq!(issue.due_date, None);
        assert!(issue.components.is_empty());
    }

    #[test]
    fn test_subtask_parent_comes_from_parent_key() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-9",
                "fields": {
                    "summary": "child",
                    "issuetype": {"name": "Sub-task"},
                    "parent": {"key": "PROJ-7"},
                    "customfield_10014": "PROJ-1"
                }
            }]
        }));

        // parent.key wins over the epic-link field when both are present
        assert_eq!(issue.parent.as_deref(), Some("PROJ-7"));
    }

    #[test]
    fn test_unknown_type_maps_to_other() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-10",
                "fields": {"summary": "x", "issuetype": {"name": "Bug"}}
            }]
        }));

        assert_eq!(issue.issue_type, IssueType::Other);
        assert_eq!(issue.parent, None);
    }

    #[test]
    fn test_malformed_date_becomes_none() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-11",
                "fields": {
                    "summary": "x",
                    "issuetype": {"name": "Task"},
                    "duedate": "soon",
                    "customfield_10015": "2024/01/01"
                }
            }]
        }));

        assert_eq!(issue.due_date, None);
        assert_eq!(issue.start_date, None);
    }

    #[test]
    fn test_flattens_document_format_description() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-12",
                "fields": {
                    "summary": "x",
                    "issuetype": {"name": "Epic"},
                    "description": {
                        "type": "doc",
                        "content": [
                            {"type": "paragraph", "content": [
                                {"type": "text", "text": "First line."},
                                {"type": "text", "text": "Second."}
                            ]},
                            {"type": "paragraph", "content": [
                                {"type": "text", "text": "Third."}
                            ]}
                        ]
                    }
                }
            }]
        }));

        assert_eq!(issue.description, "First line. Second. Third.");
    }

    #[test]
    fn test_plain_string_description_passes_through() {
        let issue = parse_one(json!({
            "issues": [{
                "key": "PROJ-13",
                "fields": {
                    "summary": "x",
                    "issuetype": {"name": "Task"},
                    "description": "just text"
                }
            }]
        }));

        assert_eq!(issue.description, "just text");
    }

    #[test]
    fn test_empty_response() {
        let response: SearchResponse = serde_json::from_value(json!({})).expect("parse");
        assert!(response.issues.is_empty());
    }
}
