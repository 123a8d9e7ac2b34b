//! JQL construction and the query surface the CLI talks to.

use std::future::Future;

use tracing::error;

use crate::error::Result;
use crate::hierarchy::{self, Hierarchy};
use crate::issue::{Issue, IssueType};

/// The one collaborator the service consumes. Transport, auth and response
/// mapping live behind it; errors from it propagate untranslated.
pub trait IssueSource: Send + Sync {
    fn fetch_issues(&self, jql: &str) -> impl Future<Output = Result<Vec<Issue>>> + Send;
}

pub struct IssueService<S> {
    source: S,
}

impl<S: IssueSource> IssueService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn issues_by_type(
        &self,
        project: &str,
        issue_type: IssueType,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        let jql = build_jql(project, Some(issue_type), assignees, extra_jql);
        self.source.fetch_issues(&jql).await
    }

    pub async fn epics(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        self.issues_by_type(project, IssueType::Epic, assignees, extra_jql)
            .await
    }

    pub async fn tasks(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        self.issues_by_type(project, IssueType::Task, assignees, extra_jql)
            .await
    }

    pub async fn subtasks(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        self.issues_by_type(project, IssueType::Subtask, assignees, extra_jql)
            .await
    }

    pub async fn stories(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        self.issues_by_type(project, IssueType::Story, assignees, extra_jql)
            .await
    }

    /// Fetches the whole project in one round trip, with no type clause.
    pub async fn all_project_issues(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Vec<Issue>> {
        let jql = build_jql(project, None, assignees, extra_jql);
        self.source.fetch_issues(&jql).await
    }

    /// One unfiltered-by-type fetch, then pure in-memory assembly. A failed
    /// fetch fails the whole call: no partial hierarchies.
    pub async fn hierarchical_issues(
        &self,
        project: &str,
        assignees: &[String],
        extra_jql: Option<&str>,
    ) -> Result<Hierarchy> {
        let issues = self
            .all_project_issues(project, assignees, extra_jql)
            .await
            .inspect_err(|e| error!("hierarchy fetch failed for {project}: {e}"))?;

        Ok(hierarchy::assemble(&issues))
    }
}

/// Synthesizes the filter expression. Blank assignees are dropped; the
/// extra clause is appended verbatim, so callers supply their own AND/OR.
fn build_jql(
    project: &str,
    issue_type: Option<IssueType>,
    assignees: &[String],
    extra_jql: Option<&str>,
) -> String {
    let mut jql = format!("project = \"{project}\"");

    if let Some(issue_type) = issue_type {
        jql.push_str(&format!(" AND issuetype = \"{}\"", issue_type.jql_name()));
    }

    let assignees: Vec<&String> = assignees.iter().filter(|a| !a.is_empty()).collect();
    if !assignees.is_empty() {
        let clause = assignees
            .iter()
            .map(|a| format!("assignee = \"{a}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        jql.push_str(&format!(" AND ({clause})"));
    }

    if let Some(extra) = extra_jql {
        jql.push(' ');
        jql.push_str(extra);
    }

    jql
}
