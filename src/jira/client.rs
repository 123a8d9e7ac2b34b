use reqwest::Client;
use tracing::info;

use crate::config::{Config, FieldConfig};
use crate::error::{Result, ViewError};
use crate::issue::Issue;
use crate::jira::api::SearchResponse;
use crate::service::IssueSource;

/// Single-page result cap: one project view is one fetch, no pagination.
const MAX_RESULTS: &str = "1000";

pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    api_token: String,
    fields: FieldConfig,
}

impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_token = std::env::var("JIRA_API_TOKEN")
            .map_err(|_| ViewError::Jira("JIRA_API_TOKEN not set".into()))?;

        Ok(Self {
            http: Client::new(),
            base_url: format!("https://{}.atlassian.net/rest/api/3", config.jira.domain),
            email: config.jira.email.clone(),
            api_token,
            fields: config.fields.clone(),
        })
    }
}

impl IssueSource for JiraClient {
    async fn fetch_issues(&self, jql: &str) -> Result<Vec<Issue>> {
        info!("fetching issues: {jql}");

        let url = format!("{}/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&[("jql", jql), ("maxResults", MAX_RESULTS)])
            .send()
            .await?
            .error_for_status()?;

        let payload: SearchResponse = response.json().await?;
        let issues: Vec<Issue> = payload
            .issues
            .into_iter()
            .map(|raw| raw.into_issue(&self.fields))
            .collect();

        info!("found {} issues", issues.len());
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JiraConfig;

    fn config() -> Config {
        Config {
            jira: JiraConfig {
                domain: "acme".into(),
                email: "dev@acme.io".into(),
            },
            fields: FieldConfig::default(),
        }
    }

    #[test]
    fn test_base_url_from_domain() {
        std::env::set_var("JIRA_API_TOKEN", "token");
        let client = JiraClient::new(&config()).expect("client");
        assert_eq!(client.base_url, "https://acme.atlassian.net/rest/api/3");
    }
}
