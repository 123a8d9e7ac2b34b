use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub jira: JiraConfig,
    #[serde(default)]
    pub fields: FieldConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Atlassian site name: the `<domain>` in https://<domain>.atlassian.net
    pub domain: String,
    /// Account email used for basic auth alongside the API token.
    pub email: String,
}

/// Custom-field ids vary per Jira site, so both are configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default = "default_epic_link_field")]
    pub epic_link: String,
    #[serde(default = "default_start_date_field")]
    pub start_date: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            epic_link: default_epic_link_field(),
            start_date: default_start_date_field(),
        }
    }
}

fn default_epic_link_field() -> String {
    "customfield_10014".to_string()
}
fn default_start_date_field() -> String {
    "customfield_10015".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ViewError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jira.domain.is_empty() {
            return Err(ViewError::Config("jira.domain is empty".into()));
        }
        if self.jira.domain.contains('.') {
            return Err(ViewError::Config(format!(
                "jira.domain must be the site name, not a hostname: {}",
                self.jira.domain
            )));
        }
        if !self.jira.email.contains('@') {
            return Err(ViewError::Config(format!(
                "jira.email does not look like an email address: {}",
                self.jira.email
            )));
        }
        Ok(())
    }
}
