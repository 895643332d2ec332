//! Configuration sections used by [`SgexConfig`](super::SgexConfig)

use serde::{Deserialize, Serialize};

use crate::model::DAK_CODESYSTEM_PATH;
use crate::source::{DEFAULT_BRANCH, GITHUB_API_URL};

/// Name of the environment variable holding the GitHub token by default
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Default location of the staging file, relative to the working directory
pub const DEFAULT_STAGING_FILE: &str = ".sgex/staging.json";

/// Repository host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfiguration {
    /// REST API root (GitHub Enterprise installs differ)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Default repository owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Default repository name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Default branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Environment variable that holds the personal access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// Where the DAK code system lives and how to behave when it is missing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConfiguration {
    /// Repository-relative path of the FSH code-system file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Show demonstration concepts when the file is absent (test environments)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_fallback: Option<bool>,
}

/// Staging ground persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StagingConfiguration {
    /// JSON file holding pending edits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for GitHubConfiguration {
    fn default() -> Self {
        Self {
            api_base_url: Some(GITHUB_API_URL.to_string()),
            owner: None,
            repo: None,
            branch: Some(DEFAULT_BRANCH.to_string()),
            token_env: Some(DEFAULT_TOKEN_ENV.to_string()),
        }
    }
}

impl Default for CodeSystemConfiguration {
    fn default() -> Self {
        Self {
            path: Some(DAK_CODESYSTEM_PATH.to_string()),
            demo_fallback: Some(false),
        }
    }
}

impl Default for StagingConfiguration {
    fn default() -> Self {
        Self {
            file: Some(DEFAULT_STAGING_FILE.to_string()),
        }
    }
}
