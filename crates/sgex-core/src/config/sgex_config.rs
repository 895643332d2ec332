//! Top-level SGEX configuration
//!
//! ## Example Configuration (sgex.yaml)
//!
//! ```yaml
//! github:
//!   owner: WorldHealthOrganization
//!   repo: smart-anc
//!   branch: main
//!   tokenEnv: GITHUB_TOKEN
//!
//! codesystem:
//!   path: input/fsh/codesystems/DAK.fsh
//!   demoFallback: false
//!
//! staging:
//!   file: .sgex/staging.json
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::sections::{
    CodeSystemConfiguration, DEFAULT_STAGING_FILE, DEFAULT_TOKEN_ENV, GitHubConfiguration,
    StagingConfiguration,
};
use crate::error::SgexError;
use crate::model::DAK_CODESYSTEM_PATH;
use crate::result::Result;
use crate::source::{DEFAULT_BRANCH, GITHUB_API_URL, RepoRef};

/// Section-based configuration; every section is optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SgexConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codesystem: Option<CodeSystemConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<StagingConfiguration>,
}

impl Default for SgexConfig {
    fn default() -> Self {
        Self {
            github: Some(GitHubConfiguration::default()),
            codesystem: Some(CodeSystemConfiguration::default()),
            staging: Some(StagingConfiguration::default()),
        }
    }
}

impl SgexConfig {
    /// Load configuration from a file; the format follows the extension
    /// (`.json`, `.toml`, `.yaml`/`.yml`).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SgexError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let parsed = match ext {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => Err("unsupported file extension (expected .json, .toml, .yaml or .yml)".to_string()),
        };

        parsed.map_err(|message| {
            SgexError::config_error(format!("Failed to parse '{}': {}", path.display(), message))
        })
    }

    /// Serialize in the format matching `path`'s extension
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| SgexError::serialization_error(e.to_string())),
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)
                .map_err(|e| SgexError::serialization_error(e.to_string())),
            _ => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    pub fn github_config(&self) -> GitHubConfiguration {
        self.github.clone().unwrap_or_default()
    }

    pub fn codesystem_config(&self) -> CodeSystemConfiguration {
        self.codesystem.clone().unwrap_or_default()
    }

    pub fn staging_config(&self) -> StagingConfiguration {
        self.staging.clone().unwrap_or_default()
    }

    pub fn api_base_url(&self) -> String {
        self.github_config()
            .api_base_url
            .unwrap_or_else(|| GITHUB_API_URL.to_string())
    }

    pub fn codesystem_path(&self) -> String {
        self.codesystem_config()
            .path
            .unwrap_or_else(|| DAK_CODESYSTEM_PATH.to_string())
    }

    pub fn demo_fallback(&self) -> bool {
        self.codesystem_config().demo_fallback.unwrap_or(false)
    }

    pub fn staging_file(&self) -> PathBuf {
        PathBuf::from(
            self.staging_config()
                .file
                .unwrap_or_else(|| DEFAULT_STAGING_FILE.to_string()),
        )
    }

    /// Repository named in the `github` section, if owner and repo are set
    pub fn default_repo(&self) -> Option<RepoRef> {
        let github = self.github_config();
        Some(RepoRef::new(
            github.owner?,
            github.repo?,
            github.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        ))
    }

    /// Token from the configured environment variable; blank counts as unset
    pub fn token(&self) -> Option<String> {
        let var = self
            .github_config()
            .token_env
            .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());
        std::env::var(var).ok().filter(|t| !t.trim().is_empty())
    }
}
