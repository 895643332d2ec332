//! Staging ground: pending file edits that have not been committed yet
//!
//! One [`StagingGround`] belongs to one repository branch. A [`StagingStore`]
//! persists every ground in a single JSON file keyed by `owner/repo@branch`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SgexError;
use crate::result::Result;
use crate::source::RepoRef;

/// One pending edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedChange {
    pub path: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub staged_at: DateTime<Utc>,
}

/// Pending edits for one repository branch, in staging order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingGround {
    repo: RepoRef,
    changes: IndexMap<String, StagedChange>,
}

impl StagingGround {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            changes: IndexMap::new(),
        }
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Stage `content` for `path`, replacing any earlier edit of the same
    /// path while keeping its position.
    pub fn stage(
        &mut self,
        path: &str,
        content: impl Into<String>,
        message: Option<String>,
    ) -> Result<&StagedChange> {
        let path = normalize_path(path)?;
        debug!("Staging {} for {}", path, self.repo);
        let change = StagedChange {
            path: path.clone(),
            content: content.into(),
            message,
            staged_at: Utc::now(),
        };
        self.changes.insert(path.clone(), change);
        self.changes
            .get(&path)
            .ok_or_else(|| SgexError::internal_error("staged change vanished"))
    }

    /// Drop the pending edit for `path`; returns it when there was one
    pub fn unstage(&mut self, path: &str) -> Option<StagedChange> {
        let key = normalize_path(path).ok()?;
        self.changes.shift_remove(&key)
    }

    pub fn get(&self, path: &str) -> Option<&StagedChange> {
        let key = normalize_path(path).ok()?;
        self.changes.get(&key)
    }

    pub fn list(&self) -> impl Iterator<Item = &StagedChange> {
        self.changes.values()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        return Err(SgexError::staging_error(format!(
            "'{path}' is not a repository file path"
        )));
    }
    Ok(trimmed.to_string())
}

/// JSON file holding the staging grounds of every repository branch
#[derive(Debug, Clone)]
pub struct StagingStore {
    path: PathBuf,
}

impl StagingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ground for `repo`; empty when the file or the entry does not exist
    pub fn load(&self, repo: &RepoRef) -> Result<StagingGround> {
        let mut all = self.read_all()?;
        Ok(all
            .remove(&repo.to_string())
            .unwrap_or_else(|| StagingGround::new(repo.clone())))
    }

    /// Persist `ground`, leaving other repositories' grounds untouched.
    /// An empty ground removes its entry.
    pub fn save(&self, ground: &StagingGround) -> Result<()> {
        let mut all = self.read_all()?;
        let key = ground.repo.to_string();
        if ground.is_empty() {
            all.remove(&key);
        } else {
            all.insert(key, ground.clone());
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SgexError::io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, json).map_err(|e| SgexError::io_error(&self.path, e))?;
        debug!("Saved staging ground to {}", self.path.display());
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, StagingGround>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(SgexError::io_error(&self.path, err)),
        };

        serde_json::from_str(&text).map_err(|e| {
            SgexError::staging_error(format!(
                "Failed to read staging file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
