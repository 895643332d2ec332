//! Explicit session context
//!
//! A [`Session`] owns the selected repository, its staging ground and the
//! concept loader. Callers pass it around instead of reaching for shared
//! globals; switching branch or repository starts a new load generation.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SgexConfig;
use crate::loader::{ConceptLoader, LoadOutcome, LoadTicket, LoadedView, LoaderOptions};
use crate::result::Result;
use crate::source::{FshSource, RepoRef};
use crate::staging::{StagedChange, StagingGround, StagingStore};

pub struct Session {
    repo: RepoRef,
    loader: ConceptLoader,
    staging: StagingGround,
    store: Option<StagingStore>,
}

impl Session {
    pub fn new(source: Arc<dyn FshSource>, repo: RepoRef, options: LoaderOptions) -> Self {
        Self {
            staging: StagingGround::new(repo.clone()),
            repo,
            loader: ConceptLoader::new(source, options),
            store: None,
        }
    }

    /// Session wired from configuration: code-system path, demo fallback
    /// and the persisted staging ground for `repo`.
    pub fn from_config(
        source: Arc<dyn FshSource>,
        repo: RepoRef,
        config: &SgexConfig,
    ) -> Result<Self> {
        let options = LoaderOptions {
            path: config.codesystem_path(),
            demo_fallback: config.demo_fallback(),
        };
        Self::new(source, repo, options).with_staging_store(StagingStore::new(config.staging_file()))
    }

    /// Persist the staging ground through `store`, loading what it holds
    /// for the current repository.
    pub fn with_staging_store(mut self, store: StagingStore) -> Result<Self> {
        self.staging = store.load(&self.repo)?;
        self.store = Some(store);
        Ok(self)
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn loader(&self) -> &ConceptLoader {
        &self.loader
    }

    pub fn codesystem_path(&self) -> &str {
        &self.loader.options().path
    }

    pub fn staging(&self) -> &StagingGround {
        &self.staging
    }

    /// The most recently applied view
    pub fn current(&self) -> Option<Arc<LoadedView>> {
        self.loader.current()
    }

    /// Move to another branch of the same repository.
    ///
    /// Outstanding loads become stale; the staging ground follows the branch.
    pub fn switch_branch(&mut self, branch: &str) -> Result<LoadTicket> {
        let repo = self.repo.with_branch(branch);
        self.switch_repo(repo)
    }

    /// Move to another repository (or branch)
    pub fn switch_repo(&mut self, repo: RepoRef) -> Result<LoadTicket> {
        info!("Switching from {} to {}", self.repo, repo);
        self.staging = match &self.store {
            Some(store) => store.load(&repo)?,
            None => StagingGround::new(repo.clone()),
        };
        self.repo = repo;
        Ok(self.loader.begin(self.repo.clone()))
    }

    /// Start a load of the current repository without awaiting it
    pub fn begin_refresh(&self) -> LoadTicket {
        self.loader.begin(self.repo.clone())
    }

    /// Complete a load started by [`begin_refresh`](Self::begin_refresh) or a switch
    pub async fn complete(&self, ticket: LoadTicket) -> Result<LoadOutcome> {
        self.loader.load(ticket, Some(&self.staging)).await
    }

    /// Reload the code system for the current repository
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let ticket = self.begin_refresh();
        self.complete(ticket).await
    }

    /// Stage an edit for the current repository and persist it
    pub fn stage(
        &mut self,
        path: &str,
        content: impl Into<String>,
        message: Option<String>,
    ) -> Result<StagedChange> {
        let change = self.staging.stage(path, content, message)?.clone();
        self.persist()?;
        Ok(change)
    }

    pub fn unstage(&mut self, path: &str) -> Result<Option<StagedChange>> {
        let removed = self.staging.unstage(path);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn clear_staging(&mut self) -> Result<usize> {
        let count = self.staging.len();
        self.staging.clear();
        self.persist()?;
        Ok(count)
    }

    fn persist(&self) -> Result<()> {
        match &self.store {
            Some(store) => {
                debug!("Persisting staging ground to {}", store.path().display());
                store.save(&self.staging)
            }
            None => Ok(()),
        }
    }
}
