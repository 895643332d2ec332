//! Loading the DAK code system for a repository branch
//!
//! Every load request takes a [`LoadTicket`] carrying a generation number.
//! Starting a new load (for instance after a branch switch) bumps the
//! generation; a load that completes with an outdated ticket is discarded
//! instead of overwriting the newer view.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::diagnostics::ParseDiagnostic;
use crate::fsh::CodeSystemParser;
use crate::model::{CodeSystemDocument, DAK_CODESYSTEM_PATH, demo_concepts};
use crate::result::Result;
use crate::source::{FshSource, RepoRef};
use crate::staging::StagingGround;
use crate::table::ConceptTable;

/// Where the applied concepts came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewOrigin {
    /// Fetched from the repository
    Remote,
    /// Pending edit in the staging ground
    Staged,
    /// File absent, demonstration dataset substituted
    Demo,
    /// File absent, empty list substituted
    Missing,
}

/// Loader behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Repository-relative code-system path
    pub path: String,
    /// Substitute the demonstration dataset for an absent file
    pub demo_fallback: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            path: DAK_CODESYSTEM_PATH.to_string(),
            demo_fallback: false,
        }
    }
}

/// A parsed code system as currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedView {
    pub repo: RepoRef,
    pub generation: u64,
    pub origin: ViewOrigin,
    /// Text the document was parsed from (absent for fallbacks)
    pub source_text: Option<String>,
    pub document: CodeSystemDocument,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl LoadedView {
    pub fn table(&self) -> ConceptTable {
        ConceptTable::new(self.document.concepts.clone())
    }
}

/// Permission to apply one load result; only the newest ticket wins
#[derive(Debug)]
pub struct LoadTicket {
    repo: RepoRef,
    generation: u64,
}

impl LoadTicket {
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Applied(Arc<LoadedView>),
    /// A newer load started before this one finished
    Stale { generation: u64, current: u64 },
}

impl LoadOutcome {
    pub fn applied(&self) -> Option<&Arc<LoadedView>> {
        match self {
            LoadOutcome::Applied(view) => Some(view),
            LoadOutcome::Stale { .. } => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, LoadOutcome::Stale { .. })
    }
}

#[derive(Default)]
struct LoaderState {
    generation: u64,
    current: Option<Arc<LoadedView>>,
}

pub struct ConceptLoader {
    source: Arc<dyn FshSource>,
    options: LoaderOptions,
    state: Mutex<LoaderState>,
}

impl ConceptLoader {
    pub fn new(source: Arc<dyn FshSource>, options: LoaderOptions) -> Self {
        Self {
            source,
            options,
            state: Mutex::new(LoaderState::default()),
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Start a new generation for `repo`, invalidating outstanding tickets
    pub fn begin(&self, repo: RepoRef) -> LoadTicket {
        let mut state = self.lock();
        state.generation += 1;
        debug!(generation = state.generation, %repo, "begin load");
        LoadTicket {
            repo,
            generation: state.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// The most recently applied view
    pub fn current(&self) -> Option<Arc<LoadedView>> {
        self.lock().current.clone()
    }

    /// Fetch (or take staged text), parse and apply if `ticket` is still current.
    ///
    /// Transport failures are returned as errors unless the ticket went stale
    /// in the meantime. Parse problems never fail; they travel as diagnostics.
    pub async fn load(
        &self,
        ticket: LoadTicket,
        staging: Option<&StagingGround>,
    ) -> Result<LoadOutcome> {
        let staged = staging
            .filter(|ground| ground.repo() == &ticket.repo)
            .and_then(|ground| ground.get(&self.options.path))
            .map(|change| change.content.clone());

        let (origin, text) = match staged {
            Some(text) => (ViewOrigin::Staged, Some(text)),
            None => match self.source.fetch(&ticket.repo, &self.options.path).await {
                Ok(Some(text)) => (ViewOrigin::Remote, Some(text)),
                Ok(None) if self.options.demo_fallback => (ViewOrigin::Demo, None),
                Ok(None) => (ViewOrigin::Missing, None),
                Err(err) => {
                    if let Some(outcome) = self.stale_outcome(&ticket) {
                        debug!("Ignoring error from stale load: {}", err);
                        return Ok(outcome);
                    }
                    return Err(err);
                }
            },
        };

        let (document, diagnostics) = match (&origin, &text) {
            (_, Some(text)) => {
                let outcome = CodeSystemParser::parse(text);
                (outcome.document, outcome.diagnostics)
            }
            (ViewOrigin::Demo, None) => {
                warn!(
                    "{} missing, showing demonstration concepts",
                    self.source.describe(&ticket.repo, &self.options.path)
                );
                (CodeSystemDocument::decision_table(demo_concepts()), Vec::new())
            }
            _ => {
                warn!(
                    "{} missing, showing an empty code system",
                    self.source.describe(&ticket.repo, &self.options.path)
                );
                (CodeSystemDocument::decision_table(Vec::new()), Vec::new())
            }
        };

        let view = Arc::new(LoadedView {
            repo: ticket.repo,
            generation: ticket.generation,
            origin,
            source_text: text,
            document,
            diagnostics,
        });

        Ok(self.apply(view))
    }

    fn apply(&self, view: Arc<LoadedView>) -> LoadOutcome {
        let mut state = self.lock();
        if view.generation != state.generation {
            warn!(
                generation = view.generation,
                current = state.generation,
                "discarding stale load for {}",
                view.repo
            );
            return LoadOutcome::Stale {
                generation: view.generation,
                current: state.generation,
            };
        }

        info!(
            concepts = view.document.len(),
            diagnostics = view.diagnostics.len(),
            origin = ?view.origin,
            "loaded {}",
            view.repo
        );
        state.current = Some(Arc::clone(&view));
        LoadOutcome::Applied(view)
    }

    fn stale_outcome(&self, ticket: &LoadTicket) -> Option<LoadOutcome> {
        let state = self.lock();
        (ticket.generation != state.generation).then_some(LoadOutcome::Stale {
            generation: ticket.generation,
            current: state.generation,
        })
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        // The state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SgexError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Serves fixed text per branch, optionally after a delay
    struct BranchSource {
        files: HashMap<String, (String, u64)>,
    }

    impl BranchSource {
        fn new(entries: &[(&str, &str, u64)]) -> Self {
            Self {
                files: entries
                    .iter()
                    .map(|(branch, text, delay)| {
                        (branch.to_string(), (text.to_string(), *delay))
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl FshSource for BranchSource {
        async fn fetch(&self, repo: &RepoRef, _path: &str) -> Result<Option<String>> {
            match self.files.get(&repo.branch) {
                Some((_, delay)) if *delay == u64::MAX => {
                    Err(SgexError::remote_error(500, "DAK.fsh", "boom"))
                }
                Some((text, delay)) => {
                    tokio::time::sleep(Duration::from_millis(*delay)).await;
                    Ok(Some(text.clone()))
                }
                None => Ok(None),
            }
        }
    }

    fn repo(branch: &str) -> RepoRef {
        RepoRef::new("who", "anc", branch)
    }

    #[tokio::test]
    async fn test_applies_current_generation() {
        let source = Arc::new(BranchSource::new(&[("main", "* #\"A\" \"Alpha\"", 0)]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());

        let ticket = loader.begin(repo("main"));
        let outcome = loader.load(ticket, None).await.unwrap();

        let view = outcome.applied().unwrap();
        assert_eq!(view.origin, ViewOrigin::Remote);
        assert_eq!(view.document.concepts[0].code, "A");
        assert_eq!(loader.current().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn test_superseded_ticket_is_stale() {
        let source = Arc::new(BranchSource::new(&[
            ("main", "* #\"A\" \"Alpha\"", 0),
            ("dev", "* #\"B\" \"Beta\"", 0),
        ]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());

        let old = loader.begin(repo("main"));
        let new = loader.begin(repo("dev"));

        assert!(loader.load(old, None).await.unwrap().is_stale());
        assert!(loader.current().is_none());

        loader.load(new, None).await.unwrap();
        assert_eq!(loader.current().unwrap().repo.branch, "dev");
    }

    #[tokio::test]
    async fn test_slow_stale_fetch_does_not_overwrite() {
        let source = Arc::new(BranchSource::new(&[
            ("main", "* #\"A\" \"Alpha\"", 80),
            ("dev", "* #\"B\" \"Beta\"", 5),
        ]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());

        let slow = loader.begin(repo("main"));
        let fast = loader.begin(repo("dev"));
        let (slow_outcome, fast_outcome) =
            tokio::join!(loader.load(slow, None), loader.load(fast, None));

        assert!(slow_outcome.unwrap().is_stale());
        assert!(!fast_outcome.unwrap().is_stale());
        assert_eq!(loader.current().unwrap().document.concepts[0].code, "B");
    }

    #[tokio::test]
    async fn test_missing_file_fallbacks() {
        let source: Arc<dyn FshSource> = Arc::new(BranchSource::new(&[]));

        let plain = ConceptLoader::new(Arc::clone(&source), LoaderOptions::default());
        let ticket = plain.begin(repo("main"));
        let outcome = plain.load(ticket, None).await.unwrap();
        let view = outcome.applied().unwrap();
        assert_eq!(view.origin, ViewOrigin::Missing);
        assert!(view.document.is_empty());

        let demo = ConceptLoader::new(
            source,
            LoaderOptions {
                demo_fallback: true,
                ..Default::default()
            },
        );
        let ticket = demo.begin(repo("main"));
        let outcome = demo.load(ticket, None).await.unwrap();
        let view = outcome.applied().unwrap();
        assert_eq!(view.origin, ViewOrigin::Demo);
        assert_eq!(view.document.len(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let source = Arc::new(BranchSource::new(&[("main", "", u64::MAX)]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());
        let ticket = loader.begin(repo("main"));
        assert!(loader.load(ticket, None).await.is_err());
    }

    #[tokio::test]
    async fn test_transport_error_on_stale_ticket_is_ignored() {
        let source = Arc::new(BranchSource::new(&[("main", "", u64::MAX)]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());
        let ticket = loader.begin(repo("main"));
        loader.begin(repo("dev"));
        assert!(loader.load(ticket, None).await.unwrap().is_stale());
    }

    #[tokio::test]
    async fn test_staged_text_wins() {
        let source = Arc::new(BranchSource::new(&[("main", "* #\"A\" \"Alpha\"", 0)]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());

        let mut ground = StagingGround::new(repo("main"));
        ground
            .stage(DAK_CODESYSTEM_PATH, "* #\"S\" \"Staged\"\n* #oops", None)
            .unwrap();

        let ticket = loader.begin(repo("main"));
        let outcome = loader.load(ticket, Some(&ground)).await.unwrap();
        let view = outcome.applied().unwrap();
        assert_eq!(view.origin, ViewOrigin::Staged);
        assert_eq!(view.document.concepts[0].code, "S");
        assert_eq!(view.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_staging_for_other_branch_is_ignored() {
        let source = Arc::new(BranchSource::new(&[("main", "* #\"A\" \"Alpha\"", 0)]));
        let loader = ConceptLoader::new(source, LoaderOptions::default());

        let mut ground = StagingGround::new(repo("dev"));
        ground
            .stage(DAK_CODESYSTEM_PATH, "* #\"S\" \"Staged\"", None)
            .unwrap();

        let ticket = loader.begin(repo("main"));
        let outcome = loader.load(ticket, Some(&ground)).await.unwrap();
        assert_eq!(outcome.applied().unwrap().origin, ViewOrigin::Remote);
    }
}
