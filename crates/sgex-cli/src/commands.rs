//! CLI command implementations
//!
//! Top-level commands (concepts, cql, check) are implemented in this file.
//! Commands with several actions live in submodules:
//! - commands/stage.rs - Staging ground (add, list, drop, clear)
//! - commands/config.rs - Configuration management (init, show)

pub mod config;
pub mod stage;

use sgex_core::{
    CodeSystemDocument, CodeSystemParser, ConceptTable, ConfigLoader, FshSource, GitHubSource,
    LoadOutcome, LocalSource, ParseDiagnostic, RepoRef, Result, Session, SgexConfig, SgexError,
    SortDirection, SortField, TableQuery, ViewOrigin,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::output::{ExtractionSummary, OutputFormatter};
use crate::{OutputFormat, RepoArgs};

/// Owner used for sessions over the working directory when no repository is configured
const LOCAL_OWNER: &str = "local";

/// A parsed code system plus what it was parsed from
pub struct Extraction {
    /// File path or `owner/repo@branch:path`
    pub origin: String,
    pub source_text: String,
    pub document: CodeSystemDocument,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Resolve the repository to work on: `--repo`, then the config's `github`
/// section. `None` means the working directory.
pub fn resolve_repo(config: &SgexConfig, target: &RepoArgs) -> Result<Option<RepoRef>> {
    let repo = match &target.repo {
        Some(input) => Some(RepoRef::parse(input, target.branch.as_deref())?),
        None => config.default_repo().map(|repo| match &target.branch {
            Some(branch) => repo.with_branch(branch.as_str()),
            None => repo,
        }),
    };
    Ok(repo)
}

/// Build a session for `target`: GitHub when a repository is known,
/// otherwise the current directory as a checkout.
pub fn open_session(config: &SgexConfig, target: &RepoArgs) -> Result<Session> {
    let (repo, source): (RepoRef, Arc<dyn FshSource>) = match resolve_repo(config, target)? {
        Some(repo) => {
            let token = config.token();
            debug!(
                "Using GitHub source for {} (authenticated: {})",
                repo,
                token.is_some()
            );
            let source = GitHubSource::with_base_url(config.api_base_url(), token)?;
            (repo, Arc::new(source))
        }
        None => {
            let cwd = std::env::current_dir().map_err(|e| SgexError::io_error(".", e))?;
            let name = cwd
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("workspace")
                .to_string();
            let branch = target.branch.clone().unwrap_or_else(|| "main".to_string());
            debug!("Using working directory {} as source", cwd.display());
            (
                RepoRef::new(LOCAL_OWNER, name, branch),
                Arc::new(LocalSource::new(cwd)),
            )
        }
    };

    Session::from_config(source, repo, config)
}

/// Parse `file` directly, or load the configured repository's code system
async fn extract(
    file: Option<PathBuf>,
    target: &RepoArgs,
    config_path: Option<&Path>,
) -> Result<Extraction> {
    if let Some(path) = file {
        debug!("Reading code system from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|e| SgexError::io_error(&path, e))?;
        let outcome = CodeSystemParser::parse(&text);
        return Ok(Extraction {
            origin: path.display().to_string(),
            source_text: text,
            document: outcome.document,
            diagnostics: outcome.diagnostics,
        });
    }

    let config = ConfigLoader::load(config_path, None)?;
    let session = open_session(&config, target)?;

    let view = match session.refresh().await? {
        LoadOutcome::Applied(view) => view,
        LoadOutcome::Stale { generation, current } => {
            return Err(SgexError::internal_error(format!(
                "load {generation} was superseded by load {current}"
            )));
        }
    };

    let mut origin = format!("{}:{}", view.repo, session.codesystem_path());
    match view.origin {
        ViewOrigin::Staged => origin.push_str(" (staged)"),
        ViewOrigin::Demo => origin.push_str(" (missing, demonstration concepts)"),
        ViewOrigin::Missing => origin.push_str(" (missing)"),
        ViewOrigin::Remote => {}
    }
    info!("Loaded {} concepts from {}", view.document.len(), origin);

    Ok(Extraction {
        origin,
        source_text: view.source_text.clone().unwrap_or_default(),
        document: view.document.clone(),
        diagnostics: view.diagnostics.clone(),
    })
}

/// Concepts command implementation
#[allow(clippy::too_many_arguments)]
pub async fn concepts_command(
    file: Option<PathBuf>,
    target: &RepoArgs,
    search: Option<String>,
    sort: Option<SortField>,
    desc: bool,
    format: OutputFormat,
    use_colors: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let extraction = extract(file, target, config_path).await?;
    if !extraction.diagnostics.is_empty() {
        debug!(
            "{} extraction problem(s); run 'sgex check' for details",
            extraction.diagnostics.len()
        );
    }

    let table = ConceptTable::new(extraction.document.concepts);
    let mut query = TableQuery::default();
    if let Some(text) = search {
        query = query.search(text);
    }
    if let Some(field) = sort {
        let direction = if desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        query = query.sort(field, direction);
    }

    let rows = table.view(&query);
    OutputFormatter::new(format, use_colors).print_concepts(&extraction.origin, &rows, table.len())
}

/// CQL command implementation
pub async fn cql_command(
    code: &str,
    file: Option<PathBuf>,
    target: &RepoArgs,
    config_path: Option<&Path>,
) -> Result<()> {
    let extraction = extract(file, target, config_path).await?;
    let table = ConceptTable::new(extraction.document.concepts);

    match table.cql_for(code) {
        Some("") => {
            println!("Concept '{code}' has no CQL expression.");
            Ok(())
        }
        Some(cql) => {
            println!("{cql}");
            Ok(())
        }
        None => Err(SgexError::concept_not_found(code, extraction.origin)),
    }
}

/// Check command implementation: exits with status 1 when any problem is found
pub async fn check_command(
    file: Option<PathBuf>,
    target: &RepoArgs,
    format: OutputFormat,
    use_colors: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let extraction = extract(file, target, config_path).await?;
    let summary = ExtractionSummary::new(extraction.document.len(), &extraction.diagnostics);

    OutputFormatter::new(format, use_colors).print_diagnostics(
        &extraction.origin,
        &extraction.source_text,
        &extraction.diagnostics,
        &summary,
    )?;

    if summary.has_issues() {
        std::process::exit(1);
    }
    Ok(())
}
