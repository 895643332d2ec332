//! Staging ground commands
//!
//! Edits are keyed by repository and branch in the staging file configured
//! under `staging.file`. Staged content of the code-system path replaces the
//! remote file when concepts are listed or checked.

use colored::*;
use sgex_core::{ConfigLoader, Result, SgexError};
use std::path::Path;
use tracing::debug;

use super::open_session;
use crate::RepoArgs;

/// Stage the content of `file` for repository `path`
pub fn add_command(
    path: &str,
    file: &Path,
    message: Option<String>,
    target: &RepoArgs,
    config_path: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(file).map_err(|e| SgexError::io_error(file, e))?;
    let config = ConfigLoader::load(config_path, None)?;
    let mut session = open_session(&config, target)?;

    let change = session.stage(path, content, message)?;
    debug!("Staged {} bytes for {}", change.content.len(), change.path);

    println!(
        "{} Staged {} for {}",
        "✓".green(),
        change.path.bold(),
        session.repo()
    );
    Ok(())
}

/// List staged edits for the target repository
pub fn list_command(target: &RepoArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    let session = open_session(&config, target)?;
    let staging = session.staging();

    if staging.is_empty() {
        println!("No staged changes for {}", session.repo());
        return Ok(());
    }

    println!("Staged changes for {}:", session.repo().to_string().bold());
    for change in staging.list() {
        let when = change.staged_at.format("%Y-%m-%d %H:%M UTC");
        match &change.message {
            Some(message) => println!("  {}  {}  {}", change.path, when.to_string().dimmed(), message),
            None => println!("  {}  {}", change.path, when.to_string().dimmed()),
        }
    }
    println!("\nTotal: {} staged change(s)", staging.len());
    Ok(())
}

/// Drop the staged edit of `path`
pub fn drop_command(path: &str, target: &RepoArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    let mut session = open_session(&config, target)?;

    match session.unstage(path)? {
        Some(change) => println!("Unstaged {}", change.path),
        None => println!("Nothing staged for {path}"),
    }
    Ok(())
}

/// Drop every staged edit for the target repository
pub fn clear_command(target: &RepoArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    let mut session = open_session(&config, target)?;

    let dropped = session.clear_staging()?;
    println!("Dropped {dropped} staged change(s) for {}", session.repo());
    Ok(())
}
