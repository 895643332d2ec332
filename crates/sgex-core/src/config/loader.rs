//! Configuration file discovery and loading

use super::sgex_config::SgexConfig;
use crate::error::SgexError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in discovery priority order
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".sgexrc.json",
    ".sgexrc.toml",
    "sgex.yaml",
    "sgex.yml",
    "sgex.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking up from `start_path`
    ///
    /// Each directory is checked for the names in [`CONFIG_FILE_NAMES`], in
    /// order, until a file is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| SgexError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<SgexConfig> {
        SgexConfig::load(path)
    }

    /// Load from an explicit path, or auto-discover from `start_dir`
    /// (current directory by default).
    ///
    /// An explicit path that does not exist is an error; finding nothing
    /// during discovery yields the default configuration.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<SgexConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(SgexError::config_error(format!(
                    "Config file not found: {}. Run 'sgex config init' to create one.",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(SgexConfig::default())
            }
        }
    }
}
