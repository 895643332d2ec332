//! Configuration commands

use sgex_core::{ConfigLoader, Result, ResultExt, SgexConfig, SgexError};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::ConfigFormat;

/// Write a default configuration file to the current directory
pub fn init_command(format: ConfigFormat, force: bool) -> Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let filename = match format {
        ConfigFormat::Json => ".sgexrc.json",
        ConfigFormat::Toml => ".sgexrc.toml",
    };
    let config_path = PathBuf::from(filename);

    if config_path.exists() && !force {
        error!(
            "Configuration file '{}' already exists. Use --force to overwrite.",
            filename
        );
        return Err(SgexError::config_error(format!(
            "Configuration file '{filename}' already exists"
        )));
    }

    let content = SgexConfig::default().to_string_for(&config_path)?;
    std::fs::write(&config_path, content).map_err(|e| SgexError::io_error(&config_path, e))?;

    println!("✅ Created configuration file: {filename}");
    println!("   Set github.owner and github.repo to pick the default repository.");
    Ok(())
}

/// Print the effective configuration as JSON
pub fn show_command(config_path: Option<&Path>) -> Result<()> {
    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => ConfigLoader::auto_discover(Path::new("."))
            .log_and_continue()
            .flatten(),
    };
    let config = ConfigLoader::load(config_path, None)?;

    match &discovered {
        Some(path) => println!("Configuration ({}):", path.display()),
        None => println!("Configuration (defaults):"),
    }
    println!("==============");

    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");
    Ok(())
}
