//! Configuration system for sgex
//!
//! - JSON, TOML and YAML configuration files
//! - Auto-discovery by traversing up directories
//! - Every section optional, with defaults filled in by accessors
//!
//! ## Configuration Files
//!
//! Searched in this order in each directory:
//! `.sgexrc.json`, `.sgexrc.toml`, `sgex.yaml`, `sgex.yml`, `sgex.json`.
//!
//! ## Example Configuration
//!
//! ```json
//! {
//!   "github": {
//!     "owner": "WorldHealthOrganization",
//!     "repo": "smart-anc",
//!     "branch": "main",
//!     "tokenEnv": "GITHUB_TOKEN"
//!   },
//!   "codesystem": {
//!     "path": "input/fsh/codesystems/DAK.fsh",
//!     "demoFallback": false
//!   },
//!   "staging": {
//!     "file": ".sgex/staging.json"
//!   }
//! }
//! ```
//!
//! Tokens are never read from the configuration file, only from the
//! environment variable named by `tokenEnv`.

mod loader;
mod sections;
mod sgex_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use sections::{
    CodeSystemConfiguration, DEFAULT_STAGING_FILE, DEFAULT_TOKEN_ENV, GitHubConfiguration,
    StagingConfiguration,
};
pub use sgex_config::SgexConfig;
