//! SGEX Core
//!
//! Concept extraction for WHO SMART Guidelines DAK repositories.
//! This crate reads the FSH code system that lists decision-table concepts,
//! extracts each concept with its definition, table/tab properties and CQL,
//! and provides the table view, repository sources and staging ground the
//! workbench builds on.

pub mod config;
pub mod console; // Terminal console utilities for rich output
pub mod diagnostics;
pub mod error;
pub mod fsh; // Line classifier and extractor state machine
pub mod loader;
pub mod model;
pub mod result;
pub mod session;
pub mod source;
pub mod staging;
pub mod table;

// Re-export commonly used types
pub use config::{ConfigLoader, SgexConfig};
pub use console::{Color, Console};
pub use diagnostics::{
    BlockField, DiagnosticReason, DiagnosticRenderer, OutputFormat, ParseDiagnostic,
    ParseDiagnostics, PropertyField, Severity,
};
pub use error::{ErrorKind, SgexError};
pub use fsh::{CodeSystemParser, ParseOutcome, ParserState, extract_concepts, parse_code_system};
pub use loader::{
    ConceptLoader, LoadOutcome, LoadTicket, LoadedView, LoaderOptions, ViewOrigin,
};
pub use model::{CodeSystemDocument, Concept, DAK_CODESYSTEM_PATH, demo_concepts};
pub use result::{Result, ResultExt};
pub use session::Session;
pub use source::{FshSource, GitHubSource, LocalSource, RepoRef};
pub use staging::{StagedChange, StagingGround, StagingStore};
pub use table::{ConceptTable, SortDirection, SortField, TableQuery};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sgex=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
