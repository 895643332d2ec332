//! Parse diagnostics for FSH code-system extraction
//!
//! The extractor never fails on malformed input. Anomalies are collected as
//! `(line, reason)` pairs so callers can decide whether to degrade quietly or
//! surface warnings.

mod renderer;

pub use renderer::{DiagnosticRenderer, OutputFormat};

use serde::Serialize;
use std::fmt;

use crate::model::CodeSystemDocument;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Concept field filled from a multi-line block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockField {
    Definition,
    Cql,
}

impl fmt::Display for BlockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockField::Definition => f.write_str("definition"),
            BlockField::Cql => f.write_str("CQL designation"),
        }
    }
}

/// Concept field filled from a `^property` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyField {
    Tables,
    Tabs,
}

impl PropertyField {
    /// Map a property code (`table`, `tab`) to the concept field it fills
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "table" => Some(Self::Tables),
            "tab" => Some(Self::Tabs),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Tables => "table",
            Self::Tabs => "tab",
        }
    }
}

/// What went wrong on a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticReason {
    /// Concept line with fewer than two quoted strings
    MalformedConceptLine { found: usize },
    /// Concept line whose code or display is `""`
    EmptyCodeOrDisplay,
    /// A triple-quoted block was still open at the next concept or end of input
    UnterminatedBlock { field: BlockField },
    /// A `table`/`tab` property code without a `valueString` in its window
    MissingPropertyValue { property: PropertyField },
}

impl DiagnosticReason {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticReason::MalformedConceptLine { .. }
            | DiagnosticReason::EmptyCodeOrDisplay => Severity::Error,
            DiagnosticReason::UnterminatedBlock { .. }
            | DiagnosticReason::MissingPropertyValue { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticReason::MalformedConceptLine { found } => write!(
                f,
                "concept line needs a quoted code and display, found {found} quoted string(s)"
            ),
            DiagnosticReason::EmptyCodeOrDisplay => {
                f.write_str("concept code and display must not be empty")
            }
            DiagnosticReason::UnterminatedBlock { field } => {
                write!(f, "{field} block is missing its closing \"\"\"")
            }
            DiagnosticReason::MissingPropertyValue { property } => write!(
                f,
                "property #\"{}\" has no valueString before the next property or concept",
                property.code()
            ),
        }
    }
}

/// A single `(line, reason)` diagnostic. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub line: usize,
    pub reason: DiagnosticReason,
}

impl ParseDiagnostic {
    pub fn new(line: usize, reason: DiagnosticReason) -> Self {
        Self { line, reason }
    }

    pub fn severity(&self) -> Severity {
        self.reason.severity()
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Error side of a strict parse: every diagnostic plus the partial document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} problem(s) while extracting concepts", .entries.len())]
pub struct ParseDiagnostics {
    pub entries: Vec<ParseDiagnostic>,
    /// What could be extracted despite the problems
    pub document: CodeSystemDocument,
}

impl ParseDiagnostics {
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    /// Give up on strictness and keep the partial document
    pub fn into_document(self) -> CodeSystemDocument {
        self.document
    }
}
