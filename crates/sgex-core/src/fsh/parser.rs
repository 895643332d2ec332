//! Concept extraction from FSH code-system sources
//!
//! A single pass over classified lines drives a three-state machine:
//!
//! - [`ParserState::ScanningTop`]: between rules, looking for concept starts,
//!   block openers and `^property` pairs
//! - [`ParserState::InDefinition`]: collecting a `^definition` block (lines trimmed)
//! - [`ParserState::InCql`]: collecting a `^designation[+].value` block
//!   (indentation kept)
//!
//! A `* ^property[+].code = #"table"` (or `#"tab"`) line arms a pending
//! property. The next `^property[=].valueString` fills it, while any
//! `* ^property[+]` or `* #` line disarms it first.

use tracing::{debug, trace};

use super::line::{self, LineKind, MalformedConcept};
use crate::diagnostics::{
    BlockField, DiagnosticReason, ParseDiagnostic, ParseDiagnostics, PropertyField,
};
use crate::model::{CodeSystemDocument, Concept};

/// Parser state between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    ScanningTop,
    InDefinition,
    InCql,
}

impl ParserState {
    fn field(self) -> Option<BlockField> {
        match self {
            ParserState::ScanningTop => None,
            ParserState::InDefinition => Some(BlockField::Definition),
            ParserState::InCql => Some(BlockField::Cql),
        }
    }
}

/// Result of a lenient parse: everything extracted plus what went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub document: CodeSystemDocument,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Strict view: `Err` as soon as any diagnostic was recorded
    pub fn into_result(self) -> Result<CodeSystemDocument, ParseDiagnostics> {
        if self.diagnostics.is_empty() {
            Ok(self.document)
        } else {
            Err(ParseDiagnostics {
                entries: self.diagnostics,
                document: self.document,
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingProperty {
    field: PropertyField,
    line: usize,
}

/// Incremental concept extractor. Feed lines in order, then [`finish`].
///
/// [`finish`]: CodeSystemParser::finish
#[derive(Debug)]
pub struct CodeSystemParser {
    state: ParserState,
    concepts: Vec<Concept>,
    /// Index of the concept receiving rules; `None` before the first concept
    /// and after a malformed concept line.
    current: Option<usize>,
    block: Vec<String>,
    block_start: usize,
    pending: Option<PendingProperty>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Default for CodeSystemParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSystemParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::ScanningTop,
            concepts: Vec::new(),
            current: None,
            block: Vec::new(),
            block_start: 0,
            pending: None,
            diagnostics: Vec::new(),
        }
    }

    /// Parse a whole source text. A leading byte-order mark is skipped.
    pub fn parse(text: &str) -> ParseOutcome {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut parser = Self::new();
        for (index, line) in text.lines().enumerate() {
            parser.feed_line(index + 1, line);
        }
        parser.finish()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Process one line. `line_no` is 1-based and only used for diagnostics.
    pub fn feed_line(&mut self, line_no: usize, line: &str) {
        if line::is_concept_start(line) {
            self.start_concept(line_no, line);
            return;
        }

        if self.state != ParserState::ScanningTop {
            self.collect_block_line(line);
            return;
        }

        if self.current.is_none() {
            return;
        }

        if line::is_property_boundary(line) {
            self.disarm_property();
        }

        match line::classify(line) {
            LineKind::DefinitionOpen { rest } => {
                self.open_block(ParserState::InDefinition, line_no, rest)
            }
            LineKind::DesignationOpen { rest } => self.open_block(ParserState::InCql, line_no, rest),
            LineKind::PropertyCode { code } => {
                self.pending = PropertyField::from_code(&code)
                    .map(|field| PendingProperty { field, line: line_no });
            }
            LineKind::PropertyValueString { value } => {
                if let Some(pending) = self.pending.take() {
                    trace!(line = line_no, property = pending.field.code(), "property value");
                    self.assign_property(pending.field, value);
                }
            }
            _ => {}
        }
    }

    /// Flush open state and return what was extracted
    pub fn finish(mut self) -> ParseOutcome {
        self.close_unterminated_block();
        self.disarm_property();

        debug!(
            concepts = self.concepts.len(),
            diagnostics = self.diagnostics.len(),
            "Extracted code-system concepts"
        );

        ParseOutcome {
            document: CodeSystemDocument::decision_table(self.concepts),
            diagnostics: self.diagnostics,
        }
    }

    fn start_concept(&mut self, line_no: usize, line: &str) {
        self.close_unterminated_block();
        self.disarm_property();

        match line::classify(line) {
            LineKind::ConceptStart { code, display } => {
                trace!(line = line_no, %code, "concept start");
                self.concepts.push(Concept {
                    code,
                    display,
                    line: line_no,
                    ..Default::default()
                });
                self.current = Some(self.concepts.len() - 1);
            }
            LineKind::MalformedConceptStart(problem) => {
                let reason = match problem {
                    MalformedConcept::TooFewQuoted(found) => {
                        DiagnosticReason::MalformedConceptLine { found }
                    }
                    MalformedConcept::EmptyValue => DiagnosticReason::EmptyCodeOrDisplay,
                };
                debug!(line = line_no, %reason, "skipping concept line");
                self.diagnostics.push(ParseDiagnostic::new(line_no, reason));
                self.current = None;
            }
            // is_concept_start and classify agree on the `* #` prefix
            _ => {}
        }
    }

    fn open_block(&mut self, state: ParserState, line_no: usize, rest: &str) {
        if let Some(single) = line::closing_delimiter(rest) {
            let value = normalize(state, single).unwrap_or_default();
            self.assign_block(state, value);
            return;
        }

        self.block.clear();
        self.block_start = line_no;
        if let Some(first) = normalize(state, rest) {
            self.block.push(first);
        }
        self.state = state;
    }

    fn collect_block_line(&mut self, line: &str) {
        match line::closing_delimiter(line) {
            Some(last) => {
                if let Some(last) = normalize(self.state, last) {
                    self.block.push(last);
                }
                self.flush_block();
            }
            None => {
                let captured = match self.state {
                    ParserState::InDefinition => line.trim().to_string(),
                    _ => line.to_string(),
                };
                self.block.push(captured);
            }
        }
    }

    fn close_unterminated_block(&mut self) {
        if let Some(field) = self.state.field() {
            self.diagnostics.push(ParseDiagnostic::new(
                self.block_start,
                DiagnosticReason::UnterminatedBlock { field },
            ));
            self.flush_block();
        }
    }

    fn flush_block(&mut self) {
        let state = self.state;
        let lines = std::mem::take(&mut self.block);
        self.state = ParserState::ScanningTop;
        self.assign_block(state, join_block(state, &lines));
    }

    fn assign_block(&mut self, state: ParserState, value: String) {
        let Some(concept) = self.current.and_then(|i| self.concepts.get_mut(i)) else {
            return;
        };
        match state {
            ParserState::InDefinition => concept.definition = value,
            ParserState::InCql => concept.cql = value,
            ParserState::ScanningTop => {}
        }
    }

    fn assign_property(&mut self, field: PropertyField, value: String) {
        let Some(concept) = self.current.and_then(|i| self.concepts.get_mut(i)) else {
            return;
        };
        match field {
            PropertyField::Tables => concept.tables = value,
            PropertyField::Tabs => concept.tabs = value,
        }
    }

    fn disarm_property(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.diagnostics.push(ParseDiagnostic::new(
                pending.line,
                DiagnosticReason::MissingPropertyValue {
                    property: pending.field,
                },
            ));
        }
    }
}

/// Partial content on an opening or closing delimiter line; `None` when blank
fn normalize(state: ParserState, text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    match state {
        ParserState::InDefinition => Some(text.trim().to_string()),
        _ => Some(text.to_string()),
    }
}

/// Join captured lines. Definitions are trimmed as a whole; CQL is kept
/// verbatim, blank lines included.
fn join_block(state: ParserState, lines: &[String]) -> String {
    match state {
        ParserState::InDefinition => lines.join("\n").trim().to_string(),
        _ => lines.join("\n"),
    }
}

/// Parse strictly: any diagnostic turns the result into `Err`, which still
/// carries the partial document.
pub fn parse_code_system(text: &str) -> Result<CodeSystemDocument, ParseDiagnostics> {
    CodeSystemParser::parse(text).into_result()
}

/// Parse leniently and keep only the concepts
pub fn extract_concepts(text: &str) -> Vec<Concept> {
    CodeSystemParser::parse(text).document.concepts
}
