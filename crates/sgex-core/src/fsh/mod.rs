//! FHIR Shorthand code-system extraction
//!
//! Turns the text of a DAK code-system file (`input/fsh/codesystems/DAK.fsh`)
//! into an ordered list of [`Concept`](crate::model::Concept) records:
//!
//! ```text
//! * #"VAR001" "Patient Age"
//! * ^definition = """
//! The age of the patient in years
//! """
//! * ^property[+].code = #"table"
//! * ^property[=].valueString = "Demographics"
//! ```
//!
//! [`line`] classifies each source line; [`parser`] runs the state machine
//! over the classified lines.

pub mod line;
pub mod parser;

pub use line::{LineKind, MalformedConcept, classify, quoted_strings};
pub use parser::{
    CodeSystemParser, ParseOutcome, ParserState, extract_concepts, parse_code_system,
};
