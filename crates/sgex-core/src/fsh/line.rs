//! Line classifier for FSH code-system sources
//!
//! Every source line maps to exactly one [`LineKind`]. The parser consumes
//! this token stream instead of matching raw text, which keeps quoting and
//! caret-rule recognition in one place.

/// Opening and closing delimiter of multi-line string values
pub const TRIPLE_QUOTE: &str = "\"\"\"";

/// Prefix of a top-level concept line (must start at column 0)
pub const CONCEPT_MARKER: &str = "* #";

const DEFINITION_PATH: &str = "^definition";
const DESIGNATION_VALUE_PATH: &str = "^designation[+].value";
const PROPERTY_CODE_PATH: &str = "^property[+].code";
const PROPERTY_VALUE_STRING_PATH: &str = "^property[=].valueString";
const PROPERTY_APPEND_PREFIX: &str = "^property[+]";

/// Why a concept line could not produce a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedConcept {
    /// Fewer than two terminated quoted strings (carries how many were found)
    TooFewQuoted(usize),
    /// Code or display is the empty string
    EmptyValue,
}

/// Classification of a single FSH line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `* #"CODE" "DISPLAY"` at column 0
    ConceptStart { code: String, display: String },
    /// `* #...` at column 0 without a usable code/display pair
    MalformedConceptStart(MalformedConcept),
    /// `* ^definition = """` with whatever follows the delimiter
    DefinitionOpen { rest: &'a str },
    /// `* ^designation[+].value = """` with whatever follows the delimiter
    DesignationOpen { rest: &'a str },
    /// `* ^property[+].code = #"code"` (quoted or bare)
    PropertyCode { code: String },
    /// `* ^property[=].valueString = "VALUE"`
    PropertyValueString { value: String },
    Other,
}

/// Classify one line (without its line terminator)
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(rest) = line.strip_prefix(CONCEPT_MARKER) {
        let quoted = quoted_strings(rest, 2);
        return match quoted.as_slice() {
            [code, display] if !code.is_empty() && !display.is_empty() => {
                LineKind::ConceptStart {
                    code: code.clone(),
                    display: display.clone(),
                }
            }
            [_, _] => LineKind::MalformedConceptStart(MalformedConcept::EmptyValue),
            _ => LineKind::MalformedConceptStart(MalformedConcept::TooFewQuoted(quoted.len())),
        };
    }

    if let Some(rest) = caret_assignment(line, DEFINITION_PATH)
        .and_then(|value| value.strip_prefix(TRIPLE_QUOTE))
    {
        return LineKind::DefinitionOpen { rest };
    }

    if let Some(rest) = caret_assignment(line, DESIGNATION_VALUE_PATH)
        .and_then(|value| value.strip_prefix(TRIPLE_QUOTE))
    {
        return LineKind::DesignationOpen { rest };
    }

    if let Some(code) = caret_assignment(line, PROPERTY_CODE_PATH)
        .and_then(|value| value.strip_prefix('#'))
        .and_then(code_token)
    {
        return LineKind::PropertyCode { code };
    }

    if let Some(value) = caret_assignment(line, PROPERTY_VALUE_STRING_PATH)
        .and_then(|value| quoted_strings(value, 1).into_iter().next())
    {
        return LineKind::PropertyValueString { value };
    }

    LineKind::Other
}

/// Whether the line starts a new top-level concept
pub fn is_concept_start(line: &str) -> bool {
    line.starts_with(CONCEPT_MARKER)
}

/// Whether the line ends a property lookahead window: any `* #` line
/// (indented child concepts included) or any `* ^property[+]` rule.
pub fn is_property_boundary(line: &str) -> bool {
    let mut cursor = Cursor::new(line.trim_start());
    if !cursor.eat("*") {
        return false;
    }
    cursor.skip_ws();
    cursor.rest().starts_with('#') || cursor.rest().starts_with(PROPERTY_APPEND_PREFIX)
}

/// Content preceding a trailing `"""`, when the line ends with one
pub fn closing_delimiter(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix(TRIPLE_QUOTE)
}

/// Extract up to `limit` double-quoted substrings, in order.
///
/// A backslash escapes the next character: `\"` yields `"` and `\\` yields
/// `\`; other escapes are kept as written. An unterminated quote is dropped.
pub fn quoted_strings(text: &str, limit: usize) -> Vec<String> {
    let mut found = Vec::new();
    let mut chars = text.chars();

    while found.len() < limit {
        if !chars.by_ref().any(|c| c == '"') {
            break;
        }

        let mut value = String::new();
        let mut terminated = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => value.push('\\'),
                },
                '"' => {
                    terminated = true;
                    break;
                }
                _ => value.push(c),
            }
        }

        if !terminated {
            break;
        }
        found.push(value);
    }

    found
}

/// Match `* <path> =` (any indentation, any horizontal whitespace) and
/// return the text after `=` with leading whitespace removed.
fn caret_assignment<'a>(line: &'a str, path: &str) -> Option<&'a str> {
    let mut cursor = Cursor::new(line.trim_start());
    if !cursor.eat("*") {
        return None;
    }
    cursor.skip_ws();
    if !cursor.eat(path) {
        return None;
    }
    cursor.skip_ws();
    if !cursor.eat("=") {
        return None;
    }
    cursor.skip_ws();
    Some(cursor.rest())
}

/// `"table"` or `table` after the `#`
fn code_token(text: &str) -> Option<String> {
    if text.starts_with('"') {
        return quoted_strings(text, 1).into_iter().next();
    }
    text.split_whitespace()
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn eat(&mut self, literal: &str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn rest(&self) -> &'a str {
        self.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_start() {
        assert_eq!(
            classify(r#"* #"VAR001" "Patient Age""#),
            LineKind::ConceptStart {
                code: "VAR001".to_string(),
                display: "Patient Age".to_string(),
            }
        );
    }

    #[test]
    fn test_concept_start_requires_column_zero() {
        assert_eq!(classify(r#"  * #"CHILD" "Nested""#), LineKind::Other);
        assert!(!is_concept_start(r#"  * #"CHILD" "Nested""#));
    }

    #[test]
    fn test_escaped_quote_in_code() {
        match classify(r#"* #"A\"B" "Display""#) {
            LineKind::ConceptStart { code, display } => {
                assert_eq!(code, "A\"B");
                assert_eq!(display, "Display");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_concept_starts() {
        assert_eq!(
            classify("* #onlyonetoken"),
            LineKind::MalformedConceptStart(MalformedConcept::TooFewQuoted(0))
        );
        assert_eq!(
            classify(r#"* #"ONLY""#),
            LineKind::MalformedConceptStart(MalformedConcept::TooFewQuoted(1))
        );
        assert_eq!(
            classify(r#"* #"" "Display""#),
            LineKind::MalformedConceptStart(MalformedConcept::EmptyValue)
        );
    }

    #[test]
    fn test_definition_and_designation_openers() {
        assert_eq!(
            classify(r#"* ^definition = """"#),
            LineKind::DefinitionOpen { rest: "" }
        );
        assert_eq!(
            classify(r#"* ^definition = """starts here"#),
            LineKind::DefinitionOpen {
                rest: "starts here"
            }
        );
        assert_eq!(
            classify(r#"  *   ^designation[+].value   =   """"#),
            LineKind::DesignationOpen { rest: "" }
        );
        assert_eq!(classify(r#"* ^definition = "single""#), LineKind::Other);
    }

    #[test]
    fn test_property_lines() {
        assert_eq!(
            classify(r#"* ^property[+].code = #"table""#),
            LineKind::PropertyCode {
                code: "table".to_string()
            }
        );
        assert_eq!(
            classify("* ^property[+].code = #tab"),
            LineKind::PropertyCode {
                code: "tab".to_string()
            }
        );
        assert_eq!(
            classify(r#"* ^property[=].valueString = "Demographics""#),
            LineKind::PropertyValueString {
                value: "Demographics".to_string()
            }
        );
    }

    #[test]
    fn test_property_boundaries() {
        assert!(is_property_boundary(r#"* ^property[+].code = #"tab""#));
        assert!(is_property_boundary("* ^property[+].valueCode = #x"));
        assert!(is_property_boundary(r#"* #"NEXT" "Next""#));
        assert!(is_property_boundary(r#"  * #"CHILD" "Child""#));
        assert!(!is_property_boundary(r#"* ^property[=].valueString = "x""#));
        assert!(!is_property_boundary("Title: \"DAK\""));
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            quoted_strings(r#""a" "b" "c""#, 2),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(quoted_strings(r#""a\\b""#, 5), vec!["a\\b".to_string()]);
        assert_eq!(quoted_strings(r#""a\nb""#, 5), vec!["a\\nb".to_string()]);
        assert_eq!(quoted_strings(r#""open"#, 5), Vec::<String>::new());
        assert_eq!(quoted_strings("no quotes", 5), Vec::<String>::new());
    }

    #[test]
    fn test_closing_delimiter() {
        assert_eq!(closing_delimiter(r#"""""#), Some(""));
        assert_eq!(closing_delimiter(r#"  tail"""   "#), Some("  tail"));
        assert_eq!(closing_delimiter("no close"), None);
    }
}
