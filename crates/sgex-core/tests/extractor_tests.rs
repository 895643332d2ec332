//! End-to-end extraction tests over realistic DAK code-system sources

use serde_json::json;
use sgex_core::{
    BlockField, CodeSystemParser, ConceptTable, DiagnosticReason, PropertyField, SortDirection,
    SortField, TableQuery, extract_concepts, parse_code_system,
};

const DAK_SOURCE: &str = r#"CodeSystem: DAK
Title: "SMART Guidelines Decision Tables"
Description: "Decision-table concepts for the ANC DAK"
* ^experimental = false
* ^caseSensitive = true

* #"ANC.DT.01" "Determine danger signs"
* ^definition = """
Checks whether the client presents with any
danger sign requiring referral.
"""
* ^designation[+].value = """
define "Has Danger Signs":
  exists "Danger Signs"
    where "Danger Signs" is not null
"""
* ^property[+].code = #"table"
* ^property[=].valueString = "ANC.DT.01 Danger signs"
* ^property[+].code = #"tab"
* ^property[=].valueString = "ANC.DT.01"

* #"ANC.DT.02" "Determine blood pressure follow-up"
* ^definition = """Single-line definition"""
* ^property[+].code = #"tab"
* ^property[=].valueString = "ANC.DT.02"

* #"ANC.DT.03" "Counsel on nutrition"
"#;

#[test]
fn test_variable_concept_scenario() {
    let source = r#"* #"VAR001" "Patient Age"
* ^definition = """
The age of the patient in years
"""
* ^property[+].code = #"table"
* ^property[=].valueString = "Demographics"
"#;

    let concepts = extract_concepts(source);
    assert_eq!(
        serde_json::to_value(&concepts).unwrap(),
        json!([{
            "Code": "VAR001",
            "Display": "Patient Age",
            "Definition": "The age of the patient in years",
            "Tables": "Demographics",
            "Tabs": "",
            "CQL": ""
        }])
    );
}

#[test]
fn test_well_formed_block_round_trips() {
    let source = "* #\"C1\" \"Concept one\"\n\
                  * ^definition = \"\"\"\n\
                  First line of definition\n\
                  \"\"\"\n\
                  * ^designation[+].value = \"\"\"\n\
                  define \"X\": true\n\
                  \"\"\"\n";

    let document = parse_code_system(source).expect("clean source");
    assert_eq!(document.len(), 1);

    let concept = &document.concepts[0];
    assert_eq!(concept.code, "C1");
    assert_eq!(concept.display, "Concept one");
    assert_eq!(concept.definition, "First line of definition");
    assert_eq!(concept.cql, "define \"X\": true");
}

#[test]
fn test_escaped_quote_in_code() {
    let concepts = extract_concepts(r#"* #"A\"B" "Display""#);
    assert_eq!(concepts.len(), 1);
    assert_eq!(concepts[0].code, "A\"B");
    assert_eq!(concepts[0].display, "Display");
}

#[test]
fn test_concept_order_is_preserved() {
    let source = (1..=5)
        .map(|i| format!("* #\"C{i}\" \"Concept {i}\""))
        .collect::<Vec<_>>()
        .join("\n");

    let codes: Vec<_> = extract_concepts(&source)
        .into_iter()
        .map(|c| c.code)
        .collect();
    assert_eq!(codes, ["C1", "C2", "C3", "C4", "C5"]);
}

#[test]
fn test_line_with_missing_quotes_produces_no_concept() {
    let source = r#"* #"A" "Alpha"
* #onlyonetoken
* ^definition = """
orphaned definition
"""
* #"B" "Beta"
* ^definition = """
Beta definition
"""
"#;

    let outcome = CodeSystemParser::parse(source);
    let concepts = &outcome.document.concepts;

    assert_eq!(concepts.len(), 2);
    assert_eq!(concepts[0].code, "A");
    assert_eq!(concepts[0].definition, "");
    assert_eq!(concepts[1].code, "B");
    assert_eq!(concepts[1].definition, "Beta definition");

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].line, 2);
    assert_eq!(
        outcome.diagnostics[0].reason,
        DiagnosticReason::MalformedConceptLine { found: 0 }
    );
}

#[test]
fn test_table_property_does_not_bleed_into_next_concept() {
    let source = r#"* #"A" "Alpha"
* ^property[+].code = #"table"
* #"B" "Beta"
* ^property[=].valueString = "Belongs nowhere"
"#;

    let outcome = CodeSystemParser::parse(source);
    let concepts = &outcome.document.concepts;

    assert_eq!(concepts[0].tables, "");
    assert_eq!(concepts[1].tables, "");
    assert!(outcome.diagnostics.iter().any(|d| d.line == 2
        && d.reason
            == DiagnosticReason::MissingPropertyValue {
                property: PropertyField::Tables
            }));
}

#[test]
fn test_next_property_ends_pending_table_property() {
    let source = r#"* #"A" "Alpha"
* ^property[+].code = #"table"
* ^property[+].code = #"tab"
* ^property[=].valueString = "T"
"#;

    let outcome = CodeSystemParser::parse(source);
    let concept = &outcome.document.concepts[0];

    assert_eq!(concept.tables, "");
    assert_eq!(concept.tabs, "T");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].line, 2);
    assert_eq!(
        outcome.diagnostics[0].reason,
        DiagnosticReason::MissingPropertyValue {
            property: PropertyField::Tables
        }
    );
}

#[test]
fn test_cql_keeps_indentation_definition_does_not() {
    let source = "* #\"C\" \"Concept\"\n\
                  * ^definition = \"\"\"\n\
                  first\n  \
                  indented\n\
                  \"\"\"\n\
                  * ^designation[+].value = \"\"\"\n\
                  first\n  \
                  indented\n\
                  \"\"\"\n";

    let concepts = extract_concepts(source);
    assert_eq!(concepts[0].definition, "first\nindented");
    assert_eq!(concepts[0].cql, "first\n  indented");
}

#[test]
fn test_full_dak_source() {
    let document = parse_code_system(DAK_SOURCE).expect("clean source");

    assert_eq!(document.id, "DAK.DT");
    assert_eq!(document.name, "Decision Table");
    assert_eq!(document.len(), 3);

    let first = document.find("ANC.DT.01").unwrap();
    assert_eq!(
        first.definition,
        "Checks whether the client presents with any\ndanger sign requiring referral."
    );
    assert_eq!(
        first.cql,
        "define \"Has Danger Signs\":\n  exists \"Danger Signs\"\n    where \"Danger Signs\" is not null"
    );
    assert_eq!(first.tables, "ANC.DT.01 Danger signs");
    assert_eq!(first.tabs, "ANC.DT.01");

    let second = document.find("ANC.DT.02").unwrap();
    assert_eq!(second.definition, "Single-line definition");
    assert_eq!(second.tables, "");
    assert_eq!(second.tabs, "ANC.DT.02");

    let third = document.find("ANC.DT.03").unwrap();
    assert!(!third.has_cql());
}

#[test]
fn test_unterminated_cql_is_flushed_with_warning() {
    let source = "* #\"C\" \"Concept\"\n\
                  * ^designation[+].value = \"\"\"\n\
                  define \"Open\": true\n";

    let err = parse_code_system(source).unwrap_err();
    assert_eq!(err.warning_count(), 1);
    assert_eq!(
        err.entries[0].reason,
        DiagnosticReason::UnterminatedBlock {
            field: BlockField::Cql
        }
    );

    let document = err.into_document();
    assert_eq!(document.concepts[0].cql, "define \"Open\": true");
}

#[test]
fn test_table_view_over_extracted_concepts() {
    let table = ConceptTable::new(extract_concepts(DAK_SOURCE));

    let hits = table.search("blood");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "ANC.DT.02");

    let sorted = table.view(
        &TableQuery::default()
            .search("ANC")
            .sort(SortField::Display, SortDirection::Ascending),
    );
    let displays: Vec<_> = sorted.iter().map(|c| c.display.as_str()).collect();
    assert_eq!(
        displays,
        [
            "Counsel on nutrition",
            "Determine blood pressure follow-up",
            "Determine danger signs"
        ]
    );

    assert!(table.cql_for("ANC.DT.01").unwrap().contains("Has Danger Signs"));
    assert_eq!(table.cql_for("ANC.DT.03"), Some(""));
    assert_eq!(table.cql_for("ANC.DT.99"), None);
}
