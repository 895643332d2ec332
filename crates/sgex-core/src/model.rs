//! Code-system data model produced by the FSH extractor

use serde::{Deserialize, Serialize};

/// Id of the DAK decision-table code system
pub const DECISION_TABLE_ID: &str = "DAK.DT";
/// Display name of the DAK decision-table code system
pub const DECISION_TABLE_NAME: &str = "Decision Table";
/// Repository-relative location of the DAK code-system source
pub const DAK_CODESYSTEM_PATH: &str = "input/fsh/codesystems/DAK.fsh";

/// One concept of a code system.
///
/// Serializes with the PascalCase field names consumed by the table view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Concept {
    pub code: String,
    pub display: String,
    pub definition: String,
    pub tables: String,
    pub tabs: String,
    #[serde(rename = "CQL")]
    pub cql: String,
    /// 1-based line of the concept's `* #` line (0 when not parsed from source)
    #[serde(skip)]
    pub line: usize,
}

impl Concept {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            ..Default::default()
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_tables(mut self, tables: impl Into<String>) -> Self {
        self.tables = tables.into();
        self
    }

    pub fn with_tabs(mut self, tabs: impl Into<String>) -> Self {
        self.tabs = tabs.into();
        self
    }

    pub fn with_cql(mut self, cql: impl Into<String>) -> Self {
        self.cql = cql.into();
        self
    }

    pub fn has_cql(&self) -> bool {
        !self.cql.trim().is_empty()
    }
}

/// A parsed code system, rebuilt on every load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSystemDocument {
    pub id: String,
    pub name: String,
    pub concepts: Vec<Concept>,
}

impl CodeSystemDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, concepts: Vec<Concept>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            concepts,
        }
    }

    /// The `DAK.DT` decision-table document
    pub fn decision_table(concepts: Vec<Concept>) -> Self {
        Self::new(DECISION_TABLE_ID, DECISION_TABLE_NAME, concepts)
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn find(&self, code: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.code == code)
    }
}

/// Demonstration concepts shown when the code-system file is absent and
/// demo fallback is enabled.
pub fn demo_concepts() -> Vec<Concept> {
    vec![
        Concept::new("DT01", "Pregnancy status")
            .with_definition("Whether the client is currently pregnant")
            .with_tables("ANC.DT.01 Danger signs")
            .with_tabs("Danger signs")
            .with_cql("define \"Pregnancy status\":\n  exists [Condition: \"Pregnancy\"]"),
        Concept::new("DT02", "Gestational age")
            .with_definition("Gestational age in completed weeks")
            .with_tables("ANC.DT.02 Gestational age")
            .with_tabs("Gestational age"),
        Concept::new("DT03", "Blood pressure reading")
            .with_definition("Most recent systolic and diastolic blood pressure")
            .with_tables("ANC.DT.03 Hypertension")
            .with_tabs("Hypertension")
            .with_cql(
                "define \"Blood pressure reading\":\n  Last([Observation: \"Blood pressure\"])",
            ),
    ]
}
