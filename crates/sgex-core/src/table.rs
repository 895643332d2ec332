//! Searchable, sortable decision-table view over extracted concepts

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::Concept;

/// Column of the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Code,
    Display,
    Definition,
    Tables,
    Tabs,
    Cql,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Code,
        SortField::Display,
        SortField::Definition,
        SortField::Tables,
        SortField::Tabs,
        SortField::Cql,
    ];

    pub fn value<'a>(&self, concept: &'a Concept) -> &'a str {
        match self {
            SortField::Code => &concept.code,
            SortField::Display => &concept.display,
            SortField::Definition => &concept.definition,
            SortField::Tables => &concept.tables,
            SortField::Tabs => &concept.tabs,
            SortField::Cql => &concept.cql,
        }
    }

    /// Column heading as shown to users
    pub fn heading(&self) -> &'static str {
        match self {
            SortField::Code => "Code",
            SortField::Display => "Display",
            SortField::Definition => "Definition",
            SortField::Tables => "Tables",
            SortField::Tabs => "Tabs",
            SortField::Cql => "CQL",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.heading().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown column '{s}', expected one of: code, display, definition, tables, tabs, cql"
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Search text plus optional ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub search: Option<String>,
    pub sort: Option<(SortField, SortDirection)>,
}

impl TableQuery {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = Some((field, direction));
        self
    }
}

/// Read-only table over a concept list
#[derive(Debug, Clone, Default)]
pub struct ConceptTable {
    concepts: Vec<Concept>,
}

impl ConceptTable {
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self { concepts }
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Case-insensitive substring match on code, display and definition.
    /// A blank query matches every concept.
    pub fn search(&self, query: &str) -> Vec<&Concept> {
        let needle = query.trim().to_lowercase();
        self.concepts
            .iter()
            .filter(|concept| matches_search(concept, &needle))
            .collect()
    }

    /// Every concept ordered by `field`
    pub fn sort_by(&self, field: SortField, direction: SortDirection) -> Vec<&Concept> {
        let mut rows: Vec<&Concept> = self.concepts.iter().collect();
        sort_rows(&mut rows, field, direction);
        rows
    }

    /// Search, then sort
    pub fn view(&self, query: &TableQuery) -> Vec<&Concept> {
        let mut rows = match &query.search {
            Some(text) => self.search(text),
            None => self.concepts.iter().collect(),
        };
        if let Some((field, direction)) = query.sort {
            sort_rows(&mut rows, field, direction);
        }
        rows
    }

    /// Raw CQL of the concept with `code`, `None` for unknown codes
    pub fn cql_for(&self, code: &str) -> Option<&str> {
        self.concepts
            .iter()
            .find(|concept| concept.code == code)
            .map(|concept| concept.cql.as_str())
    }
}

fn matches_search(concept: &Concept, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [&concept.code, &concept.display, &concept.definition]
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

fn sort_rows(rows: &mut [&Concept], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = collate(field.value(a), field.value(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Approximation of default locale collation: letters compare without
/// regard to case first, lowercase sorts before uppercase on ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConceptTable {
        ConceptTable::new(vec![
            Concept::new("B2", "beta").with_definition("Second letter"),
            Concept::new("a1", "Alpha")
                .with_definition("First letter")
                .with_cql("define A: true"),
            Concept::new("C3", "Gamma").with_definition("Third letter, after beta"),
        ])
    }

    fn codes(rows: &[&Concept]) -> Vec<String> {
        rows.iter().map(|c| c.code.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let table = sample();
        assert_eq!(codes(&table.search("ALPHA")), vec!["a1"]);
        assert_eq!(codes(&table.search("beta")), vec!["B2", "C3"]);
    }

    #[test]
    fn test_blank_search_matches_all() {
        assert_eq!(sample().search("   ").len(), 3);
    }

    #[test]
    fn test_search_ignores_cql() {
        assert!(sample().search("define").is_empty());
    }

    #[test]
    fn test_sort_ascending_ignores_case() {
        let table = sample();
        let rows = table.sort_by(SortField::Code, SortDirection::Ascending);
        assert_eq!(codes(&rows), vec!["a1", "B2", "C3"]);
    }

    #[test]
    fn test_sort_descending() {
        let table = sample();
        let rows = table.sort_by(SortField::Display, SortDirection::Descending);
        assert_eq!(codes(&rows), vec!["C3", "B2", "a1"]);
    }

    #[test]
    fn test_view_combines_search_and_sort() {
        let table = sample();
        let query = TableQuery::default()
            .search("letter")
            .sort(SortField::Code, SortDirection::Descending);
        assert_eq!(codes(&table.view(&query)), vec!["C3", "B2", "a1"]);
    }

    #[test]
    fn test_cql_for() {
        let table = sample();
        assert_eq!(table.cql_for("a1"), Some("define A: true"));
        assert_eq!(table.cql_for("B2"), Some(""));
        assert_eq!(table.cql_for("missing"), None);
    }

    #[test]
    fn test_collate_tiebreak() {
        assert_eq!(collate("abc", "ABC"), Ordering::Less);
        assert_eq!(collate("abc", "abd"), Ordering::Less);
        assert_eq!(collate("b", "A"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("cql".parse::<SortField>(), Ok(SortField::Cql));
        assert_eq!("Display".parse::<SortField>(), Ok(SortField::Display));
        assert!("nope".parse::<SortField>().is_err());
    }
}
