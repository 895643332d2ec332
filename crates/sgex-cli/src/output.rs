//! Output formatting for concept tables and extraction reports

use colored::*;
use sgex_core::console::{display_width, fit};
use sgex_core::{
    Concept, Console, DiagnosticRenderer, OutputFormat as CoreOutputFormat, ParseDiagnostic,
    Result, Severity, SgexError,
};

use crate::OutputFormat;

/// Columns shown in the human table, with their minimum widths
const COLUMNS: [(&str, usize); 5] = [
    ("Code", 6),
    ("Display", 12),
    ("Tables", 8),
    ("Tabs", 6),
    ("CQL", 5),
];
const SEPARATOR: &str = "  ";

/// Counts for the closing summary line
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub concepts: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ExtractionSummary {
    pub fn new(concepts: usize, diagnostics: &[ParseDiagnostic]) -> Self {
        let errors = diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count();
        Self {
            concepts,
            errors,
            warnings: diagnostics.len() - errors,
        }
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    /// Print the concept rows
    pub fn print_concepts(&self, origin: &str, rows: &[&Concept], total: usize) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_concepts_human(origin, rows, total);
                Ok(())
            }
            OutputFormat::Json => print_json(&rows),
            OutputFormat::Compact => {
                for concept in rows {
                    println!("{}\t{}", concept.code, concept.display);
                }
                Ok(())
            }
        }
    }

    fn print_concepts_human(&self, origin: &str, rows: &[&Concept], total: usize) {
        println!("{} {}", "Concepts from".bold(), origin);

        if rows.is_empty() {
            println!("  No concepts to show");
            return;
        }

        let console = if self.use_colors {
            Console::new()
        } else {
            Console::no_colors()
        };
        let widths = column_widths(rows, console.max_width());

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(&widths)
            .map(|((title, _), width)| fit(title, *width))
            .collect();
        println!("{}", header.join(SEPARATOR).trim_end().bold());

        for concept in rows {
            let cells: Vec<String> = cells(concept)
                .iter()
                .zip(&widths)
                .map(|(text, width)| fit(text, *width))
                .collect();
            println!("{}", cells.join(SEPARATOR).trim_end());
        }

        if rows.len() == total {
            println!("\n{} concepts", total);
        } else {
            println!("\n{} of {} concepts", rows.len(), total);
        }
    }

    /// Print extraction diagnostics against the source they came from
    pub fn print_diagnostics(
        &self,
        origin: &str,
        source: &str,
        diagnostics: &[ParseDiagnostic],
        summary: &ExtractionSummary,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if diagnostics.is_empty() {
                    println!("{} No problems found in {}", "✓".green(), origin);
                } else {
                    let renderer = if self.use_colors {
                        DiagnosticRenderer::new()
                    } else {
                        DiagnosticRenderer::no_colors()
                    };
                    println!("{}", renderer.render_diagnostics(origin, source, diagnostics));
                }
                self.print_summary_human(summary);
                Ok(())
            }
            OutputFormat::Json => {
                let renderer = DiagnosticRenderer::with_format(CoreOutputFormat::Json);
                let issues: serde_json::Value =
                    serde_json::from_str(&renderer.render_diagnostics(origin, source, diagnostics))?;
                print_json(&serde_json::json!({
                    "origin": origin,
                    "concepts": summary.concepts,
                    "issues": issues,
                    "summary": {
                        "errors": summary.errors,
                        "warnings": summary.warnings,
                        "total": summary.total_issues(),
                    }
                }))
            }
            OutputFormat::Compact => {
                for diagnostic in diagnostics {
                    let level = match diagnostic.severity() {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    };
                    println!("{}:{}: {}: {}", origin, diagnostic.line, level, diagnostic.reason);
                }
                if !summary.has_issues() {
                    println!("sgex: {} concepts, no problems", summary.concepts);
                }
                Ok(())
            }
        }
    }

    fn print_summary_human(&self, summary: &ExtractionSummary) {
        println!("\n{}", "Summary:".bold());
        println!("  Concepts extracted: {}", summary.concepts);
        if summary.has_issues() {
            println!("  Problems found:");
            if summary.errors > 0 {
                println!("    Errors: {}", summary.errors.to_string().red());
            }
            if summary.warnings > 0 {
                println!("    Warnings: {}", summary.warnings.to_string().yellow());
            }
        }
    }
}

/// Pretty-print any serializable value as JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SgexError::serialization_error(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

fn cells(concept: &Concept) -> [&str; 5] {
    let cql = if concept.has_cql() { "yes" } else { "" };
    [
        concept.code.as_str(),
        concept.display.as_str(),
        concept.tables.as_str(),
        concept.tabs.as_str(),
        cql,
    ]
}

/// Natural width of each column, shrinking Display then Tables until the
/// row fits `max_width`.
fn column_widths(rows: &[&Concept], max_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = COLUMNS.iter().map(|(_, min)| *min).collect();
    for concept in rows {
        for (width, text) in widths.iter_mut().zip(cells(concept)) {
            *width = (*width).max(display_width(text));
        }
    }

    let separators = SEPARATOR.len() * (COLUMNS.len() - 1);
    for shrinkable in [1, 2] {
        let used: usize = widths.iter().sum::<usize>() + separators;
        if used <= max_width {
            break;
        }
        let floor = COLUMNS[shrinkable].1;
        widths[shrinkable] = widths[shrinkable]
            .saturating_sub(used - max_width)
            .max(floor);
    }
    widths
}
