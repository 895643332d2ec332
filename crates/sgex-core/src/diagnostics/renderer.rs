//! Diagnostic renderer with rich terminal output

use super::{ParseDiagnostic, Severity};
use crate::console::{Color, Console};
use serde_json;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with colors and formatting
    Text,
    /// JSON format for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Renders parse diagnostics against the source they came from
pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    /// Create a new diagnostic renderer with automatic terminal detection (text output)
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    /// Create a renderer with colors disabled
    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    /// Create a renderer with specific output format
    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json | OutputFormat::JsonPretty => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };

        Self {
            console,
            output_format: format,
        }
    }

    /// Render every diagnostic. `origin` names the source in headers
    /// (a file path or `owner/repo@branch:path`).
    pub fn render_diagnostics(
        &self,
        origin: &str,
        source: &str,
        diagnostics: &[ParseDiagnostic],
    ) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_diagnostics_text(origin, source, diagnostics),
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    fn render_diagnostics_text(
        &self,
        origin: &str,
        source: &str,
        diagnostics: &[ParseDiagnostic],
    ) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let mut output = String::new();

        for (i, diagnostic) in diagnostics.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&self.render_header(diagnostic));
            output.push('\n');
            output.push_str(&self.render_code_frame(origin, &lines, diagnostic));
        }

        output
    }

    fn render_json(&self, diagnostics: &[ParseDiagnostic], pretty: bool) -> String {
        let entries: Vec<serde_json::Value> = diagnostics
            .iter()
            .map(|d| {
                serde_json::json!({
                    "line": d.line,
                    "severity": d.severity(),
                    "reason": d.reason,
                    "message": d.reason.to_string(),
                })
            })
            .collect();

        let rendered = if pretty {
            serde_json::to_string_pretty(&entries)
        } else {
            serde_json::to_string(&entries)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }

    /// `severity: message`
    fn render_header(&self, diagnostic: &ParseDiagnostic) -> String {
        let severity = diagnostic.severity();
        let severity_text = self
            .console
            .colorize(&format!("{severity:?}").to_lowercase(), severity_color(severity));

        format!(
            "{}: {}",
            severity_text,
            self.console
                .colorize(&diagnostic.reason.to_string(), Color::Bold)
        )
    }

    /// Location header plus the offending line with one line of context
    fn render_code_frame(
        &self,
        origin: &str,
        lines: &[&str],
        diagnostic: &ParseDiagnostic,
    ) -> String {
        let mut frame = String::new();
        frame.push_str(&format!(
            "  {}─[{}:{}]\n",
            self.console.colorize("┌", Color::Blue),
            origin,
            diagnostic.line
        ));

        if diagnostic.line == 0 || diagnostic.line > lines.len() {
            return frame;
        }

        let start_line = diagnostic.line.saturating_sub(1).max(1);
        let end_line = (diagnostic.line + 1).min(lines.len());
        let gutter_width = end_line.to_string().len();
        let highlight = severity_color(diagnostic.severity());

        for line_num in start_line..=end_line {
            let content = lines[line_num - 1];
            if line_num == diagnostic.line {
                frame.push_str(&self.console.colorize(">", highlight));
                frame.push(' ');
            } else {
                frame.push_str("  ");
            }
            frame.push_str(
                &self
                    .console
                    .colorize(&format!("{line_num:>gutter_width$}"), Color::Dim),
            );
            frame.push_str(&self.console.colorize(" │ ", Color::Dim));
            if line_num == diagnostic.line {
                frame.push_str(&self.console.colorize(content, highlight));
            } else {
                frame.push_str(content);
            }
            frame.push('\n');
        }

        frame
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{BlockField, DiagnosticReason};

    const SOURCE: &str = "* #\"A\" \"Alpha\"\n* #broken\n* #\"B\" \"Beta\"\n";

    fn malformed() -> ParseDiagnostic {
        ParseDiagnostic::new(2, DiagnosticReason::MalformedConceptLine { found: 0 })
    }

    #[test]
    fn test_render_header() {
        let renderer = DiagnosticRenderer::no_colors();
        let header = renderer.render_header(&malformed());
        assert!(header.starts_with("error: "));
        assert!(header.contains("found 0 quoted string(s)"));
    }

    #[test]
    fn test_render_code_frame() {
        let renderer = DiagnosticRenderer::no_colors();
        let output = renderer.render_diagnostics("DAK.fsh", SOURCE, &[malformed()]);

        assert!(output.contains("[DAK.fsh:2]"));
        assert!(output.contains("> 2 │ * #broken"));
        assert!(output.contains("  1 │ * #\"A\" \"Alpha\""));
        assert!(output.contains("  3 │ * #\"B\" \"Beta\""));
    }

    #[test]
    fn test_frame_skips_out_of_range_lines() {
        let renderer = DiagnosticRenderer::no_colors();
        let diagnostic = ParseDiagnostic::new(
            99,
            DiagnosticReason::UnterminatedBlock {
                field: BlockField::Cql,
            },
        );
        let output = renderer.render_diagnostics("DAK.fsh", SOURCE, &[diagnostic]);
        assert!(output.starts_with("warning: "));
        assert!(output.contains("[DAK.fsh:99]"));
        assert!(!output.contains(" │ "));
    }

    #[test]
    fn test_json_output() {
        let renderer = DiagnosticRenderer::with_format(OutputFormat::Json);
        let output = renderer.render_diagnostics("DAK.fsh", SOURCE, &[malformed()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["line"], 2);
        assert_eq!(parsed[0]["severity"], "error");
        assert_eq!(parsed[0]["reason"]["kind"], "malformedConceptLine");
        assert_eq!(parsed[0]["reason"]["found"], 0);
    }
}
