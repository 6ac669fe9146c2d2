//! Plain-text diagnostic emitter.
//!
//! Renders a [`Report`] to any `io::Write` in a compact, grep-friendly
//! format. Richer rendering (source excerpts, colors) belongs to the
//! external driver.

use std::io::{self, Write};

use crate::{Report, Severity};

/// Write every diagnostic of a report to `out`.
pub fn emit(report: &Report, out: &mut impl Write) -> io::Result<()> {
    for diag in report.diagnostics() {
        match diag.severity {
            Severity::Error | Severity::Warning => {
                writeln!(out, "{}[{}]: {}", diag.severity, diag.code, diag.message)?;
            }
            Severity::Note => writeln!(out, "{}: {}", diag.severity, diag.message)?,
        }
        for label in &diag.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            writeln!(out, "  {} {}: {}", marker, label.span, label.message)?;
        }
        for note in &diag.notes {
            writeln!(out, "  note: {note}")?;
        }
    }
    Ok(())
}

/// Render a report to a string (diagnostic text is always valid UTF-8).
pub fn render(report: &Report) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = emit(report, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiagnosticEngine, ErrorCode};
    use hp_ast::Span;

    #[test]
    fn render_includes_code_span_and_note() {
        let mut engine = DiagnosticEngine::new();
        engine.open_report();
        engine.report_error(ErrorCode::E2003, Span::new(12, 20), "`Point` is not evaluable");
        engine.report_note(Span::new(2, 7), "condition required here");
        let text = render(&engine.close_report());

        assert!(text.contains("error[E2003]"));
        assert!(text.contains("12..20"));
        assert!(text.contains("note: condition required here"));
    }
}
