//! Session-scoped diagnostic batching.
//!
//! Each compiler pass opens a report, emits diagnostics into it in visit
//! order, and closes it when the pass finishes. Emission order is
//! preserved: the validator visits siblings in source order and the
//! report reflects that order, so no sorting happens here.

use hp_ast::Span;

use crate::{Diagnostic, ErrorCode, Severity};

/// A batch of diagnostics from one pass over one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Check if the report contains any errors (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Diagnostic engine holding a stack of open reports.
///
/// Reports nest: a sub-pass may open its own report and fold it into the
/// enclosing one on close. The common case is a single open report per
/// validation session.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    open: Vec<Report>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        DiagnosticEngine::default()
    }

    /// Open a fresh report. Diagnostics emitted after this call land in
    /// the new report until it is closed.
    pub fn open_report(&mut self) {
        self.open.push(Report::default());
    }

    /// Close the innermost open report and return it.
    ///
    /// # Panics
    /// Panics if no report is open — an unbalanced open/close pairing is
    /// a compiler bug, not a user error.
    pub fn close_report(&mut self) -> Report {
        let Some(report) = self.open.pop() else {
            panic!("close_report with no open report");
        };
        report
    }

    /// Number of currently open reports.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn current(&mut self) -> &mut Report {
        let Some(report) = self.open.last_mut() else {
            panic!("diagnostic emitted with no open report");
        };
        report
    }

    /// Emit a pre-built diagnostic into the current report.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.current().diagnostics.push(diagnostic);
    }

    /// Emit an error with a primary label at `span`.
    pub fn report_error(&mut self, code: ErrorCode, span: Span, message: impl Into<String>) {
        let message = message.into();
        let diag = Diagnostic::error(code)
            .with_message(message.clone())
            .with_label(span, message);
        self.emit(diag);
    }

    /// Emit a warning with a primary label at `span`.
    pub fn report_warning(&mut self, code: ErrorCode, span: Span, message: impl Into<String>) {
        let message = message.into();
        let diag = Diagnostic::warning(code)
            .with_message(message.clone())
            .with_label(span, message);
        self.emit(diag);
    }

    /// Attach a note with a secondary location to the most recent
    /// diagnostic in the current report.
    ///
    /// # Panics
    /// Panics if the current report is empty — a note must follow the
    /// diagnostic it annotates.
    pub fn report_note(&mut self, span: Span, message: impl Into<String>) {
        let report = self.current();
        let Some(last) = report.diagnostics.last_mut() else {
            panic!("report_note with no preceding diagnostic");
        };
        let message = message.into();
        last.notes.push(message.clone());
        last.labels.push(crate::Label::secondary(span, message));
    }

    /// Error count across the innermost open report.
    pub fn error_count(&self) -> usize {
        self.open.last().map_or(0, Report::error_count)
    }

    /// Check that a severity exists in the current report.
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.open
            .last()
            .is_some_and(|r| r.diagnostics.iter().any(|d| d.severity == severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_batch_in_emission_order() {
        let mut engine = DiagnosticEngine::new();
        engine.open_report();
        engine.report_error(ErrorCode::E2001, Span::new(0, 3), "unknown symbol `a`");
        engine.report_error(ErrorCode::E2001, Span::new(5, 8), "unknown symbol `b`");
        let report = engine.close_report();

        assert_eq!(report.error_count(), 2);
        assert_eq!(report.diagnostics()[0].message, "unknown symbol `a`");
        assert_eq!(report.diagnostics()[1].message, "unknown symbol `b`");
        assert_eq!(engine.open_count(), 0);
    }

    #[test]
    fn note_attaches_to_last_diagnostic() {
        let mut engine = DiagnosticEngine::new();
        engine.open_report();
        engine.report_error(ErrorCode::E2002, Span::new(40, 45), "redefinition of `Point`");
        engine.report_note(Span::new(10, 15), "previously defined here");
        let report = engine.close_report();

        let diag = &report.diagnostics()[0];
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.labels.len(), 2, "note adds a secondary label");
    }

    #[test]
    fn nested_reports_are_independent() {
        let mut engine = DiagnosticEngine::new();
        engine.open_report();
        engine.report_error(ErrorCode::E2001, Span::DUMMY, "outer");
        engine.open_report();
        engine.report_error(ErrorCode::E2001, Span::DUMMY, "inner");
        let inner = engine.close_report();
        let outer = engine.close_report();

        assert_eq!(inner.error_count(), 1);
        assert_eq!(outer.error_count(), 1);
        assert_eq!(outer.diagnostics()[0].message, "outer");
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut engine = DiagnosticEngine::new();
        engine.open_report();
        engine.report_warning(ErrorCode::E2901, Span::DUMMY, "unreachable statement");
        let report = engine.close_report();
        assert!(!report.has_errors());
        assert!(!report.is_empty());
    }
}
