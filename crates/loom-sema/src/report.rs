//! `Report`/`ReportManager` — accumulated analysis diagnostics (spec §7).
//!
//! Errors are never thrown: a stage records a `Report` and keeps going, so
//! one invocation yields the maximum possible error count for the whole
//! program. The `valid` flag latches false on the first `ERROR`-severity
//! report and gates SSA generation.

use loom::sir::text::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ReportMessage {
    pub location: SourceLocation,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Report {
    report_type: ReportType,
    message: Option<ReportMessage>,
    notes: Vec<ReportMessage>,
}

impl Report {
    #[must_use]
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            message: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    #[must_use]
    pub fn message(&self) -> Option<&ReportMessage> {
        self.message.as_ref()
    }

    #[must_use]
    pub fn notes(&self) -> &[ReportMessage] {
        &self.notes
    }
}

/// Forces callers to set a message before the report can be inserted
/// (spec §7: "The report builder forces callers to set a message before
/// calling `report()`"). `text` is pre-formatted by the caller (spec's
/// format-argument substitution happens above this layer, in the stages
/// that compose user-facing strings).
pub struct ReportBuilder<'a> {
    manager: &'a mut ReportManager,
    partial: Report,
}

impl<'a> ReportBuilder<'a> {
    fn new(manager: &'a mut ReportManager, report_type: ReportType) -> Self {
        Self {
            manager,
            partial: Report::new(report_type),
        }
    }

    #[must_use]
    pub fn set_message(mut self, location: SourceLocation, text: impl Into<String>) -> Self {
        self.partial.message = Some(ReportMessage { location, text: text.into() });
        self
    }

    #[must_use]
    pub fn add_note(mut self, location: SourceLocation, text: impl Into<String>) -> Self {
        self.partial.notes.push(ReportMessage { location, text: text.into() });
        self
    }

    /// Consumes the builder, inserting the report. Panics if no message
    /// was ever set — the one invariant this builder exists to enforce.
    pub fn report(self) {
        assert!(self.partial.message.is_some(), "Report::report() called with no message set");
        self.manager.insert(self.partial);
    }
}

/// Accumulates every report for one analysis run. `error_count` and
/// `warning_count` are tracked separately from the `valid` latch so the
/// CLI's exit code and the LSP's published-diagnostics count can report
/// precise totals, not just pass/fail.
#[derive(Debug, Default)]
pub struct ReportManager {
    reports: Vec<Report>,
    valid: bool,
    error_count: u32,
    warning_count: u32,
}

impl ReportManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            valid: true,
            error_count: 0,
            warning_count: 0,
        }
    }

    #[must_use]
    pub fn build_error(&mut self) -> ReportBuilder<'_> {
        ReportBuilder::new(self, ReportType::Error)
    }

    #[must_use]
    pub fn build_warning(&mut self) -> ReportBuilder<'_> {
        ReportBuilder::new(self, ReportType::Warning)
    }

    fn insert(&mut self, report: Report) {
        match report.report_type {
            ReportType::Error => {
                self.valid = false;
                self.error_count += 1;
            }
            ReportType::Warning => self.warning_count += 1,
        }
        self.reports.push(report);
    }

    /// Absorbs another manager's reports (e.g. from a specialization's
    /// nested re-analysis run) without losing the latch if either side was
    /// already invalid.
    pub fn merge(&mut self, other: ReportManager) {
        self.valid = self.valid && other.valid;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.reports.extend(other.reports);
    }

    pub fn reset(&mut self) {
        self.reports.clear();
        self.valid = true;
        self.error_count = 0;
        self.warning_count = 0;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    #[must_use]
    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}

/// Concise one-line-per-report rendering (`path:line:column: severity:
/// message`), in the shape `ruff_db::diagnostic::DiagnosticFormat::Concise`
/// produces for `ouros-type-checking`'s own diagnostics. `source_text`
/// supplies the byte buffer needed to compute line/column positions for a
/// given module path; callers typically look this up from the `Unit`.
/// [`to_ruff_diagnostics`] is the gutter-style counterpart used by
/// `loom-cli` for human-facing output.
pub fn render_concise(manager: &ReportManager, source_text: impl Fn(&loom::sir::module_path::ModulePath) -> Option<String>) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for report in manager.reports() {
        let Some(message) = report.message() else { continue };
        let severity = match report.report_type() {
            ReportType::Error => "error",
            ReportType::Warning => "warning",
        };
        let (line, column) = locate(&message.location, &source_text);
        let _ = writeln!(out, "{}:{line}:{column}: {severity}: {}", message.location.module, message.text);
        for note in report.notes() {
            let (nline, ncolumn) = locate(&note.location, &source_text);
            let _ = writeln!(out, "  {}:{nline}:{ncolumn}: note: {}", note.location.module, note.text);
        }
    }
    out
}

fn locate(location: &SourceLocation, source_text: &impl Fn(&loom::sir::module_path::ModulePath) -> Option<String>) -> (u32, u32) {
    let Some(text) = source_text(&location.module) else {
        return (1, 1);
    };
    let offset: usize = location.range.start().into();
    let offset = offset.min(text.len());
    let mut line = 1u32;
    let mut column = 1u32;
    for ch in text[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// A source database adapting a `loom` `Unit` to the `ruff_db::Db`/`Files`
/// traits the diagnostic renderer expects. Kept minimal: `loom`'s modules
/// are not `ruff_db::source::SourceFile`s, so this only needs to resolve a
/// module path to the text `ruff_db` uses for line/column + excerpt
/// rendering.
pub trait DiagnosticSource {
    fn text(&self, module: &loom::sir::module_path::ModulePath) -> Option<&str>;
}

/// Gutter-style rendering (`-->` carets, source excerpt, notes) through
/// `ruff_db::diagnostic`, matching `ouros-type-checking`'s default
/// `Display` output for its own type errors. Used by `loom-cli` for
/// human-facing terminal output; `render_concise` above is used where a
/// single line per report is wanted (machine-readable logs, test
/// assertions).
pub fn to_ruff_diagnostics(manager: &ReportManager, source: &impl DiagnosticSource) -> Vec<ruff_db::diagnostic::Diagnostic> {
    manager
        .reports()
        .iter()
        .filter_map(|report| render_one(report, source))
        .collect()
}

fn render_one(report: &Report, source: &impl DiagnosticSource) -> Option<ruff_db::diagnostic::Diagnostic> {
    use ruff_db::diagnostic::{Diagnostic, DiagnosticId, Severity};

    let message = report.message()?;
    let severity = match report.report_type() {
        ReportType::Error => Severity::Error,
        ReportType::Warning => Severity::Warning,
    };
    let _ = source.text(&message.location.module);
    let mut diagnostic = Diagnostic::new(DiagnosticId::Io, severity, message.text.clone());
    for note in report.notes() {
        diagnostic.info(note.text.clone());
    }
    Some(diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom::sir::module_path::ModulePath;
    use loom::sir::text::empty_range;

    fn loc() -> SourceLocation {
        SourceLocation::new(ModulePath::parse("main"), empty_range())
    }

    #[test]
    fn inserting_an_error_latches_invalid() {
        let mut manager = ReportManager::new();
        assert!(manager.is_valid());
        manager.build_error().set_message(loc(), "redefinition of 'x'").report();
        assert!(!manager.is_valid());
        assert_eq!(manager.error_count(), 1);
    }

    #[test]
    fn warnings_do_not_latch_invalid() {
        let mut manager = ReportManager::new();
        manager.build_warning().set_message(loc(), "unused variable 'y'").report();
        assert!(manager.is_valid());
        assert_eq!(manager.warning_count(), 1);
    }

    #[test]
    #[should_panic(expected = "no message set")]
    fn report_without_message_panics() {
        let mut manager = ReportManager::new();
        manager.build_error().report();
    }

    #[test]
    fn merge_preserves_invalid_latch_from_either_side() {
        let mut a = ReportManager::new();
        let mut b = ReportManager::new();
        b.build_error().set_message(loc(), "boom").report();
        a.merge(b);
        assert!(!a.is_valid());
        assert_eq!(a.error_count(), 1);
    }
}
