//! Diagnostic model and miette rendering for query option errors.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Role of a diagnostic label in the overall diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// The location that caused the failure.
    Primary,
    /// A supporting location, such as an earlier conflicting clause.
    Secondary,
}

/// A labeled span within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    /// The span this label refers to.
    pub span: Span,
    /// The label text explaining this span's relevance.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub role: LabelRole,
}

impl DiagLabel {
    /// Creates a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Primary,
        }
    }

    /// Creates a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Secondary,
        }
    }
}

/// A structured, renderer-independent diagnostic.
///
/// Parser errors are lowered into this shape before being handed to miette,
/// so callers that do their own rendering can inspect labels and codes
/// without going through a `Report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    /// The main diagnostic message.
    pub message: String,
    /// Labeled spans showing relevant source locations.
    pub labels: Vec<DiagLabel>,
    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,
    /// Stable diagnostic code (e.g. `syntax::double_system_query_option`).
    pub code: Option<String>,
}

impl Diag {
    /// Creates a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            labels: Vec::new(),
            help: None,
            code: None,
        }
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: DiagLabel) -> Self {
        self.labels.push(label);
        self
    }

    /// Sets the help text for this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Renders this diagnostic against the query text it was produced from.
    ///
    /// Spans outside the source are clamped rather than rejected; the lexer
    /// reports end-of-input positions one past the last byte.
    pub fn to_report(&self, source: &str) -> Report {
        let len = source.len();
        let labels = self
            .labels
            .iter()
            .map(|label| {
                let start = label.span.start.min(len);
                let end = label.span.end.min(len).max(start);
                let span = (start, end - start);
                match label.role {
                    LabelRole::Primary => {
                        LabeledSpan::new_primary_with_span(Some(label.message.clone()), span)
                    }
                    LabelRole::Secondary => {
                        LabeledSpan::new_with_span(Some(label.message.clone()), span)
                    }
                }
            })
            .collect();

        let diagnostic = BuiltDiagnostic {
            message: self.message.clone(),
            code: self.code.clone(),
            help: self.help.clone(),
            labels,
        };

        Report::new(diagnostic).with_source_code(source.to_string())
    }
}

/// The final diagnostic type that implements miette's Diagnostic trait.
#[derive(Debug)]
struct BuiltDiagnostic {
    message: String,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for BuiltDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BuiltDiagnostic {}

impl Diagnostic for BuiltDiagnostic {
    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diag_builder() {
        let diag = Diag::error("double system query option '$top'")
            .with_label(DiagLabel::primary(20..24, "repeated here"))
            .with_label(DiagLabel::secondary(10..14, "first given here"))
            .with_code("semantic::double_system_query_option")
            .with_help("remove one of the clauses");

        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[0].role, LabelRole::Primary);
        assert_eq!(diag.labels[1].role, LabelRole::Secondary);
        assert_eq!(
            diag.code.as_deref(),
            Some("semantic::double_system_query_option")
        );
        assert!(diag.help.is_some());
    }

    #[test]
    fn report_carries_code_and_labels() {
        let source = "Orders($top=1;$top=2)";
        let report = Diag::error("double system query option '$top'")
            .with_label(DiagLabel::primary(14..18, "repeated here"))
            .with_code("semantic::double_system_query_option")
            .to_report(source);

        assert_eq!(report.to_string(), "double system query option '$top'");
        let code = report.code().map(|c| c.to_string());
        assert_eq!(
            code.as_deref(),
            Some("semantic::double_system_query_option")
        );
        let labels: Vec<_> = report.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 14);
        assert_eq!(labels[0].len(), 4);
    }

    #[test]
    fn report_clamps_out_of_bounds_spans() {
        let report = Diag::error("unexpected end of input")
            .with_label(DiagLabel::primary(40..45, "here"))
            .to_report("Orders(");
        let labels: Vec<_> = report.labels().into_iter().flatten().collect();
        assert_eq!(labels[0].offset(), 7);
        assert_eq!(labels[0].len(), 0);
    }
}
