//! Error adapter for converting TesseraError to miette diagnostics.
//!
//! Parse errors keep their source spans and are rendered with snippets. The
//! route, geometry and invariant errors carry their stable code; invariant
//! violations are additionally flagged as internal bugs.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use tessera::TesseraError;
use tessera_parser::{Position, error::Diagnostic};

const INTERNAL_HELP: &str =
    "this is an internal error of tessera, not a problem with the diagram; please report it";

/// Adapter for a single parser diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            // Reader errors may only know where they happened.
            let position = self.diag.position()?;
            let span = position_to_miette(self.src, position)?;
            let message = format!("line {}, column {}", position.line(), position.column());
            return Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
                Some(message),
                span,
            ))));
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`TesseraError`] variants without source spans.
pub struct ErrorAdapter<'a>(pub &'a TesseraError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TesseraError::Io(_) => "tessera::io",
            TesseraError::Parse { .. } => return None,
            TesseraError::Route { code, .. } => code.as_str(),
            TesseraError::Geometry { code, .. } => code.as_str(),
            TesseraError::Invariant { code, .. } => code.as_str(),
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.0
            .is_internal()
            .then(|| Box::new(INTERNAL_HELP) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

fn span_to_miette(span: tessera_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// The character at a 1-based line and column, or the end of the line when
/// the column is past it.
fn position_to_miette(src: &str, position: Position) -> Option<SourceSpan> {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(position.line().checked_sub(1)?)
        .map(str::len)
        .sum();
    let line = src.get(line_start..)?.lines().next().unwrap_or_default();
    let column = position.column().checked_sub(1)?;
    let span = match line.char_indices().nth(column) {
        Some((offset, ch)) => SourceSpan::new((line_start + offset).into(), ch.len_utf8()),
        None => SourceSpan::new((line_start + line.len()).into(), 0),
    };
    Some(span)
}

/// Convert a [`TesseraError`] into a list of reportable errors.
///
/// Parse errors yield one [`Reportable`] per diagnostic; every other
/// variant yields a single one.
pub fn to_reportables(err: &TesseraError) -> Vec<Reportable<'_>> {
    match err {
        TesseraError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use tessera::{InvariantCode, RouteErrorCode};
    use tessera_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("unknown link endpoint")
            .with_code(ErrorCode::E202)
            .with_label(Span::new(5..6), "no box named `b`")
            .with_help("declare the box before linking it");
        let err = TesseraError::new_parse_error(ParseError::from(diag), "(a)\n{a -> b}");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "unknown link endpoint");
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()).as_deref(),
            Some("E202")
        );
        assert!(reportables[0].source_code().is_some());
    }

    #[test]
    fn test_labels_keep_primary_flag() {
        let diag = Diagnostic::error("duplicate name")
            .with_label(Span::new(0..3), "declared again here")
            .with_secondary_label(Span::new(5..8), "first declared here");

        let adapter = DiagnosticAdapter::new(&diag, "(a)\n(a)");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("first declared here"));
    }

    #[test]
    fn test_position_becomes_primary_label() {
        let diag = Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_position(Position::new(3, 3));

        let adapter = DiagnosticAdapter::new(&diag, "(a)\n(b)\n  %");

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 10);
        assert_eq!(labels[0].len(), 1);
        assert_eq!(labels[0].label(), Some("line 3, column 3"));
    }

    #[test]
    fn test_position_past_line_end() {
        let src = "(a)\n[b";
        let at = |line, column| position_to_miette(src, Position::new(line, column));

        assert_eq!(at(2, 3), Some(SourceSpan::new(6usize.into(), 0)));
        assert_eq!(at(1, 1), Some(SourceSpan::new(0usize.into(), 1)));
        assert_eq!(at(0, 1), None);
        assert!(DiagnosticAdapter::new(&Diagnostic::error("bare"), src).labels().is_none());
    }

    #[test]
    fn test_route_error_has_code_without_help() {
        let err = TesseraError::route(RouteErrorCode::R101, "g contains g.a");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(
            reportables[0].code().map(|code| code.to_string()).as_deref(),
            Some("R101")
        );
        assert!(reportables[0].help().is_none());
    }

    #[test]
    fn test_invariant_error_is_flagged_internal() {
        let err = TesseraError::invariant(InvariantCode::I003, "road main(n1, 0) missing");

        let reportables = to_reportables(&err);
        let help = reportables[0].help().map(|help| help.to_string());
        assert_eq!(help.as_deref(), Some(INTERNAL_HELP));
        assert!(reportables[0].to_string().starts_with("internal error[I003]"));
    }
}
