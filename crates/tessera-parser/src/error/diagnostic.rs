//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error or warning with an error
//! code, labeled source spans, the line/column where it starts, and help
//! text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::{Position, Span},
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E202]: link endpoint `$db` matches no node
///   --> diagram.tsr:7:9
///    |
///  7 | {web -> $db}
///    |         ^^^ no node carries this tag
///    |
///    = help: add `tag=db` to the database box
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    position: Option<Position>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use tessera_parser::error::{Diagnostic, ErrorCode};
    /// # use tessera_parser::Span;
    ///
    /// let diag = Diagnostic::error("unexpected character `%`")
    ///     .with_code(ErrorCode::E002)
    ///     .with_label(Span::new(0..1), "not valid here")
    ///     .with_help("boxes start with `[`, `[[` or `(`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    /// Line and column where the problem starts.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the line/column position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            position: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message (at 3:7)" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(position) = self.position {
            write!(f, " (at {})", position)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.position().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("name `a` is declared twice in this container")
            .with_code(ErrorCode::E203)
            .with_secondary_label(Span::new(2..3), "first declared here")
            .with_label(Span::new(10..11), "duplicate name")
            .with_help("rename one of the boxes");

        assert_eq!(diag.code(), Some(ErrorCode::E203));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.primary_span(), Some(Span::new(10..11)));
        assert_eq!(diag.help(), Some("rename one of the boxes"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("unexpected character `%`").with_code(ErrorCode::E002);
        assert_eq!(diag.to_string(), "error[E002]: unexpected character `%`");

        let diag = diag.with_position(Position::new(3, 7));
        assert_eq!(
            diag.to_string(),
            "error[E002]: unexpected character `%` (at 3:7)"
        );

        let warning = Diagnostic::warning("unused tag");
        assert_eq!(warning.to_string(), "warning: unused tag");
    }
}
