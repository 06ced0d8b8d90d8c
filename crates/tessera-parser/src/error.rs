//! Error and diagnostic system for the Tessera reader and resolver.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans and a line/column position for every failure
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error message with an error code, source locations, and optional
//! help text. Diagnostics are wrapped in [`ParseError`] when returned from
//! [`read`](crate::read), [`resolve`](crate::resolve) or [`parse`](crate::parse).
//! Reading stops at the first error.
//!
//! # Example
//!
//! ```
//! # use tessera_parser::error::{Diagnostic, ErrorCode};
//! # use tessera_parser::{Position, Span};
//!
//! let diag = Diagnostic::error("name `a` is declared twice in this container")
//!     .with_code(ErrorCode::E203)
//!     .with_label(Span::new(40..43), "duplicate name")
//!     .with_secondary_label(Span::new(10..13), "first declared here")
//!     .with_position(Position::new(4, 2));
//! assert_eq!(diag.position(), Some(Position::new(4, 2)));
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
