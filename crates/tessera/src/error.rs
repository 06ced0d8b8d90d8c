//! Error types for Tessera operations.
//!
//! This module provides the main error type [`TesseraError`] which wraps
//! every failure of the pipeline, together with the stable error codes of
//! the stages that run after parsing.
//!
//! | prefix | stage |
//! |---|---|
//! | `E` | reader and resolver (see [`tessera_parser::error::ErrorCode`]) |
//! | `R` | route planner ([`RouteErrorCode`]) |
//! | `G` | geometry engine ([`GeometryErrorCode`]) |
//! | `I` | internal invariants ([`InvariantCode`]) |

use std::{fmt, io};

use thiserror::Error;

use tessera_parser::error::ParseError;

/// Error codes of the route planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteErrorCode {
    /// A link joins a node to its own ancestor or descendant.
    R101,
    /// The stub climb exceeded its recursion cap.
    ///
    /// Only corrupted boundary numbers can cause this.
    R102,
    /// No candidate route exists for a link.
    R103,
    /// A produced route does not reach one of its endpoints.
    R104,
}

impl RouteErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteErrorCode::R101 => "R101",
            RouteErrorCode::R102 => "R102",
            RouteErrorCode::R103 => "R103",
            RouteErrorCode::R104 => "R104",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RouteErrorCode::R101 => "link between a node and its ancestor",
            RouteErrorCode::R102 => "route climb depth limit exceeded",
            RouteErrorCode::R103 => "no route candidate",
            RouteErrorCode::R104 => "route does not reach its endpoint",
        }
    }

    /// Codes that signal corrupted internal data rather than a bad diagram.
    pub fn is_internal(self) -> bool {
        match self {
            RouteErrorCode::R101 | RouteErrorCode::R103 => false,
            RouteErrorCode::R102 | RouteErrorCode::R104 => true,
        }
    }
}

impl fmt::Display for RouteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes of the geometry engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryErrorCode {
    /// The node tree is nested deeper than the sizing recursion allows.
    G101,
}

impl GeometryErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryErrorCode::G101 => "G101",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GeometryErrorCode::G101 => "layout depth limit exceeded",
        }
    }
}

impl fmt::Display for GeometryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Codes of internal invariant violations.
///
/// None of these can be reached from user input; hooks that hand corrupted
/// data to a later stage can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantCode {
    /// Two nodes share no ancestor.
    I001,
    /// A node id or road refers outside the diagram.
    I002,
    /// A route passes a road the lane table does not know.
    I003,
    /// The reference geometry lacks a road or node the planner needs.
    I004,
}

impl InvariantCode {
    pub fn as_str(self) -> &'static str {
        match self {
            InvariantCode::I001 => "I001",
            InvariantCode::I002 => "I002",
            InvariantCode::I003 => "I003",
            InvariantCode::I004 => "I004",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InvariantCode::I001 => "nodes without common ancestor",
            InvariantCode::I002 => "reference outside the diagram",
            InvariantCode::I003 => "road missing from the lane table",
            InvariantCode::I004 => "reference geometry incomplete",
        }
    }
}

impl fmt::Display for InvariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for Tessera operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant contains structured error information with source code
/// spans. The source is kept with line endings normalized, so spans index
/// into `src` directly.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("route error[{code}]: {message}")]
    Route {
        code: RouteErrorCode,
        message: String,
    },

    #[error("geometry error[{code}]: {message}")]
    Geometry {
        code: GeometryErrorCode,
        message: String,
    },

    #[error("internal error[{code}]: {message}")]
    Invariant {
        code: InvariantCode,
        message: String,
    },
}

impl TesseraError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    pub fn route(code: RouteErrorCode, message: impl Into<String>) -> Self {
        Self::Route {
            code,
            message: message.into(),
        }
    }

    pub fn geometry(code: GeometryErrorCode, message: impl Into<String>) -> Self {
        Self::Geometry {
            code,
            message: message.into(),
        }
    }

    pub fn invariant(code: InvariantCode, message: impl Into<String>) -> Self {
        Self::Invariant {
            code,
            message: message.into(),
        }
    }

    /// The stable code of this error, if it has one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TesseraError::Io(_) => None,
            TesseraError::Parse { err, .. } => err
                .first()
                .and_then(|diagnostic| diagnostic.code())
                .map(|code| code.as_str()),
            TesseraError::Route { code, .. } => Some(code.as_str()),
            TesseraError::Geometry { code, .. } => Some(code.as_str()),
            TesseraError::Invariant { code, .. } => Some(code.as_str()),
        }
    }

    /// Returns `true` for errors that indicate a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        match self {
            TesseraError::Invariant { .. } => true,
            TesseraError::Route { code, .. } => code.is_internal(),
            TesseraError::Io(_) | TesseraError::Parse { .. } | TesseraError::Geometry { .. } => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TesseraError::route(RouteErrorCode::R103, "no way from a to b");
        assert_eq!(err.to_string(), "route error[R103]: no way from a to b");
        assert_eq!(err.code(), Some("R103"));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_internal_classification() {
        assert!(TesseraError::invariant(InvariantCode::I001, "x").is_internal());
        assert!(TesseraError::route(RouteErrorCode::R104, "x").is_internal());
        assert!(TesseraError::route(RouteErrorCode::R102, "x").is_internal());
        assert!(!TesseraError::geometry(GeometryErrorCode::G101, "x").is_internal());
    }
}
