//! Error codes for the Tessera diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexical errors (scanner)
//! - `E1xx` - Syntax errors (reader structure)
//! - `E2xx` - Reference and attribute errors (attribute validation, resolver)

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexical Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted string.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in this context.
    E002,

    /// Invalid escape sequence.
    ///
    /// Quoted strings only accept `\"` and `\\`.
    E003,

    /// Unterminated box or link header.
    ///
    /// A `[`, `[[`, `(` or `{` was opened but the input ended before the
    /// matching closing bracket.
    E004,

    /// Invalid link-type token.
    ///
    /// Edge digits must be `0`-`3` and must be attached to a body made of
    /// `-`, `=`, `.`, `~`, `<` and `>`.
    E005,

    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected construct.
    ///
    /// The reader found something it did not expect at this position, for
    /// example a link header without its second endpoint.
    E100,

    /// Root configured twice.
    ///
    /// Only one `---` separator line may carry root attributes.
    E101,

    /// Dangling short link.
    ///
    /// A link-type token between boxes is missing the box before or after it.
    E102,

    /// Invalid access name.
    ///
    /// A path, `&name` or `$tag` expression could not be read.
    E103,

    /// Document attribute out of place.
    ///
    /// Document attributes must appear before the first separator or box.
    E104,

    // =========================================================================
    // Reference and Attribute Errors (E2xx)
    // =========================================================================
    /// Invalid attribute value.
    ///
    /// An attribute value is missing or malformed.
    E200,

    /// Attribute not allowed on this kind of box.
    ///
    /// `width` and `height` are only valid on cells.
    E201,

    /// Link endpoint matches no node.
    ///
    /// A path, `&name` or `$tag` used as a link endpoint selects nothing.
    E202,

    /// Duplicate name in scope.
    ///
    /// Two children of the same container carry the same name.
    E203,

    /// Attributes given twice.
    ///
    /// A node that already received attributes is declared again with
    /// attributes.
    E204,

    /// Link between related nodes.
    ///
    /// A link joins a node to itself, to one of its ancestors, or to one of
    /// its descendants.
    E205,

    /// Conflicting box kind.
    ///
    /// A cell is used as a container, or a node is redeclared with another
    /// kind.
    E206,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Syntax errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            // Reference and attribute errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::E001 => "unterminated quoted string",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "unterminated header",
            ErrorCode::E005 => "invalid link-type token",
            // Syntax errors
            ErrorCode::E100 => "unexpected construct",
            ErrorCode::E101 => "root configured twice",
            ErrorCode::E102 => "dangling short link",
            ErrorCode::E103 => "invalid access name",
            ErrorCode::E104 => "document attribute out of place",
            // Reference and attribute errors
            ErrorCode::E200 => "invalid attribute value",
            ErrorCode::E201 => "attribute not allowed here",
            ErrorCode::E202 => "link endpoint matches no node",
            ErrorCode::E203 => "duplicate name in scope",
            ErrorCode::E204 => "attributes given twice",
            ErrorCode::E205 => "link between related nodes",
            ErrorCode::E206 => "conflicting box kind",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
