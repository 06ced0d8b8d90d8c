//! # Tessera Parser
//!
//! Reader and tree resolver for the Tessera diagram language. This crate
//! turns source text into the resolved [`Diagram`] every later layout stage
//! works on.
//!
//! ## Usage
//!
//! ```
//! # use tessera_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         lane_min=1
//!         --- direction=row
//!         [[web label="Web"]]
//!         (.api) -> (.db)
//!     "#;
//!
//!     let diagram = parse(source)?;
//!     assert_eq!(diagram.links().len(), 1);
//!     Ok(())
//! }
//! ```

mod access;
mod attributes;
pub mod error;
pub mod raw;
mod reader;
mod resolve;
mod span;

pub use access::{access_name_to_path, path_to_access_name};
pub use error::ParseError;
pub use reader::normalize_newlines;
pub use span::{Position, Span};

use log::debug;

use tessera_core::semantic::Diagram;

use raw::RawDocument;

/// Read source text into a raw document.
///
/// Line endings are normalized first; every span in the result and in
/// returned diagnostics refers to [`normalize_newlines`]`(source)`.
///
/// # Errors
///
/// Returns a [`ParseError`] holding the first lexical or syntax error.
pub fn read(source: &str) -> Result<RawDocument, ParseError> {
    let source = normalize_newlines(source);
    let doc = reader::read_document(&source)?;
    debug!(
        boxes = doc.root.children.len(),
        links = doc.links.len();
        "Read document"
    );
    Ok(doc)
}

/// Resolve a raw document into a [`Diagram`].
///
/// Assigns node ids, compasses and boundary numbers, validates attributes
/// and expands links over their selected endpoints.
///
/// # Errors
///
/// Returns a [`ParseError`] for invalid attribute values, duplicate names,
/// unknown link endpoints and links between related boxes.
pub fn resolve(doc: RawDocument) -> Result<Diagram, ParseError> {
    Ok(resolve::resolve_document(doc)?)
}

/// Parse source text into a resolved [`Diagram`].
///
/// This is [`read`] followed by [`resolve`].
///
/// # Errors
///
/// Returns the first [`ParseError`] of either step.
///
/// # Example
///
/// ```
/// # use tessera_parser::{parse, ParseError};
///
/// fn main() -> Result<(), ParseError> {
///     let diagram = parse("(a) -> (b)")?;
///     assert_eq!(diagram.graph().len(), 3);
///     Ok(())
/// }
/// ```
pub fn parse(source: &str) -> Result<Diagram, ParseError> {
    resolve(read(source)?)
}
