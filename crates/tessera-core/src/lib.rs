//! Tessera Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tessera parser
//! and layout pipeline. It includes:
//!
//! - **Compass**: Direction and frame algebra for nested containers ([`compass`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Semantic**: The resolved node graph, links and document attributes ([`semantic`] module)

pub mod compass;
pub mod geometry;
pub mod semantic;
