//! Semantic model of a resolved Tessera diagram.
//!
//! The tree resolver turns the raw reader output into a [`Diagram`]: an
//! arena of [`Node`]s addressed by [`NodeId`], the concrete [`Link`]s
//! between them, and the document-wide [`DocAttributes`]. Every later stage
//! of the pipeline only reads this model.

mod document;
mod graph;
mod link;
mod node;

pub use document::{DocAttributes, Spacing};
pub use graph::{GraphError, NodeGraph};
pub use link::{Endpoint, Link, LinkId, LinkMarkers};
pub use node::{Alignment, FlexDirection, Node, NodeId, NodeKind};

/// A fully resolved diagram.
#[derive(Debug, Clone)]
pub struct Diagram {
    doc: DocAttributes,
    graph: NodeGraph,
    links: Vec<Link>,
}

impl Diagram {
    pub fn new(doc: DocAttributes, graph: NodeGraph, links: Vec<Link>) -> Self {
        Self { doc, graph, links }
    }

    /// Returns the document attributes.
    pub fn doc(&self) -> &DocAttributes {
        &self.doc
    }

    /// Returns the node arena.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Returns a mutable reference to the node arena.
    pub fn graph_mut(&mut self) -> &mut NodeGraph {
        &mut self.graph
    }

    /// Returns the links in declaration order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Replaces the link list, returning the previous one.
    pub fn replace_links(&mut self, links: Vec<Link>) -> Vec<Link> {
        std::mem::replace(&mut self.links, links)
    }
}
