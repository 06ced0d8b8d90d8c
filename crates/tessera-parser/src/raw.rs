//! Reader output: the raw document tree.
//!
//! The reader builds a [`RawDocument`] without interpreting attribute
//! values. Boxes are already nested by path, so a [`RawNode`] tree mirrors
//! the final diagram tree; links still refer to their endpoints by access
//! expression.

use tessera_core::{compass::Direct, semantic::NodeKind};

use crate::span::{Position, Span};

/// A `key` or `key=value` pair as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    pub key: String,
    pub value: Option<String>,
    pub span: Span,
    pub position: Position,
}

impl RawAttribute {
    pub fn new(key: impl Into<String>, value: Option<String>, span: Span, position: Position) -> Self {
        Self {
            key: key.into(),
            value,
            span,
            position,
        }
    }
}

/// A box as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub kind: NodeKind,
    /// Path segment naming this node, `None` for anonymous boxes.
    pub name: Option<String>,
    pub attributes: Vec<RawAttribute>,
    pub children: Vec<RawNode>,
    /// Span of the header that declared the node (or first mentioned it).
    pub span: Span,
    pub position: Position,
    /// Created on demand as an intermediate path segment and never
    /// declared by its own header.
    pub implicit: bool,
}

impl RawNode {
    pub fn new(kind: NodeKind, name: Option<String>, span: Span, position: Position) -> Self {
        Self {
            kind,
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            span,
            position,
            implicit: false,
        }
    }

    /// The synthetic root unit.
    pub fn root() -> Self {
        Self::new(NodeKind::Unit, None, Span::default(), Position::default())
    }

    /// Index of the named child, if any.
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.name.as_deref() == Some(name))
    }

    /// Follows a tree address (child indices from this node).
    pub fn at(&self, address: &[usize]) -> Option<&RawNode> {
        address
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable variant of [`RawNode::at`].
    pub fn at_mut(&mut self, address: &[usize]) -> Option<&mut RawNode> {
        address
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }
}

/// How a link endpoint selects nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAccess {
    /// Named path followed from `base`, a tree address. Absolute paths
    /// start at the root (empty base); relative paths start at the container
    /// that was open when the link was read.
    Path { base: Vec<usize>, segments: Vec<String> },
    /// `&name`: the first node declared with that name.
    Name(String),
    /// `$tag`: every node carrying the tag.
    Tag(String),
    /// A box addressed by its position in the raw tree; used by short links,
    /// which may join anonymous boxes.
    Address(Vec<usize>),
}

/// One side of a raw link.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEndpoint {
    pub access: RawAccess,
    pub span: Span,
    pub position: Position,
}

/// A decoded link-type token such as `1<->3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkToken {
    /// Body without markers, e.g. `-` for `->`.
    pub kind: String,
    pub start_marker: bool,
    pub end_marker: bool,
    /// Edge of the source node, relative to its parent frame.
    pub from_edge: Option<Direct>,
    /// Edge of the target node, relative to its parent frame.
    pub to_edge: Option<Direct>,
}

/// A link as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLink {
    pub from: RawEndpoint,
    pub to: RawEndpoint,
    pub token: LinkToken,
    pub attributes: Vec<RawAttribute>,
    pub span: Span,
    pub position: Position,
}

/// Everything the reader produced for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// Document attributes from the header.
    pub attributes: Vec<RawAttribute>,
    /// The synthetic root; root header attributes live on it.
    pub root: RawNode,
    pub links: Vec<RawLink>,
}

impl Default for RawDocument {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            root: RawNode::root(),
            links: Vec::new(),
        }
    }
}
