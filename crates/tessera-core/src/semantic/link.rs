//! Resolved links between nodes.

use std::fmt;

use serde::Serialize;

use crate::{compass::Direct, semantic::node::NodeId};

/// Index of a link in the diagram's link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LinkId(usize);

impl LinkId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link {}", self.0)
    }
}

/// One side of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: NodeId,
    /// Edge of the node the link must leave from, relative to the node's
    /// parent frame. `None` lets the route planner choose.
    pub edge: Option<Direct>,
}

impl Endpoint {
    pub fn new(node: NodeId, edge: Option<Direct>) -> Self {
        Self { node, edge }
    }
}

/// Arrow markers drawn at the two ends of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LinkMarkers {
    pub start: bool,
    pub end: bool,
}

/// A concrete link between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
    /// Body of the link-type token with markers and edge digits removed,
    /// e.g. `-` for `->` or `=` for `<=>`.
    pub kind: String,
    pub markers: LinkMarkers,
    pub label: Option<String>,
    pub tags: Vec<String>,
}

impl Link {
    pub fn new(from: Endpoint, to: Endpoint, kind: impl Into<String>) -> Self {
        Self {
            from,
            to,
            kind: kind.into(),
            markers: LinkMarkers::default(),
            label: None,
            tags: Vec::new(),
        }
    }

    pub fn with_markers(mut self, markers: LinkMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}
