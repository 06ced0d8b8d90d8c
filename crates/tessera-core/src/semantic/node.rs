//! Nodes of the resolved diagram tree.

use std::fmt;

use serde::Serialize;

use crate::{
    compass::{Compass, Direct},
    geometry::Size,
    semantic::document::Spacing,
};

/// Index of a node inside its [`NodeGraph`](super::NodeGraph).
///
/// Ids are assigned in depth-first declaration order; the synthetic root is
/// always [`NodeId::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// The id of the synthetic root node.
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three kinds of boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Container drawn with a frame and an optional header label.
    Group,
    /// Plain container.
    Unit,
    /// Leaf box with content.
    Cell,
}

impl NodeKind {
    /// Returns `true` for the kinds that may hold children.
    pub fn is_container(self) -> bool {
        match self {
            NodeKind::Group | NodeKind::Unit => true,
            NodeKind::Cell => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Unit => "unit",
            NodeKind::Cell => "cell",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of a `direction` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlexDirection {
    Row,
    Column,
    RowReverse,
    ColumnReverse,
    /// Keep the parent's orientation.
    Main,
    /// Rotate the parent's orientation (the default).
    Cross,
}

impl FlexDirection {
    /// Parses an attribute value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "row" => Some(FlexDirection::Row),
            "column" => Some(FlexDirection::Column),
            "row_reverse" => Some(FlexDirection::RowReverse),
            "column_reverse" => Some(FlexDirection::ColumnReverse),
            "main" => Some(FlexDirection::Main),
            "cross" => Some(FlexDirection::Cross),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlexDirection::Row => "row",
            FlexDirection::Column => "column",
            FlexDirection::RowReverse => "row_reverse",
            FlexDirection::ColumnReverse => "column_reverse",
            FlexDirection::Main => "main",
            FlexDirection::Cross => "cross",
        }
    }

    /// Resolves the compass of a container given the compass of its parent.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tessera_core::{compass::{Compass, Direct}, semantic::FlexDirection};
    /// let column = FlexDirection::Cross.compass(Compass::CANVAS);
    /// assert_eq!(column.main(), Direct::DOWN);
    /// assert_eq!(FlexDirection::Main.compass(column), column);
    /// ```
    pub fn compass(self, parent: Compass) -> Compass {
        match self {
            FlexDirection::Row => Compass::ROW,
            FlexDirection::Column => Compass::COLUMN,
            FlexDirection::RowReverse => Compass::ROW_REVERSE,
            FlexDirection::ColumnReverse => Compass::COLUMN_REVERSE,
            FlexDirection::Main => parent,
            FlexDirection::Cross => parent.swap(),
        }
    }
}

impl fmt::Display for FlexDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-axis alignment of a child inside its container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Alignment {
    /// Parses an attribute value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Alignment::Start),
            "center" => Some(Alignment::Center),
            "end" => Some(Alignment::End),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::End => "end",
        }
    }

    /// Offset of an item of extent `item` inside `available` space.
    ///
    /// Centering rounds down so item edges stay on whole units.
    pub fn offset(self, available: f32, item: f32) -> f32 {
        let free = (available - item).max(0.0);
        match self {
            Alignment::Start => 0.0,
            Alignment::Center => (free / 2.0).floor(),
            Alignment::End => free,
        }
    }
}

/// A resolved box.
///
/// Nodes live in a [`NodeGraph`](super::NodeGraph) arena. Relations between
/// nodes are stored as ids; siblings are obtained through the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Arena index of this node.
    pub id: NodeId,
    pub kind: NodeKind,
    /// Canonical access name, `None` for anonymous boxes.
    pub path: Option<String>,
    /// Last path segment, empty for anonymous boxes and the root.
    pub name: String,
    pub label: Option<String>,
    pub tags: Vec<String>,
    /// Cross-axis alignment; applies to this node inside its parent and is
    /// the fallback for this node's children.
    pub align: Option<Alignment>,
    pub spacing: Spacing,
    /// Explicit content width (cells only).
    pub width: Option<f32>,
    /// Explicit content height (cells only).
    pub height: Option<f32>,
    /// Absolute compass used to lay out this node's children.
    pub compass_items: Compass,
    /// Absolute compass of the parent frame this node is placed in.
    pub compass_self: Compass,
    pub parent: Option<NodeId>,
    /// Root-to-parent ancestor chain, self excluded.
    pub parents: Vec<NodeId>,
    /// Children in declaration order (containers only).
    pub children: Vec<NodeId>,
    /// Position inside the parent's children.
    pub index: usize,
    /// Boundary numbers indexed by absolute direction.
    ///
    /// `bn_parents[d]` counts how many container levels a line leaving this
    /// node in direction `d` crosses before it reaches a gap between
    /// siblings. It is at least 1.
    pub bn_parents: [u32; 4],
}

impl Node {
    /// Creates a detached node with canvas compasses and no relations.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            path: None,
            name: String::new(),
            label: None,
            tags: Vec::new(),
            align: None,
            spacing: Spacing::default(),
            width: None,
            height: None,
            compass_items: Compass::CANVAS,
            compass_self: Compass::CANVAS,
            parent: None,
            parents: Vec::new(),
            children: Vec::new(),
            index: 0,
            bn_parents: [1; 4],
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Nesting depth: 0 for the root.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Boundary number in the absolute direction `direct`.
    pub fn bn(&self, direct: Direct) -> u32 {
        self.bn_parents[direct.index()]
    }

    /// Explicit content size, if both dimensions are known.
    pub fn explicit_size(&self) -> Option<Size> {
        Some(Size::new(self.width?, self.height?))
    }

    /// Number of road gaps on the main axis (`children + 1`).
    pub fn main_avenues(&self) -> usize {
        self.children.len() + 1
    }

    /// Human readable reference used in logs and error messages.
    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) if !path.is_empty() => path.clone(),
            _ if self.is_root() => "<root>".to_string(),
            _ => format!("<anonymous {} {}>", self.kind, self.id),
        }
    }
}
