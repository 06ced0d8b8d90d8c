//! Document-wide attributes and per-node spacing.

use serde::Serialize;

use crate::{
    geometry::Insets,
    semantic::node::{Alignment, FlexDirection, NodeKind},
};

/// The three nested spacing layers of a box, outermost first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spacing {
    pub margin: Insets,
    pub border: Insets,
    pub padding: Insets,
}

impl Spacing {
    pub fn new(margin: Insets, border: Insets, padding: Insets) -> Self {
        Self {
            margin,
            border,
            padding,
        }
    }

    /// Margin, border and padding added together.
    pub fn total(&self) -> Insets {
        self.margin.add(self.border).add(self.padding)
    }

    /// Border and padding added together (the part inside the visible box).
    pub fn inner(&self) -> Insets {
        self.border.add(self.padding)
    }
}

/// Attributes declared in the document header.
///
/// Every field has a default, so a document without a header is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct DocAttributes {
    pub unit: Spacing,
    pub group: Spacing,
    pub cell: Spacing,
    /// Width of one character for the default text measure.
    pub char_width: f32,
    /// Height of one text line for the default text measure.
    pub line_height: f32,
    /// Width of one lane inside a road.
    pub lane_width: f32,
    /// Minimum number of lanes reserved in every road.
    ///
    /// Defaults to 0: a road no link passes through collapses to zero
    /// width. The reference layout used for route planning raises it to the
    /// configured `dummy_lane_min` so every road keeps a center line.
    pub lane_min: usize,
    /// Distance between neighbouring gates on one edge.
    pub gate_gap: f32,
    /// Stroke width of links.
    pub link_border: f32,
    /// Direction of the root, unless the root header sets one.
    pub direction: Option<FlexDirection>,
    /// Alignment of the root's children, unless the root header sets one.
    pub align: Option<Alignment>,
    /// Free-form style name passed through to renderers.
    pub style: Option<String>,
}

impl DocAttributes {
    /// Default spacing for a kind of box.
    pub fn spacing_for(&self, kind: NodeKind) -> Spacing {
        match kind {
            NodeKind::Group => self.group,
            NodeKind::Unit => self.unit,
            NodeKind::Cell => self.cell,
        }
    }

    /// Mutable default spacing for a kind of box.
    pub fn spacing_for_mut(&mut self, kind: NodeKind) -> &mut Spacing {
        match kind {
            NodeKind::Group => &mut self.group,
            NodeKind::Unit => &mut self.unit,
            NodeKind::Cell => &mut self.cell,
        }
    }
}

impl Default for DocAttributes {
    fn default() -> Self {
        Self {
            unit: Spacing::new(Insets::default(), Insets::default(), Insets::uniform(4.0)),
            group: Spacing::new(Insets::uniform(4.0), Insets::uniform(1.0), Insets::uniform(8.0)),
            cell: Spacing::new(Insets::uniform(4.0), Insets::uniform(1.0), Insets::uniform(6.0)),
            char_width: 8.0,
            line_height: 16.0,
            lane_width: 8.0,
            lane_min: 0,
            gate_gap: 8.0,
            link_border: 1.0,
            direction: None,
            align: None,
            style: None,
        }
    }
}
