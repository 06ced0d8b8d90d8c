//! The absolutely positioned output of the pipeline.
//!
//! Every coordinate is in canvas space: X grows to the right, Y grows down,
//! and the root's outer box starts at the origin. Nothing here depends on
//! container orientation any more, so a renderer only has to draw boxes and
//! polylines.

use serde::Serialize;

use tessera_core::{
    compass::{Axis, Direct},
    geometry::{Bounds, Point, Size},
    semantic::{LinkId, LinkMarkers, NodeId, NodeKind},
};

use crate::route::RoadKey;

/// A text anchored in a box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayout {
    pub text: String,
    pub bounds: Bounds,
}

/// Where one link endpoint attaches to a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gate {
    pub link: LinkId,
    /// Absolute direction of the edge the gate sits on.
    pub edge: Direct,
    pub point: Point,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: NodeId,
    pub kind: NodeKind,
    pub path: Option<String>,
    /// Box including the margin.
    pub bounds: Bounds,
    /// Box inside the margin: what a renderer draws.
    pub visible: Bounds,
    /// Box inside border and padding.
    pub content: Bounds,
    pub label: Option<LabelLayout>,
    pub gates: Vec<Gate>,
}

/// One lane of a road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaneLayout {
    pub lane: usize,
    /// The link travelling this lane, if any.
    pub link: Option<LinkId>,
    /// Coordinate of the lane's center line along the road's fixed axis.
    pub line: f32,
    pub bounds: Bounds,
}

/// A positioned road.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadLayout {
    pub key: RoadKey,
    pub bounds: Bounds,
    /// Absolute axis along which every point of the road shares one
    /// coordinate band.
    pub fixed_axis: Axis,
    pub lanes: Vec<LaneLayout>,
}

impl RoadLayout {
    /// Center of the road band along its fixed axis.
    pub fn center_line(&self) -> f32 {
        let (start, end) = self.bounds.range(self.fixed_axis);
        (start + end) / 2.0
    }

    /// Center line of `lane`, falling back to the road center.
    pub fn lane_line(&self, lane: Option<usize>) -> f32 {
        lane.and_then(|index| self.lanes.get(index))
            .map_or_else(|| self.center_line(), |lane| lane.line)
    }
}

/// A routed link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLayout {
    pub link: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: String,
    pub markers: LinkMarkers,
    pub label: Option<String>,
    /// Anchor of the label: the middle of the longest segment.
    pub label_anchor: Option<Point>,
    /// Orthogonal polyline from the source gate to the target gate.
    pub points: Vec<Point>,
}

/// The complete layout of a diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub size: Size,
    /// The document's style name, untouched.
    pub style: Option<String>,
    /// Stroke width for links.
    pub link_border: f32,
    /// Nodes indexed by id.
    pub nodes: Vec<NodeLayout>,
    /// Links in link order.
    pub links: Vec<LinkLayout>,
    /// Roads in allocation order.
    pub roads: Vec<RoadLayout>,
}

impl Layout {
    pub fn node(&self, id: NodeId) -> Option<&NodeLayout> {
        self.nodes.get(id.index()).filter(|node| node.id == id)
    }

    pub fn road(&self, key: RoadKey) -> Option<&RoadLayout> {
        self.roads.iter().find(|road| road.key == key)
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkLayout> {
        self.links.get(id.index()).filter(|link| link.link == id)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn road() -> RoadLayout {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 10.0), Size::new(100.0, 16.0));
        RoadLayout {
            key: RoadKey::main(NodeId::ROOT, 1),
            bounds,
            fixed_axis: Axis::Cross,
            lanes: vec![
                LaneLayout {
                    lane: 0,
                    link: Some(LinkId::new(0)),
                    line: 14.0,
                    bounds,
                },
                LaneLayout {
                    lane: 1,
                    link: None,
                    line: 22.0,
                    bounds,
                },
            ],
        }
    }

    #[test]
    fn test_road_lines() {
        let road = road();
        assert_approx_eq!(f32, road.center_line(), 18.0);
        assert_approx_eq!(f32, road.lane_line(Some(1)), 22.0);
        assert_approx_eq!(f32, road.lane_line(Some(5)), 18.0);
        assert_approx_eq!(f32, road.lane_line(None), 18.0);
    }

    #[test]
    fn test_lookup_checks_ids() {
        let layout = Layout {
            roads: vec![road()],
            ..Layout::default()
        };
        assert!(layout.road(RoadKey::main(NodeId::ROOT, 1)).is_some());
        assert!(layout.road(RoadKey::cross(NodeId::ROOT, 1)).is_none());
        assert!(layout.node(NodeId::ROOT).is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let layout = Layout {
            size: Size::new(10.0, 20.0),
            roads: vec![road()],
            ..Layout::default()
        };
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["roads"][0]["fixed_axis"], "cross");
        assert_eq!(json["roads"][0]["key"]["avenue"], 1);
        assert_eq!(json["roads"][0]["lanes"][0]["link"], 0);
    }
}
