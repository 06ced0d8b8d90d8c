//! Gates and link polylines.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use tessera_core::{
    compass::Direct,
    geometry::Point,
    semantic::{Link, LinkId, NodeId},
};

use super::{Gate, LinkLayout, NodeLayout, RoadLayout};
use crate::{
    error::{InvariantCode, TesseraError},
    route::{LinkRoute, RoadKey},
};

/// Points closer than this are treated as equal.
const EPSILON: f32 = 1e-3;

/// Which end of a link a gate serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum End {
    Source,
    Target,
}

/// Gate points keyed by link and end.
pub(super) type GatePoints = HashMap<(LinkId, End), Point>;

/// Spreads the endpoints sharing a node edge `gap` apart, centered on the
/// visible edge, and records them on the nodes.
///
/// Endpoints are ordered by link, source before target. When the edge is
/// too short for `gap`, the gates divide it evenly instead.
pub(super) fn place_gates(
    routes: &[LinkRoute],
    nodes: &mut [NodeLayout],
    gap: f32,
) -> Result<GatePoints, TesseraError> {
    let mut edges: IndexMap<(NodeId, Direct), Vec<(LinkId, End)>> = IndexMap::new();
    for route in routes {
        edges
            .entry((route.from, route.from_exit))
            .or_default()
            .push((route.link, End::Source));
        edges
            .entry((route.to, route.to_exit))
            .or_default()
            .push((route.link, End::Target));
    }

    let mut points = GatePoints::new();
    for ((id, edge), ends) in edges {
        let node = nodes
            .get_mut(id.index())
            .filter(|node| node.id == id)
            .ok_or_else(|| {
                TesseraError::invariant(InvariantCode::I002, format!("gate on unknown node {id}"))
            })?;

        let across = edge.axis().other();
        let (low, high) = node.visible.range(across);
        let center = node.visible.center().along(across);
        let count = ends.len() as f32;
        let step = gate_step(high - low, count, gap);

        for (slot, (link, end)) in ends.into_iter().enumerate() {
            let offset = (slot as f32 - (count - 1.0) / 2.0) * step;
            let point = Point::default()
                .with_along(edge.axis(), node.visible.edge(edge))
                .with_along(across, center + offset);
            node.gates.push(Gate { link, edge, point });
            points.insert((link, end), point);
        }
    }
    Ok(points)
}

/// Distance between neighbouring gates on an edge of `length`.
///
/// The outermost gates stay strictly inside the edge.
fn gate_step(length: f32, count: f32, gap: f32) -> f32 {
    if (count - 1.0) * gap < length {
        gap
    } else {
        length / (count + 1.0)
    }
}

/// Builds the polyline of every routed link.
pub(super) fn link_layouts(
    links: &[Link],
    routes: &[LinkRoute],
    roads: &[RoadLayout],
    gates: &GatePoints,
) -> Result<Vec<LinkLayout>, TesseraError> {
    let by_key: HashMap<RoadKey, &RoadLayout> = roads.iter().map(|road| (road.key, road)).collect();

    routes
        .iter()
        .map(|route| {
            let link = links.get(route.link.index()).ok_or_else(|| {
                TesseraError::invariant(
                    InvariantCode::I002,
                    format!("route for unknown {}", route.link),
                )
            })?;
            let gate = |end| {
                gates.get(&(route.link, end)).copied().ok_or_else(|| {
                    TesseraError::invariant(
                        InvariantCode::I002,
                        format!("{} has no gate", route.link),
                    )
                })
            };
            let (start, finish) = (gate(End::Source)?, gate(End::Target)?);

            let mut points = vec![start];
            let mut cursor = start;
            let mut last = None;
            for road in &route.roads {
                let layout = by_key.get(&road.key).ok_or_else(|| {
                    TesseraError::invariant(
                        InvariantCode::I003,
                        format!("{} passes a road without geometry", route.link),
                    )
                })?;
                let line = layout.lane_line(road.lane);
                cursor = cursor.with_along(layout.fixed_axis, line);
                points.push(cursor);
                last = Some((layout.fixed_axis, line));
            }
            if let Some((axis, line)) = last {
                points.push(finish.with_along(axis, line));
            }
            points.push(finish);

            let points = simplify(points);
            trace!(link = route.link.index(), points = points.len(); "Polyline built");

            Ok(LinkLayout {
                link: route.link,
                from: route.from,
                to: route.to,
                kind: link.kind.clone(),
                markers: link.markers,
                label: link.label.clone(),
                label_anchor: link.label.as_ref().and_then(|_| label_anchor(&points)),
                points,
            })
        })
        .collect()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn same_point(a: Point, b: Point) -> bool {
    close(a.x(), b.x()) && close(a.y(), b.y())
}

fn collinear(a: Point, b: Point, c: Point) -> bool {
    (close(a.x(), b.x()) && close(b.x(), c.x())) || (close(a.y(), b.y()) && close(b.y(), c.y()))
}

/// Drops repeated points and the middle point of straight runs.
fn simplify(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if out.last().is_some_and(|last| same_point(*last, point)) {
            continue;
        }
        let straight = match out.as_slice() {
            [.., a, b] => collinear(*a, *b, point),
            _ => false,
        };
        if straight {
            out.pop();
        }
        out.push(point);
    }
    out
}

/// Middle of the longest segment; the first one wins ties.
fn label_anchor(points: &[Point]) -> Option<Point> {
    points
        .windows(2)
        .fold(None, |best: Option<(f32, Point)>, pair| {
            let length = pair[0].manhattan(pair[1]);
            match best {
                Some((kept, _)) if kept >= length => best,
                _ => Some((length, pair[0].midpoint(pair[1]))),
            }
        })
        .map(|(_, point)| point)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use tessera_core::{
        geometry::{Bounds, Size},
        semantic::NodeKind,
    };

    use super::*;

    fn node(id: usize, bounds: Bounds) -> NodeLayout {
        NodeLayout {
            id: NodeId::new(id),
            kind: NodeKind::Cell,
            path: None,
            bounds,
            visible: bounds,
            content: bounds,
            label: None,
            gates: Vec::new(),
        }
    }

    #[test]
    fn test_simplify_drops_duplicates_and_straight_runs() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, 10.0),
            Point::new(7.0, 10.0),
        ];
        assert_eq!(
            simplify(points),
            [Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(7.0, 10.0)]
        );
    }

    #[test]
    fn test_label_anchor_uses_longest_segment() {
        let points = [Point::new(0.0, 0.0), Point::new(0.0, 4.0), Point::new(10.0, 4.0)];
        assert_eq!(label_anchor(&points), Some(Point::new(5.0, 4.0)));
        assert_eq!(label_anchor(&points[..1]), None);
    }

    #[test]
    fn test_gates_on_one_edge_are_spread() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(40.0, 20.0));
        let mut nodes = vec![node(0, bounds), node(1, bounds)];
        let routes: Vec<LinkRoute> = (0..3)
            .map(|index| {
                LinkRoute::new(
                    LinkId::new(index),
                    NodeId::new(0),
                    NodeId::new(1),
                    (Direct::DOWN, Direct::UP),
                    Vec::<RoadKey>::new(),
                )
            })
            .collect();

        let points = place_gates(&routes, &mut nodes, 8.0).unwrap();

        let xs: Vec<f32> = nodes[0].gates.iter().map(|gate| gate.point.x()).collect();
        assert_eq!(xs, [12.0, 20.0, 28.0]);
        assert!(nodes[0].gates.iter().all(|gate| gate.point.y() == 20.0));
        assert_eq!(points[&(LinkId::new(1), End::Target)], Point::new(20.0, 0.0));
    }

    #[test]
    fn test_crowded_edge_divides_evenly() {
        let bounds = Bounds::new_from_top_left(Point::new(8.0, 300.0), Size::new(22.0, 30.0));
        let mut nodes = vec![node(0, bounds), node(1, bounds)];
        let routes: Vec<LinkRoute> = (0..7)
            .map(|index| {
                LinkRoute::new(
                    LinkId::new(index),
                    NodeId::new(1),
                    NodeId::new(0),
                    (Direct::UP, Direct::DOWN),
                    Vec::<RoadKey>::new(),
                )
            })
            .collect();

        place_gates(&routes, &mut nodes, 8.0).unwrap();

        // 22 wide with 7 gates: a step of 22 / 8.
        let xs: Vec<f32> = nodes[0].gates.iter().map(|gate| gate.point.x()).collect();
        let expected = [10.75, 13.5, 16.25, 19.0, 21.75, 24.5, 27.25];
        assert_eq!(xs.len(), expected.len());
        for (x, want) in xs.iter().zip(expected) {
            assert_approx_eq!(f32, *x, want);
        }
        assert!(nodes[0].gates.iter().all(|gate| gate.point.y() == 330.0));
    }

    #[test]
    fn test_gate_step() {
        assert_eq!(gate_step(40.0, 3.0, 8.0), 8.0);
        assert_eq!(gate_step(16.0, 3.0, 8.0), 4.0);
        assert_eq!(gate_step(10.0, 1.0, 8.0), 8.0);
    }
}
