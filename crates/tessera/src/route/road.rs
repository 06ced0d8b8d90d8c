//! Roads, routes and the topology helpers both planners share.

use serde::Serialize;

use tessera_core::{
    compass::{Axis, Direct},
    semantic::{LinkId, NodeGraph, NodeId},
};

/// Identity of a road group: one gap or edge of a container.
///
/// A `Main` road sits in gap `avenue` of the container's main axis
/// (`0..=children`); a `Cross` road sits on a cross edge, avenue 0 being
/// the cross-reverse edge and 1 the cross-forward edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoadKey {
    pub container: NodeId,
    pub axis: Axis,
    pub avenue: usize,
}

impl RoadKey {
    /// A road in the main-axis gap `avenue`.
    pub fn main(container: NodeId, avenue: usize) -> Self {
        Self {
            container,
            axis: Axis::Main,
            avenue,
        }
    }

    /// A road on a cross edge; `avenue` is 0 or 1.
    pub fn cross(container: NodeId, avenue: usize) -> Self {
        Self {
            container,
            axis: Axis::Cross,
            avenue,
        }
    }

    /// The absolute axis along which the road has a fixed coordinate.
    ///
    /// Main roads cut across the main axis, so their fixed coordinate lies
    /// on it; cross roads run along the main axis at a fixed cross
    /// coordinate.
    pub fn fixed_axis(self, graph: &NodeGraph) -> Axis {
        graph
            .node(self.container)
            .compass_items
            .axis_direct(self.axis)
            .axis()
    }
}

/// One road of a route, with the lane the allocator gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Road {
    pub key: RoadKey,
    /// `None` until lanes are allocated.
    pub lane: Option<usize>,
}

impl Road {
    pub fn new(key: RoadKey) -> Self {
        Self { key, lane: None }
    }
}

/// The roads one link travels, from the source side to the target side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRoute {
    pub link: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Absolute direction the link leaves the source in.
    pub from_exit: Direct,
    /// Absolute direction the link leaves the target in (reversed travel).
    pub to_exit: Direct,
    pub roads: Vec<Road>,
}

impl LinkRoute {
    pub fn new(
        link: LinkId,
        from: NodeId,
        to: NodeId,
        exits: (Direct, Direct),
        roads: impl IntoIterator<Item = RoadKey>,
    ) -> Self {
        Self {
            link,
            from,
            to,
            from_exit: exits.0,
            to_exit: exits.1,
            roads: roads.into_iter().map(Road::new).collect(),
        }
    }

    /// Road keys in travel order.
    pub fn keys(&self) -> impl Iterator<Item = RoadKey> + '_ {
        self.roads.iter().map(|road| road.key)
    }
}

/// The road next to `child` in the absolute direction `direct`, inside the
/// child's parent.
///
/// Returns `None` for the root, which has no parent.
pub fn adjacent_road(graph: &NodeGraph, child: NodeId, direct: Direct) -> Option<RoadKey> {
    let node = graph.node(child);
    let parent = node.parent?;
    let index = node.index;
    let road = match graph.node(parent).compass_items.relative_of(direct) {
        Direct::Main => RoadKey::main(parent, index + 1),
        Direct::MainReverse => RoadKey::main(parent, index),
        Direct::Cross => RoadKey::cross(parent, 1),
        Direct::CrossReverse => RoadKey::cross(parent, 0),
    };
    Some(road)
}

/// Absolute directions an endpoint may leave in.
///
/// A fixed edge is relative to the node's parent frame.
pub fn allowed_exits(graph: &NodeGraph, node: NodeId, edge: Option<Direct>) -> Vec<Direct> {
    match edge {
        Some(relative) => vec![graph.node(node).compass_self.absolute_of(relative)],
        None => Direct::ALL.to_vec(),
    }
}

/// Roads `node` reaches directly when leaving in `direct`, without going
/// above `ceiling` levels.
///
/// The road at level `L` is the one adjacent to the node's ancestor at level
/// `L - 1`, inside its ancestor at level `L`; levels run up to the node's
/// boundary number in that direction.
pub fn exit_roads(
    graph: &NodeGraph,
    node: NodeId,
    direct: Direct,
    ceiling: usize,
) -> Vec<(usize, RoadKey)> {
    let budget = (graph.node(node).bn(direct) as usize).min(ceiling);
    (1..=budget)
        .filter_map(|level| {
            let below = graph.ancestor_at(node, level - 1)?;
            adjacent_road(graph, below, direct).map(|road| (level, road))
        })
        .collect()
}

/// Returns `true` when `node` can leave straight into `road` through one of
/// its allowed edges.
pub fn is_road_reach(graph: &NodeGraph, node: NodeId, road: RoadKey, edge: Option<Direct>) -> bool {
    let depth = graph.node(node).depth();
    allowed_exits(graph, node, edge).into_iter().any(|direct| {
        exit_roads(graph, node, direct, depth)
            .into_iter()
            .any(|(_, exit)| exit == road)
    })
}

#[cfg(test)]
mod tests {
    use tessera_parser::parse;

    use super::*;

    #[test]
    fn test_adjacent_road_in_column() {
        // Root is a column: down is main forward, right is cross forward.
        let diagram = parse("(a)\n(b)\n(c)").unwrap();
        let graph = diagram.graph();
        let b = NodeId::new(2);

        assert_eq!(adjacent_road(graph, b, Direct::DOWN), Some(RoadKey::main(NodeId::ROOT, 2)));
        assert_eq!(adjacent_road(graph, b, Direct::UP), Some(RoadKey::main(NodeId::ROOT, 1)));
        assert_eq!(adjacent_road(graph, b, Direct::RIGHT), Some(RoadKey::cross(NodeId::ROOT, 1)));
        assert_eq!(adjacent_road(graph, b, Direct::LEFT), Some(RoadKey::cross(NodeId::ROOT, 0)));
        assert_eq!(adjacent_road(graph, NodeId::ROOT, Direct::UP), None);
    }

    #[test]
    fn test_fixed_axis() {
        let diagram = parse("(a)").unwrap();
        let graph = diagram.graph();
        // Column root: main roads are horizontal strips with a fixed Y.
        assert_eq!(RoadKey::main(NodeId::ROOT, 0).fixed_axis(graph), Axis::Cross);
        assert_eq!(RoadKey::cross(NodeId::ROOT, 0).fixed_axis(graph), Axis::Main);
    }

    #[test]
    fn test_exit_roads_follow_boundary_numbers() {
        // `x` is the only child of `u`, which comes first in `g`.
        let diagram = parse("[[g]]\n[.u]\n(.x)\n---\n(g.y)").unwrap();
        let graph = diagram.graph();
        let (g, u, x) = (NodeId::new(1), NodeId::new(2), NodeId::new(3));
        let forward = graph.node(g).compass_items.main();

        let exits = exit_roads(graph, x, forward, 2);
        // `u` is a column, so leaving `x` forward first meets its cross edge.
        assert_eq!(exits, [(1, RoadKey::cross(u, 1)), (2, RoadKey::main(g, 1))]);
        assert!(is_road_reach(graph, x, RoadKey::main(g, 1), None));
        assert!(is_road_reach(graph, x, RoadKey::main(g, 0), None));
        assert!(!is_road_reach(graph, x, RoadKey::main(g, 2), None));
    }

    #[test]
    fn test_fixed_edge_limits_reach() {
        let diagram = parse("(a) 0->2 (b)").unwrap();
        let graph = diagram.graph();
        let a = NodeId::new(1);
        let below = RoadKey::main(NodeId::ROOT, 1);

        // Edge 0 is main forward of the root column: down.
        assert!(is_road_reach(graph, a, below, Some(Direct::Main)));
        assert!(!is_road_reach(graph, a, below, Some(Direct::Cross)));
    }
}
