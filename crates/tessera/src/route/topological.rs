//! Route planning from the tree structure alone.

use log::{debug, info};

use tessera_core::{
    compass::Axis,
    semantic::{LinkId, NodeGraph, NodeId},
};

use super::{
    LinkEnds, RouteContext, RoutePlanner, link_ends,
    road::{LinkRoute, RoadKey},
    stub::{Stub, StubClimber},
    verify_route,
};
use crate::error::{InvariantCode, RouteErrorCode, TesseraError};

/// Joins exit stubs of both endpoints inside their common ancestor.
///
/// Every pair of source and target stubs is scored by its road count and a
/// penalty for the way the two stubs meet; the cheapest pair wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalPlanner;

impl TopologicalPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Routes a single link.
    pub(crate) fn route_link(
        &self,
        graph: &NodeGraph,
        ends: &LinkEnds,
        depth_limit: usize,
    ) -> Result<LinkRoute, TesseraError> {
        let mut climber = StubClimber::new(graph, ends.common, depth_limit);
        let from_stubs = climber.stubs(ends.from.node, ends.from.edge)?;
        let to_stubs = climber.stubs(ends.to.node, ends.to.edge)?;

        let children = (
            child_under(graph, ends, ends.from.node)?,
            child_under(graph, ends, ends.to.node)?,
        );

        let mut best: Option<(u32, &Stub, &Stub, Vec<RoadKey>)> = None;
        for source in &from_stubs {
            for target in &to_stubs {
                let Some((roads, penalty)) = join(graph, children, source, target) else {
                    continue;
                };
                let score = 10 * roads.len() as u32 + penalty;
                if best.as_ref().is_none_or(|(kept, ..)| score < *kept) {
                    best = Some((score, source, target, roads));
                }
            }
        }

        let Some((score, source, target, roads)) = best else {
            return Err(TesseraError::route(
                RouteErrorCode::R103,
                format!(
                    "{}: no way from `{}` to `{}`",
                    ends.id,
                    graph.node(ends.from.node).display_name(),
                    graph.node(ends.to.node).display_name()
                ),
            ));
        };

        debug!(link = ends.id.index(), score, roads = roads.len(); "Topological route chosen");
        Ok(LinkRoute::new(
            ends.id,
            ends.from.node,
            ends.to.node,
            (source.first, target.first),
            roads,
        ))
    }
}

impl RoutePlanner for TopologicalPlanner {
    fn plan(&self, ctx: &RouteContext<'_>) -> Result<Vec<LinkRoute>, TesseraError> {
        let graph = ctx.graph();
        info!(links = ctx.links().len(); "Planning routes topologically");

        ctx.links()
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let ends = link_ends(graph, LinkId::new(index), link)?;
                let route = self.route_link(graph, &ends, ctx.config().depth_limit())?;
                verify_route(graph, &ends, &route)?;
                Ok(route)
            })
            .collect()
    }
}

/// Joins two stubs ending in the same container.
///
/// Returns the whole road list, source first, and the penalty of the join.
fn join(
    graph: &NodeGraph,
    (from_child, to_child): (NodeId, NodeId),
    source: &Stub,
    target: &Stub,
) -> Option<(Vec<RoadKey>, u32)> {
    let (from_road, to_road) = (source.last_road(), target.last_road());
    if from_road.container != to_road.container {
        return None;
    }

    let tail = target.roads.iter().rev().copied();

    if from_road == to_road {
        let penalty = if source.last == target.last.reverse() { 0 } else { 1 };
        let roads = source.roads.iter().copied().chain(tail.skip(1)).collect();
        return Some((roads, penalty));
    }

    if from_road.axis != to_road.axis {
        let roads = source.roads.iter().copied().chain(tail).collect();
        return Some((roads, 3));
    }

    let container = from_road.container;
    let connector = match from_road.axis {
        Axis::Main => {
            let avenue = if from_child < to_child { 1 } else { 0 };
            RoadKey::cross(container, avenue)
        }
        Axis::Cross => {
            let (from_index, to_index) = (graph.node(from_child).index, graph.node(to_child).index);
            let avenue = if to_index > from_index {
                from_index + 1
            } else {
                from_index
            };
            RoadKey::main(container, avenue)
        }
    };
    let penalty = 6 + from_road.avenue.abs_diff(to_road.avenue) as u32;
    let roads = source
        .roads
        .iter()
        .copied()
        .chain(std::iter::once(connector))
        .chain(tail)
        .collect();
    Some((roads, penalty))
}

/// The direct child of the common ancestor on the way to `node`.
fn child_under(graph: &NodeGraph, ends: &LinkEnds, node: NodeId) -> Result<NodeId, TesseraError> {
    let levels = ends.climb(graph, node);
    graph
        .ancestor_at(node, levels.saturating_sub(1))
        .ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I001,
                format!("{}: broken ancestor chain", ends.id),
            )
        })
}
