//! Exit stubs: the roads an endpoint climbs through to reach the container
//! shared with the other endpoint.

use std::collections::HashMap;

use log::trace;

use tessera_core::{
    compass::Direct,
    semantic::{NodeGraph, NodeId},
};

use super::road::{RoadKey, adjacent_road, allowed_exits};
use crate::error::{InvariantCode, RouteErrorCode, TesseraError};

/// Best road list per final absolute direction.
type Candidates = [Option<Vec<RoadKey>>; 4];

/// A road list leading from an endpoint into the common ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Stub {
    /// Direction the endpoint leaves in.
    pub first: Direct,
    /// Direction of travel on the last road.
    pub last: Direct,
    /// Roads in travel order; the last one belongs to the common ancestor.
    pub roads: Vec<RoadKey>,
}

impl Stub {
    /// The road inside the common ancestor.
    pub fn last_road(&self) -> RoadKey {
        // Stubs are never built empty.
        self.roads[self.roads.len() - 1]
    }
}

/// Climbs from endpoints up to one common ancestor.
///
/// Results are memoized per `(node, direction)`, so a climber is meant to
/// serve both endpoints of a single link.
pub(crate) struct StubClimber<'a> {
    graph: &'a NodeGraph,
    top: usize,
    depth_limit: usize,
    memo: HashMap<(NodeId, Direct), Candidates>,
}

impl<'a> StubClimber<'a> {
    pub fn new(graph: &'a NodeGraph, common: NodeId, depth_limit: usize) -> Self {
        Self {
            graph,
            top: graph.node(common).depth(),
            depth_limit,
            memo: HashMap::new(),
        }
    }

    /// Stubs of `node` leaving through its allowed edges, at most one per
    /// final direction, ordered by final direction.
    ///
    /// For each final direction the shortest stub wins; ties keep the one
    /// found first.
    pub fn stubs(&mut self, node: NodeId, edge: Option<Direct>) -> Result<Vec<Stub>, TesseraError> {
        let mut best: [Option<Stub>; 4] = Default::default();

        for first in allowed_exits(self.graph, node, edge) {
            let candidates = self.climb(node, first, 0)?;
            for (last, roads) in Direct::ALL.into_iter().zip(candidates) {
                let Some(roads) = roads else {
                    continue;
                };
                let slot = &mut best[last.index()];
                if slot.as_ref().is_none_or(|kept| roads.len() < kept.roads.len()) {
                    *slot = Some(Stub { first, last, roads });
                }
            }
        }

        Ok(best.into_iter().flatten().collect())
    }

    fn climb(&mut self, node: NodeId, direct: Direct, depth: usize) -> Result<Candidates, TesseraError> {
        if depth > self.depth_limit {
            return Err(TesseraError::route(
                RouteErrorCode::R102,
                format!(
                    "climbing out of `{}` exceeded {} steps",
                    self.graph.node(node).display_name(),
                    self.depth_limit
                ),
            ));
        }
        if let Some(hit) = self.memo.get(&(node, direct)) {
            return Ok(hit.clone());
        }

        let budget = self.graph.node(node).bn(direct) as usize;
        let remaining = self.graph.node(node).depth() - self.top;
        let mut out: Candidates = Default::default();

        if budget >= remaining {
            out[direct.index()] = Some(vec![self.road_at(node, remaining, direct)?]);
        } else {
            let head = if budget >= 1 {
                vec![self.road_at(node, budget, direct)?]
            } else {
                Vec::new()
            };
            let holder = self.ancestor(node, budget)?;
            for turn in direct.perpendicular() {
                let tail = self.climb(holder, turn, depth + 1)?;
                for (slot, roads) in out.iter_mut().zip(tail) {
                    let Some(roads) = roads else {
                        continue;
                    };
                    if slot
                        .as_ref()
                        .is_none_or(|kept| head.len() + roads.len() < kept.len())
                    {
                        let mut joined = head.clone();
                        joined.extend(roads);
                        *slot = Some(joined);
                    }
                }
            }
        }

        trace!(node = node.index(), direct = direct.index(), depth; "Stub climbed");
        self.memo.insert((node, direct), out.clone());
        Ok(out)
    }

    /// The road at `level` above `node` in direction `direct`.
    fn road_at(&self, node: NodeId, level: usize, direct: Direct) -> Result<RoadKey, TesseraError> {
        let below = self.ancestor(node, level - 1)?;
        adjacent_road(self.graph, below, direct).ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I001,
                format!("`{}` has no parent", self.graph.node(below).display_name()),
            )
        })
    }

    fn ancestor(&self, node: NodeId, level: usize) -> Result<NodeId, TesseraError> {
        self.graph.ancestor_at(node, level).ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I001,
                format!(
                    "`{}` has no ancestor {level} levels up",
                    self.graph.node(node).display_name()
                ),
            )
        })
    }
}
