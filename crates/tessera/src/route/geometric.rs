//! Route planning by best-first search over a reference layout.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use log::{debug, info, trace, warn};

use tessera_core::{
    compass::{Axis, Direct},
    geometry::Point,
    semantic::{LinkId, NodeGraph, NodeId},
};

use super::{
    LinkEnds, RouteContext, RoutePlanner, TopologicalPlanner, link_ends,
    road::{LinkRoute, RoadKey, allowed_exits, exit_roads},
    verify_route,
};
use crate::{
    config::RouteConfig,
    error::{InvariantCode, TesseraError},
    layout::Layout,
};

/// Longest route the search builds.
const MAX_ROADS: usize = 64;
/// Node expansions per link before the search gives up.
const MAX_EXPANSIONS: usize = 20_000;

/// Searches roads of the diagram laid out without links.
///
/// Every road has a center line in the reference layout, so moving from one
/// road to a crossing one has a length. The search starts on the roads the
/// source exits into, ends on any road the target exits into, and expands
/// the cheapest `g + manhattan(point, target)` first. When it gives up, the
/// link is routed by [`TopologicalPlanner`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricPlanner {
    fallback: TopologicalPlanner,
}

impl GeometricPlanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutePlanner for GeometricPlanner {
    fn plan(&self, ctx: &RouteContext<'_>) -> Result<Vec<LinkRoute>, TesseraError> {
        if ctx.links().is_empty() {
            return Ok(Vec::new());
        }

        let graph = ctx.graph();
        let reference = ctx.reference().reference_layout(ctx.diagram())?;
        let lines: HashMap<RoadKey, (Axis, f32)> = reference
            .roads
            .iter()
            .map(|road| (road.key, (road.fixed_axis, road.center_line())))
            .collect();
        info!(links = ctx.links().len(), roads = lines.len(); "Planning routes on reference geometry");

        ctx.links()
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let ends = link_ends(graph, LinkId::new(index), link)?;
                let search = Search::new(graph, &reference, &lines, &ends, ctx.config())?;
                let route = match search.run()? {
                    Some(route) => route,
                    None => {
                        warn!(link = index; "Geometric search found no route, falling back to topological planning");
                        self.fallback
                            .route_link(graph, &ends, ctx.config().depth_limit())?
                    }
                };
                verify_route(graph, &ends, &route)?;
                Ok(route)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    road: RoadKey,
    point: Point,
    g: f32,
    parent: Option<usize>,
    first: Direct,
    len: usize,
}

/// Heap entry; the smallest `f` pops first, then the oldest state.
#[derive(Debug)]
struct Entry {
    f: f32,
    state: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

struct Search<'a> {
    graph: &'a NodeGraph,
    lines: &'a HashMap<RoadKey, (Axis, f32)>,
    ends: &'a LinkEnds,
    config: &'a RouteConfig,
    top: usize,
    source: Point,
    target: Point,
    /// Target exit roads, with the direction the target leaves in.
    goals: HashMap<RoadKey, Direct>,
    /// Roads from which a container on the target chain can be entered,
    /// with the exit direction of that container.
    descents: HashMap<RoadKey, Vec<(Direct, NodeId)>>,
    states: Vec<State>,
    heap: BinaryHeap<Entry>,
    best_g: HashMap<RoadKey, f32>,
}

impl<'a> Search<'a> {
    fn new(
        graph: &'a NodeGraph,
        reference: &Layout,
        lines: &'a HashMap<RoadKey, (Axis, f32)>,
        ends: &'a LinkEnds,
        config: &'a RouteConfig,
    ) -> Result<Self, TesseraError> {
        let center = |id: NodeId| {
            reference
                .node(id)
                .map(|node| node.visible.center())
                .ok_or_else(|| {
                    TesseraError::invariant(
                        InvariantCode::I004,
                        format!(
                            "reference layout lacks `{}`",
                            graph.node(id).display_name()
                        ),
                    )
                })
        };
        let top = graph.node(ends.common).depth();

        let mut goals = HashMap::new();
        for direct in allowed_exits(graph, ends.to.node, ends.to.edge) {
            for (_, road) in exit_roads(graph, ends.to.node, direct, ends.climb(graph, ends.to.node)) {
                goals.entry(road).or_insert(direct);
            }
        }

        let mut descents: HashMap<RoadKey, Vec<(Direct, NodeId)>> = HashMap::new();
        let chain = &graph.node(ends.to.node).parents;
        for &container in chain.iter().skip(top + 1) {
            let remaining = ends.climb(graph, container);
            for direct in Direct::ALL {
                for (_, road) in exit_roads(graph, container, direct, remaining) {
                    descents.entry(road).or_default().push((direct, container));
                }
            }
        }

        Ok(Self {
            graph,
            lines,
            ends,
            config,
            top,
            source: center(ends.from.node)?,
            target: center(ends.to.node)?,
            goals,
            descents,
            states: Vec::new(),
            heap: BinaryHeap::new(),
            best_g: HashMap::new(),
        })
    }

    fn line(&self, road: RoadKey) -> Result<(Axis, f32), TesseraError> {
        self.lines.get(&road).copied().ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I004,
                format!(
                    "reference layout lacks {:?} road {} of `{}`",
                    road.axis,
                    road.avenue,
                    self.graph.node(road.container).display_name()
                ),
            )
        })
    }

    /// Where a walker at `point` stands after stepping onto `road`.
    fn step(&self, point: Point, road: RoadKey) -> Result<Point, TesseraError> {
        let (axis, line) = self.line(road)?;
        Ok(point.with_along(axis, line))
    }

    /// Records a state if it reaches its road more cheaply than before.
    fn offer(&mut self, state: State) {
        if self
            .best_g
            .get(&state.road)
            .is_some_and(|&best| best <= state.g)
        {
            return;
        }
        self.best_g.insert(state.road, state.g);
        self.heap.push(Entry {
            f: state.g + state.point.manhattan(self.target),
            state: self.states.len(),
        });
        self.states.push(state);
    }

    fn seed(&mut self) -> Result<(), TesseraError> {
        let from = self.ends.from.node;
        let remaining = self.ends.climb(self.graph, from);
        for first in allowed_exits(self.graph, from, self.ends.from.edge) {
            for (_, road) in exit_roads(self.graph, from, first, remaining) {
                let point = self.step(self.source, road)?;
                self.offer(State {
                    road,
                    point,
                    g: self.source.manhattan(point),
                    parent: None,
                    first,
                    len: 1,
                });
            }
        }
        Ok(())
    }

    fn run(mut self) -> Result<Option<LinkRoute>, TesseraError> {
        self.seed()?;

        let mut expansions = 0;
        while let Some(entry) = self.heap.pop() {
            let state = self.states[entry.state];
            if let Some(&to_exit) = self.goals.get(&state.road) {
                debug!(
                    link = self.ends.id.index(),
                    roads = state.len,
                    expansions,
                    cost = state.g;
                    "Geometric route found"
                );
                return Ok(Some(self.route(entry.state, to_exit)));
            }
            if self.best_g.get(&state.road).is_some_and(|&best| best < state.g) {
                continue;
            }

            expansions += 1;
            if expansions > MAX_EXPANSIONS {
                debug!(link = self.ends.id.index(); "Expansion budget exhausted");
                return Ok(None);
            }
            if state.len >= MAX_ROADS {
                continue;
            }

            for (road, point) in self.successors(&state)? {
                self.offer(State {
                    road,
                    point,
                    g: state.g + state.point.manhattan(point),
                    parent: Some(entry.state),
                    first: state.first,
                    len: state.len + 1,
                });
            }
        }

        trace!(link = self.ends.id.index(), expansions; "Search space exhausted");
        Ok(None)
    }

    /// Crossing roads reachable from the current one, best first, limited to
    /// the configured bucket sizes.
    fn successors(&self, state: &State) -> Result<Vec<(RoadKey, Point)>, TesseraError> {
        let road = state.road;
        let container = self.graph.node(road.container);
        let mut roads: Vec<RoadKey> = Vec::new();
        let mut add = |key: RoadKey| {
            if key != road && !roads.contains(&key) {
                roads.push(key);
            }
        };

        // Lateral: roads of the same container crossing this one.
        match road.axis {
            Axis::Main => {
                add(RoadKey::cross(container.id, 0));
                add(RoadKey::cross(container.id, 1));
            }
            Axis::Cross => {
                for avenue in 0..container.main_avenues() {
                    add(RoadKey::main(container.id, avenue));
                }
            }
        }

        // Climbs: leave the container through an edge this road touches.
        let remaining = container.depth().saturating_sub(self.top);
        if remaining > 0 {
            let edge = match road.axis {
                Axis::Main => container.compass_items.cross(),
                Axis::Cross => container.compass_items.main(),
            };
            for direct in [edge, edge.reverse()] {
                for (_, key) in exit_roads(self.graph, container.id, direct, remaining) {
                    add(key);
                }
            }
        }

        // Descents: enter a container holding the target.
        if let Some(entries) = self.descents.get(&road) {
            for &(direct, inner) in entries {
                let across = direct.axis().other();
                let node = self.graph.node(inner);
                let inner_roads = (0..node.main_avenues())
                    .map(|avenue| RoadKey::main(inner, avenue))
                    .chain([RoadKey::cross(inner, 0), RoadKey::cross(inner, 1)]);
                for key in inner_roads {
                    if key.fixed_axis(self.graph) == across {
                        add(key);
                    }
                }
            }
        }

        let (fixed, _) = self.line(road)?;
        let moving = fixed.other();
        let here = state.point.along(moving);
        let goal = self.target.along(moving);

        let mut inner = Vec::new();
        let mut outer = Vec::new();
        for key in roads {
            let point = self.step(state.point, key)?;
            let at = point.along(moving);
            if (at - here) * (goal - at) >= 0.0 {
                inner.push((key, point));
            } else {
                outer.push((key, point));
            }
        }
        let by_distance = |a: &(RoadKey, Point), b: &(RoadKey, Point)| {
            (a.1.along(moving) - goal)
                .abs()
                .total_cmp(&(b.1.along(moving) - goal).abs())
        };
        inner.sort_by(by_distance);
        outer.sort_by(by_distance);
        inner.truncate(self.config.inner_limit());
        outer.truncate(self.config.outer_limit());

        inner.extend(outer);
        Ok(inner)
    }

    fn route(&self, last: usize, to_exit: Direct) -> LinkRoute {
        let mut roads = Vec::new();
        let mut cursor = Some(last);
        while let Some(index) = cursor {
            roads.push(self.states[index].road);
            cursor = self.states[index].parent;
        }
        roads.reverse();
        LinkRoute::new(
            self.ends.id,
            self.ends.from.node,
            self.ends.to.node,
            (self.states[last].first, to_exit),
            roads,
        )
    }
}
