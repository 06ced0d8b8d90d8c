//! Link route planning.
//!
//! A route is the ordered list of roads a link travels through, from the
//! source side up to the common ancestor of its endpoints and back down to
//! the target side. Two planners implement the [`RoutePlanner`] contract:
//!
//! - [`TopologicalPlanner`] scores exit stubs of both endpoints using only
//!   the tree structure and boundary numbers.
//! - [`GeometricPlanner`] runs a best-first search over the roads of a
//!   reference layout and falls back to the topological planner when the
//!   search gives up.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram (resolved)
//!     ↓ route (this module)
//! Vec<LinkRoute>
//!     ↓ lanes
//! RoadTable
//! ```

mod geometric;
mod road;
mod stub;
mod topological;

pub use geometric::GeometricPlanner;
pub use road::{LinkRoute, Road, RoadKey, adjacent_road, allowed_exits, exit_roads, is_road_reach};
pub use topological::TopologicalPlanner;

use tessera_core::semantic::{Diagram, Endpoint, Link, LinkId, NodeGraph, NodeId};

use crate::{
    config::RouteConfig,
    error::{InvariantCode, RouteErrorCode, TesseraError},
    layout::Layout,
};

/// Plans routes for every link of a diagram.
pub trait RoutePlanner {
    /// Returns one route per link, in link order.
    ///
    /// # Errors
    ///
    /// Returns `TesseraError::Route` for links that cannot be routed and
    /// `TesseraError::Invariant` for corrupted graphs.
    fn plan(&self, ctx: &RouteContext<'_>) -> Result<Vec<LinkRoute>, TesseraError>;
}

/// Supplies the layout of the diagram computed without links.
///
/// Planners that need coordinates ask for it explicitly; the pipeline
/// computes it by running the lane allocator and the geometry engine on an
/// empty route set.
pub trait ReferenceGeometry {
    /// # Errors
    ///
    /// Returns the error of the lane or geometry stage.
    fn reference_layout(&self, diagram: &Diagram) -> Result<Layout, TesseraError>;
}

/// Everything a planner reads.
pub struct RouteContext<'a> {
    diagram: &'a Diagram,
    links: &'a [Link],
    config: &'a RouteConfig,
    reference: &'a dyn ReferenceGeometry,
}

impl<'a> RouteContext<'a> {
    pub fn new(
        diagram: &'a Diagram,
        links: &'a [Link],
        config: &'a RouteConfig,
        reference: &'a dyn ReferenceGeometry,
    ) -> Self {
        Self {
            diagram,
            links,
            config,
            reference,
        }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    pub fn graph(&self) -> &'a NodeGraph {
        self.diagram.graph()
    }

    /// The links to route, which may differ from the diagram's own links
    /// when a hook rewrote them.
    pub fn links(&self) -> &'a [Link] {
        self.links
    }

    pub fn config(&self) -> &'a RouteConfig {
        self.config
    }

    pub fn reference(&self) -> &'a dyn ReferenceGeometry {
        self.reference
    }
}

/// A link checked against the graph, with its common ancestor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkEnds {
    pub id: LinkId,
    pub from: Endpoint,
    pub to: Endpoint,
    pub common: NodeId,
}

impl LinkEnds {
    /// Levels between `node` and the common ancestor.
    pub fn climb(&self, graph: &NodeGraph, node: NodeId) -> usize {
        graph.node(node).depth() - graph.node(self.common).depth()
    }
}

fn check_endpoint(graph: &NodeGraph, id: LinkId, endpoint: Endpoint) -> Result<(), TesseraError> {
    if graph.get(endpoint.node).is_none() {
        return Err(TesseraError::invariant(
            InvariantCode::I002,
            format!("{id} refers to unknown node {}", endpoint.node),
        ));
    }
    Ok(())
}

/// Validates a link and finds the common ancestor of its endpoints.
pub(crate) fn link_ends(
    graph: &NodeGraph,
    id: LinkId,
    link: &Link,
) -> Result<LinkEnds, TesseraError> {
    check_endpoint(graph, id, link.from)?;
    check_endpoint(graph, id, link.to)?;

    if graph.is_related(link.from.node, link.to.node) {
        return Err(TesseraError::route(
            RouteErrorCode::R101,
            format!(
                "{id} joins `{}` and `{}`, one of which contains the other",
                graph.node(link.from.node).display_name(),
                graph.node(link.to.node).display_name()
            ),
        ));
    }

    let common = graph
        .common_ancestor(link.from.node, link.to.node)
        .ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I001,
                format!(
                    "{id}: nodes {} and {} share no ancestor",
                    link.from.node, link.to.node
                ),
            )
        })?;

    Ok(LinkEnds {
        id,
        from: link.from,
        to: link.to,
        common,
    })
}

/// Checks that a route leaves its source and enters its target through
/// roads they reach directly.
pub(crate) fn verify_route(
    graph: &NodeGraph,
    ends: &LinkEnds,
    route: &LinkRoute,
) -> Result<(), TesseraError> {
    let (Some(first), Some(last)) = (route.roads.first(), route.roads.last()) else {
        return Err(TesseraError::route(
            RouteErrorCode::R104,
            format!("{} has an empty route", ends.id),
        ));
    };

    if !is_road_reach(graph, ends.from.node, first.key, ends.from.edge) {
        return Err(TesseraError::route(
            RouteErrorCode::R104,
            format!(
                "{}: first road does not touch `{}`",
                ends.id,
                graph.node(ends.from.node).display_name()
            ),
        ));
    }
    if !is_road_reach(graph, ends.to.node, last.key, ends.to.edge) {
        return Err(TesseraError::route(
            RouteErrorCode::R104,
            format!(
                "{}: last road does not touch `{}`",
                ends.id,
                graph.node(ends.to.node).display_name()
            ),
        ));
    }
    Ok(())
}

/// A reference provider for tests of planners that never ask for one.
#[cfg(test)]
pub(crate) struct NoReference;

#[cfg(test)]
impl ReferenceGeometry for NoReference {
    fn reference_layout(&self, _diagram: &Diagram) -> Result<Layout, TesseraError> {
        Err(TesseraError::invariant(
            InvariantCode::I004,
            "no reference geometry available",
        ))
    }
}
