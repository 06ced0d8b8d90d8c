//! Lane allocation.
//!
//! Every container owns one main road per gap between (and around) its
//! children plus two cross roads on its cross edges. Each road gets as many
//! lanes as links pass through it, but never fewer than the configured
//! minimum. Lanes are handed out first-come, in link order and then in route
//! order; a link passing the same road twice keeps its lane.

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use tessera_core::semantic::{LinkId, NodeGraph};

use crate::{
    error::{InvariantCode, TesseraError},
    route::{LinkRoute, RoadKey},
};

/// The lanes of one road.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoadSlot {
    lanes: Vec<Option<LinkId>>,
}

impl RoadSlot {
    /// Lane occupants in lane order; `None` marks a reserved empty lane.
    pub fn lanes(&self) -> &[Option<LinkId>] {
        &self.lanes
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// The lane `link` was given on this road.
    pub fn lane_of(&self, link: LinkId) -> Option<usize> {
        self.lanes.iter().position(|lane| *lane == Some(link))
    }
}

/// Every road of a diagram with its lanes, plus the routes with lanes
/// filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadTable {
    roads: IndexMap<RoadKey, RoadSlot>,
    routes: Vec<LinkRoute>,
}

impl RoadTable {
    /// Builds the table for `graph` and assigns a lane to every road of
    /// every route.
    ///
    /// # Errors
    ///
    /// Returns an `I003` invariant violation when a route passes a road the
    /// graph does not have.
    pub fn allocate(
        graph: &NodeGraph,
        mut routes: Vec<LinkRoute>,
        lane_min: usize,
    ) -> Result<Self, TesseraError> {
        let mut users: IndexMap<RoadKey, Vec<LinkId>> = IndexMap::new();
        for node in graph.iter().filter(|node| node.is_container()) {
            for avenue in 0..node.main_avenues() {
                users.insert(RoadKey::main(node.id, avenue), Vec::new());
            }
            users.insert(RoadKey::cross(node.id, 0), Vec::new());
            users.insert(RoadKey::cross(node.id, 1), Vec::new());
        }

        for route in &routes {
            for key in route.keys() {
                let slot = users.get_mut(&key).ok_or_else(|| {
                    TesseraError::invariant(
                        InvariantCode::I003,
                        format!(
                            "{} passes {:?} road {} of {}, which does not exist",
                            route.link, key.axis, key.avenue, key.container
                        ),
                    )
                })?;
                if !slot.contains(&route.link) {
                    slot.push(route.link);
                }
            }
        }

        for route in &mut routes {
            let link = route.link;
            for road in &mut route.roads {
                road.lane = users
                    .get(&road.key)
                    .and_then(|slot| slot.iter().position(|user| *user == link));
            }
        }

        let roads: IndexMap<RoadKey, RoadSlot> = users
            .into_iter()
            .map(|(key, links)| {
                let count = links.len().max(lane_min);
                let mut lanes: Vec<Option<LinkId>> = links.into_iter().map(Some).collect();
                lanes.resize(count, None);
                (key, RoadSlot { lanes })
            })
            .collect();

        let busy = roads
            .values()
            .filter(|slot| slot.lanes.iter().any(Option::is_some))
            .count();
        info!(roads = roads.len(), busy, routes = routes.len(); "Lanes allocated");
        debug!(lane_min; "Minimum lanes per road");

        Ok(Self { roads, routes })
    }

    pub fn get(&self, key: &RoadKey) -> Option<&RoadSlot> {
        self.roads.get(key)
    }

    /// Roads in allocation order: containers by id, then main roads by
    /// avenue, then the two cross roads.
    pub fn iter(&self) -> impl Iterator<Item = (&RoadKey, &RoadSlot)> {
        self.roads.iter()
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn routes(&self) -> &[LinkRoute] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::{compass::Direct, semantic::NodeId};
    use tessera_parser::parse;

    use super::*;

    fn route(link: usize, roads: &[RoadKey]) -> LinkRoute {
        LinkRoute::new(
            LinkId::new(link),
            NodeId::new(1),
            NodeId::new(2),
            (Direct::DOWN, Direct::UP),
            roads.iter().copied(),
        )
    }

    #[test]
    fn test_every_container_gets_its_roads() {
        let diagram = parse("[g]\n(.a)\n(.b)\n---\n(c)").unwrap();
        let table = RoadTable::allocate(diagram.graph(), Vec::new(), 1).unwrap();

        // Root: 3 main + 2 cross; `g`: 3 main + 2 cross.
        assert_eq!(table.len(), 10);
        let keys: Vec<_> = table.iter().map(|(key, _)| *key).take(5).collect();
        assert_eq!(
            keys,
            [
                RoadKey::main(NodeId::ROOT, 0),
                RoadKey::main(NodeId::ROOT, 1),
                RoadKey::main(NodeId::ROOT, 2),
                RoadKey::cross(NodeId::ROOT, 0),
                RoadKey::cross(NodeId::ROOT, 1),
            ]
        );
        assert!(table.iter().all(|(_, slot)| slot.lanes() == [None]));
    }

    #[test]
    fn test_shared_road_gets_one_lane_per_link() {
        let diagram = parse("(a)\n(b)").unwrap();
        let gap = RoadKey::main(NodeId::ROOT, 1);
        let routes = vec![route(0, &[gap]), route(1, &[gap])];

        let table = RoadTable::allocate(diagram.graph(), routes, 1).unwrap();

        let slot = table.get(&gap).unwrap();
        assert_eq!(slot.lanes(), [Some(LinkId::new(0)), Some(LinkId::new(1))]);
        assert_eq!(table.routes()[0].roads[0].lane, Some(0));
        assert_eq!(table.routes()[1].roads[0].lane, Some(1));
    }

    #[test]
    fn test_repeated_road_keeps_its_lane() {
        let diagram = parse("(a)\n(b)").unwrap();
        let root = NodeId::ROOT;
        let (gap, side) = (RoadKey::main(root, 1), RoadKey::cross(root, 1));
        let routes = vec![route(0, &[side]), route(1, &[gap, side, gap])];

        let table = RoadTable::allocate(diagram.graph(), routes, 1).unwrap();

        let lanes: Vec<_> = table.routes()[1].roads.iter().map(|road| road.lane).collect();
        assert_eq!(lanes, [Some(0), Some(1), Some(0)]);
        assert_eq!(table.get(&gap).unwrap().lane_count(), 1);
        assert_eq!(table.get(&side).unwrap().lane_of(LinkId::new(1)), Some(1));
    }

    #[test]
    fn test_lane_minimum_pads_roads() {
        let diagram = parse("(a)").unwrap();
        let gap = RoadKey::main(NodeId::ROOT, 1);

        let table = RoadTable::allocate(diagram.graph(), vec![route(0, &[gap])], 3).unwrap();

        assert_eq!(table.get(&gap).unwrap().lanes(), [Some(LinkId::new(0)), None, None]);
        assert_eq!(table.get(&RoadKey::main(NodeId::ROOT, 0)).unwrap().lane_count(), 3);
    }

    #[test]
    fn test_unknown_road_is_an_invariant_violation() {
        let diagram = parse("(a)").unwrap();
        let bogus = RoadKey::main(NodeId::ROOT, 7);

        let err = RoadTable::allocate(diagram.graph(), vec![route(0, &[bogus])], 1).unwrap_err();
        assert_eq!(err.code(), Some("I003"));
    }
}
