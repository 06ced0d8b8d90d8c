//! The default geometry engine.
//!
//! Layout runs in two passes over the node tree:
//!
//! 1. **Sizing**, bottom-up: a cell is its content plus spacing; a container
//!    stacks its children and main roads along its main axis and takes the
//!    widest child plus both cross roads on its cross axis.
//! 2. **Placement**, top-down: each container lays out its roads and children
//!    as [`ItemLoca`]s relative to its own frame, then converts them to canvas
//!    coordinates. A reversed axis accumulates from the far end.
//!
//! Gates and polylines are added last, once every node and lane has its
//! final position.

use std::collections::HashMap;

use log::{debug, info};

use tessera_core::{
    compass::{Axis, Direct},
    geometry::{Bounds, Point, Size},
    semantic::{Node, NodeId},
};

use super::{
    GeometryEngine, GeometryInput, LabelLayout, LaneLayout, Layout, NodeLayout, RoadLayout, wires,
};
use crate::{
    error::{GeometryErrorCode, InvariantCode, TesseraError},
    lanes::RoadSlot,
    measure::display_text,
    route::RoadKey,
};

const DEFAULT_DEPTH_LIMIT: usize = 1000;

/// Flexbox-like geometry engine.
#[derive(Debug, Clone, Copy)]
pub struct FlexGeometry {
    depth_limit: usize,
}

impl Default for FlexGeometry {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl FlexGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how deep the sizing pass may recurse before failing with `G101`.
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }
}

impl GeometryEngine for FlexGeometry {
    fn compute(&self, input: &GeometryInput) -> Result<Layout, TesseraError> {
        let graph = input.diagram.graph();
        info!(nodes = graph.len(), roads = input.roads.len(); "Computing geometry");

        let mut flex = Flex::new(input, self.depth_limit);
        let size = flex.measure(NodeId::ROOT, 0)?;

        let mut placed = Placed {
            nodes: vec![None; graph.len()],
            roads: HashMap::new(),
        };
        flex.place(
            NodeId::ROOT,
            Bounds::new_from_top_left(Point::default(), size),
            &mut placed,
        )?;

        let mut nodes: Vec<NodeLayout> = placed.nodes.into_iter().flatten().collect();
        let mut by_key = placed.roads;
        let roads: Vec<RoadLayout> = input
            .roads
            .iter()
            .filter_map(|(key, _)| by_key.remove(key))
            .collect();

        let routes = input.roads.routes();
        let gates = wires::place_gates(routes, &mut nodes, input.diagram.doc().gate_gap)?;
        let links = wires::link_layouts(input.diagram.links(), routes, &roads, &gates)?;

        debug!(
            width = size.width(),
            height = size.height(),
            links = links.len();
            "Geometry computed"
        );
        let doc = input.diagram.doc();
        Ok(Layout {
            size,
            style: doc.style.clone(),
            link_border: doc.link_border,
            nodes,
            links,
            roads,
        })
    }
}

/// Box of an item relative to its container's body, in the container's
/// own frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ItemLoca {
    pub offset_main: f32,
    pub offset_cross: f32,
    pub extent_main: f32,
    pub extent_cross: f32,
}

impl ItemLoca {
    fn new(main: (f32, f32), cross: (f32, f32)) -> Self {
        Self {
            offset_main: main.0,
            extent_main: main.1,
            offset_cross: cross.0,
            extent_cross: cross.1,
        }
    }
}

/// A container body together with the orientation of its frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    body: Bounds,
    main: Direct,
    cross: Direct,
}

impl Frame {
    fn extent(&self, direct: Direct) -> f32 {
        let (start, end) = self.body.range(direct.axis());
        end - start
    }

    /// Converts a relative box to canvas coordinates.
    fn to_canvas(&self, loca: ItemLoca) -> Bounds {
        let main = span(
            self.body.range(self.main.axis()),
            self.main.is_reversed(),
            loca.offset_main,
            loca.extent_main,
        );
        let cross = span(
            self.body.range(self.cross.axis()),
            self.cross.is_reversed(),
            loca.offset_cross,
            loca.extent_cross,
        );
        axis_bounds(self.main.axis(), main, cross)
    }
}

fn span((start, end): (f32, f32), reversed: bool, offset: f32, extent: f32) -> (f32, f32) {
    if reversed {
        (end - offset - extent, end - offset)
    } else {
        (start + offset, start + offset + extent)
    }
}

/// Bounds from a range along `axis` and a range along the other axis.
fn axis_bounds(axis: Axis, along: (f32, f32), across: (f32, f32)) -> Bounds {
    let (x, y) = match axis {
        Axis::Main => (along, across),
        Axis::Cross => (across, along),
    };
    Bounds::new_from_top_left(Point::new(x.0, y.0), Size::new(x.1 - x.0, y.1 - y.0))
}

fn size_from_axes(main_axis: Axis, main: f32, cross: f32) -> Size {
    match main_axis {
        Axis::Main => Size::new(main, cross),
        Axis::Cross => Size::new(cross, main),
    }
}

fn centered(area: Bounds, size: Size) -> Bounds {
    let center = area.center();
    Bounds::new_from_top_left(
        Point::new(center.x() - size.width() / 2.0, center.y() - size.height() / 2.0),
        size,
    )
}

struct Placed {
    nodes: Vec<Option<NodeLayout>>,
    roads: HashMap<RoadKey, RoadLayout>,
}

struct Flex<'a> {
    input: &'a GeometryInput,
    depth_limit: usize,
    lane_width: f32,
    outer: Vec<Size>,
}

impl<'a> Flex<'a> {
    fn new(input: &'a GeometryInput, depth_limit: usize) -> Self {
        Self {
            input,
            depth_limit,
            lane_width: input.diagram.doc().lane_width,
            outer: vec![Size::default(); input.diagram.graph().len()],
        }
    }

    fn label(&self, id: NodeId) -> Option<Size> {
        self.input.labels.get(id.index()).copied().flatten()
    }

    fn slot(&self, key: RoadKey) -> Result<&'a RoadSlot, TesseraError> {
        self.input.roads.get(&key).ok_or_else(|| {
            TesseraError::invariant(
                InvariantCode::I003,
                format!("{:?} road {} of {} has no lanes", key.axis, key.avenue, key.container),
            )
        })
    }

    fn road_width(&self, key: RoadKey) -> Result<f32, TesseraError> {
        Ok(self.slot(key)?.lane_count() as f32 * self.lane_width)
    }

    /// Computes and records the outer size of `id` and its subtree.
    fn measure(&mut self, id: NodeId, depth: usize) -> Result<Size, TesseraError> {
        if depth > self.depth_limit {
            return Err(TesseraError::geometry(
                GeometryErrorCode::G101,
                format!("nesting deeper than {} levels", self.depth_limit),
            ));
        }

        let input = self.input;
        let node = input.diagram.graph().node(id);

        let content = if node.is_container() {
            let main_axis = node.compass_items.main().axis();
            let cross_axis = main_axis.other();

            let (mut main, mut cross) = (0.0f32, 0.0f32);
            for &child in &node.children {
                let size = self.measure(child, depth + 1)?;
                main += size.along(main_axis);
                cross = cross.max(size.along(cross_axis));
            }
            for avenue in 0..node.main_avenues() {
                main += self.road_width(RoadKey::main(id, avenue))?;
            }
            cross += self.road_width(RoadKey::cross(id, 0))? + self.road_width(RoadKey::cross(id, 1))?;

            let body = size_from_axes(main_axis, main, cross);
            match self.label(id) {
                Some(label) => Size::new(
                    body.width().max(label.width()),
                    body.height() + label.height(),
                ),
                None => body,
            }
        } else {
            let measured = self.label(id).unwrap_or_default();
            Size::new(
                node.width.unwrap_or(measured.width()),
                node.height.unwrap_or(measured.height()),
            )
        };

        let outer = content.add_padding(node.spacing.total());
        self.outer[id.index()] = outer;
        Ok(outer)
    }

    /// Places `id` at `bounds` and its subtree inside it.
    fn place(&self, id: NodeId, bounds: Bounds, placed: &mut Placed) -> Result<(), TesseraError> {
        let node = self.input.diagram.graph().node(id);
        let visible = bounds.shrink(node.spacing.margin);
        let content = visible.shrink(node.spacing.inner());

        let label = if node.is_container() {
            let (body, label) = match self.label(id) {
                Some(size) => {
                    let band = Bounds::new_from_top_left(
                        content.min_point(),
                        Size::new(content.width(), size.height()),
                    );
                    let body = Bounds::new_from_top_left(
                        Point::new(content.min_x(), band.max_y()),
                        Size::new(content.width(), (content.height() - size.height()).max(0.0)),
                    );
                    let label = node.label.clone().map(|text| LabelLayout {
                        text,
                        bounds: centered(band, size),
                    });
                    (body, label)
                }
                None => (content, None),
            };
            self.place_children(node, body, placed)?;
            label
        } else {
            // Fully sized cells are not measured; their text spans the content.
            display_text(node).map(|text| LabelLayout {
                text: text.to_string(),
                bounds: self.label(id).map_or(content, |size| centered(content, size)),
            })
        };

        placed.nodes[id.index()] = Some(NodeLayout {
            id,
            kind: node.kind,
            path: node.path.clone(),
            bounds,
            visible,
            content,
            label,
            gates: Vec::new(),
        });
        Ok(())
    }

    fn place_children(&self, node: &Node, body: Bounds, placed: &mut Placed) -> Result<(), TesseraError> {
        let graph = self.input.diagram.graph();
        let frame = Frame {
            body,
            main: node.compass_items.main(),
            cross: node.compass_items.cross(),
        };
        let (main_axis, cross_axis) = (frame.main.axis(), frame.cross.axis());
        let (body_main, body_cross) = (frame.extent(frame.main), frame.extent(frame.cross));

        let (cross_start, cross_end) = (RoadKey::cross(node.id, 0), RoadKey::cross(node.id, 1));
        let start_width = self.road_width(cross_start)?;
        let end_width = self.road_width(cross_end)?;
        let available = (body_cross - start_width - end_width).max(0.0);

        let mut cursor = 0.0;
        for avenue in 0..node.main_avenues() {
            let key = RoadKey::main(node.id, avenue);
            let width = self.road_width(key)?;
            let loca = ItemLoca::new((cursor, width), (0.0, body_cross));
            self.add_road(key, frame.to_canvas(loca), placed)?;
            cursor += width;

            let Some(&child) = node.children.get(avenue) else {
                continue;
            };
            let size = self.outer[child.index()];
            let (extent_main, extent_cross) = (size.along(main_axis), size.along(cross_axis));
            let align = graph.node(child).align.or(node.align).unwrap_or_default();
            let offset_cross = start_width + align.offset(available, extent_cross);
            let loca = ItemLoca::new((cursor, extent_main), (offset_cross, extent_cross));
            cursor += extent_main;
            self.place(child, frame.to_canvas(loca), placed)?;
        }

        let start = ItemLoca::new((0.0, body_main), (0.0, start_width));
        self.add_road(cross_start, frame.to_canvas(start), placed)?;
        let end = ItemLoca::new((0.0, body_main), (body_cross - end_width, end_width));
        self.add_road(cross_end, frame.to_canvas(end), placed)?;
        Ok(())
    }

    fn add_road(&self, key: RoadKey, bounds: Bounds, placed: &mut Placed) -> Result<(), TesseraError> {
        let graph = self.input.diagram.graph();
        let slot = self.slot(key)?;

        let fixed_axis = key.fixed_axis(graph);
        let reversed = graph
            .node(key.container)
            .compass_items
            .axis_direct(key.axis)
            .is_reversed();
        let (start, end) = bounds.range(fixed_axis);
        let across = bounds.range(fixed_axis.other());
        let half = self.lane_width / 2.0;

        let lanes = slot
            .lanes()
            .iter()
            .enumerate()
            .map(|(lane, link)| {
                let step = (lane as f32 + 0.5) * self.lane_width;
                let line = if reversed { end - step } else { start + step };
                LaneLayout {
                    lane,
                    link: *link,
                    line,
                    bounds: axis_bounds(fixed_axis, (line - half, line + half), across),
                }
            })
            .collect();

        placed.roads.insert(
            key,
            RoadLayout {
                key,
                bounds,
                fixed_axis,
                lanes,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use tessera_core::semantic::Diagram;
    use tessera_parser::parse;

    use super::*;
    use crate::{
        config::RouteConfig,
        lanes::RoadTable,
        route::{NoReference, RouteContext, RoutePlanner, TopologicalPlanner},
    };

    /// Every node shows one character: 8 x 16 with the default measure.
    fn input(diagram: Diagram, routed: bool, lane_min: usize) -> GeometryInput {
        let routes = if routed {
            let config = RouteConfig::default();
            let ctx = RouteContext::new(&diagram, diagram.links(), &config, &NoReference);
            TopologicalPlanner::new().plan(&ctx).unwrap()
        } else {
            Vec::new()
        };
        let roads = RoadTable::allocate(diagram.graph(), routes, lane_min).unwrap();
        let labels = diagram
            .graph()
            .iter()
            .map(|node| (!node.is_root()).then(|| Size::new(8.0, 16.0)))
            .collect();
        GeometryInput::new(diagram, roads, labels)
    }

    fn layout(source: &str) -> Layout {
        let diagram = parse(source).unwrap();
        FlexGeometry::new().compute(&input(diagram, false, 0)).unwrap()
    }

    #[test]
    fn test_column_stacks_cells() {
        let layout = layout("(a)\n(b)");

        // Cells: 8 x 16 plus 11 of spacing per side; root padding 4.
        assert_eq!(layout.size, Size::new(38.0, 84.0));
        let a = layout.node(NodeId::new(1)).unwrap();
        let b = layout.node(NodeId::new(2)).unwrap();
        assert_eq!(a.bounds, Bounds::new_from_top_left(Point::new(4.0, 4.0), Size::new(30.0, 38.0)));
        assert_approx_eq!(f32, b.bounds.min_y(), 42.0);
        assert_approx_eq!(f32, a.visible.min_x(), 8.0);
        assert_approx_eq!(f32, a.content.min_x(), 15.0);
        assert_eq!(a.label.as_ref().unwrap().text, "a");
    }

    #[test]
    fn test_reversed_row_accumulates_from_the_right() {
        let layout = layout("--- direction=row_reverse\n(a)\n(b)");

        let a = layout.node(NodeId::new(1)).unwrap();
        let b = layout.node(NodeId::new(2)).unwrap();
        assert_approx_eq!(f32, a.bounds.max_x(), 64.0);
        assert_approx_eq!(f32, b.bounds.min_x(), 4.0);
        assert_approx_eq!(f32, a.bounds.min_x(), b.bounds.max_x());
    }

    #[test]
    fn test_center_alignment() {
        let layout = layout("--- align=center\n(a)\n(b width=40)");

        // `b` is 62 wide, so `a` (30 wide) moves by floor(32 / 2).
        let a = layout.node(NodeId::new(1)).unwrap();
        assert_approx_eq!(f32, a.bounds.min_x(), 20.0);
    }

    #[test]
    fn test_unused_roads_follow_lane_min() {
        let gap = RoadKey::main(NodeId::ROOT, 1);

        let bare = layout("(a)\n(b)");
        let road = bare.road(gap).unwrap();
        assert!(road.lanes.is_empty());
        assert_approx_eq!(f32, road.bounds.height(), 0.0);

        let diagram = parse("(a)\n(b)").unwrap();
        let padded = FlexGeometry::new().compute(&input(diagram, false, 1)).unwrap();
        let road = padded.road(gap).unwrap();
        assert_eq!(road.lanes.len(), 1);
        assert_approx_eq!(f32, road.bounds.height(), 8.0);
        assert_eq!(road.lanes[0].link, None);
    }

    #[test]
    fn test_sibling_link_is_a_straight_line() {
        let diagram = parse("(a) -> (b)").unwrap();
        let layout = FlexGeometry::new().compute(&input(diagram, true, 0)).unwrap();

        let road = layout.road(RoadKey::main(NodeId::ROOT, 1)).unwrap();
        assert_eq!(road.fixed_axis, Axis::Cross);
        assert_approx_eq!(f32, road.lanes[0].line, 46.0);

        let link = &layout.links[0];
        assert_eq!(link.points, [Point::new(19.0, 38.0), Point::new(19.0, 54.0)]);

        let a = layout.node(NodeId::new(1)).unwrap();
        assert_eq!(a.gates.len(), 1);
        assert_eq!(a.gates[0].edge, Direct::DOWN);
    }

    #[test]
    fn test_container_label_takes_a_header_band() {
        let diagram = parse("[[g label=G]]\n(.a)").unwrap();
        let layout = FlexGeometry::new().compute(&input(diagram, false, 0)).unwrap();

        let g = layout.node(NodeId::new(1)).unwrap();
        let a = layout.node(NodeId::new(2)).unwrap();
        let label = g.label.as_ref().unwrap();
        assert_eq!(label.text, "G");
        assert_approx_eq!(f32, label.bounds.min_y(), g.content.min_y());
        assert!(a.bounds.min_y() >= label.bounds.max_y());
    }

    #[test]
    fn test_depth_limit() {
        let diagram = parse("[a]\n[.b]\n(.c)").unwrap();
        let engine = FlexGeometry::new().with_depth_limit(1);

        let err = engine.compute(&input(diagram, false, 0)).unwrap_err();
        assert_eq!(err.code(), Some("G101"));
    }
}
