//! Integration tests for the DiagramBuilder API

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tessera::{
    DiagramBuilder, TesseraError,
    compass::Direct,
    config::{AppConfig, PlannerKind},
    geometry::Size,
    hooks::{PipelineHooks, StageHooks},
    layout::{FlexGeometry, Layout},
    route::{LinkRoute, RoadKey, RouteContext, RoutePlanner, TopologicalPlanner, exit_roads},
    semantic::{DocAttributes, Endpoint, Link, LinkId, Node, NodeId},
};

fn compile(source: &str) -> Layout {
    DiagramBuilder::default()
        .compile(source)
        .unwrap_or_else(|err| panic!("Failed to compile {source:?}: {err}"))
}

fn node_named(layout: &Layout, path: &str) -> NodeId {
    layout
        .nodes
        .iter()
        .find(|node| node.path.as_deref() == Some(path))
        .map(|node| node.id)
        .unwrap_or_else(|| panic!("no node {path}"))
}

/// Every link starts on its source gate, ends on its target gate and only
/// moves along one axis per segment.
fn assert_links_attached(layout: &Layout) {
    for link in &layout.links {
        let gate = |node: NodeId| {
            layout
                .node(node)
                .and_then(|node| node.gates.iter().find(|gate| gate.link == link.link))
                .map(|gate| gate.point)
        };
        let first = link.points.first().copied();
        let last = link.points.last().copied();
        assert_eq!(first, gate(link.from), "{} leaves its source gate", link.link);
        assert_eq!(last, gate(link.to), "{} enters its target gate", link.link);

        for pair in link.points.windows(2) {
            assert!(
                pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y(),
                "{} has a diagonal segment {:?}",
                link.link,
                pair
            );
        }
    }
}

#[test]
fn test_compile_siblings() {
    let layout = compile("(api) -> (db)");

    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.links.len(), 1);
    assert_eq!(layout.links[0].kind, "-");
    assert_links_attached(&layout);

    let api = layout.node(node_named(&layout, "api")).unwrap();
    let db = layout.node(node_named(&layout, "db")).unwrap();
    assert!(api.visible.max_y() <= db.visible.min_y());
    assert_eq!(layout.links[0].points[0].y(), api.visible.max_y());
}

#[test]
fn test_default_measure_sizes_cells() {
    // 3 chars of 8 by one line of 16; cell spacing 11 and root padding 4
    // per side.
    let layout = compile("(api)");
    assert_eq!(layout.size, Size::new(54.0, 46.0));
}

#[test]
fn test_custom_text_measure() {
    let builder = DiagramBuilder::default()
        .with_text_measure(|_: &str, _: &Node, _: &DocAttributes| Size::new(40.0, 10.0));
    let layout = builder.compile("(a)").unwrap();
    assert_eq!(layout.size, Size::new(70.0, 40.0));
}

fn counting_builder(config: AppConfig, calls: &Rc<Cell<usize>>) -> DiagramBuilder {
    let calls = Rc::clone(calls);
    DiagramBuilder::new(config).with_text_measure(move |_: &str, _: &Node, _: &DocAttributes| {
        calls.set(calls.get() + 1);
        Size::new(8.0, 16.0)
    })
}

#[test]
fn test_sized_cells_are_not_measured() {
    let calls = Rc::new(Cell::new(0));
    let layout = counting_builder(AppConfig::default(), &calls)
        .compile("(a width=10 height=10) -> (b width=10 height=10)")
        .unwrap();

    assert_eq!(calls.get(), 0);
    let a = layout.node(node_named(&layout, "a")).unwrap();
    assert_eq!(a.content.width(), 10.0);
    assert_eq!(a.label.as_ref().map(|label| label.bounds), Some(a.content));
}

#[test]
fn test_each_cell_is_measured_once() {
    // The geometric planner lays the diagram out twice but measures once.
    for planner in [PlannerKind::Geometric, PlannerKind::Topological] {
        let calls = Rc::new(Cell::new(0));
        let builder = counting_builder(AppConfig::default().with_planner(planner), &calls);

        builder.compile("(a) -> (b)\n(c width=5)").unwrap();
        assert_eq!(calls.get(), 3, "{planner}");
    }
}

#[test]
fn test_deep_nesting_route() {
    let source = "[a]\n[.b]\n[.c]\n(.x)\n---\n(y)\n{a.b.c.x -> y}";
    let diagram = DiagramBuilder::default().parse(source).unwrap();
    let graph = diagram.graph();
    let path = |id: NodeId| graph.node(id).path.clone().unwrap_or_default();
    let x = diagram.links()[0].from.node;

    // Leaving `x` downwards crosses one road per level up to the root.
    let straight: Vec<(String, RoadKey)> = exit_roads(graph, x, Direct::DOWN, 4)
        .into_iter()
        .map(|(_, key)| (path(key.container), key))
        .collect();
    let containers: Vec<&str> = straight.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(containers, ["a.b.c", "a.b", "a", ""]);
    assert_eq!(straight[3].1, RoadKey::main(NodeId::ROOT, 1));

    for planner in [PlannerKind::Geometric, PlannerKind::Topological] {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let hooks = PipelineHooks {
            route: StageHooks::default().with_post({
                let captured = Rc::clone(&captured);
                move |routes: Vec<LinkRoute>| {
                    *captured.borrow_mut() = routes.clone();
                    routes
                }
            }),
            ..PipelineHooks::default()
        };
        let layout = DiagramBuilder::new(AppConfig::default().with_planner(planner))
            .with_hooks(hooks)
            .compile(source)
            .unwrap();

        // Only the road where the link turns is listed; the straight run
        // through `c`, `b` and `a` is not.
        let routes = captured.borrow();
        let route = &routes[0];
        assert_eq!(route.keys().collect::<Vec<_>>(), [RoadKey::main(NodeId::ROOT, 1)], "{planner}");
        assert_eq!((route.from_exit, route.to_exit), (Direct::DOWN, Direct::UP), "{planner}");

        assert_eq!(layout.links[0].from, node_named(&layout, "a.b.c.x"));
        assert_eq!(layout.links[0].to, node_named(&layout, "y"));
        assert_links_attached(&layout);

        let road = layout.road(RoadKey::main(NodeId::ROOT, 1)).unwrap();
        assert_eq!(road.lanes[0].link, Some(LinkId::new(0)));
        let turns: Vec<f32> = layout.links[0].points[1..3].iter().map(|p| p.y()).collect();
        assert_eq!(turns, [road.lanes[0].line, road.lanes[0].line], "{planner}");
    }
}

#[test]
fn test_document_style_reaches_the_layout() {
    let layout = compile("style=dark\nlink_border=2\n(a) -> (b)");
    assert_eq!(layout.style.as_deref(), Some("dark"));

    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["style"], "dark");
    assert_eq!(json["link_border"], 2.0);
    assert_eq!(serde_json::to_value(compile("(a)")).unwrap()["style"], serde_json::Value::Null);
}

/// Panics if two gates of `node` share a point.
fn assert_gates_distinct(layout: &Layout, node: NodeId) {
    let gates = &layout.node(node).unwrap().gates;
    for (i, a) in gates.iter().enumerate() {
        for (j, b) in gates.iter().enumerate().skip(i + 1) {
            assert_ne!(a.point, b.point, "gates {i} and {j} overlap");
        }
    }
}

#[test]
fn test_tag_fan_out_gets_distinct_gates() {
    let layout = compile("(a tag=x)\n(b tag=x)\n(d tag=x)\n(c)\n{$x -> c}");

    assert_eq!(layout.links.len(), 3);
    assert_links_attached(&layout);

    let c = node_named(&layout, "c");
    assert_eq!(layout.node(c).unwrap().gates.len(), 3);
    assert_gates_distinct(&layout, c);
}

#[test]
fn test_crowded_edge_keeps_gates_apart() {
    // Seven gates at the default gap need 48 units; the top edge of `c` has 22.
    let cells: String = (0..7).map(|i| format!("(n{i} tag=x)\n")).collect();
    let layout = compile(&format!("{cells}(c)\n{{$x ->2 c}}"));
    assert_links_attached(&layout);

    let c = node_named(&layout, "c");
    let node = layout.node(c).unwrap();
    assert_eq!(node.gates.len(), 7);
    assert_gates_distinct(&layout, c);
    for gate in &node.gates {
        assert_eq!(gate.edge, Direct::UP);
        assert_eq!(gate.point.y(), node.visible.min_y());
        assert!(gate.point.x() > node.visible.min_x() && gate.point.x() < node.visible.max_x());
    }
}

#[test]
fn test_planners_agree_on_siblings() {
    let source = "--- direction=row\n(a) -> (b)";
    let geometric = compile(source);
    let topological = DiagramBuilder::new(AppConfig::default().with_planner(PlannerKind::Topological))
        .compile(source)
        .unwrap();

    assert_eq!(geometric, topological);
}

#[test]
fn test_compile_is_deterministic() {
    let source = "[[g label=Group]]\n(.a)\n(.b)\n---\n(c)\n{g.a -> c}\n{g.b -> c}\n(c) -> (d)";
    assert_eq!(compile(source), compile(source));
}

#[test]
fn test_hooks_rewrite_stages() {
    let hooks = PipelineHooks {
        read: StageHooks::default().with_pre(|src: String| src.replace("(x)", "(y)")),
        route: StageHooks::default().with_pre(|_links: Vec<Link>| Vec::new()),
        geometry: StageHooks::default().with_post(|mut layout: Layout| {
            layout.size = Size::new(1.0, 2.0);
            layout
        }),
        ..PipelineHooks::default()
    };
    let builder = DiagramBuilder::default().with_hooks(hooks);

    let layout = builder.compile("(x) -> (z)").unwrap();
    assert!(layout.links.is_empty());
    assert_eq!(layout.size, Size::new(1.0, 2.0));
    assert_eq!(layout.nodes[1].path.as_deref(), Some("y"));
}

struct CountingPlanner {
    calls: Rc<Cell<usize>>,
}

impl RoutePlanner for CountingPlanner {
    fn plan(&self, ctx: &RouteContext<'_>) -> Result<Vec<LinkRoute>, TesseraError> {
        self.calls.set(self.calls.get() + 1);
        TopologicalPlanner::new().plan(ctx)
    }
}

#[test]
fn test_route_planner_override() {
    let calls = Rc::new(Cell::new(0));
    let builder = DiagramBuilder::default().with_route_planner(Box::new(CountingPlanner {
        calls: Rc::clone(&calls),
    }));

    let layout = builder.compile("(a) -> (b)").unwrap();
    assert_eq!(calls.get(), 1);
    assert_links_attached(&layout);
}

#[test]
fn test_layout_serializes_to_json() {
    let layout = compile("(a) -> (b)");
    let json = serde_json::to_value(&layout).unwrap();

    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["links"][0]["from"], 1);
    assert!(json["links"][0]["points"].as_array().is_some_and(|points| points.len() >= 2));
    assert!(json["roads"].as_array().is_some_and(|roads| !roads.is_empty()));
}

#[test]
fn test_parse_errors_carry_codes() {
    let builder = DiagramBuilder::default();

    let err = builder.compile("[a label=x").unwrap_err();
    assert!(matches!(err, TesseraError::Parse { .. }));
    assert_eq!(err.code(), Some("E004"));

    assert_eq!(builder.compile("(a)\n{a -> b}").unwrap_err().code(), Some("E202"));
    assert_eq!(
        builder.compile("[a]\n(.b)\n{a -> a.b}").unwrap_err().code(),
        Some("E205")
    );
}

#[test]
fn test_parse_error_keeps_normalized_source() {
    let err = DiagramBuilder::default().parse("(a)\r\n{a -> b}").unwrap_err();
    match err {
        TesseraError::Parse { src, .. } => assert_eq!(src, "(a)\n{a -> b}"),
        other => panic!("unexpected error {other}"),
    }
}

fn link_between(from: usize, to: usize) -> Link {
    Link::new(
        Endpoint::new(NodeId::new(from), None),
        Endpoint::new(NodeId::new(to), None),
        "-",
    )
}

#[test]
fn test_related_link_from_hook_is_rejected() {
    for planner in [PlannerKind::Geometric, PlannerKind::Topological] {
        let hooks = PipelineHooks {
            route: StageHooks::default().with_pre(|_| vec![link_between(1, 2)]),
            ..PipelineHooks::default()
        };
        let builder =
            DiagramBuilder::new(AppConfig::default().with_planner(planner)).with_hooks(hooks);

        let err = builder.compile("[g]\n(.a)").unwrap_err();
        assert_eq!(err.code(), Some("R101"), "{planner}");
        assert!(!err.is_internal());
    }
}

#[test]
fn test_unknown_node_from_hook_is_internal() {
    let hooks = PipelineHooks {
        route: StageHooks::default().with_pre(|_| vec![link_between(1, 99)]),
        ..PipelineHooks::default()
    };
    let err = DiagramBuilder::default()
        .with_hooks(hooks)
        .compile("(a)")
        .unwrap_err();

    assert_eq!(err.code(), Some("I002"));
    assert!(err.is_internal());
}

#[test]
fn test_geometry_depth_limit() {
    let builder =
        DiagramBuilder::default().with_geometry_engine(Box::new(FlexGeometry::new().with_depth_limit(1)));
    let err = builder.compile("[a]\n[.b]\n(.c)").unwrap_err();
    assert_eq!(err.code(), Some("G101"));
}

#[test]
fn test_gate_points_on_row() {
    let layout = compile("--- direction=row\n(a) -> (b)");
    let link = layout.link(LinkId::new(0)).unwrap();
    let a = layout.node(link.from).unwrap();

    let b = layout.node(link.to).unwrap();

    assert_eq!(link.points[0].x(), a.visible.max_x());
    assert_eq!(link.points.last().map(|point| point.x()), Some(b.visible.min_x()));
}
