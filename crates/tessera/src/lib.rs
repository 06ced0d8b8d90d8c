//! Tessera - compile box-and-link diagram text into an absolute layout.
//!
//! The pipeline reads the diagram language, resolves the box tree, plans a
//! route for every link, reserves lanes for those routes and finally
//! computes absolute geometry. The result is a direction-agnostic
//! [`Layout`](layout::Layout) a renderer can draw directly.

pub mod config;
pub mod hooks;
pub mod lanes;
pub mod layout;
pub mod measure;
pub mod route;

mod error;

pub use tessera_core::{compass, geometry, semantic};

pub use error::{GeometryErrorCode, InvariantCode, RouteErrorCode, TesseraError};

use log::{debug, info, trace};

use tessera_core::{geometry::Size, semantic::Diagram};

use config::{AppConfig, PlannerKind};
use hooks::PipelineHooks;
use lanes::RoadTable;
use layout::{FlexGeometry, GeometryEngine, GeometryInput, Layout};
use measure::{CharCountMeasure, TextMeasure, display_text};
use route::{
    GeometricPlanner, LinkRoute, ReferenceGeometry, RouteContext, RoutePlanner,
    TopologicalPlanner,
};

/// Builder for compiling Tessera diagrams.
///
/// Runs the stages in order: read, resolve, route, lanes, geometry. Every
/// stage can be wrapped with [`PipelineHooks`]; the route planner, the
/// geometry engine and the text measure can be replaced.
///
/// # Examples
///
/// ```
/// use tessera::{DiagramBuilder, config::AppConfig};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let layout = builder.compile("(api) -> (db)").expect("Failed to compile");
///
/// assert_eq!(layout.links.len(), 1);
/// assert!(layout.links[0].points.len() >= 2);
/// ```
pub struct DiagramBuilder {
    config: AppConfig,
    hooks: PipelineHooks,
    planner: Option<Box<dyn RoutePlanner>>,
    engine: Box<dyn GeometryEngine>,
    measure: Box<dyn TextMeasure>,
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// The planner named by the configuration is used unless
    /// [`with_route_planner`](Self::with_route_planner) overrides it.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            hooks: PipelineHooks::default(),
            planner: None,
            engine: Box::new(FlexGeometry::new()),
            measure: Box::new(CharCountMeasure),
        }
    }

    /// Replaces the route planner.
    pub fn with_route_planner(mut self, planner: Box<dyn RoutePlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Replaces the geometry engine, both for the final layout and for the
    /// reference layout of the geometric planner.
    pub fn with_geometry_engine(mut self, engine: Box<dyn GeometryEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the label measure.
    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Installs stage hooks.
    pub fn with_hooks(mut self, hooks: PipelineHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a resolved diagram.
    ///
    /// Line endings are normalized before the read hooks see the text.
    ///
    /// # Errors
    ///
    /// Returns `TesseraError::Parse` for syntax, reference and attribute
    /// errors. Its `src` is the text the spans refer to.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera::DiagramBuilder;
    ///
    /// let diagram = DiagramBuilder::default()
    ///     .parse("[[web]]\n(.api)")
    ///     .expect("Failed to parse diagram");
    /// assert_eq!(diagram.graph().len(), 3);
    /// ```
    pub fn parse(&self, source: &str) -> Result<Diagram, TesseraError> {
        info!("Parsing diagram");

        let source = self
            .hooks
            .read
            .pre(tessera_parser::normalize_newlines(source).into_owned());
        let raw = tessera_parser::read(&source)
            .map_err(|err| TesseraError::new_parse_error(err, source.as_str()))?;
        let raw = self.hooks.read.post(raw);

        let diagram = self
            .hooks
            .resolve
            .try_run(raw, tessera_parser::resolve)
            .map_err(|err| TesseraError::new_parse_error(err, source.as_str()))?;

        debug!(
            nodes = diagram.graph().len(),
            links = diagram.links().len();
            "Diagram parsed successfully"
        );
        trace!(diagram:?; "Parsed diagram");

        Ok(diagram)
    }

    /// Lay out a resolved diagram.
    ///
    /// # Errors
    ///
    /// Returns `TesseraError::Route` when a link cannot be routed,
    /// `TesseraError::Geometry` when the tree cannot be laid out and
    /// `TesseraError::Invariant` when a hook handed corrupted data to a
    /// later stage.
    pub fn layout(&self, mut diagram: Diagram) -> Result<Layout, TesseraError> {
        let labels = self.labels(&diagram);
        let links = self.hooks.route.pre(diagram.links().to_vec());
        info!(links = links.len(); "Routing links");
        let routes = {
            let reference = self.reference_pass(&labels);
            let ctx = RouteContext::new(&diagram, &links, self.config.route(), &reference);
            self.plan(&ctx)?
        };
        let routes = self.hooks.route.post(routes);
        diagram.replace_links(links);
        debug!(routes = routes.len(); "Links routed");

        let routes = self.hooks.lanes.pre(routes);
        let roads = RoadTable::allocate(diagram.graph(), routes, diagram.doc().lane_min)?;
        let roads = self.hooks.lanes.post(roads);

        let input = GeometryInput::new(diagram, roads, labels);
        let layout = self
            .hooks
            .geometry
            .try_run(input, |input| self.engine.compute(&input))?;

        info!(
            width = layout.size.width(),
            height = layout.size.height();
            "Layout calculated"
        );
        Ok(layout)
    }

    /// Parse and lay out source text.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`parse`](Self::parse) or
    /// [`layout`](Self::layout).
    pub fn compile(&self, source: &str) -> Result<Layout, TesseraError> {
        let diagram = self.parse(source)?;
        self.layout(diagram)
    }

    fn plan(&self, ctx: &RouteContext<'_>) -> Result<Vec<LinkRoute>, TesseraError> {
        if let Some(planner) = &self.planner {
            debug!("Using custom route planner");
            return planner.plan(ctx);
        }
        let kind = self.config.route().planner();
        debug!(planner = kind.as_str(); "Selecting route planner");
        match kind {
            PlannerKind::Geometric => GeometricPlanner::new().plan(ctx),
            PlannerKind::Topological => TopologicalPlanner::new().plan(ctx),
        }
    }

    fn reference_pass<'a>(&'a self, labels: &'a [Option<Size>]) -> ReferencePass<'a> {
        ReferencePass {
            engine: self.engine.as_ref(),
            labels,
            dummy_lane_min: self.config.layout().dummy_lane_min(),
        }
    }

    /// Label size per node, measured once per compile: cells lacking an
    /// explicit width or height, containers with a label. The root and fully
    /// sized cells get nothing.
    fn labels(&self, diagram: &Diagram) -> Vec<Option<Size>> {
        let doc = diagram.doc();
        diagram
            .graph()
            .iter()
            .map(|node| {
                let text = if node.is_root() {
                    None
                } else if node.is_container() {
                    node.label.as_deref()
                } else if node.width.is_some() && node.height.is_some() {
                    None
                } else {
                    display_text(node)
                };
                text.map(|text| self.measure.measure(text, node, doc))
            })
            .collect()
    }
}

/// Lays out the diagram without links for planners that need coordinates.
///
/// Reuses the label sizes of the compile it serves.
struct ReferencePass<'a> {
    engine: &'a dyn GeometryEngine,
    labels: &'a [Option<Size>],
    dummy_lane_min: usize,
}

impl ReferenceGeometry for ReferencePass<'_> {
    fn reference_layout(&self, diagram: &Diagram) -> Result<Layout, TesseraError> {
        let lane_min = diagram.doc().lane_min.max(self.dummy_lane_min);
        debug!(lane_min; "Computing reference layout");

        let roads = RoadTable::allocate(diagram.graph(), Vec::new(), lane_min)?;
        let input = GeometryInput::new(diagram.clone(), roads, self.labels.to_vec());
        self.engine.compute(&input)
    }
}
