//! Configuration types for the Tessera layout pipeline.
//!
//! This module provides configuration structures that control how links are
//! routed, how the reference layout is computed and how output is written.
//! All types implement [`serde::Deserialize`] for loading from TOML files.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`RouteConfig`] - Route planner selection and search limits.
//! - [`LayoutConfig`] - Settings of the reference layout used by the planner.
//! - [`OutputConfig`] - Output formatting.
//!
//! # Example
//!
//! ```
//! # use tessera::config::{AppConfig, PlannerKind};
//! let config = AppConfig::default();
//! assert_eq!(config.route().planner(), PlannerKind::Geometric);
//! assert_eq!(config.route().depth_limit(), 1000);
//! ```

use std::fmt;

use serde::Deserialize;

/// Top-level configuration combining every section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Route planner section.
    #[serde(default)]
    route: RouteConfig,

    /// Reference layout section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Output section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(route: RouteConfig, layout: LayoutConfig, output: OutputConfig) -> Self {
        Self {
            route,
            layout,
            output,
        }
    }

    /// Returns the route planner configuration.
    pub fn route(&self) -> &RouteConfig {
        &self.route
    }

    /// Returns the reference layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the configuration with another route planner selected.
    pub fn with_planner(mut self, planner: PlannerKind) -> Self {
        self.route.planner = planner;
        self
    }
}

/// Which route planner the pipeline uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerKind {
    /// Geometry-aware best-first search over a reference layout.
    #[default]
    Geometric,
    /// Pure topology scoring of exit stubs.
    Topological,
}

impl PlannerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlannerKind::Geometric => "geometric",
            PlannerKind::Topological => "topological",
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_inner_limit() -> usize {
    10
}

fn default_outer_limit() -> usize {
    5
}

fn default_depth_limit() -> usize {
    1000
}

fn default_dummy_lane_min() -> usize {
    1
}

/// Route planner selection and search limits.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// Planner used by default.
    #[serde(default)]
    planner: PlannerKind,

    /// Successors kept per step among roads between the current point and
    /// the target.
    #[serde(default = "default_inner_limit")]
    inner_limit: usize,

    /// Successors kept per step among roads overshooting the target.
    #[serde(default = "default_outer_limit")]
    outer_limit: usize,

    /// Recursion cap of the stub climb.
    #[serde(default = "default_depth_limit")]
    depth_limit: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            planner: PlannerKind::default(),
            inner_limit: default_inner_limit(),
            outer_limit: default_outer_limit(),
            depth_limit: default_depth_limit(),
        }
    }
}

impl RouteConfig {
    /// Creates a new [`RouteConfig`].
    pub fn new(
        planner: PlannerKind,
        inner_limit: usize,
        outer_limit: usize,
        depth_limit: usize,
    ) -> Self {
        Self {
            planner,
            inner_limit,
            outer_limit,
            depth_limit,
        }
    }

    /// Returns the selected [`PlannerKind`].
    pub fn planner(&self) -> PlannerKind {
        self.planner
    }

    pub fn inner_limit(&self) -> usize {
        self.inner_limit
    }

    pub fn outer_limit(&self) -> usize {
        self.outer_limit
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }
}

/// Settings of the reference layout computed for the geometric planner.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Lanes reserved in every road of the reference layout.
    #[serde(default = "default_dummy_lane_min")]
    dummy_lane_min: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dummy_lane_min: default_dummy_lane_min(),
        }
    }
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    pub fn new(dummy_lane_min: usize) -> Self {
        Self { dummy_lane_min }
    }

    /// Returns the minimum lane count of the reference layout.
    pub fn dummy_lane_min(&self) -> usize {
        self.dummy_lane_min
    }
}

/// Output formatting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Write indented JSON.
    #[serde(default)]
    pretty: bool,
}

impl OutputConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Returns `true` when output should be indented.
    pub fn pretty(&self) -> bool {
        self.pretty
    }
}
