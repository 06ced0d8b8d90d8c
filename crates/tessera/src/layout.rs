//! Geometry engine: from routed, lane-allocated diagrams to absolute
//! coordinates.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram + RoadTable + label sizes
//!     ↓ layout (this module)
//! Layout
//!     ↓ export (outside this crate)
//! ```
//!
//! # Submodules
//!
//! - [`model`] - The serializable output model ([`Layout`] and its parts)
//! - `flex` - [`FlexGeometry`], the default engine: bottom-up sizing,
//!   relative placement inside each container's own frame, conversion to
//!   canvas coordinates
//! - `wires` - Gates on node edges and link polylines along lane lines

mod flex;
pub mod model;
mod wires;

pub use flex::FlexGeometry;
pub use model::{Gate, LabelLayout, LaneLayout, Layout, LinkLayout, NodeLayout, RoadLayout};

use tessera_core::{geometry::Size, semantic::Diagram};

use crate::{error::TesseraError, lanes::RoadTable};

/// Everything the geometry stage reads.
#[derive(Debug, Clone)]
pub struct GeometryInput {
    pub diagram: Diagram,
    /// Lane table, including the routes with their lanes.
    pub roads: RoadTable,
    /// Measured label size per node id; `None` for nodes without text.
    pub labels: Vec<Option<Size>>,
}

impl GeometryInput {
    pub fn new(diagram: Diagram, roads: RoadTable, labels: Vec<Option<Size>>) -> Self {
        Self {
            diagram,
            roads,
            labels,
        }
    }
}

/// Computes absolute geometry.
pub trait GeometryEngine {
    /// # Errors
    ///
    /// Returns `TesseraError::Geometry` when the tree cannot be laid out
    /// and `TesseraError::Invariant` when the input tables disagree with
    /// the diagram.
    fn compute(&self, input: &GeometryInput) -> Result<Layout, TesseraError>;
}
