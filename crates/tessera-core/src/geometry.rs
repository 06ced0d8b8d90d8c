//! Geometric primitives for diagram layout and positioning.
//!
//! This module provides the geometric types used by the layout pipeline and
//! by the final geometry model handed to renderers.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding/border/margin values for four sides
//!
//! # Coordinate System
//!
//! Tessera uses the SVG convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The origin is the top-left corner of the canvas, X grows rightward and Y
//! grows downward. This matches [`Compass::CANVAS`](crate::compass::Compass::CANVAS).

use serde::Serialize;

use crate::compass::{Axis, Direct};

/// A 2D point in canvas space.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Manhattan distance to another point.
    pub fn manhattan(self, other: Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Returns the coordinate along the given absolute axis.
    ///
    /// The absolute main axis is X and the absolute cross axis is Y.
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Main => self.x,
            Axis::Cross => self.y,
        }
    }

    /// Returns a copy with the coordinate along `axis` replaced.
    pub fn with_along(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::Main => self.with_x(value),
            Axis::Cross => self.with_y(value),
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns a new Size with the insets added to both width and height
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Returns the extent along the given absolute axis (width for the
    /// main axis, height for the cross axis).
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Main => self.width,
            Axis::Cross => self.height,
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Shrinks the bounds by the given insets.
    ///
    /// The result never has a negative width or height.
    pub fn shrink(&self, insets: Insets) -> Self {
        let min_x = self.min_x + insets.left();
        let min_y = self.min_y + insets.top();
        Self {
            min_x,
            min_y,
            max_x: (self.max_x - insets.right()).max(min_x),
            max_y: (self.max_y - insets.bottom()).max(min_y),
        }
    }

    /// The coordinate of the edge facing the absolute direction `direct`.
    ///
    /// Right and left edges are X coordinates, down and up edges are Y
    /// coordinates.
    pub fn edge(self, direct: Direct) -> f32 {
        match direct {
            Direct::Main => self.max_x,
            Direct::Cross => self.max_y,
            Direct::MainReverse => self.min_x,
            Direct::CrossReverse => self.min_y,
        }
    }

    /// The `(start, end)` range of the bounds along an absolute axis.
    pub fn range(self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::Main => (self.min_x, self.max_x),
            Axis::Cross => (self.min_y, self.max_y),
        }
    }

    /// Returns true if the point lies inside or on the border of the bounds.
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Represents spacing around an element (padding, border, margin)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Builds insets from a CSS-like shorthand list.
    ///
    /// One value applies to every side, two values are `vertical,
    /// horizontal`, four values are `top, right, bottom, left`. Any other
    /// count returns `None`.
    ///
    /// ```
    /// # use tessera_core::geometry::Insets;
    /// let insets = Insets::from_shorthand(&[4.0, 8.0]).unwrap();
    /// assert_eq!(insets.top(), 4.0);
    /// assert_eq!(insets.left(), 8.0);
    /// assert!(Insets::from_shorthand(&[1.0, 2.0, 3.0]).is_none());
    /// ```
    pub fn from_shorthand(values: &[f32]) -> Option<Self> {
        match *values {
            [all] => Some(Self::uniform(all)),
            [vertical, horizontal] => Some(Self::new(vertical, horizontal, vertical, horizontal)),
            [top, right, bottom, left] => Some(Self::new(top, right, bottom, left)),
            _ => None,
        }
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the inset on the side facing the absolute direction `direct`.
    pub fn side(self, direct: Direct) -> f32 {
        match direct {
            Direct::Main => self.right,
            Direct::Cross => self.bottom,
            Direct::MainReverse => self.left,
            Direct::CrossReverse => self.top,
        }
    }

    /// Returns a copy with the side facing `direct` replaced.
    pub fn with_side(mut self, direct: Direct, value: f32) -> Self {
        match direct {
            Direct::Main => self.right = value,
            Direct::Cross => self.bottom = value,
            Direct::MainReverse => self.left = value,
            Direct::CrossReverse => self.top = value,
        }
        self
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }

    /// Adds two insets side by side.
    pub fn add(self, other: Insets) -> Self {
        Self {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}
