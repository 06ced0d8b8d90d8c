//! Compass algebra for nested coordinate frames.
//!
//! Every container lays its children out along its own *main* axis and
//! aligns them along its *cross* axis. The pair of absolute directions those
//! axes point to is the container's [`Compass`]. Because each subtree may
//! rotate or mirror its axes, most of the layout pipeline needs to translate
//! directions between frames; this module holds the small set of total
//! functions used for that.
//!
//! # Directions
//!
//! A [`Direct`] is one of four values forming two opposite pairs
//! (`Main` ↔ `MainReverse`, `Cross` ↔ `CrossReverse`). Read against a
//! compass it is a *relative* direction. Read against [`Compass::CANVAS`]
//! it is an *absolute* direction:
//!
//! ```text
//!              Up (3)
//!                │
//!   Left (2) ────┼────► Right (0)
//!                │
//!                ▼
//!             Down (1)
//! ```
//!
//! # Example
//!
//! ```
//! # use tessera_core::compass::{Compass, Direct};
//! let column = Compass::new(Direct::DOWN, Direct::RIGHT).unwrap();
//!
//! assert_eq!(column.full(), [Direct::DOWN, Direct::RIGHT, Direct::UP, Direct::LEFT]);
//! assert_eq!(column.relative_of(Direct::UP), Direct::MainReverse);
//! assert_eq!(column.mapping(column), Compass::CANVAS);
//! ```

use std::fmt;

use serde::Serialize;

/// One of the four directions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Direct {
    Main = 0,
    Cross = 1,
    MainReverse = 2,
    CrossReverse = 3,
}

impl Direct {
    /// Absolute right (`+x`).
    pub const RIGHT: Direct = Direct::Main;
    /// Absolute down (`+y`).
    pub const DOWN: Direct = Direct::Cross;
    /// Absolute left (`-x`).
    pub const LEFT: Direct = Direct::MainReverse;
    /// Absolute up (`-y`).
    pub const UP: Direct = Direct::CrossReverse;

    /// All directions in canonical order.
    pub const ALL: [Direct; 4] = [
        Direct::Main,
        Direct::Cross,
        Direct::MainReverse,
        Direct::CrossReverse,
    ];

    /// Build a direction from its integer value (0–3).
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Direct::Main),
            1 => Some(Direct::Cross),
            2 => Some(Direct::MainReverse),
            3 => Some(Direct::CrossReverse),
            _ => None,
        }
    }

    /// The integer value of this direction, usable as an array index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direct::Main => Direct::MainReverse,
            Direct::Cross => Direct::CrossReverse,
            Direct::MainReverse => Direct::Main,
            Direct::CrossReverse => Direct::Cross,
        }
    }

    /// The axis this direction lies on.
    pub fn axis(self) -> Axis {
        match self {
            Direct::Main | Direct::MainReverse => Axis::Main,
            Direct::Cross | Direct::CrossReverse => Axis::Cross,
        }
    }

    /// Returns `true` if both directions lie on the same axis.
    pub fn is_same_axis(self, other: Direct) -> bool {
        self.axis() == other.axis()
    }

    /// Returns `true` for the two reverse directions (integer value ≥ 2).
    ///
    /// For absolute directions this means the direction runs against the
    /// canvas coordinates (left or up).
    pub fn is_reversed(self) -> bool {
        match self {
            Direct::Main | Direct::Cross => false,
            Direct::MainReverse | Direct::CrossReverse => true,
        }
    }

    /// The two directions that are neither this one nor its opposite.
    pub fn perpendicular(self) -> [Direct; 2] {
        match self.axis() {
            Axis::Main => [Direct::Cross, Direct::CrossReverse],
            Axis::Cross => [Direct::Main, Direct::MainReverse],
        }
    }

    /// Human readable name of the direction read as an absolute direction.
    pub fn absolute_name(self) -> &'static str {
        match self {
            Direct::Main => "right",
            Direct::Cross => "down",
            Direct::MainReverse => "left",
            Direct::CrossReverse => "up",
        }
    }
}

impl fmt::Display for Direct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direct::Main => "main",
            Direct::Cross => "cross",
            Direct::MainReverse => "main_reverse",
            Direct::CrossReverse => "cross_reverse",
        };
        f.write_str(name)
    }
}

/// One of the two axes of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Main,
    Cross,
}

impl Axis {
    /// The other axis.
    pub fn other(self) -> Self {
        match self {
            Axis::Main => Axis::Cross,
            Axis::Cross => Axis::Main,
        }
    }

    /// The forward direction of this axis.
    pub fn forward(self) -> Direct {
        match self {
            Axis::Main => Direct::Main,
            Axis::Cross => Direct::Cross,
        }
    }
}

/// A coordinate frame: the absolute directions of a container's main and
/// cross axes.
///
/// The two directions are never parallel; [`Compass::new`] refuses such
/// pairs so every other operation is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Compass {
    main: Direct,
    cross: Direct,
}

impl Compass {
    /// The canvas frame: main axis to the right, cross axis downward.
    pub const CANVAS: Compass = Compass {
        main: Direct::RIGHT,
        cross: Direct::DOWN,
    };

    /// Left to right, aligned from the top. Same as the canvas.
    pub const ROW: Compass = Compass::CANVAS;

    /// Top to bottom, aligned from the left.
    pub const COLUMN: Compass = Compass {
        main: Direct::DOWN,
        cross: Direct::RIGHT,
    };

    /// Right to left, aligned from the top.
    pub const ROW_REVERSE: Compass = Compass {
        main: Direct::LEFT,
        cross: Direct::DOWN,
    };

    /// Bottom to top, aligned from the left.
    pub const COLUMN_REVERSE: Compass = Compass {
        main: Direct::UP,
        cross: Direct::RIGHT,
    };

    /// Create a compass from two non-parallel directions.
    ///
    /// Returns `None` when `main` and `cross` lie on the same axis.
    pub fn new(main: Direct, cross: Direct) -> Option<Self> {
        if main.is_same_axis(cross) {
            None
        } else {
            Some(Self { main, cross })
        }
    }

    /// Every valid compass, in a stable order.
    pub fn all() -> impl Iterator<Item = Compass> {
        Direct::ALL.into_iter().flat_map(|main| {
            main.perpendicular()
                .into_iter()
                .map(move |cross| Compass { main, cross })
        })
    }

    /// Direction of the main axis.
    pub fn main(self) -> Direct {
        self.main
    }

    /// Direction of the cross axis.
    pub fn cross(self) -> Direct {
        self.cross
    }

    /// Direction of the given axis.
    pub fn axis_direct(self, axis: Axis) -> Direct {
        match axis {
            Axis::Main => self.main,
            Axis::Cross => self.cross,
        }
    }

    /// All four directions in canonical order `(main, cross, -main, -cross)`.
    pub fn full(self) -> [Direct; 4] {
        [
            self.main,
            self.cross,
            self.main.reverse(),
            self.cross.reverse(),
        ]
    }

    /// The same frame with its axes exchanged.
    pub fn swap(self) -> Self {
        Self {
            main: self.cross,
            cross: self.main,
        }
    }

    /// The compass axis direction lying on the same axis as `direct`.
    pub fn same_axis_by_direct(self, direct: Direct) -> Direct {
        if self.main.is_same_axis(direct) {
            self.main
        } else {
            self.cross
        }
    }

    /// The compass axis direction lying on the other axis than `direct`.
    pub fn another_axis_by_direct(self, direct: Direct) -> Direct {
        if self.main.is_same_axis(direct) {
            self.cross
        } else {
            self.main
        }
    }

    /// Express a direction of the enclosing frame relative to this compass.
    pub fn relative_of(self, direct: Direct) -> Direct {
        if direct == self.main {
            Direct::Main
        } else if direct == self.cross {
            Direct::Cross
        } else if direct == self.main.reverse() {
            Direct::MainReverse
        } else {
            Direct::CrossReverse
        }
    }

    /// Express a direction relative to this compass in the enclosing frame.
    pub fn absolute_of(self, relative: Direct) -> Direct {
        match relative {
            Direct::Main => self.main,
            Direct::Cross => self.cross,
            Direct::MainReverse => self.main.reverse(),
            Direct::CrossReverse => self.cross.reverse(),
        }
    }

    /// The axis of this compass that `direct` lies on.
    pub fn axis_of(self, direct: Direct) -> Axis {
        self.relative_of(direct).axis()
    }

    /// Map `inner`'s main and cross axes into this frame.
    ///
    /// Both compasses must be expressed in the same enclosing frame. The
    /// result tells, relative to `self`, where `inner`'s main and cross
    /// axes point; `c.mapping(c)` is the identity `(Main, Cross)`.
    pub fn mapping(self, inner: Compass) -> Compass {
        Compass {
            main: self.relative_of(inner.main),
            cross: self.relative_of(inner.cross),
        }
    }

    /// [`Compass::mapping`] expanded to all four directions: entry `r` is
    /// the direction of `self` matching `inner`'s relative direction `r`.
    pub fn mapping_full(self, inner: Compass) -> [Direct; 4] {
        self.mapping(inner).full()
    }

    /// Returns `true` if the given axis runs against the canvas coordinates.
    pub fn is_reversed(self, axis: Axis) -> bool {
        self.axis_direct(axis).is_reversed()
    }
}

impl Default for Compass {
    fn default() -> Self {
        Compass::CANVAS
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            self.main.absolute_name(),
            self.cross.absolute_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_pairs() {
        assert_eq!(Direct::Main.reverse(), Direct::MainReverse);
        assert_eq!(Direct::Cross.reverse(), Direct::CrossReverse);
        for direct in Direct::ALL {
            assert_eq!(direct.reverse().reverse(), direct);
            assert_ne!(direct.reverse(), direct);
        }
    }

    #[test]
    fn test_from_index() {
        for direct in Direct::ALL {
            assert_eq!(Direct::from_index(direct.index() as u8), Some(direct));
        }
        assert_eq!(Direct::from_index(4), None);
    }

    #[test]
    fn test_compass_new_rejects_parallel_pairs() {
        assert!(Compass::new(Direct::RIGHT, Direct::LEFT).is_none());
        assert!(Compass::new(Direct::UP, Direct::UP).is_none());
        assert!(Compass::new(Direct::UP, Direct::LEFT).is_some());
    }

    #[test]
    fn test_all_compasses() {
        let all: Vec<_> = Compass::all().collect();
        assert_eq!(all.len(), 8);
        assert!(all.contains(&Compass::CANVAS));
    }

    #[test]
    fn test_relative_absolute_inverse() {
        for compass in Compass::all() {
            for direct in Direct::ALL {
                assert_eq!(compass.absolute_of(compass.relative_of(direct)), direct);
                assert_eq!(compass.relative_of(compass.absolute_of(direct)), direct);
            }
        }
    }

    #[test]
    fn test_canvas_is_identity() {
        for direct in Direct::ALL {
            assert_eq!(Compass::CANVAS.relative_of(direct), direct);
        }
    }

    #[test]
    fn test_mapping_row_into_column() {
        let column = Compass::new(Direct::DOWN, Direct::RIGHT).unwrap();
        let row_reverse = Compass::new(Direct::LEFT, Direct::DOWN).unwrap();

        let mapping = column.mapping(row_reverse);
        assert_eq!(mapping.main(), Direct::CrossReverse);
        assert_eq!(mapping.cross(), Direct::Main);
        assert_eq!(
            column.mapping_full(row_reverse),
            [
                Direct::CrossReverse,
                Direct::Main,
                Direct::Cross,
                Direct::MainReverse
            ]
        );
    }

    #[test]
    fn test_same_and_another_axis() {
        let column = Compass::new(Direct::UP, Direct::RIGHT).unwrap();
        assert_eq!(column.same_axis_by_direct(Direct::DOWN), Direct::UP);
        assert_eq!(column.another_axis_by_direct(Direct::DOWN), Direct::RIGHT);
        assert_eq!(column.same_axis_by_direct(Direct::LEFT), Direct::RIGHT);
        assert_eq!(column.another_axis_by_direct(Direct::LEFT), Direct::UP);
    }

    #[test]
    fn test_is_reversed() {
        let compass = Compass::new(Direct::LEFT, Direct::DOWN).unwrap();
        assert!(compass.is_reversed(Axis::Main));
        assert!(!compass.is_reversed(Axis::Cross));
    }

    #[test]
    fn test_display() {
        assert_eq!(Compass::CANVAS.to_string(), "(right, down)");
        assert_eq!(Direct::CrossReverse.to_string(), "cross_reverse");
    }
}
