//! Hex cell geometry in odd-row offset coordinates

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// A cell on the puzzle grid.
///
/// `x` is the column and `y` the row, counted downwards. Odd rows are shifted
/// half a cell east. Arithmetic goes through axial coordinates, so adding a
/// displacement to every member of a shape keeps its hex adjacency intact no
/// matter which row parity the shape starts on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCell {
    pub x: i32,
    pub y: i32,
}

impl HexCell {
    pub const ZERO: HexCell = HexCell::new(0, 0);
    pub const WEST: HexCell = HexCell::new(-1, 0);
    pub const EAST: HexCell = HexCell::new(1, 0);
    pub const SOUTHWEST: HexCell = HexCell::new(-1, 1);
    pub const SOUTHEAST: HexCell = HexCell::new(0, 1);
    pub const NORTHWEST: HexCell = HexCell::new(-1, -1);
    pub const NORTHEAST: HexCell = HexCell::new(0, -1);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Axial coordinates `(q, r)` of this cell
    pub fn to_axial(self) -> (i32, i32) {
        (self.x - (self.y - (self.y & 1)) / 2, self.y)
    }

    /// Cell at axial coordinates `(q, r)`
    pub fn from_axial(q: i32, r: i32) -> Self {
        Self::new(q + (r - (r & 1)) / 2, r)
    }

    /// Displacement that moves a shape `rows` rows down (up when negative)
    /// without shifting it sideways on even rows.
    pub fn rows(rows: i32) -> Self {
        Self::from_axial(0, rows)
    }

    /// Rotate 60 degrees about `pivot`.
    ///
    /// Exact integer arithmetic; six rotations in the same direction return
    /// the original cell.
    pub fn rotate(self, pivot: HexCell, clockwise: bool) -> HexCell {
        let (q, r) = (self - pivot).to_axial();
        let (q, r) = if clockwise { (-r, q + r) } else { (q + r, -q) };
        HexCell::from_axial(q, r) + pivot
    }

    /// Hex-grid distance between two cells.
    ///
    /// Moving `rows` rows from `self` can reach a cone of `rows + 1` columns
    /// on the target row; the distance is the row separation plus how far
    /// `other` lies outside that cone.
    pub fn distance(self, other: HexCell) -> i32 {
        let (dq, dr) = (other - self).to_axial();
        let rows = dr.abs();
        // Axial column range reachable in `rows` steps towards the target row
        let (lo, hi) = if dr >= 0 { (-rows, 0) } else { (0, rows) };
        let excess = if dq < lo {
            lo - dq
        } else if dq > hi {
            dq - hi
        } else {
            0
        };
        rows + excess
    }
}

impl Add for HexCell {
    type Output = HexCell;

    fn add(self, rhs: HexCell) -> HexCell {
        let (q1, r1) = self.to_axial();
        let (q2, r2) = rhs.to_axial();
        HexCell::from_axial(q1 + q2, r1 + r2)
    }
}

impl Sub for HexCell {
    type Output = HexCell;

    fn sub(self, rhs: HexCell) -> HexCell {
        self + -rhs
    }
}

impl Neg for HexCell {
    type Output = HexCell;

    fn neg(self) -> HexCell {
        let (q, r) = self.to_axial();
        HexCell::from_axial(-q, -r)
    }
}
