//! Units: piece shapes and their placements

use crate::cell::HexCell;
use crate::moves::Move;
use std::hash::{Hash, Hasher};

/// A piece placement: member cells, a pivot, and the orientation bookkeeping
/// needed to measure rotation distance.
///
/// Members are kept sorted so two placements covering the same cells compare
/// equal regardless of input order. Equality and hashing look at pivot and
/// members only; the orientation is determined by them.
#[derive(Clone, Debug)]
pub struct Unit {
    members: Vec<HexCell>,
    pivot: HexCell,
    orientation: u8,
    symmetry: u8,
}

impl Unit {
    /// Build a unit in orientation 0. Returns `None` for an empty member list.
    pub fn new(members: impl IntoIterator<Item = HexCell>, pivot: HexCell) -> Option<Self> {
        let mut members: Vec<HexCell> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        if members.is_empty() {
            return None;
        }

        let symmetry = Self::symmetry_of(&members, pivot);
        Some(Self {
            members,
            pivot,
            orientation: 0,
            symmetry,
        })
    }

    /// Smallest number of clockwise turns that reproduces the member set
    fn symmetry_of(members: &[HexCell], pivot: HexCell) -> u8 {
        let mut turned = members.to_vec();
        for k in 1..6 {
            for cell in turned.iter_mut() {
                *cell = cell.rotate(pivot, true);
            }
            turned.sort_unstable();
            if turned == members {
                return k;
            }
        }
        6
    }

    fn with_members(&self, mut members: Vec<HexCell>, pivot: HexCell, orientation: u8) -> Self {
        members.sort_unstable();
        Self {
            members,
            pivot,
            orientation,
            symmetry: self.symmetry,
        }
    }

    pub fn members(&self) -> &[HexCell] {
        &self.members
    }

    pub fn pivot(&self) -> HexCell {
        self.pivot
    }

    /// Clockwise turns from the original shape, modulo `symmetry`
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    /// Number of distinct orientations (1, 2, 3 or 6)
    pub fn symmetry(&self) -> u8 {
        self.symmetry
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn top(&self) -> i32 {
        self.members.iter().map(|c| c.y).min().unwrap_or(0)
    }

    pub fn bottom(&self) -> i32 {
        self.members.iter().map(|c| c.y).max().unwrap_or(0)
    }

    pub fn left(&self) -> i32 {
        self.members.iter().map(|c| c.x).min().unwrap_or(0)
    }

    pub fn right(&self) -> i32 {
        self.members.iter().map(|c| c.x).max().unwrap_or(0)
    }

    /// Translate every member and the pivot
    pub fn moved(&self, direction: HexCell) -> Unit {
        let members = self.members.iter().map(|&c| c + direction).collect();
        self.with_members(members, self.pivot + direction, self.orientation)
    }

    /// Rotate 60 degrees about the pivot
    pub fn rotated(&self, clockwise: bool) -> Unit {
        let members = self
            .members
            .iter()
            .map(|&c| c.rotate(self.pivot, clockwise))
            .collect();
        let orientation = if clockwise {
            (self.orientation + 1) % self.symmetry
        } else {
            (self.orientation + self.symmetry - 1) % self.symmetry
        };
        self.with_members(members, self.pivot, orientation)
    }

    /// Placement after playing `mv`
    pub fn apply(&self, mv: Move) -> Unit {
        match mv.displacement() {
            Some(direction) => self.moved(direction),
            None => self.rotated(mv == Move::Clockwise),
        }
    }

    /// Placement from which playing `mv` lands on `self`
    pub fn unapply(&self, mv: Move) -> Unit {
        match (mv.inverse(), mv.displacement()) {
            (Some(back), _) => self.apply(back),
            (None, Some(direction)) => self.moved(-direction),
            (None, None) => self.clone(),
        }
    }

    /// Spawn placement on a board `width` columns wide: the topmost members
    /// sit on row 0 and the free columns are split evenly, the odd one going
    /// to the right.
    pub fn centered(&self, width: i32) -> Unit {
        let lifted = self.moved(HexCell::rows(-self.top()));
        let span = lifted.right() - lifted.left() + 1;
        let left_gap = (width - span) / 2;
        lifted.moved(HexCell::new(left_gap - lifted.left(), 0))
    }

    /// Shift sideways so the leftmost member is on column 0
    pub fn left_justified(&self) -> Unit {
        self.moved(HexCell::new(-self.left(), 0))
    }

    /// Every distinct orientation, starting with this one and turning clockwise
    pub fn orientations(&self) -> Vec<Unit> {
        let mut all = Vec::with_capacity(self.symmetry as usize);
        let mut current = self.clone();
        for _ in 0..self.symmetry {
            let next = current.rotated(true);
            all.push(current);
            current = next;
        }
        all
    }

    /// Fewest rotations turning this orientation into `other`'s
    pub fn rotation_distance(&self, other: &Unit) -> u32 {
        let s = self.symmetry.max(1) as u32;
        let d = (self.orientation as u32 + s - other.orientation as u32 % s) % s;
        d.min(s - d)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.pivot == other.pivot && self.members == other.members
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pivot.hash(state);
        self.members.hash(state);
    }
}
