//! Cells, sub-cells and bonds.

use serde::{Deserialize, Serialize};

use crate::{Direction, Fill, Rotation};

/// Palette index, rendered as a lowercase letter in the token format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color(pub u8);

impl Color {
    pub const MAX: u8 = 26;

    pub fn as_char(self) -> char {
        char::from(b'a' + self.0.min(Self::MAX - 1))
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.is_ascii_lowercase().then(|| Color(c as u8 - b'a'))
    }
}

/// Id of the piece a landed sub-cell came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Landed by the player.
    #[default]
    Piece,
    /// Level block: pinned under gravity, never bonds.
    Obstacle,
    /// Falls as one rigid cluster joined by raw adjacency.
    Asteroid,
    /// Solid filler that never completes a row.
    Placeholder,
}

impl BlockKind {
    /// Gravity never moves this block.
    #[inline]
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Obstacle | Self::Placeholder)
    }

    #[inline]
    pub fn can_bond(self) -> bool {
        matches!(self, Self::Piece | Self::Asteroid)
    }

    pub(crate) fn prefix(self) -> Option<char> {
        match self {
            Self::Piece => None,
            Self::Obstacle => Some('!'),
            Self::Asteroid => Some('*'),
            Self::Placeholder => Some('?'),
        }
    }

    pub(crate) fn from_prefix(c: char) -> Option<Self> {
        match c {
            '!' => Some(Self::Obstacle),
            '*' => Some(Self::Asteroid),
            '?' => Some(Self::Placeholder),
            _ => None,
        }
    }
}

/// The nine bond flags of a sub-cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BondDir {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    /// The other half of the same cell.
    Diagonal,
}

impl BondDir {
    pub const NEIGHBOURS: [BondDir; 8] = [
        BondDir::Up,
        BondDir::Down,
        BondDir::Left,
        BondDir::Right,
        BondDir::UpLeft,
        BondDir::UpRight,
        BondDir::DownLeft,
        BondDir::DownRight,
    ];

    pub const CORNERS: [BondDir; 4] = [
        BondDir::UpLeft,
        BondDir::UpRight,
        BondDir::DownLeft,
        BondDir::DownRight,
    ];

    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }

    pub fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::UpLeft => (-1, 1),
            Self::UpRight => (1, 1),
            Self::DownLeft => (-1, -1),
            Self::DownRight => (1, -1),
            Self::Diagonal => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::UpLeft => Self::DownRight,
            Self::UpRight => Self::DownLeft,
            Self::DownLeft => Self::UpRight,
            Self::DownRight => Self::UpLeft,
            Self::Diagonal => Self::Diagonal,
        }
    }

    /// Orthogonal components of a corner direction: (horizontal, vertical).
    pub fn components(self) -> Option<(BondDir, BondDir)> {
        match self {
            Self::UpLeft => Some((Self::Left, Self::Up)),
            Self::UpRight => Some((Self::Right, Self::Up)),
            Self::DownLeft => Some((Self::Left, Self::Down)),
            Self::DownRight => Some((Self::Right, Self::Down)),
            _ => None,
        }
    }

    /// Diagonal runs "/" (up-right / down-left).
    pub fn is_rising(self) -> bool {
        matches!(self, Self::UpRight | Self::DownLeft)
    }
}

impl From<Direction> for BondDir {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

/// Derived adjacency flags. Recomputed after every grid mutation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct Bonds(u16);

impl Bonds {
    pub const NONE: Self = Self(0);

    #[inline]
    pub fn has(self, dir: BondDir) -> bool {
        self.0 & dir.bit() != 0
    }

    #[inline]
    pub fn set(&mut self, dir: BondDir) {
        self.0 |= dir.bit();
    }

    #[inline]
    pub fn clear(&mut self, dir: BondDir) {
        self.0 &= !dir.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = BondDir> {
        BondDir::NEIGHBOURS
            .into_iter()
            .chain([BondDir::Diagonal])
            .filter(move |d| self.has(*d))
    }
}

/// Pulldown pass directions a sub-cell has already been processed from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct ScanMark {
    pub left_to_right: bool,
    pub right_to_left: bool,
}

/// One of the two half-occupancy slots of a cell.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SubCell {
    pub fill: Fill,
    pub color: Option<Color>,
    pub rotation: Rotation,
    pub piece: Option<PieceId>,
    pub kind: BlockKind,
    /// Removed together with every other sub-cell of its piece.
    pub indivisible: bool,
    pub bonds: Bonds,
    pub scan_mark: ScanMark,
    pub found: bool,
}

impl SubCell {
    pub const EMPTY: Self = Self {
        fill: Fill::Empty,
        color: None,
        rotation: Rotation::North,
        piece: None,
        kind: BlockKind::Piece,
        indivisible: false,
        bonds: Bonds::NONE,
        scan_mark: ScanMark {
            left_to_right: false,
            right_to_left: false,
        },
        found: false,
    };

    pub fn new(fill: Fill, color: Color) -> Self {
        if fill.is_empty() {
            return Self::EMPTY;
        }
        Self {
            fill,
            color: Some(color),
            ..Self::EMPTY
        }
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fill.is_empty()
    }

    /// Same block content, ignoring derived and transient state.
    pub fn same_content(&self, other: &SubCell) -> bool {
        self.fill == other.fill && self.color == other.color && self.kind == other.kind
    }

    pub fn clear_transient(&mut self) {
        self.scan_mark = ScanMark::default();
        self.found = false;
    }

    /// Copy rotated 90° clockwise, as used when building piece rotations.
    pub fn rotated_cw(mut self) -> Self {
        self.fill = self.fill.rotated_cw();
        self
    }
}

/// A grid position: two sub-cells, filled in order.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Cell {
    pub first: SubCell,
    pub second: SubCell,
}

impl Cell {
    pub const EMPTY: Self = Self {
        first: SubCell::EMPTY,
        second: SubCell::EMPTY,
    };

    pub fn single(sub: SubCell) -> Self {
        Self {
            first: sub,
            second: SubCell::EMPTY,
        }
    }

    #[inline]
    pub fn subs(&self) -> [&SubCell; 2] {
        [&self.first, &self.second]
    }

    #[inline]
    pub fn subs_mut(&mut self) -> [&mut SubCell; 2] {
        [&mut self.first, &mut self.second]
    }

    pub fn sub(&self, index: usize) -> &SubCell {
        if index == 0 {
            &self.first
        } else {
            &self.second
        }
    }

    pub fn sub_mut(&mut self, index: usize) -> &mut SubCell {
        if index == 0 {
            &mut self.first
        } else {
            &mut self.second
        }
    }

    /// Non-empty sub-cells with their slot index.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &SubCell)> {
        self.subs()
            .into_iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Both halves combine to cover the cell, or one sub-cell is full.
    pub fn is_full(&self) -> bool {
        self.first.fill == Fill::Full
            || self.second.fill == Fill::Full
            || self.first.fill.is_complement_of(self.second.fill)
    }

    /// Fill covering the cell as a whole: two complementary halves act as one
    /// full sub-cell.
    pub fn effective_fill(&self) -> Fill {
        if self.is_full() {
            Fill::Full
        } else if !self.first.is_empty() {
            self.first.fill
        } else {
            self.second.fill
        }
    }

    /// Which half of the cell is filled, if exactly one is.
    pub fn filled_half(&self) -> Option<Fill> {
        let fill = self.effective_fill();
        fill.is_half().then_some(fill)
    }

    /// Can `fill` be added without overlapping what is already here?
    pub fn accepts(&self, fill: Fill) -> bool {
        if fill.is_empty() {
            return true;
        }
        match (self.first.is_empty(), self.second.is_empty()) {
            (true, true) => true,
            (false, true) => self.first.fill.is_complement_of(fill),
            _ => false,
        }
    }

    /// Put a sub-cell into the first empty half.
    ///
    /// # Panics
    /// Panics when the cell cannot take the sub-cell without overlap.
    pub fn insert(&mut self, sub: SubCell) -> usize {
        assert!(
            self.accepts(sub.fill),
            "sub-cell {:?} overlaps cell {:?}/{:?}",
            sub.fill,
            self.first.fill,
            self.second.fill
        );
        if self.first.is_empty() {
            self.first = sub;
            0
        } else {
            self.second = sub;
            1
        }
    }

    /// Empty one slot, keeping the remaining sub-cell in `first`.
    pub fn remove(&mut self, index: usize) -> SubCell {
        let removed = *self.sub(index);
        if index == 0 {
            self.first = self.second;
        }
        self.second = SubCell::EMPTY;
        removed
    }

    /// Cell invariants: `second` only next to a half `first`, and two
    /// halves are complementary.
    pub fn is_consistent(&self) -> bool {
        for sub in self.subs() {
            if sub.is_empty() && (sub.color.is_some() || !sub.bonds.is_empty()) {
                return false;
            }
        }
        if self.second.is_empty() {
            return true;
        }
        self.first.fill.is_complement_of(self.second.fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half(fill: Fill) -> SubCell {
        SubCell::new(fill, Color(0))
    }

    #[test]
    fn test_full_cell() {
        let cell = Cell::single(SubCell::new(Fill::Full, Color(1)));
        assert!(cell.is_full());
        assert_eq!(cell.effective_fill(), Fill::Full);
        assert!(!cell.accepts(Fill::LowerLeft));
    }

    #[test]
    fn test_complementary_halves_make_full() {
        let mut cell = Cell::EMPTY;
        assert_eq!(cell.insert(half(Fill::LowerLeft)), 0);
        assert!(!cell.is_full());
        assert_eq!(cell.filled_half(), Some(Fill::LowerLeft));
        assert!(cell.accepts(Fill::UpperRight));
        assert!(!cell.accepts(Fill::LowerRight));
        assert_eq!(cell.insert(half(Fill::UpperRight)), 1);
        assert!(cell.is_full());
        assert!(cell.is_consistent());
    }

    #[test]
    #[should_panic]
    fn test_overlapping_insert_panics() {
        let mut cell = Cell::single(half(Fill::LowerLeft));
        cell.insert(half(Fill::LowerRight));
    }

    #[test]
    fn test_remove_compacts() {
        let mut cell = Cell::EMPTY;
        cell.insert(half(Fill::LowerRight));
        cell.insert(SubCell::new(Fill::UpperLeft, Color(2)));
        let removed = cell.remove(0);
        assert_eq!(removed.fill, Fill::LowerRight);
        assert_eq!(cell.first.fill, Fill::UpperLeft);
        assert!(cell.second.is_empty());
    }

    #[test]
    fn test_empty_subcell_has_no_color() {
        let sub = SubCell::new(Fill::Empty, Color(3));
        assert_eq!(sub.color, None);
    }

    #[test]
    fn test_bonds_flags() {
        let mut bonds = Bonds::NONE;
        bonds.set(BondDir::Up);
        bonds.set(BondDir::Diagonal);
        assert!(bonds.has(BondDir::Up));
        assert!(!bonds.has(BondDir::Down));
        assert_eq!(bonds.iter().count(), 2);
        bonds.clear(BondDir::Up);
        assert!(!bonds.has(BondDir::Up));
    }

    #[test]
    fn test_bond_dir_opposites() {
        for dir in BondDir::NEIGHBOURS {
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_color_chars() {
        assert_eq!(Color(0).as_char(), 'a');
        assert_eq!(Color::from_char('c'), Some(Color(2)));
        assert_eq!(Color::from_char('C'), None);
    }
}
