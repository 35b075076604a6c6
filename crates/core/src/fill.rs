//! Sub-cell fill shapes and the four movement directions.
//!
//! A half fill is the right triangle whose right angle sits in the named
//! corner; its hypotenuse runs between the two neighbouring corners.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// (dx, dy) with y growing upward
    #[inline]
    pub fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum Fill {
    #[default]
    Empty,
    Full,
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

impl Fill {
    pub const HALVES: [Fill; 4] = [
        Fill::LowerLeft,
        Fill::LowerRight,
        Fill::UpperLeft,
        Fill::UpperRight,
    ];

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    #[inline]
    pub fn is_half(self) -> bool {
        !matches!(self, Self::Empty | Self::Full)
    }

    /// The half that completes this one into a full cell.
    pub fn complement(self) -> Self {
        match self {
            Self::LowerLeft => Self::UpperRight,
            Self::UpperRight => Self::LowerLeft,
            Self::LowerRight => Self::UpperLeft,
            Self::UpperLeft => Self::LowerRight,
            other => other,
        }
    }

    #[inline]
    pub fn is_complement_of(self, other: Fill) -> bool {
        self.is_half() && other == self.complement()
    }

    /// Shape after rotating the cell 90° clockwise.
    pub fn rotated_cw(self) -> Self {
        match self {
            Self::LowerLeft => Self::UpperLeft,
            Self::UpperLeft => Self::UpperRight,
            Self::UpperRight => Self::LowerRight,
            Self::LowerRight => Self::LowerLeft,
            other => other,
        }
    }

    /// Does the filled region cover the whole edge on `side`?
    pub fn has_full_edge(self, side: Direction) -> bool {
        match self {
            Self::Empty => false,
            Self::Full => true,
            Self::LowerLeft => matches!(side, Direction::Down | Direction::Left),
            Self::LowerRight => matches!(side, Direction::Down | Direction::Right),
            Self::UpperLeft => matches!(side, Direction::Up | Direction::Left),
            Self::UpperRight => matches!(side, Direction::Up | Direction::Right),
        }
    }

    /// Directions this half can travel while sliding onto its complement.
    /// These are the directions its hypotenuse faces. Full and empty fills
    /// have none.
    pub fn approach_directions(self) -> [Option<Direction>; 2] {
        match self {
            Self::UpperRight => [Some(Direction::Down), Some(Direction::Left)],
            Self::LowerLeft => [Some(Direction::Up), Some(Direction::Right)],
            Self::LowerRight => [Some(Direction::Up), Some(Direction::Left)],
            Self::UpperLeft => [Some(Direction::Down), Some(Direction::Right)],
            Self::Empty | Self::Full => [None, None],
        }
    }

    #[inline]
    pub fn approaches_from(self, direction: Direction) -> bool {
        self.approach_directions().contains(&Some(direction))
    }

    /// Hypotenuse runs "/" (lower-left corner to upper-right corner).
    #[inline]
    pub fn is_rising(self) -> bool {
        matches!(self, Self::LowerRight | Self::UpperLeft)
    }

    /// Two fills overlap in area when placed in the same cell.
    pub fn overlaps(self, other: Fill) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !self.is_complement_of(other)
    }

    /// Does the sub-region of quadrant (qx, qy) of the cell lie inside the fill?
    /// Quadrants are indexed 0..2 from the bottom-left. A quadrant counts when
    /// its centre lies inside or on the boundary of the fill.
    pub fn covers_quadrant(self, qx: usize, qy: usize) -> bool {
        // quadrant centres at 0.25 / 0.75, scaled by 4 to stay integral
        let cx = 1 + 2 * qx as i32;
        let cy = 1 + 2 * qy as i32;
        match self {
            Self::Empty => false,
            Self::Full => true,
            Self::LowerLeft => cx + cy <= 4,
            Self::UpperRight => cx + cy >= 4,
            Self::LowerRight => cy <= cx,
            Self::UpperLeft => cy >= cx,
        }
    }

    /// Numpad-style token character.
    pub fn as_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Full => '#',
            Self::LowerLeft => '1',
            Self::LowerRight => '3',
            Self::UpperLeft => '7',
            Self::UpperRight => '9',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Empty),
            '#' => Some(Self::Full),
            '1' => Some(Self::LowerLeft),
            '3' => Some(Self::LowerRight),
            '7' => Some(Self::UpperLeft),
            '9' => Some(Self::UpperRight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_pairs() {
        assert_eq!(Fill::LowerLeft.complement(), Fill::UpperRight);
        assert_eq!(Fill::LowerRight.complement(), Fill::UpperLeft);
        assert!(Fill::UpperLeft.is_complement_of(Fill::LowerRight));
        assert!(!Fill::Full.is_complement_of(Fill::Full));
        assert!(!Fill::LowerLeft.is_complement_of(Fill::LowerRight));
    }

    #[test]
    fn test_rotation_cycle() {
        for half in Fill::HALVES {
            let mut f = half;
            for _ in 0..4 {
                f = f.rotated_cw();
            }
            assert_eq!(f, half);
        }
        assert_eq!(Fill::LowerLeft.rotated_cw(), Fill::UpperLeft);
        assert_eq!(Fill::Full.rotated_cw(), Fill::Full);
    }

    #[test]
    fn test_rotation_preserves_complement() {
        for half in Fill::HALVES {
            assert_eq!(half.rotated_cw().complement(), half.complement().rotated_cw());
        }
    }

    #[test]
    fn test_edges() {
        assert!(Fill::LowerLeft.has_full_edge(Direction::Left));
        assert!(Fill::LowerLeft.has_full_edge(Direction::Down));
        assert!(!Fill::LowerLeft.has_full_edge(Direction::Up));
        assert!(Fill::Full.has_full_edge(Direction::Right));
        assert!(!Fill::Empty.has_full_edge(Direction::Right));
    }

    #[test]
    fn test_approach_faces_away_from_edges() {
        for half in Fill::HALVES {
            for dir in Direction::ALL {
                if half.approaches_from(dir) {
                    // travelling in `dir` leads with the hypotenuse, so the
                    // leading side is never a full edge
                    assert!(!half.has_full_edge(dir), "{half:?} {dir:?}");
                }
            }
        }
    }

    #[test]
    fn test_overlaps() {
        assert!(Fill::Full.overlaps(Fill::LowerLeft));
        assert!(Fill::LowerLeft.overlaps(Fill::LowerRight));
        assert!(!Fill::LowerLeft.overlaps(Fill::UpperRight));
        assert!(!Fill::Empty.overlaps(Fill::Full));
    }

    #[test]
    fn test_quadrants() {
        let count = |f: Fill| {
            (0..2)
                .flat_map(|qy| (0..2).map(move |qx| (qx, qy)))
                .filter(|&(qx, qy)| f.covers_quadrant(qx, qy))
                .count()
        };
        assert_eq!(count(Fill::Full), 4);
        assert_eq!(count(Fill::Empty), 0);
        for half in Fill::HALVES {
            assert_eq!(count(half), 3, "{half:?}");
        }
        assert!(Fill::LowerLeft.covers_quadrant(0, 0));
        assert!(!Fill::LowerLeft.covers_quadrant(1, 1));
    }

    #[test]
    fn test_char_round_trip() {
        for f in [Fill::Empty, Fill::Full, Fill::LowerLeft, Fill::UpperRight] {
            assert_eq!(Fill::from_char(f.as_char()), Some(f));
        }
        assert_eq!(Fill::from_char('x'), None);
    }
}
