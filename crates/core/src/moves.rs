//! Moves (terminal placements) and the movement waypoints leading to them.

use serde::{Deserialize, Serialize};

use crate::{Position, Rotation};

/// Identity of a placement: grid position and rotation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveKey {
    pub x: i8,
    pub y: i8,
    pub rotation: Rotation,
}

impl MoveKey {
    pub fn new(position: Position, rotation: Rotation) -> Self {
        Self {
            x: position.x,
            y: position.y,
            rotation,
        }
    }

    pub fn position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Which search phase produced a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum MoveOrigin {
    Drop,
    Tuck,
    Flood,
    Closure,
}

/// Handle into a movement arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovementId(pub u32);

impl MovementId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Action {
    Spawn,
    Left,
    Right,
    Down,
    /// Straight fall to the landing row.
    Drop,
    RotateCw,
    RotateCcw,
    /// Horizontal slide under an overhang.
    Slide,
}

/// One waypoint of a path. Positions are floats so presentation layers can
/// store interpolated points in the same chain.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub x: f32,
    pub y: f32,
    pub rotation: Rotation,
    pub action: Action,
    pub predecessor: Option<MovementId>,
}

impl Movement {
    pub fn at(position: Position, rotation: Rotation, action: Action) -> Self {
        Self {
            x: position.x as f32,
            y: position.y as f32,
            rotation,
            action,
            predecessor: None,
        }
    }

    /// Nearest grid position.
    pub fn position(&self) -> Position {
        Position::new(self.x.round() as i8, self.y.round() as i8)
    }
}

/// A terminal placement with the tail of its path.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub position: Position,
    pub rotation: Rotation,
    /// Filled in by scorers; the engine leaves it at zero.
    pub score: f32,
    pub last: MovementId,
    /// Path length in movements, spawn included.
    pub steps: u16,
    pub origin: MoveOrigin,
    pub under_overhang: bool,
}

impl Move {
    pub fn key(&self) -> MoveKey {
        MoveKey::new(self.position, self.rotation)
    }
}
