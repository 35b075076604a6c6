//! Single-step movement and the arena that chains steps into paths.

use wedge_core::{Action, Direction, Movement, MovementId, PieceType, Position, Rotation};

use crate::field::Field;

/// Append-only store of movements. Ids stay valid until [`MovementArena::clear`].
#[derive(Clone, Debug, Default)]
pub struct MovementArena {
    movements: Vec<Movement>,
}

impl MovementArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.movements.clear();
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    /// Store a waypoint reached from `predecessor`.
    pub fn push(
        &mut self,
        position: Position,
        rotation: Rotation,
        action: Action,
        predecessor: Option<MovementId>,
    ) -> MovementId {
        let id = MovementId(self.movements.len() as u32);
        let mut movement = Movement::at(position, rotation, action);
        movement.predecessor = predecessor;
        self.movements.push(movement);
        id
    }

    #[inline(always)]
    pub fn get(&self, id: MovementId) -> &Movement {
        &self.movements[id.index()]
    }

    /// Waypoints from spawn to `last`, in playing order.
    pub fn path(&self, last: MovementId) -> Vec<Movement> {
        let mut out = Vec::new();
        let mut cursor = Some(last);
        while let Some(id) = cursor {
            let m = self.get(id);
            out.push(*m);
            cursor = m.predecessor;
        }
        out.reverse();
        out
    }

    /// Number of waypoints ending at `last`, spawn included.
    pub fn path_len(&self, last: MovementId) -> usize {
        let mut n = 0;
        let mut cursor = Some(last);
        while let Some(id) = cursor {
            n += 1;
            cursor = self.get(id).predecessor;
        }
        n
    }
}

/// Try to move one cell in `dir`.
pub fn try_shift(
    field: &Field,
    piece: &PieceType,
    rotation: Rotation,
    position: Position,
    dir: Direction,
) -> Option<Position> {
    let next = position.step(dir);
    let result = field.check(piece.blocks(rotation), next, Some(dir), false);
    (!result.is_now()).then_some(next)
}

/// Try to rotate in place. Pieces that cannot rotate never do.
pub fn try_rotate(
    field: &Field,
    piece: &PieceType,
    rotation: Rotation,
    position: Position,
    clockwise: bool,
) -> Option<Rotation> {
    if !piece.capabilities().rotates {
        return None;
    }
    let to = if clockwise {
        rotation.cw()
    } else {
        rotation.ccw()
    };
    (!field.collides(piece.blocks(to), position)).then_some(to)
}
