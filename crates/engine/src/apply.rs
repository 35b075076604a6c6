//! Play one move: land, clear, collapse, pull down, repeat.

use wedge_core::{Move, PieceId, PieceType};

use crate::config::PulldownConfig;
use crate::field::{ChangedCell, Field};
use crate::gravity::{Gravity, PulledCluster};

/// Everything a turn changed, in the order it happened.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnOutcome {
    pub landed: Vec<ChangedCell>,
    pub cleared: Vec<ChangedCell>,
    pub rows_cleared: usize,
    pub pulled: Vec<PulledCluster>,
    /// Clear rounds after the first, caused by pulled clusters
    /// completing more rows.
    pub cascades: usize,
}

/// Land `mv` and settle the field.
///
/// # Panics
/// Panics if the move collides on `field`.
pub fn apply_move(
    field: &mut Field,
    piece: &PieceType,
    mv: &Move,
    piece_id: PieceId,
    gravity: &mut Gravity,
    config: &PulldownConfig,
) -> TurnOutcome {
    let mut outcome = TurnOutcome {
        landed: field.land_piece(piece, mv.rotation, mv.position, piece_id, None),
        ..TurnOutcome::default()
    };

    let mut round = 0;
    loop {
        let cleared = field.clear_filled_rows();
        if cleared.is_empty() {
            break;
        }
        if round > 0 {
            outcome.cascades += 1;
        }
        round += 1;
        outcome.cleared.extend(cleared);
        outcome.rows_cleared += field.remove_cleared_rows();
        outcome.pulled.extend(gravity.pull_down(field, config).clusters);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge_core::token::parse_grid;
    use wedge_core::{MoveOrigin, MovementId, PieceKind, Position, Rotation};

    fn bar() -> PieceType {
        PieceType::new("bar2", PieceKind::Regular, &[". .", "#a #a"]).unwrap()
    }

    fn mv(x: i8, y: i8, rotation: Rotation) -> Move {
        Move {
            position: Position::new(x, y),
            rotation,
            score: 0.0,
            last: MovementId(0),
            steps: 1,
            origin: MoveOrigin::Drop,
            under_overhang: false,
        }
    }

    #[test]
    fn test_apply_without_clear() {
        let mut field = Field::new(4, 4, 0);
        let out = apply_move(
            &mut field,
            &bar(),
            &mv(0, 0, Rotation::North),
            PieceId(1),
            &mut Gravity::default(),
            &PulldownConfig::standard(),
        );
        assert_eq!(out.landed.len(), 2);
        assert_eq!(out.rows_cleared, 0);
        assert_eq!(field.cell(1, 0).first.piece, Some(PieceId(1)));
    }

    #[test]
    fn test_apply_clears_and_collapses() {
        let mut field = Field::from_grid(
            parse_grid(
                ". . #c .
                 #b #b . .",
            )
            .unwrap(),
            0,
        )
        .unwrap();
        let out = apply_move(
            &mut field,
            &bar(),
            &mv(2, 0, Rotation::North),
            PieceId(1),
            &mut Gravity::default(),
            &PulldownConfig::standard(),
        );
        assert_eq!(out.rows_cleared, 1);
        assert_eq!(out.cleared.len(), 4);
        // the block above the cleared row drops into it
        assert!(!field.cell(2, 0).is_empty());
        assert!(field.cell(2, 1).is_empty());
    }

    #[test]
    fn test_cascade_counts_rounds() {
        // clearing the bottom row lets the red block fall into the gap
        // of the next row, which then completes too
        let mut field = Field::from_grid(
            parse_grid(
                ". . . . #r
                 #c #c #c #c .
                 . . #e #d #d",
            )
            .unwrap(),
            0,
        )
        .unwrap();
        let out = apply_move(
            &mut field,
            &bar(),
            &mv(0, 0, Rotation::North),
            PieceId(1),
            &mut Gravity::default(),
            &PulldownConfig::standard(),
        );
        assert_eq!(out.rows_cleared, 2);
        assert_eq!(out.cascades, 1);
        assert!(field.cells().is_all_empty());
    }
}
