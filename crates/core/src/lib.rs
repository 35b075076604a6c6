//! wedge core crate - grid model and piece templates for the half-cell
//! placement engine.

mod catalogue;
mod cell;
mod error;
mod fill;
mod grid;
mod moves;
mod piece;
pub mod token;

pub use catalogue::Catalogue;
pub use cell::{BlockKind, BondDir, Bonds, Cell, Color, PieceId, ScanMark, SubCell};
pub use error::{GridError, PieceError, TokenError};
pub use fill::{Direction, Fill};
pub use grid::{BlockGrid, Grid, Position};
pub use moves::{Action, Move, MoveKey, MoveOrigin, Movement, MovementId};
pub use piece::{
    Bounds, Capabilities, Fingerprint, PieceKind, PieceRotation, PieceType, Rotation,
    MAX_PIECE_SIZE,
};
