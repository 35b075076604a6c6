//! wedge-engine - collision, move search and gravity for the half-cell
//! placement engine.
//!
//! Provides the settled field, the three-phase valid-moves search with
//! replayable paths, row clearing and cluster pulldown.

pub mod apply;
pub mod bonds;
pub mod collision;
pub mod config;
pub mod field;
pub mod gravity;
pub mod level;
pub mod move_list;
pub mod movegen;
pub mod movement;
pub mod perft;
pub mod search_grid;

pub use apply::{apply_move, TurnOutcome};
pub use bonds::manage_bonds;
pub use collision::{check_collision, collides, CollisionKind, CollisionResult};
pub use config::{ClosureMode, PulldownConfig, SearchConfig, TutorialRestriction};
pub use field::{ChangedCell, Field};
pub use gravity::{Gravity, PulldownReport, PulledCluster};
pub use level::{LevelDescriptor, LevelError, Objective};
pub use move_list::{Insert, MoveSet};
pub use movegen::{enumerate_reachable, enumerate_resting, generate_moves, MoveSearch};
pub use movement::{try_rotate, try_shift, MovementArena};
pub use perft::perft;
#[cfg(feature = "rayon")]
pub use perft::perft_parallel;
