//! perft - leaf placement counts over a piece queue, for regression checks
//! and benchmarks.

use wedge_core::{PieceId, PieceType};

use crate::apply::apply_move;
use crate::config::{PulldownConfig, SearchConfig};
use crate::field::Field;
use crate::gravity::Gravity;
use crate::movegen::MoveSearch;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

struct Perft<'a> {
    config: &'a SearchConfig,
    pulldown: PulldownConfig,
    gravity: Gravity,
    search: MoveSearch,
}

impl<'a> Perft<'a> {
    fn new(config: &'a SearchConfig) -> Self {
        Self {
            config,
            pulldown: PulldownConfig::standard(),
            gravity: Gravity::default(),
            search: MoveSearch::new(),
        }
    }

    fn count(&mut self, field: &Field, queue: &[&PieceType], depth: u32, ply: u32) -> u64 {
        if depth == 0 || queue.is_empty() {
            return 1;
        }
        let piece = queue[0];
        let spawn = piece.spawn_position(field.width(), field.height());
        let moves = self
            .search
            .search(field, piece, spawn, self.config)
            .as_slice()
            .to_vec();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0u64;
        for mv in &moves {
            let mut next = field.clone();
            apply_move(
                &mut next,
                piece,
                mv,
                PieceId(ply),
                &mut self.gravity,
                &self.pulldown,
            );
            nodes += self.count(&next, &queue[1..], depth - 1, ply + 1);
        }
        nodes
    }
}

/// Count placements `depth` plies deep, playing `queue` in order.
pub fn perft(field: &Field, queue: &[&PieceType], depth: u32, config: &SearchConfig) -> u64 {
    Perft::new(config).count(field, queue, depth, 0)
}

/// [`perft`] with the first ply split across threads.
#[cfg(feature = "rayon")]
pub fn perft_parallel(
    field: &Field,
    queue: &[&PieceType],
    depth: u32,
    config: &SearchConfig,
) -> u64 {
    if depth <= 1 || queue.is_empty() {
        return perft(field, queue, depth, config);
    }
    let piece = queue[0];
    let spawn = piece.spawn_position(field.width(), field.height());
    let moves = MoveSearch::new()
        .search(field, piece, spawn, config)
        .as_slice()
        .to_vec();

    moves
        .par_iter()
        .map_init(
            || Perft::new(config),
            |state, mv| {
                let mut next = field.clone();
                apply_move(
                    &mut next,
                    piece,
                    mv,
                    PieceId(0),
                    &mut state.gravity,
                    &state.pulldown,
                );
                state.count(&next, &queue[1..], depth - 1, 1)
            },
        )
        .sum()
}
