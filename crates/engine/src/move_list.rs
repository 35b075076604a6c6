//! Ordered, deduplicated move set.

use rustc_hash::FxHashMap;
use wedge_core::{Move, MoveKey, PieceType};

/// What happened to a move offered to the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insert {
    Added(usize),
    /// An existing entry was replaced by this shorter path.
    Shortened(usize),
    Duplicate(usize),
}

impl Insert {
    pub fn index(self) -> usize {
        match self {
            Self::Added(i) | Self::Shortened(i) | Self::Duplicate(i) => i,
        }
    }
}

/// Moves in discovery order, unique per key. With rotation dedup the key
/// is the piece's canonical placement, so geometrically identical moves
/// collapse into one.
#[derive(Clone, Debug, Default)]
pub struct MoveSet {
    moves: Vec<Move>,
    index: FxHashMap<MoveKey, usize>,
    dedup_rotations: bool,
}

impl MoveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, dedup_rotations: bool) {
        self.moves.clear();
        self.index.clear();
        self.dedup_rotations = dedup_rotations;
    }

    /// Key a placement is stored under.
    pub fn key_for(&self, piece: &PieceType, key: MoveKey) -> MoveKey {
        if self.dedup_rotations {
            let (position, rotation) = piece.canonical(key.position(), key.rotation);
            MoveKey::new(position, rotation)
        } else {
            key
        }
    }

    /// Add `mv`, keeping the shorter path on a repeat.
    pub fn insert(&mut self, piece: &PieceType, mv: Move) -> Insert {
        let key = self.key_for(piece, mv.key());
        if let Some(&i) = self.index.get(&key) {
            let existing = &mut self.moves[i];
            if mv.steps < existing.steps {
                *existing = mv;
                return Insert::Shortened(i);
            }
            return Insert::Duplicate(i);
        }
        let i = self.moves.len();
        self.moves.push(mv);
        self.index.insert(key, i);
        Insert::Added(i)
    }

    pub fn get(&self, piece: &PieceType, key: MoveKey) -> Option<&Move> {
        let key = self.key_for(piece, key);
        self.index.get(&key).map(|&i| &self.moves[i])
    }

    pub fn contains(&self, piece: &PieceType, key: MoveKey) -> bool {
        self.get(piece, key).is_some()
    }

    /// Keep only the moves `keep` accepts, preserving order.
    pub fn retain(&mut self, piece: &PieceType, mut keep: impl FnMut(&Move) -> bool) {
        let kept: Vec<Move> = self.moves.drain(..).filter(|m| keep(m)).collect();
        self.index.clear();
        for mv in kept {
            self.insert(piece, mv);
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    /// Keys of every move, sorted.
    pub fn sorted_keys(&self) -> Vec<MoveKey> {
        let mut keys: Vec<MoveKey> = self.moves.iter().map(Move::key).collect();
        keys.sort();
        keys
    }
}

impl std::ops::Index<usize> for MoveSet {
    type Output = Move;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveSet {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
