//! The set of piece types a level draws from.

use crate::{PieceError, PieceKind, PieceType};

#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    pieces: Vec<PieceType>,
}

const STANDARD: &[(&str, PieceKind, &[&str])] = &[
    ("bar2", PieceKind::Regular, &[". .", "#a #a"]),
    ("bar3", PieceKind::Regular, &[". . .", "#b #b #b", ". . ."]),
    ("square", PieceKind::Regular, &["#c #c", "#c #c"]),
    ("ramp", PieceKind::Regular, &[". .", "#d 1d"]),
    ("roof", PieceKind::Regular, &[". .", "3e 1e"]),
    ("hook", PieceKind::Regular, &[". . .", "#f . .", "#f #f 1f"]),
    ("diamond", PieceKind::Regular, &["3j 1j", "9j 7j"]),
    ("bomb", PieceKind::Bomb, &["#g"]),
    ("row-bomb", PieceKind::RowBomb, &["#h"]),
    ("monolith", PieceKind::Monolith, &[". #i .", ". #i .", ". #i ."]),
];

impl Catalogue {
    pub fn new(pieces: Vec<PieceType>) -> Self {
        Self { pieces }
    }

    /// The stock piece set.
    pub fn standard() -> Result<Self, PieceError> {
        let pieces = STANDARD
            .iter()
            .map(|&(name, kind, rows)| PieceType::new(name, kind, rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(pieces))
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PieceType> {
        self.pieces.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&PieceType> {
        self.pieces.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PieceType> {
        self.pieces.iter()
    }

    /// Largest grid side over all pieces.
    pub fn max_size(&self) -> usize {
        self.pieces.iter().map(PieceType::size).max().unwrap_or(0)
    }
}
