//! Level descriptors: starting layout, objective and tutorial constraints.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wedge_core::token::parse_rows;
use wedge_core::GridError;

use crate::config::TutorialRestriction;
use crate::field::Field;

pub const MAX_WIDTH: usize = 16;
pub const MAX_HEIGHT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("field {width}x{height} outside 1..=16 x 1..=32")]
    Dimensions { width: usize, height: usize },
    #[error("layout has {rows} rows but the field is {height} high")]
    RowCount { rows: usize, height: usize },
    #[error("layout is {found} cells wide, expected {expected}")]
    Width { expected: usize, found: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("floor {floor} outside field of height {height}")]
    Floor { floor: usize, height: usize },
    #[error("row {0} of the starting layout is already full")]
    FullRow(usize),
    #[error("cell ({x}, {y}) holds overlapping sub-cells")]
    Inconsistent { x: usize, y: usize },
    #[error("piece mark on empty sub-cell {slot} of ({x}, {y})")]
    PieceMark { x: usize, y: usize, slot: usize },
    #[error("cleared row {0} outside the field")]
    ClearedRow(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    ClearRows(u32),
    ReachScore(u32),
    /// Place this many pieces.
    Survive(u32),
}

impl Objective {
    pub fn is_met(&self, rows_cleared: u32, score: u32, pieces_placed: u32) -> bool {
        match *self {
            Self::ClearRows(n) => rows_cleared >= n,
            Self::ReachScore(n) => score >= n,
            Self::Survive(n) => pieces_placed >= n,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub name: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub floor: usize,
    /// Bottom-aligned starting rows, top row first. Missing rows above are
    /// empty.
    #[serde(default)]
    pub layout: Vec<String>,
    pub objective: Objective,
    #[serde(default)]
    pub tutorial: Option<TutorialRestriction>,
}

impl LevelDescriptor {
    pub fn validate(&self) -> Result<(), LevelError> {
        self.build_field().map(|_| ())
    }

    /// Build the starting field.
    pub fn build_field(&self) -> Result<Field, LevelError> {
        let (width, height) = (self.width, self.height);
        if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
            return Err(LevelError::Dimensions { width, height });
        }
        if self.floor >= height {
            return Err(LevelError::Floor {
                floor: self.floor,
                height,
            });
        }
        let rows: Vec<&str> = self
            .layout
            .iter()
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
            .collect();
        if rows.len() > height {
            return Err(LevelError::RowCount {
                rows: rows.len(),
                height,
            });
        }

        let mut field = Field::new(width, height, self.floor);
        if !rows.is_empty() {
            let layout = parse_rows(&rows)?;
            if layout.width() != width {
                return Err(LevelError::Width {
                    expected: width,
                    found: layout.width(),
                });
            }
            for (x, y, cell) in layout.iter() {
                if !cell.is_consistent() {
                    return Err(LevelError::Inconsistent { x, y });
                }
                *field.cells_mut().get_mut(x, y) = *cell;
            }
        }
        if let Some(y) = (self.floor..height).find(|&y| field.is_row_full(y)) {
            return Err(LevelError::FullRow(y));
        }
        field.manage_bonds();
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge_core::{Color, Position, Rotation};

    fn descriptor(layout: &[&str]) -> LevelDescriptor {
        LevelDescriptor {
            name: "test".into(),
            width: 4,
            height: 6,
            floor: 0,
            layout: layout.iter().map(|s| s.to_string()).collect(),
            objective: Objective::ClearRows(2),
            tutorial: None,
        }
    }

    #[test]
    fn test_layout_is_bottom_aligned() {
        let field = descriptor(&["#a . . .", "#b #b . ."]).build_field().unwrap();
        assert_eq!(field.cell(0, 1).first.color, Some(Color(0)));
        assert_eq!(field.cell(1, 0).first.color, Some(Color(1)));
        assert!(field.cell(0, 2).is_empty());
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut d = descriptor(&[]);
        d.width = 0;
        assert_eq!(
            d.validate(),
            Err(LevelError::Dimensions { width: 0, height: 6 })
        );
        d.width = 17;
        assert!(matches!(d.validate(), Err(LevelError::Dimensions { .. })));
    }

    #[test]
    fn test_rejects_wrong_width() {
        let d = descriptor(&["#a . ."]);
        assert_eq!(
            d.validate(),
            Err(LevelError::Width {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_rejects_full_row() {
        let d = descriptor(&[". . . .", "#a 1b+9c #a #a"]);
        assert_eq!(d.validate(), Err(LevelError::FullRow(0)));
    }

    #[test]
    fn test_placeholder_row_is_not_full() {
        let d = descriptor(&["#a ?#b #a #a"]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_token() {
        let d = descriptor(&["#a x . ."]);
        assert!(matches!(d.validate(), Err(LevelError::Grid(_))));
    }

    #[test]
    fn test_rejects_floor() {
        let mut d = descriptor(&[]);
        d.floor = 6;
        assert_eq!(d.validate(), Err(LevelError::Floor { floor: 6, height: 6 }));
    }

    #[test]
    fn test_objective() {
        assert!(Objective::ClearRows(2).is_met(2, 0, 0));
        assert!(!Objective::ReachScore(100).is_met(5, 99, 10));
        assert!(Objective::Survive(3).is_met(0, 0, 3));
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r##"{
            "name": "tuck",
            "width": 4,
            "height": 6,
            "layout": ["#a #a . .", ". . . ."],
            "objective": {"ClearRows": 1},
            "tutorial": {"required": {"x": 0, "y": 0, "rotation": "North"}}
        }"##;
        let d: LevelDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.floor, 0);
        let tutorial = d.tutorial.as_ref().unwrap();
        assert_eq!(tutorial.required.position(), Position::new(0, 0));
        assert_eq!(tutorial.required.rotation, Rotation::North);
        let field = d.build_field().unwrap();
        assert!(!field.cell(0, 1).is_empty());
    }
}
