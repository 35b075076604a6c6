//! Per-rotation memo grid for the move search.
//!
//! Piece positions can sit partly outside the field, so the grid is padded
//! by the largest piece size on every side. Contents do not survive past
//! the next [`SearchGrid::prepare`].

use wedge_core::{Grid, Position, Rotation};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchCell {
    /// Expanded by the sweep/drop/tuck phase.
    pub visited_sweep: bool,
    /// Expanded by the flood phase.
    pub visited_flood: bool,
    /// Cached result of dropping from this state.
    pub landing_row: Option<i8>,
    /// Generation of the last closure route that reached this state.
    pub walk: u32,
}

#[derive(Clone, Debug)]
pub struct SearchGrid {
    pad: usize,
    grids: [Grid<SearchCell>; 4],
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl SearchGrid {
    pub fn new(width: usize, height: usize, pad: usize) -> Self {
        let (w, h) = (width + 2 * pad, height + 2 * pad);
        Self {
            pad,
            grids: std::array::from_fn(|_| Grid::new(w, h, SearchCell::default())),
        }
    }

    /// Size for a field, reallocating only when dimensions change, and
    /// clear every cell.
    pub fn prepare(&mut self, width: usize, height: usize, pad: usize) {
        let (w, h) = (width + 2 * pad, height + 2 * pad);
        if self.pad != pad || self.grids[0].width() != w || self.grids[0].height() != h {
            *self = Self::new(width, height, pad);
            return;
        }
        for grid in &mut self.grids {
            grid.reset(SearchCell::default());
        }
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let x = position.x as isize + self.pad as isize;
        let y = position.y as isize + self.pad as isize;
        let grid = &self.grids[0];
        (x >= 0 && y >= 0 && (x as usize) < grid.width() && (y as usize) < grid.height())
            .then_some((x as usize, y as usize))
    }

    pub fn get(&self, position: Position, rotation: Rotation) -> Option<&SearchCell> {
        let (x, y) = self.index(position)?;
        Some(self.grids[rotation.index()].get(x, y))
    }

    pub fn get_mut(&mut self, position: Position, rotation: Rotation) -> Option<&mut SearchCell> {
        let (x, y) = self.index(position)?;
        Some(self.grids[rotation.index()].get_mut(x, y))
    }
}
