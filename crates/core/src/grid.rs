//! Dense 2-D storage shared by the field, the piece templates and every
//! scratch buffer. Row 0 is the bottom row.

use serde::{Deserialize, Serialize};

use crate::{Cell, Direction};

/// Signed grid coordinate. Piece positions may sit partly outside the field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// Reset every slot without reallocating.
    pub fn reset(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Set every slot of row `y` to `value`.
    pub fn fill_row(&mut self, y: usize, value: T) {
        let w = self.width;
        self.cells[y * w..(y + 1) * w].fill(value);
    }
}

impl<T> Grid<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "grid access ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// # Panics
    /// Panics on out-of-bounds access.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.cells[self.index(x, y)]
    }

    /// # Panics
    /// Panics on out-of-bounds access.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = self.index(x, y);
        &mut self.cells[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    pub fn at(&self, pos: Position) -> Option<&T> {
        self.contains(pos)
            .then(|| self.get(pos.x as usize, pos.y as usize))
    }

    #[inline]
    pub fn at_mut(&mut self, pos: Position) -> Option<&mut T> {
        if self.contains(pos) {
            Some(self.get_mut(pos.x as usize, pos.y as usize))
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> &[T] {
        let start = self.index(0, y);
        &self.cells[start..start + self.width]
    }

    /// Copy row `from` over row `to`.
    pub fn copy_row(&mut self, from: usize, to: usize)
    where
        T: Copy,
    {
        let w = self.width;
        self.cells.copy_within(from * w..(from + 1) * w, to * w);
    }

    /// Iterate `(x, y, &T)` bottom row first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (i % w, i / w, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let w = self.width;
        self.cells
            .iter_mut()
            .enumerate()
            .map(move |(i, c)| (i % w, i / w, c))
    }
}

/// Grid of cells: the field, piece rotations and gravity extractions.
pub type BlockGrid = Grid<Cell>;

impl Grid<Cell> {
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(width, height, Cell::EMPTY)
    }

    /// Positions of non-empty cells, bottom row first.
    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.iter()
            .filter(|(_, _, c)| !c.is_empty())
            .map(|(x, y, _)| Position::new(x as i8, y as i8))
    }

    pub fn is_all_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut g = Grid::new(3, 2, 0u8);
        g.set(2, 1, 7);
        assert_eq!(*g.get(2, 1), 7);
        assert_eq!(g.at(Position::new(2, 1)), Some(&7));
        assert_eq!(g.at(Position::new(3, 1)), None);
        assert_eq!(g.at(Position::new(-1, 0)), None);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        let g = Grid::new(3, 2, 0u8);
        g.get(0, 2);
    }

    #[test]
    fn test_copy_row_and_fill() {
        let mut g = Grid::new(2, 3, 0u8);
        g.set(0, 1, 1);
        g.set(1, 1, 2);
        g.copy_row(1, 0);
        assert_eq!(g.row(0), &[1, 2]);
        g.fill_row(1, 9);
        assert_eq!(g.row(1), &[9, 9]);
    }

    #[test]
    fn test_iter_coordinates() {
        let g = Grid::new(2, 2, ());
        let coords: Vec<_> = g.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_position_step() {
        let p = Position::new(1, 1);
        assert_eq!(p.step(Direction::Left), Position::new(0, 1));
        assert_eq!(p.step(Direction::Down), Position::new(1, 0));
    }
}
