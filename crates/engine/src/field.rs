//! The settled grid: directional scans, landing, row clearing and bonds.

use std::fmt;

use serde::{Deserialize, Serialize};
use wedge_core::token::{format_rows, parse_rows};
use wedge_core::{
    BlockGrid, BlockKind, Cell, Direction, Grid, PieceId, PieceType, Position, Rotation,
    SubCell, MAX_PIECE_SIZE,
};

use crate::bonds::manage_bonds;
use crate::collision::{check_collision, CollisionKind, CollisionResult};
use crate::level::LevelError;

/// A sub-cell that was added or removed, with what the presentation layer
/// needs to animate it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ChangedCell {
    pub x: usize,
    pub y: usize,
    pub slot: usize,
    pub sub: SubCell,
    /// Exact (possibly fractional) position of the cell.
    pub exact: (f32, f32),
}

impl ChangedCell {
    fn at(x: usize, y: usize, slot: usize, sub: SubCell) -> Self {
        Self {
            x,
            y,
            slot,
            sub,
            exact: (x as f32, y as f32),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr", into = "FieldRepr")]
pub struct Field {
    cells: BlockGrid,
    floor: usize,
    cleared: Vec<bool>,
}

/// Landing metadata the token format does not carry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct PieceMark {
    x: usize,
    y: usize,
    slot: usize,
    piece: Option<PieceId>,
    rotation: Rotation,
    indivisible: bool,
}

#[derive(Serialize, Deserialize)]
struct FieldRepr {
    floor: usize,
    rows: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pieces: Vec<PieceMark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cleared: Vec<usize>,
}

impl From<Field> for FieldRepr {
    fn from(field: Field) -> Self {
        let mut pieces = Vec::new();
        for (x, y, cell) in field.cells.iter() {
            for (slot, sub) in cell.occupied() {
                if sub.piece.is_some() || sub.indivisible || sub.rotation != Rotation::North {
                    pieces.push(PieceMark {
                        x,
                        y,
                        slot,
                        piece: sub.piece,
                        rotation: sub.rotation,
                        indivisible: sub.indivisible,
                    });
                }
            }
        }
        Self {
            floor: field.floor,
            rows: format_rows(&field.cells),
            pieces,
            cleared: field.cleared_rows().collect(),
        }
    }
}

impl TryFrom<FieldRepr> for Field {
    type Error = LevelError;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        let cells = parse_rows(&repr.rows)?;
        let mut field = Field::from_grid(cells, repr.floor)?;
        for mark in repr.pieces {
            let PieceMark { x, y, slot, .. } = mark;
            let bad = LevelError::PieceMark { x, y, slot };
            if x >= field.width() || y >= field.height() || slot > 1 {
                return Err(bad);
            }
            let sub = field.cells.get_mut(x, y).sub_mut(slot);
            if sub.is_empty() {
                return Err(bad);
            }
            sub.piece = mark.piece;
            sub.rotation = mark.rotation;
            sub.indivisible = mark.indivisible;
        }
        for y in repr.cleared {
            *field.cleared.get_mut(y).ok_or(LevelError::ClearedRow(y))? = true;
        }
        Ok(field)
    }
}

impl Field {
    /// # Panics
    /// Panics if `floor` is not a row of the field.
    pub fn new(width: usize, height: usize, floor: usize) -> Self {
        assert!(floor < height, "floor {floor} outside field of height {height}");
        Self {
            cells: BlockGrid::empty(width, height),
            floor,
            cleared: vec![false; height],
        }
    }

    /// Wrap an existing grid, re-deriving its bonds.
    pub fn from_grid(mut cells: BlockGrid, floor: usize) -> Result<Self, LevelError> {
        let height = cells.height();
        if floor >= height {
            return Err(LevelError::Floor { floor, height });
        }
        for (x, y, cell) in cells.iter() {
            if !cell.is_consistent() {
                return Err(LevelError::Inconsistent { x, y });
            }
        }
        manage_bonds(&mut cells);
        Ok(Self {
            cells,
            floor,
            cleared: vec![false; height],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Lowest visible row; anything below it collides.
    #[inline]
    pub fn floor(&self) -> usize {
        self.floor
    }

    #[inline]
    pub fn cells(&self) -> &BlockGrid {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut BlockGrid {
        &mut self.cells
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.cells.get(x, y)
    }

    /// Level blocks present anywhere on the field.
    pub fn has_obstacles(&self) -> bool {
        self.cells
            .iter()
            .any(|(_, _, c)| c.occupied().any(|(_, s)| s.kind == BlockKind::Obstacle))
    }

    pub fn check(
        &self,
        blocks: &BlockGrid,
        position: Position,
        direction: Option<Direction>,
        is_scan_start: bool,
    ) -> CollisionResult {
        check_collision(
            &self.cells,
            self.floor,
            blocks,
            position,
            direction,
            is_scan_start,
            None,
        )
    }

    /// Like [`Field::check`], marking `area` when the piece fits.
    pub fn check_marking(
        &self,
        blocks: &BlockGrid,
        position: Position,
        direction: Option<Direction>,
        area: &mut Grid<bool>,
    ) -> CollisionResult {
        check_collision(
            &self.cells,
            self.floor,
            blocks,
            position,
            direction,
            false,
            Some(area),
        )
    }

    #[inline]
    pub fn collides(&self, blocks: &BlockGrid, position: Position) -> bool {
        self.check(blocks, position, None, false).is_now()
    }

    /// Would one more step down collide?
    #[inline]
    pub fn is_resting(&self, blocks: &BlockGrid, position: Position) -> bool {
        self.check(blocks, position.step(Direction::Down), Some(Direction::Down), false)
            .is_now()
    }

    /// Step from `position` until the piece collides; return the last
    /// position it can occupy. `position` itself must be free.
    fn scan(&self, blocks: &BlockGrid, position: Position, dir: Direction) -> Position {
        let mut last = position;
        let mut current = position;
        let mut first = true;
        loop {
            match self.check(blocks, current, Some(dir), first).kind {
                CollisionKind::Now => return last,
                CollisionKind::NextStep => return current,
                CollisionKind::None => {
                    last = current;
                    current = current.step(dir);
                    first = false;
                }
            }
        }
    }

    pub fn detect_collision_down(&self, blocks: &BlockGrid, position: Position) -> Position {
        self.scan(blocks, position, Direction::Down)
    }

    pub fn detect_collision_left(&self, blocks: &BlockGrid, position: Position) -> Position {
        self.scan(blocks, position, Direction::Left)
    }

    pub fn detect_collision_right(&self, blocks: &BlockGrid, position: Position) -> Position {
        self.scan(blocks, position, Direction::Right)
    }

    /// Nearest position from `position` (inclusive) in `dir` where the
    /// piece fits, or `None` once it has left the grid.
    fn free_space(&self, blocks: &BlockGrid, position: Position, dir: Direction) -> Option<Position> {
        let limit = self.width().max(self.height()) + MAX_PIECE_SIZE;
        let mut current = position;
        for _ in 0..=limit {
            if !self.collides(blocks, current) {
                return Some(current);
            }
            current = current.step(dir);
        }
        None
    }

    pub fn detect_free_space_up(&self, blocks: &BlockGrid, position: Position) -> Option<Position> {
        self.free_space(blocks, position, Direction::Up)
    }

    pub fn detect_free_space_down(&self, blocks: &BlockGrid, position: Position) -> Option<Position> {
        self.free_space(blocks, position, Direction::Down)
    }

    pub fn detect_free_space_left(&self, blocks: &BlockGrid, position: Position) -> Option<Position> {
        self.free_space(blocks, position, Direction::Left)
    }

    pub fn detect_free_space_right(
        &self,
        blocks: &BlockGrid,
        position: Position,
    ) -> Option<Position> {
        self.free_space(blocks, position, Direction::Right)
    }

    /// Copy the piece into the field and re-derive bonds.
    ///
    /// `exact` is the presentation position of the piece origin; it
    /// defaults to `position`.
    ///
    /// # Panics
    /// Panics if the piece collides at `position`.
    pub fn land_piece(
        &mut self,
        piece: &PieceType,
        rotation: Rotation,
        position: Position,
        piece_id: PieceId,
        exact: Option<(f32, f32)>,
    ) -> Vec<ChangedCell> {
        let blocks = piece.blocks(rotation);
        let result = self.check(blocks, position, None, false);
        assert!(
            result.kind != CollisionKind::Now,
            "landing '{}' at {position:?} {rotation:?} collides at {:?}\n{self}",
            piece.name(),
            result.points
        );
        let (ex, ey) = exact.unwrap_or((position.x as f32, position.y as f32));
        let indivisible = piece.capabilities().indivisible;

        let mut landed = Vec::new();
        for (lx, ly, cell) in blocks.iter() {
            for (_, sub) in cell.occupied() {
                let x = (position.x + lx as i8) as usize;
                let y = (position.y + ly as i8) as usize;
                let mut placed = *sub;
                placed.piece = Some(piece_id);
                placed.rotation = rotation;
                placed.indivisible = indivisible;
                placed.bonds = Default::default();
                placed.clear_transient();
                let slot = self.cells.get_mut(x, y).insert(placed);
                landed.push((x, y, slot, (ex + lx as f32, ey + ly as f32)));
            }
        }

        manage_bonds(&mut self.cells);
        landed
            .into_iter()
            .map(|(x, y, slot, exact)| ChangedCell {
                x,
                y,
                slot,
                sub: *self.cells.get(x, y).sub(slot),
                exact,
            })
            .collect()
    }

    /// Every cell covered, and none of it by placeholders.
    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells.row(y).iter().all(|c| {
            c.is_full() && c.occupied().all(|(_, s)| s.kind != BlockKind::Placeholder)
        })
    }

    /// Rows currently marked for removal.
    pub fn cleared_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.cleared
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(y, _)| y)
    }

    /// Empty every full row at or above the floor and mark it for removal.
    /// Indivisible pieces touching a cleared row go with it.
    pub fn clear_filled_rows(&mut self) -> Vec<ChangedCell> {
        let mut removed = Vec::new();
        let mut doomed: Vec<PieceId> = Vec::new();

        for y in self.floor..self.height() {
            if !self.is_row_full(y) {
                continue;
            }
            self.cleared[y] = true;
            for x in 0..self.width() {
                let cell = self.cells.get_mut(x, y);
                for (slot, sub) in cell.occupied() {
                    if sub.indivisible {
                        if let Some(id) = sub.piece {
                            if !doomed.contains(&id) {
                                doomed.push(id);
                            }
                        }
                    }
                    removed.push(ChangedCell::at(x, y, slot, *sub));
                }
                *cell = Cell::EMPTY;
            }
        }

        if !doomed.is_empty() {
            for (x, y, cell) in self.cells.iter_mut() {
                for slot in (0..2).rev() {
                    let sub = cell.sub(slot);
                    if sub.indivisible && sub.piece.is_some_and(|id| doomed.contains(&id)) {
                        removed.push(ChangedCell::at(x, y, slot, cell.remove(slot)));
                    }
                }
            }
        }

        if !removed.is_empty() {
            manage_bonds(&mut self.cells);
        }
        removed
    }

    /// Drop the rows marked by [`Field::clear_filled_rows`], shifting the
    /// rows above down and refilling the top. Bonds are re-derived over the
    /// shifted grid. Returns the rows removed.
    pub fn remove_cleared_rows(&mut self) -> usize {
        let count = self.cleared.iter().filter(|c| **c).count();
        if count == 0 {
            return 0;
        }

        let height = self.height();
        let mut write = 0;
        for y in 0..height {
            if !self.cleared[y] {
                if write != y {
                    self.cells.copy_row(y, write);
                }
                write += 1;
            }
        }
        for y in write..height {
            self.cells.fill_row(y, Cell::EMPTY);
        }
        self.cleared.fill(false);

        manage_bonds(&mut self.cells);
        count
    }

    pub fn manage_bonds(&mut self) {
        manage_bonds(&mut self.cells);
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in format_rows(&self.cells).iter().enumerate() {
            let y = self.height() - 1 - i;
            let marker = if y == self.floor { '_' } else { ' ' };
            writeln!(f, "{y:2}{marker}{row}")?;
        }
        Ok(())
    }
}
