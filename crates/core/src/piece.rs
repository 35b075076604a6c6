//! Piece templates: per-rotation block grids and the geometry the search
//! needs, computed once when the piece is built.

use serde::{Deserialize, Serialize};

use crate::token::parse_rows;
use crate::{BlockGrid, BlockKind, Cell, Direction, Grid, PieceError, Position};

/// Largest supported piece grid (side length).
pub const MAX_PIECE_SIZE: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    pub fn cw(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    pub fn ccw(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Regular,
    Bomb,
    RowBomb,
    Monolith,
}

/// What a piece kind is allowed to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Capabilities {
    pub rotates: bool,
    pub indivisible: bool,
    pub spawn_rotation: Rotation,
    pub single_cell: bool,
}

impl PieceKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Regular => Capabilities {
                rotates: true,
                indivisible: false,
                spawn_rotation: Rotation::North,
                single_cell: false,
            },
            Self::Bomb | Self::RowBomb => Capabilities {
                rotates: false,
                indivisible: true,
                spawn_rotation: Rotation::North,
                single_cell: true,
            },
            Self::Monolith => Capabilities {
                rotates: false,
                indivisible: true,
                spawn_rotation: Rotation::East,
                single_cell: false,
            },
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Regular => "regular",
            Self::Bomb => "bomb",
            Self::RowBomb => "row-bomb",
            Self::Monolith => "monolith",
        };
        f.write_str(name)
    }
}

/// Occupied extent of a rotation grid, in local cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Bounds {
    pub x: i8,
    pub y: i8,
    pub width: i8,
    pub height: i8,
}

/// Where a placement in this rotation lands when expressed in the
/// canonical rotation that has the same shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fingerprint {
    pub rotation: Rotation,
    pub offset: (i8, i8),
}

#[derive(Clone, Debug)]
pub struct PieceRotation {
    pub blocks: BlockGrid,
    /// Twice the resolution of `blocks`; true where a quadrant is covered.
    pub click: Grid<bool>,
    /// Lowest cell of the leftmost and of the rightmost occupied column.
    pub overhang: [Position; 2],
    /// Cell just outside each overhang cell, when that side is a full edge.
    pub extremity: [Option<Position>; 2],
    pub fingerprint: Fingerprint,
    pub bounds: Bounds,
}

impl PieceRotation {
    fn build(blocks: BlockGrid) -> Self {
        let n = blocks.width();
        let mut click = Grid::new(n * 2, n * 2, false);
        for (x, y, cell) in blocks.iter() {
            for (_, sub) in cell.occupied() {
                for qy in 0..2 {
                    for qx in 0..2 {
                        if sub.fill.covers_quadrant(qx, qy) {
                            click.set(x * 2 + qx, y * 2 + qy, true);
                        }
                    }
                }
            }
        }

        let bounds = bounds_of(&blocks);
        let left = lowest_in_column(&blocks, bounds.x);
        let right = lowest_in_column(&blocks, bounds.x + bounds.width - 1);
        let extremity = [
            outward(&blocks, left, Direction::Left),
            outward(&blocks, right, Direction::Right),
        ];

        Self {
            blocks,
            click,
            overhang: [left, right],
            extremity,
            fingerprint: Fingerprint {
                rotation: Rotation::North,
                offset: (0, 0),
            },
            bounds,
        }
    }
}

fn bounds_of(blocks: &BlockGrid) -> Bounds {
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (i8::MAX, i8::MAX, i8::MIN, i8::MIN);
    for p in blocks.occupied_positions() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    }
}

fn lowest_in_column(blocks: &BlockGrid, x: i8) -> Position {
    let y = (0..blocks.height())
        .find(|&y| !blocks.get(x as usize, y).is_empty())
        .unwrap_or(0);
    Position::new(x, y as i8)
}

fn outward(blocks: &BlockGrid, cell: Position, side: Direction) -> Option<Position> {
    let fill = blocks.get(cell.x as usize, cell.y as usize).effective_fill();
    fill.has_full_edge(side).then(|| cell.step(side))
}

/// Rotate a square grid 90° clockwise, rotating every half fill with it.
fn rotate_cw(blocks: &BlockGrid) -> BlockGrid {
    let n = blocks.width();
    let mut out = BlockGrid::empty(n, n);
    for (x, y, cell) in blocks.iter() {
        let rotated = Cell {
            first: cell.first.rotated_cw(),
            second: cell.second.rotated_cw(),
        };
        out.set(y, n - 1 - x, rotated);
    }
    out
}

fn same_cell(a: &Cell, b: &Cell) -> bool {
    (a.first.same_content(&b.first) && a.second.same_content(&b.second))
        || (a.first.same_content(&b.second) && a.second.same_content(&b.first))
}

/// Same occupied shape and colors once both are aligned on their bounds.
fn same_shape(a: &PieceRotation, b: &PieceRotation) -> bool {
    if a.bounds.width != b.bounds.width || a.bounds.height != b.bounds.height {
        return false;
    }
    for dy in 0..a.bounds.height {
        for dx in 0..a.bounds.width {
            let ca = a
                .blocks
                .get((a.bounds.x + dx) as usize, (a.bounds.y + dy) as usize);
            let cb = b
                .blocks
                .get((b.bounds.x + dx) as usize, (b.bounds.y + dy) as usize);
            if !same_cell(ca, cb) {
                return false;
            }
        }
    }
    true
}

/// Immutable piece template.
#[derive(Clone, Debug)]
pub struct PieceType {
    name: String,
    kind: PieceKind,
    size: usize,
    rotations: [PieceRotation; 4],
}

impl PieceType {
    /// Build a piece from its North grid, top row first.
    pub fn new<S: AsRef<str>>(name: &str, kind: PieceKind, rows: &[S]) -> Result<Self, PieceError> {
        let blocks = parse_rows(rows).map_err(|source| PieceError::Grid {
            name: name.to_string(),
            source,
        })?;
        Self::from_grid(name, kind, blocks)
    }

    pub fn from_grid(name: &str, kind: PieceKind, blocks: BlockGrid) -> Result<Self, PieceError> {
        let (width, height) = (blocks.width(), blocks.height());
        if width != height {
            return Err(PieceError::NotSquare {
                name: name.to_string(),
                width,
                height,
            });
        }
        if width > MAX_PIECE_SIZE {
            return Err(PieceError::TooLarge {
                name: name.to_string(),
                size: width,
                max: MAX_PIECE_SIZE,
            });
        }
        let occupied = blocks.occupied_positions().count();
        if occupied == 0 {
            return Err(PieceError::NoBlocks(name.to_string()));
        }
        let level_blocks = blocks
            .iter()
            .flat_map(|(_, _, c)| c.occupied().map(|(_, s)| s.kind))
            .any(|k| k != BlockKind::Piece);
        if level_blocks {
            return Err(PieceError::LevelBlocks(name.to_string()));
        }
        let caps = kind.capabilities();
        if caps.single_cell && occupied != 1 {
            return Err(PieceError::NotSingleCell {
                name: name.to_string(),
                kind: kind.to_string(),
            });
        }

        let east = rotate_cw(&blocks);
        let south = rotate_cw(&east);
        let west = rotate_cw(&south);
        let mut rotations = [blocks, east, south, west].map(PieceRotation::build);

        for r in 0..4 {
            let canonical = (0..=r)
                .find(|&c| same_shape(&rotations[c], &rotations[r]))
                .unwrap_or(r);
            let (from, to) = (rotations[r].bounds, rotations[canonical].bounds);
            rotations[r].fingerprint = Fingerprint {
                rotation: Rotation::ALL[canonical],
                offset: (from.x - to.x, from.y - to.y),
            };
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            size: width,
            rotations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Side length of every rotation grid.
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn rotation(&self, rotation: Rotation) -> &PieceRotation {
        &self.rotations[rotation.index()]
    }

    #[inline(always)]
    pub fn blocks(&self, rotation: Rotation) -> &BlockGrid {
        &self.rotations[rotation.index()].blocks
    }

    /// Rotations reachable in play, spawn rotation first.
    pub fn allowed_rotations(&self) -> Vec<Rotation> {
        let caps = self.capabilities();
        if !caps.rotates {
            return vec![caps.spawn_rotation];
        }
        let mut out = Vec::with_capacity(4);
        let mut r = caps.spawn_rotation;
        for _ in 0..4 {
            out.push(r);
            r = r.cw();
        }
        out
    }

    /// Canonical placement with the same geometry as `(position, rotation)`.
    pub fn canonical(&self, position: Position, rotation: Rotation) -> (Position, Rotation) {
        let fp = self.rotation(rotation).fingerprint;
        (position.offset(fp.offset.0, fp.offset.1), fp.rotation)
    }

    /// Spawn position: centred horizontally with the top occupied row on
    /// the top field row.
    pub fn spawn_position(&self, field_width: usize, field_height: usize) -> Position {
        let b = self.rotation(self.capabilities().spawn_rotation).bounds;
        let x = (field_width as i8 - b.width) / 2 - b.x;
        let y = field_height as i8 - (b.y + b.height);
        Position::new(x, y)
    }

    /// Is the local point (in cell units, y up) inside the piece?
    pub fn hit_test(&self, rotation: Rotation, x: f32, y: f32) -> bool {
        if x < 0.0 || y < 0.0 {
            return false;
        }
        let click = &self.rotation(rotation).click;
        let (qx, qy) = ((x * 2.0) as usize, (y * 2.0) as usize);
        qx < click.width() && qy < click.height() && *click.get(qx, qy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Fill};

    fn ramp() -> PieceType {
        PieceType::new("ramp", PieceKind::Regular, &[". .", "#d 1d"]).unwrap()
    }

    #[test]
    fn test_rotation_cw() {
        assert_eq!(Rotation::North.cw(), Rotation::East);
        assert_eq!(Rotation::East.cw(), Rotation::South);
        assert_eq!(Rotation::South.cw(), Rotation::West);
        assert_eq!(Rotation::West.cw(), Rotation::North);
        for r in Rotation::ALL {
            assert_eq!(r.cw().ccw(), r);
            assert_eq!(r.cw().cw(), r.flip());
        }
    }

    #[test]
    fn test_rotated_grid_moves_halves() {
        let piece = ramp();
        let east = piece.blocks(Rotation::East);
        // bottom row turns into the left column, top to bottom
        assert_eq!(east.get(0, 1).first.fill, Fill::Full);
        assert_eq!(east.get(0, 0).first.fill, Fill::UpperLeft);
        assert_eq!(east.get(0, 0).first.color, Some(Color(3)));
    }

    #[test]
    fn test_bounds_and_overhang() {
        let piece = ramp();
        let north = piece.rotation(Rotation::North);
        assert_eq!(
            north.bounds,
            Bounds {
                x: 0,
                y: 0,
                width: 2,
                height: 1
            }
        );
        assert_eq!(north.overhang, [Position::new(0, 0), Position::new(1, 0)]);
        // full cell on the left, lower-left half on the right has no right edge
        assert_eq!(north.extremity, [Some(Position::new(-1, 0)), None]);
    }

    #[test]
    fn test_symmetric_piece_fingerprint() {
        let bar = PieceType::new("bar", PieceKind::Regular, &[". .", "#a #a"]).unwrap();
        let south = bar.rotation(Rotation::South).fingerprint;
        assert_eq!(south.rotation, Rotation::North);
        // south occupies the top row, north the bottom one
        assert_eq!(south.offset, (0, 1));
        assert_eq!(
            bar.canonical(Position::new(2, 0), Rotation::South),
            (Position::new(2, 1), Rotation::North)
        );
        assert_eq!(bar.rotation(Rotation::West).fingerprint.rotation, Rotation::East);
    }

    #[test]
    fn test_asymmetric_piece_keeps_rotations() {
        let piece = ramp();
        for r in Rotation::ALL {
            assert_eq!(piece.rotation(r).fingerprint.rotation, r);
        }
    }

    #[test]
    fn test_click_grid() {
        let piece = ramp();
        assert!(piece.hit_test(Rotation::North, 0.5, 0.5));
        assert!(piece.hit_test(Rotation::North, 1.2, 0.2));
        // upper-right quadrant of the lower-left half is empty
        assert!(!piece.hit_test(Rotation::North, 1.8, 0.8));
        assert!(!piece.hit_test(Rotation::North, 0.5, 1.5));
        assert!(!piece.hit_test(Rotation::North, -0.1, 0.5));
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert!(matches!(
            PieceType::new("x", PieceKind::Regular, &[". ."]),
            Err(PieceError::NotSquare { .. })
        ));
        assert!(matches!(
            PieceType::new("x", PieceKind::Regular, &[". .", ". ."]),
            Err(PieceError::NoBlocks(_))
        ));
        assert!(matches!(
            PieceType::new("x", PieceKind::Regular, &[". .", "!#a ."]),
            Err(PieceError::LevelBlocks(_))
        ));
        assert!(matches!(
            PieceType::new("x", PieceKind::Bomb, &[". .", "#a #a"]),
            Err(PieceError::NotSingleCell { .. })
        ));
        assert!(matches!(
            PieceType::new("x", PieceKind::Regular, &["#q +"]),
            Err(PieceError::Grid { .. })
        ));
    }

    #[test]
    fn test_capabilities() {
        let bomb = PieceType::new("bomb", PieceKind::Bomb, &["#g"]).unwrap();
        assert_eq!(bomb.allowed_rotations(), vec![Rotation::North]);
        assert!(bomb.capabilities().indivisible);
        assert_eq!(ramp().allowed_rotations().len(), 4);
    }

    #[test]
    fn test_spawn_position() {
        let bar = PieceType::new("bar", PieceKind::Regular, &[". .", "#a #a"]).unwrap();
        assert_eq!(bar.spawn_position(4, 6), Position::new(1, 5));
    }
}
