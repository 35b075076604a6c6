//! Bond derivation between same-color sub-cells.
//!
//! Pass one links sub-cells that share a full edge, touch along matching
//! diagonals, or form the two halves of one cell. Pass two drops corner
//! bonds that an orthogonal two-step path already covers; it reads the
//! finished pass-one result for the whole grid.

use wedge_core::{BlockGrid, BondDir, Direction, Fill, Position, SubCell};

fn can_join(a: &SubCell, b: &SubCell) -> bool {
    !a.is_empty()
        && !b.is_empty()
        && a.kind.can_bond()
        && a.kind == b.kind
        && a.color.is_some()
        && a.color == b.color
}

fn edge_bond(a: &SubCell, b: &SubCell, dir: Direction) -> bool {
    can_join(a, b) && a.fill.has_full_edge(dir) && b.fill.has_full_edge(dir.opposite())
}

fn corner_bond(a: &SubCell, b: &SubCell, dir: BondDir) -> bool {
    if !can_join(a, b) {
        return false;
    }
    match (a.fill, b.fill) {
        (Fill::Full, Fill::Full) => true,
        (fa, fb) => fa == fb && fa.is_half() && fa.is_rising() == dir.is_rising(),
    }
}

fn neighbour(grid: &BlockGrid, at: Position, dir: BondDir) -> Option<Position> {
    let (dx, dy) = dir.delta();
    let p = at.offset(dx, dy);
    grid.contains(p).then_some(p)
}

/// Re-derive every bond in `grid` from fill, color and kind.
pub fn manage_bonds(grid: &mut BlockGrid) {
    for (_, _, cell) in grid.iter_mut() {
        cell.first.bonds = Default::default();
        cell.second.bonds = Default::default();
    }

    // pass one
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let at = Position::new(x as i8, y as i8);
            for slot in 0..2 {
                let sub = *grid.get(x, y).sub(slot);
                if sub.is_empty() || !sub.kind.can_bond() {
                    continue;
                }
                let mut bonds = sub.bonds;

                let other = grid.get(x, y).sub(1 - slot);
                if can_join(&sub, other) {
                    bonds.set(BondDir::Diagonal);
                }

                for dir in Direction::ALL {
                    let Some(p) = neighbour(grid, at, dir.into()) else {
                        continue;
                    };
                    let cell = grid.get(p.x as usize, p.y as usize);
                    if cell.subs().iter().any(|t| edge_bond(&sub, t, dir)) {
                        bonds.set(dir.into());
                    }
                }

                for dir in BondDir::CORNERS {
                    let Some(p) = neighbour(grid, at, dir) else {
                        continue;
                    };
                    let cell = grid.get(p.x as usize, p.y as usize);
                    if cell.subs().iter().any(|t| corner_bond(&sub, t, dir)) {
                        bonds.set(dir);
                    }
                }

                grid.get_mut(x, y).sub_mut(slot).bonds = bonds;
            }
        }
    }

    // pass two
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let at = Position::new(x as i8, y as i8);
            for slot in 0..2 {
                let sub = *grid.get(x, y).sub(slot);
                if sub.is_empty() {
                    continue;
                }
                for dir in BondDir::CORNERS {
                    if sub.bonds.has(dir) && has_orthogonal_path(grid, at, &sub, dir) {
                        grid.get_mut(x, y).sub_mut(slot).bonds.clear(dir);
                    }
                }
            }
        }
    }
}

/// Is the corner in `dir` reachable through an edge bond followed by the
/// perpendicular edge bond?
fn has_orthogonal_path(grid: &BlockGrid, at: Position, sub: &SubCell, dir: BondDir) -> bool {
    let Some((h, v)) = dir.components() else {
        return false;
    };
    [(h, v), (v, h)].into_iter().any(|(first, second)| {
        if !sub.bonds.has(first) {
            return false;
        }
        let Some(p) = neighbour(grid, at, first) else {
            return false;
        };
        grid.get(p.x as usize, p.y as usize).subs().iter().any(|t| {
            can_join(sub, t) && t.bonds.has(first.opposite()) && t.bonds.has(second)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge_core::token::parse_grid;

    fn bonded(text: &str) -> BlockGrid {
        let mut grid = parse_grid(text).unwrap();
        manage_bonds(&mut grid);
        grid
    }

    #[test]
    fn test_edge_bonds_need_same_color() {
        let grid = bonded("#a #a #b");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::Right));
        assert!(grid.get(1, 0).first.bonds.has(BondDir::Left));
        assert!(!grid.get(1, 0).first.bonds.has(BondDir::Right));
        assert!(!grid.get(2, 0).first.bonds.has(BondDir::Left));
    }

    #[test]
    fn test_half_edges() {
        // lower-left half has no right edge
        let grid = bonded("1a #a");
        assert!(grid.get(0, 0).first.bonds.is_empty());
        let grid = bonded("#a 1a");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::Right));
        assert!(grid.get(1, 0).first.bonds.has(BondDir::Left));
    }

    #[test]
    fn test_same_cell_halves() {
        let grid = bonded("1a+9a 1b+9c");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::Diagonal));
        assert!(grid.get(0, 0).second.bonds.has(BondDir::Diagonal));
        assert!(!grid.get(1, 0).first.bonds.has(BondDir::Diagonal));
        // upper-right half of the first cell meets nothing on the right
        assert!(!grid.get(0, 0).second.bonds.has(BondDir::Right));
    }

    #[test]
    fn test_corner_bonds() {
        let grid = bonded(". #a\n#a .");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::UpRight));
        assert!(grid.get(1, 1).first.bonds.has(BondDir::DownLeft));
        // rising halves continue along the "/" diagonal
        let grid = bonded(". 3a\n3a .");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::UpRight));
        let grid = bonded(". 1a\n1a .");
        assert!(grid.get(0, 0).first.bonds.is_empty());
    }

    #[test]
    fn test_redundant_corner_removed() {
        let grid = bonded("#a #a\n#a #a");
        let sub = grid.get(0, 0).first;
        assert!(sub.bonds.has(BondDir::Up));
        assert!(sub.bonds.has(BondDir::Right));
        assert!(!sub.bonds.has(BondDir::UpRight));
        assert!(!grid.get(1, 1).first.bonds.has(BondDir::DownLeft));
    }

    #[test]
    fn test_corner_kept_without_path() {
        // the L path through (1, 0) is broken by a different color
        let grid = bonded("#a #a\n#a #b");
        let sub = grid.get(0, 0).first;
        // path through (0, 1) still exists
        assert!(!sub.bonds.has(BondDir::UpRight));
        let grid = bonded(". #a\n#a #b");
        assert!(grid.get(0, 0).first.bonds.has(BondDir::UpRight));
    }

    #[test]
    fn test_obstacles_never_bond() {
        let grid = bonded("!#a !#a");
        assert!(grid.get(0, 0).first.bonds.is_empty());
        let grid = bonded("#a !#a");
        assert!(grid.get(0, 0).first.bonds.is_empty());
    }

    #[test]
    fn test_rebuild_is_stable() {
        let mut grid = bonded(". 7a #a\n3a #a 1b");
        let before = grid.clone();
        manage_bonds(&mut grid);
        assert_eq!(grid, before);
    }
}
