//! collision detection - bounds, floor, settled sub-cells

use smallvec::SmallVec;
use wedge_core::{BlockGrid, Direction, Fill, Grid, Position};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionKind {
    None,
    /// The piece intersects the field at this position.
    Now,
    /// Free here, but continuing in the scan direction would pass through
    /// an interlocked half.
    NextStep,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CollisionResult {
    pub kind: CollisionKind,
    /// Field cells where the piece collides, in field coordinates.
    pub points: SmallVec<[Position; 8]>,
}

impl CollisionResult {
    #[inline]
    pub fn is_none(&self) -> bool {
        self.kind == CollisionKind::None
    }

    #[inline]
    pub fn is_now(&self) -> bool {
        self.kind == CollisionKind::Now
    }
}

/// Check `blocks` placed with its bottom-left at `position`.
///
/// `direction` is the step that brought the piece here (`None` for spawn
/// and rotation probes). `is_scan_start` marks the first sample of a scan,
/// where nothing has arrived yet. When the result is `None` and `area` is
/// given, every field cell the piece occupies is marked in it.
pub fn check_collision(
    field: &BlockGrid,
    floor: usize,
    blocks: &BlockGrid,
    position: Position,
    direction: Option<Direction>,
    is_scan_start: bool,
    area: Option<&mut Grid<bool>>,
) -> CollisionResult {
    let mut points = SmallVec::new();
    let mut next_step = false;
    let arriving = direction.filter(|_| !is_scan_start);

    for (lx, ly, piece_cell) in blocks.iter() {
        if piece_cell.is_empty() {
            continue;
        }
        let at = position.offset(lx as i8, ly as i8);
        if !field.contains(at) || (at.y as usize) < floor {
            points.push(at);
            continue;
        }
        let fill = piece_cell.effective_fill();
        let target = field.get(at.x as usize, at.y as usize);

        if !target.is_empty() {
            let target_fill = target.effective_fill();
            if fill == Fill::Full || target_fill == Fill::Full || !fill.is_complement_of(target_fill)
            {
                points.push(at);
                continue;
            }
            if let Some(dir) = arriving {
                if fill.approaches_from(dir) {
                    next_step = true;
                } else {
                    points.push(at);
                    continue;
                }
            }
        }

        // leaving a cell we interlocked with pushes through its half
        if let Some(dir) = arriving {
            if fill.is_half() && fill.approaches_from(dir) {
                let from = at.step(dir.opposite());
                let left_behind = field
                    .at(from)
                    .map(|c| c.filled_half() == Some(fill.complement()))
                    .unwrap_or(false);
                if left_behind {
                    points.push(at);
                }
            }
        }
    }

    let kind = if !points.is_empty() {
        CollisionKind::Now
    } else if next_step {
        CollisionKind::NextStep
    } else {
        CollisionKind::None
    };

    if kind == CollisionKind::None {
        if let Some(area) = area {
            for p in blocks.occupied_positions() {
                if let Some(slot) = area.at_mut(p.offset(position.x, position.y)) {
                    *slot = true;
                }
            }
        }
    }

    CollisionResult { kind, points }
}

/// Static probe: does the piece overlap anything at `position`?
#[inline]
pub fn collides(field: &BlockGrid, floor: usize, blocks: &BlockGrid, position: Position) -> bool {
    check_collision(field, floor, blocks, position, None, false, None).is_now()
}
