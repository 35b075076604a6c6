//! Cluster pulldown after rows are removed.
//!
//! Sub-cells are grouped into clusters (bonded same-color cells, whole
//! indivisible pieces, touching asteroids) and each cluster falls as one
//! rigid shape until it lands. Obstacles and placeholders never move.

use wedge_core::{BlockGrid, BlockKind, BondDir, Cell, Direction, Grid, Position, SubCell};

use crate::collision::CollisionKind;
use crate::config::PulldownConfig;
use crate::field::{ChangedCell, Field};

type Slot = (usize, usize, usize);

/// One cluster that moved.
#[derive(Clone, Debug, PartialEq)]
pub struct PulledCluster {
    /// Sub-cells at their new positions.
    pub cells: Vec<ChangedCell>,
    pub fell: usize,
    /// The presentation layer should play a landing bounce.
    pub bounce: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PulldownReport {
    pub clusters: Vec<PulledCluster>,
    /// Pass rounds run, the final one that moved nothing included.
    pub passes: usize,
}

impl PulldownReport {
    pub fn moved(&self) -> bool {
        !self.clusters.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    LeftToRight,
    RightToLeft,
}

/// Scratch buffers for [`Gravity::pull_down`], sized to the field on first
/// use and reused afterwards.
#[derive(Clone, Debug)]
pub struct Gravity {
    scratch: BlockGrid,
    grounded: Grid<bool>,
    stack: Vec<Slot>,
    cluster: Vec<Slot>,
    neighbours: Vec<Slot>,
    saved: Vec<(usize, usize, Cell)>,
    lifted: Vec<(usize, usize, SubCell)>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

fn is_marked(sub: &SubCell, pass: Pass) -> bool {
    match pass {
        Pass::LeftToRight => sub.scan_mark.left_to_right,
        Pass::RightToLeft => sub.scan_mark.right_to_left,
    }
}

fn set_mark(sub: &mut SubCell, pass: Pass) {
    match pass {
        Pass::LeftToRight => sub.scan_mark.left_to_right = true,
        Pass::RightToLeft => sub.scan_mark.right_to_left = true,
    }
}

impl Gravity {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            scratch: BlockGrid::empty(width, height),
            grounded: Grid::new(width, height, false),
            stack: Vec::new(),
            cluster: Vec::new(),
            neighbours: Vec::new(),
            saved: Vec::new(),
            lifted: Vec::new(),
        }
    }

    fn prepare(&mut self, width: usize, height: usize) {
        if self.scratch.width() != width || self.scratch.height() != height {
            self.scratch = BlockGrid::empty(width, height);
            self.grounded = Grid::new(width, height, false);
        } else {
            self.scratch.reset(Cell::EMPTY);
            self.grounded.reset(false);
        }
    }

    /// Let every unsupported cluster fall until it lands, repeating until
    /// nothing moves or `config.max_passes` rounds have run.
    pub fn pull_down(&mut self, field: &mut Field, config: &PulldownConfig) -> PulldownReport {
        let (width, height) = (field.width(), field.height());
        self.prepare(width, height);
        self.snapshot_grounded(field);

        let mut report = PulldownReport::default();
        let passes: &[Pass] = if config.bidirectional {
            &[Pass::LeftToRight, Pass::RightToLeft]
        } else {
            &[Pass::LeftToRight]
        };

        while report.passes < config.max_passes {
            report.passes += 1;
            for (_, _, cell) in field.cells_mut().iter_mut() {
                for sub in cell.subs_mut() {
                    sub.clear_transient();
                }
            }
            let before = report.clusters.len();
            for &pass in passes {
                self.run_pass(field, pass, config, &mut report);
            }
            field.manage_bonds();
            if report.clusters.len() == before {
                break;
            }
        }

        for (_, _, cell) in field.cells_mut().iter_mut() {
            for sub in cell.subs_mut() {
                sub.clear_transient();
            }
        }
        report
    }

    /// Cells connected to the floor row through occupied neighbours.
    fn snapshot_grounded(&mut self, field: &Field) {
        self.stack.clear();
        let cells = field.cells();
        for x in 0..field.width() {
            if !cells.get(x, field.floor()).is_empty() {
                self.grounded.set(x, field.floor(), true);
                self.stack.push((x, field.floor(), 0));
            }
        }
        while let Some((x, y, _)) = self.stack.pop() {
            let at = Position::new(x as i8, y as i8);
            for dir in Direction::ALL {
                let p = at.step(dir);
                let Some(cell) = cells.at(p) else {
                    continue;
                };
                let (px, py) = (p.x as usize, p.y as usize);
                if py < field.floor() || cell.is_empty() || *self.grounded.get(px, py) {
                    continue;
                }
                self.grounded.set(px, py, true);
                self.stack.push((px, py, 0));
            }
        }
    }

    fn run_pass(
        &mut self,
        field: &mut Field,
        pass: Pass,
        config: &PulldownConfig,
        report: &mut PulldownReport,
    ) {
        let width = field.width();
        for y in field.floor()..field.height() {
            for i in 0..width {
                let x = match pass {
                    Pass::LeftToRight => i,
                    Pass::RightToLeft => width - 1 - i,
                };
                for slot in 0..2 {
                    let sub = field.cell(x, y).sub(slot);
                    if sub.is_empty() || sub.kind.is_pinned() || is_marked(sub, pass) {
                        continue;
                    }
                    self.collect_cluster(field.cells_mut(), (x, y, slot));
                    for &(cx, cy, cs) in &self.cluster {
                        set_mark(field.cells_mut().get_mut(cx, cy).sub_mut(cs), pass);
                    }
                    if let Some(pulled) = self.drop_cluster(field, config) {
                        report.clusters.push(pulled);
                    }
                }
            }
        }
    }

    /// Flood from `seed` into `self.cluster`, using the `found` flag as the
    /// visited set.
    fn collect_cluster(&mut self, grid: &mut BlockGrid, seed: Slot) {
        self.cluster.clear();
        self.stack.clear();
        grid.get_mut(seed.0, seed.1).sub_mut(seed.2).found = true;
        self.stack.push(seed);

        while let Some((x, y, slot)) = self.stack.pop() {
            self.cluster.push((x, y, slot));
            let sub = *grid.get(x, y).sub(slot);
            let at = Position::new(x as i8, y as i8);

            let mut next = std::mem::take(&mut self.neighbours);
            next.clear();
            if sub.kind == BlockKind::Asteroid {
                next.push((x, y, 1 - slot));
                for dir in Direction::ALL {
                    let p = at.step(dir);
                    if let Some(cell) = grid.at(p) {
                        next.extend(
                            cell.occupied()
                                .filter(|(_, t)| t.kind == BlockKind::Asteroid)
                                .map(|(s, _)| (p.x as usize, p.y as usize, s)),
                        );
                    }
                }
                next.retain(|&(nx, ny, ns)| grid.get(nx, ny).sub(ns).kind == BlockKind::Asteroid);
            } else {
                for dir in sub.bonds.iter() {
                    if dir == BondDir::Diagonal {
                        next.push((x, y, 1 - slot));
                        continue;
                    }
                    let (dx, dy) = dir.delta();
                    let p = at.offset(dx, dy);
                    let Some(cell) = grid.at(p) else {
                        continue;
                    };
                    let partner = cell.occupied().find(|(_, t)| {
                        t.color == sub.color && t.kind == sub.kind && t.bonds.has(dir.opposite())
                    });
                    if let Some((s, _)) = partner {
                        next.push((p.x as usize, p.y as usize, s));
                    }
                }
            }

            if sub.indivisible && sub.piece.is_some() {
                for (cx, cy, cell) in grid.iter() {
                    for (s, t) in cell.occupied() {
                        if t.indivisible && t.piece == sub.piece {
                            next.push((cx, cy, s));
                        }
                    }
                }
            }

            for &n in &next {
                self.visit(grid, n);
            }
            self.neighbours = next;
        }
        for &(x, y, slot) in &self.cluster {
            grid.get_mut(x, y).sub_mut(slot).found = false;
        }
    }

    fn visit(&mut self, grid: &mut BlockGrid, (x, y, slot): Slot) {
        let sub = grid.get_mut(x, y).sub_mut(slot);
        if sub.is_empty() || sub.found || sub.kind.is_pinned() {
            return;
        }
        sub.found = true;
        self.stack.push((x, y, slot));
    }

    /// Move the cluster into the scratch grid at its minimum corner,
    /// saving the cells it came from. Returns that corner.
    fn lift(&mut self, field: &mut Field) -> Option<Position> {
        let min_x = self.cluster.iter().map(|c| c.0).min()?;
        let min_y = self.cluster.iter().map(|c| c.1).min()?;
        // higher slot first so removal does not shift the other index
        self.cluster
            .sort_unstable_by_key(|&(x, y, slot)| (x, y, std::cmp::Reverse(slot)));
        self.saved.clear();
        self.lifted.clear();
        for &(x, y, slot) in &self.cluster {
            if !self.saved.iter().any(|&(sx, sy, _)| (sx, sy) == (x, y)) {
                self.saved.push((x, y, *field.cell(x, y)));
            }
            let sub = field.cells_mut().get_mut(x, y).remove(slot);
            self.scratch.get_mut(x - min_x, y - min_y).insert(sub);
            self.lifted.push((x, y, sub));
        }
        Some(Position::new(min_x as i8, min_y as i8))
    }

    fn clear_scratch(&mut self, origin: Position) {
        let (ox, oy) = (origin.x as usize, origin.y as usize);
        for &(x, y, _) in &self.lifted {
            *self.scratch.get_mut(x - ox, y - oy) = Cell::EMPTY;
        }
    }

    /// Put the lifted cells back exactly as they were.
    fn restore(&mut self, field: &mut Field, origin: Position) {
        self.clear_scratch(origin);
        for &(x, y, cell) in &self.saved {
            *field.cells_mut().get_mut(x, y) = cell;
        }
    }

    /// Where the lifted cluster comes to rest. Asteroids step a row at a
    /// time with the directional check.
    fn rest(&self, field: &Field, origin: Position, asteroid: bool) -> Position {
        if !asteroid {
            return field.detect_collision_down(&self.scratch, origin);
        }
        let mut at = origin;
        loop {
            let next = at.step(Direction::Down);
            match field.check(&self.scratch, next, Some(Direction::Down), false).kind {
                CollisionKind::Now => return at,
                CollisionKind::NextStep => return next,
                CollisionKind::None => at = next,
            }
        }
    }

    fn is_asteroid_cluster(&self, field: &Field) -> bool {
        self.cluster
            .iter()
            .all(|&(x, y, s)| field.cell(x, y).sub(s).kind == BlockKind::Asteroid)
    }

    /// Lift the cluster out, drop it and put it back. Returns `None` when
    /// it did not move.
    fn drop_cluster(&mut self, field: &mut Field, config: &PulldownConfig) -> Option<PulledCluster> {
        let asteroid = self.is_asteroid_cluster(field);
        let grounded = self.cluster.iter().any(|&(x, y, _)| *self.grounded.get(x, y));

        let origin = self.lift(field)?;
        let rest = self.rest(field, origin, asteroid);
        let fell = (origin.y - rest.y).max(0) as usize;
        if fell == 0 {
            self.restore(field, origin);
            return None;
        }
        self.clear_scratch(origin);

        let mut cells = Vec::with_capacity(self.lifted.len());
        for &(x, y, mut sub) in &self.lifted {
            sub.found = false;
            let y = y - fell;
            let slot = field.cells_mut().get_mut(x, y).insert(sub);
            cells.push(ChangedCell {
                x,
                y,
                slot,
                sub,
                exact: (x as f32, y as f32),
            });
        }

        Some(PulledCluster {
            cells,
            fell,
            bounce: !config.suppress_bounce || !grounded,
        })
    }

    /// True when no unpinned cluster of `field` could fall a row.
    pub fn is_settled(&mut self, field: &Field) -> bool {
        self.prepare(field.width(), field.height());
        let mut work = field.clone();
        for y in field.floor()..field.height() {
            for x in 0..field.width() {
                for slot in 0..2 {
                    let sub = work.cell(x, y).sub(slot);
                    if sub.is_empty() || sub.kind.is_pinned() {
                        continue;
                    }
                    self.collect_cluster(work.cells_mut(), (x, y, slot));
                    let asteroid = self.is_asteroid_cluster(&work);
                    let Some(origin) = self.lift(&mut work) else {
                        continue;
                    };
                    let rest = self.rest(&work, origin, asteroid);
                    self.restore(&mut work, origin);
                    if rest.y < origin.y {
                        return false;
                    }
                }
            }
        }
        true
    }
}
