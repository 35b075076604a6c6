//! Valid-moves search.
//!
//! Three phases share one memo grid and one move set:
//! sweep (rotate at spawn, slide, drop, tuck under overhangs), a
//! breadth-first flood over single steps, and a connectivity closure that
//! admits resting spots next to territory the first two reached.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use wedge_core::{
    Action, BlockGrid, Direction, Fill, Grid, Move, MoveKey, MoveOrigin, Movement, MovementId,
    PieceType, Position, Rotation,
};

use crate::config::{ClosureMode, SearchConfig};
use crate::field::Field;
use crate::move_list::MoveSet;
use crate::movement::{try_rotate, try_shift, MovementArena};
use crate::search_grid::SearchGrid;

#[derive(Clone, Copy, Debug)]
struct Node {
    position: Position,
    rotation: Rotation,
    movement: MovementId,
    steps: u16,
}

/// Closure route state; `movement` is set on seeds taken from an existing
/// path.
#[derive(Clone, Copy, Debug)]
struct Waypoint {
    position: Position,
    rotation: Rotation,
    action: Action,
    parent: Option<usize>,
    movement: Option<MovementId>,
    steps: u16,
}

/// Reusable search state. Results borrow from it and are replaced by the
/// next [`MoveSearch::search`].
#[derive(Debug)]
pub struct MoveSearch {
    grid: SearchGrid,
    area: Grid<bool>,
    footprint: Grid<Option<(Fill, usize)>>,
    arena: MovementArena,
    moves: MoveSet,
    queue: VecDeque<Node>,
    tucks: Vec<(Node, Direction)>,
    trail: Vec<Waypoint>,
    route: Vec<usize>,
    walk: u32,
}

impl Default for MoveSearch {
    fn default() -> Self {
        Self {
            grid: SearchGrid::default(),
            area: Grid::new(0, 0, false),
            footprint: Grid::new(0, 0, None),
            arena: MovementArena::new(),
            moves: MoveSet::new(),
            queue: VecDeque::new(),
            tucks: Vec::new(),
            trail: Vec::new(),
            route: Vec::new(),
            walk: 0,
        }
    }
}

fn action_for(dir: Direction) -> Action {
    match dir {
        Direction::Left => Action::Left,
        Direction::Right => Action::Right,
        Direction::Down => Action::Down,
        Direction::Up => Action::Slide,
    }
}

fn canonical_key(piece: &PieceType, key: MoveKey, dedup: bool) -> MoveKey {
    if dedup {
        let (position, rotation) = piece.canonical(key.position(), key.rotation);
        MoveKey::new(position, rotation)
    } else {
        key
    }
}

/// Field cells above the piece in any of its columns are occupied.
fn is_under_overhang(field: &Field, blocks: &BlockGrid, position: Position) -> bool {
    for lx in 0..blocks.width() {
        let Some(top) = (0..blocks.height())
            .rev()
            .find(|&ly| !blocks.get(lx, ly).is_empty())
        else {
            continue;
        };
        let x = position.x as isize + lx as isize;
        if x < 0 || x as usize >= field.width() {
            continue;
        }
        let from = (position.y as isize + top as isize + 1).max(0) as usize;
        if (from..field.height()).any(|y| !field.cell(x as usize, y).is_empty()) {
            return true;
        }
    }
    false
}

impl MoveSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every move `piece` can reach from `spawn`, in discovery order.
    /// An empty set means the piece cannot spawn or has nowhere to rest.
    pub fn search(
        &mut self,
        field: &Field,
        piece: &PieceType,
        spawn: Position,
        config: &SearchConfig,
    ) -> &MoveSet {
        let (width, height) = (field.width(), field.height());
        self.grid.prepare(width, height, piece.size());
        if self.area.width() != width || self.area.height() != height {
            self.area = Grid::new(width, height, false);
            self.footprint = Grid::new(width, height, None);
        } else {
            self.area.reset(false);
            self.footprint.reset(None);
        }
        self.arena.clear();
        self.moves.clear(config.dedup_rotations);
        self.queue.clear();
        self.tucks.clear();
        self.walk = 0;

        let rotation = piece.capabilities().spawn_rotation;
        if field.collides(piece.blocks(rotation), spawn) {
            return &self.moves;
        }
        let root = self.arena.push(spawn, rotation, Action::Spawn, None);
        let start = Node {
            position: spawn,
            rotation,
            movement: root,
            steps: 1,
        };
        self.mark(field, piece, start);

        if config.human_like {
            self.sweep(field, piece, start);
        }
        if config.exhaustive {
            self.flood(field, piece, start);
        }
        let closure = match config.closure {
            ClosureMode::Off => false,
            ClosureMode::On => true,
            ClosureMode::Auto => field.has_obstacles(),
        };
        if closure {
            self.closure(field, piece);
        }

        if let Some(restriction) = &config.restriction {
            let dedup = config.dedup_rotations;
            let allowed: Vec<MoveKey> = std::iter::once(restriction.required)
                .chain(restriction.suggested.iter().copied())
                .map(|k| canonical_key(piece, k, dedup))
                .collect();
            self.moves
                .retain(piece, |m| allowed.contains(&canonical_key(piece, m.key(), dedup)));
        }

        &self.moves
    }

    pub fn moves(&self) -> &MoveSet {
        &self.moves
    }

    pub fn arena(&self) -> &MovementArena {
        &self.arena
    }

    /// Cells the piece occupied somewhere along a search path.
    pub fn reachable_area(&self) -> &Grid<bool> {
        &self.area
    }

    /// Replayable path of a move from the last search.
    pub fn path(&self, mv: &Move) -> Vec<Movement> {
        self.arena.path(mv.last)
    }

    fn step(&mut self, from: Node, position: Position, rotation: Rotation, action: Action) -> Node {
        let movement = self
            .arena
            .push(position, rotation, action, Some(from.movement));
        Node {
            position,
            rotation,
            movement,
            steps: from.steps + 1,
        }
    }

    fn mark(&mut self, field: &Field, piece: &PieceType, node: Node) {
        field.check_marking(piece.blocks(node.rotation), node.position, None, &mut self.area);
    }

    fn record(&mut self, field: &Field, piece: &PieceType, node: Node, origin: MoveOrigin) -> usize {
        let under_overhang = is_under_overhang(field, piece.blocks(node.rotation), node.position);
        let mv = Move {
            position: node.position,
            rotation: node.rotation,
            score: 0.0,
            last: node.movement,
            steps: node.steps,
            origin,
            under_overhang,
        };
        self.moves.insert(piece, mv).index()
    }

    fn landing(&mut self, field: &Field, piece: &PieceType, node: Node) -> Position {
        let cached = self
            .grid
            .get(node.position, node.rotation)
            .and_then(|c| c.landing_row);
        if let Some(y) = cached {
            return Position::new(node.position.x, y);
        }
        let rest = field.detect_collision_down(piece.blocks(node.rotation), node.position);
        if let Some(cell) = self.grid.get_mut(node.position, node.rotation) {
            cell.landing_row = Some(rest.y);
        }
        rest
    }

    /// Claim a state for the sweep phase; false if already expanded.
    fn claim_sweep(&mut self, node: Node) -> bool {
        match self.grid.get_mut(node.position, node.rotation) {
            Some(cell) if !cell.visited_sweep => {
                cell.visited_sweep = true;
                true
            }
            _ => false,
        }
    }

    fn sweep(&mut self, field: &Field, piece: &PieceType, start: Node) {
        let mut starts = vec![start];
        for clockwise in [true, false] {
            let mut node = start;
            while let Some(to) = try_rotate(field, piece, node.rotation, node.position, clockwise) {
                if starts.iter().any(|n| n.rotation == to) {
                    break;
                }
                let action = if clockwise {
                    Action::RotateCw
                } else {
                    Action::RotateCcw
                };
                node = self.step(node, node.position, to, action);
                self.mark(field, piece, node);
                starts.push(node);
            }
        }

        for s in starts {
            self.drop_column(field, piece, s, &[Direction::Left, Direction::Right]);
            for dir in [Direction::Left, Direction::Right] {
                let mut node = s;
                while let Some(next) = try_shift(field, piece, node.rotation, node.position, dir) {
                    node = self.step(node, next, node.rotation, action_for(dir));
                    self.mark(field, piece, node);
                    self.drop_column(field, piece, node, &[dir.opposite()]);
                }
            }
        }

        while let Some((node, dir)) = self.tucks.pop() {
            self.tuck(field, piece, node, dir);
        }
    }

    fn drop_column(&mut self, field: &Field, piece: &PieceType, node: Node, tucks: &[Direction]) {
        let rest = self.landing(field, piece, node);
        let rest_node = if rest == node.position {
            node
        } else {
            self.step(node, rest, node.rotation, Action::Drop)
        };
        self.mark(field, piece, rest_node);
        if !self.claim_sweep(rest_node) {
            return;
        }
        self.record(field, piece, rest_node, MoveOrigin::Drop);
        for &dir in tucks {
            self.tucks.push((rest_node, dir));
        }
    }

    /// Slide one cell under an overhang when the cell beside the piece's
    /// foot is open, then drop and keep going.
    fn tuck(&mut self, field: &Field, piece: &PieceType, node: Node, dir: Direction) {
        let geometry = piece.rotation(node.rotation);
        let side = usize::from(dir == Direction::Right);
        let probe = geometry.extremity[side].unwrap_or_else(|| geometry.overhang[side].step(dir));
        let probe = probe.offset(node.position.x, node.position.y);
        let open = field.cells().at(probe).is_some_and(|c| !c.is_full());
        if !open {
            return;
        }
        let Some(next) = try_shift(field, piece, node.rotation, node.position, dir) else {
            return;
        };
        let slid = self.step(node, next, node.rotation, Action::Slide);
        self.mark(field, piece, slid);
        let rest = self.landing(field, piece, slid);
        let rest_node = if rest == slid.position {
            slid
        } else {
            self.step(slid, rest, slid.rotation, Action::Drop)
        };
        self.mark(field, piece, rest_node);
        if !self.claim_sweep(rest_node) {
            return;
        }
        self.record(field, piece, rest_node, MoveOrigin::Tuck);
        self.tucks.push((rest_node, dir));
    }

    fn enqueue(
        &mut self,
        field: &Field,
        piece: &PieceType,
        from: Node,
        position: Position,
        rotation: Rotation,
        action: Action,
    ) {
        match self.grid.get_mut(position, rotation) {
            Some(cell) if !cell.visited_flood => cell.visited_flood = true,
            _ => return,
        }
        let node = self.step(from, position, rotation, action);
        self.mark(field, piece, node);
        self.queue.push_back(node);
    }

    fn flood(&mut self, field: &Field, piece: &PieceType, start: Node) {
        self.queue.clear();
        if let Some(cell) = self.grid.get_mut(start.position, start.rotation) {
            cell.visited_flood = true;
        }
        self.queue.push_back(start);

        while let Some(node) = self.queue.pop_front() {
            let below = node.position.step(Direction::Down);
            let down = field.check(piece.blocks(node.rotation), below, Some(Direction::Down), false);
            if down.is_now() {
                self.record(field, piece, node, MoveOrigin::Flood);
            } else {
                self.enqueue(field, piece, node, below, node.rotation, Action::Down);
            }
            for dir in [Direction::Right, Direction::Left] {
                if let Some(next) = try_shift(field, piece, node.rotation, node.position, dir) {
                    self.enqueue(field, piece, node, next, node.rotation, action_for(dir));
                }
            }
            for (clockwise, action) in [(true, Action::RotateCw), (false, Action::RotateCcw)] {
                if let Some(to) = try_rotate(field, piece, node.rotation, node.position, clockwise) {
                    self.enqueue(field, piece, node, node.position, to, action);
                }
            }
        }
    }

    fn stamp(&mut self, blocks: &BlockGrid, position: Position, index: usize) {
        for (lx, ly, cell) in blocks.iter() {
            if cell.is_empty() {
                continue;
            }
            let at = position.offset(lx as i8, ly as i8);
            if let Some(slot) = self.footprint.at_mut(at) {
                if slot.is_none() {
                    *slot = Some((cell.effective_fill(), index));
                }
            }
        }
    }

    fn touches_area(&self, blocks: &BlockGrid, position: Position) -> bool {
        blocks.occupied_positions().any(|p| {
            let at = p.offset(position.x, position.y);
            std::iter::once(at)
                .chain(Direction::ALL.map(|d| at.step(d)))
                .any(|q| self.area.at(q).copied().unwrap_or(false))
        })
    }

    /// Index of an accepted move this placement overlaps or touches, if
    /// no half-cell it shares with one is claimed by a different diagonal.
    fn compatible_anchor(&self, blocks: &BlockGrid, position: Position) -> Option<usize> {
        let mut anchor = None;
        for (lx, ly, cell) in blocks.iter() {
            if cell.is_empty() {
                continue;
            }
            let at = position.offset(lx as i8, ly as i8);
            let fill = cell.effective_fill();
            if let Some(&Some((other, index))) = self.footprint.at(at) {
                if fill.is_half() && other.is_half() && fill != other && !fill.is_complement_of(other) {
                    return None;
                }
                anchor = anchor.or(Some(index));
            }
            for d in Direction::ALL {
                if let Some(&Some((_, index))) = self.footprint.at(at.step(d)) {
                    anchor = anchor.or(Some(index));
                }
            }
        }
        anchor
    }

    /// Shortest run of single steps from a waypoint of `anchor`'s path to
    /// `target`. Only static overlap is checked, so the run may pass through
    /// interlocking halves that directional checks forbid. The waypoints
    /// enter the arena only when a route exists.
    fn walk_to(
        &mut self,
        field: &Field,
        piece: &PieceType,
        anchor: &Move,
        target: MoveKey,
    ) -> Option<Node> {
        self.walk = self.walk.wrapping_add(1);
        let generation = self.walk;
        self.trail.clear();

        let mut cursor = Some(anchor.last);
        let mut steps = anchor.steps;
        while let Some(id) = cursor {
            let m = *self.arena.get(id);
            let (position, rotation) = (m.position(), m.rotation);
            if self.claim_walk(position, rotation, generation) {
                self.trail.push(Waypoint {
                    position,
                    rotation,
                    action: m.action,
                    parent: None,
                    movement: Some(id),
                    steps,
                });
            }
            cursor = m.predecessor;
            steps = steps.saturating_sub(1);
        }

        let mut head = 0;
        let found = loop {
            let Some(&at) = self.trail.get(head) else {
                return None;
            };
            if at.position == target.position() && at.rotation == target.rotation {
                break head;
            }
            let blocks = piece.blocks(at.rotation);
            let mut next: [Option<(Position, Rotation, Action)>; 5] = [None; 5];
            for (i, dir) in [Direction::Left, Direction::Right, Direction::Down]
                .into_iter()
                .enumerate()
            {
                let p = at.position.step(dir);
                if !field.collides(blocks, p) {
                    next[i] = Some((p, at.rotation, action_for(dir)));
                }
            }
            for (i, (clockwise, action)) in [(true, Action::RotateCw), (false, Action::RotateCcw)]
                .into_iter()
                .enumerate()
            {
                if let Some(to) = try_rotate(field, piece, at.rotation, at.position, clockwise) {
                    next[3 + i] = Some((at.position, to, action));
                }
            }
            for (position, rotation, action) in next.into_iter().flatten() {
                if self.claim_walk(position, rotation, generation) {
                    self.trail.push(Waypoint {
                        position,
                        rotation,
                        action,
                        parent: Some(head),
                        movement: None,
                        steps: at.steps + 1,
                    });
                }
            }
            head += 1;
        };

        // back to the seed, then replay forward into the arena
        self.route.clear();
        let mut i = found;
        while self.trail[i].movement.is_none() {
            self.route.push(i);
            match self.trail[i].parent {
                Some(parent) => i = parent,
                None => break,
            }
        }
        let seed = self.trail[i];
        let mut node = Node {
            position: seed.position,
            rotation: seed.rotation,
            movement: seed.movement?,
            steps: seed.steps,
        };
        for k in (0..self.route.len()).rev() {
            let w = self.trail[self.route[k]];
            node = self.step(node, w.position, w.rotation, w.action);
            self.mark(field, piece, node);
        }
        Some(node)
    }

    fn claim_walk(&mut self, position: Position, rotation: Rotation, generation: u32) -> bool {
        match self.grid.get_mut(position, rotation) {
            Some(cell) if cell.walk != generation => {
                cell.walk = generation;
                true
            }
            _ => false,
        }
    }

    fn closure(&mut self, field: &Field, piece: &PieceType) {
        for i in 0..self.moves.len() {
            let mv = self.moves[i];
            self.stamp(piece.blocks(mv.rotation), mv.position, i);
        }

        let size = piece.size() as i8;
        let rotations = piece.allowed_rotations();
        loop {
            let mut added = false;
            for &rotation in &rotations {
                let blocks = piece.blocks(rotation);
                for y in -size..field.height() as i8 {
                    for x in -size..field.width() as i8 {
                        let position = Position::new(x, y);
                        let key = MoveKey::new(position, rotation);
                        if self.moves.contains(piece, key)
                            || field.collides(blocks, position)
                            || !field.is_resting(blocks, position)
                            || !self.touches_area(blocks, position)
                        {
                            continue;
                        }
                        let Some(anchor) = self.compatible_anchor(blocks, position) else {
                            continue;
                        };
                        let base = self.moves[anchor];
                        let Some(node) = self.walk_to(field, piece, &base, key) else {
                            continue;
                        };
                        let index = self.record(field, piece, node, MoveOrigin::Closure);
                        self.stamp(blocks, position, index);
                        field.check_marking(blocks, position, None, &mut self.area);
                        added = true;
                    }
                }
            }
            if !added {
                break;
            }
        }
    }
}

/// Moves from the piece's own spawn position.
pub fn generate_moves(field: &Field, piece: &PieceType, config: &SearchConfig) -> Vec<Move> {
    let spawn = piece.spawn_position(field.width(), field.height());
    let mut search = MoveSearch::new();
    search.search(field, piece, spawn, config).as_slice().to_vec()
}

/// Resting states reachable from `spawn` by single steps, found by an
/// unbounded breadth-first walk. Sorted.
pub fn enumerate_reachable(field: &Field, piece: &PieceType, spawn: Position) -> Vec<MoveKey> {
    let rotation = piece.capabilities().spawn_rotation;
    if field.collides(piece.blocks(rotation), spawn) {
        return Vec::new();
    }
    let mut seen: FxHashSet<MoveKey> = FxHashSet::default();
    let mut queue = VecDeque::new();
    let mut out = Vec::new();
    let start = MoveKey::new(spawn, rotation);
    seen.insert(start);
    queue.push_back(start);

    while let Some(key) = queue.pop_front() {
        let (position, rotation) = (key.position(), key.rotation);
        let blocks = piece.blocks(rotation);
        let mut next = Vec::with_capacity(5);
        let below = position.step(Direction::Down);
        if field.check(blocks, below, Some(Direction::Down), false).is_now() {
            out.push(key);
        } else {
            next.push(MoveKey::new(below, rotation));
        }
        for dir in [Direction::Left, Direction::Right] {
            if let Some(p) = try_shift(field, piece, rotation, position, dir) {
                next.push(MoveKey::new(p, rotation));
            }
        }
        for clockwise in [true, false] {
            if let Some(r) = try_rotate(field, piece, rotation, position, clockwise) {
                next.push(MoveKey::new(position, r));
            }
        }
        for k in next {
            if seen.insert(k) {
                queue.push_back(k);
            }
        }
    }
    out.sort();
    out
}

/// Every collision-free resting placement in an allowed rotation, reachable
/// or not. Sorted.
pub fn enumerate_resting(field: &Field, piece: &PieceType) -> Vec<MoveKey> {
    let size = piece.size() as i8;
    let mut out = Vec::new();
    for rotation in piece.allowed_rotations() {
        let blocks = piece.blocks(rotation);
        for y in -size..field.height() as i8 {
            for x in -size..field.width() as i8 {
                let position = Position::new(x, y);
                if !field.collides(blocks, position) && field.is_resting(blocks, position) {
                    out.push(MoveKey::new(position, rotation));
                }
            }
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge_core::token::parse_grid;
    use wedge_core::{Catalogue, PieceKind};

    use crate::config::TutorialRestriction;

    fn bar() -> PieceType {
        PieceType::new("bar2", PieceKind::Regular, &[". .", "#a #a"]).unwrap()
    }

    fn field(text: &str) -> Field {
        Field::from_grid(parse_grid(text).unwrap(), 0).unwrap()
    }

    #[test]
    fn test_generate_moves_empty_field() {
        let f = Field::new(4, 6, 0);
        let moves = generate_moves(&f, &bar(), &SearchConfig::standard());
        assert!(!moves.is_empty());
        for m in &moves {
            assert!(f.is_resting(bar().blocks(m.rotation), m.position));
        }
    }

    #[test]
    fn test_all_rotations_present_without_dedup() {
        let f = Field::new(4, 6, 0);
        let moves = generate_moves(&f, &bar(), &SearchConfig::exhaustive_only());
        for r in Rotation::ALL {
            assert!(moves.iter().any(|m| m.rotation == r), "{r:?}");
        }
    }

    #[test]
    fn test_dedup_collapses_symmetric_rotations() {
        let f = Field::new(4, 6, 0);
        let moves = generate_moves(&f, &bar(), &SearchConfig::standard());
        // three horizontal columns and four vertical ones
        assert_eq!(moves.len(), 7);
    }

    #[test]
    fn test_spawn_blocked_yields_nothing() {
        let f = field("#b #b #b #b\n. . . .");
        let mut search = MoveSearch::new();
        let moves = search.search(&f, &bar(), Position::new(1, 1), &SearchConfig::standard());
        assert!(moves.is_empty());
    }

    #[test]
    fn test_paths_replay_to_the_move() {
        let f = Field::new(4, 6, 0);
        let p = bar();
        let mut search = MoveSearch::new();
        let moves = search
            .search(&f, &p, Position::new(0, 5), &SearchConfig::standard())
            .as_slice()
            .to_vec();
        for m in &moves {
            let path = search.path(m);
            assert_eq!(path.first().map(|s| s.action), Some(Action::Spawn));
            let last = path.last().unwrap();
            assert_eq!(last.position(), m.position);
            assert_eq!(last.rotation, m.rotation);
            assert_eq!(path.len(), m.steps as usize);
        }
    }

    #[test]
    fn test_drop_is_two_movements() {
        let f = Field::new(4, 6, 0);
        let p = bar();
        let mut search = MoveSearch::new();
        let moves = search.search(&f, &p, Position::new(0, 5), &SearchConfig::standard());
        let straight = moves
            .get(&p, MoveKey::new(Position::new(0, 0), Rotation::North))
            .unwrap();
        assert_eq!(straight.steps, 2);
        assert_eq!(straight.origin, MoveOrigin::Drop);
    }

    #[test]
    fn test_tuck_under_overhang() {
        // a roof over the left two columns, open on the right
        let f = field(
            ". . . .
             #b #b . .
             . . . .
             . . . .",
        );
        let p = bar();
        let moves = generate_moves(&f, &p, &SearchConfig::standard());
        let tucked = moves
            .iter()
            .find(|m| m.position == Position::new(0, 0) && m.rotation == Rotation::North)
            .expect("slide under the roof");
        assert!(tucked.under_overhang);
        let reachable = enumerate_reachable(&f, &p, p.spawn_position(4, 4));
        assert!(reachable.contains(&MoveKey::new(Position::new(0, 0), Rotation::North)));
    }

    #[test]
    fn test_sealed_pocket_unreachable() {
        let f = field(
            ". . . .
             #b #b #b #b
             . . . .",
        );
        let p = bar();
        let moves = generate_moves(&f, &p, &SearchConfig::exhaustive_only());
        assert!(moves
            .iter()
            .all(|m| m.position.y >= 2 || (m.position.y == 1 && m.rotation == Rotation::South)));
        let resting = enumerate_resting(&f, &p);
        assert!(resting.contains(&MoveKey::new(Position::new(0, 0), Rotation::North)));
    }

    #[test]
    fn test_search_matches_reachable() {
        let cat = Catalogue::standard().unwrap();
        let f = field(
            ". . . . .
             . . . . .
             . . . . .
             . 7c . . .
             #c #c . 3b .
             #a 1a . #b #b",
        );
        for piece in cat.iter() {
            let spawn = piece.spawn_position(f.width(), f.height());
            let mut search = MoveSearch::new();
            let found = search
                .search(&f, piece, spawn, &SearchConfig::exhaustive_only())
                .sorted_keys();
            assert_eq!(found, enumerate_reachable(&f, piece, spawn), "{}", piece.name());
        }
    }

    #[test]
    fn test_sweep_alone_is_subset() {
        let cat = Catalogue::standard().unwrap();
        let f = field(
            ". . . .
             . . . .
             . . . .
             #a . . .
             . . 9c .",
        );
        let config = SearchConfig {
            exhaustive: false,
            dedup_rotations: false,
            closure: ClosureMode::Off,
            ..SearchConfig::standard()
        };
        for piece in cat.iter() {
            let spawn = piece.spawn_position(f.width(), f.height());
            let reachable = enumerate_reachable(&f, piece, spawn);
            let mut search = MoveSearch::new();
            for key in search.search(&f, piece, spawn, &config).sorted_keys() {
                assert!(reachable.contains(&key), "{} {key:?}", piece.name());
            }
        }
    }

    #[test]
    fn test_tutorial_restriction() {
        let f = Field::new(4, 6, 0);
        let p = bar();
        let required = MoveKey::new(Position::new(2, 0), Rotation::North);
        let suggested = MoveKey::new(Position::new(3, 0), Rotation::East);
        let config = SearchConfig::tutorial(TutorialRestriction {
            required,
            suggested: vec![suggested],
        });
        let mut search = MoveSearch::new();
        let moves = search.search(&f, &p, Position::new(1, 5), &config);
        assert_eq!(moves.len(), 2);
        assert!(moves.contains(&p, required));
        assert!(moves.contains(&p, suggested));
    }

    #[test]
    fn test_closure_stays_valid() {
        let f = field(
            ". . . . .
             . . . . .
             !#b . . . .
             . . . !#b .",
        );
        let p = bar();
        let config = SearchConfig {
            closure: ClosureMode::On,
            ..SearchConfig::exhaustive_only()
        };
        let mut search = MoveSearch::new();
        let spawn = p.spawn_position(5, 4);
        let moves = search.search(&f, &p, spawn, &config);
        for m in moves {
            let blocks = p.blocks(m.rotation);
            assert!(!f.collides(blocks, m.position));
            assert!(f.is_resting(blocks, m.position));
        }
        let flood_only = enumerate_reachable(&f, &p, spawn);
        assert!(moves.len() >= flood_only.len());
    }

    #[test]
    fn test_closure_paths_replay_step_by_step() {
        let cat = Catalogue::standard().unwrap();
        let f = field(
            ". . . . .
             . . . . .
             . . . . .
             !#b . . . .
             . . 3c !#b .
             . . . . .",
        );
        let config = SearchConfig {
            closure: ClosureMode::On,
            ..SearchConfig::exhaustive_only()
        };
        let mut search = MoveSearch::new();
        for piece in cat.iter() {
            let spawn = piece.spawn_position(f.width(), f.height());
            let moves = search.search(&f, piece, spawn, &config).as_slice().to_vec();
            for m in &moves {
                let path = search.path(m);
                assert_eq!(path.len(), m.steps as usize, "{} {m:?}", piece.name());
                assert_eq!(path[0].position(), spawn);
                let last = path[path.len() - 1];
                assert_eq!((last.position(), last.rotation), (m.position, m.rotation));
                for pair in path.windows(2) {
                    let (a, b) = (pair[0].position(), pair[1].position());
                    let (dx, dy) = (b.x - a.x, b.y - a.y);
                    let ok = match pair[1].action {
                        Action::Left => (dx, dy) == (-1, 0),
                        Action::Right => (dx, dy) == (1, 0),
                        Action::Down => (dx, dy) == (0, -1),
                        Action::Drop => dx == 0 && dy < 0,
                        Action::Slide => dy == 0 && dx.abs() == 1,
                        Action::RotateCw => a == b && pair[1].rotation == pair[0].rotation.cw(),
                        Action::RotateCcw => a == b && pair[1].rotation == pair[0].rotation.ccw(),
                        Action::Spawn => false,
                    };
                    assert!(ok, "{} {:?} -> {:?}", piece.name(), pair[0], pair[1]);
                    assert!(!f.collides(piece.blocks(pair[1].rotation), b));
                }
            }
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let f = field(". . . .\n. 7a . .\n#a . . 1b");
        let p = bar();
        let mut search = MoveSearch::new();
        let first = search
            .search(&f, &p, Position::new(1, 2), &SearchConfig::standard())
            .sorted_keys();
        let second = search
            .search(&f, &p, Position::new(1, 2), &SearchConfig::standard())
            .sorted_keys();
        assert_eq!(first, second);
    }
}
