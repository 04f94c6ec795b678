//! Scripted player for headless runs.
//!
//! Placement levels: every tracked piece is dragged to its bound slot, or the
//! first free slot with its tag. Stacking levels: the tower is moved to the
//! goal peg with the classic recursive solution. All input goes through the
//! camera mapping exactly as a touch screen would deliver it.

#[cfg(test)]
#[path = "autoplay_test.rs"]
mod autoplay_test;

use std::collections::HashSet;

use placement::engine::{Action, EngineCore};
use placement::geom::Point;
use placement::piece::{PieceId, SlotId};

/// Drives an engine and hands every emitted action to `sink`.
pub struct Autoplay<F> {
    dt: f64,
    steps: u32,
    sink: F,
}

impl<F: FnMut(Action)> Autoplay<F> {
    pub fn new(dt: f64, steps: u32, sink: F) -> Self {
        Self { dt, steps: steps.max(1), sink }
    }

    /// Play the level to the end of its input. Returns how many drags were made.
    pub fn play(&mut self, engine: &mut EngineCore) -> usize {
        if engine.stack().is_empty() {
            self.place_all(engine)
        } else {
            self.solve_tower(engine)
        }
    }

    /// Advance one frame.
    pub fn tick(&mut self, engine: &mut EngineCore) {
        for action in engine.tick(self.dt) {
            (self.sink)(action);
        }
    }

    fn place_all(&mut self, engine: &mut EngineCore) -> usize {
        let mut taken: HashSet<SlotId> = HashSet::new();
        let mut drags = 0;
        for id in engine.tracked_ids() {
            let Some(slot) = pick_slot(engine, id, &taken) else {
                tracing::warn!(%id, "no slot for piece; skipping");
                continue;
            };
            let Some(target) = engine.store.slot(&slot).map(|s| s.reference.position) else {
                continue;
            };
            self.drag(engine, id, target);
            drags += 1;
            if engine.placed_slot(id) == Some(slot) {
                taken.insert(slot);
            }
        }
        drags
    }

    fn solve_tower(&mut self, engine: &mut EngineCore) -> usize {
        let pegs = engine.stack().pegs();
        let Some(from) = pegs.iter().position(|p| !p.blocks().is_empty()) else {
            return 0;
        };
        let goal = engine.stack().goal();
        if from == goal {
            return 0;
        }
        let spare = (0..pegs.len()).find(|&i| i != from && i != goal);
        let occupied = pegs.iter().filter(|p| !p.blocks().is_empty()).count();
        let (Some(spare), 1) = (spare, occupied) else {
            tracing::warn!(pegs = pegs.len(), occupied, "tower layout not solvable by autoplay");
            return 0;
        };
        let mut moves = Vec::new();
        hanoi_moves(pegs[from].blocks().len(), from, goal, spare, &mut moves);

        let bases: Vec<Point> = pegs.iter().map(|p| p.base).collect();
        for &(src, dst) in &moves {
            let Some(top) = engine.stack().pegs()[src].top() else {
                tracing::warn!(peg = src, "expected a block to move");
                return 0;
            };
            let target = Point::new(bases[dst].x, bases[dst].y + 200.0);
            self.drag(engine, top, target);
        }
        moves.len()
    }

    /// Press on the piece, move toward `target` in steps, release there.
    fn drag(&mut self, engine: &mut EngineCore, id: PieceId, target: Point) {
        let Some(start) = engine.store.piece(&id).map(|p| p.transform.position) else {
            return;
        };
        let down = engine.camera.world_to_screen(start);
        for action in engine.on_pointer_down(id, down) {
            (self.sink)(action);
        }
        for step in 1..=self.steps {
            let t = f64::from(step) / f64::from(self.steps);
            let world = Point::new(start.x + (target.x - start.x) * t, start.y + (target.y - start.y) * t);
            let screen = engine.camera.world_to_screen(world);
            for action in engine.on_pointer_move(id, screen) {
                (self.sink)(action);
            }
            self.tick(engine);
        }
        let up = engine.camera.world_to_screen(target);
        for action in engine.on_pointer_up(id, up) {
            (self.sink)(action);
        }
        self.tick(engine);
    }
}

/// Bound slot, or the first slot with the piece's tag that nobody took yet.
fn pick_slot(engine: &EngineCore, id: PieceId, taken: &HashSet<SlotId>) -> Option<SlotId> {
    let piece = engine.store.piece(&id)?;
    if let Some(bound) = piece.target {
        return Some(bound);
    }
    engine.store.slots_for_tag(&piece.tag).map(|s| s.id).find(|s| !taken.contains(s))
}

/// Moves that carry `n` blocks from `from` to `to`.
fn hanoi_moves(n: usize, from: usize, to: usize, via: usize, out: &mut Vec<(usize, usize)>) {
    if n == 0 {
        return;
    }
    hanoi_moves(n - 1, from, via, to, out);
    out.push((from, to));
    hanoi_moves(n - 1, via, to, from, out);
}
