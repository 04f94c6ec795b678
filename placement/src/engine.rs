use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::anim::{Consume, EffectStep};
use crate::bounds::BoundsClamper;
use crate::camera::{Camera, ScreenToWorld};
use crate::consts::{CONSUME_DURATION, DEFAULT_PIECE_SIZE, DEFAULT_VIEWPORT, MAX_ZOOM};
use crate::drag::DragController;
use crate::feedback::{Cue, CueTable};
use crate::geom::{Point, Rect, Size, Transform};
use crate::hit::hit_test;
use crate::obstacle::{ObstacleEvent, ObstacleField, ObstacleId, ObstacleSpec, PointerProbe};
use crate::piece::{Draggable, Lifecycle, PieceId, PieceStore, SlotId, Tag, TargetSlot, Tolerances};
use crate::progress::{LevelResult, ProgressState, ProgressTracker};
use crate::stack::{StackBoard, StackDrop};
use crate::transform::{TransformInput, TransformTool};
use crate::validate::{self, Verdict};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers and ticks for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Play or vibrate something.
    Feedback(Cue),
    PieceMoved { id: PieceId, position: Point },
    PieceTransformed { id: PieceId, transform: Transform },
    /// Correctly placed; `slot` is `None` for stacking blocks.
    PieceLocked { id: PieceId, slot: Option<SlotId> },
    /// Rejected and sent back to `position`.
    PieceReturned { id: PieceId, position: Point },
    PieceRemoved { id: PieceId },
    ObstacleGone { id: ObstacleId },
    /// Terminal event, delivered once.
    LevelComplete(LevelResult),
    RenderNeeded,
}

/// Core engine state: every piece, slot and subsystem of one level.
///
/// Single-threaded and frame-driven. The host feeds pointer events as they
/// arrive and calls [`EngineCore::tick`] once per frame; nothing blocks.
pub struct EngineCore {
    pub store: PieceStore,
    pub camera: Camera,
    pub cues: CueTable,
    clamper: BoundsClamper,
    drag: DragController,
    progress: ProgressTracker,
    obstacles: ObstacleField,
    stack: StackBoard,
    tool: TransformTool,
    effects: Vec<Consume>,
    /// Slot each locked piece occupies.
    placed: HashMap<PieceId, SlotId>,
    /// World position of a pointer that is down without dragging anything.
    bare_pointer: Option<Point>,
    clock: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        let (x, y, w, h) = crate::consts::DEFAULT_WORLD;
        Self::new(Rect::from_origin_size(x, y, w, h))
    }
}

impl EngineCore {
    /// Engine for `world` with default padding, camera and progress rules.
    #[must_use]
    pub fn new(world: Rect) -> Self {
        Self::with_parts(BoundsClamper::new(world), ProgressTracker::default(), CueTable::vehicles())
    }

    /// Engine from explicitly configured parts. The camera starts centered
    /// on the world, zoomed fully out.
    #[must_use]
    pub fn with_parts(clamper: BoundsClamper, progress: ProgressTracker, cues: CueTable) -> Self {
        let (vw, vh) = DEFAULT_VIEWPORT;
        let camera = Camera::new(clamper.world().center(), MAX_ZOOM, vw, vh);
        Self {
            store: PieceStore::new(),
            camera,
            cues,
            clamper,
            drag: DragController::new(),
            progress,
            obstacles: ObstacleField::new(),
            stack: StackBoard::default(),
            tool: TransformTool::new(),
            effects: Vec::new(),
            placed: HashMap::new(),
            bare_pointer: None,
            clock: 0.0,
        }
    }

    // --- Setup ---

    /// Register a draggable of default size at `origin`.
    pub fn register_draggable(&mut self, tag: Tag, origin: Point) -> PieceId {
        self.register_piece(Draggable::new(tag, origin, Size::new(DEFAULT_PIECE_SIZE, DEFAULT_PIECE_SIZE)))
    }

    /// Register a fully built draggable.
    pub fn register_piece(&mut self, piece: Draggable) -> PieceId {
        tracing::debug!(id = %piece.id, tag = %piece.tag, "draggable registered");
        self.store.insert_piece(piece)
    }

    /// Register a slot of default size.
    pub fn register_target_slot(&mut self, tag: Tag, reference: Transform, tolerances: Tolerances) -> SlotId {
        let size = Size::new(DEFAULT_PIECE_SIZE, DEFAULT_PIECE_SIZE);
        self.register_slot(TargetSlot::new(tag, reference, size, tolerances))
    }

    pub fn register_slot(&mut self, slot: TargetSlot) -> SlotId {
        tracing::debug!(id = %slot.id, tag = %slot.tag, "target slot registered");
        self.store.insert_slot(slot)
    }

    /// Bind a piece to exactly one slot. Returns `false` when either is unknown.
    pub fn bind(&mut self, piece: PieceId, slot: SlotId) -> bool {
        if self.store.slot(&slot).is_none() {
            return false;
        }
        match self.store.piece_mut(&piece) {
            Some(p) => {
                p.target = Some(slot);
                true
            }
            None => false,
        }
    }

    pub fn spawn_obstacle(&mut self, spec: ObstacleSpec) -> ObstacleId {
        self.obstacles.spawn(spec)
    }

    /// Replace the peg board. Blocks must already be registered pieces.
    pub fn set_stack_board(&mut self, board: StackBoard) {
        self.stack = board;
    }

    // --- Queries ---

    #[must_use]
    pub fn progress(&self) -> ProgressState {
        self.progress.state()
    }

    /// The terminal result, once delivered.
    #[must_use]
    pub fn result(&self) -> Option<LevelResult> {
        self.progress.delivered()
    }

    #[must_use]
    pub fn clamper(&self) -> &BoundsClamper {
        &self.clamper
    }

    #[must_use]
    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    #[must_use]
    pub fn stack(&self) -> &StackBoard {
        &self.stack
    }

    /// Mutable access for level setup (stacking blocks onto pegs).
    pub fn stack_and_store_mut(&mut self) -> (&mut StackBoard, &mut PieceStore) {
        (&mut self.stack, &mut self.store)
    }

    #[must_use]
    pub fn is_dragging(&self, id: PieceId) -> bool {
        self.drag.is_dragging(id)
    }

    /// Piece the transform tool acts on.
    #[must_use]
    pub fn transform_target(&self) -> Option<PieceId> {
        self.tool.target()
    }

    /// Slot a locked piece occupies.
    #[must_use]
    pub fn placed_slot(&self, id: PieceId) -> Option<SlotId> {
        self.placed.get(&id).copied()
    }

    /// Ids of the pieces counted toward completion.
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<PieceId> {
        self.progress.tracked_ids(&self.store)
    }

    // --- Pointer input ---

    /// Pointer pressed on piece `id`. Refused silently (no actions) when the
    /// piece cannot be dragged.
    pub fn on_pointer_down(&mut self, id: PieceId, screen: Point) -> Vec<Action> {
        if self.progress.state().ended {
            return Vec::new();
        }
        if self.effects.iter().any(|e| e.piece() == id) {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen);
        let is_block = self.stack.contains(id);
        if is_block && self.stack.lift(id).is_err() {
            tracing::debug!(%id, "block not on top; drag refused");
            return Vec::new();
        }
        if !self.drag.begin(&mut self.store, id, world) {
            if is_block {
                self.stack.restore(&mut self.store);
            }
            tracing::debug!(%id, "drag refused");
            return Vec::new();
        }
        self.bare_pointer = None;
        self.tool.set_target(id);
        vec![Action::Feedback(Cue::DragStarted), Action::RenderNeeded]
    }

    /// Pointer pressed anywhere. Grabs the topmost interactive piece under
    /// it; on empty space the press counts as a camera tap and as a bare
    /// pointer for bombs.
    pub fn on_pointer_down_at(&mut self, screen: Point) -> (Option<PieceId>, Vec<Action>) {
        let world = self.camera.screen_to_world(screen);
        if let Some(id) = hit_test(world, &self.store) {
            let actions = self.on_pointer_down(id, screen);
            let grabbed = if self.drag.is_dragging(id) { Some(id) } else { None };
            return (grabbed, actions);
        }
        self.bare_pointer = Some(world);
        if self.camera.tap(self.clock, screen) {
            tracing::debug!("double tap; resetting zoom");
        }
        (None, Vec::new())
    }

    /// A pointer that is not dragging moved (`Some`) or lifted (`None`).
    pub fn on_pointer_hover(&mut self, screen: Option<Point>) {
        self.bare_pointer = screen.map(|s| self.camera.screen_to_world(s));
    }

    pub fn on_pointer_move(&mut self, id: PieceId, screen: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen);
        match self.drag.drag_to(&mut self.store, &self.clamper, id, world) {
            Some(position) => vec![Action::PieceMoved { id, position }],
            None => Vec::new(),
        }
    }

    /// Pointer released. The final move is applied before validation so the
    /// drop happens where the pointer let go.
    pub fn on_pointer_up(&mut self, id: PieceId, screen: Point) -> Vec<Action> {
        let mut actions = self.on_pointer_move(id, screen);
        let Some(ctx) = self.drag.end(&self.store, id) else {
            return actions;
        };
        actions.push(Action::Feedback(Cue::DragEnded));

        if self.stack.contains(id) {
            self.drop_block(id, ctx.transform.position, &mut actions);
        } else {
            let occupied: HashSet<SlotId> = self.placed.values().copied().collect();
            match validate::validate(&ctx, self.store.slots(), &occupied) {
                Verdict::Accepted { slot } => {
                    if validate::commit(&mut self.store, id, slot) {
                        self.placed.insert(id, slot);
                        self.after_lock(id);
                        tracing::info!(%id, tag = %ctx.tag, %slot, "placement accepted");
                        actions.push(Action::Feedback(self.cues.success_cue(&ctx.tag)));
                        actions.push(Action::PieceLocked { id, slot: Some(slot) });
                    }
                }
                Verdict::Rejected { checks } => {
                    let failed = checks.map_or_else(|| vec!["no candidate slot"], |c| c.failures());
                    tracing::info!(%id, tag = %ctx.tag, ?failed, "placement rejected");
                    if let Some(position) = validate::reject(&mut self.store, id) {
                        actions.push(Action::Feedback(Cue::Rejected));
                        actions.push(Action::PieceReturned { id, position });
                    }
                }
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn drop_block(&mut self, id: PieceId, position: Point, actions: &mut Vec<Action>) {
        let drop = match self.stack.drop_block(&mut self.store, id, position) {
            Ok(drop) => drop,
            Err(e) => {
                tracing::warn!(%id, error = %e, "block drop failed");
                return;
            }
        };
        match drop {
            StackDrop::Placed { peg, position } => {
                tracing::info!(%id, peg, "block placed");
                let tag = self.store.piece(&id).map(|p| p.tag.clone());
                if let Some(tag) = tag {
                    actions.push(Action::Feedback(self.cues.success_cue(&tag)));
                }
                actions.push(Action::PieceMoved { id, position });
            }
            StackDrop::Returned { peg, position } => {
                tracing::info!(%id, peg, "block returned");
                actions.push(Action::Feedback(Cue::Rejected));
                actions.push(Action::PieceReturned { id, position });
            }
        }
        if self.stack.is_solved() {
            tracing::info!("tower solved");
            let goal = self.stack.pegs().get(self.stack.goal());
            let blocks = goal.map(|p| p.blocks().to_vec()).unwrap_or_default();
            for block in blocks {
                if self.store.piece_mut(&block).is_some_and(Draggable::lock) {
                    actions.push(Action::PieceLocked { id: block, slot: None });
                }
            }
        }
    }

    fn after_lock(&mut self, id: PieceId) {
        if self.tool.target() == Some(id) {
            self.tool.clear_target();
        }
    }

    // --- Camera / transform tool ---

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
    }

    pub fn pan_camera(&mut self, screen_delta: Point) {
        self.camera.pan_by_screen_delta(screen_delta);
    }

    pub fn pinch_camera(&mut self, previous_distance: f64, current_distance: f64) {
        self.camera.pinch(previous_distance, current_distance);
    }

    /// Held rotate/scale buttons for the transform tool.
    pub fn hold_transform(&mut self, input: TransformInput) {
        self.tool.hold(input);
    }

    pub fn release_transform(&mut self) {
        self.tool.release();
    }

    // --- Removal ---

    /// Start consuming `id`: it shrinks and spins, then becomes `Removed`.
    /// Any drag on it is cancelled immediately.
    pub fn consume_piece(&mut self, id: PieceId) -> bool {
        let Some(piece) = self.store.piece(&id) else {
            return false;
        };
        if piece.lifecycle() == Lifecycle::Removed || self.effects.iter().any(|e| e.piece() == id) {
            return false;
        }
        let scale = piece.transform.scale;
        self.cancel_interaction(id);
        if let Some(p) = self.store.piece_mut(&id) {
            p.blocks_raycasts = false;
        }
        self.effects.push(Consume::new(id, scale, CONSUME_DURATION));
        tracing::info!(%id, "piece consumed");
        true
    }

    /// The host destroyed a piece. Every reference to it is dropped.
    pub fn destroy_piece(&mut self, id: PieceId) -> Vec<Action> {
        self.cancel_interaction(id);
        self.stack.forget(id);
        self.placed.remove(&id);
        self.effects.retain(|e| e.piece() != id);
        if self.store.destroy_piece(&id).is_none() {
            return Vec::new();
        }
        self.progress.note_removal();
        tracing::info!(%id, "piece destroyed");
        vec![Action::PieceRemoved { id }, Action::RenderNeeded]
    }

    fn cancel_interaction(&mut self, id: PieceId) {
        if self.drag.cancel(id) && self.stack.lifted().is_some_and(|(l, _)| l == id) {
            self.stack.restore(&mut self.store);
        }
        if self.tool.target() == Some(id) {
            self.tool.clear_target();
        }
    }

    // --- Debug override ---

    /// Lock every tracked piece, end the level and report the maximum rating
    /// after a short delay. Never reached from gameplay. Pieces already being
    /// consumed keep shrinking and end up `Removed`. A second call, or a call
    /// after the result went out, does nothing.
    pub fn force_complete_level(&mut self) -> Vec<Action> {
        if !self.progress.can_force() {
            return Vec::new();
        }
        let consuming: Vec<PieceId> = self.effects.iter().map(Consume::piece).collect();
        let mut actions = vec![Action::Feedback(Cue::LockToggled)];
        for id in self.progress.tracked_ids(&self.store) {
            if consuming.contains(&id) {
                continue;
            }
            self.cancel_interaction(id);
            if !self.store.piece(&id).is_some_and(Draggable::is_interactive) {
                continue;
            }
            let slot = self.free_slot_for(id);
            let locked = match slot {
                Some(slot) => validate::commit(&mut self.store, id, slot),
                None => self.store.piece_mut(&id).is_some_and(Draggable::lock),
            };
            if locked {
                if let Some(slot) = slot {
                    self.placed.insert(id, slot);
                }
                actions.push(Action::PieceLocked { id, slot });
            }
        }
        self.progress.force_complete(&self.store, &consuming);
        tracing::warn!(locked = actions.len() - 1, "level completion forced");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The bound slot, or the first unoccupied slot with the piece's tag.
    fn free_slot_for(&self, id: PieceId) -> Option<SlotId> {
        let piece = self.store.piece(&id)?;
        if let Some(bound) = piece.target {
            return Some(bound).filter(|s| self.store.slot(s).is_some());
        }
        let occupied: HashSet<SlotId> = self.placed.values().copied().collect();
        self.store.slots_for_tag(&piece.tag).map(|s| s.id).find(|s| !occupied.contains(s))
    }

    // --- Frame ---

    /// Advance one frame: camera, transform tool, obstacles and effects
    /// first, then the progress poll over the settled state.
    pub fn tick(&mut self, dt: f64) -> Vec<Action> {
        let dt = dt.max(0.0);
        self.clock += dt;
        let mut actions = Vec::new();

        self.camera.tick(dt, &mut self.clamper);

        if let Some((id, transform)) = self.tool.step(dt, &mut self.store) {
            actions.push(Action::PieceTransformed { id, transform });
        }

        self.tick_obstacles(dt, &mut actions);
        self.tick_effects(dt, &mut actions);

        for id in self.drag.prune(&self.store) {
            tracing::debug!(%id, "stale drag session dropped");
        }

        if let Some(result) = self.progress.tick(dt, &self.store) {
            tracing::info!(
                stars = result.stars,
                locked = result.locked,
                total = result.total,
                "level result delivered"
            );
            actions.push(Action::LevelComplete(result));
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn tick_obstacles(&mut self, dt: f64, actions: &mut Vec<Action>) {
        if self.obstacles.is_empty() {
            return;
        }
        let mut probes: Vec<PointerProbe> =
            self.drag.active().map(|(id, s)| PointerProbe { world: s.pointer, dragging: Some(id) }).collect();
        if let Some(world) = self.bare_pointer {
            probes.push(PointerProbe { world, dragging: None });
        }
        let world = self.clamper.world();
        for event in self.obstacles.tick(dt, &world, &probes) {
            match event {
                ObstacleEvent::PieceHit { obstacle, piece } => {
                    tracing::info!(%obstacle, %piece, "dragged piece hit an obstacle");
                    actions.push(Action::Feedback(Cue::ObstacleHit));
                    self.consume_piece(piece);
                }
                ObstacleEvent::Exploded { obstacle } => {
                    tracing::info!(%obstacle, "bomb exploded");
                    actions.push(Action::Feedback(Cue::Explosion));
                }
                ObstacleEvent::Gone { obstacle } => actions.push(Action::ObstacleGone { id: obstacle }),
            }
        }
    }

    fn tick_effects(&mut self, dt: f64, actions: &mut Vec<Action>) {
        let mut finished = Vec::new();
        self.effects.retain_mut(|fx| match fx.step(dt, &mut self.store) {
            EffectStep::Running => {
                if let Some(p) = self.store.piece(&fx.piece()) {
                    actions.push(Action::PieceTransformed { id: p.id, transform: p.transform });
                }
                true
            }
            EffectStep::Finished(id) => {
                finished.push(id);
                false
            }
            EffectStep::Orphaned => false,
        });
        for id in finished {
            self.stack.forget(id);
            self.placed.remove(&id);
            actions.push(Action::PieceRemoved { id });
        }
    }
}
