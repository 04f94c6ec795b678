#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::feedback::SuccessCue;
use crate::progress::Completion;
use crate::stack::Peg;

const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn screen(engine: &EngineCore, x: f64, y: f64) -> Point {
    engine.camera.world_to_screen(Point::new(x, y))
}

fn slot_at(engine: &mut EngineCore, tag: &str, x: f64, y: f64) -> SlotId {
    engine.register_target_slot(Tag::from(tag), Transform::at(Point::new(x, y)), Tolerances::default())
}

/// Press on the piece center and release with the pointer at `(x, y)`.
fn drag_piece(engine: &mut EngineCore, id: PieceId, x: f64, y: f64) -> Vec<Action> {
    let from = engine.store.piece(&id).unwrap().transform.position;
    let down = screen(engine, from.x, from.y);
    let up = screen(engine, x, y);
    let mut actions = engine.on_pointer_down(id, down);
    actions.extend(engine.on_pointer_up(id, up));
    actions
}

fn run_until_complete(engine: &mut EngineCore, dt: f64, max_ticks: usize) -> Option<LevelResult> {
    (0..max_ticks).find_map(|_| {
        engine.tick(dt).into_iter().find_map(|a| match a {
            Action::LevelComplete(result) => Some(result),
            _ => None,
        })
    })
}

fn lifecycle(engine: &EngineCore, id: PieceId) -> Lifecycle {
    engine.store.piece(&id).unwrap().lifecycle()
}

// --- Placement ---

#[test]
fn correct_drop_locks_and_plays_vehicle_cue() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    let slot = slot_at(&mut engine, "bus", 200.0, 100.0);

    let actions = drag_piece(&mut engine, piece, 210.0, 95.0);

    assert_eq!(actions[0], Action::Feedback(Cue::DragStarted));
    assert!(actions.contains(&Action::Feedback(Cue::DragEnded)));
    assert!(actions.contains(&Action::Feedback(Cue::Success(SuccessCue::Bus))));
    assert!(actions.contains(&Action::PieceLocked { id: piece, slot: Some(slot) }));
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Locked);
    assert_eq!(engine.placed_slot(piece), Some(slot));
    let p = engine.store.piece(&piece).unwrap();
    assert!(approx_eq(p.transform.position.x, 200.0));
    assert!(approx_eq(p.transform.position.y, 100.0));
    assert!(!p.blocks_raycasts);
}

#[test]
fn far_drop_returns_to_origin() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);

    let actions = drag_piece(&mut engine, piece, 0.0, -200.0);

    assert!(actions.contains(&Action::Feedback(Cue::Rejected)));
    assert!(actions.contains(&Action::PieceReturned { id: piece, position: Point::new(-300.0, 0.0) }));
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Unplaced);
    assert_eq!(engine.store.piece(&piece).unwrap().transform.position, Point::new(-300.0, 0.0));
}

#[test]
fn tag_mismatch_is_rejected() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("police"), Point::new(-300.0, 0.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);

    let actions = drag_piece(&mut engine, piece, 200.0, 100.0);

    assert!(actions.contains(&Action::Feedback(Cue::Rejected)));
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Unplaced);
}

#[test]
fn bound_piece_only_accepts_its_slot() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    let near = slot_at(&mut engine, "bus", 0.0, 0.0);
    let bound = slot_at(&mut engine, "bus", 300.0, 200.0);
    assert!(engine.bind(piece, bound));

    drag_piece(&mut engine, piece, 0.0, 0.0);
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Unplaced);

    drag_piece(&mut engine, piece, 300.0, 200.0);
    assert_eq!(engine.placed_slot(piece), Some(bound));
    assert_ne!(engine.placed_slot(piece), Some(near));
}

#[test]
fn bind_refuses_unknown_ids() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    assert!(!engine.bind(piece, Uuid::new_v4()));
    let slot = slot_at(&mut engine, "bus", 0.0, 0.0);
    assert!(!engine.bind(Uuid::new_v4(), slot));
}

#[test]
fn occupied_slot_rejects_second_piece() {
    let mut engine = EngineCore::default();
    let first = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    let second = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, -300.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);

    drag_piece(&mut engine, first, 200.0, 100.0);
    let actions = drag_piece(&mut engine, second, 200.0, 100.0);

    assert_eq!(lifecycle(&engine, first), Lifecycle::Locked);
    assert_eq!(lifecycle(&engine, second), Lifecycle::Unplaced);
    assert!(actions.contains(&Action::Feedback(Cue::Rejected)));
}

#[test]
fn locked_piece_refuses_drag() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);
    drag_piece(&mut engine, piece, 200.0, 100.0);

    let down = screen(&engine, 200.0, 100.0);
    assert!(engine.on_pointer_down(piece, down).is_empty());
    assert!(!engine.is_dragging(piece));
}

#[test]
fn release_without_press_is_a_no_op() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    let up = screen(&engine, 100.0, 0.0);
    assert!(engine.on_pointer_up(piece, up).is_empty());
    assert_eq!(engine.store.piece(&piece).unwrap().transform.position, Point::new(0.0, 0.0));
}

#[test]
fn move_emits_clamped_position() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0));

    let actions = engine.on_pointer_move(piece, Point::new(-5000.0, 540.0));
    let area = engine.clamper().object_area();
    let Some(Action::PieceMoved { position, .. }) = actions.first() else {
        panic!("expected a move, got {actions:?}");
    };
    assert!(approx_eq(position.x, area.min_x));
}

#[test]
fn pointer_down_at_grabs_topmost_piece() {
    let mut engine = EngineCore::default();
    engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    let top = engine.register_draggable(Tag::from("bus"), Point::new(20.0, 0.0));

    let (grabbed, actions) = engine.on_pointer_down_at(screen(&engine, 10.0, 0.0));
    assert_eq!(grabbed, Some(top));
    assert!(actions.contains(&Action::Feedback(Cue::DragStarted)));
    assert_eq!(engine.transform_target(), Some(top));
}

#[test]
fn pointer_down_at_empty_space_grabs_nothing() {
    let mut engine = EngineCore::default();
    engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    let (grabbed, actions) = engine.on_pointer_down_at(screen(&engine, 400.0, 300.0));
    assert_eq!(grabbed, None);
    assert!(actions.is_empty());
}

// --- Transform tool ---

#[test]
fn held_rotate_turns_selected_piece() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0));
    engine.hold_transform(TransformInput { rotate: 1.0, ..TransformInput::default() });

    let actions = engine.tick(1.0);

    let p = engine.store.piece(&piece).unwrap();
    assert!(approx_eq(p.transform.rotation, 45.0));
    assert!(actions.iter().any(|a| matches!(a, Action::PieceTransformed { id, .. } if *id == piece)));

    engine.release_transform();
    engine.tick(1.0);
    assert!(approx_eq(engine.store.piece(&piece).unwrap().transform.rotation, 45.0));
}

#[test]
fn locking_clears_transform_target() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);
    drag_piece(&mut engine, piece, 200.0, 100.0);
    assert_eq!(engine.transform_target(), None);
}

// --- Progress ---

#[test]
fn idle_tick_is_silent() {
    let mut engine = EngineCore::default();
    engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    assert!(engine.tick(0.016).is_empty());
}

#[test]
fn last_lock_completes_after_report_delay() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    slot_at(&mut engine, "bus", 200.0, 100.0);
    engine.tick(0.1);
    drag_piece(&mut engine, piece, 200.0, 100.0);

    engine.tick(0.1);
    assert!(engine.progress().ended);
    assert!(engine.result().is_none());

    let result = run_until_complete(&mut engine, 0.1, 20).unwrap();
    assert_eq!(result.stars, 3);
    assert_eq!(result.locked, 1);
    assert_eq!(result.total, 1);
    assert_eq!(result.completion, Completion::Organic);
    assert_eq!(engine.result(), Some(result));
}

#[test]
fn input_is_refused_after_level_ends() {
    let mut engine = EngineCore::default();
    let a = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    let b = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, -300.0));
    engine.force_complete_level();
    assert!(engine.on_pointer_down(a, screen(&engine, -300.0, 0.0)).is_empty());
    assert_eq!(lifecycle(&engine, b), Lifecycle::Locked);
}

#[test]
fn force_complete_locks_tracked_pieces_and_reports_max_stars() {
    let mut engine = EngineCore::default();
    let a = engine.register_draggable(Tag::from("bus"), Point::new(-300.0, 0.0));
    let b = engine.register_draggable(Tag::from("police"), Point::new(-300.0, -300.0));
    let slot = slot_at(&mut engine, "bus", 200.0, 100.0);

    let actions = engine.force_complete_level();

    assert_eq!(actions[0], Action::Feedback(Cue::LockToggled));
    assert!(actions.contains(&Action::PieceLocked { id: a, slot: Some(slot) }));
    assert!(actions.contains(&Action::PieceLocked { id: b, slot: None }));
    assert_eq!(engine.store.piece(&a).unwrap().transform.position, Point::new(200.0, 100.0));
    assert_eq!(engine.store.piece(&b).unwrap().transform.position, Point::new(-300.0, -300.0));

    let result = run_until_complete(&mut engine, 0.1, 10).unwrap();
    assert_eq!(result.stars, 3);
    assert_eq!(result.locked, 2);
    assert_eq!(result.completion, Completion::Forced);
}

#[test]
fn second_force_is_ignored() {
    let mut engine = EngineCore::default();
    engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    assert!(!engine.force_complete_level().is_empty());
    assert!(engine.force_complete_level().is_empty());
}

#[test]
fn force_cancels_active_drag() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0));
    engine.force_complete_level();
    assert!(!engine.is_dragging(piece));
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Locked);
}

// --- Removal ---

#[test]
fn destroying_dragged_piece_cancels_drag() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0));

    let actions = engine.destroy_piece(piece);

    assert!(actions.contains(&Action::PieceRemoved { id: piece }));
    assert!(!engine.is_dragging(piece));
    assert!(engine.on_pointer_move(piece, screen(&engine, 50.0, 0.0)).is_empty());
    assert!(engine.destroy_piece(piece).is_empty());
}

#[test]
fn destroying_every_piece_still_completes() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.tick(0.1);
    engine.destroy_piece(piece);
    let result = run_until_complete(&mut engine, 0.1, 20).unwrap();
    assert_eq!(result.total, 0);
}

#[test]
fn consumed_piece_shrinks_then_is_removed() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    assert!(engine.consume_piece(piece));
    assert!(!engine.consume_piece(piece));

    engine.tick(0.25);
    let half = engine.store.piece(&piece).unwrap().transform.scale;
    assert!(half.x < 1.0 && half.x > 0.0);
    assert!(engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0)).is_empty());

    let actions = engine.tick(0.3);
    assert!(actions.contains(&Action::PieceRemoved { id: piece }));
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Removed);
}

// --- Obstacles ---

fn still_obstacle(x: f64, y: f64, bomb_radius: Option<f64>) -> ObstacleSpec {
    ObstacleSpec {
        position: Point::new(x, y),
        size: Size::new(200.0, 200.0),
        speed: 0.0,
        wave_amplitude: 0.0,
        wave_frequency: 1.0,
        bomb_radius,
    }
}

#[test]
fn obstacle_consumes_dragged_piece() {
    let mut engine = EngineCore::default();
    let piece = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    engine.spawn_obstacle(still_obstacle(0.0, 0.0, None));
    engine.on_pointer_down(piece, screen(&engine, 0.0, 0.0));

    let actions = engine.tick(0.1);
    assert!(actions.contains(&Action::Feedback(Cue::ObstacleHit)));
    assert!(!engine.is_dragging(piece));

    let removed = (0..10).any(|_| engine.tick(0.1).contains(&Action::PieceRemoved { id: piece }));
    assert!(removed);
    assert_eq!(lifecycle(&engine, piece), Lifecycle::Removed);
}

#[test]
fn force_does_not_rescue_a_consumed_piece() {
    let mut engine = EngineCore::default();
    let doomed = engine.register_draggable(Tag::from("bus"), Point::new(0.0, 0.0));
    let other = engine.register_draggable(Tag::from("police"), Point::new(-500.0, -300.0));
    slot_at(&mut engine, "bus", 500.0, 300.0);
    engine.spawn_obstacle(still_obstacle(0.0, 0.0, None));
    engine.on_pointer_down(doomed, screen(&engine, 0.0, 0.0));
    assert!(engine.tick(0.1).contains(&Action::Feedback(Cue::ObstacleHit)));

    let actions = engine.force_complete_level();
    assert!(!actions.iter().any(|a| matches!(a, Action::PieceLocked { id, .. } if *id == doomed)));
    assert!(actions.contains(&Action::PieceLocked { id: other, slot: None }));

    let result = run_until_complete(&mut engine, 0.1, 20).unwrap();
    assert_eq!((result.locked, result.total), (1, 1));
    for _ in 0..10 {
        engine.tick(0.1);
    }
    assert_eq!(lifecycle(&engine, doomed), Lifecycle::Removed);
    assert_eq!(lifecycle(&engine, other), Lifecycle::Locked);
}

#[test]
fn bare_pointer_detonates_bomb() {
    let mut engine = EngineCore::default();
    let bomb = engine.spawn_obstacle(still_obstacle(300.0, 200.0, Some(150.0)));
    let (grabbed, _) = engine.on_pointer_down_at(screen(&engine, 300.0, 200.0));
    assert_eq!(grabbed, None);

    let actions = engine.tick(0.1);
    assert!(actions.contains(&Action::Feedback(Cue::Explosion)));

    engine.on_pointer_hover(None);
    let gone = (0..20).any(|_| engine.tick(0.1).contains(&Action::ObstacleGone { id: bomb }));
    assert!(gone);
    assert!(engine.obstacles().is_empty());
}

// --- Stacking ---

fn hanoi() -> (EngineCore, PieceId, PieceId) {
    let mut engine = EngineCore::default();
    let base = Point::new(-300.0, -200.0);
    let large = engine.register_piece(Draggable::new(Tag::from("block2"), base, Size::new(160.0, 40.0)));
    let small = engine.register_piece(Draggable::new(Tag::from("block1"), base, Size::new(100.0, 40.0)));
    let mut board = StackBoard::default();
    for (name, x) in [("a", -300.0), ("b", 0.0), ("c", 300.0)] {
        board.add_peg(Peg::new(name, Point::new(x, -200.0)));
    }
    engine.set_stack_board(board);
    let (board, store) = engine.stack_and_store_mut();
    board.stack(store, "a", large).unwrap();
    board.stack(store, "a", small).unwrap();
    (engine, large, small)
}

#[test]
fn buried_block_refuses_drag() {
    let (mut engine, large, _) = hanoi();
    let at = engine.store.piece(&large).unwrap().transform.position;
    assert!(engine.on_pointer_down(large, screen(&engine, at.x, at.y)).is_empty());
}

#[test]
fn larger_block_on_smaller_is_returned() {
    let (mut engine, large, small) = hanoi();
    drag_piece(&mut engine, small, 0.0, 0.0);
    let actions = drag_piece(&mut engine, large, 0.0, 0.0);

    assert!(actions.contains(&Action::Feedback(Cue::Rejected)));
    assert_eq!(engine.stack().peg_of(large), Some(0));
    assert_eq!(engine.stack().peg_of(small), Some(1));
}

#[test]
fn solved_tower_locks_blocks_and_completes() {
    let (mut engine, large, small) = hanoi();
    engine.tick(0.1);
    drag_piece(&mut engine, small, 0.0, 0.0);
    drag_piece(&mut engine, large, 300.0, 0.0);
    let actions = drag_piece(&mut engine, small, 300.0, 0.0);

    assert!(actions.contains(&Action::PieceLocked { id: large, slot: None }));
    assert!(actions.contains(&Action::PieceLocked { id: small, slot: None }));
    assert!(engine.stack().is_solved());

    let result = run_until_complete(&mut engine, 0.1, 20).unwrap();
    assert_eq!(result.locked, 2);
    assert_eq!(result.completion, Completion::Organic);
}

// --- Wire format ---

#[test]
fn actions_serialize_snake_case() {
    let json = serde_json::to_value(Action::Feedback(Cue::DragStarted)).unwrap();
    assert!(json.get("feedback").is_some());
    let json = serde_json::to_value(Action::RenderNeeded).unwrap();
    assert_eq!(json, serde_json::json!("render_needed"));
}
