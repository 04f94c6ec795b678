//! End-to-end level flows through the public API: load a level file, drive
//! pointer events through the camera mapping, tick until the result arrives.

use placement::engine::{Action, EngineCore};
use placement::feedback::{Cue, SuccessCue};
use placement::geom::Point;
use placement::level::LevelConfig;
use placement::piece::{Lifecycle, PieceId, SlotId};
use placement::progress::{Completion, LevelResult};

const CITY: &str = include_str!("../../levels/city.yaml");
const HANOI: &str = include_str!("../../levels/hanoi.yaml");
const DT: f64 = 1.0 / 60.0;

fn to_screen(engine: &EngineCore, world: Point) -> Point {
    engine.camera.world_to_screen(world)
}

/// Press on the piece, move in a few steps to `target`, release. Ticks
/// between steps like a real frame loop would.
fn drag(engine: &mut EngineCore, id: PieceId, target: Point, log: &mut Vec<Action>) {
    let start = engine.store.piece(&id).unwrap().transform.position;
    log.extend(engine.on_pointer_down(id, to_screen(engine, start)));
    for step in 1..=4 {
        let t = f64::from(step) / 4.0;
        let p = Point::new(start.x + (target.x - start.x) * t, start.y + (target.y - start.y) * t);
        log.extend(engine.on_pointer_move(id, to_screen(engine, p)));
        log.extend(engine.tick(DT));
    }
    log.extend(engine.on_pointer_up(id, to_screen(engine, target)));
    log.extend(engine.tick(DT));
}

fn finish(engine: &mut EngineCore, log: &mut Vec<Action>) -> LevelResult {
    for _ in 0..600 {
        for action in engine.tick(DT) {
            if let Action::LevelComplete(result) = action {
                return result;
            }
            log.push(action);
        }
    }
    panic!("level never completed");
}

fn slot_for(engine: &EngineCore, id: PieceId) -> SlotId {
    let piece = engine.store.piece(&id).unwrap();
    engine.store.slots_for_tag(&piece.tag).next().unwrap().id
}

#[test]
fn city_level_completes_with_three_stars() {
    let level = LevelConfig::from_yaml_str(CITY).unwrap();
    let mut engine = level.build(11).unwrap();
    let mut log = Vec::new();

    let tracked = engine.tracked_ids();
    assert_eq!(tracked.len(), 12);
    for id in tracked {
        let slot = slot_for(&engine, id);
        let target = engine.store.slot(&slot).unwrap().reference.position;
        drag(&mut engine, id, target, &mut log);
        assert_eq!(engine.placed_slot(id), Some(slot));
    }

    let result = finish(&mut engine, &mut log);
    assert_eq!(result.locked, 12);
    assert_eq!(result.total, 12);
    assert_eq!(result.stars, 3);
    assert_eq!(result.completion, Completion::Organic);
    assert!(engine.progress().ended);

    let successes = log.iter().filter(|a| matches!(a, Action::Feedback(Cue::Success(_)))).count();
    assert_eq!(successes, 12);
    assert!(log.contains(&Action::Feedback(Cue::Success(SuccessCue::Excavator))));
    assert!(!log.iter().any(|a| matches!(a, Action::Feedback(Cue::Success(SuccessCue::Generic)))));
}

#[test]
fn city_level_mistakes_do_not_end_the_level() {
    let level = LevelConfig::from_yaml_str(CITY).unwrap();
    let mut engine = level.build(3).unwrap();
    let mut log = Vec::new();
    let id = engine.tracked_ids()[0];
    let origin = engine.store.piece(&id).unwrap().origin;

    drag(&mut engine, id, Point::new(0.0, -500.0), &mut log);

    assert!(log.contains(&Action::Feedback(Cue::Rejected)));
    assert_eq!(engine.store.piece(&id).unwrap().transform.position, origin);
    for _ in 0..120 {
        engine.tick(DT);
    }
    assert!(!engine.progress().ended);
    assert!(engine.result().is_none());
}

#[test]
fn forced_completion_reports_max_stars() {
    let level = LevelConfig::from_yaml_str(CITY).unwrap();
    let mut engine = level.build(5).unwrap();
    let mut log = Vec::new();

    let forced = engine.force_complete_level();
    assert_eq!(forced.iter().filter(|a| matches!(a, Action::PieceLocked { .. })).count(), 12);

    let result = finish(&mut engine, &mut log);
    assert_eq!(result.stars, 3);
    assert_eq!(result.locked, 12);
    assert_eq!(result.completion, Completion::Forced);
    assert!(engine.store.pieces().all(|p| p.lifecycle() == Lifecycle::Locked));
}

#[test]
fn hanoi_tower_solves_in_seven_moves() {
    let level = LevelConfig::from_yaml_str(HANOI).unwrap();
    let mut engine = level.build(0).unwrap();
    let mut log = Vec::new();

    let pegs: Vec<Point> = engine.stack().pegs().iter().map(|p| p.base).collect();
    let moves = [(0, 2), (0, 1), (2, 1), (0, 2), (1, 0), (1, 2), (0, 2)];
    for (from, to) in moves {
        let top = engine.stack().pegs()[from].top().unwrap();
        drag(&mut engine, top, Point::new(pegs[to].x, 0.0), &mut log);
        assert_eq!(engine.stack().peg_of(top), Some(to));
    }
    assert!(engine.stack().is_solved());

    let result = finish(&mut engine, &mut log);
    assert_eq!(result.locked, 3);
    assert_eq!(result.total, 3);
    assert_eq!(result.completion, Completion::Organic);
}
