use placement::level::LevelConfig;
use placement::progress::Completion;

use super::*;

const CITY: &str = include_str!("../levels/city.yaml");
const HANOI: &str = include_str!("../levels/hanoi.yaml");

fn run(engine: &mut EngineCore) -> (usize, Vec<Action>) {
    let mut log = Vec::new();
    let drags = Autoplay::new(1.0 / 60.0, 4, |a| log.push(a)).play(engine);
    (drags, log)
}

// --- Move generation ---

#[test]
fn hanoi_move_count_is_minimal() {
    for n in 0..6 {
        let mut moves = Vec::new();
        hanoi_moves(n, 0, 2, 1, &mut moves);
        assert_eq!(moves.len(), (1 << n) - 1);
    }
}

#[test]
fn hanoi_two_blocks() {
    let mut moves = Vec::new();
    hanoi_moves(2, 0, 2, 1, &mut moves);
    assert_eq!(moves, vec![(0, 1), (0, 2), (1, 2)]);
}

// --- Playing ---

#[test]
fn city_is_fully_placed() {
    let mut engine = LevelConfig::from_yaml_str(CITY).unwrap().build(1).unwrap();
    let (drags, log) = run(&mut engine);
    assert_eq!(drags, 12);
    assert_eq!(log.iter().filter(|a| matches!(a, Action::PieceLocked { .. })).count(), 12);
    assert!(engine.progress().ended);
}

#[test]
fn tower_is_solved() {
    let mut engine = LevelConfig::from_yaml_str(HANOI).unwrap().build(0).unwrap();
    let (drags, _) = run(&mut engine);
    assert_eq!(drags, 7);
    assert!(engine.stack().is_solved());

    let mut result = None;
    let mut autoplay = Autoplay::new(0.1, 1, |a| {
        if let Action::LevelComplete(r) = a {
            result = Some(r);
        }
    });
    for _ in 0..20 {
        autoplay.tick(&mut engine);
    }
    drop(autoplay);
    assert_eq!(result.map(|r| r.completion), Some(Completion::Organic));
}
