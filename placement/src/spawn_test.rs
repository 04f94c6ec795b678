use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn scatter(area: Rect, seed: u64) -> Scatter<StdRng> {
    Scatter::new(ScatterConfig::new(area), StdRng::seed_from_u64(seed))
}

#[test]
fn points_stay_inside_roomy_area() {
    let area = Rect::from_origin_size(-400.0, -250.0, 800.0, 500.0);
    let mut s = scatter(area, 1);
    for _ in 0..6 {
        let p = s.next_point();
        assert!(area.contains(p), "{p:?} outside spawn area");
    }
}

#[test]
fn points_respect_minimum_distance() {
    let mut s = scatter(Rect::from_origin_size(-400.0, -250.0, 800.0, 500.0), 2);
    for _ in 0..8 {
        s.next_point();
    }
    let used = s.used();
    for (i, a) in used.iter().enumerate() {
        for b in &used[i + 1..] {
            assert!(a.distance(*b) >= SCATTER_MIN_DISTANCE);
        }
    }
}

#[test]
fn same_seed_same_layout() {
    let area = Rect::from_origin_size(-400.0, -250.0, 800.0, 500.0);
    let mut a = scatter(area, 42);
    let mut b = scatter(area, 42);
    for _ in 0..10 {
        assert_eq!(a.next_point(), b.next_point());
    }
}

#[test]
fn crowded_area_grows() {
    // A 10x10 area fits one point; later points must come from the grown area.
    let area = Rect::from_origin_size(0.0, 0.0, 10.0, 10.0);
    let mut s = scatter(area, 3);
    s.next_point();
    let p = s.next_point();
    assert!(s.used()[0].distance(p) >= SCATTER_MIN_DISTANCE);
    assert!(!area.contains(p));
    let grown = area.expand(SCATTER_EXPAND_STEP * 3.0);
    assert!(grown.contains(p));
}

#[test]
fn exhausted_attempts_still_yield_a_point() {
    let mut config = ScatterConfig::new(Rect::from_origin_size(0.0, 0.0, 1.0, 1.0));
    config.expand_if_crowded = false;
    let mut s = Scatter::new(config, StdRng::seed_from_u64(4));
    s.next_point();
    let p = s.next_point();
    assert!(config.area.contains(p));
    assert_eq!(s.used().len(), 2);
}

#[test]
fn degenerate_area_yields_its_corner() {
    let mut s = scatter(Rect::from_origin_size(5.0, 7.0, 0.0, 0.0), 5);
    assert_eq!(s.next_point(), Point::new(5.0, 7.0));
}
