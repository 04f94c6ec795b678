//! Randomised spawn layout with minimum spacing.
//!
//! Points are drawn uniformly inside a spawn area and rejected when closer
//! than the minimum distance to any point already placed. A crowded area
//! grows every few failed attempts; when every attempt fails the last
//! candidate is used anyway so a level always loads.

#[cfg(test)]
#[path = "spawn_test.rs"]
mod spawn_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{SCATTER_EXPAND_EVERY, SCATTER_EXPAND_STEP, SCATTER_MAX_ATTEMPTS, SCATTER_MIN_DISTANCE};
use crate::geom::{Point, Rect};

/// Scatter parameters, as found in a level file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub area: Rect,
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_expand")]
    pub expand_if_crowded: bool,
}

fn default_min_distance() -> f64 {
    SCATTER_MIN_DISTANCE
}

fn default_expand() -> bool {
    true
}

impl ScatterConfig {
    #[must_use]
    pub fn new(area: Rect) -> Self {
        Self { area: area.normalized(), min_distance: SCATTER_MIN_DISTANCE, expand_if_crowded: true }
    }
}

/// Draws spaced points, remembering every point it handed out.
#[derive(Debug)]
pub struct Scatter<R> {
    config: ScatterConfig,
    rng: R,
    used: Vec<Point>,
}

impl<R: Rng> Scatter<R> {
    pub fn new(config: ScatterConfig, rng: R) -> Self {
        Self { config, rng, used: Vec::new() }
    }

    /// Points handed out so far, in order.
    #[must_use]
    pub fn used(&self) -> &[Point] {
        &self.used
    }

    /// Next spaced point.
    pub fn next_point(&mut self) -> Point {
        let area = self.config.area.normalized();
        let mut grow = 0.0;
        let mut candidate = area.center();
        for attempt in 1..=SCATTER_MAX_ATTEMPTS {
            let r = area.expand(grow);
            candidate = Point::new(self.sample(r.min_x, r.max_x), self.sample(r.min_y, r.max_y));
            if self.is_spaced(candidate) {
                self.used.push(candidate);
                return candidate;
            }
            if self.config.expand_if_crowded && attempt % SCATTER_EXPAND_EVERY == 0 {
                grow += SCATTER_EXPAND_STEP;
            }
        }
        tracing::warn!(
            attempts = SCATTER_MAX_ATTEMPTS,
            x = candidate.x,
            y = candidate.y,
            "no spaced spawn point found; using last candidate"
        );
        self.used.push(candidate);
        candidate
    }

    fn sample(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo { self.rng.random_range(lo..hi) } else { lo }
    }

    fn is_spaced(&self, p: Point) -> bool {
        self.used.iter().all(|u| u.distance(p) >= self.config.min_distance)
    }
}
