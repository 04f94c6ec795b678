//! Level progress: tracked/locked counters, elapsed time, completion and the
//! star rating.
//!
//! The tracker is polled once per tick after every lock mutation of that
//! tick. Completion ends the level exactly once and freezes time and score;
//! the terminal [`LevelResult`] is then held back for a short delay and
//! delivered once.
//!
//! Tracked pieces are the first `max_tracked` pieces, in registration order,
//! that are not `Removed`. A consumed piece therefore drops out of both
//! counts on the next poll.

#[cfg(test)]
#[path = "progress_test.rs"]
mod progress_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_TRACKED, DEFAULT_THREE_STAR_TIME, DEFAULT_TWO_STAR_TIME, FORCED_REPORT_DELAY, MAX_STARS,
    ORGANIC_REPORT_DELAY,
};
use crate::piece::{Lifecycle, PieceId, PieceStore};

/// Elapsed-time limits for the upper star ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarThresholds {
    pub three_star_time: f64,
    pub two_star_time: f64,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self { three_star_time: DEFAULT_THREE_STAR_TIME, two_star_time: DEFAULT_TWO_STAR_TIME }
    }
}

/// Stars earned for `locked` of `total` pieces after `elapsed` seconds.
///
/// A level with nothing tracked scores zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn star_rating(locked: usize, total: usize, elapsed: f64, thresholds: &StarThresholds) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = locked.min(total) as f64 / total as f64;
    if ratio >= 0.90 && elapsed <= thresholds.three_star_time {
        3
    } else if ratio >= 0.75 && elapsed <= thresholds.two_star_time {
        2
    } else if ratio >= 0.50 {
        1
    } else {
        0
    }
}

/// Per-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProgressState {
    pub total_tracked: usize,
    pub locked: usize,
    /// Seconds since tracking started; frozen once `ended`.
    pub elapsed: f64,
    pub ended: bool,
}

/// How the level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    Organic,
    /// Via the debug override, never through gameplay.
    Forced,
}

/// Terminal payload for the win screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelResult {
    pub stars: u8,
    pub locked: usize,
    pub total: usize,
    pub elapsed: f64,
    pub completion: Completion,
}

#[derive(Debug, Clone, Copy)]
struct PendingReport {
    result: LevelResult,
    remaining: f64,
}

/// Aggregates piece lifecycles into the level outcome.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: ProgressState,
    max_tracked: usize,
    thresholds: StarThresholds,
    started: bool,
    saw_removal: bool,
    forced: bool,
    pending: Option<PendingReport>,
    delivered: Option<LevelResult>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRACKED, StarThresholds::default())
    }
}

impl ProgressTracker {
    #[must_use]
    pub fn new(max_tracked: usize, thresholds: StarThresholds) -> Self {
        Self {
            state: ProgressState::default(),
            max_tracked,
            thresholds,
            started: false,
            saw_removal: false,
            forced: false,
            pending: None,
            delivered: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ProgressState {
        self.state
    }

    #[must_use]
    pub fn max_tracked(&self) -> usize {
        self.max_tracked
    }

    #[must_use]
    pub fn thresholds(&self) -> StarThresholds {
        self.thresholds
    }

    /// The result once it has been delivered.
    #[must_use]
    pub fn delivered(&self) -> Option<LevelResult> {
        self.delivered
    }

    /// Whether a result is waiting for its report delay to run out.
    #[must_use]
    pub fn is_report_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ids of the tracked pieces, in registration order.
    #[must_use]
    pub fn tracked_ids(&self, store: &PieceStore) -> Vec<PieceId> {
        store
            .pieces()
            .filter(|p| p.lifecycle() != Lifecycle::Removed)
            .take(self.max_tracked)
            .map(|p| p.id)
            .collect()
    }

    /// Record that a piece left the level entirely (destroyed by the host).
    /// A level whose every piece was consumed still completes.
    pub fn note_removal(&mut self) {
        self.saw_removal = true;
    }

    /// Recount from the store. Does nothing once the level has ended.
    /// Returns `true` on the poll that ends the level.
    pub fn poll(&mut self, store: &PieceStore) -> bool {
        if self.state.ended {
            return false;
        }
        let mut total = 0;
        let mut locked = 0;
        for piece in store.pieces() {
            match piece.lifecycle() {
                Lifecycle::Removed => self.saw_removal = true,
                lifecycle if total < self.max_tracked => {
                    total += 1;
                    if lifecycle == Lifecycle::Locked {
                        locked += 1;
                    }
                }
                _ => {}
            }
        }
        self.state.total_tracked = total;
        self.state.locked = locked;

        let complete = locked == total && (total > 0 || self.saw_removal);
        if !complete {
            return false;
        }
        self.state.ended = true;
        let stars = star_rating(locked, total, self.state.elapsed, &self.thresholds);
        tracing::info!(stars, locked, total, elapsed = self.state.elapsed, "level complete");
        self.schedule(stars, Completion::Organic, ORGANIC_REPORT_DELAY);
        true
    }

    /// Per-tick update: count down a pending report, poll, then accumulate
    /// time. A lock made during the previous frame's input is scored at that
    /// frame's time. Returns the result on the single tick it is delivered.
    pub fn tick(&mut self, dt: f64, store: &PieceStore) -> Option<LevelResult> {
        if let Some(pending) = self.pending.as_mut() {
            pending.remaining -= dt.max(0.0);
            if pending.remaining <= 0.0 {
                let result = pending.result;
                self.pending = None;
                self.delivered = Some(result);
                return Some(result);
            }
            return None;
        }
        if self.state.ended {
            return None;
        }
        if !self.started && !store.is_empty() {
            self.started = true;
        }
        if self.poll(store) {
            return None;
        }
        if self.started {
            self.state.elapsed += dt.max(0.0);
        }
        None
    }

    /// Whether the forced-completion override would still do anything.
    #[must_use]
    pub fn can_force(&self) -> bool {
        !self.forced && self.delivered.is_none()
    }

    /// Debug override: end the level with every tracked piece counted as
    /// locked and the maximum rating. The caller locks the pieces first.
    /// Pieces in `doomed` are already on their way out and are not counted.
    /// A second call, or a call after the result went out, does nothing.
    pub fn force_complete(&mut self, store: &PieceStore, doomed: &[PieceId]) -> bool {
        if !self.can_force() {
            return false;
        }
        let total = self.tracked_ids(store).iter().filter(|id| !doomed.contains(id)).count();
        self.forced = true;
        self.state.ended = true;
        self.state.total_tracked = total;
        self.state.locked = total;
        tracing::info!(total, elapsed = self.state.elapsed, "level force-completed");
        self.schedule(MAX_STARS, Completion::Forced, FORCED_REPORT_DELAY);
        true
    }

    fn schedule(&mut self, stars: u8, completion: Completion, delay: f64) {
        let result = LevelResult {
            stars,
            locked: self.state.locked,
            total: self.state.total_tracked,
            elapsed: self.state.elapsed,
            completion,
        };
        self.pending = Some(PendingReport { result, remaining: delay });
    }
}
