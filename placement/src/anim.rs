//! Frame-driven tweens and the piece effects built on them.
//!
//! Nothing here blocks or sleeps: every effect advances by the tick's `dt`
//! and reports whether it has finished. Effects hold piece ids, never
//! references, and re-resolve them each tick, so a piece destroyed mid-effect
//! simply ends the effect.

#[cfg(test)]
#[path = "anim_test.rs"]
mod anim_test;

use crate::geom::{Scale, normalize_degrees};
use crate::piece::{PieceId, PieceStore};

/// Elapsed-time fraction over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    elapsed: f64,
    duration: f64,
}

impl Tween {
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self { elapsed: 0.0, duration: duration.max(0.0) }
    }

    /// Advance by `dt` seconds and return the new fraction in `[0, 1]`.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.elapsed += dt.max(0.0);
        self.fraction()
    }

    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.duration <= 0.0 { 1.0 } else { (self.elapsed / self.duration).min(1.0) }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Linear interpolation.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Outcome of advancing an effect by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStep {
    Running,
    /// Finished normally; the piece id is reported for follow-up actions.
    Finished(PieceId),
    /// The target vanished; the effect ended without touching anything.
    Orphaned,
}

/// Shrink a piece to nothing while spinning it one full turn, then remove it.
#[derive(Debug, Clone)]
pub struct Consume {
    piece: PieceId,
    from_scale: Scale,
    tween: Tween,
}

impl Consume {
    #[must_use]
    pub fn new(piece: PieceId, from_scale: Scale, duration: f64) -> Self {
        Self { piece, from_scale, tween: Tween::new(duration) }
    }

    #[must_use]
    pub fn piece(&self) -> PieceId {
        self.piece
    }

    /// Advance and apply to the store. The piece is marked `Removed` on the
    /// final step.
    pub fn step(&mut self, dt: f64, store: &mut PieceStore) -> EffectStep {
        let Some(piece) = store.piece_mut(&self.piece) else {
            return EffectStep::Orphaned;
        };
        let t = self.tween.advance(dt);
        piece.transform.scale = Scale { x: lerp(self.from_scale.x, 0.0, t), y: lerp(self.from_scale.y, 0.0, t) };
        piece.transform.rotation = normalize_degrees(lerp(0.0, 360.0, t));
        if self.tween.is_done() {
            piece.remove();
            return EffectStep::Finished(self.piece);
        }
        EffectStep::Running
    }
}
