//! Transform tool: rotate and rescale the active piece while its buttons are
//! held.
//!
//! The active piece is the one most recently grabbed that is still
//! `Unplaced`. Inputs are rates in `[-1, 1]` per axis, applied every tick.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PIECE_SCALE, MIN_PIECE_SCALE, ROTATE_SPEED, SCALE_SPEED};
use crate::geom::{Transform, normalize_degrees};
use crate::piece::{PieceId, PieceStore};

/// Held transform buttons. Positive rotate is counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformInput {
    pub rotate: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl TransformInput {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.rotate == 0.0 && self.scale_x == 0.0 && self.scale_y == 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformTool {
    target: Option<PieceId>,
    input: TransformInput,
}

impl TransformTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn target(&self) -> Option<PieceId> {
        self.target
    }

    pub fn set_target(&mut self, id: PieceId) {
        self.target = Some(id);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Replace the held inputs. Each rate is clamped to `[-1, 1]`.
    pub fn hold(&mut self, input: TransformInput) {
        self.input = TransformInput {
            rotate: input.rotate.clamp(-1.0, 1.0),
            scale_x: input.scale_x.clamp(-1.0, 1.0),
            scale_y: input.scale_y.clamp(-1.0, 1.0),
        };
    }

    pub fn release(&mut self) {
        self.input = TransformInput::default();
    }

    #[must_use]
    pub fn input(&self) -> TransformInput {
        self.input
    }

    /// Apply the held inputs for `dt` seconds. Returns the target and its new
    /// transform when something changed. A target that vanished or stopped
    /// being `Unplaced` is dropped.
    pub fn step(&mut self, dt: f64, store: &mut PieceStore) -> Option<(PieceId, Transform)> {
        let id = self.target?;
        let Some(piece) = store.piece_mut(&id).filter(|p| p.is_interactive()) else {
            self.target = None;
            return None;
        };
        if self.input.is_idle() || dt <= 0.0 {
            return None;
        }
        let t = &mut piece.transform;
        t.rotation = normalize_degrees(t.rotation + self.input.rotate * ROTATE_SPEED * dt);
        t.scale.x = scale_axis(t.scale.x, self.input.scale_x, dt);
        t.scale.y = scale_axis(t.scale.y, self.input.scale_y, dt);
        Some((id, *t))
    }
}

/// An axis that is not being changed keeps its value even outside the tool
/// range.
fn scale_axis(current: f64, rate: f64, dt: f64) -> f64 {
    if rate == 0.0 {
        return current;
    }
    (current + rate * SCALE_SPEED * dt).clamp(MIN_PIECE_SCALE, MAX_PIECE_SCALE)
}
