//! Placement validation: does a released piece match a target slot?
//!
//! [`validate`] is a pure function of the release snapshot and the slot
//! configuration. It never looks at history, time or randomness, so the same
//! inputs always give the same [`Verdict`]. Committing an accepted verdict
//! (snap, raise, lock) is a separate step, [`commit`].

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::collections::HashSet;

use crate::drag::DragContext;
use crate::geom::{Point, Size, Transform, circular_delta};
use crate::piece::{PieceId, PieceStore, SlotId, Tag, TargetSlot};

/// Outcome of each individual acceptance check against one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Checks {
    pub distance: bool,
    pub rotation: bool,
    pub scale: bool,
    pub overlap: bool,
    pub tag: bool,
}

impl Checks {
    /// Run every check of a piece (`tag`, `size`, `transform`) against `slot`.
    #[must_use]
    pub fn evaluate(tag: &Tag, size: Size, transform: &Transform, slot: &TargetSlot) -> Self {
        let tol = &slot.tolerances;
        let reference = &slot.reference;
        Self {
            distance: transform.position.distance(reference.position) <= tol.max_distance,
            rotation: circular_delta(transform.rotation, reference.rotation) <= tol.max_rotation_delta,
            scale: transform.scale.max_axis_delta(reference.scale) <= tol.max_scale_delta,
            overlap: transform.bounds(size).overlaps(&slot.bounds()),
            tag: *tag == slot.tag,
        }
    }

    #[must_use]
    pub fn all_pass(&self) -> bool {
        self.distance && self.rotation && self.scale && self.overlap && self.tag
    }

    /// Names of the failed checks, for logging.
    #[must_use]
    pub fn failures(&self) -> Vec<&'static str> {
        [
            (self.distance, "distance"),
            (self.rotation, "rotation"),
            (self.scale, "scale"),
            (self.overlap, "overlap"),
            (self.tag, "tag"),
        ]
        .into_iter()
        .filter_map(|(ok, name)| if ok { None } else { Some(name) })
        .collect()
    }
}

/// Result of validating one release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted { slot: SlotId },
    /// `checks` are those of the nearest candidate; `None` when there was no
    /// candidate slot at all.
    Rejected { checks: Option<Checks> },
}

impl Verdict {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Candidate slots for a released piece, in registration order: the bound
/// slot when the piece has one, otherwise every slot sharing its tag.
/// Slots in `occupied` are never candidates.
#[must_use]
pub fn candidates<'a>(ctx: &DragContext, slots: &'a [TargetSlot], occupied: &HashSet<SlotId>) -> Vec<&'a TargetSlot> {
    slots
        .iter()
        .filter(|s| !occupied.contains(&s.id))
        .filter(|s| match ctx.target {
            Some(bound) => s.id == bound,
            None => s.tag == ctx.tag,
        })
        .collect()
}

/// Decide whether the release described by `ctx` lands on a slot.
///
/// The first candidate (registration order) passing every check wins.
#[must_use]
pub fn validate(ctx: &DragContext, slots: &[TargetSlot], occupied: &HashSet<SlotId>) -> Verdict {
    let found = candidates(ctx, slots, occupied);
    let mut nearest: Option<(f64, Checks)> = None;
    for slot in found {
        let checks = Checks::evaluate(&ctx.tag, ctx.size, &ctx.transform, slot);
        if checks.all_pass() {
            return Verdict::Accepted { slot: slot.id };
        }
        let d = ctx.transform.position.distance(slot.reference.position);
        if nearest.is_none_or(|(best, _)| d < best) {
            nearest = Some((d, checks));
        }
    }
    Verdict::Rejected { checks: nearest.map(|(_, c)| c) }
}

/// Snap a piece exactly onto `slot`'s reference transform, raise it beneath
/// the overlay and lock it. Returns `false` when the piece or slot is
/// missing or the piece was not `Unplaced`.
pub fn commit(store: &mut PieceStore, piece: PieceId, slot: SlotId) -> bool {
    let Some(reference) = store.slot(&slot).map(|s| s.reference) else {
        return false;
    };
    let Some(p) = store.piece_mut(&piece) else {
        return false;
    };
    if !p.is_interactive() {
        return false;
    }
    p.transform = reference;
    p.lock();
    store.raise_near_front(piece);
    true
}

/// Send a rejected piece back to its spawn coordinate. Returns where it went.
pub fn reject(store: &mut PieceStore, piece: PieceId) -> Option<Point> {
    let p = store.piece_mut(&piece)?;
    p.return_to_origin();
    Some(p.origin)
}
