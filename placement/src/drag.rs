//! Pointer-driven movement of draggable pieces.
//!
//! Each piece is `Idle` or `Dragging`. A drag session records the offset from
//! the pointer to the piece position at grab time; every move keeps that
//! offset rigid and clamps the result into the padded world. Sessions are
//! keyed by piece, so several fingers can drag several pieces at once.
//!
//! Releasing a piece produces a [`DragContext`], a snapshot handed to the
//! placement validator. Nothing here decides acceptance.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::collections::HashMap;

use crate::bounds::BoundsClamper;
use crate::geom::{Point, Size, Transform};
use crate::piece::{PieceId, PieceStore, SlotId, Tag};

/// Live state of one drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// `piece position − pointer world position` at grab time.
    pub offset: Point,
    /// Last pointer world position seen.
    pub pointer: Point,
}

/// What the validator needs to know about a released piece.
#[derive(Debug, Clone, PartialEq)]
pub struct DragContext {
    pub piece: PieceId,
    pub tag: Tag,
    pub size: Size,
    /// Transform at release.
    pub transform: Transform,
    /// Spawn coordinate a rejection returns to.
    pub origin: Point,
    /// Direct slot binding, if any.
    pub target: Option<SlotId>,
}

/// Tracks every active drag session.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    sessions: HashMap<PieceId, DragSession>,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `id` from `pointer`. Refused (returns `false`) when the
    /// piece does not exist, is not `Unplaced`, or is already being dragged.
    /// On success the piece is raised directly beneath the overlay.
    pub fn begin(&mut self, store: &mut PieceStore, id: PieceId, pointer: Point) -> bool {
        if self.sessions.contains_key(&id) {
            return false;
        }
        let Some(piece) = store.piece(&id) else {
            return false;
        };
        if !piece.is_interactive() {
            return false;
        }
        let offset = piece.transform.position - pointer;
        self.sessions.insert(id, DragSession { offset, pointer });
        store.raise_near_front(id);
        true
    }

    /// Move the dragged piece so it follows `pointer`. Returns the new,
    /// clamped position, or `None` when `id` is not being dragged. A session
    /// whose piece vanished is dropped.
    pub fn drag_to(
        &mut self,
        store: &mut PieceStore,
        clamper: &BoundsClamper,
        id: PieceId,
        pointer: Point,
    ) -> Option<Point> {
        let Some(piece) = store.piece_mut(&id) else {
            self.sessions.remove(&id);
            return None;
        };
        let session = self.sessions.get_mut(&id)?;
        session.pointer = pointer;
        let position = clamper.clamp_object_position(pointer + session.offset);
        piece.transform.position = position;
        Some(position)
    }

    /// Release `id`. Returns `None` when there was no session (a no-op
    /// release) or the piece is gone or no longer interactive.
    pub fn end(&mut self, store: &PieceStore, id: PieceId) -> Option<DragContext> {
        self.sessions.remove(&id)?;
        let piece = store.piece(&id)?;
        if !piece.is_interactive() {
            return None;
        }
        Some(DragContext {
            piece: id,
            tag: piece.tag.clone(),
            size: piece.size,
            transform: piece.transform,
            origin: piece.origin,
            target: piece.target,
        })
    }

    /// Drop a session without producing a release. Returns whether one existed.
    pub fn cancel(&mut self, id: PieceId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Drop every session whose piece no longer exists or stopped being
    /// interactive. Returns the cancelled ids.
    pub fn prune(&mut self, store: &PieceStore) -> Vec<PieceId> {
        let stale: Vec<PieceId> = self
            .sessions
            .keys()
            .filter(|id| store.piece(id).is_none_or(|p| !p.is_interactive()))
            .copied()
            .collect();
        for id in &stale {
            self.sessions.remove(id);
        }
        stale
    }

    #[must_use]
    pub fn is_dragging(&self, id: PieceId) -> bool {
        self.sessions.contains_key(&id)
    }

    #[must_use]
    pub fn session(&self, id: PieceId) -> Option<&DragSession> {
        self.sessions.get(&id)
    }

    /// Every active session, in no particular order.
    pub fn active(&self) -> impl Iterator<Item = (PieceId, &DragSession)> + '_ {
        self.sessions.iter().map(|(id, s)| (*id, s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
