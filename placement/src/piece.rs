//! Piece model: draggables, target slots, their lifecycle, and the store
//! that owns them for the lifetime of a level.
//!
//! Draggables and slots are kept in registration order so every scan over
//! them (candidate selection, progress polling, forced completion) is
//! deterministic. Draw order is tracked separately with a reserved overlay
//! layer on top, see [`DrawOrder`].

#[cfg(test)]
#[path = "piece_test.rs"]
mod piece_test;

use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_MAX_DISTANCE, DEFAULT_MAX_ROTATION_DELTA, DEFAULT_MAX_SCALE_DELTA};
use crate::geom::{Point, Rect, Size, Transform};

/// Unique identifier for a draggable piece.
pub type PieceId = Uuid;

/// Unique identifier for a target slot.
pub type SlotId = Uuid;

/// Semantic category of a piece or slot. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number embedded in the tag, e.g. `"block3"` → `3`. Used as the
    /// block size in stacking levels.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the tag carries no digits, or more than
    /// fit in a `u32`.
    pub fn size_rank(&self) -> Result<u32, ParseIntError> {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        digits.parse()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Where a draggable is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Interactive and draggable.
    #[default]
    Unplaced,
    /// Correctly placed. No longer draggable, no longer intercepts pointers.
    Locked,
    /// Consumed. Excluded from every count.
    Removed,
}

/// A player-movable piece.
#[derive(Debug, Clone)]
pub struct Draggable {
    pub id: PieceId,
    pub tag: Tag,
    /// Spawn coordinate a rejected placement returns to.
    pub origin: Point,
    /// Unscaled footprint used for overlap and hit tests.
    pub size: Size,
    pub transform: Transform,
    lifecycle: Lifecycle,
    /// Direct 1:1 slot binding; `None` means any slot with the same tag.
    pub target: Option<SlotId>,
    /// Whether the piece intercepts pointer hits.
    pub blocks_raycasts: bool,
}

impl Draggable {
    #[must_use]
    pub fn new(tag: Tag, origin: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag,
            origin,
            size,
            transform: Transform::at(origin),
            lifecycle: Lifecycle::Unplaced,
            target: None,
            blocks_raycasts: true,
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Only `Unplaced` pieces accept drags.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.lifecycle == Lifecycle::Unplaced
    }

    /// Axis-aligned region currently covered by the piece.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.transform.bounds(self.size)
    }

    /// `Unplaced → Locked`. Returns `false` (and changes nothing) when the
    /// piece was not `Unplaced`.
    pub fn lock(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Unplaced {
            return false;
        }
        self.lifecycle = Lifecycle::Locked;
        self.blocks_raycasts = false;
        true
    }

    /// Any state → `Removed`. Returns `false` when already removed.
    pub fn remove(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Removed {
            return false;
        }
        self.lifecycle = Lifecycle::Removed;
        self.blocks_raycasts = false;
        true
    }

    /// Put an unplaced piece back on its spawn coordinate.
    pub fn return_to_origin(&mut self) {
        self.transform.position = self.origin;
        self.blocks_raycasts = true;
    }
}

/// Acceptance tolerances of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub max_distance: f64,
    pub max_rotation_delta: f64,
    pub max_scale_delta: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            max_rotation_delta: DEFAULT_MAX_ROTATION_DELTA,
            max_scale_delta: DEFAULT_MAX_SCALE_DELTA,
        }
    }
}

/// A stationary acceptance zone.
#[derive(Debug, Clone)]
pub struct TargetSlot {
    pub id: SlotId,
    pub tag: Tag,
    /// Transform a correctly placed piece adopts.
    pub reference: Transform,
    pub size: Size,
    pub tolerances: Tolerances,
}

impl TargetSlot {
    #[must_use]
    pub fn new(tag: Tag, reference: Transform, size: Size, tolerances: Tolerances) -> Self {
        Self { id: Uuid::new_v4(), tag, reference, size, tolerances }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.reference.bounds(self.size)
    }
}

/// One entry in the draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Piece(PieceId),
    /// Host-owned overlay (HUD, win panel) that always stays in front.
    Overlay,
}

/// Back-to-front draw order. The last entry is the overlay.
#[derive(Debug, Clone)]
pub struct DrawOrder {
    layers: Vec<Layer>,
}

impl DrawOrder {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: vec![Layer::Overlay] }
    }

    /// Add a piece just beneath the overlay.
    pub fn push(&mut self, id: PieceId) {
        self.raise_near_front(id);
    }

    /// Move a piece directly beneath the overlay: in front of every other
    /// piece but never in front of the overlay.
    pub fn raise_near_front(&mut self, id: PieceId) {
        self.layers.retain(|l| *l != Layer::Piece(id));
        let at = self.layers.len().saturating_sub(1);
        self.layers.insert(at, Layer::Piece(id));
    }

    pub fn remove(&mut self, id: PieceId) {
        self.layers.retain(|l| *l != Layer::Piece(id));
    }

    /// Piece ids back to front.
    pub fn pieces(&self) -> impl DoubleEndedIterator<Item = PieceId> + '_ {
        self.layers.iter().filter_map(|l| match l {
            Layer::Piece(id) => Some(*id),
            Layer::Overlay => None,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

impl Default for DrawOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory store of every piece and slot of a level.
#[derive(Debug, Clone, Default)]
pub struct PieceStore {
    pieces: HashMap<PieceId, Draggable>,
    piece_order: Vec<PieceId>,
    slots: Vec<TargetSlot>,
    draw: DrawOrder,
}

impl PieceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a piece. Re-inserting an id replaces the piece in place.
    pub fn insert_piece(&mut self, piece: Draggable) -> PieceId {
        let id = piece.id;
        if self.pieces.insert(id, piece).is_none() {
            self.piece_order.push(id);
            self.draw.push(id);
        }
        id
    }

    pub fn insert_slot(&mut self, slot: TargetSlot) -> SlotId {
        let id = slot.id;
        self.slots.retain(|s| s.id != id);
        self.slots.push(slot);
        id
    }

    /// Drop a piece entirely (destroyed by the host). Its lifecycle is gone
    /// with it, so it no longer appears in any count.
    pub fn destroy_piece(&mut self, id: &PieceId) -> Option<Draggable> {
        let piece = self.pieces.remove(id)?;
        self.piece_order.retain(|p| p != id);
        self.draw.remove(*id);
        Some(piece)
    }

    #[must_use]
    pub fn piece(&self, id: &PieceId) -> Option<&Draggable> {
        self.pieces.get(id)
    }

    pub fn piece_mut(&mut self, id: &PieceId) -> Option<&mut Draggable> {
        self.pieces.get_mut(id)
    }

    #[must_use]
    pub fn slot(&self, id: &SlotId) -> Option<&TargetSlot> {
        self.slots.iter().find(|s| s.id == *id)
    }

    /// Pieces in registration order.
    pub fn pieces(&self) -> impl Iterator<Item = &Draggable> + '_ {
        self.piece_order.iter().filter_map(|id| self.pieces.get(id))
    }

    /// Piece ids in registration order.
    #[must_use]
    pub fn piece_ids(&self) -> Vec<PieceId> {
        self.piece_order.clone()
    }

    /// Slots in registration order.
    #[must_use]
    pub fn slots(&self) -> &[TargetSlot] {
        &self.slots
    }

    /// Slots whose tag equals `tag`, in registration order.
    pub fn slots_for_tag<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a TargetSlot> + 'a {
        self.slots.iter().filter(move |s| s.tag == *tag)
    }

    /// Move a piece directly beneath the overlay layer.
    pub fn raise_near_front(&mut self, id: PieceId) {
        if self.pieces.contains_key(&id) {
            self.draw.raise_near_front(id);
        }
    }

    #[must_use]
    pub fn draw_order(&self) -> &DrawOrder {
        &self.draw
    }

    /// Pieces front to back, for hit testing.
    pub fn front_to_back(&self) -> impl Iterator<Item = &Draggable> + '_ {
        self.draw.pieces().rev().filter_map(|id| self.pieces.get(&id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
