//! Feedback cues handed to the host's audio/haptics layer.
//!
//! Cues are a closed set. Success cues are looked up through a [`CueTable`]
//! mapping tags to cue identifiers; the table is checked against the level's
//! tags when the level loads, so a typo in a tag surfaces as a load error
//! instead of a silent default at play time.

#[cfg(test)]
#[path = "feedback_test.rs"]
mod feedback_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::piece::Tag;

/// Per-tag success sound. One entry per vehicle in the city level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessCue {
    Garbage,
    Medicine,
    Fire,
    B2,
    E61,
    E46,
    Excavator,
    Tractor1,
    Tractor2,
    Police,
    Cement,
    Bus,
    /// Used for stacking blocks and any tag without a dedicated sound.
    Generic,
}

/// Something the host should play or vibrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "cue", content = "id")]
pub enum Cue {
    /// Pointer went down on an interactive piece.
    DragStarted,
    /// Pointer released the piece.
    DragEnded,
    /// Placement accepted.
    Success(SuccessCue),
    /// Placement rejected; the piece goes home.
    Rejected,
    /// Lock/unlock state toggled outside normal placement (forced completion).
    LockToggled,
    /// A dragged piece hit an obstacle.
    ObstacleHit,
    /// A bomb obstacle went off.
    Explosion,
}

/// Mapping from piece tag to success cue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueTable {
    entries: BTreeMap<Tag, SuccessCue>,
}

impl CueTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The twelve vehicle tags of the city level.
    #[must_use]
    pub fn vehicles() -> Self {
        let mut table = Self::new();
        for (tag, cue) in [
            ("Garbage", SuccessCue::Garbage),
            ("Medicine", SuccessCue::Medicine),
            ("Fire", SuccessCue::Fire),
            ("b2", SuccessCue::B2),
            ("e61", SuccessCue::E61),
            ("e46", SuccessCue::E46),
            ("eskavators", SuccessCue::Excavator),
            ("tractor1", SuccessCue::Tractor1),
            ("tractor2", SuccessCue::Tractor2),
            ("police", SuccessCue::Police),
            ("cement", SuccessCue::Cement),
            ("bus", SuccessCue::Bus),
        ] {
            table.insert(Tag::from(tag), cue);
        }
        table
    }

    pub fn insert(&mut self, tag: Tag, cue: SuccessCue) {
        self.entries.insert(tag, cue);
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: &CueTable) {
        for (tag, cue) in &other.entries {
            self.entries.insert(tag.clone(), *cue);
        }
    }

    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.entries.contains_key(tag)
    }

    /// Success cue for `tag`, falling back to [`SuccessCue::Generic`].
    #[must_use]
    pub fn success_cue(&self, tag: &Tag) -> Cue {
        Cue::Success(self.entries.get(tag).copied().unwrap_or(SuccessCue::Generic))
    }

    /// Tags from `tags` that have no entry, deduplicated and sorted.
    pub fn missing<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> Vec<Tag> {
        let mut missing: Vec<Tag> = tags.into_iter().filter(|t| !self.contains(t)).cloned().collect();
        missing.sort();
        missing.dedup();
        missing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
