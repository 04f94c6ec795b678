//! Level files.
//!
//! A level is plain data: world rectangle, slots, pieces, pegs, obstacles and
//! scoring rules, read from YAML or JSON. Every field has a default matching
//! the city level, so a file only spells out what it changes. Loading is
//! two-phase: [`LevelConfig::validate`] rejects malformed levels up front
//! (unknown bindings, tags without a success cue, inverted star limits), then
//! [`LevelConfig::build`] registers everything with a fresh [`EngineCore`].

#[cfg(test)]
#[path = "level_test.rs"]
mod level_test;

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::bounds::BoundsClamper;
use crate::camera::Camera;
use crate::consts::{
    DEFAULT_MAX_TRACKED, DEFAULT_OBJECT_PADDING, DEFAULT_PIECE_SIZE, DEFAULT_VIEWPORT, DEFAULT_WORLD, MAX_ZOOM,
};
use crate::engine::EngineCore;
use crate::feedback::CueTable;
use crate::geom::{Point, Rect, Scale, Size, Transform};
use crate::obstacle::ObstacleSpec;
use crate::piece::{Draggable, SlotId, Tag, TargetSlot, Tolerances};
use crate::progress::{ProgressTracker, StarThresholds};
use crate::spawn::{Scatter, ScatterConfig};
use crate::stack::{Peg, StackBoard, StackError};

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world rectangle has no area")]
    InvalidWorld,
    #[error("{0} has a non-positive size")]
    NonPositiveSize(String),
    #[error("{0} has no position and the level has no scatter area")]
    Unpositioned(String),
    #[error("duplicate slot name: {0}")]
    DuplicateSlot(String),
    #[error("piece binds to unknown slot: {0}")]
    UnknownSlot(String),
    #[error("piece tagged {piece} binds to slot {slot} tagged {slot_tag}")]
    SlotTagMismatch { piece: Tag, slot: String, slot_tag: Tag },
    #[error("no success cue for tags: {0:?}")]
    MissingCue(Vec<Tag>),
    #[error("unknown peg: {0}")]
    UnknownPeg(String),
    #[error("three-star time {three} exceeds two-star time {two}")]
    InvertedStars { three: f64, two: f64 },
    #[error("max_tracked must be at least 1")]
    NothingTracked,
    #[error(transparent)]
    Stack(#[from] StackError),
}

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// `None` centers on the world.
    pub center: Option<Point>,
    pub half_height: f64,
    pub viewport: Size,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let (width, height) = DEFAULT_VIEWPORT;
        Self { center: None, half_height: MAX_ZOOM, viewport: Size::new(width, height) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Referenced by piece bindings.
    pub name: String,
    pub tag: Tag,
    /// `None` draws a point from the scatter area.
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default = "default_size")]
    pub size: Size,
    #[serde(default)]
    pub tolerances: Tolerances,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceConfig {
    pub tag: Tag,
    /// `None` draws a point from the scatter area. Ignored for blocks.
    #[serde(default)]
    pub origin: Option<Point>,
    #[serde(default = "default_size")]
    pub size: Size,
    /// Name of the one slot this piece may occupy.
    #[serde(default)]
    pub slot: Option<String>,
    /// Peg the piece starts stacked on, making it a block.
    #[serde(default)]
    pub peg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegConfig {
    pub name: String,
    pub base: Point,
}

/// A whole level as found on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub world: Rect,
    pub object_padding: f64,
    pub max_tracked: usize,
    pub stars: StarThresholds,
    pub camera: CameraConfig,
    /// Extra cues merged over the built-in vehicle table.
    pub cues: CueTable,
    pub slots: Vec<SlotConfig>,
    pub pieces: Vec<PieceConfig>,
    pub pegs: Vec<PegConfig>,
    /// Defaults to the last peg.
    pub goal_peg: Option<String>,
    pub obstacles: Vec<ObstacleSpec>,
    pub scatter: Option<ScatterConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let (x, y, w, h) = DEFAULT_WORLD;
        Self {
            name: "untitled".to_owned(),
            world: Rect::from_origin_size(x, y, w, h),
            object_padding: DEFAULT_OBJECT_PADDING,
            max_tracked: DEFAULT_MAX_TRACKED,
            stars: StarThresholds::default(),
            camera: CameraConfig::default(),
            cues: CueTable::new(),
            slots: Vec::new(),
            pieces: Vec::new(),
            pegs: Vec::new(),
            goal_peg: None,
            obstacles: Vec::new(),
            scatter: None,
        }
    }
}

fn default_size() -> Size {
    Size::new(DEFAULT_PIECE_SIZE, DEFAULT_PIECE_SIZE)
}

fn is_positive(size: Size) -> bool {
    size.width > 0.0 && size.height > 0.0
}

impl LevelConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, LevelError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Built-in vehicle cues with this level's entries on top.
    #[must_use]
    pub fn cue_table(&self) -> CueTable {
        let mut table = CueTable::vehicles();
        table.extend(&self.cues);
        table
    }

    /// Check the level without building it.
    pub fn validate(&self) -> Result<(), LevelError> {
        let world = self.world.normalized();
        if world.width() <= 0.0 || world.height() <= 0.0 {
            return Err(LevelError::InvalidWorld);
        }
        if self.stars.three_star_time > self.stars.two_star_time {
            return Err(LevelError::InvertedStars { three: self.stars.three_star_time, two: self.stars.two_star_time });
        }
        if self.max_tracked == 0 {
            return Err(LevelError::NothingTracked);
        }

        let mut slot_tags: HashMap<&str, &Tag> = HashMap::new();
        for slot in &self.slots {
            if !is_positive(slot.size) {
                return Err(LevelError::NonPositiveSize(format!("slot {}", slot.name)));
            }
            if slot.position.is_none() && self.scatter.is_none() {
                return Err(LevelError::Unpositioned(format!("slot {}", slot.name)));
            }
            if slot_tags.insert(&slot.name, &slot.tag).is_some() {
                return Err(LevelError::DuplicateSlot(slot.name.clone()));
            }
        }

        let pegs: HashSet<&str> = self.pegs.iter().map(|p| p.name.as_str()).collect();
        if let Some(goal) = &self.goal_peg {
            if !pegs.contains(goal.as_str()) {
                return Err(LevelError::UnknownPeg(goal.clone()));
            }
        }

        for (i, piece) in self.pieces.iter().enumerate() {
            if !is_positive(piece.size) {
                return Err(LevelError::NonPositiveSize(format!("piece {i} ({})", piece.tag)));
            }
            if let Some(peg) = &piece.peg {
                if !pegs.contains(peg.as_str()) {
                    return Err(LevelError::UnknownPeg(peg.clone()));
                }
            } else if piece.origin.is_none() && self.scatter.is_none() {
                return Err(LevelError::Unpositioned(format!("piece {i} ({})", piece.tag)));
            }
            if let Some(name) = &piece.slot {
                let Some(slot_tag) = slot_tags.get(name.as_str()) else {
                    return Err(LevelError::UnknownSlot(name.clone()));
                };
                if **slot_tag != piece.tag {
                    return Err(LevelError::SlotTagMismatch {
                        piece: piece.tag.clone(),
                        slot: name.clone(),
                        slot_tag: (*slot_tag).clone(),
                    });
                }
            }
        }

        let missing = self.cue_table().missing(self.pieces.iter().map(|p| &p.tag));
        if !missing.is_empty() {
            return Err(LevelError::MissingCue(missing));
        }
        Ok(())
    }

    /// Validate, then build a ready-to-run engine. `seed` drives the scatter
    /// layout, so the same seed always yields the same level.
    pub fn build(&self, seed: u64) -> Result<EngineCore, LevelError> {
        self.validate()?;

        let world = self.world.normalized();
        let clamper = BoundsClamper::with_padding(world, self.object_padding);
        let progress = ProgressTracker::new(self.max_tracked, self.stars);
        let mut engine = EngineCore::with_parts(clamper, progress, self.cue_table());
        let cam = &self.camera;
        engine.camera = Camera::new(
            cam.center.unwrap_or_else(|| world.center()),
            cam.half_height,
            cam.viewport.width,
            cam.viewport.height,
        );

        let mut scatter = self.scatter.map(|c| Scatter::new(c, StdRng::seed_from_u64(seed)));
        let mut place = |given: Option<Point>, what: String| {
            given
                .or_else(|| scatter.as_mut().map(Scatter::next_point))
                .ok_or(LevelError::Unpositioned(what))
        };

        let mut slot_ids: HashMap<&str, SlotId> = HashMap::new();
        for slot in &self.slots {
            let position = place(slot.position, format!("slot {}", slot.name))?;
            let reference = Transform::new(position, slot.rotation, slot.scale);
            let id = engine.register_slot(TargetSlot::new(slot.tag.clone(), reference, slot.size, slot.tolerances));
            slot_ids.insert(&slot.name, id);
        }

        let mut board = StackBoard::default();
        for peg in &self.pegs {
            board.add_peg(Peg::new(peg.name.clone(), peg.base));
        }
        if let Some(goal) = &self.goal_peg {
            board.set_goal(goal)?;
        }

        let mut blocks = Vec::new();
        for (i, cfg) in self.pieces.iter().enumerate() {
            let base = cfg.peg.as_ref().and_then(|name| self.pegs.iter().find(|p| &p.name == name)).map(|p| p.base);
            let origin = match base {
                Some(base) => base,
                None => place(cfg.origin, format!("piece {i} ({})", cfg.tag))?,
            };
            let mut piece = Draggable::new(cfg.tag.clone(), origin, cfg.size);
            piece.target = cfg.slot.as_deref().and_then(|name| slot_ids.get(name).copied());
            let id = engine.register_piece(piece);
            if let Some(peg) = &cfg.peg {
                blocks.push((peg.as_str(), id));
            }
        }

        engine.set_stack_board(board);
        let (board, store) = engine.stack_and_store_mut();
        for (peg, id) in blocks {
            board.stack(store, peg, id)?;
        }

        for spec in &self.obstacles {
            engine.spawn_obstacle(*spec);
        }

        tracing::info!(
            name = %self.name,
            seed,
            pieces = self.pieces.len(),
            slots = self.slots.len(),
            pegs = self.pegs.len(),
            obstacles = self.obstacles.len(),
            "level loaded"
        );
        Ok(engine)
    }
}
