//! Drag-and-drop placement engine for puzzle levels.
//!
//! The player drags tagged pieces onto tagged target slots. A release inside
//! the slot's distance, rotation and scale tolerances locks the piece in
//! place; anything else sends it home. When every tracked piece is locked the
//! level ends and a star rating is reported once.
//!
//! The crate is headless: the host feeds pointer events and `tick(dt)` into
//! [`engine::EngineCore`] and acts on the returned [`engine::Action`]s
//! (moving sprites, playing cues, showing the result).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`] and the [`engine::Action`] stream |
//! | [`level`] | Level files (YAML/JSON) and loading into an engine |
//! | [`piece`] | Pieces, slots, tags, lifecycles and the draw-ordered store |
//! | [`drag`] | Drag sessions and release snapshots |
//! | [`validate`] | Acceptance checks, commit and reject |
//! | [`progress`] | Completion tracking and star rating |
//! | [`bounds`] | World bounds, camera frame and object clamping |
//! | [`camera`] | Orthographic camera and screen-to-world mapping |
//! | [`hit`] | Topmost-piece hit testing |
//! | [`transform`] | Rotate/scale tool for the selected piece |
//! | [`obstacle`] | Drifting obstacles and bombs |
//! | [`stack`] | Ordered-peg stacking variant |
//! | [`spawn`] | Spaced random spawn layout |
//! | [`feedback`] | Audio/haptic cue identifiers |
//! | [`anim`] | Per-tick tweens and the consume effect |
//! | [`geom`] | Points, rectangles and transforms |
//! | [`consts`] | Shared tuning constants |

pub mod anim;
pub mod bounds;
pub mod camera;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod feedback;
pub mod geom;
pub mod hit;
pub mod level;
pub mod obstacle;
pub mod piece;
pub mod progress;
pub mod spawn;
pub mod stack;
pub mod transform;
pub mod validate;
