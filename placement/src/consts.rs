//! Shared numeric constants for the placement crate.

// ── World ───────────────────────────────────────────────────────

/// Default world rectangle as `(x, y, width, height)`.
pub const DEFAULT_WORLD: (f64, f64, f64, f64) = (-960.0, -540.0, 1920.0, 1080.0);

/// Fraction of the world width/height kept clear on each side when clamping
/// dragged pieces.
pub const DEFAULT_OBJECT_PADDING: f64 = 0.02;

/// Upper bound accepted for object padding; beyond this the padded rect inverts.
pub const MAX_OBJECT_PADDING: f64 = 0.5;

/// Tolerance used to decide whether camera parameters changed between ticks.
pub const FRAME_EPSILON: f64 = 1e-6;

// ── Placement ───────────────────────────────────────────────────

/// Edge length of a piece or slot registered without an explicit size.
pub const DEFAULT_PIECE_SIZE: f64 = 100.0;

/// Maximum center distance for an accepted placement (UI units).
pub const DEFAULT_MAX_DISTANCE: f64 = 80.0;

/// Maximum circular rotation difference for an accepted placement (degrees).
pub const DEFAULT_MAX_ROTATION_DELTA: f64 = 15.0;

/// Maximum per-axis scale difference for an accepted placement.
pub const DEFAULT_MAX_SCALE_DELTA: f64 = 0.15;

// ── Progress ────────────────────────────────────────────────────

/// Cap on the number of draggables counted toward completion.
pub const DEFAULT_MAX_TRACKED: usize = 12;

/// Elapsed-time limit for three stars (seconds).
pub const DEFAULT_THREE_STAR_TIME: f64 = 30.0;

/// Elapsed-time limit for two stars (seconds).
pub const DEFAULT_TWO_STAR_TIME: f64 = 60.0;

/// Delay between organic completion and the terminal report (seconds).
pub const ORGANIC_REPORT_DELAY: f64 = 1.0;

/// Delay between a forced completion and the terminal report (seconds).
pub const FORCED_REPORT_DELAY: f64 = 0.5;

/// Highest star rating a level can award.
pub const MAX_STARS: u8 = 3;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest camera half-height (most zoomed in).
pub const MIN_ZOOM: f64 = 150.0;

/// Largest camera half-height (most zoomed out).
pub const MAX_ZOOM: f64 = 530.0;

/// Default viewport size in pixels for headless play.
pub const DEFAULT_VIEWPORT: (f64, f64) = (1920.0, 1080.0);

/// World units of half-height removed per pixel of pinch spread.
pub const PINCH_ZOOM_SPEED: f64 = 0.9;

/// Multiplier applied to touch pan deltas.
pub const TOUCH_PAN_SPEED: f64 = 1.0;

/// Two taps closer than this (seconds) form a double tap.
pub const DOUBLE_TAP_MAX_DELAY: f64 = 0.4;

/// Two taps farther apart than this (screen pixels) never form a double tap.
pub const DOUBLE_TAP_MAX_DISTANCE: f64 = 100.0;

/// Duration of the smooth zoom reset started by a double tap (seconds).
pub const ZOOM_RESET_DURATION: f64 = 0.25;

// ── Transform tool ──────────────────────────────────────────────

/// Rotation rate of the transform tool (degrees per second).
pub const ROTATE_SPEED: f64 = 45.0;

/// Scale rate of the transform tool (scale units per second).
pub const SCALE_SPEED: f64 = 0.3;

/// Lower scale bound reachable with the transform tool.
pub const MIN_PIECE_SCALE: f64 = 0.3;

/// Upper scale bound reachable with the transform tool.
pub const MAX_PIECE_SCALE: f64 = 0.9;

// ── Obstacles ───────────────────────────────────────────────────

/// Distance from the far world edge at which a drifting obstacle starts fading.
pub const OBSTACLE_EDGE_MARGIN: f64 = 80.0;

/// Fade-in / fade-out duration for obstacles (seconds).
pub const OBSTACLE_FADE_DURATION: f64 = 1.5;

/// Duration of the shrink-and-spin effect on a consumed piece (seconds).
pub const CONSUME_DURATION: f64 = 0.5;

/// Default vertical wave amplitude of a drifting obstacle (units per second).
pub const DEFAULT_WAVE_AMPLITUDE: f64 = 25.0;

/// Default wave frequency of a drifting obstacle (radians per second).
pub const DEFAULT_WAVE_FREQUENCY: f64 = 1.0;

/// Time between a bomb's first and second blast; the bomb is gone after it.
pub const BOMB_FUSE: f64 = 1.0;

// ── Spawn scatter ───────────────────────────────────────────────

/// Attempts per scattered point before giving up.
pub const SCATTER_MAX_ATTEMPTS: u32 = 100;

/// Failed attempts between two growth steps of the spawn area.
pub const SCATTER_EXPAND_EVERY: u32 = 25;

/// Growth of the spawn area per step, on each side.
pub const SCATTER_EXPAND_STEP: f64 = 50.0;

/// Default minimum spacing between scattered points.
pub const SCATTER_MIN_DISTANCE: f64 = 120.0;

// ── Stacking ────────────────────────────────────────────────────

/// Default radius around a peg within which a released block snaps to it.
pub const PEG_SNAP_TOLERANCE: f64 = 60.0;
