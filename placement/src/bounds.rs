//! World bounds and the clamping rules derived from them.
//!
//! `BoundsClamper` owns the immutable world rectangle of a level. It answers
//! two questions: where may the camera center sit for the current zoom, and
//! where may a dragged piece sit. The camera answer depends on the viewport
//! and is cached in a [`CameraFrame`] that is only rebuilt when zoom, aspect
//! or camera position actually changed.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::consts::{DEFAULT_OBJECT_PADDING, FRAME_EPSILON, MAX_OBJECT_PADDING};
use crate::geom::{Point, Rect};

/// Legal range for the camera center, derived from the world and the
/// viewport half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CameraFrame {
    /// Build the frame for a viewport of `half_w` x `half_h` world units.
    ///
    /// On an axis where the whole viewport is at least as large as the world,
    /// the range collapses to the world midpoint.
    #[must_use]
    pub fn derive(world: &Rect, half_w: f64, half_h: f64) -> Self {
        let (min_x, max_x) = axis_range(world.min_x, world.max_x, half_w);
        let (min_y, max_y) = axis_range(world.min_y, world.max_y, half_h);
        Self { min_x, max_x, min_y, max_y }
    }

    /// Whether the camera cannot pan horizontally.
    #[must_use]
    pub fn is_locked_x(&self) -> bool {
        self.max_x <= self.min_x
    }

    /// Whether the camera cannot pan vertically.
    #[must_use]
    pub fn is_locked_y(&self) -> bool {
        self.max_y <= self.min_y
    }
}

fn axis_range(lo: f64, hi: f64, half: f64) -> (f64, f64) {
    if half * 2.0 >= hi - lo {
        let mid = (lo + hi) * 0.5;
        (mid, mid)
    } else {
        (lo + half, hi - half)
    }
}

/// Inputs the cached frame was computed from.
#[derive(Debug, Clone, Copy)]
struct FrameKey {
    half_height: f64,
    aspect: f64,
    position: Point,
}

impl FrameKey {
    fn matches(&self, half_height: f64, aspect: f64, position: Point) -> bool {
        approx(self.half_height, half_height) && approx(self.aspect, aspect) && self.position == position
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= FRAME_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Clamps camera and piece positions into the playable world.
#[derive(Debug, Clone)]
pub struct BoundsClamper {
    world: Rect,
    padding: f64,
    frame: CameraFrame,
    last_key: Option<FrameKey>,
    recomputes: u64,
}

impl BoundsClamper {
    /// Clamper with the default 2% object padding.
    #[must_use]
    pub fn new(world: Rect) -> Self {
        Self::with_padding(world, DEFAULT_OBJECT_PADDING)
    }

    /// Clamper with a custom fractional padding, limited to `[0, 0.5]`.
    #[must_use]
    pub fn with_padding(world: Rect, padding: f64) -> Self {
        let world = world.normalized();
        Self {
            world,
            padding: padding.clamp(0.0, MAX_OBJECT_PADDING),
            // Until a viewport is known the camera may roam the whole world.
            frame: CameraFrame::derive(&world, 0.0, 0.0),
            last_key: None,
            recomputes: 0,
        }
    }

    #[must_use]
    pub fn world(&self) -> Rect {
        self.world
    }

    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// The frame from the most recent recomputation.
    #[must_use]
    pub fn camera_frame(&self) -> CameraFrame {
        self.frame
    }

    /// Number of times the camera frame has been rebuilt.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Rebuild the camera frame for a viewport of `half_height` world units
    /// and the given aspect ratio (width / height). Always recomputes.
    pub fn recompute_camera_frame(&mut self, half_height: f64, aspect: f64) {
        let half_h = half_height.max(0.0);
        let half_w = half_h * aspect.max(0.0);
        self.frame = CameraFrame::derive(&self.world, half_w, half_h);
        self.recomputes += 1;
    }

    /// Per-tick entry point: recompute only when zoom, aspect or camera
    /// position differ from the previous call. Returns whether it recomputed.
    pub fn refresh(&mut self, half_height: f64, aspect: f64, position: Point) -> bool {
        if self.last_key.is_some_and(|k| k.matches(half_height, aspect, position)) {
            return false;
        }
        self.recompute_camera_frame(half_height, aspect);
        self.last_key = Some(FrameKey { half_height, aspect, position });
        true
    }

    /// Clamp a desired camera center into the current frame.
    #[must_use]
    pub fn clamp_camera_position(&self, desired: Point) -> Point {
        Point {
            x: desired.x.clamp(self.frame.min_x, self.frame.max_x),
            y: desired.y.clamp(self.frame.min_y, self.frame.max_y),
        }
    }

    /// World rectangle shrunk by the padding fraction on every side.
    #[must_use]
    pub fn object_area(&self) -> Rect {
        self.world
            .shrink(self.world.width() * self.padding, self.world.height() * self.padding)
    }

    /// Clamp a dragged piece position into the padded world. Independent of
    /// the camera.
    #[must_use]
    pub fn clamp_object_position(&self, desired: Point) -> Point {
        let area = self.object_area();
        Point { x: desired.x.clamp(area.min_x, area.max_x), y: desired.y.clamp(area.min_y, area.max_y) }
    }
}
