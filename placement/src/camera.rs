//! Orthographic camera: the screen→world mapping, touch pan, pinch zoom and
//! the double-tap zoom reset.
//!
//! Screen space is CSS-style pixels with the origin at the top-left and y
//! pointing down. World space is y-up, centered wherever the camera looks.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::anim::{Tween, lerp};
use crate::bounds::BoundsClamper;
use crate::consts::{
    DOUBLE_TAP_MAX_DELAY, DOUBLE_TAP_MAX_DISTANCE, MAX_ZOOM, MIN_ZOOM, PINCH_ZOOM_SPEED, TOUCH_PAN_SPEED,
    ZOOM_RESET_DURATION,
};
use crate::geom::Point;

/// Converts a pointer position on screen to a world position.
pub trait ScreenToWorld {
    fn screen_to_world(&self, screen: Point) -> Point;
}

/// An in-flight smooth return to the starting zoom.
#[derive(Debug, Clone, Copy)]
struct ZoomReset {
    from: f64,
    tween: Tween,
}

/// Orthographic 2D camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space point at the middle of the viewport.
    pub center: Point,
    /// Half the visible world height ("orthographic size").
    pub half_height: f64,
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    start_zoom: f64,
    reset: Option<ZoomReset>,
    last_tap: Option<(f64, Point)>,
}

impl Camera {
    /// Camera centered on `center` with the given half-height and viewport.
    /// The half-height becomes the zoom the double-tap reset returns to.
    #[must_use]
    pub fn new(center: Point, half_height: f64, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            center,
            half_height,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            start_zoom: half_height,
            reset: None,
            last_tap: None,
        }
    }

    /// Width / height of the viewport.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.viewport_width / self.viewport_height
    }

    /// World units covered by one screen pixel.
    #[must_use]
    pub fn world_per_pixel(&self) -> f64 {
        self.half_height * 2.0 / self.viewport_height
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let wpp = self.world_per_pixel();
        Point {
            x: (world.x - self.center.x) / wpp + self.viewport_width * 0.5,
            y: self.viewport_height * 0.5 - (world.y - self.center.y) / wpp,
        }
    }

    /// Update the viewport size in pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// Pan the view so the world follows a finger moving by `screen_delta`.
    pub fn pan_by_screen_delta(&mut self, screen_delta: Point) {
        let wpp = self.world_per_pixel() * TOUCH_PAN_SPEED;
        self.center.x -= screen_delta.x * wpp;
        self.center.y += screen_delta.y * wpp;
    }

    /// Two-finger pinch: spreading the fingers zooms in.
    pub fn pinch(&mut self, previous_distance: f64, current_distance: f64) {
        self.reset = None;
        self.half_height -= (current_distance - previous_distance) * PINCH_ZOOM_SPEED;
        self.clamp_zoom();
    }

    /// Register a tap at `time` seconds. A second tap soon enough and close
    /// enough starts a smooth zoom reset. Returns whether it did.
    pub fn tap(&mut self, time: f64, screen: Point) -> bool {
        if let Some((last_time, last_pos)) = self.last_tap
            && time - last_time <= DOUBLE_TAP_MAX_DELAY
            && screen.distance(last_pos) <= DOUBLE_TAP_MAX_DISTANCE
        {
            self.last_tap = None;
            self.reset = Some(ZoomReset { from: self.half_height, tween: Tween::new(ZOOM_RESET_DURATION) });
            return true;
        }
        self.last_tap = Some((time, screen));
        false
    }

    #[must_use]
    pub fn is_resetting_zoom(&self) -> bool {
        self.reset.is_some()
    }

    fn clamp_zoom(&mut self) {
        self.half_height = self.half_height.clamp(self.min_zoom, self.max_zoom.max(self.min_zoom));
    }

    /// Per-tick update: advance the zoom reset, clamp zoom, refresh the
    /// clamper's camera frame and pull the center back into it.
    pub fn tick(&mut self, dt: f64, clamper: &mut BoundsClamper) {
        if let Some(reset) = self.reset.as_mut() {
            let t = reset.tween.advance(dt);
            self.half_height = lerp(reset.from, self.start_zoom, t);
            if reset.tween.is_done() {
                self.half_height = self.start_zoom;
                self.reset = None;
            }
        }
        self.clamp_zoom();
        clamper.refresh(self.half_height, self.aspect(), self.center);
        self.center = clamper.clamp_camera_position(self.center);
    }
}

impl ScreenToWorld for Camera {
    fn screen_to_world(&self, screen: Point) -> Point {
        let wpp = self.world_per_pixel();
        Point {
            x: self.center.x + (screen.x - self.viewport_width * 0.5) * wpp,
            y: self.center.y + (self.viewport_height * 0.5 - screen.y) * wpp,
        }
    }
}
