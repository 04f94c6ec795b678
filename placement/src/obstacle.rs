//! Drifting obstacles and bombs.
//!
//! Obstacles fly horizontally across the world with a sine wave bob, fade in
//! on spawn and fade out near the far edge. A pointer that drags a piece into
//! an obstacle loses the piece; a bare pointer touching a bomb sets it off,
//! fading every obstacle in its blast radius.
//!
//! The field only reports what happened as [`ObstacleEvent`]s. Cancelling
//! the drag and consuming the piece is up to the caller.

#[cfg(test)]
#[path = "obstacle_test.rs"]
mod obstacle_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anim::{Tween, lerp};
use crate::consts::{
    BOMB_FUSE, DEFAULT_WAVE_AMPLITUDE, DEFAULT_WAVE_FREQUENCY, OBSTACLE_EDGE_MARGIN, OBSTACLE_FADE_DURATION,
};
use crate::geom::{Point, Rect, Size};
use crate::piece::PieceId;

pub type ObstacleId = Uuid;

/// Spawn parameters, as found in a level file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub position: Point,
    pub size: Size,
    /// Units per second. Positive drifts left, negative drifts right.
    pub speed: f64,
    #[serde(default = "default_amplitude")]
    pub wave_amplitude: f64,
    #[serde(default = "default_frequency")]
    pub wave_frequency: f64,
    /// Present on bombs: the radius within which a blast fades others.
    #[serde(default)]
    pub bomb_radius: Option<f64>,
}

fn default_amplitude() -> f64 {
    DEFAULT_WAVE_AMPLITUDE
}

fn default_frequency() -> f64 {
    DEFAULT_WAVE_FREQUENCY
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    FadingIn(Tween),
    Active,
    FadingOut { from: f64, tween: Tween },
    /// Bomb between its two blasts.
    Exploding(Tween),
    Gone,
}

/// One live obstacle.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub spec: ObstacleSpec,
    pub position: Point,
    /// Opacity in `[0, 1]` for the renderer.
    pub alpha: f64,
    clock: f64,
    phase: Phase,
}

impl Obstacle {
    #[must_use]
    pub fn new(spec: ObstacleSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            spec,
            position: spec.position,
            alpha: 0.0,
            clock: 0.0,
            phase: Phase::FadingIn(Tween::new(OBSTACLE_FADE_DURATION)),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.spec.size.width * 0.5, self.spec.size.height * 0.5)
    }

    #[must_use]
    pub fn is_bomb(&self) -> bool {
        self.spec.bomb_radius.is_some()
    }

    #[must_use]
    pub fn is_fading_out(&self) -> bool {
        matches!(self.phase, Phase::FadingOut { .. })
    }

    #[must_use]
    pub fn is_exploding(&self) -> bool {
        matches!(self.phase, Phase::Exploding(_))
    }

    #[must_use]
    pub fn is_gone(&self) -> bool {
        self.phase == Phase::Gone
    }

    /// Start fading out from the current opacity. Returns `false` when the
    /// obstacle was already fading out, exploding or gone.
    pub fn fade_out(&mut self) -> bool {
        match self.phase {
            Phase::FadingIn(_) | Phase::Active => {
                self.phase = Phase::FadingOut { from: self.alpha, tween: Tween::new(OBSTACLE_FADE_DURATION) };
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, dt: f64, world: &Rect) {
        if self.phase == Phase::Gone {
            return;
        }
        self.clock += dt;
        let wave = (self.clock * self.spec.wave_frequency).sin() * self.spec.wave_amplitude;
        self.position.x -= self.spec.speed * dt;
        self.position.y += wave * dt;

        let past_left = self.spec.speed > 0.0 && self.position.x < world.min_x + OBSTACLE_EDGE_MARGIN;
        let past_right = self.spec.speed < 0.0 && self.position.x > world.max_x - OBSTACLE_EDGE_MARGIN;
        if past_left || past_right {
            self.fade_out();
        }

        match &mut self.phase {
            Phase::FadingIn(tween) => {
                self.alpha = tween.advance(dt);
                if tween.is_done() {
                    self.phase = Phase::Active;
                }
            }
            Phase::FadingOut { from, tween } => {
                self.alpha = lerp(*from, 0.0, tween.advance(dt));
                if tween.is_done() {
                    self.alpha = 0.0;
                    self.phase = Phase::Gone;
                }
            }
            Phase::Active | Phase::Exploding(_) | Phase::Gone => {}
        }
    }
}

/// Pointer state handed to the field each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerProbe {
    pub world: Point,
    /// Piece dragged by this pointer, if any.
    pub dragging: Option<PieceId>,
}

/// Something the caller has to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleEvent {
    /// A dragged piece ran into an obstacle and is lost.
    PieceHit { obstacle: ObstacleId, piece: PieceId },
    /// A bomb went off.
    Exploded { obstacle: ObstacleId },
    /// The obstacle finished fading and was dropped from the field.
    Gone { obstacle: ObstacleId },
}

/// Every obstacle of a level.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, spec: ObstacleSpec) -> ObstacleId {
        let obstacle = Obstacle::new(spec);
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Move, fade and test every obstacle against the pointers. Each dragged
    /// piece is reported at most once per tick.
    pub fn tick(&mut self, dt: f64, world: &Rect, pointers: &[PointerProbe]) -> Vec<ObstacleEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();
        let mut consumed: Vec<PieceId> = Vec::new();

        for obstacle in &mut self.obstacles {
            obstacle.advance(dt, world);
        }

        for i in 0..self.obstacles.len() {
            let bounds = self.obstacles[i].bounds();
            for probe in pointers.iter().filter(|p| bounds.contains(p.world)) {
                let obstacle = &mut self.obstacles[i];
                match probe.dragging {
                    Some(piece) if !obstacle.is_fading_out() && !obstacle.is_gone() && !consumed.contains(&piece) => {
                        consumed.push(piece);
                        events.push(ObstacleEvent::PieceHit { obstacle: obstacle.id, piece });
                        if !obstacle.is_exploding() {
                            obstacle.fade_out();
                        }
                    }
                    None if obstacle.is_bomb() && matches!(obstacle.phase, Phase::FadingIn(_) | Phase::Active) => {
                        obstacle.phase = Phase::Exploding(Tween::new(BOMB_FUSE));
                        events.push(ObstacleEvent::Exploded { obstacle: obstacle.id });
                        self.blast(i);
                    }
                    _ => {}
                }
            }
        }

        for i in 0..self.obstacles.len() {
            if let Phase::Exploding(tween) = &mut self.obstacles[i].phase {
                tween.advance(dt);
                if tween.is_done() {
                    self.blast(i);
                    self.obstacles[i].alpha = 0.0;
                    self.obstacles[i].phase = Phase::Gone;
                }
            }
        }

        self.obstacles.retain(|o| {
            if o.is_gone() {
                events.push(ObstacleEvent::Gone { obstacle: o.id });
                false
            } else {
                true
            }
        });
        events
    }

    /// Fade every other obstacle within the blast radius of bomb `index`.
    fn blast(&mut self, index: usize) {
        let bomb = &self.obstacles[index];
        let Some(radius) = bomb.spec.bomb_radius else {
            return;
        };
        let (center, id) = (bomb.position, bomb.id);
        let mut faded = 0;
        for other in self.obstacles.iter_mut().filter(|o| o.id != id && !o.is_exploding()) {
            if other.position.distance(center) <= radius && other.fade_out() {
                faded += 1;
            }
        }
        tracing::debug!(%id, radius, faded, "bomb blast");
    }
}
