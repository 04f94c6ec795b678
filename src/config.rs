//! Runner configuration, from flags or environment variables:
//! - `--tick-hz` / `DROPZONE_TICK_HZ`: simulated frames per second, default 60
//! - `--seed` / `DROPZONE_SEED`: scatter seed, default 0
//! - `--drag-steps` / `DROPZONE_DRAG_STEPS`: pointer moves per autoplay drag, default 8
//!
//! A flag wins over its environment variable.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_TICK_HZ: f64 = 60.0;
pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_DRAG_STEPS: u32 = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(clap::Args, Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    /// Simulated frames per second.
    #[arg(long, env = "DROPZONE_TICK_HZ", default_value_t = DEFAULT_TICK_HZ)]
    pub tick_hz: f64,

    /// Scatter seed for pieces without a fixed origin.
    #[arg(long, env = "DROPZONE_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Pointer moves per autoplay drag.
    #[arg(long, env = "DROPZONE_DRAG_STEPS", default_value_t = DEFAULT_DRAG_STEPS)]
    pub drag_steps: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { tick_hz: DEFAULT_TICK_HZ, seed: DEFAULT_SEED, drag_steps: DEFAULT_DRAG_STEPS }
    }
}

impl RunnerConfig {
    /// Seconds per simulated frame.
    #[must_use]
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_hz
    }

    /// Reject values the runner cannot work with.
    pub fn check(self) -> Result<Self, ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::Invalid { key: "tick-hz", value: self.tick_hz.to_string() });
        }
        if self.drag_steps == 0 {
            return Err(ConfigError::Invalid { key: "drag-steps", value: "0".to_owned() });
        }
        Ok(self)
    }
}
