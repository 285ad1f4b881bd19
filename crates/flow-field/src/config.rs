//! Configuration for field building and particle animation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the interpolation, the batch scheduler and the particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Longest a batch burst may run before yielding, in milliseconds.
    pub max_task_time_ms: u64,

    /// Rest between bursts, in milliseconds.
    pub min_sleep_time_ms: u64,

    /// Spacing of mask probes along a sample-to-query segment, in pixels.
    pub penalty_step_px: f64,

    /// Weight divisor applied when a segment crosses land.
    pub penalty_multiplier: f64,

    /// Neighbors used per IDW query.
    pub idw_neighbors: usize,

    /// Frames a particle lives before respawning.
    pub max_particle_age: u32,

    /// Speed at which particle color intensity saturates.
    pub max_intensity: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_task_time_ms: 100,
            min_sleep_time_ms: 25,
            penalty_step_px: 8.0,
            penalty_multiplier: 50.0,
            idw_neighbors: 5,
            max_particle_age: 30,
            max_intensity: 8.0,
        }
    }
}

impl FieldConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MAX_TASK_TIME_MS") {
            if let Ok(ms) = val.parse() {
                config.max_task_time_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("MIN_SLEEP_TIME_MS") {
            if let Ok(ms) = val.parse() {
                config.min_sleep_time_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("PENALTY_STEP_PX") {
            if let Ok(step) = val.parse() {
                config.penalty_step_px = step;
            }
        }

        if let Ok(val) = std::env::var("PENALTY_MULTIPLIER") {
            if let Ok(multiplier) = val.parse() {
                config.penalty_multiplier = multiplier;
            }
        }

        if let Ok(val) = std::env::var("IDW_NEIGHBORS") {
            if let Ok(k) = val.parse() {
                config.idw_neighbors = k;
            }
        }

        if let Ok(val) = std::env::var("MAX_PARTICLE_AGE") {
            if let Ok(age) = val.parse() {
                config.max_particle_age = age;
            }
        }

        if let Ok(val) = std::env::var("MAX_INTENSITY") {
            if let Ok(intensity) = val.parse() {
                config.max_intensity = intensity;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_task_time_ms == 0 {
            return Err("max_task_time_ms must be > 0".to_string());
        }

        if !(self.penalty_step_px > 0.0) {
            return Err("penalty_step_px must be > 0".to_string());
        }

        if !(self.penalty_multiplier >= 1.0) {
            return Err("penalty_multiplier must be >= 1".to_string());
        }

        if self.idw_neighbors == 0 {
            return Err("idw_neighbors must be > 0".to_string());
        }

        if self.max_particle_age == 0 {
            return Err("max_particle_age must be > 0".to_string());
        }

        if !(self.max_intensity > 0.0) {
            return Err("max_intensity must be > 0".to_string());
        }

        Ok(())
    }

    pub fn max_task_time(&self) -> Duration {
        Duration::from_millis(self.max_task_time_ms)
    }

    pub fn min_sleep_time(&self) -> Duration {
        Duration::from_millis(self.min_sleep_time_ms)
    }
}
