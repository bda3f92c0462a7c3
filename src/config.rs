use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Simulation step length (60 FPS)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Movement constants (pixels, seconds; negative y = up)
pub const GRAVITY: f32 = 1800.0;
pub const MAX_FALL_SPEED: f32 = 900.0;
pub const MOVE_SPEED: f32 = 250.0;
pub const JUMP_VELOCITY: f32 = -650.0;
pub const WALL_JUMP_PUSH: f32 = 300.0;
pub const WALL_JUMP_LOCK: f32 = 0.15;
pub const WALL_SLIDE_SPEED: f32 = 90.0;
pub const DASH_SPEED: f32 = 450.0;
pub const DASH_DURATION: f32 = 0.2;
pub const GROUND_GRACE: f32 = 0.1;
pub const DROP_THROUGH_TIME: f32 = 0.25;
pub const INVINCIBILITY_TIME: f32 = 1.5;
pub const STOMP_BOUNCE: f32 = -400.0;
pub const GRID_UNIT: f32 = 32.0;

/// Tunable movement parameters for the player core
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub wall_jump_push: f32,
    /// Horizontal input is ignored this long after a wall jump
    pub wall_jump_lock: f32,
    pub wall_slide_speed: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub ground_grace: f32,
    pub drop_through_time: f32,
    pub invincibility_time: f32,
    pub stomp_bounce: f32,
    /// Length of one scripted move step
    pub grid_unit: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            move_speed: MOVE_SPEED,
            jump_velocity: JUMP_VELOCITY,
            wall_jump_push: WALL_JUMP_PUSH,
            wall_jump_lock: WALL_JUMP_LOCK,
            wall_slide_speed: WALL_SLIDE_SPEED,
            dash_speed: DASH_SPEED,
            dash_duration: DASH_DURATION,
            ground_grace: GROUND_GRACE,
            drop_through_time: DROP_THROUGH_TIME,
            invincibility_time: INVINCIBILITY_TIME,
            stomp_bounce: STOMP_BOUNCE,
            grid_unit: GRID_UNIT,
        }
    }
}

impl MovementConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;

        let config: MovementConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No movement config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Loaded movement config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}; using default movement config", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravity", self.gravity),
            ("max_fall_speed", self.max_fall_speed),
            ("move_speed", self.move_speed),
            ("dash_speed", self.dash_speed),
            ("grid_unit", self.grid_unit),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }

        if self.jump_velocity >= 0.0 {
            return Err(ConfigError::Invalid(
                "jump_velocity must point up (negative)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String, String),
    Parse(String, String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "IO error reading config {}: {}", path, err),
            ConfigError::Parse(path, err) => {
                write!(f, "Failed to parse config {}: {}", path, err)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid movement config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
