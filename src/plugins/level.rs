use crate::components::{Bounds, LevelSurface, SkillPickup, SurfaceKind};
use crate::config::MovementConfig;
use crate::level::{LevelData, RectData};
use crate::plugins::animation::AnimationSet;
use crate::plugins::checkpoint::Checkpoint;
use crate::plugins::enemy::Enemy;
use crate::plugins::player::{Actor, PLAYER_SIZE};
use bevy::prelude::*;
use std::fs;
use std::path::Path;

/// Resource to track current level
#[derive(Resource, Clone, Debug)]
pub struct CurrentLevel {
    pub level_id: String,
    pub level_data: LevelData,
}

/// Event requesting a level (re)load. Replaces the current level and actor.
#[derive(Event, Clone, Debug)]
pub struct LoadLevel {
    pub level: LevelData,
}

/// Marker for everything owned by the loaded level
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct LevelEntity;

/// Plugin for level loading and geometry
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementConfig>()
            .add_event::<LoadLevel>()
            .add_systems(Update, load_level_system);
    }
}

/// Load level from JSON file
pub fn load_level_from_file(path: &str) -> Result<LevelData, LevelLoadError> {
    if !Path::new(path).exists() {
        return Err(LevelLoadError::FileNotFound(path.to_string()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| LevelLoadError::IoError(path.to_string(), e.to_string()))?;

    let level_data: LevelData = serde_json::from_str(&contents)
        .map_err(|e| LevelLoadError::ParseError(path.to_string(), e.to_string()))?;

    validate_level_data(&level_data)?;

    Ok(level_data)
}

/// Load a level file, falling back to the built-in demo level
pub fn load_level_or_demo(path: &str) -> LevelData {
    match load_level_from_file(path) {
        Ok(level) => {
            info!("Loaded level {} from {}", level.id, path);
            level
        }
        Err(LevelLoadError::FileNotFound(_)) => {
            info!("No level file at {}, using demo level", path);
            LevelData::demo()
        }
        Err(e) => {
            error!("{}", e);
            warn!("Falling back to demo level");
            LevelData::demo()
        }
    }
}

/// Validate level data for required fields and valid values
fn validate_level_data(level: &LevelData) -> Result<(), LevelLoadError> {
    if level.id.is_empty() {
        return Err(LevelLoadError::ValidationError(
            "Level ID cannot be empty".to_string(),
        ));
    }

    if level.width <= 0.0 || level.height <= 0.0 {
        return Err(LevelLoadError::ValidationError(
            "Level dimensions must be positive".to_string(),
        ));
    }

    let spawn = level.spawn_point;
    if spawn.x < 0.0 || spawn.x > level.width || spawn.y < 0.0 || spawn.y > level.height {
        return Err(LevelLoadError::ValidationError(format!(
            "Spawn point ({}, {}) is outside the level",
            spawn.x, spawn.y
        )));
    }

    let rects = level
        .solids
        .iter()
        .map(|r| ("Solid", r))
        .chain(level.one_ways.iter().map(|r| ("One-way platform", r)))
        .chain(level.checkpoints.iter().map(|c| ("Checkpoint", &c.area)));
    for (i, (label, rect)) in rects.enumerate() {
        if !has_area(rect) {
            return Err(LevelLoadError::ValidationError(format!(
                "{} (entry {}) has invalid dimensions",
                label, i
            )));
        }
    }

    Ok(())
}

fn has_area(rect: &RectData) -> bool {
    rect.width > 0.0 && rect.height > 0.0
}

/// Spawn level entities and a fresh actor from level data
pub fn spawn_level_entities(commands: &mut Commands, level: &LevelData, config: &MovementConfig) {
    let surfaces = level
        .solids
        .iter()
        .map(|r| (r, SurfaceKind::Solid))
        .chain(level.one_ways.iter().map(|r| (r, SurfaceKind::OneWay)));
    for (rect, kind) in surfaces {
        commands.spawn((
            LevelSurface {
                bounds: rect.to_bounds(),
                kind,
            },
            LevelEntity,
        ));
    }

    for pickup in &level.skill_pickups {
        commands.spawn((
            SkillPickup {
                skill: pickup.skill,
                bounds: pickup.bounds(),
            },
            LevelEntity,
        ));
    }

    for checkpoint in &level.checkpoints {
        commands.spawn((
            Checkpoint::new(checkpoint.id.clone(), checkpoint.area.to_bounds()),
            LevelEntity,
        ));
    }

    for spawn in &level.enemies {
        commands.spawn((
            Enemy::new(spawn.kind, Vec2::new(spawn.x, spawn.y)),
            LevelEntity,
        ));
    }

    let spawn = Vec2::new(level.spawn_point.x, level.spawn_point.y);
    let actor = Actor::new(spawn, PLAYER_SIZE, AnimationSet::default(), *config);
    let center = Bounds::new(spawn.x, spawn.y, PLAYER_SIZE.x, PLAYER_SIZE.y).center();
    commands.spawn((
        actor,
        SpatialBundle::from_transform(Transform::from_xyz(center.x, -center.y, 0.0)),
        LevelEntity,
    ));
}

/// Tear down the previous level and actor, then spawn the requested one
fn load_level_system(
    mut commands: Commands,
    mut load_events: EventReader<LoadLevel>,
    mut actor_query: Query<&mut Actor>,
    level_query: Query<Entity, With<LevelEntity>>,
    config: Res<MovementConfig>,
) {
    let Some(event) = load_events.read().last() else {
        return;
    };

    // Scripted commands must not leak into the next actor
    for mut actor in actor_query.iter_mut() {
        actor.cancel_script();
    }
    for entity in level_query.iter() {
        commands.entity(entity).despawn();
    }

    spawn_level_entities(&mut commands, &event.level, &config);
    commands.insert_resource(CurrentLevel {
        level_id: event.level.id.clone(),
        level_data: event.level.clone(),
    });

    info!("Loaded level: {}", event.level.id);
}

/// Level loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum LevelLoadError {
    FileNotFound(String),
    IoError(String, String),
    ParseError(String, String),
    ValidationError(String),
}

impl std::fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelLoadError::FileNotFound(path) => write!(f, "Level file not found: {}", path),
            LevelLoadError::IoError(path, err) => {
                write!(f, "IO error reading level file {}: {}", path, err)
            }
            LevelLoadError::ParseError(path, err) => {
                write!(f, "Failed to parse level file {}: {}", path, err)
            }
            LevelLoadError::ValidationError(msg) => write!(f, "Level validation error: {}", msg),
        }
    }
}

impl std::error::Error for LevelLoadError {}
