use bevy::prelude::*;
use code_platformer::config::MovementConfig;
use code_platformer::plugins::level::{CurrentLevel, LoadLevel, load_level_or_demo};
use code_platformer::plugins::script::RunScript;
use code_platformer::plugins::{
    AbilityPlugin, AnimationPlugin, CheckpointPlugin, EnemyPlugin, LevelPlugin, PhysicsPlugin,
    PlayerPlugin, ScriptPlugin,
};

const CONFIG_PATH: &str = "config/movement.json";
const LEVEL_PATH: &str = "levels/level1.json";
const SAMPLE_SCRIPT: &str = "move_right(3)\njump()";

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(MovementConfig::load_or_default(CONFIG_PATH))
        .add_plugins(PhysicsPlugin)
        .add_plugins(PlayerPlugin)
        .add_plugins(AbilityPlugin)
        .add_plugins(AnimationPlugin)
        .add_plugins(ScriptPlugin)
        .add_plugins(EnemyPlugin)
        .add_plugins(LevelPlugin)
        .add_plugins(CheckpointPlugin)
        .add_systems(Startup, load_first_level)
        .add_systems(Update, debug_keys_system)
        .run();
}

fn load_first_level(mut load_events: EventWriter<LoadLevel>) {
    load_events.send(LoadLevel {
        level: load_level_or_demo(LEVEL_PATH),
    });
}

/// F5 runs the sample script, R restarts the level
fn debug_keys_system(
    keyboard: Res<Input<KeyCode>>,
    current_level: Option<Res<CurrentLevel>>,
    mut scripts: EventWriter<RunScript>,
    mut load_events: EventWriter<LoadLevel>,
) {
    if keyboard.just_pressed(KeyCode::F5) {
        scripts.send(RunScript {
            source: SAMPLE_SCRIPT.to_string(),
        });
    }

    if keyboard.just_pressed(KeyCode::R) {
        if let Some(current) = current_level {
            load_events.send(LoadLevel {
                level: current.level_data.clone(),
            });
        }
    }
}
