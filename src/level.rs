use crate::components::Bounds;
use crate::enums::Skill;
use crate::plugins::enemy::EnemyKind;
use serde::{Deserialize, Serialize};

/// Side length of a skill pickup
pub const PICKUP_SIZE: f32 = 16.0;

/// Level data structure matching JSON format
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub spawn_point: SpawnPoint,
    pub solids: Vec<RectData>,
    #[serde(default)]
    pub one_ways: Vec<RectData>,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointData>,
    #[serde(default)]
    pub skill_pickups: Vec<SkillPickupData>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawnData>,
}

/// Spawn point data
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

/// Rectangle data for level collision
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectData {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectData {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn to_bounds(self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Checkpoint data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointData {
    pub id: String,
    pub area: RectData,
}

/// Skill pickup data
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillPickupData {
    pub skill: Skill,
    pub x: f32,
    pub y: f32,
}

impl SkillPickupData {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, PICKUP_SIZE, PICKUP_SIZE)
    }
}

/// Enemy placement, top-left corner
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawnData {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
}

impl LevelData {
    /// Built-in level used when no level file is available
    pub fn demo() -> Self {
        LevelData {
            id: "demo".to_string(),
            width: 1600.0,
            height: 640.0,
            spawn_point: SpawnPoint { x: 64.0, y: 512.0 },
            solids: vec![
                // Ground with a gap
                RectData::new(0.0, 544.0, 704.0, 96.0),
                RectData::new(832.0, 544.0, 768.0, 96.0),
                // Boundary walls
                RectData::new(-32.0, 0.0, 32.0, 640.0),
                RectData::new(1600.0, 0.0, 32.0, 640.0),
                // Tall wall for wall slide and wall jump practice
                RectData::new(1184.0, 224.0, 32.0, 320.0),
            ],
            one_ways: vec![
                RectData::new(256.0, 448.0, 128.0, 8.0),
                RectData::new(448.0, 352.0, 128.0, 8.0),
            ],
            checkpoints: vec![CheckpointData {
                id: "cp_gap".to_string(),
                area: RectData::new(896.0, 480.0, 16.0, 64.0),
            }],
            skill_pickups: vec![
                SkillPickupData {
                    skill: Skill::Dash,
                    x: 500.0,
                    y: 320.0,
                },
                SkillPickupData {
                    skill: Skill::WallSlide,
                    x: 1000.0,
                    y: 520.0,
                },
                SkillPickupData {
                    skill: Skill::WallJump,
                    x: 1100.0,
                    y: 520.0,
                },
            ],
            enemies: vec![
                EnemySpawnData {
                    kind: EnemyKind::Mushroom,
                    x: 600.0,
                    y: 512.0,
                },
                EnemySpawnData {
                    kind: EnemyKind::Snail,
                    x: 1350.0,
                    y: 520.0,
                },
            ],
        }
    }
}
