pub mod ability;
pub mod animation;
pub mod checkpoint;
pub mod damage;
pub mod enemy;
pub mod level;
pub mod physics;
pub mod player;
pub mod script;

pub use ability::AbilityPlugin;
pub use animation::AnimationPlugin;
pub use checkpoint::CheckpointPlugin;
pub use enemy::EnemyPlugin;
pub use level::LevelPlugin;
pub use physics::PhysicsPlugin;
pub use player::PlayerPlugin;
pub use script::ScriptPlugin;
