use crate::components::Bounds;
use crate::plugins::player::Actor;
use bevy::prelude::*;

/// Checkpoint component - moves the respawn point once touched
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub id: String,
    pub bounds: Bounds,
    pub activated: bool,
}

impl Checkpoint {
    pub fn new(id: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            bounds,
            activated: false,
        }
    }

    /// Spawn point for an actor of `height` standing on this checkpoint's base
    pub fn spawn_point(&self, height: f32) -> Vec2 {
        Vec2::new(self.bounds.x, self.bounds.bottom() - height)
    }
}

/// Id of the most recently activated checkpoint
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct ActiveCheckpoint(pub Option<String>);

/// Event triggered when a checkpoint is activated
#[derive(Event, Clone, Debug, PartialEq)]
pub struct CheckpointActivated {
    pub checkpoint_id: String,
    pub spawn: Vec2,
}

/// Plugin for checkpoints
pub struct CheckpointPlugin;

impl Plugin for CheckpointPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveCheckpoint>()
            .add_event::<CheckpointActivated>()
            .add_systems(
                Update,
                (checkpoint_activation_system, record_checkpoint_system).chain(),
            );
    }
}

/// System to detect checkpoint activation
fn checkpoint_activation_system(
    mut checkpoint_query: Query<&mut Checkpoint>,
    mut actor_query: Query<&mut Actor>,
    mut checkpoint_events: EventWriter<CheckpointActivated>,
) {
    for mut actor in actor_query.iter_mut() {
        // A dying actor cannot claim a checkpoint
        if actor.animation_state().is_damage_sequence() {
            continue;
        }

        for mut checkpoint in checkpoint_query.iter_mut() {
            if checkpoint.activated || !actor.bounds().intersects(&checkpoint.bounds) {
                continue;
            }

            checkpoint.activated = true;
            let spawn = checkpoint.spawn_point(actor.bounds().h);
            actor.set_spawn_point(spawn);
            checkpoint_events.send(CheckpointActivated {
                checkpoint_id: checkpoint.id.clone(),
                spawn,
            });
        }
    }
}

fn record_checkpoint_system(
    mut checkpoint_events: EventReader<CheckpointActivated>,
    mut active: ResMut<ActiveCheckpoint>,
) {
    for event in checkpoint_events.read() {
        info!("Checkpoint reached: {}", event.checkpoint_id);
        active.0 = Some(event.checkpoint_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::plugins::animation::AnimationSet;
    use crate::plugins::player::PLAYER_SIZE;

    fn setup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(CheckpointPlugin);
        app
    }

    fn actor_at(x: f32, y: f32) -> Actor {
        Actor::new(
            Vec2::new(x, y),
            PLAYER_SIZE,
            AnimationSet::default(),
            MovementConfig::default(),
        )
    }

    #[test]
    fn test_checkpoint_creation() {
        let checkpoint = Checkpoint::new("cp_01", Bounds::new(0.0, 0.0, 16.0, 64.0));
        assert_eq!(checkpoint.id, "cp_01");
        assert!(!checkpoint.activated);
        assert_eq!(checkpoint.spawn_point(32.0), Vec2::new(0.0, 32.0));
    }

    #[test]
    fn test_touching_checkpoint_moves_spawn() {
        let mut app = setup_app();
        let actor = app.world.spawn(actor_at(300.0, 168.0)).id();
        let checkpoint = app
            .world
            .spawn(Checkpoint::new("cp_01", Bounds::new(310.0, 136.0, 16.0, 64.0)))
            .id();

        app.update();

        let actor = app.world.get::<Actor>(actor).unwrap();
        assert_eq!(actor.spawn_point(), Vec2::new(310.0, 168.0));
        assert!(app.world.get::<Checkpoint>(checkpoint).unwrap().activated);
        assert_eq!(
            app.world.resource::<ActiveCheckpoint>().0.as_deref(),
            Some("cp_01")
        );
    }

    #[test]
    fn test_checkpoint_activates_once() {
        let mut app = setup_app();
        let actor = app.world.spawn(actor_at(300.0, 168.0)).id();
        app.world
            .spawn(Checkpoint::new("cp_01", Bounds::new(310.0, 136.0, 16.0, 64.0)));

        app.update();
        app.world
            .get_mut::<Actor>(actor)
            .unwrap()
            .set_spawn_point(Vec2::new(5.0, 5.0));
        app.update();

        let actor = app.world.get::<Actor>(actor).unwrap();
        assert_eq!(actor.spawn_point(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_far_checkpoint_stays_inactive() {
        let mut app = setup_app();
        let actor = app.world.spawn(actor_at(0.0, 0.0)).id();
        let checkpoint = app
            .world
            .spawn(Checkpoint::new("cp_02", Bounds::new(600.0, 0.0, 16.0, 64.0)))
            .id();

        app.update();

        assert!(!app.world.get::<Checkpoint>(checkpoint).unwrap().activated);
        assert_eq!(
            app.world.get::<Actor>(actor).unwrap().spawn_point(),
            Vec2::ZERO
        );
        assert_eq!(app.world.resource::<ActiveCheckpoint>().0, None);
    }

    #[test]
    fn test_dying_actor_does_not_activate() {
        let mut app = setup_app();
        let mut actor = actor_at(300.0, 168.0);
        actor.take_damage();
        app.world.spawn(actor);
        let checkpoint = app
            .world
            .spawn(Checkpoint::new("cp_01", Bounds::new(310.0, 136.0, 16.0, 64.0)))
            .id();

        app.update();

        assert!(!app.world.get::<Checkpoint>(checkpoint).unwrap().activated);
    }
}
