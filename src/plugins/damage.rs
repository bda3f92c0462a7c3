use crate::components::Velocity;
use crate::enums::AnimationState;
use crate::plugins::player::{Actor, ActorTimers};
use bevy::prelude::*;

impl Actor {
    /// Start the hit sequence.
    ///
    /// Ignored while invincible or while the hit/respawn chain is running.
    /// Returns whether the hit landed.
    pub fn take_damage(&mut self) -> bool {
        if self.is_invincible() || self.animation.is_damage_sequence() {
            return false;
        }

        debug!("Player hit");
        self.timers.invincibility = self.config.invincibility_time;
        self.timers.dash = 0.0;
        self.timers.wall_jump_lock = 0.0;
        self.velocity = Velocity::ZERO;
        self.double_jump_active = false;
        self.input_locked = true;
        self.cancel_script();
        self.set_animation(AnimationState::Hit);
        true
    }

    /// Bounce after landing on an enemy. Grants the double jump again.
    pub fn on_stomp(&mut self) -> bool {
        if self.animation.is_damage_sequence() {
            return false;
        }

        self.velocity.y = self.config.stomp_bounce;
        self.jump_count = 1;
        self.grounded = false;
        self.on_one_way = false;
        self.timers.ground_grace = 0.0;
        self.double_jump_active = false;
        true
    }

    fn respawn(&mut self) {
        debug!("Respawning at {:?}", self.spawn);
        self.bounds.x = self.spawn.x;
        self.bounds.y = self.spawn.y;
        self.velocity = Velocity::ZERO;
        self.grounded = false;
        self.on_one_way = false;
        self.wall = None;
        self.jump_count = 0;
        self.can_dash = true;
        self.double_jump_active = false;
        self.timers = ActorTimers {
            invincibility: self.timers.invincibility,
            ..Default::default()
        };
    }
}

/// Move the hit chain forward once the current clip has finished.
/// Physics stays frozen for the whole chain.
pub(crate) fn advance_damage_sequence(actor: &mut Actor) {
    if !actor.clips.get(actor.animation).is_finished() {
        return;
    }

    match actor.animation {
        AnimationState::Hit => actor.set_animation(AnimationState::Disappear),
        AnimationState::Disappear => {
            actor.respawn();
            actor.set_animation(AnimationState::Appear);
        }
        AnimationState::Appear => {
            actor.input_locked = false;
            actor.set_animation(AnimationState::Idle);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::components::{Bounds, InputSnapshot, SkillSet};
    use crate::config::{FIXED_TIMESTEP, MovementConfig};
    use crate::enums::{AnimationState, Skill};
    use crate::plugins::animation::AnimationSet;
    use crate::plugins::player::{Actor, PLAYER_SIZE};
    use crate::plugins::script::ScriptCommand;
    use bevy::prelude::*;

    const DT: f32 = FIXED_TIMESTEP;

    fn floor() -> Bounds {
        Bounds::new(-2000.0, 200.0, 4000.0, 32.0)
    }

    fn spawn_point() -> Vec2 {
        Vec2::new(64.0, floor().top() - PLAYER_SIZE.y)
    }

    /// Short clips so the chain runs in a handful of steps
    fn test_actor() -> Actor {
        let mut actor = Actor::new(
            spawn_point(),
            PLAYER_SIZE,
            AnimationSet::uniform(2, 0.5),
            MovementConfig::default(),
        );
        step(&mut actor, None);
        actor
    }

    fn step(actor: &mut Actor, input: Option<InputSnapshot>) {
        actor.update(DT, input.as_ref(), &SkillSet::starter(), &[floor()], &[]);
    }

    fn run_chain(actor: &mut Actor) -> Vec<AnimationState> {
        let mut seen = vec![actor.animation_state()];
        for _ in 0..60 {
            step(actor, None);
            if seen.last() != Some(&actor.animation_state()) {
                seen.push(actor.animation_state());
            }
        }
        seen
    }

    #[test]
    fn test_damage_enters_hit_and_locks_input() {
        let mut actor = test_actor();
        actor.velocity.x = 250.0;

        assert!(actor.take_damage());
        assert_eq!(actor.animation_state(), AnimationState::Hit);
        assert!(actor.is_invincible());
        assert!(actor.is_input_locked());
        assert_eq!(actor.velocity().x, 0.0);
    }

    #[test]
    fn test_double_damage_enters_hit_once() {
        let mut actor = test_actor();
        assert!(actor.take_damage());
        step(&mut actor, None);
        assert!(!actor.take_damage());

        let seen = run_chain(&mut actor);
        let hits = seen.iter().filter(|s| **s == AnimationState::Hit).count();
        assert_eq!(hits, 1);

        // Still invincible after respawn
        assert!(actor.is_invincible());
        assert!(!actor.take_damage());
    }

    #[test]
    fn test_chain_returns_to_idle_at_spawn() {
        let mut actor = test_actor();
        actor.bounds = Bounds::new(400.0, 50.0, PLAYER_SIZE.x, PLAYER_SIZE.y);
        actor.jump_count = 2;
        actor.can_dash = false;

        actor.take_damage();
        let seen = run_chain(&mut actor);

        assert_eq!(
            seen,
            vec![
                AnimationState::Hit,
                AnimationState::Disappear,
                AnimationState::Appear,
                AnimationState::Idle,
            ]
        );
        assert_eq!(actor.bounds().x, spawn_point().x);
        assert_eq!(actor.bounds().y, spawn_point().y);
        assert!(!actor.is_input_locked());
        assert!(actor.can_dash());
        assert_eq!(actor.jump_count(), 0);
    }

    #[test]
    fn test_physics_frozen_during_chain() {
        let mut actor = test_actor();
        actor.bounds = Bounds::new(400.0, 50.0, PLAYER_SIZE.x, PLAYER_SIZE.y);
        actor.take_damage();

        step(&mut actor, None);
        assert_eq!(actor.bounds().y, 50.0);
        assert_eq!(actor.velocity().y, 0.0);
    }

    #[test]
    fn test_input_ignored_while_locked() {
        let mut actor = test_actor();
        actor.take_damage();

        let input = InputSnapshot {
            right: true,
            jump: true,
            ..Default::default()
        };
        step(&mut actor, Some(input));
        assert_eq!(actor.velocity().x, 0.0);
        assert_eq!(actor.jump_count(), 0);
    }

    #[test]
    fn test_damage_cancels_script_and_refuses_new_commands() {
        let mut actor = test_actor();
        actor.enqueue_command(ScriptCommand::move_right(5));
        step(&mut actor, None);

        actor.take_damage();
        assert!(!actor.is_scripted());
        assert!(!actor.enqueue_command(ScriptCommand::jump()));
    }

    #[test]
    fn test_damage_keeps_skills() {
        let mut skills = SkillSet::starter();
        skills.unlock(Skill::Dash);
        let mut actor = test_actor();

        actor.take_damage();
        for _ in 0..60 {
            actor.update(DT, None, &skills, &[floor()], &[]);
        }
        assert!(skills.has(Skill::Dash));
        assert_eq!(actor.animation_state(), AnimationState::Idle);
    }

    #[test]
    fn test_checkpoint_spawn_used_on_respawn() {
        let mut actor = test_actor();
        actor.set_spawn_point(Vec2::new(640.0, floor().top() - PLAYER_SIZE.y));
        actor.take_damage();
        run_chain(&mut actor);
        assert_eq!(actor.bounds().x, 640.0);
    }

    #[test]
    fn test_stomp_bounces_and_restores_double_jump() {
        let mut actor = test_actor();
        actor.jump_count = 2;
        actor.grounded = false;
        actor.timers.ground_grace = 0.0;

        assert!(actor.on_stomp());
        assert_eq!(actor.velocity().y, actor.config.stomp_bounce);
        assert_eq!(actor.jump_count(), 1);
        assert!(!actor.is_grounded());

        let jump = InputSnapshot {
            jump: true,
            ..Default::default()
        };
        step(&mut actor, Some(jump));
        assert_eq!(actor.jump_count(), 2);
        assert!(actor.is_double_jumping());
    }

    #[test]
    fn test_stomp_is_not_damage() {
        let mut actor = test_actor();
        actor.on_stomp();
        assert!(!actor.is_invincible());
        assert!(!actor.is_input_locked());
    }

    #[test]
    fn test_stomp_ignored_during_chain() {
        let mut actor = test_actor();
        actor.take_damage();
        assert!(!actor.on_stomp());
        assert_eq!(actor.velocity().y, 0.0);
    }
}
