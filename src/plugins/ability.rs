use crate::components::{InputSnapshot, SkillPickup, SkillSet};
use crate::enums::{Facing, Skill};
use crate::plugins::player::Actor;
use bevy::prelude::*;

/// Plugin for skill pickups
pub struct AbilityPlugin;

impl Plugin for AbilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SkillSet>()
            .add_event::<SkillUnlocked>()
            .add_systems(Update, collect_skill_pickups_system);
    }
}

/// Event sent when a pickup unlocks a new skill
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct SkillUnlocked {
    pub skill: Skill,
}

/// Which jump fired for a jump press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    Wall,
    Double,
}

/// Apply one step of live input. Jump and dash fire on the press edge only.
pub fn apply_live_input(actor: &mut Actor, input: &InputSnapshot, skills: &SkillSet) {
    let jump_pressed = input.jump && !actor.prev_input.jump;
    let dash_pressed = input.dash && !actor.prev_input.dash;
    actor.prev_input = *input;

    if input.down {
        try_drop_through(actor);
    }

    apply_horizontal_input(actor, input, skills);

    if jump_pressed {
        try_jump(actor, skills);
    }

    if dash_pressed {
        try_dash(actor, input, skills);
    }
}

/// Set horizontal velocity from held direction keys.
/// A running dash or the post wall-jump lock keeps the current velocity.
pub fn apply_horizontal_input(actor: &mut Actor, input: &InputSnapshot, skills: &SkillSet) {
    if actor.is_dashing() || actor.timers.wall_jump_lock > 0.0 {
        return;
    }

    actor.velocity.x = 0.0;
    if !skills.has(Skill::Move) {
        return;
    }

    if let Some(direction) = input.horizontal() {
        actor.facing = direction;
        actor.velocity.x = direction.sign() * actor.config.move_speed;
    }
}

/// Ground jump, then wall jump, then double jump; the first that is allowed fires.
pub fn try_jump(actor: &mut Actor, skills: &SkillSet) -> Option<JumpKind> {
    if try_ground_jump(actor, skills) {
        Some(JumpKind::Ground)
    } else if try_wall_jump(actor, skills) {
        Some(JumpKind::Wall)
    } else if try_double_jump(actor, skills) {
        Some(JumpKind::Double)
    } else {
        None
    }
}

/// Requires ground contact (or grace window) and the Jump skill.
pub fn try_ground_jump(actor: &mut Actor, skills: &SkillSet) -> bool {
    if !actor.is_grounded() || !skills.has(Skill::Jump) {
        return false;
    }

    actor.velocity.y = actor.config.jump_velocity;
    actor.jump_count = 1;
    actor.double_jump_active = false;
    actor.grounded = false;
    actor.on_one_way = false;
    actor.timers.ground_grace = 0.0;
    true
}

/// Requires wall contact in the air and the WallJump skill.
/// Counts as the first jump, so a double jump may follow.
pub fn try_wall_jump(actor: &mut Actor, skills: &SkillSet) -> bool {
    let Some(wall_side) = actor.wall else {
        return false;
    };
    if actor.is_grounded() || !skills.has(Skill::WallJump) {
        return false;
    }

    let away: Facing = wall_side.opposite();
    actor.velocity.x = away.sign() * actor.config.wall_jump_push;
    actor.velocity.y = actor.config.jump_velocity;
    actor.facing = away;
    actor.jump_count = 1;
    actor.double_jump_active = false;
    actor.wall = None;
    actor.timers.wall_jump_lock = actor.config.wall_jump_lock;
    true
}

/// Requires being airborne after exactly one jump and the DoubleJump skill.
pub fn try_double_jump(actor: &mut Actor, skills: &SkillSet) -> bool {
    if actor.is_grounded() || actor.jump_count != 1 || !skills.has(Skill::DoubleJump) {
        return false;
    }

    actor.velocity.y = actor.config.jump_velocity;
    actor.jump_count = 2;
    actor.double_jump_active = true;
    true
}

/// Requires the Dash skill and an unspent dash (restored on landing).
pub fn try_dash(actor: &mut Actor, input: &InputSnapshot, skills: &SkillSet) -> bool {
    if !skills.has(Skill::Dash) || !actor.can_dash {
        return false;
    }

    let direction = input.horizontal().unwrap_or(actor.facing);
    actor.facing = direction;
    actor.can_dash = false;
    actor.velocity.x = direction.sign() * actor.config.dash_speed;
    actor.velocity.y = 0.0;
    actor.double_jump_active = false;
    actor.timers.dash = actor.config.dash_duration;
    actor.timers.wall_jump_lock = 0.0;
    true
}

/// Fall through the one-way platform the actor is standing on.
pub fn try_drop_through(actor: &mut Actor) -> bool {
    if !actor.grounded || !actor.on_one_way {
        return false;
    }

    actor.timers.drop_through = actor.config.drop_through_time;
    actor.grounded = false;
    actor.on_one_way = false;
    actor.timers.ground_grace = 0.0;
    true
}

/// System to collect skill pickups the player touches
fn collect_skill_pickups_system(
    mut commands: Commands,
    actors: Query<&Actor>,
    pickups: Query<(Entity, &SkillPickup)>,
    mut skills: ResMut<SkillSet>,
    mut unlocked: EventWriter<SkillUnlocked>,
) {
    for actor in actors.iter() {
        for (entity, pickup) in pickups.iter() {
            if !actor.bounds().intersects(&pickup.bounds) {
                continue;
            }

            if skills.unlock(pickup.skill) {
                info!("Unlocked skill: {}", pickup.skill.name());
                unlocked.send(SkillUnlocked {
                    skill: pickup.skill,
                });
            }
            commands.entity(entity).despawn();
        }
    }
}
