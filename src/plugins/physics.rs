use crate::components::{Bounds, SkillSet};
use crate::config::FIXED_TIMESTEP;
use crate::enums::{Facing, Skill};
use crate::plugins::player::Actor;
use bevy::prelude::*;

/// Tolerance for "was already at/above the edge" comparisons
const EDGE_EPSILON: f32 = 0.01;

/// Width of the side strip used to detect a wall the actor rests against
const WALL_SENSE_WIDTH: f32 = 1.0;

/// Plugin installing the fixed simulation timestep
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(FIXED_TIMESTEP as f64));
    }
}

/// Result of the vertical pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalContact {
    None,
    Landed { one_way: bool },
    /// No vertical motion while standing on a surface (ground dash)
    Resting { one_way: bool },
    HeadBump,
}

/// Advance the actor one step: gravity, X pass, wall slide, Y pass.
pub fn step_physics(
    actor: &mut Actor,
    skills: &SkillSet,
    solids: &[Bounds],
    one_ways: &[Bounds],
    dt: f32,
) -> VerticalContact {
    apply_gravity(actor, dt);
    resolve_horizontal(actor, solids, dt);
    apply_wall_slide(actor, skills);

    let contact = resolve_vertical(actor, solids, one_ways, dt);
    match contact {
        VerticalContact::Landed { one_way } => {
            actor.velocity.y = 0.0;
            actor.grounded = true;
            actor.on_one_way = one_way;
            actor.jump_count = 0;
            actor.can_dash = true;
            actor.timers.ground_grace = actor.config.ground_grace;
        }
        VerticalContact::Resting { one_way } => {
            // Still supported, but not a landing: a ground dash does not refill itself
            actor.grounded = true;
            actor.on_one_way = one_way;
            actor.timers.ground_grace = actor.config.ground_grace;
        }
        VerticalContact::HeadBump => {
            actor.velocity.y = 0.0;
            leave_ground(actor, dt);
        }
        VerticalContact::None => leave_ground(actor, dt),
    }

    contact
}

fn leave_ground(actor: &mut Actor, dt: f32) {
    actor.grounded = false;
    actor.on_one_way = false;
    actor.timers.ground_grace = (actor.timers.ground_grace - dt).max(0.0);
}

/// Gravity up to the terminal fall speed; a running dash suspends it.
pub fn apply_gravity(actor: &mut Actor, dt: f32) {
    if actor.is_dashing() {
        return;
    }

    let config = actor.config;
    actor.velocity.y = (actor.velocity.y + config.gravity * dt).min(config.max_fall_speed);
}

/// Move along X, stopping at the near edge of the first solid in the way.
pub fn resolve_horizontal(actor: &mut Actor, solids: &[Bounds], dt: f32) {
    let dx = actor.velocity.x * dt;
    let start = actor.bounds;
    let mut target_x = start.x + dx;
    let mut contact = None;

    if dx > 0.0 {
        for solid in solids {
            if overlaps_vertically(&start, solid) && solid.left() >= start.right() - EDGE_EPSILON {
                let limit = solid.left() - start.w;
                if limit < target_x {
                    target_x = limit;
                    contact = Some(Facing::Right);
                }
            }
        }
    } else if dx < 0.0 {
        for solid in solids {
            if overlaps_vertically(&start, solid) && solid.right() <= start.left() + EDGE_EPSILON {
                let limit = solid.right();
                if limit > target_x {
                    target_x = limit;
                    contact = Some(Facing::Left);
                }
            }
        }
    }

    actor.bounds.x = target_x;
    actor.wall = contact.or_else(|| sense_wall(&actor.bounds, solids));
}

/// Side of a solid the box is flush against, if any.
pub fn sense_wall(bounds: &Bounds, solids: &[Bounds]) -> Option<Facing> {
    let strip = Bounds::new(bounds.x, bounds.y, WALL_SENSE_WIDTH, bounds.h);
    let left = strip.translated(-WALL_SENSE_WIDTH, 0.0);
    let right = strip.translated(bounds.w, 0.0);

    if solids.iter().any(|s| s.intersects(&right)) {
        Some(Facing::Right)
    } else if solids.iter().any(|s| s.intersects(&left)) {
        Some(Facing::Left)
    } else {
        None
    }
}

/// Move along Y. One-way surfaces only catch an actor whose bottom edge was
/// at or above their top before the move.
pub fn resolve_vertical(
    actor: &mut Actor,
    solids: &[Bounds],
    one_ways: &[Bounds],
    dt: f32,
) -> VerticalContact {
    let dy = actor.velocity.y * dt;
    let start = actor.bounds;
    let mut target_y = start.y + dy;
    let mut contact = VerticalContact::None;

    if dy > 0.0 {
        if actor.timers.drop_through <= 0.0 {
            for platform in one_ways {
                if overlaps_horizontally(&start, platform)
                    && start.bottom() <= platform.top() + EDGE_EPSILON
                {
                    let limit = platform.top() - start.h;
                    if limit < target_y {
                        target_y = limit;
                        contact = VerticalContact::Landed { one_way: true };
                    }
                }
            }
        }

        for solid in solids {
            if overlaps_horizontally(&start, solid) && solid.top() >= start.bottom() - EDGE_EPSILON
            {
                let limit = solid.top() - start.h;
                if limit <= target_y {
                    target_y = limit;
                    contact = VerticalContact::Landed { one_way: false };
                }
            }
        }
    } else if dy < 0.0 {
        for solid in solids {
            if overlaps_horizontally(&start, solid) && solid.bottom() <= start.top() + EDGE_EPSILON
            {
                let limit = solid.bottom();
                if limit > target_y {
                    target_y = limit;
                    contact = VerticalContact::HeadBump;
                }
            }
        }
    } else {
        contact = resting_contact(actor, &start, solids, one_ways);
    }

    actor.bounds.y = target_y;
    contact
}

/// Support directly under a box that is not moving vertically
fn resting_contact(
    actor: &Actor,
    start: &Bounds,
    solids: &[Bounds],
    one_ways: &[Bounds],
) -> VerticalContact {
    let supports = |surface: &Bounds| {
        overlaps_horizontally(start, surface) && (surface.top() - start.bottom()).abs() <= EDGE_EPSILON
    };

    if solids.iter().any(supports) {
        VerticalContact::Resting { one_way: false }
    } else if actor.timers.drop_through <= 0.0 && one_ways.iter().any(supports) {
        VerticalContact::Resting { one_way: true }
    } else {
        VerticalContact::None
    }
}

/// Touching a wall in the air with the skill unlocked, outside a dash.
pub fn is_wall_sliding(actor: &Actor, skills: &SkillSet) -> bool {
    actor.wall.is_some()
        && !actor.is_grounded()
        && !actor.is_dashing()
        && skills.has(Skill::WallSlide)
}

fn apply_wall_slide(actor: &mut Actor, skills: &SkillSet) {
    if is_wall_sliding(actor, skills) {
        actor.velocity.y = actor.velocity.y.min(actor.config.wall_slide_speed);
    }
}

fn overlaps_vertically(a: &Bounds, b: &Bounds) -> bool {
    a.top() < b.bottom() && a.bottom() > b.top()
}

fn overlaps_horizontally(a: &Bounds, b: &Bounds) -> bool {
    a.left() < b.right() && a.right() > b.left()
}
