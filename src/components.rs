use crate::enums::{Facing, Skill};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Axis-aligned bounding box in world pixels (top-left origin, y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn overlap_area(&self, other: &Bounds) -> f32 {
        let w = self.right().min(other.right()) - self.left().max(other.left());
        let h = self.bottom().min(other.bottom()) - self.top().max(other.top());
        if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Bounds {
        Bounds::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Velocity - pixels per second (negative y = up)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };
}

/// Skill set - unlocked movement capabilities.
///
/// Owned by the surrounding progression layer and shared across level loads;
/// the simulation only reads it. Flags are never revoked.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    skills: HashSet<Skill>,
}

impl SkillSet {
    pub fn empty() -> Self {
        Self {
            skills: HashSet::new(),
        }
    }

    /// Move, jump and double jump come unlocked on a fresh profile.
    pub fn starter() -> Self {
        Self::from(vec![Skill::Move, Skill::Jump, Skill::DoubleJump])
    }

    pub fn has(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Returns true when the skill was newly unlocked.
    pub fn unlock(&mut self, skill: Skill) -> bool {
        self.skills.insert(skill)
    }

    /// Unlock by flag name. Unknown names are ignored.
    pub fn unlock_named(&mut self, name: &str) -> bool {
        match Skill::from_name(name) {
            Some(skill) => {
                self.unlock(skill);
                true
            }
            None => {
                warn!("Ignoring unlock of unknown skill '{}'", name);
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Skill> + '_ {
        Skill::ALL.into_iter().filter(|s| self.has(*s))
    }
}

impl Default for SkillSet {
    fn default() -> Self {
        Self::starter()
    }
}

impl From<Vec<Skill>> for SkillSet {
    fn from(skills: Vec<Skill>) -> Self {
        Self {
            skills: skills.into_iter().collect(),
        }
    }
}

/// Snapshot of the held keys for one simulation step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dash: bool,
    pub down: bool,
}

impl InputSnapshot {
    /// Held horizontal direction; none when both or neither are held.
    pub fn horizontal(&self) -> Option<Facing> {
        match (self.left, self.right) {
            (true, false) => Some(Facing::Left),
            (false, true) => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Live input for the current frame. `None` while something else owns focus.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct LiveInput(pub Option<InputSnapshot>);

/// Surface kind - how a static rectangle blocks the actor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Solid,
    OneWay,
}

/// Level surface component - static collision data
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct LevelSurface {
    pub bounds: Bounds,
    pub kind: SurfaceKind,
}

/// Skill pickup component - collectible that unlocks a skill
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct SkillPickup {
    pub skill: Skill,
    pub bounds: Bounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 40.0);
        assert_eq!(b.top(), 20.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_touching_bounds_do_not_intersect() {
        let a = Bounds::new(0.0, 0.0, 32.0, 32.0);
        let right = Bounds::new(32.0, 0.0, 32.0, 32.0);
        let below = Bounds::new(0.0, 32.0, 32.0, 32.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert_eq!(a.overlap_area(&right), 0.0);
    }

    #[test]
    fn test_overlap_area() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert_eq!(a.overlap_area(&b), 25.0);
    }

    #[test]
    fn test_skill_set_operations() {
        let mut skills = SkillSet::empty();
        assert!(!skills.has(Skill::Dash));

        assert!(skills.unlock(Skill::Dash));
        assert!(skills.has(Skill::Dash));
        assert!(!skills.unlock(Skill::Dash));
        assert!(!skills.has(Skill::WallJump));
    }

    #[test]
    fn test_starter_skills() {
        let skills = SkillSet::default();
        assert!(skills.has(Skill::Move));
        assert!(skills.has(Skill::Jump));
        assert!(skills.has(Skill::DoubleJump));
        assert!(!skills.has(Skill::WallSlide));
        assert!(!skills.has(Skill::WallJump));
        assert!(!skills.has(Skill::Dash));
    }

    #[test]
    fn test_unlock_named_ignores_unknown() {
        let mut skills = SkillSet::empty();
        assert!(skills.unlock_named("wall_slide"));
        assert!(skills.has(Skill::WallSlide));

        let before = skills.clone();
        assert!(!skills.unlock_named("fly"));
        assert_eq!(skills, before);
    }

    #[test]
    fn test_skill_set_iter_in_declaration_order() {
        let skills = SkillSet::from(vec![Skill::Dash, Skill::Move]);
        let listed: Vec<Skill> = skills.iter().collect();
        assert_eq!(listed, vec![Skill::Move, Skill::Dash]);
    }

    #[test]
    fn test_input_horizontal() {
        let mut input = InputSnapshot::default();
        assert_eq!(input.horizontal(), None);
        input.left = true;
        assert_eq!(input.horizontal(), Some(Facing::Left));
        input.right = true;
        assert_eq!(input.horizontal(), None);
        input.left = false;
        assert_eq!(input.horizontal(), Some(Facing::Right));
    }
}
