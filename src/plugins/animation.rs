use crate::components::SkillSet;
use crate::enums::{AnimationState, Facing};
use crate::plugins::physics::is_wall_sliding;
use crate::plugins::player::Actor;
use bevy::prelude::*;

/// Default playback speed in frames advanced per simulation step
pub const DEFAULT_CLIP_SPEED: f32 = 0.15;

/// Plugin exposing actor pose to the renderer
pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_actor_transform_system);
    }
}

/// Playback state of a single clip.
///
/// Looping clips wrap forever; play-once clips stop on their last frame and
/// report `is_finished` once that frame has had its full display time.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    frame_count: usize,
    speed: f32,
    looping: bool,
    cursor: f32,
    finished: bool,
}

impl AnimationClip {
    pub fn new(frame_count: usize, speed: f32, looping: bool) -> Self {
        Self {
            frame_count: frame_count.max(1),
            speed,
            looping,
            cursor: 0.0,
            finished: false,
        }
    }

    pub fn looping(frame_count: usize, speed: f32) -> Self {
        Self::new(frame_count, speed, true)
    }

    pub fn once(frame_count: usize, speed: f32) -> Self {
        Self::new(frame_count, speed, false)
    }

    pub fn reset(&mut self) {
        self.cursor = 0.0;
        self.finished = false;
    }

    /// Advance one simulation step.
    pub fn update(&mut self) {
        if self.finished {
            return;
        }

        self.cursor += self.speed;
        let end = self.frame_count as f32;
        if self.cursor >= end {
            if self.looping {
                self.cursor %= end;
            } else {
                self.cursor = end - 1.0;
                self.finished = true;
            }
        }
    }

    pub fn current_frame(&self) -> usize {
        (self.cursor as usize).min(self.frame_count - 1)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}

/// One clip per animation state, injected at actor construction
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSet {
    clips: [AnimationClip; 10],
}

impl AnimationSet {
    /// Build a set from a per-state clip factory.
    pub fn from_fn(mut clip_for: impl FnMut(AnimationState) -> AnimationClip) -> Self {
        Self {
            clips: AnimationState::ALL.map(&mut clip_for),
        }
    }

    /// Every state gets `frame_count` frames; loop mode follows the state.
    pub fn uniform(frame_count: usize, speed: f32) -> Self {
        Self::from_fn(|state| AnimationClip::new(frame_count, speed, state.loops()))
    }

    pub fn with_clip(mut self, state: AnimationState, clip: AnimationClip) -> Self {
        self.clips[state.index()] = clip;
        self
    }

    pub fn get(&self, state: AnimationState) -> &AnimationClip {
        &self.clips[state.index()]
    }

    pub fn get_mut(&mut self, state: AnimationState) -> &mut AnimationClip {
        &mut self.clips[state.index()]
    }
}

impl Default for AnimationSet {
    /// Frame counts of the stock 32x32 character sheets.
    fn default() -> Self {
        Self::from_fn(|state| {
            let frames = match state {
                AnimationState::Idle => 11,
                AnimationState::Run => 12,
                AnimationState::Jump | AnimationState::Fall => 1,
                AnimationState::DoubleJump => 6,
                AnimationState::WallSlide => 5,
                AnimationState::Dash => 6,
                AnimationState::Hit => 7,
                AnimationState::Disappear | AnimationState::Appear => 7,
            };
            AnimationClip::new(frames, DEFAULT_CLIP_SPEED, state.loops())
        })
    }
}

/// Pick the movement pose for this step (first match wins).
pub fn select_animation(actor: &Actor, skills: &SkillSet) -> AnimationState {
    let velocity = actor.velocity();

    if actor.is_dashing() {
        AnimationState::Dash
    } else if actor.is_grounded() {
        if velocity.x != 0.0 {
            AnimationState::Run
        } else {
            AnimationState::Idle
        }
    } else if is_wall_sliding(actor, skills) {
        AnimationState::WallSlide
    } else if actor.is_double_jumping() {
        AnimationState::DoubleJump
    } else if velocity.y < 0.0 {
        AnimationState::Jump
    } else {
        AnimationState::Fall
    }
}

/// Mirror actor position and facing onto its transform (world y grows down)
fn sync_actor_transform_system(mut query: Query<(&Actor, &mut Transform)>) {
    for (actor, mut transform) in query.iter_mut() {
        let center = actor.bounds().center();
        transform.translation.x = center.x;
        transform.translation.y = -center.y;

        transform.scale.x = match actor.facing() {
            Facing::Right => transform.scale.x.abs(),
            Facing::Left => -transform.scale.x.abs(),
        };
    }
}
