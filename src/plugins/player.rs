use crate::components::{
    Bounds, InputSnapshot, LevelSurface, LiveInput, SkillSet, SurfaceKind, Velocity,
};
use crate::config::MovementConfig;
use crate::enums::{AnimationState, Facing};
use crate::plugins::ability::apply_live_input;
use crate::plugins::animation::{AnimationSet, select_animation};
use crate::plugins::damage::advance_damage_sequence;
use crate::plugins::physics::step_physics;
use crate::plugins::script::{CommandQueue, ScriptCommand, run_interpreter};
use bevy::prelude::*;

/// Player size in pixels
pub const PLAYER_SIZE: Vec2 = Vec2::new(32.0, 32.0);

/// Plugin for the player actor: input capture and the fixed-step update
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LiveInput>()
            .init_resource::<SkillSet>()
            .init_resource::<MovementConfig>()
            .add_systems(Update, capture_keyboard_system)
            .add_systems(FixedUpdate, step_actors_system);
    }
}

/// Countdown timers, in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorTimers {
    pub invincibility: f32,
    pub ground_grace: f32,
    pub dash: f32,
    pub drop_through: f32,
    pub wall_jump_lock: f32,
}

impl ActorTimers {
    fn tick(&mut self, dt: f32) {
        self.invincibility = (self.invincibility - dt).max(0.0);
        self.dash = (self.dash - dt).max(0.0);
        self.drop_through = (self.drop_through - dt).max(0.0);
        self.wall_jump_lock = (self.wall_jump_lock - dt).max(0.0);
    }
}

/// The player-controlled actor.
///
/// Created once per level load at a spawn point. Live input, scripted
/// commands and damage hooks all funnel into [`Actor::update`], which runs
/// once per fixed step.
#[derive(Component, Clone, Debug)]
pub struct Actor {
    pub(crate) bounds: Bounds,
    pub(crate) velocity: Velocity,
    pub(crate) facing: Facing,
    pub(crate) grounded: bool,
    pub(crate) on_one_way: bool,
    /// Side of the wall currently touched
    pub(crate) wall: Option<Facing>,
    pub(crate) jump_count: u8,
    pub(crate) can_dash: bool,
    pub(crate) double_jump_active: bool,
    pub(crate) timers: ActorTimers,
    pub(crate) spawn: Vec2,
    pub(crate) input_locked: bool,
    pub(crate) prev_input: InputSnapshot,
    pub(crate) animation: AnimationState,
    pub(crate) clips: AnimationSet,
    pub(crate) commands: CommandQueue,
    pub(crate) config: MovementConfig,
}

impl Actor {
    pub fn new(spawn: Vec2, size: Vec2, clips: AnimationSet, config: MovementConfig) -> Self {
        Self {
            bounds: Bounds::new(spawn.x, spawn.y, size.x, size.y),
            velocity: Velocity::ZERO,
            facing: Facing::Right,
            grounded: false,
            on_one_way: false,
            wall: None,
            jump_count: 0,
            can_dash: true,
            double_jump_active: false,
            timers: ActorTimers::default(),
            spawn,
            input_locked: false,
            prev_input: InputSnapshot::default(),
            animation: AnimationState::Idle,
            clips,
            commands: CommandQueue::default(),
            config,
        }
    }

    /// Advance one fixed step.
    ///
    /// Order: timers, control (live input unless locked or scripted),
    /// physics, pose selection or the damage chain, command interpreter,
    /// clip playback.
    pub fn update(
        &mut self,
        dt: f32,
        input: Option<&InputSnapshot>,
        skills: &SkillSet,
        solids: &[Bounds],
        one_ways: &[Bounds],
    ) {
        self.timers.tick(dt);
        let held = input.copied().unwrap_or_default();

        if self.animation.is_damage_sequence() {
            self.prev_input = held;
            advance_damage_sequence(self);
        } else {
            if self.input_locked || self.commands.is_scripted() {
                self.prev_input = held;
            } else {
                apply_live_input(self, &held, skills);
            }

            step_physics(self, skills, solids, one_ways, dt);

            // Cleared on vy >= 0, so the pose can linger one step at the apex
            if self.double_jump_active && self.velocity.y >= 0.0 {
                self.double_jump_active = false;
            }

            let next = select_animation(self, skills);
            self.set_animation(next);
        }

        run_interpreter(self, skills, dt);
        self.clips.get_mut(self.animation).update();
    }

    /// Queue a scripted command, switching into scripted mode.
    /// Refused while the damage sequence runs.
    pub fn enqueue_command(&mut self, command: ScriptCommand) -> bool {
        if self.animation.is_damage_sequence() {
            debug!("Ignoring scripted command during damage sequence");
            return false;
        }

        if !self.commands.is_scripted() {
            debug!("Entering scripted mode");
            self.velocity.x = 0.0;
            self.timers.dash = 0.0;
            self.timers.wall_jump_lock = 0.0;
        }
        self.commands.push(command);
        true
    }

    /// Drop queued and in-flight commands and hand control back to live input.
    pub fn cancel_script(&mut self) {
        if self.commands.is_scripted() {
            debug!("Cancelling scripted mode");
            self.commands.clear();
            self.velocity.x = 0.0;
        }
    }

    pub fn set_spawn_point(&mut self, spawn: Vec2) {
        self.spawn = spawn;
    }

    pub(crate) fn set_animation(&mut self, state: AnimationState) {
        if self.animation != state {
            self.animation = state;
            self.clips.get_mut(state).reset();
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation
    }

    pub fn current_frame(&self) -> usize {
        self.clips.get(self.animation).current_frame()
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    /// On the ground or still inside the ground grace window
    pub fn is_grounded(&self) -> bool {
        self.grounded || self.timers.ground_grace > 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.timers.dash > 0.0
    }

    pub fn is_double_jumping(&self) -> bool {
        self.double_jump_active
    }

    pub fn is_invincible(&self) -> bool {
        self.timers.invincibility > 0.0
    }

    pub fn is_scripted(&self) -> bool {
        self.commands.is_scripted()
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    pub fn can_dash(&self) -> bool {
        self.can_dash
    }

    pub fn wall_contact(&self) -> Option<Facing> {
        self.wall
    }
}

/// Translate held keys into the live input snapshot
fn capture_keyboard_system(
    keyboard: Option<Res<Input<KeyCode>>>,
    windows: Query<&Window>,
    mut live_input: ResMut<LiveInput>,
) {
    let focused = windows.iter().next().map_or(true, |window| window.focused);
    let Some(keyboard) = keyboard.filter(|_| focused) else {
        live_input.0 = None;
        return;
    };

    let held = |keys: &[KeyCode]| keys.iter().any(|key| keyboard.pressed(*key));
    live_input.0 = Some(InputSnapshot {
        left: held(&[KeyCode::A, KeyCode::Left]),
        right: held(&[KeyCode::D, KeyCode::Right]),
        jump: held(&[KeyCode::Space, KeyCode::W, KeyCode::Up]),
        dash: held(&[KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        down: held(&[KeyCode::S, KeyCode::Down]),
    });
}

/// Split level surfaces into solid and one-way rectangles
pub fn collect_surfaces<'a>(
    surfaces: impl Iterator<Item = &'a LevelSurface>,
) -> (Vec<Bounds>, Vec<Bounds>) {
    let mut solids = Vec::new();
    let mut one_ways = Vec::new();
    for surface in surfaces {
        match surface.kind {
            SurfaceKind::Solid => solids.push(surface.bounds),
            SurfaceKind::OneWay => one_ways.push(surface.bounds),
        }
    }
    (solids, one_ways)
}

/// Step every actor once per fixed tick
pub(crate) fn step_actors_system(
    time: Res<Time<Fixed>>,
    live_input: Res<LiveInput>,
    skills: Res<SkillSet>,
    surfaces: Query<&LevelSurface>,
    mut actors: Query<&mut Actor>,
) {
    let dt = time.delta_seconds();
    let (solids, one_ways) = collect_surfaces(surfaces.iter());

    for mut actor in actors.iter_mut() {
        actor.update(dt, live_input.0.as_ref(), &skills, &solids, &one_ways);
    }
}
