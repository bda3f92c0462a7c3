use crate::components::{Bounds, LevelSurface, Velocity};
use crate::enums::Facing;
use crate::plugins::player::{Actor, collect_surfaces, step_actors_system};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Enemy fall acceleration (px/s^2)
pub const ENEMY_GRAVITY: f32 = 2880.0;
/// Jumper launch velocity (px/s, negative = up)
pub const JUMPER_FORCE: f32 = -600.0;
/// Grace after a non-lethal hit
pub const ENEMY_INVINCIBILITY: f32 = 20.0 / 60.0;
/// How far below the enemy top a falling player still counts as a stomp
pub const STOMP_TOLERANCE: f32 = 8.0;
/// Damage dealt to an enemy by a stomp
pub const STOMP_DAMAGE: i32 = 1;

/// Plugin for enemy behaviors and player contact
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyShot>()
            .add_systems(FixedUpdate, update_enemies_system.after(step_actors_system));
    }
}

/// Sent when a shooter fires. Projectiles are left to the host game.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct EnemyShot {
    pub origin: Vec2,
    pub direction: Facing,
}

/// Visual pose for the renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnemyPose {
    #[default]
    Idle,
    Run,
    Attack,
    Shell,
    Disappear,
    Hit,
}

/// Physical state a behavior is allowed to drive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyBody {
    pub bounds: Bounds,
    pub velocity: Velocity,
    /// Horizontal speed (px/s)
    pub speed: f32,
    pub on_ground: bool,
    pub facing: Facing,
    pub pose: EnemyPose,
}

/// Output of a behavior step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyEvent {
    Shoot { origin: Vec2, direction: Facing },
}

/// Closed set of enemy behaviors
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyBehavior {
    /// Walk back and forth between two x coordinates
    Patrol { left: f32, right: f32, dir: Facing },
    /// Home in on the player on both axes
    Flying,
    /// Hop whenever grounded
    Jumper { force: f32 },
    /// Stand still and fire every `cooldown` seconds
    Shooter { cooldown: f32, timer: f32 },
    /// Retreat into a shell once stomped
    Shell { shelled: bool },
    /// Fade in and out every `period` seconds; harmless while faded
    Ghost { period: f32, timer: f32, visible: bool },
}

impl EnemyBehavior {
    pub fn patrol(x: f32, range: f32) -> Self {
        EnemyBehavior::Patrol {
            left: x - range,
            right: x + range,
            dir: Facing::Right,
        }
    }

    pub fn shooter(cooldown: f32) -> Self {
        EnemyBehavior::Shooter {
            cooldown,
            timer: 0.0,
        }
    }

    pub fn ghost(period: f32) -> Self {
        EnemyBehavior::Ghost {
            period,
            timer: 0.0,
            visible: true,
        }
    }

    /// One behavior step for the enemy owning `body`.
    pub fn update(&mut self, body: &mut EnemyBody, player: &Bounds, dt: f32) -> Option<EnemyEvent> {
        match self {
            EnemyBehavior::Patrol { left, right, dir } => {
                body.pose = EnemyPose::Run;
                body.bounds.x += dir.sign() * body.speed * dt;

                if body.bounds.left() <= *left {
                    *dir = Facing::Right;
                } else if body.bounds.right() >= *right {
                    *dir = Facing::Left;
                }
                body.facing = *dir;
                None
            }
            EnemyBehavior::Flying => {
                body.pose = EnemyPose::Idle;
                let offset = player.center() - body.bounds.center();
                let step = body.speed * dt;
                body.bounds.x += offset.x.clamp(-step, step);
                body.bounds.y += offset.y.clamp(-step, step);
                if offset.x != 0.0 {
                    body.facing = facing_towards(offset.x);
                }
                None
            }
            EnemyBehavior::Jumper { force } => {
                body.pose = EnemyPose::Idle;
                if body.on_ground {
                    body.velocity.y = *force;
                    body.on_ground = false;
                }
                None
            }
            EnemyBehavior::Shooter { cooldown, timer } => {
                body.pose = EnemyPose::Attack;
                body.facing = facing_towards(player.center().x - body.bounds.center().x);

                *timer += dt;
                if *timer >= *cooldown {
                    *timer -= *cooldown;
                    return Some(EnemyEvent::Shoot {
                        origin: body.bounds.center(),
                        direction: body.facing,
                    });
                }
                None
            }
            EnemyBehavior::Shell { shelled } => {
                if *shelled {
                    body.pose = EnemyPose::Shell;
                    body.speed = 0.0;
                } else {
                    body.pose = EnemyPose::Idle;
                }
                None
            }
            EnemyBehavior::Ghost {
                period,
                timer,
                visible,
            } => {
                *timer += dt;
                if *timer >= *period {
                    *visible = !*visible;
                    *timer = 0.0;
                }
                body.pose = if *visible {
                    EnemyPose::Idle
                } else {
                    EnemyPose::Disappear
                };
                None
            }
        }
    }

    pub fn on_stomped(&mut self) {
        if let EnemyBehavior::Shell { shelled } = self {
            *shelled = true;
        }
    }

    /// Fliers and ghosts hover
    pub fn uses_gravity(&self) -> bool {
        !matches!(self, EnemyBehavior::Flying | EnemyBehavior::Ghost { .. })
    }

    pub fn is_harmful(&self) -> bool {
        match self {
            EnemyBehavior::Ghost { visible, .. } => *visible,
            _ => true,
        }
    }
}

fn facing_towards(dx: f32) -> Facing {
    if dx < 0.0 { Facing::Left } else { Facing::Right }
}

/// Enemy roster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    AngryPig,
    Chicken,
    Radish,
    Rino,
    Mushroom,
    Bat,
    Bee,
    BlueBird,
    Bunny,
    Slime,
    Plant,
    Trunk,
    Ghost,
    Snail,
    Turtle,
}

impl EnemyKind {
    pub fn hp(&self) -> i32 {
        match self {
            EnemyKind::Rino | EnemyKind::Turtle => 3,
            EnemyKind::AngryPig
            | EnemyKind::Slime
            | EnemyKind::Plant
            | EnemyKind::Trunk
            | EnemyKind::Snail => 2,
            _ => 1,
        }
    }

    /// Movement speed (px/s)
    pub fn speed(&self) -> f32 {
        match self {
            EnemyKind::Rino | EnemyKind::BlueBird => 120.0,
            EnemyKind::Plant | EnemyKind::Trunk | EnemyKind::Ghost => 0.0,
            _ => 60.0,
        }
    }

    /// Hitbox size from the sprite sheets
    pub fn size(&self) -> Vec2 {
        let (w, h) = match self {
            EnemyKind::AngryPig => (36.0, 30.0),
            EnemyKind::Chicken => (32.0, 34.0),
            EnemyKind::Radish => (30.0, 38.0),
            EnemyKind::Rino => (52.0, 34.0),
            EnemyKind::Mushroom => (32.0, 32.0),
            EnemyKind::Bat => (46.0, 30.0),
            EnemyKind::Bee => (36.0, 34.0),
            EnemyKind::BlueBird => (32.0, 32.0),
            EnemyKind::Bunny => (34.0, 44.0),
            EnemyKind::Slime => (44.0, 30.0),
            EnemyKind::Plant => (44.0, 42.0),
            EnemyKind::Trunk => (64.0, 32.0),
            EnemyKind::Ghost => (44.0, 30.0),
            EnemyKind::Snail => (38.0, 24.0),
            EnemyKind::Turtle => (44.0, 26.0),
        };
        Vec2::new(w, h)
    }

    /// Behavior for an enemy spawned with its left edge at `x`
    pub fn behavior(&self, x: f32) -> EnemyBehavior {
        match self {
            EnemyKind::AngryPig => EnemyBehavior::patrol(x, 80.0),
            EnemyKind::Chicken | EnemyKind::Radish => EnemyBehavior::patrol(x, 64.0),
            EnemyKind::Rino => EnemyBehavior::patrol(x, 120.0),
            EnemyKind::Mushroom => EnemyBehavior::patrol(x, 48.0),
            EnemyKind::Bat | EnemyKind::BlueBird => EnemyBehavior::Flying,
            EnemyKind::Bee | EnemyKind::Trunk => EnemyBehavior::shooter(1.5),
            EnemyKind::Plant => EnemyBehavior::shooter(2.0),
            EnemyKind::Bunny | EnemyKind::Slime => EnemyBehavior::Jumper {
                force: JUMPER_FORCE,
            },
            EnemyKind::Ghost => EnemyBehavior::ghost(2.0),
            EnemyKind::Snail | EnemyKind::Turtle => EnemyBehavior::Shell { shelled: false },
        }
    }
}

/// An enemy entity
#[derive(Component, Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: EnemyBody,
    pub behavior: EnemyBehavior,
    pub hp: i32,
    invincibility: f32,
    dead: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, position: Vec2) -> Self {
        let size = kind.size();
        Self {
            kind,
            body: EnemyBody {
                bounds: Bounds::new(position.x, position.y, size.x, size.y),
                velocity: Velocity::ZERO,
                speed: kind.speed(),
                on_ground: false,
                facing: Facing::Right,
                pose: EnemyPose::Idle,
            },
            behavior: kind.behavior(position.x),
            hp: kind.hp(),
            invincibility: 0.0,
            dead: false,
        }
    }

    /// Run the behavior, then gravity against `surfaces`.
    pub fn update(&mut self, player: &Bounds, surfaces: &[Bounds], dt: f32) -> Option<EnemyEvent> {
        if self.dead {
            return None;
        }

        let event = self.behavior.update(&mut self.body, player, dt);
        if self.behavior.uses_gravity() {
            self.apply_gravity(surfaces, dt);
        }

        if self.invincibility > 0.0 {
            self.invincibility = (self.invincibility - dt).max(0.0);
            self.body.pose = EnemyPose::Hit;
        }
        event
    }

    fn apply_gravity(&mut self, surfaces: &[Bounds], dt: f32) {
        let body = &mut self.body;
        body.velocity.y += ENEMY_GRAVITY * dt;
        body.bounds.y += body.velocity.y * dt;
        body.on_ground = false;

        if body.velocity.y <= 0.0 {
            return;
        }
        for surface in surfaces {
            if body.bounds.intersects(surface) {
                body.bounds.y = surface.top() - body.bounds.h;
                body.velocity.y = 0.0;
                body.on_ground = true;
            }
        }
    }

    /// Apply a hit. Returns false while invincible or already dead.
    pub fn take_damage(&mut self, damage: i32, stomp: bool) -> bool {
        if self.dead || self.invincibility > 0.0 {
            return false;
        }

        self.hp -= damage;
        self.body.pose = EnemyPose::Hit;
        if stomp {
            self.behavior.on_stomped();
        }

        if self.hp <= 0 {
            debug!("{:?} defeated", self.kind);
            self.dead = true;
        } else {
            self.invincibility = ENEMY_INVINCIBILITY;
        }
        true
    }

    pub fn bounds(&self) -> Bounds {
        self.body.bounds
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    pub fn is_harmful(&self) -> bool {
        !self.dead && self.behavior.is_harmful()
    }
}

/// Outcome of a player/enemy overlap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    None,
    Stomp,
    Hurt,
}

/// Falling onto the top of an enemy stomps it; any other overlap hurts.
pub fn resolve_contact(actor: &mut Actor, enemy: &mut Enemy, dt: f32) -> Contact {
    if !enemy.is_harmful() || actor.animation_state().is_damage_sequence() {
        return Contact::None;
    }

    let player = actor.bounds();
    let target = enemy.bounds();
    if !player.intersects(&target) {
        return Contact::None;
    }

    let velocity = actor.velocity();
    let bottom_before = player.bottom() - velocity.y * dt;
    if velocity.y > 0.0 && bottom_before <= target.top() + STOMP_TOLERANCE {
        enemy.take_damage(STOMP_DAMAGE, true);
        actor.on_stomp();
        return Contact::Stomp;
    }

    if actor.take_damage() {
        Contact::Hurt
    } else {
        Contact::None
    }
}

/// Step enemies against the first actor, resolve contacts and drop the dead
fn update_enemies_system(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    surfaces: Query<&LevelSurface>,
    mut enemies: Query<(Entity, &mut Enemy)>,
    mut actors: Query<&mut Actor>,
    mut shots: EventWriter<EnemyShot>,
) {
    let dt = time.delta_seconds();
    let Some(mut actor) = actors.iter_mut().next() else {
        return;
    };

    let (mut ground, one_ways) = collect_surfaces(surfaces.iter());
    ground.extend(one_ways);

    for (entity, mut enemy) in enemies.iter_mut() {
        let player = actor.bounds();
        if let Some(EnemyEvent::Shoot { origin, direction }) = enemy.update(&player, &ground, dt) {
            shots.send(EnemyShot { origin, direction });
        }

        match resolve_contact(&mut actor, &mut enemy, dt) {
            Contact::Stomp => info!("Stomped {:?}", enemy.kind),
            Contact::Hurt => info!("Hurt by {:?}", enemy.kind),
            Contact::None => {}
        }

        if enemy.is_dead() {
            commands.entity(entity).despawn();
        }
    }
}
