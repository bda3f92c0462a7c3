use crate::components::SkillSet;
use crate::enums::{Facing, Skill};
use crate::plugins::ability::try_ground_jump;
use crate::plugins::player::Actor;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Remaining distance or time below this counts as done
const COMPLETION_EPSILON: f32 = 1e-3;

/// Plugin for running scripted command text on the player
pub struct ScriptPlugin;

impl Plugin for ScriptPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RunScript>()
            .add_systems(Update, run_script_system);
    }
}

/// Event carrying script text to run on the player.
/// Any script already running is cancelled first.
#[derive(Event, Clone, Debug)]
pub struct RunScript {
    pub source: String,
}

/// Result of polling the active command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Pending,
    Complete,
}

/// A single scripted instruction with its runtime progress
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    /// Walk `steps` grid units in `direction`
    Move {
        direction: Facing,
        steps: u32,
        moved: f32,
    },
    Jump,
    Wait {
        duration: f32,
        elapsed: f32,
    },
}

impl ScriptCommand {
    pub fn move_steps(direction: Facing, steps: u32) -> Self {
        ScriptCommand::Move {
            direction,
            steps: steps.max(1),
            moved: 0.0,
        }
    }

    pub fn move_right(steps: u32) -> Self {
        Self::move_steps(Facing::Right, steps)
    }

    pub fn move_left(steps: u32) -> Self {
        Self::move_steps(Facing::Left, steps)
    }

    pub fn jump() -> Self {
        ScriptCommand::Jump
    }

    pub fn wait(duration: f32) -> Self {
        ScriptCommand::Wait {
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Called once when the command becomes active.
    pub fn start(&mut self, actor: &mut Actor, skills: &SkillSet) {
        match self {
            ScriptCommand::Move {
                direction,
                steps,
                moved,
            } => {
                if !skills.has(Skill::Move) {
                    // Refused: finishes on the next poll without moving
                    *moved = *steps as f32 * actor.config.grid_unit;
                    actor.velocity.x = 0.0;
                    return;
                }
                actor.facing = *direction;
                actor.velocity.x = direction.sign() * actor.config.move_speed;
            }
            ScriptCommand::Jump => {
                if !try_ground_jump(actor, skills) {
                    debug!("Scripted jump refused");
                }
            }
            ScriptCommand::Wait { .. } => {
                actor.velocity.x = 0.0;
            }
        }
    }

    /// Called once per step after physics while the command is active.
    pub fn poll(&mut self, actor: &mut Actor, dt: f32) -> CommandStatus {
        match self {
            ScriptCommand::Move {
                direction,
                steps,
                moved,
            } => {
                let total = *steps as f32 * actor.config.grid_unit;
                *moved += actor.velocity.x.abs() * dt;
                let remaining = total - *moved;

                if remaining <= COMPLETION_EPSILON {
                    actor.velocity.x = 0.0;
                    return CommandStatus::Complete;
                }

                // Trim the final step so the total lands exactly on the grid
                let speed = actor.config.move_speed.min(remaining / dt);
                actor.velocity.x = direction.sign() * speed;
                CommandStatus::Pending
            }
            ScriptCommand::Jump => CommandStatus::Complete,
            ScriptCommand::Wait { duration, elapsed } => {
                actor.velocity.x = 0.0;
                *elapsed += dt;
                if *elapsed >= *duration - COMPLETION_EPSILON {
                    CommandStatus::Complete
                } else {
                    CommandStatus::Pending
                }
            }
        }
    }
}

/// FIFO of scripted commands with at most one active
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<ScriptCommand>,
    active: Option<ScriptCommand>,
    scripted: bool,
}

impl CommandQueue {
    pub fn push(&mut self, command: ScriptCommand) {
        self.pending.push_back(command);
        self.scripted = true;
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.active = None;
        self.scripted = false;
    }

    pub fn is_scripted(&self) -> bool {
        self.scripted
    }

    pub fn active(&self) -> Option<&ScriptCommand> {
        self.active.as_ref()
    }

    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.active.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Poll the active command, then start the next one in the same step.
/// Scripted mode ends once nothing is left.
pub(crate) fn run_interpreter(actor: &mut Actor, skills: &SkillSet, dt: f32) {
    if !actor.commands.is_scripted() {
        return;
    }

    if let Some(mut command) = actor.commands.active.take() {
        if command.poll(actor, dt) == CommandStatus::Pending {
            actor.commands.active = Some(command);
            return;
        }
    }

    match actor.commands.pending.pop_front() {
        Some(mut next) => {
            next.start(actor, skills);
            actor.commands.active = Some(next);
        }
        None => {
            debug!("Script finished, leaving scripted mode");
            actor.commands.scripted = false;
        }
    }
}

/// Parse script text, one instruction per line.
///
/// Recognized: `move_right(n)`, `move_left(n)`, `jump()`, `wait(t)`, matched
/// by command-name prefix. Blank lines and `#` comments are skipped. A missing
/// or malformed number falls back to 1. Anything else is ignored.
pub fn parse_script(source: &str) -> Vec<ScriptCommand> {
    source.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ScriptCommand> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if line.starts_with("move_right") {
        Some(ScriptCommand::move_right(parse_count(line)))
    } else if line.starts_with("move_left") {
        Some(ScriptCommand::move_left(parse_count(line)))
    } else if line.starts_with("jump") {
        Some(ScriptCommand::jump())
    } else if line.starts_with("wait") {
        Some(ScriptCommand::wait(parse_number(line).unwrap_or(1.0)))
    } else {
        warn!("Ignoring unknown script line: {}", line);
        None
    }
}

/// Number between the parentheses, if there is a valid one
fn parse_number(line: &str) -> Option<f32> {
    let open = line.find('(')?;
    let close = line[open..].find(')')? + open;
    line[open + 1..close]
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_count(line: &str) -> u32 {
    parse_number(line)
        .map(|value| value.max(1.0) as u32)
        .unwrap_or(1)
}

/// Parse incoming scripts and hand them to every actor
fn run_script_system(mut events: EventReader<RunScript>, mut actors: Query<&mut Actor>) {
    for event in events.read() {
        let commands = parse_script(&event.source);
        info!("Running script with {} commands", commands.len());

        for mut actor in actors.iter_mut() {
            actor.cancel_script();
            for command in commands.iter().cloned() {
                actor.enqueue_command(command);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Bounds;
    use crate::config::{FIXED_TIMESTEP, GRID_UNIT, MovementConfig};
    use crate::enums::AnimationState;
    use crate::plugins::animation::AnimationSet;
    use crate::plugins::player::PLAYER_SIZE;

    const DT: f32 = FIXED_TIMESTEP;

    fn floor() -> Bounds {
        Bounds::new(-2000.0, 200.0, 4000.0, 32.0)
    }

    fn grounded_actor() -> Actor {
        let mut actor = Actor::new(
            Vec2::new(64.0, floor().top() - PLAYER_SIZE.y),
            PLAYER_SIZE,
            AnimationSet::default(),
            MovementConfig::default(),
        );
        step(&mut actor, &SkillSet::starter());
        actor
    }

    fn step(actor: &mut Actor, skills: &SkillSet) {
        actor.update(DT, None, skills, &[floor()], &[]);
    }

    #[test]
    fn test_move_jump_wait_queue_drains_cleanly() {
        let skills = SkillSet::from(vec![Skill::Move, Skill::Jump]);
        let mut actor = grounded_actor();
        let start_x = actor.bounds().x;

        actor.enqueue_command(ScriptCommand::move_right(2));
        actor.enqueue_command(ScriptCommand::jump());
        actor.enqueue_command(ScriptCommand::wait(1.0));

        let mut jumped = false;
        for _ in 0..240 {
            step(&mut actor, &skills);
            jumped |= actor.velocity().y < 0.0;
        }

        assert!(jumped);
        assert!(!actor.is_scripted());
        assert_eq!(actor.velocity().x, 0.0);
        assert!((actor.bounds().x - (start_x + 2.0 * GRID_UNIT)).abs() < 0.01);
        assert!(actor.is_grounded());
        assert_eq!(actor.animation_state(), AnimationState::Idle);
    }

    #[test]
    fn test_move_without_skill_completes_in_place() {
        let skills = SkillSet::from(vec![Skill::Jump]);
        let mut actor = grounded_actor();
        let start_x = actor.bounds().x;

        actor.enqueue_command(ScriptCommand::move_left(4));
        for _ in 0..5 {
            step(&mut actor, &skills);
        }

        assert!(!actor.is_scripted());
        assert_eq!(actor.bounds().x, start_x);
    }

    #[test]
    fn test_blocked_move_still_completes() {
        let skills = SkillSet::starter();
        let mut actor = grounded_actor();
        let wall = Bounds::new(actor.bounds().right(), 0.0, 32.0, 200.0);

        actor.enqueue_command(ScriptCommand::move_right(1));
        for _ in 0..30 {
            actor.update(DT, None, &skills, &[floor(), wall], &[]);
        }

        assert!(!actor.is_scripted());
        assert_eq!(actor.bounds().right(), wall.left());
    }

    #[test]
    fn test_jump_command_completes_next_poll() {
        let skills = SkillSet::starter();
        let mut actor = grounded_actor();

        actor.enqueue_command(ScriptCommand::jump());
        step(&mut actor, &skills);
        assert_eq!(actor.velocity().y, actor.config.jump_velocity);
        assert!(actor.is_scripted());

        step(&mut actor, &skills);
        assert!(!actor.is_scripted());
    }

    #[test]
    fn test_jump_command_while_airborne_is_refused() {
        let skills = SkillSet::starter();
        let mut actor = Actor::new(
            Vec2::new(64.0, 0.0),
            PLAYER_SIZE,
            AnimationSet::default(),
            MovementConfig::default(),
        );
        step(&mut actor, &skills);
        assert!(!actor.is_grounded());

        let mut unscripted = actor.clone();
        actor.enqueue_command(ScriptCommand::jump());
        step(&mut actor, &skills);
        step(&mut unscripted, &skills);

        assert_eq!(actor.jump_count(), 0);
        assert_eq!(actor.velocity().y, unscripted.velocity().y);
        assert!(actor.velocity().y > 0.0);

        step(&mut actor, &skills);
        assert!(!actor.is_scripted());
    }

    #[test]
    fn test_jump_command_without_skill_is_refused() {
        let skills = SkillSet::from(vec![Skill::Move]);
        let mut actor = grounded_actor();

        actor.enqueue_command(ScriptCommand::jump());
        step(&mut actor, &skills);
        assert_eq!(actor.jump_count(), 0);
        assert_eq!(actor.velocity().y, 0.0);
        assert!(actor.is_grounded());

        step(&mut actor, &skills);
        assert!(!actor.is_scripted());
    }

    #[test]
    fn test_wait_counts_fixed_steps() {
        let skills = SkillSet::starter();
        let mut actor = grounded_actor();

        actor.enqueue_command(ScriptCommand::wait(0.5));
        // One step to start, then thirty polls
        for _ in 0..30 {
            step(&mut actor, &skills);
            assert!(actor.is_scripted());
        }
        step(&mut actor, &skills);
        assert!(!actor.is_scripted());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut queue = CommandQueue::default();
        queue.push(ScriptCommand::jump());
        queue.push(ScriptCommand::wait(1.0));
        assert_eq!(queue.len(), 2);
        assert!(queue.is_scripted());

        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_scripted());
        assert!(queue.active().is_none());
    }

    #[test]
    fn test_parse_known_commands() {
        let commands = parse_script("move_right(3)\nmove_left(2)\njump()\nwait(1.5)");
        assert_eq!(
            commands,
            vec![
                ScriptCommand::move_right(3),
                ScriptCommand::move_left(2),
                ScriptCommand::jump(),
                ScriptCommand::wait(1.5),
            ]
        );
    }

    #[test]
    fn test_parse_defaults_and_clamps() {
        let commands = parse_script("move_right()\nmove_left(abc)\nwait\nmove_right(0)");
        assert_eq!(
            commands,
            vec![
                ScriptCommand::move_right(1),
                ScriptCommand::move_left(1),
                ScriptCommand::wait(1.0),
                ScriptCommand::move_right(1),
            ]
        );
    }

    #[test]
    fn test_parse_skips_comments_and_unknown_lines() {
        let source = "# walk to the gap\n\n  move_right(2)  \nfly()\nrun_fast(3)\njump()";
        let commands = parse_script(source);
        assert_eq!(
            commands,
            vec![ScriptCommand::move_right(2), ScriptCommand::jump()]
        );
    }

    #[test]
    fn test_parse_matches_by_prefix() {
        let source = "move_right 3\njump\nmove_left(2) # back\nwait(0.5)s";
        let commands = parse_script(source);
        assert_eq!(
            commands,
            vec![
                ScriptCommand::move_right(1),
                ScriptCommand::jump(),
                ScriptCommand::move_left(2),
                ScriptCommand::wait(0.5),
            ]
        );
    }

    #[test]
    fn test_run_script_event_replaces_running_script() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(ScriptPlugin);

        let mut actor = grounded_actor();
        actor.enqueue_command(ScriptCommand::wait(10.0));
        let entity = app.world.spawn(actor).id();

        app.world.send_event(RunScript {
            source: "jump()\nmove_left(2)".to_string(),
        });
        app.update();

        let actor = app.world.get::<Actor>(entity).unwrap();
        assert!(actor.is_scripted());
        assert_eq!(actor.commands.len(), 2);
    }
}
