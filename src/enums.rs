use serde::{Deserialize, Serialize};

/// Skill enum - movement capabilities the player can unlock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Move,
    Jump,
    DoubleJump,
    WallSlide,
    WallJump,
    Dash,
}

impl Skill {
    pub const ALL: [Skill; 6] = [
        Skill::Move,
        Skill::Jump,
        Skill::DoubleJump,
        Skill::WallSlide,
        Skill::WallJump,
        Skill::Dash,
    ];

    /// Look up a skill by its flag name, e.g. `"double_jump"`.
    pub fn from_name(name: &str) -> Option<Skill> {
        match name.trim() {
            "move" => Some(Skill::Move),
            "jump" => Some(Skill::Jump),
            "double_jump" => Some(Skill::DoubleJump),
            "wall_slide" => Some(Skill::WallSlide),
            "wall_jump" => Some(Skill::WallJump),
            "dash" => Some(Skill::Dash),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Skill::Move => "move",
            Skill::Jump => "jump",
            Skill::DoubleJump => "double_jump",
            Skill::WallSlide => "wall_slide",
            Skill::WallJump => "wall_jump",
            Skill::Dash => "dash",
        }
    }
}

/// Animation state - the single discrete pose picked every step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    #[default]
    Idle,
    Run,
    Jump,
    DoubleJump,
    Fall,
    WallSlide,
    Dash,
    Hit,
    Disappear,
    Appear,
}

impl AnimationState {
    pub const ALL: [AnimationState; 10] = [
        AnimationState::Idle,
        AnimationState::Run,
        AnimationState::Jump,
        AnimationState::DoubleJump,
        AnimationState::Fall,
        AnimationState::WallSlide,
        AnimationState::Dash,
        AnimationState::Hit,
        AnimationState::Disappear,
        AnimationState::Appear,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Hit, Disappear and Appear freeze on their last frame instead of looping
    pub fn loops(self) -> bool {
        !self.is_damage_sequence()
    }

    /// States owned by the damage/respawn override track
    pub fn is_damage_sequence(self) -> bool {
        matches!(
            self,
            AnimationState::Hit | AnimationState::Disappear | AnimationState::Appear
        )
    }
}

/// Horizontal facing, also used as the direction of scripted moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_names_round_trip() {
        for skill in Skill::ALL {
            assert_eq!(Skill::from_name(skill.name()), Some(skill));
        }
        assert_eq!(Skill::from_name("attack"), None);
        assert_eq!(Skill::from_name(""), None);
    }

    #[test]
    fn test_skill_serde_uses_flag_names() {
        let json = serde_json::to_string(&Skill::WallJump).unwrap();
        assert_eq!(json, "\"wall_jump\"");
    }

    #[test]
    fn test_damage_states_play_once() {
        for state in AnimationState::ALL {
            assert_eq!(state.loops(), !state.is_damage_sequence());
        }
        assert!(!AnimationState::Hit.loops());
        assert!(AnimationState::Run.loops());
    }

    #[test]
    fn test_animation_state_indices_are_dense() {
        for (i, state) in AnimationState::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.opposite(), Facing::Right);
    }
}
