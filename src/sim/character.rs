//! Player character state machine
//!
//! Eight discrete states, a three-stage punch combo, and a simple jump arc.
//! Rejected intents never fail loudly: they return an outcome describing why
//! the request was ignored and leave the character untouched.

use serde::{Deserialize, Serialize};

use super::animation::{AnimationSet, Animator, ClipPlayer};
use crate::consts::*;
use crate::positive_or;

/// Discrete character state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterState {
    /// Pre-game and state recovery only
    Idle,
    /// Default resting state during play
    Run,
    RightPunch,
    LeftPunch,
    Uppercut,
    JumpPunch,
    Damaged,
    /// Absorbing: only an explicit transition to `Idle` leaves it
    Dead,
}

impl CharacterState {
    pub const ALL: [CharacterState; 8] = [
        CharacterState::Idle,
        CharacterState::Run,
        CharacterState::RightPunch,
        CharacterState::LeftPunch,
        CharacterState::Uppercut,
        CharacterState::JumpPunch,
        CharacterState::Damaged,
        CharacterState::Dead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterState::Idle => "IDLE",
            CharacterState::Run => "RUN",
            CharacterState::RightPunch => "RIGHT_PUNCH",
            CharacterState::LeftPunch => "LEFT_PUNCH",
            CharacterState::Uppercut => "UPPERCUT",
            CharacterState::JumpPunch => "JUMP_PUNCH",
            CharacterState::Damaged => "DAMAGED",
            CharacterState::Dead => "DEAD",
        }
    }

    /// Debug override numbering: 1 = Idle ... 8 = Dead
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1..=8 => Some(Self::ALL[(index - 1) as usize]),
            _ => None,
        }
    }

    pub fn is_attacking(&self) -> bool {
        matches!(
            self,
            CharacterState::RightPunch
                | CharacterState::LeftPunch
                | CharacterState::Uppercut
                | CharacterState::JumpPunch
        )
    }

    /// Dead, damaged, or mid-attack
    pub fn is_disabled(&self) -> bool {
        matches!(self, CharacterState::Dead | CharacterState::Damaged) || self.is_attacking()
    }

    /// Only idle and run loop; everything else plays once
    pub fn loops(&self) -> bool {
        matches!(self, CharacterState::Idle | CharacterState::Run)
    }

    /// Playback speed in frames per second
    pub fn frame_rate(&self) -> f32 {
        match self {
            CharacterState::Idle => 8.0,
            CharacterState::Run => 12.0,
            CharacterState::RightPunch | CharacterState::LeftPunch | CharacterState::Uppercut => {
                15.0
            }
            CharacterState::JumpPunch => 12.0,
            CharacterState::Damaged => 10.0,
            CharacterState::Dead => 8.0,
        }
    }

    /// States that end on their own when their one-shot animation completes
    fn self_terminates(&self) -> bool {
        !matches!(
            self,
            CharacterState::Run | CharacterState::Idle | CharacterState::Dead
        )
    }
}

/// Why an attack request was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Dead,
    Damaged,
    Attacking,
}

/// Result of [`Character::attack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The combo advanced into this attack state
    Performed(CharacterState),
    /// Pressed mid-attack; will replay if the attack ends soon enough
    Buffered,
    Ignored(IgnoreReason),
}

impl AttackOutcome {
    pub fn performed(&self) -> Option<CharacterState> {
        match self {
            AttackOutcome::Performed(state) => Some(*state),
            _ => None,
        }
    }
}

/// Why a state change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionBlock {
    SameState,
    DeadIsAbsorbing,
}

/// Result of [`Character::set_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied {
        from: CharacterState,
        to: CharacterState,
    },
    Ignored(TransitionBlock),
}

impl Transition {
    pub fn applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

/// What happened during one [`Character::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterTick {
    /// Jump ended on the ground this tick
    pub landed: bool,
    /// A buffered attack fired this tick
    pub replayed: Option<CharacterState>,
}

/// Character placement and physics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    pub spawn_x: f32,
    pub ground_y: f32,
    pub scale: f32,
    /// Initial jump velocity (pixels/frame, negative = up)
    pub jump_speed: f32,
    /// Pixels/frame² pulling the jump back down
    pub gravity: f32,
    /// Ticks of invulnerability after a non-lethal hit
    pub invincibility_ticks: u32,
    /// Ticks a mid-attack press stays buffered (0 disables buffering)
    pub attack_buffer_ticks: u32,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            spawn_x: CHARACTER_SPAWN_X,
            ground_y: CHARACTER_GROUND_Y,
            scale: CHARACTER_SCALE,
            jump_speed: JUMP_SPEED,
            gravity: JUMP_GRAVITY,
            invincibility_ticks: INVINCIBILITY_TICKS,
            attack_buffer_ticks: ATTACK_BUFFER_TICKS,
        }
    }
}

impl CharacterTuning {
    /// Replace non-finite or out-of-range values with their defaults
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let finite_or = |name: &str, value: f32, fallback: f32| {
            if value.is_finite() {
                value
            } else {
                log::warn!("Invalid {name} {value}, using {fallback}");
                fallback
            }
        };
        Self {
            spawn_x: finite_or("spawn x", self.spawn_x, d.spawn_x),
            ground_y: finite_or("ground y", self.ground_y, d.ground_y),
            scale: positive_or("scale", self.scale, d.scale),
            // Upward is negative
            jump_speed: -positive_or("jump speed (upward)", -self.jump_speed, -d.jump_speed),
            gravity: positive_or("gravity", self.gravity, d.gravity),
            invincibility_ticks: self.invincibility_ticks,
            attack_buffer_ticks: self.attack_buffer_ticks,
        }
    }
}

/// The player character
#[derive(Debug, Clone)]
pub struct Character<A: Animator = ClipPlayer> {
    pub x: f32,
    pub ground_y: f32,
    pub scale: f32,
    state: CharacterState,
    previous: CharacterState,
    /// Next combo stage: 0 right punch, 1 left punch, 2 uppercut
    combo: u8,
    jump_offset: f32,
    jump_velocity: f32,
    jumping: bool,
    jump_speed: f32,
    gravity: f32,
    invincibility_window: u32,
    invincible_ticks: u32,
    buffer_window: u32,
    /// Ticks left before a buffered press expires
    buffered_attack: Option<u32>,
    animations: AnimationSet,
    animator: A,
    animation_degraded: bool,
}

impl Character {
    pub fn new(tuning: &CharacterTuning, animations: AnimationSet) -> Self {
        Self::with_animator(tuning, animations, ClipPlayer::default())
    }
}

impl<A: Animator> Character<A> {
    /// Create a running character at the tuned spawn point
    pub fn with_animator(tuning: &CharacterTuning, animations: AnimationSet, animator: A) -> Self {
        let tuning = tuning.sanitized();
        let mut character = Self {
            x: tuning.spawn_x,
            ground_y: tuning.ground_y,
            scale: tuning.scale,
            state: CharacterState::Run,
            previous: CharacterState::Run,
            combo: 0,
            jump_offset: 0.0,
            jump_velocity: 0.0,
            jumping: false,
            jump_speed: tuning.jump_speed,
            gravity: tuning.gravity,
            invincibility_window: tuning.invincibility_ticks,
            invincible_ticks: 0,
            buffer_window: tuning.attack_buffer_ticks,
            buffered_attack: None,
            animations,
            animator,
            animation_degraded: false,
        };
        character.update_animation();
        character
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn previous_state(&self) -> CharacterState {
        self.previous
    }

    pub fn combo(&self) -> u8 {
        self.combo
    }

    pub fn is_attacking(&self) -> bool {
        self.state.is_attacking()
    }

    pub fn is_disabled(&self) -> bool {
        self.state.is_disabled()
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// Vertical jump offset (negative = airborne)
    pub fn jump_offset(&self) -> f32 {
        self.jump_offset
    }

    pub fn jump_velocity(&self) -> f32 {
        self.jump_velocity
    }

    /// Where to draw the character's feet
    pub fn render_y(&self) -> f32 {
        self.ground_y + self.jump_offset
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    pub fn has_buffered_attack(&self) -> bool {
        self.buffered_attack.is_some()
    }

    /// True when the last transition found no animation data for its state
    pub fn animation_degraded(&self) -> bool {
        self.animation_degraded
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn frame_index(&self) -> u32 {
        self.animator.frame_index()
    }

    pub fn frame_count(&self) -> u32 {
        self.animator.frame_count()
    }

    pub fn set_position(&mut self, x: f32, ground_y: f32) {
        self.x = x;
        self.ground_y = ground_y;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Advance the punch combo by one stage
    pub fn attack(&mut self) -> AttackOutcome {
        match self.state {
            CharacterState::Dead => {
                log::debug!("attack ignored: character is dead");
                AttackOutcome::Ignored(IgnoreReason::Dead)
            }
            CharacterState::Damaged => {
                log::debug!("attack ignored: character is recovering from a hit");
                AttackOutcome::Ignored(IgnoreReason::Damaged)
            }
            state if state.is_attacking() => {
                if self.buffer_window > 0 {
                    self.buffered_attack = Some(self.buffer_window);
                    log::debug!("attack buffered during {}", state.as_str());
                    AttackOutcome::Buffered
                } else {
                    log::debug!("attack ignored: {} still playing", state.as_str());
                    AttackOutcome::Ignored(IgnoreReason::Attacking)
                }
            }
            _ => self.perform_attack(),
        }
    }

    fn perform_attack(&mut self) -> AttackOutcome {
        let (next, combo) = match self.combo {
            0 => (CharacterState::RightPunch, 1),
            1 => (CharacterState::LeftPunch, 2),
            _ => (CharacterState::Uppercut, 0),
        };
        self.set_state(next);
        self.combo = combo;
        log::debug!("{} (next combo stage {})", next.as_str(), combo);
        AttackOutcome::Performed(next)
    }

    /// Restart the combo at the right punch
    pub fn reset_combo(&mut self) {
        self.combo = 0;
        self.buffered_attack = None;
        log::debug!("combo reset");
    }

    pub fn set_state(&mut self, new: CharacterState) -> Transition {
        if self.state == new && new != CharacterState::Dead {
            return Transition::Ignored(TransitionBlock::SameState);
        }
        if self.state == CharacterState::Dead && new != CharacterState::Idle {
            log::debug!("transition to {} ignored: character is dead", new.as_str());
            return Transition::Ignored(TransitionBlock::DeadIsAbsorbing);
        }

        self.previous = self.state;
        self.state = new;
        self.update_animation();

        match new {
            CharacterState::JumpPunch => self.start_jump(),
            CharacterState::Idle => self.stop_jump(),
            _ => {}
        }
        if matches!(
            new,
            CharacterState::Idle | CharacterState::Damaged | CharacterState::Dead
        ) {
            self.buffered_attack = None;
        }

        log::debug!(
            "state: {} -> {}",
            self.previous.as_str(),
            self.state.as_str()
        );
        Transition::Applied {
            from: self.previous,
            to: new,
        }
    }

    /// Debug override by number (1 = Idle ... 8 = Dead)
    pub fn force_state(&mut self, index: u8) -> Option<Transition> {
        let Some(state) = CharacterState::from_index(index) else {
            log::debug!("no character state for index {index}");
            return None;
        };
        Some(self.set_state(state))
    }

    /// React to a collision. Lethal hits kill; others stagger and grant
    /// a window of invulnerability.
    pub fn take_hit(&mut self, lethal: bool) -> Transition {
        self.reset_combo();
        if lethal {
            self.invincible_ticks = 0;
            self.set_state(CharacterState::Dead)
        } else {
            self.invincible_ticks = self.invincibility_window;
            self.set_state(CharacterState::Damaged)
        }
    }

    /// Back to a fresh pre-game character at the given spot
    pub fn reset(&mut self, x: f32, ground_y: f32) {
        self.set_state(CharacterState::Idle);
        self.set_position(x, ground_y);
        self.combo = 0;
        self.invincible_ticks = 0;
        self.buffered_attack = None;
    }

    fn update_animation(&mut self) {
        match self.animations.clip_for(self.state) {
            Some(clip) => {
                self.animator.play(clip);
                self.animation_degraded = false;
            }
            None => {
                log::warn!(
                    "No animation for state {}, keeping previous frames",
                    self.state.as_str()
                );
                self.animation_degraded = true;
            }
        }
    }

    fn start_jump(&mut self) {
        if !self.jumping {
            self.jumping = true;
            self.jump_velocity = self.jump_speed;
        }
    }

    fn stop_jump(&mut self) {
        self.jumping = false;
        self.jump_offset = 0.0;
        self.jump_velocity = 0.0;
    }

    /// Returns true on the tick the jump touches down
    fn update_jump(&mut self) -> bool {
        if !self.jumping {
            return false;
        }
        self.jump_velocity += self.gravity;
        self.jump_offset += self.jump_velocity;

        if self.jump_offset >= 0.0 {
            self.stop_jump();
            if self.state == CharacterState::JumpPunch {
                self.set_state(CharacterState::Run);
            }
            return true;
        }
        false
    }

    /// Advance animation, jump physics and timers by one frame
    pub fn tick(&mut self, dt: f32) -> CharacterTick {
        let was_attacking = self.is_attacking();

        self.animator.advance(dt);
        if self.animator.is_finished() && self.state.self_terminates() {
            self.set_state(CharacterState::Run);
        }

        let landed = self.update_jump();

        let mut replayed = None;
        if was_attacking && self.state == CharacterState::Run && self.buffered_attack.is_some() {
            self.buffered_attack = None;
            replayed = self.perform_attack().performed();
        }

        if let Some(remaining) = self.buffered_attack {
            self.buffered_attack = remaining.checked_sub(1).filter(|&t| t > 0);
        }
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);

        CharacterTick { landed, replayed }
    }
}
