//! Sprite animation playback
//!
//! The character drives an [`Animator`] on every state change and every tick.
//! Drawing is done elsewhere; this only tracks which frame is showing and
//! whether a one-shot clip has run its course.

use serde::{Deserialize, Serialize};

use super::character::CharacterState;

/// A frame sequence plus how to play it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub frame_count: u32,
    /// Frames per second
    pub frame_rate: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(frame_count: u32, frame_rate: f32, looping: bool) -> Self {
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            log::warn!("Invalid frame rate {frame_rate}, using 1 fps");
            1.0
        };
        Self {
            frame_count: frame_count.max(1),
            frame_rate,
            looping,
        }
    }

    /// Seconds for one full pass over the frames
    pub fn cycle_secs(&self) -> f32 {
        self.frame_count as f32 / self.frame_rate
    }
}

/// Animation collaborator driven by the character
pub trait Animator {
    /// Start playing `clip` from its first frame
    fn play(&mut self, clip: AnimationClip);
    /// Advance playback by `dt` seconds
    fn advance(&mut self, dt: f32);
    /// True once a non-looping clip has shown its last frame for its full duration
    fn is_finished(&self) -> bool;
    /// Zero-based index of the frame currently showing
    fn frame_index(&self) -> u32;
    fn frame_count(&self) -> u32;
}

/// Default time-based animator
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clip: AnimationClip,
    elapsed: f32,
}

impl ClipPlayer {
    pub fn new(clip: AnimationClip) -> Self {
        Self { clip, elapsed: 0.0 }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new(AnimationClip::new(1, 1.0, true))
    }
}

impl Animator for ClipPlayer {
    fn play(&mut self, clip: AnimationClip) {
        self.clip = clip;
        self.elapsed = 0.0;
    }

    fn advance(&mut self, dt: f32) {
        if self.clip.looping {
            // Keep elapsed bounded so long runs don't lose precision
            self.elapsed = (self.elapsed + dt) % self.clip.cycle_secs();
        } else if !self.is_finished() {
            self.elapsed += dt;
        }
    }

    fn is_finished(&self) -> bool {
        !self.clip.looping && self.elapsed >= self.clip.cycle_secs()
    }

    fn frame_index(&self) -> u32 {
        let raw = (self.elapsed * self.clip.frame_rate) as u32;
        if self.clip.looping {
            raw % self.clip.frame_count
        } else {
            raw.min(self.clip.frame_count - 1)
        }
    }

    fn frame_count(&self) -> u32 {
        self.clip.frame_count
    }
}

/// Frame counts per character state.
///
/// `None` means no sprite data was provided for that state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSet {
    pub idle: Option<u32>,
    pub run: Option<u32>,
    pub right_punch: Option<u32>,
    pub left_punch: Option<u32>,
    pub uppercut: Option<u32>,
    pub jump_punch: Option<u32>,
    pub damaged: Option<u32>,
    pub dead: Option<u32>,
}

impl Default for AnimationSet {
    fn default() -> Self {
        Self {
            idle: Some(8),
            run: Some(8),
            right_punch: Some(6),
            left_punch: Some(6),
            uppercut: Some(6),
            // 3 takeoff frames + 4 strike frames
            jump_punch: Some(7),
            damaged: Some(4),
            dead: Some(6),
        }
    }
}

impl AnimationSet {
    /// A set with no data for any state
    pub fn empty() -> Self {
        Self {
            idle: None,
            run: None,
            right_punch: None,
            left_punch: None,
            uppercut: None,
            jump_punch: None,
            damaged: None,
            dead: None,
        }
    }

    pub fn frames_for(&self, state: CharacterState) -> Option<u32> {
        match state {
            CharacterState::Idle => self.idle,
            CharacterState::Run => self.run,
            CharacterState::RightPunch => self.right_punch,
            CharacterState::LeftPunch => self.left_punch,
            CharacterState::Uppercut => self.uppercut,
            CharacterState::JumpPunch => self.jump_punch,
            CharacterState::Damaged => self.damaged,
            CharacterState::Dead => self.dead,
        }
        .filter(|&n| n > 0)
    }

    /// Clip to play on entering `state`, if frames exist for it
    pub fn clip_for(&self, state: CharacterState) -> Option<AnimationClip> {
        self.frames_for(state)
            .map(|frames| AnimationClip::new(frames, state.frame_rate(), state.loops()))
    }
}
