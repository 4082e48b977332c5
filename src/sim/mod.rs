//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-driven updates only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for walls)
//! - No rendering, audio or platform dependencies

pub mod animation;
pub mod character;
pub mod collision;
pub mod judgment;
pub mod manager;
pub mod obstacle;
pub mod score;
pub mod state;
pub mod tick;

pub use animation::{AnimationClip, AnimationSet, Animator, ClipPlayer};
pub use character::{
    AttackOutcome, Character, CharacterState, CharacterTick, CharacterTuning, IgnoreReason,
    Transition, TransitionBlock,
};
pub use collision::spans_overlap;
pub use judgment::{HitEffect, JudgeOutcome, JudgmentRecord, JudgmentTier};
pub use manager::{BeatInfo, BeatPattern, ObstacleManager, ObstacleTuning, SpawnOutcome};
pub use obstacle::{Obstacle, ObstacleState, Shard};
pub use score::{ScoreTally, Scoreboard};
pub use state::{GameEvent, GamePhase, GameSession};
pub use tick::{TickInput, tick};
