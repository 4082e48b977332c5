//! Session state and core simulation types
//!
//! One session couples a single character with the wall manager that
//! threatens it. Score and health live outside, behind
//! [`Scoreboard`](super::score::Scoreboard).

use super::character::{Character, CharacterState, CharacterTuning};
use super::judgment::JudgeOutcome;
use super::manager::ObstacleManager;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Character died; only a reset leaves this phase
    GameOver,
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The combo advanced (directly or from the input buffer)
    Attacked(CharacterState),
    AttackBuffered,
    /// An attack found a wall in the hit zone
    Judged(JudgeOutcome),
    /// A wall hit the character and it survived
    Damaged,
    Died,
    ObstacleSpawned(u32),
    /// A spawn was attempted but refused (too close, or spawning inactive)
    SpawnRejected,
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub character: Character,
    pub walls: ObstacleManager,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Spawn placement restored on reset
    character_tuning: CharacterTuning,
}

impl GameSession {
    /// Create a new session with the given seed
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let walls = settings.effective_walls();
        let character_tuning = settings.character.sanitized();
        log::info!(
            "New session: seed {seed}, difficulty {}, wall speed {} px/frame",
            settings.difficulty.as_str(),
            walls.base_speed
        );
        Self {
            seed,
            character: Character::new(&character_tuning, settings.animations.clone()),
            walls: ObstacleManager::new(walls, seed),
            phase: GamePhase::Playing,
            time_ticks: 0,
            character_tuning,
        }
    }

    /// Start over as if freshly created with the same seed and settings:
    /// character back at its spawn point running, field cleared, wall RNG
    /// reseeded, rhythm and debug modes off. Walls scheduled by earlier beats
    /// are discarded.
    pub fn reset(&mut self) {
        let tuning = &self.character_tuning;
        self.character.reset(tuning.spawn_x, tuning.ground_y);
        self.character.set_scale(tuning.scale);
        self.character.set_state(CharacterState::Run);
        self.walls.reset();
        self.phase = GamePhase::Playing;
        self.time_ticks = 0;
        log::info!("Session reset (seed {})", self.seed);
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::manager::{BeatInfo, BeatPattern};

    #[test]
    fn test_new_session_is_running() {
        let session = GameSession::new(7, &Settings::default());
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.character.state(), CharacterState::Run);
        assert_eq!(session.character.x, crate::consts::CHARACTER_SPAWN_X);
        assert!(session.walls.obstacles().is_empty());
    }

    #[test]
    fn test_reset_restores_character_and_field() {
        let mut session = GameSession::new(7, &Settings::default());
        session.character.set_position(100.0, 500.0);
        session.character.take_hit(true);
        session.walls.set_rhythm_mode(true, 500.0);
        session.walls.spawn_on_beat(&BeatInfo::new(BeatPattern::combo()));
        session.phase = GamePhase::GameOver;
        session.time_ticks = 99;

        session.reset();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.time_ticks, 0);
        assert_eq!(session.character.state(), CharacterState::Run);
        assert_eq!(session.character.previous_state(), CharacterState::Idle);
        assert_eq!(session.character.x, crate::consts::CHARACTER_SPAWN_X);
        assert_eq!(session.walls.pending_spawns(), 0);
        assert!(session.walls.obstacles().is_empty());
        assert!(!session.walls.is_rhythm_mode());
    }

    #[test]
    fn test_reset_replays_like_new_session() {
        use crate::consts::SIM_DT;
        use crate::sim::score::ScoreTally;
        use crate::sim::tick::{TickInput, tick};

        let settings = Settings::default();
        let demo = TickInput {
            auto_play: true,
            ..Default::default()
        };
        let play = |session: &mut GameSession| {
            let mut board = ScoreTally::default();
            for _ in 0..400 {
                tick(session, &demo, SIM_DT, &mut board);
            }
            board.score
        };

        let mut session = GameSession::new(21, &settings);
        session.walls.toggle_debug();
        session.walls.set_rhythm_mode(true, 400.0);
        play(&mut session);
        session.reset();
        let replayed = play(&mut session);

        let mut fresh = GameSession::new(21, &settings);
        assert_eq!(replayed, play(&mut fresh));
        assert_eq!(session.walls.now_ms(), fresh.walls.now_ms());
        assert!(!session.walls.debug_mode());
        let shards = |s: &GameSession| -> Vec<_> {
            s.walls
                .obstacles()
                .iter()
                .flat_map(|o| o.shards().iter().map(|sh| sh.pos))
                .collect()
        };
        assert_eq!(shards(&session), shards(&fresh));
    }
}
