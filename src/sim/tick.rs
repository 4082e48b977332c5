//! Frame tick
//!
//! Core game loop that advances a session deterministically, one frame at a time.

use super::character::{AttackOutcome, CharacterState};
use super::judgment::WOW_FRACTION;
use super::manager::{BeatInfo, SpawnOutcome};
use super::score::Scoreboard;
use super::state::{GameEvent, GamePhase, GameSession};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Attack button
    pub attack: bool,
    pub reset_combo: bool,
    /// Debug state override, 1 = Idle ... 8 = Dead
    pub force_state: Option<u8>,
    /// Beat detected by the music collaborator this frame
    pub beat: Option<BeatInfo>,
    /// New song section speed target
    pub section_multiplier: Option<f32>,
    /// Switch rhythm mode on/off with the given beat interval (ms)
    pub rhythm_mode: Option<(bool, f64)>,
    pub toggle_debug: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - attack on the WOW timing automatically
    pub auto_play: bool,
}

/// Advance the session by one frame and report what happened
pub fn tick(
    state: &mut GameSession,
    input: &TickInput,
    dt: f32,
    board: &mut impl Scoreboard,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if matches!(state.phase, GamePhase::Paused | GamePhase::GameOver) {
        return events;
    }
    state.time_ticks += 1;

    // Manager controls
    if input.toggle_debug {
        state.walls.toggle_debug();
    }
    if let Some((enabled, beat_ms)) = input.rhythm_mode {
        state.walls.set_rhythm_mode(enabled, beat_ms);
    }
    if let Some(multiplier) = input.section_multiplier {
        state.walls.set_speed_multiplier_for_section(multiplier);
    }
    if let Some(beat) = &input.beat {
        if state.walls.is_rhythm_mode() {
            let outcomes = state.walls.spawn_on_beat(beat);
            push_spawns(&mut events, &outcomes);
        }
    }

    let attack = input.attack || (input.auto_play && auto_play_should_attack(state));

    if input.reset_combo {
        state.character.reset_combo();
    }
    if let Some(index) = input.force_state {
        state.character.force_state(index);
    }

    if attack {
        match state.character.attack() {
            AttackOutcome::Performed(attack_state) => {
                events.push(GameEvent::Attacked(attack_state));
                judge(state, board, &mut events);
            }
            AttackOutcome::Buffered => events.push(GameEvent::AttackBuffered),
            AttackOutcome::Ignored(_) => {}
        }
    }

    // Animation, jump physics, buffered attacks
    let character_tick = state.character.tick(dt);
    if let Some(attack_state) = character_tick.replayed {
        events.push(GameEvent::Attacked(attack_state));
        judge(state, board, &mut events);
    }

    let outcomes = state.walls.tick(dt);
    push_spawns(&mut events, &outcomes);

    resolve_collision(state, board, &mut events);

    events
}

/// Judge the wall in the hit zone, if any, and settle the score
fn judge(state: &mut GameSession, board: &mut impl Scoreboard, events: &mut Vec<GameEvent>) {
    let Some(outcome) = state.walls.try_judge(state.character.x) else {
        return;
    };
    if outcome.tier.is_hit() {
        board.add_score(outcome.tier);
    } else {
        board.record_miss();
        board.break_combo();
    }
    events.push(GameEvent::Judged(outcome));
}

fn resolve_collision(
    state: &mut GameSession,
    board: &mut impl Scoreboard,
    events: &mut Vec<GameEvent>,
) {
    let character = &state.character;
    if character.is_invincible() || character.state() == CharacterState::Dead {
        return;
    }
    let Some(wall_id) = state.walls.colliding_obstacle(character.x).map(|o| o.id) else {
        return;
    };

    let dead = board.take_damage();
    board.break_combo();
    state.character.take_hit(dead);

    if dead {
        log::info!(
            "Character died to wall {wall_id} after {} ticks",
            state.time_ticks
        );
        state.phase = GamePhase::GameOver;
        state.walls.set_active(false);
        state.walls.cancel_pending();
        events.push(GameEvent::Died);
    } else {
        log::debug!("Character hit by wall {wall_id}");
        events.push(GameEvent::Damaged);
    }
}

fn push_spawns(events: &mut Vec<GameEvent>, outcomes: &[SpawnOutcome]) {
    events.extend(outcomes.iter().map(|outcome| match outcome {
        SpawnOutcome::Spawned(id) => GameEvent::ObstacleSpawned(*id),
        SpawnOutcome::TooClose | SpawnOutcome::Inactive => GameEvent::SpawnRejected,
    }));
}

/// Demo AI: swing when the leading unjudged wall sits in the WOW band
fn auto_play_should_attack(state: &GameSession) -> bool {
    let character = &state.character;
    if character.is_disabled() {
        return false;
    }
    let center = state.walls.hit_zone_center(character.x);
    let band = state.walls.tuning().hit_zone_width * WOW_FRACTION;
    state
        .walls
        .obstacles()
        .iter()
        .find(|o| o.is_standing() && !o.is_judged())
        .is_some_and(|o| (o.pos.x - center).abs() <= band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::judgment::JudgmentTier;
    use crate::sim::manager::BeatPattern;
    use crate::sim::score::ScoreTally;

    fn session(seed: u64) -> GameSession {
        GameSession::new(seed, &Settings::default())
    }

    fn attack() -> TickInput {
        TickInput {
            attack: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_attack_judges_wow() {
        let mut state = session(1);
        let mut board = ScoreTally::default();
        state.character.set_position(300.0, 700.0);
        state.walls.place_obstacle(470.0);

        let events = tick(&mut state, &attack(), SIM_DT, &mut board);
        assert_eq!(
            events[0],
            GameEvent::Attacked(CharacterState::RightPunch)
        );
        let GameEvent::Judged(outcome) = events[1] else {
            panic!("expected a judgment, got {events:?}");
        };
        assert_eq!(outcome.tier, JudgmentTier::Wow);
        assert!(outcome.destroyed);
        assert_eq!(board.score, 300);
        assert_eq!(board.wow, 1);
        assert_eq!(state.walls.destroyed_count(), 1);
    }

    #[test]
    fn test_attack_miss_breaks_streak() {
        let mut state = session(1);
        let mut board = ScoreTally::default();
        board.streak = 4;
        state.character.set_position(300.0, 700.0);
        state.walls.place_obstacle(600.0);

        let events = tick(&mut state, &attack(), SIM_DT, &mut board);
        assert!(events.iter().any(
            |e| matches!(e, GameEvent::Judged(o) if o.tier == JudgmentTier::Miss && !o.destroyed)
        ));
        assert_eq!(board.misses, 1);
        assert_eq!(board.streak, 0);
        assert_eq!(board.score, 0);
    }

    #[test]
    fn test_attack_with_nothing_in_range() {
        let mut state = session(1);
        let mut board = ScoreTally::default();
        let events = tick(&mut state, &attack(), SIM_DT, &mut board);
        assert_eq!(events, vec![GameEvent::Attacked(CharacterState::RightPunch)]);
        assert_eq!(board.misses, 0);
    }

    #[test]
    fn test_buffered_attack_replays_and_judges() {
        let mut state = session(1);
        let mut board = ScoreTally::default();
        tick(&mut state, &attack(), SIM_DT, &mut board);
        for _ in 0..19 {
            tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
        }
        assert!(state.character.is_attacking());

        // Close to the end of the punch; the wall drifts into the WOW band
        state.walls.set_active(false);
        let center = state.walls.hit_zone_center(state.character.x);
        state.walls.place_obstacle(center + 56.0);
        let events = tick(&mut state, &attack(), SIM_DT, &mut board);
        assert_eq!(events, vec![GameEvent::AttackBuffered]);

        let mut replayed = Vec::new();
        for _ in 0..8 {
            replayed = tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
            if !replayed.is_empty() {
                break;
            }
        }
        assert_eq!(
            replayed.first(),
            Some(&GameEvent::Attacked(CharacterState::LeftPunch))
        );
        assert!(
            matches!(replayed.get(1), Some(GameEvent::Judged(o)) if o.tier.is_hit()),
            "{replayed:?}"
        );
        assert_eq!(board.hits(), 1);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = session(5);
        let mut board = ScoreTally::default();
        tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
        assert_eq!(state.time_ticks, 1);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT, &mut board);
        assert_eq!(state.phase, GamePhase::Paused);
        let clock = state.walls.now_ms();
        for _ in 0..10 {
            tick(&mut state, &attack(), SIM_DT, &mut board);
        }
        assert_eq!(state.time_ticks, 1);
        assert_eq!(state.walls.now_ms(), clock);
        assert_eq!(state.character.state(), CharacterState::Run);

        // Unpause
        tick(&mut state, &pause, SIM_DT, &mut board);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_unattended_character_dies() {
        let mut state = session(3);
        let mut board = ScoreTally::default();
        let mut damaged = 0;
        let mut died_at = None;
        for t in 0..600 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
            damaged += events.iter().filter(|e| **e == GameEvent::Damaged).count();
            if events.contains(&GameEvent::Died) {
                died_at = Some(t);
                break;
            }
        }
        assert!(died_at.is_some(), "character should not survive unattended");
        assert_eq!(damaged, 2);
        assert_eq!(board.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.character.state(), CharacterState::Dead);
        assert!(!state.walls.is_active());

        // Frozen until reset
        let ticks = state.time_ticks;
        tick(&mut state, &attack(), SIM_DT, &mut board);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_invincibility_absorbs_lingering_wall() {
        let mut state = session(3);
        let mut board = ScoreTally::default();
        state.walls.set_active(false);
        state.walls.place_obstacle(state.character.x + 100.0);

        let mut hits = 0;
        for _ in 0..30 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
            hits += events.iter().filter(|e| **e == GameEvent::Damaged).count();
        }
        assert_eq!(hits, 1);
        assert_eq!(board.health, 2);
    }

    #[test]
    fn test_auto_play_survives() {
        let mut state = session(11);
        let mut board = ScoreTally::default();
        let input = TickInput {
            auto_play: true,
            ..Default::default()
        };
        for _ in 0..1800 {
            tick(&mut state, &input, SIM_DT, &mut board);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(board.health, 3);
        assert_eq!(board.misses, 0);
        assert!(board.wow >= 10, "only {} WOW hits", board.wow);
        assert!(state.walls.destroyed_count() >= 10);
    }

    #[test]
    fn test_beats_ignored_outside_rhythm_mode() {
        let mut state = session(2);
        let mut board = ScoreTally::default();
        let beat = TickInput {
            beat: Some(BeatInfo::new(BeatPattern::Normal)),
            ..Default::default()
        };
        let events = tick(&mut state, &beat, SIM_DT, &mut board);
        assert!(events.is_empty());

        let enable = TickInput {
            rhythm_mode: Some((true, 500.0)),
            ..beat
        };
        let events = tick(&mut state, &enable, SIM_DT, &mut board);
        assert!(matches!(events[..], [GameEvent::ObstacleSpawned(_)]));
    }

    #[test]
    fn test_reset_cancels_pending_spawns() {
        let mut state = session(2);
        let mut board = ScoreTally::default();
        let combo = TickInput {
            rhythm_mode: Some((true, 500.0)),
            beat: Some(BeatInfo::new(BeatPattern::Combo {
                count: 4,
                division: 4,
            })),
            ..Default::default()
        };
        tick(&mut state, &combo, SIM_DT, &mut board);
        assert_eq!(state.walls.pending_spawns(), 3);

        state.reset();
        assert_eq!(state.walls.pending_spawns(), 0);
        for _ in 0..60 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT, &mut board);
            assert!(events.is_empty());
        }
        assert!(state.walls.obstacles().is_empty());
    }

    #[test]
    fn test_force_state_and_reset_combo() {
        let mut state = session(2);
        let mut board = ScoreTally::default();
        tick(&mut state, &attack(), SIM_DT, &mut board);
        assert_eq!(state.character.combo(), 1);

        let input = TickInput {
            reset_combo: true,
            force_state: Some(1),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &mut board);
        assert_eq!(state.character.combo(), 0);
        assert_eq!(state.character.state(), CharacterState::Idle);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with same seed should produce identical results
        let mut state1 = session(99999);
        let mut state2 = session(99999);
        let mut board1 = ScoreTally::default();
        let mut board2 = ScoreTally::default();

        for t in 0..900u32 {
            let input = TickInput {
                auto_play: true,
                rhythm_mode: (t == 300).then_some((true, 1000.0)),
                beat: (t > 300 && t % 60 == 0).then(|| {
                    BeatInfo::new(if t % 240 == 0 {
                        BeatPattern::combo()
                    } else {
                        BeatPattern::Normal
                    })
                }),
                section_multiplier: (t == 450).then_some(1.5),
                ..Default::default()
            };
            let e1 = tick(&mut state1, &input, SIM_DT, &mut board1);
            let e2 = tick(&mut state2, &input, SIM_DT, &mut board2);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(board1.score, board2.score);
        let walls1 = state1.walls.obstacles();
        let walls2 = state2.walls.obstacles();
        assert_eq!(walls1.len(), walls2.len());
        for (a, b) in walls1.iter().zip(walls2) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
            let shards1: Vec<_> = a.shards().iter().map(|s| s.pos).collect();
            let shards2: Vec<_> = b.shards().iter().map(|s| s.pos).collect();
            assert_eq!(shards1, shards2);
        }
    }
}
