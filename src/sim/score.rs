//! Score and health bookkeeping
//!
//! The simulation reports judgments and damage through [`Scoreboard`]; it
//! never owns score or health itself.

use serde::{Deserialize, Serialize};

use super::judgment::JudgmentTier;

/// Receiver for judgment and damage side effects
pub trait Scoreboard {
    /// A wall was broken with the given grade
    fn add_score(&mut self, tier: JudgmentTier);
    /// An attack graded MISS
    fn record_miss(&mut self);
    /// A wall hit the character. Returns true if that was fatal.
    fn take_damage(&mut self) -> bool;
    fn break_combo(&mut self);
}

/// Starting health
pub const DEFAULT_HEALTH: u8 = 3;

/// In-memory scoreboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTally {
    pub score: u64,
    pub wow: u32,
    pub great: u32,
    pub good: u32,
    pub misses: u32,
    /// Consecutive hits since the last miss or damage
    pub streak: u32,
    pub best_streak: u32,
    pub health: u8,
    pub hits_taken: u32,
}

impl Default for ScoreTally {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH)
    }
}

impl ScoreTally {
    pub fn new(health: u8) -> Self {
        Self {
            score: 0,
            wow: 0,
            great: 0,
            good: 0,
            misses: 0,
            streak: 0,
            best_streak: 0,
            health,
            hits_taken: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Broken walls across all tiers
    pub fn hits(&self) -> u32 {
        self.wow + self.great + self.good
    }

    /// Fraction of judged attacks that broke a wall
    pub fn accuracy(&self) -> f32 {
        let judged = self.hits() + self.misses;
        if judged == 0 {
            0.0
        } else {
            self.hits() as f32 / judged as f32
        }
    }
}

impl Scoreboard for ScoreTally {
    fn add_score(&mut self, tier: JudgmentTier) {
        match tier {
            JudgmentTier::Wow => self.wow += 1,
            JudgmentTier::Great => self.great += 1,
            JudgmentTier::Good => self.good += 1,
            JudgmentTier::Miss => {
                self.record_miss();
                return;
            }
        }
        self.score += tier.points();
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    fn record_miss(&mut self) {
        self.misses += 1;
    }

    fn take_damage(&mut self) -> bool {
        self.hits_taken += 1;
        self.health = self.health.saturating_sub(1);
        self.is_dead()
    }

    fn break_combo(&mut self) {
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_and_streaks() {
        let mut tally = ScoreTally::default();
        tally.add_score(JudgmentTier::Wow);
        tally.add_score(JudgmentTier::Great);
        tally.add_score(JudgmentTier::Good);
        assert_eq!(tally.score, 600);
        assert_eq!(tally.streak, 3);

        tally.record_miss();
        tally.break_combo();
        tally.add_score(JudgmentTier::Wow);
        assert_eq!(tally.streak, 1);
        assert_eq!(tally.best_streak, 3);
        assert_eq!(tally.accuracy(), 0.8);
    }

    #[test]
    fn test_damage_until_dead() {
        let mut tally = ScoreTally::new(2);
        assert!(!tally.take_damage());
        assert!(tally.take_damage());
        assert!(tally.take_damage());
        assert_eq!(tally.health, 0);
        assert_eq!(tally.hits_taken, 3);
    }

    #[test]
    fn test_miss_tier_counts_as_miss() {
        let mut tally = ScoreTally::default();
        tally.add_score(JudgmentTier::Miss);
        assert_eq!(tally.misses, 1);
        assert_eq!(tally.score, 0);
        assert_eq!(tally.accuracy(), 0.0);
    }
}
