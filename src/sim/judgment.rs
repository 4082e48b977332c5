//! Timing judgment tiers and the presentational records they leave behind

use serde::{Deserialize, Serialize};

/// Fractions of the hit-zone width bounding each tier (inclusive)
pub const WOW_FRACTION: f32 = 0.15;
pub const GREAT_FRACTION: f32 = 0.30;
pub const GOOD_FRACTION: f32 = 0.45;

/// Accuracy grade for a single attack against a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JudgmentTier {
    Wow,
    Great,
    Good,
    Miss,
}

impl JudgmentTier {
    /// Grade a hit by distance from the hit-zone center
    pub fn from_distance(distance: f32, zone_width: f32) -> Self {
        let distance = distance.abs();
        if distance <= zone_width * WOW_FRACTION {
            JudgmentTier::Wow
        } else if distance <= zone_width * GREAT_FRACTION {
            JudgmentTier::Great
        } else if distance <= zone_width * GOOD_FRACTION {
            JudgmentTier::Good
        } else {
            JudgmentTier::Miss
        }
    }

    /// Anything but a miss breaks the wall
    pub fn is_hit(&self) -> bool {
        *self != JudgmentTier::Miss
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JudgmentTier::Wow => "WOW",
            JudgmentTier::Great => "GREAT",
            JudgmentTier::Good => "GOOD",
            JudgmentTier::Miss => "MISS",
        }
    }

    /// Score value awarded for this tier
    pub fn points(&self) -> u64 {
        match self {
            JudgmentTier::Wow => 300,
            JudgmentTier::Great => 200,
            JudgmentTier::Good => 100,
            JudgmentTier::Miss => 0,
        }
    }
}

/// Result of a judgment attempt that found a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeOutcome {
    pub tier: JudgmentTier,
    pub destroyed: bool,
    pub obstacle_id: u32,
}

/// Last judgment, kept around for the popup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgmentRecord {
    pub tier: JudgmentTier,
    pub time_ms: f64,
    pub x: f32,
    pub y: f32,
}

impl JudgmentRecord {
    /// 0..1 progress through the popup's lifetime
    pub fn progress(&self, now_ms: f64, display_ms: f64) -> f32 {
        if display_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.time_ms) / display_ms).clamp(0.0, 1.0) as f32
    }
}

/// Flipbook burst played where a wall was broken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEffect {
    pub x: f32,
    pub y: f32,
    pub started_ms: f64,
    pub frame_ms: f64,
    pub duration_ms: f64,
}

impl HitEffect {
    pub fn new(x: f32, y: f32, started_ms: f64, frames: u32, frame_ms: f64) -> Self {
        Self {
            x,
            y,
            started_ms,
            frame_ms,
            duration_ms: frames as f64 * frame_ms,
        }
    }

    /// Frame to show at `now_ms`, or `None` once the burst is over
    pub fn frame_index(&self, now_ms: f64) -> Option<u32> {
        if self.is_expired(now_ms) || self.frame_ms <= 0.0 {
            return None;
        }
        let elapsed = (now_ms - self.started_ms).max(0.0);
        Some((elapsed / self.frame_ms) as u32)
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tiers_for_reference_zone() {
        assert_eq!(JudgmentTier::from_distance(20.0, 200.0), JudgmentTier::Wow);
        assert_eq!(JudgmentTier::from_distance(50.0, 200.0), JudgmentTier::Great);
        assert_eq!(JudgmentTier::from_distance(80.0, 200.0), JudgmentTier::Good);
        assert_eq!(JudgmentTier::from_distance(150.0, 200.0), JudgmentTier::Miss);
    }

    #[test]
    fn test_tier_boundaries_inclusive() {
        assert_eq!(JudgmentTier::from_distance(30.0, 200.0), JudgmentTier::Wow);
        assert_eq!(JudgmentTier::from_distance(60.0, 200.0), JudgmentTier::Great);
        assert_eq!(JudgmentTier::from_distance(89.5, 200.0), JudgmentTier::Good);
        assert_eq!(JudgmentTier::from_distance(90.5, 200.0), JudgmentTier::Miss);
    }

    #[test]
    fn test_hit_effect_frames() {
        let effect = HitEffect::new(10.0, 20.0, 1000.0, 8, 40.0);
        assert_eq!(effect.duration_ms, 320.0);
        assert_eq!(effect.frame_index(1000.0), Some(0));
        assert_eq!(effect.frame_index(1085.0), Some(2));
        assert_eq!(effect.frame_index(1319.0), Some(7));
        assert_eq!(effect.frame_index(1320.0), None);
        assert!(effect.is_expired(1400.0));
    }

    #[test]
    fn test_judgment_progress() {
        let record = JudgmentRecord {
            tier: JudgmentTier::Great,
            time_ms: 500.0,
            x: 0.0,
            y: 0.0,
        };
        assert_eq!(record.progress(500.0, 800.0), 0.0);
        assert_eq!(record.progress(900.0, 800.0), 0.5);
        assert_eq!(record.progress(2000.0, 800.0), 1.0);
    }

    proptest! {
        #[test]
        fn tiers_are_monotonic_in_distance(
            a in 0.0f32..400.0,
            b in 0.0f32..400.0,
            width in 1.0f32..500.0,
        ) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                JudgmentTier::from_distance(near, width) <= JudgmentTier::from_distance(far, width)
            );
        }
    }
}
