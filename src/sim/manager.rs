//! Wall lifecycle: spawning, timing judgment, collision and culling
//!
//! The manager owns every wall and the presentational records produced when
//! they are judged. Time is an internal monotonic millisecond clock advanced
//! by [`ObstacleManager::tick`], so deferred beat spawns are drained on frame
//! boundaries and can be cancelled on reset.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::judgment::{HitEffect, JudgeOutcome, JudgmentRecord, JudgmentTier};
use super::obstacle::Obstacle;
use crate::consts::*;
use crate::{non_negative_or, positive_or, wall_lane_y};

/// Spawn pattern attached to a detected beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeatPattern {
    /// One wall right now
    Normal,
    /// `count` walls spaced `beat_interval / division` apart
    Combo { count: u32, division: u32 },
}

impl BeatPattern {
    /// Two walls on eighth notes
    pub fn combo() -> Self {
        BeatPattern::Combo {
            count: 2,
            division: 2,
        }
    }
}

/// Beat notification from the music collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatInfo {
    pub pattern: BeatPattern,
}

impl BeatInfo {
    pub fn new(pattern: BeatPattern) -> Self {
        Self { pattern }
    }
}

/// Result of a spawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(u32),
    /// The newest standing wall is still within the safe distance of the spawn point
    TooClose,
    /// Spawning is switched off
    Inactive,
}

/// A combo-pattern spawn waiting for its time
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledSpawn {
    fire_at_ms: f64,
}

/// Wall spawning and judgment tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub game_width: f32,
    pub game_height: f32,
    /// Auto-spawn cadence at multiplier 1.0
    pub spawn_interval_ms: f64,
    /// Pixels per frame at multiplier 1.0
    pub base_speed: f32,
    pub max_speed_multiplier: f32,
    pub spawn_margin: f32,
    pub safe_distance: f32,
    pub hit_zone_offset: f32,
    pub hit_zone_width: f32,
    /// Width of the character's collision interval
    pub character_width: f32,
    pub judgment_display_ms: f64,
    /// Hit-effect flipbook length; 0 disables hit effects
    pub hit_effect_frames: u32,
    pub hit_effect_frame_ms: f64,
    /// Number of wall sprites to cycle through
    pub sprite_variants: usize,
    /// Beat length used by combo patterns (120 BPM)
    pub beat_interval_ms: f64,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            game_width: GAME_WIDTH,
            game_height: GAME_HEIGHT,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            base_speed: BASE_WALL_SPEED,
            max_speed_multiplier: MAX_SPEED_MULTIPLIER,
            spawn_margin: SPAWN_MARGIN,
            safe_distance: SPAWN_SAFE_DISTANCE,
            hit_zone_offset: HIT_ZONE_OFFSET,
            hit_zone_width: HIT_ZONE_WIDTH,
            character_width: CHARACTER_WIDTH,
            judgment_display_ms: JUDGMENT_DISPLAY_MS,
            hit_effect_frames: HIT_EFFECT_FRAMES,
            hit_effect_frame_ms: HIT_EFFECT_FRAME_MS,
            sprite_variants: 3,
            beat_interval_ms: 500.0,
        }
    }
}

impl ObstacleTuning {
    /// Replace non-finite or out-of-range values with their defaults
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.game_width = positive_or("game width", self.game_width, d.game_width);
        self.game_height = positive_or("game height", self.game_height, d.game_height);
        self.spawn_interval_ms =
            positive_or("spawn interval (ms)", self.spawn_interval_ms, d.spawn_interval_ms);
        self.base_speed = positive_or("wall speed", self.base_speed, d.base_speed);
        self.max_speed_multiplier = positive_or(
            "max speed multiplier",
            self.max_speed_multiplier,
            d.max_speed_multiplier,
        );
        self.spawn_margin = non_negative_or("spawn margin", self.spawn_margin, d.spawn_margin);
        self.safe_distance = non_negative_or("safe distance", self.safe_distance, d.safe_distance);
        if !self.hit_zone_offset.is_finite() {
            log::warn!(
                "Invalid hit zone offset {}, using {}",
                self.hit_zone_offset,
                d.hit_zone_offset
            );
            self.hit_zone_offset = d.hit_zone_offset;
        }
        self.hit_zone_width = positive_or("hit zone width", self.hit_zone_width, d.hit_zone_width);
        self.character_width =
            positive_or("character width", self.character_width, d.character_width);
        self.judgment_display_ms = positive_or(
            "judgment display (ms)",
            self.judgment_display_ms,
            d.judgment_display_ms,
        );
        self.hit_effect_frame_ms = positive_or(
            "hit effect frame (ms)",
            self.hit_effect_frame_ms,
            d.hit_effect_frame_ms,
        );
        self.beat_interval_ms =
            positive_or("beat interval (ms)", self.beat_interval_ms, d.beat_interval_ms);
        self
    }
}

/// Owns and drives every wall in play
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    tuning: ObstacleTuning,
    /// Spawn order, which is also left-to-right approach order
    obstacles: Vec<Obstacle>,
    /// Sorted by fire time
    schedule: Vec<ScheduledSpawn>,
    hit_effects: Vec<HitEffect>,
    last_judgment: Option<JudgmentRecord>,
    seed: u64,
    rng: Pcg32,
    now_ms: f64,
    last_spawn_ms: f64,
    speed_multiplier: f32,
    rhythm_mode: bool,
    beat_interval_ms: f64,
    active: bool,
    debug_mode: bool,
    destroyed_count: u32,
    next_id: u32,
    next_sprite: usize,
}

impl ObstacleManager {
    pub fn new(tuning: ObstacleTuning, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let beat_interval_ms = tuning.beat_interval_ms;
        let speed_multiplier = 1.0f32.min(tuning.max_speed_multiplier);
        Self {
            tuning,
            obstacles: Vec::new(),
            schedule: Vec::new(),
            hit_effects: Vec::new(),
            last_judgment: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0.0,
            last_spawn_ms: 0.0,
            speed_multiplier,
            rhythm_mode: false,
            beat_interval_ms,
            active: true,
            debug_mode: false,
            destroyed_count: 0,
            next_id: 1,
            next_sprite: 0,
        }
    }

    pub fn tuning(&self) -> &ObstacleTuning {
        &self.tuning
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn hit_effects(&self) -> &[HitEffect] {
        &self.hit_effects
    }

    pub fn last_judgment(&self) -> Option<&JudgmentRecord> {
        self.last_judgment.as_ref()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn destroyed_count(&self) -> u32 {
        self.destroyed_count
    }

    pub fn pending_spawns(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_rhythm_mode(&self) -> bool {
        self.rhythm_mode
    }

    pub fn beat_interval_ms(&self) -> f64 {
        self.beat_interval_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug_mode = !self.debug_mode;
        log::info!("Wall debug overlay: {}", self.debug_mode);
        self.debug_mode
    }

    /// Y coordinate walls travel along
    pub fn wall_y(&self) -> f32 {
        wall_lane_y(self.tuning.game_height)
    }

    pub fn hit_zone_center(&self, character_x: f32) -> f32 {
        character_x + self.tuning.hit_zone_offset
    }

    /// Switch between beat-driven and interval-driven spawning
    pub fn set_rhythm_mode(&mut self, enabled: bool, beat_interval_ms: f64) {
        self.rhythm_mode = enabled;
        if beat_interval_ms.is_finite() && beat_interval_ms > 0.0 {
            self.beat_interval_ms = beat_interval_ms;
        } else {
            log::warn!("Ignoring beat interval {beat_interval_ms} ms");
        }
        log::info!(
            "Rhythm mode {} (beat {} ms)",
            if enabled { "on" } else { "off" },
            self.beat_interval_ms
        );
    }

    /// Apply a section's speed target, capped at the configured maximum.
    /// Only walls spawned afterwards pick up the new speed.
    pub fn set_speed_multiplier_for_section(&mut self, multiplier: f32) -> f32 {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            log::warn!("Ignoring speed multiplier {multiplier}");
            return self.speed_multiplier;
        }
        self.speed_multiplier = multiplier.min(self.tuning.max_speed_multiplier);
        log::debug!("Speed multiplier x{:.2}", self.speed_multiplier);
        self.speed_multiplier
    }

    /// Put a new wall just past the right edge
    pub fn spawn_obstacle(&mut self) -> SpawnOutcome {
        let spawn_x = self.tuning.game_width + self.tuning.spawn_margin;

        let newest = self.obstacles.iter().rev().find(|o| o.is_standing());
        if let Some(newest) = newest {
            if (newest.pos.x - spawn_x).abs() < self.tuning.safe_distance {
                log::debug!("Spawn skipped: wall {} too close to spawn point", newest.id);
                return SpawnOutcome::TooClose;
            }
        }

        let speed = self.tuning.base_speed * self.speed_multiplier;
        let id = self.next_id;
        self.next_id += 1;

        let mut wall = Obstacle::new(id, spawn_x, self.wall_y(), speed);
        if self.tuning.sprite_variants > 0 {
            wall.sprite_variant = self.next_sprite;
            self.next_sprite = (self.next_sprite + 1) % self.tuning.sprite_variants;
        }
        self.obstacles.push(wall);
        SpawnOutcome::Spawned(id)
    }

    /// Interval spawning; does nothing in rhythm mode
    pub fn auto_spawn(&mut self) -> Option<SpawnOutcome> {
        if !self.active || self.rhythm_mode {
            return None;
        }
        let interval = self.tuning.spawn_interval_ms / self.speed_multiplier as f64;
        if self.now_ms - self.last_spawn_ms >= interval {
            self.last_spawn_ms = self.now_ms;
            return Some(self.spawn_obstacle());
        }
        None
    }

    /// React to a beat. Combo patterns spawn their first wall immediately and
    /// schedule the rest; the returned outcomes cover only immediate spawns.
    pub fn spawn_on_beat(&mut self, beat: &BeatInfo) -> Vec<SpawnOutcome> {
        if !self.active {
            return vec![SpawnOutcome::Inactive];
        }
        match beat.pattern {
            BeatPattern::Normal => vec![self.spawn_obstacle()],
            BeatPattern::Combo { count, division } => {
                let spacing = self.beat_interval_ms / division.max(1) as f64;
                let mut spawned = Vec::new();
                for i in 0..count {
                    if i == 0 {
                        spawned.push(self.spawn_obstacle());
                    } else {
                        self.schedule_spawn(self.now_ms + i as f64 * spacing);
                    }
                }
                spawned
            }
        }
    }

    fn schedule_spawn(&mut self, fire_at_ms: f64) {
        let index = self.schedule.partition_point(|s| s.fire_at_ms <= fire_at_ms);
        self.schedule.insert(index, ScheduledSpawn { fire_at_ms });
    }

    /// Drop every scheduled spawn. Returns how many were discarded.
    pub fn cancel_pending(&mut self) -> usize {
        let dropped = self.schedule.len();
        self.schedule.clear();
        if dropped > 0 {
            log::debug!("Cancelled {dropped} pending spawns");
        }
        dropped
    }

    fn drain_schedule(&mut self) -> Vec<SpawnOutcome> {
        let due = self
            .schedule
            .iter()
            .take_while(|s| s.fire_at_ms <= self.now_ms)
            .count();
        if due == 0 {
            return Vec::new();
        }
        self.schedule.drain(..due);
        if !self.active {
            log::debug!("Dropped {due} scheduled spawns while inactive");
            return Vec::new();
        }
        (0..due).map(|_| self.spawn_obstacle()).collect()
    }

    /// Judge the first unjudged standing wall overlapping the hit zone.
    ///
    /// Walls are scanned in spawn order and only the first eligible one is
    /// judged, so a single attack can never grade two walls. Returns `None`
    /// when nothing eligible is in range.
    pub fn try_judge(&mut self, character_x: f32) -> Option<JudgeOutcome> {
        let center = self.hit_zone_center(character_x);
        let width = self.tuning.hit_zone_width;

        let index = self
            .obstacles
            .iter()
            .position(|o| !o.is_judged() && o.is_in_hit_zone(center, width))?;

        let wall_y = self.wall_y();
        let now = self.now_ms;
        let wall = &mut self.obstacles[index];
        let x = wall.pos.x;
        let tier = JudgmentTier::from_distance(x - center, width);
        wall.mark_judged();

        let destroyed = tier.is_hit();
        if destroyed {
            wall.destroy(&mut self.rng);
            self.destroyed_count += 1;
            if self.tuning.hit_effect_frames > 0 {
                self.hit_effects.push(HitEffect::new(
                    x,
                    wall_y,
                    now,
                    self.tuning.hit_effect_frames,
                    self.tuning.hit_effect_frame_ms,
                ));
            }
        }

        self.last_judgment = Some(JudgmentRecord {
            tier,
            time_ms: now,
            x,
            y: wall_y - 150.0,
        });
        log::debug!(
            "Wall {} judged {} at distance {:.1}",
            wall.id,
            tier.as_str(),
            (x - center).abs()
        );

        Some(JudgeOutcome {
            tier,
            destroyed,
            obstacle_id: wall.id,
        })
    }

    /// First standing wall overlapping the character, if any
    pub fn colliding_obstacle(&self, character_x: f32) -> Option<&Obstacle> {
        let width = self.tuning.character_width;
        self.obstacles
            .iter()
            .find(|o| o.is_colliding_with(character_x, width))
    }

    pub fn check_collision(&self, character_x: f32) -> bool {
        self.colliding_obstacle(character_x).is_some()
    }

    /// Advance the clock by `dt` seconds, fire due spawns, move and cull walls,
    /// expire presentational records. Returns every spawn attempted this tick.
    pub fn tick(&mut self, dt: f32) -> Vec<SpawnOutcome> {
        self.now_ms += dt as f64 * 1000.0;

        let mut spawns = self.drain_schedule();
        spawns.extend(self.auto_spawn());

        for wall in &mut self.obstacles {
            wall.tick();
        }
        self.obstacles.retain(|o| !o.should_remove());

        let now = self.now_ms;
        self.hit_effects.retain(|e| !e.is_expired(now));
        if self
            .last_judgment
            .is_some_and(|j| now - j.time_ms > self.tuning.judgment_display_ms)
        {
            self.last_judgment = None;
        }

        spawns
    }

    /// Back to the state `new` produced: walls, pending spawns, records, clock,
    /// RNG, rhythm and debug modes all start over. Tuning is kept.
    pub fn reset(&mut self) {
        self.cancel_pending();
        *self = Self::new(self.tuning.clone(), self.seed);
    }

    /// Place a standing wall directly at `x` (fixtures)
    #[cfg(test)]
    pub(crate) fn place_obstacle(&mut self, x: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let speed = self.tuning.base_speed * self.speed_multiplier;
        self.obstacles.push(Obstacle::new(id, x, self.wall_y(), speed));
        id
    }
}
