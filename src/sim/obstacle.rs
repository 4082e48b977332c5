//! Wall entities and their shatter effect

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::spans_overlap;
use crate::consts::*;

/// Wall lifecycle.
///
/// A standing wall is solid: it moves, can be judged and can hit the
/// character. A destroyed wall has no physical presence left; only its
/// shards keep animating where it broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleState {
    Normal,
    Destroyed,
}

/// One piece of a shattered wall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub size: f32,
    /// 255 = opaque, fades toward 0
    pub alpha: f32,
}

impl Shard {
    fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += SHARD_GRAVITY;
        self.rotation += self.spin;
        self.alpha -= SHARD_FADE_PER_FRAME;
        self.size *= SHARD_SHRINK;
    }

    fn is_spent(&self) -> bool {
        self.alpha <= 0.0 || self.size <= SHARD_MIN_SIZE
    }
}

/// A destructible wall sliding toward the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Center of the wall; frozen at the break point once destroyed
    pub pos: Vec2,
    /// Pixels per frame, fixed at spawn
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Which wall sprite to draw
    pub sprite_variant: usize,
    state: ObstacleState,
    judged: bool,
    shards: Vec<Shard>,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, y: f32, speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, y),
            speed,
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            sprite_variant: 0,
            state: ObstacleState::Normal,
            judged: false,
            shards: Vec::new(),
        }
    }

    pub fn state(&self) -> ObstacleState {
        self.state
    }

    pub fn is_standing(&self) -> bool {
        self.state == ObstacleState::Normal
    }

    pub fn is_judged(&self) -> bool {
        self.judged
    }

    /// Latch the judged flag. Returns false if it was already set.
    pub fn mark_judged(&mut self) -> bool {
        !std::mem::replace(&mut self.judged, true)
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Horizontal position that takes part in overlap tests, if any
    pub fn collision_x(&self) -> Option<f32> {
        self.is_standing().then_some(self.pos.x)
    }

    /// Break the wall. Only the first call has any effect.
    pub fn destroy(&mut self, rng: &mut impl Rng) -> bool {
        if self.state == ObstacleState::Destroyed {
            return false;
        }
        self.state = ObstacleState::Destroyed;

        let jitter_x = self.width / 3.0;
        let jitter_y = self.height / 3.0;
        self.shards.reserve(SHARD_COUNT);
        for _ in 0..SHARD_COUNT {
            let offset = Vec2::new(spread(rng, jitter_x), spread(rng, jitter_y));
            self.shards.push(Shard {
                pos: self.pos + offset,
                // Outward burst, always kicked upward
                vel: Vec2::new(rng.random_range(-8.0..8.0), rng.random_range(-10.0..-4.0)),
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                spin: rng.random_range(-0.3..0.3),
                size: rng.random_range(15.0..30.0),
                alpha: SHARD_START_ALPHA,
            });
        }
        true
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        match self.state {
            ObstacleState::Normal => self.pos.x -= self.speed,
            ObstacleState::Destroyed => {
                for shard in &mut self.shards {
                    shard.update();
                }
                self.shards.retain(|s| !s.is_spent());
            }
        }
    }

    /// Ready to be dropped from the manager
    pub fn should_remove(&self) -> bool {
        match self.state {
            ObstacleState::Destroyed => self.shards.is_empty(),
            ObstacleState::Normal => self.pos.x < -self.width - WALL_CULL_MARGIN,
        }
    }

    pub fn is_in_hit_zone(&self, zone_center: f32, zone_width: f32) -> bool {
        self.collision_x()
            .is_some_and(|x| spans_overlap(x, self.width, zone_center, zone_width))
    }

    pub fn is_colliding_with(&self, other_center: f32, other_width: f32) -> bool {
        self.collision_x()
            .is_some_and(|x| spans_overlap(x, self.width, other_center, other_width))
    }
}

/// Uniform sample in (-extent, extent), or 0 for a degenerate extent
fn spread(rng: &mut impl Rng, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.random_range(-extent..extent)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_standing_wall_moves_left() {
        let mut wall = Obstacle::new(1, 1000.0, 475.0, 16.0);
        wall.tick();
        wall.tick();
        assert_eq!(wall.pos.x, 968.0);
        assert!(wall.shards().is_empty());
    }

    #[test]
    fn test_destroy_once() {
        let mut rng = rng();
        let mut wall = Obstacle::new(1, 500.0, 475.0, 16.0);
        assert!(wall.destroy(&mut rng));
        assert_eq!(wall.shards().len(), SHARD_COUNT);
        assert!(!wall.destroy(&mut rng));
        assert_eq!(wall.shards().len(), SHARD_COUNT);
        assert_eq!(wall.state(), ObstacleState::Destroyed);
    }

    #[test]
    fn test_shards_start_near_wall() {
        let mut wall = Obstacle::new(1, 500.0, 475.0, 16.0);
        wall.destroy(&mut rng());
        for shard in wall.shards() {
            assert!((shard.pos.x - 500.0).abs() <= WALL_WIDTH / 3.0);
            assert!((shard.pos.y - 475.0).abs() <= WALL_HEIGHT / 3.0);
            assert!(shard.vel.y < 0.0);
            assert!(shard.size >= 15.0 && shard.size < 30.0);
            assert_eq!(shard.alpha, SHARD_START_ALPHA);
        }
    }

    #[test]
    fn test_destroyed_wall_stays_until_shards_fade() {
        let mut wall = Obstacle::new(1, 500.0, 475.0, 16.0);
        wall.destroy(&mut rng());
        assert!(!wall.should_remove());

        // Destroyed walls no longer move
        wall.tick();
        assert_eq!(wall.pos.x, 500.0);

        let mut frames = 1;
        while !wall.should_remove() {
            wall.tick();
            frames += 1;
            assert!(frames < 100, "shards never faded");
        }
        assert!(wall.shards().is_empty());
    }

    #[test]
    fn test_offscreen_wall_removed() {
        let mut wall = Obstacle::new(1, -WALL_WIDTH - WALL_CULL_MARGIN + 1.0, 475.0, 16.0);
        assert!(!wall.should_remove());
        wall.tick();
        assert!(wall.should_remove());
    }

    #[test]
    fn test_overlap_only_while_standing() {
        let mut wall = Obstacle::new(1, 470.0, 475.0, 16.0);
        assert!(wall.is_in_hit_zone(450.0, 200.0));
        assert!(wall.is_colliding_with(400.0, 100.0));
        // (160 + 200) / 2 = 180 away is just outside
        assert!(!wall.is_in_hit_zone(650.0, 200.0));

        wall.destroy(&mut rng());
        assert!(!wall.is_in_hit_zone(450.0, 200.0));
        assert!(!wall.is_colliding_with(470.0, 100.0));
        assert!(wall.collision_x().is_none());
    }

    #[test]
    fn test_judged_latches() {
        let mut wall = Obstacle::new(1, 0.0, 0.0, 1.0);
        assert!(!wall.is_judged());
        assert!(wall.mark_judged());
        assert!(!wall.mark_judged());
        assert!(wall.is_judged());
    }
}
