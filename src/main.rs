//! Beat Brawler headless runner
//!
//! Plays one minute of simulated frames in demo mode against a synthetic beat
//! track and logs how the run went.
//!
//! Usage: `beat-brawler [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use beat_brawler::Settings;
    use beat_brawler::consts::SIM_DT;
    use beat_brawler::sim::{
        BeatInfo, BeatPattern, GameEvent, GameSession, ScoreTally, TickInput, tick,
    };

    /// One minute at 60 Hz
    const TOTAL_TICKS: u64 = 60 * 60;
    /// Beat-driven spawning takes over halfway through
    const RHYTHM_START_TICK: u64 = TOTAL_TICKS / 2;
    /// 60 BPM synthetic track
    const BEAT_TICKS: u64 = 60;
    const BEAT_INTERVAL_MS: f64 = 1000.0;
    /// Every 4th beat is a two-wall combo
    const COMBO_EVERY: u64 = 4;
    /// Song sections are 15 seconds; each one speeds walls up
    const SECTION_TICKS: u64 = 15 * 60;
    const SECTION_SPEEDUP: f32 = 0.25;

    pub fn run() {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load(path),
            None => Settings::default(),
        };
        let seed = args
            .next()
            .and_then(|s| match s.parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    log::warn!("Ignoring seed {s:?}: {e}");
                    None
                }
            })
            .unwrap_or_else(clock_seed);

        log::info!("Beat Brawler (headless) starting, seed {seed}");

        let mut session = GameSession::new(seed, &settings);
        let mut board = ScoreTally::default();
        let mut spawned = 0u32;
        let mut rejected = 0u32;

        for t in 1..=TOTAL_TICKS {
            let input = frame_input(t);
            for event in tick(&mut session, &input, SIM_DT, &mut board) {
                match event {
                    GameEvent::ObstacleSpawned(_) => spawned += 1,
                    GameEvent::SpawnRejected => rejected += 1,
                    GameEvent::Judged(outcome) => {
                        log::debug!("t={t}: {}", outcome.tier.as_str());
                    }
                    GameEvent::Damaged => {
                        log::info!("t={t}: hit, health {}", board.health);
                    }
                    GameEvent::Died => log::info!("t={t}: game over"),
                    GameEvent::Attacked(_) | GameEvent::AttackBuffered => {}
                }
            }
            if session.is_over() {
                break;
            }
        }

        log::info!(
            "Run finished after {} ticks: score {}, {} walls broken",
            session.time_ticks,
            board.score,
            session.walls.destroyed_count()
        );
        println!("seed        {seed}");
        println!("ticks       {}", session.time_ticks);
        println!("score       {}", board.score);
        println!(
            "WOW/GREAT/GOOD/MISS  {}/{}/{}/{}",
            board.wow, board.great, board.good, board.misses
        );
        println!("best streak {}", board.best_streak);
        println!("accuracy    {:.1}%", board.accuracy() * 100.0);
        println!("health      {}", board.health);
        println!("walls       {spawned} spawned, {rejected} rejected");
    }

    /// Synthetic music track for frame `t`
    fn frame_input(t: u64) -> TickInput {
        let in_rhythm = t > RHYTHM_START_TICK;
        let beat = (in_rhythm && t % BEAT_TICKS == 0).then(|| {
            let pattern = if (t / BEAT_TICKS) % COMBO_EVERY == 0 {
                BeatPattern::combo()
            } else {
                BeatPattern::Normal
            };
            BeatInfo::new(pattern)
        });
        let section = t / SECTION_TICKS;
        let section_multiplier = (t % SECTION_TICKS == 0)
            .then(|| 1.0 + SECTION_SPEEDUP * section as f32);

        TickInput {
            auto_play: true,
            rhythm_mode: (t == RHYTHM_START_TICK).then_some((true, BEAT_INTERVAL_MS)),
            beat,
            section_multiplier,
            ..Default::default()
        }
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native only
}
