pub mod characters;
pub mod food;

use std::{sync::Arc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    clock::Clock,
    config::GameConfig,
    gesture::FrameReadings,
    score::{self, HighScoreStore},
    types::{FrameSize, GameEvent, GameKind, GamePhase},
};

pub use characters::{Character, CharacterGame, CharacterPool};
pub use food::{Food, FoodGame, SpawnEdge};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score(u32);

impl Score {
    pub fn value(&self) -> u32 {
        self.0
    }

    fn add(&mut self, points: u32) -> u32 {
        self.0 = self.0.saturating_add(points);
        self.0
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

pub struct TickContext<'a> {
    pub now: Duration,
    pub frame: FrameSize,
    pub rng: &'a mut StdRng,
    score: &'a mut Score,
    events: &'a mut Vec<GameEvent>,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        now: Duration,
        frame: FrameSize,
        rng: &'a mut StdRng,
        score: &'a mut Score,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        Self {
            now,
            frame,
            rng,
            score,
            events,
        }
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    pub fn award(&mut self, points: u32) {
        let score = self.score.add(points);
        self.events.push(GameEvent::ScoreChanged {
            score,
            delta: points,
        });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

pub trait GameMode {
    fn kind(&self) -> GameKind;

    fn round_length(&self) -> Duration;

    fn reset(&mut self, ctx: &mut TickContext<'_>);

    fn update(&mut self, readings: &FrameReadings, ctx: &mut TickContext<'_>);

    fn finish(&mut self) {}

    fn entity_count(&self) -> usize;
}

pub struct GameSession<M: GameMode, C: Clock> {
    config: Arc<GameConfig>,
    mode: M,
    clock: C,
    store: Box<dyn HighScoreStore>,
    rng: StdRng,
    phase: GamePhase,
    score: Score,
    started_at: Option<Duration>,
    last_heart_at: Option<Duration>,
    heart_latched: bool,
    high_score: u32,
    new_record: bool,
}

impl<M: GameMode, C: Clock> GameSession<M, C> {
    pub fn new(config: Arc<GameConfig>, mode: M, clock: C, store: Box<dyn HighScoreStore>) -> Self {
        let high_score = score::load_or_zero(store.as_ref());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "{}{} ready, high score {high_score}",
            mode.kind().emoji(),
            mode.kind().display_name()
        );

        Self {
            config,
            mode,
            clock,
            store,
            rng,
            phase: GamePhase::Waiting,
            score: Score::default(),
            started_at: None,
            last_heart_at: None,
            heart_latched: false,
            high_score,
            new_record: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn elapsed(&self) -> Duration {
        match (self.phase, self.started_at) {
            (GamePhase::Playing, Some(start)) => self.clock.now().saturating_sub(start),
            (GamePhase::Finished, _) => self.mode.round_length(),
            _ => Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.mode.round_length().saturating_sub(self.elapsed())
    }

    pub fn tick(&mut self, readings: &FrameReadings) -> Vec<GameEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        self.handle_heart(readings, now, &mut events);

        if self.phase == GamePhase::Playing {
            let start = self.started_at.unwrap_or(now);
            if now.saturating_sub(start) >= self.mode.round_length() {
                self.finish(&mut events);
            } else {
                let mut ctx = TickContext::new(
                    now,
                    self.config.frame,
                    &mut self.rng,
                    &mut self.score,
                    &mut events,
                );
                self.mode.update(readings, &mut ctx);
            }
        }

        events
    }

    fn handle_heart(&mut self, readings: &FrameReadings, now: Duration, events: &mut Vec<GameEvent>) {
        let Some(heart) = readings.heart.filter(|h| h.is_heart()) else {
            self.heart_latched = false;
            return;
        };

        if self.phase == GamePhase::Playing {
            return;
        }
        if self.config.heart.require_release && self.heart_latched {
            return;
        }
        let cooldown = self.config.heart.cooldown();
        if self
            .last_heart_at
            .is_some_and(|last| now.saturating_sub(last) <= cooldown)
        {
            log::debug!("heart ignored during cooldown");
            return;
        }

        self.last_heart_at = Some(now);
        self.heart_latched = true;
        events.push(GameEvent::HeartAccepted {
            center: heart.center,
        });
        self.start(now, events);
    }

    fn start(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        self.score.reset();
        self.new_record = false;
        self.started_at = Some(now);
        self.phase = GamePhase::Playing;

        let mut ctx = TickContext::new(
            now,
            self.config.frame,
            &mut self.rng,
            &mut self.score,
            events,
        );
        self.mode.reset(&mut ctx);

        events.push(GameEvent::PhaseChanged {
            from,
            to: GamePhase::Playing,
        });
        if from == GamePhase::Finished {
            log::info!("heart detected, restarting {}", self.mode.kind().display_name());
        } else {
            log::info!("heart detected, starting {}", self.mode.kind().display_name());
        }
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::Finished;
        self.mode.finish();

        let final_score = self.score.value();
        if final_score > self.high_score {
            let previous = self.high_score;
            self.high_score = final_score;
            self.new_record = true;
            if let Err(err) = self.store.save(final_score) {
                log::warn!("failed to save high score: {err}");
            }
            log::info!("🎉 new high score {previous} -> {final_score}");
            events.push(GameEvent::NewRecord {
                score: final_score,
                previous,
            });
        } else {
            log::info!(
                "game over, final score {final_score} (best {})",
                self.high_score
            );
        }

        events.push(GameEvent::PhaseChanged {
            from: GamePhase::Playing,
            to: GamePhase::Finished,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        gesture::{FrameReadings, HeartReading, HeartVerdict},
        score::MemoryHighScoreStore,
        types::Vec2,
    };

    struct CountingMode {
        resets: usize,
        finishes: usize,
    }

    impl GameMode for CountingMode {
        fn kind(&self) -> GameKind {
            GameKind::Food
        }

        fn round_length(&self) -> Duration {
            Duration::from_secs(10)
        }

        fn reset(&mut self, _ctx: &mut TickContext<'_>) {
            self.resets += 1;
        }

        fn update(&mut self, _readings: &FrameReadings, ctx: &mut TickContext<'_>) {
            ctx.award(1);
        }

        fn finish(&mut self) {
            self.finishes += 1;
        }

        fn entity_count(&self) -> usize {
            0
        }
    }

    fn session(
        store: MemoryHighScoreStore,
    ) -> (GameSession<CountingMode, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = Arc::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        });
        let mode = CountingMode {
            resets: 0,
            finishes: 0,
        };
        (
            GameSession::new(config, mode, clock.clone(), Box::new(store)),
            clock,
        )
    }

    fn heart() -> FrameReadings {
        FrameReadings {
            heart: Some(HeartReading {
                satisfied: 5,
                total: 5,
                verdict: HeartVerdict::Detected,
                center: Vec2::new(320.0, 200.0),
            }),
            ..FrameReadings::empty()
        }
    }

    fn nothing() -> FrameReadings {
        FrameReadings::empty()
    }

    #[test]
    fn waits_for_a_heart() {
        let (mut session, clock) = session(MemoryHighScoreStore::new("food"));
        for _ in 0..5 {
            clock.advance(Duration::from_millis(100));
            assert!(session.tick(&nothing()).is_empty());
        }
        assert_eq!(session.phase(), GamePhase::Waiting);
        assert_eq!(session.score(), 0);
        assert_eq!(session.remaining(), Duration::from_secs(10));
    }

    #[test]
    fn heart_starts_the_round() {
        let (mut session, _clock) = session(MemoryHighScoreStore::new("food"));
        let events = session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.mode().resets, 1);
        assert!(events.contains(&GameEvent::HeartAccepted {
            center: Vec2::new(320.0, 200.0)
        }));
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Waiting,
            to: GamePhase::Playing
        }));
        // the start frame already plays
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn heart_during_play_is_ignored() {
        let (mut session, clock) = session(MemoryHighScoreStore::new("food"));
        session.tick(&heart());
        session.tick(&nothing());
        clock.advance(Duration::from_secs(3));
        session.tick(&heart());
        assert_eq!(session.mode().resets, 1);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn timer_expiry_finishes_exactly_once() {
        let (mut session, clock) = session(MemoryHighScoreStore::new("food"));
        session.tick(&heart());

        clock.advance(Duration::from_millis(9_999));
        session.tick(&nothing());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.remaining(), Duration::from_millis(1));

        clock.advance(Duration::from_millis(1));
        let events = session.tick(&nothing());
        assert_eq!(session.phase(), GamePhase::Finished);
        assert_eq!(session.remaining(), Duration::ZERO);
        let transitions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PhaseChanged { to: GamePhase::Finished, .. }))
            .count();
        assert_eq!(transitions, 1);

        clock.advance(Duration::from_secs(5));
        assert!(session.tick(&nothing()).is_empty());
        assert_eq!(session.mode().finishes, 1);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn remaining_is_monotonic() {
        let (mut session, clock) = session(MemoryHighScoreStore::new("food"));
        session.tick(&heart());
        let mut last = session.remaining();
        for _ in 0..40 {
            clock.advance(Duration::from_millis(333));
            session.tick(&nothing());
            let now = session.remaining();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, Duration::ZERO);
    }

    #[test]
    fn new_record_is_persisted() {
        let store = MemoryHighScoreStore::with_score("food", 1);
        let (mut session, clock) = session(store.clone());
        assert_eq!(session.high_score(), 1);

        session.tick(&heart());
        session.tick(&nothing());
        clock.advance(Duration::from_secs(10));
        let events = session.tick(&nothing());

        assert!(session.is_new_record());
        assert_eq!(session.high_score(), 2);
        assert_eq!(store.get(), 2);
        assert!(events.contains(&GameEvent::NewRecord {
            score: 2,
            previous: 1
        }));
    }

    #[test]
    fn lower_score_keeps_the_record() {
        let store = MemoryHighScoreStore::with_score("food", 50);
        let (mut session, clock) = session(store.clone());
        session.tick(&heart());
        clock.advance(Duration::from_secs(10));
        session.tick(&nothing());
        assert!(!session.is_new_record());
        assert_eq!(store.get(), 50);
    }

    struct ReadOnlyStore;

    impl HighScoreStore for ReadOnlyStore {
        fn load(&self) -> Result<u32, crate::error::StoreError> {
            Ok(1)
        }

        fn save(&mut self, _score: u32) -> Result<(), crate::error::StoreError> {
            Err(crate::error::StoreError::Io {
                path: "high_score.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_save_still_finishes_with_a_record() {
        let clock = ManualClock::new();
        let config = Arc::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        });
        let mode = CountingMode {
            resets: 0,
            finishes: 0,
        };
        let mut session = GameSession::new(config, mode, clock.clone(), Box::new(ReadOnlyStore));
        assert_eq!(session.high_score(), 1);

        session.tick(&heart());
        session.tick(&nothing());
        clock.advance(Duration::from_secs(10));
        let events = session.tick(&nothing());

        assert_eq!(session.phase(), GamePhase::Finished);
        assert!(session.is_new_record());
        assert_eq!(session.high_score(), 2);
        assert!(events.contains(&GameEvent::NewRecord {
            score: 2,
            previous: 1
        }));
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: GamePhase::Playing,
            to: GamePhase::Finished
        }));

        // the next round still starts normally
        clock.advance(Duration::from_secs(3));
        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn heart_restarts_a_finished_round() {
        let (mut session, clock) = session(MemoryHighScoreStore::new("food"));
        session.tick(&heart());
        clock.advance(Duration::from_secs(10));
        session.tick(&nothing());
        assert_eq!(session.phase(), GamePhase::Finished);

        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score(), 1, "score resets on restart");
        assert_eq!(session.mode().resets, 2);
    }

    #[test]
    fn cooldown_blocks_a_quick_second_trigger() {
        let clock = ManualClock::new();
        let config = Arc::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        });
        struct ShortRound;
        impl GameMode for ShortRound {
            fn kind(&self) -> GameKind {
                GameKind::Characters
            }
            fn round_length(&self) -> Duration {
                Duration::from_millis(100)
            }
            fn reset(&mut self, _ctx: &mut TickContext<'_>) {}
            fn update(&mut self, _readings: &FrameReadings, _ctx: &mut TickContext<'_>) {}
            fn entity_count(&self) -> usize {
                0
            }
        }
        let mut session = GameSession::new(
            config,
            ShortRound,
            clock.clone(),
            Box::new(MemoryHighScoreStore::new("x")),
        );

        session.tick(&heart());
        clock.advance(Duration::from_millis(200));
        session.tick(&nothing());
        assert_eq!(session.phase(), GamePhase::Finished);

        // 0.2 s after the first trigger: inside the 2 s cooldown.
        let events = session.tick(&heart());
        assert!(events.is_empty());
        assert_eq!(session.phase(), GamePhase::Finished);

        session.tick(&nothing());
        clock.advance(Duration::from_secs(2));
        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn held_heart_must_be_released() {
        let clock = ManualClock::new();
        let config = Arc::new(GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        });
        let mode = CountingMode {
            resets: 0,
            finishes: 0,
        };
        let mut session = GameSession::new(
            config,
            mode,
            clock.clone(),
            Box::new(MemoryHighScoreStore::new("x")),
        );

        session.tick(&heart());
        clock.advance(Duration::from_secs(10));
        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Finished);

        // still holding the same heart long after the cooldown
        clock.advance(Duration::from_secs(5));
        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Finished);

        session.tick(&nothing());
        session.tick(&heart());
        assert_eq!(session.phase(), GamePhase::Playing);
    }
}
