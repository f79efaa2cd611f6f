use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender};

use super::{recv_latest_frame, source::LandmarkSource, stream::start_source_stream};
use crate::{
    clock::Clock,
    config::GameConfig,
    game::{GameMode, GameSession},
    gesture::GestureClassifier,
    types::{GameEvent, GamePhase, HandGuide, LandmarkFrame},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub phase: GamePhase,
    pub score: u32,
    pub high_score: u32,
    pub new_record: bool,
}

pub struct Runner<M: GameMode, C: Clock> {
    classifier: GestureClassifier,
    session: GameSession<M, C>,
    events_tx: Option<Sender<GameEvent>>,
    frame_interval: Duration,
    quit: Arc<AtomicBool>,
    frames: u64,
    last_guide: Option<HandGuide>,
}

impl<M: GameMode, C: Clock> Runner<M, C> {
    pub fn new(config: Arc<GameConfig>, session: GameSession<M, C>) -> Self {
        let fps = u64::from(config.target_fps.max(1));
        let classifier = GestureClassifier::new(config, session.mode().kind());
        Self {
            classifier,
            session,
            events_tx: None,
            frame_interval: Duration::from_micros(1_000_000 / fps),
            quit: Arc::new(AtomicBool::new(false)),
            frames: 0,
            last_guide: None,
        }
    }

    pub fn with_events(mut self, tx: Sender<GameEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    pub fn quit_handle(&self) -> Arc<AtomicBool> {
        self.quit.clone()
    }

    pub fn session(&self) -> &GameSession<M, C> {
        &self.session
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn step(&mut self, frame: &LandmarkFrame) -> Vec<GameEvent> {
        let readings = self.classifier.classify(frame);
        let events = self.session.tick(&readings);
        self.frames += 1;

        self.announce_guide(readings.guide);
        for event in &events {
            log::debug!("{event:?}");
        }
        self.publish(&events);
        events
    }

    pub fn run(&mut self, frame_rx: &Receiver<LandmarkFrame>) -> RunSummary {
        while !self.quit.load(Ordering::Relaxed) {
            let Some(frame) = recv_latest_frame(frame_rx) else {
                break;
            };

            let step_start = Instant::now();
            self.step(&frame);
            let step_time = step_start.elapsed();

            if let Some(sleep_for) = self.frame_interval.checked_sub(step_time) {
                if !sleep_for.is_zero() {
                    thread::sleep(sleep_for);
                }
            }
        }
        self.summary()
    }

    pub fn run_source<S>(&mut self, source: S) -> Result<RunSummary>
    where
        S: LandmarkSource + 'static,
    {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(1);
        let stream = start_source_stream(source, self.frame_interval, frame_tx);

        let summary = self.run(&frame_rx);
        drop(frame_rx);

        let produced = stream
            .stop()
            .map_err(|_| anyhow!("landmark source thread panicked"))?;
        log::info!(
            "played {} of {produced} frames, final score {} (best {})",
            summary.frames,
            summary.score,
            summary.high_score
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            phase: self.session.phase(),
            score: self.session.score(),
            high_score: self.session.high_score(),
            new_record: self.session.is_new_record(),
        }
    }

    fn announce_guide(&mut self, guide: HandGuide) {
        if self.session.phase() == GamePhase::Playing {
            self.last_guide = None;
            return;
        }
        if self.last_guide != Some(guide) {
            log::info!("{}", guide.hint());
            self.last_guide = Some(guide);
        }
    }

    fn publish(&mut self, events: &[GameEvent]) {
        let Some(tx) = &self.events_tx else {
            return;
        };
        for event in events {
            if tx.send(event.clone()).is_err() {
                log::warn!("event subscriber disconnected");
                self.events_tx = None;
                return;
            }
        }
    }
}
