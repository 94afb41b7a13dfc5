use std::{
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

use crate::config::EngineConfig;
use crate::event_log::EventLog;
use crate::rate::{RateCalculator, RateSample};
use crate::sampler::Sampler;
use crate::score::{HighScore, ScoreStore};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Tick,
}

/// Published to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Rate {
        at: u64,
        rate: RateSample,
        trigger: Trigger,
    },
    HighScore(HighScore),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub last_rate: RateSample,
    pub high_score: HighScore,
    pub retained_events: usize,
}

/// One game session: clicks go in, rate and record updates come out.
///
/// Single-threaded. The owner's event loop calls `register_click` for input
/// and `poll` when `time_until_next_tick` has elapsed; each call runs to
/// completion. The sampler is cancelled on `teardown` or drop.
pub struct Engine<S: KeyValueStore> {
    config: EngineConfig,
    log: EventLog,
    last_rate: RateSample,
    scores: ScoreStore<S>,
    sampler: Sampler,
    subscribers: Vec<Sender<Update>>,
}

impl<S: KeyValueStore> Engine<S> {
    pub fn new(config: EngineConfig, store: S) -> Self {
        Self {
            config,
            log: EventLog::new(),
            last_rate: 0,
            scores: ScoreStore::new(store),
            sampler: Sampler::new(config.tick_rate_ms()),
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<Update> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn activate(&mut self, now: u64) {
        if self.sampler.is_running() {
            return;
        }
        let score = self.scores.load();
        log::info!(
            "session started: window {} ms, tick {} ms, best {}",
            self.config.window_ms(),
            self.config.tick_rate_ms(),
            score.value
        );
        self.publish(Update::HighScore(score));
        self.sampler.start(now);
    }

    pub fn teardown(&mut self) {
        if self.sampler.is_running() {
            self.sampler.cancel();
            log::info!("session stopped with {} retained click(s)", self.log.len());
        }
    }

    pub fn is_active(&self) -> bool {
        self.sampler.is_running()
    }

    pub fn register_click(&mut self, now: u64) -> RateSample {
        let window = self.config.window_ms();
        self.log.append(now);
        self.log.prune(now, window);

        let rate = RateCalculator::evaluate(&self.log, now, window);
        self.last_rate = rate;
        self.publish(Update::Rate {
            at: now,
            rate,
            trigger: Trigger::Click,
        });

        if let Some(score) = self.scores.submit(rate) {
            self.publish(Update::HighScore(score));
        }
        rate
    }

    /// Runs a sampler tick if one is due, returning the re-evaluated rate.
    pub fn poll(&mut self, now: u64) -> Option<RateSample> {
        if !self.sampler.poll(now) {
            return None;
        }
        let window = self.config.window_ms();
        self.log.prune(now, window);

        let rate = RateCalculator::evaluate(&self.log, now, window);
        log::debug!("tick at {} ms: rate {}", now, rate);
        self.last_rate = rate;
        self.publish(Update::Rate {
            at: now,
            rate,
            trigger: Trigger::Tick,
        });
        Some(rate)
    }

    /// Rate at `now` without touching any state.
    pub fn evaluate(&self, now: u64) -> RateSample {
        RateCalculator::evaluate(&self.log, now, self.config.window_ms())
    }

    pub fn time_until_next_tick(&self, now: u64) -> Option<Duration> {
        self.sampler.time_until_next(now)
    }

    pub fn last_rate(&self) -> RateSample {
        self.last_rate
    }

    pub fn high_score(&self) -> HighScore {
        self.scores.peek()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            last_rate: self.last_rate,
            high_score: self.scores.peek(),
            retained_events: self.log.len(),
        }
    }

    fn publish(&mut self, update: Update) {
        self.subscribers.retain(|tx| tx.send(update).is_ok());
    }
}

impl<S: KeyValueStore> Drop for Engine<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
