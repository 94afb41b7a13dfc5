use std::{sync::mpsc::Receiver, time::Duration};

use ratatui::layout::Rect;

use crate::clock::SessionClock;
use crate::constants::{MAX_HISTORY, RECORD_FLASH_MS, RIPPLE_TTL_MS};
use crate::engine::{Engine, Trigger, Update};
use crate::rate::RateSample;
use crate::ripple::RippleSet;
use crate::score::HighScore;
use crate::storage::KeyValueStore;

// Main application state, fed only by engine updates
pub struct App<S: KeyValueStore> {
    pub engine: Engine<S>,
    updates: Receiver<Update>,
    clock: SessionClock,

    pub rate_history: Vec<f64>,
    pub current_rate: RateSample,
    pub high_score: HighScore,
    pub session_best: RateSample,
    pub total_clicks: u64,
    // Session time (ms) of the latest new record, for the flash
    pub record_set_at: Option<u64>,

    pub ripples: RippleSet,
    // Where the button was drawn last frame, for mouse hit testing
    pub button_area: Option<Rect>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(mut engine: Engine<S>) -> App<S> {
        let updates = engine.subscribe();
        let high_score = engine.high_score();
        App {
            engine,
            updates,
            clock: SessionClock::start(),
            rate_history: vec![0.0; MAX_HISTORY],
            current_rate: 0,
            high_score,
            session_best: 0,
            total_clicks: 0,
            record_set_at: None,
            ripples: RippleSet::new(RIPPLE_TTL_MS),
            button_area: None,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn start(&mut self) {
        let now = self.now();
        self.engine.activate(now);
        self.drain_updates(now);
    }

    pub fn stop(&mut self) {
        self.engine.teardown();
    }

    pub fn on_click(&mut self) {
        let now = self.now();
        self.click_at(now);
    }

    pub fn on_tick(&mut self) {
        let now = self.now();
        self.tick_at(now);
    }

    pub(crate) fn click_at(&mut self, now: u64) {
        self.total_clicks += 1;
        let offset = (self.total_clicks % 7) as u16;
        self.ripples.spawn(now, offset);
        self.engine.register_click(now);
        self.drain_updates(now);
    }

    pub(crate) fn tick_at(&mut self, now: u64) {
        if self.engine.poll(now).is_some() {
            self.drain_updates(now);
        }
    }

    // How long the input poll may block before the next tick is due
    pub fn poll_timeout(&self) -> Duration {
        self.engine
            .time_until_next_tick(self.now())
            .unwrap_or_else(|| self.engine.config().tick_rate())
    }

    pub fn record_flash(&self, now: u64) -> bool {
        self.record_set_at
            .map(|at| now.saturating_sub(at) < RECORD_FLASH_MS)
            .unwrap_or(false)
    }

    fn drain_updates(&mut self, now: u64) {
        while let Ok(update) = self.updates.try_recv() {
            match update {
                Update::Rate { rate, trigger, .. } => {
                    self.current_rate = rate;
                    self.session_best = self.session_best.max(rate);
                    if trigger == Trigger::Tick {
                        self.rate_history.remove(0);
                        self.rate_history.push(rate as f64);
                    }
                }
                Update::HighScore(score) => {
                    if score.value > self.high_score.value && score.achieved_at.is_some() {
                        self.record_set_at = Some(now);
                    }
                    self.high_score = score;
                }
            }
        }
    }
}
