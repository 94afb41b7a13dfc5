//! Click-rate tracking with a persisted personal best.
//!
//! Clicks feed an [`engine::Engine`], which counts them over a trailing
//! window, re-evaluates on a fixed cadence so the rate decays when clicking
//! stops, and keeps the best rate ever seen in a [`score::ScoreStore`].
//! The terminal front-end in [`app`] and [`ui`] only consumes its updates.

pub mod app;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod event_log;
pub mod rate;
pub mod ripple;
pub mod sampler;
pub mod score;
pub mod storage;
pub mod ui;
pub mod util;

pub use config::EngineConfig;
pub use engine::{Engine, Snapshot, Trigger, Update};
pub use rate::{RateCalculator, RateSample};
pub use score::{HighScore, ScoreStore};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
