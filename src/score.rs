use chrono::{DateTime, Local};

use crate::constants::HIGH_SCORE_KEY;
use crate::rate::RateSample;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScore {
    pub value: RateSample,
    /// The value is what durable storage holds: it was loaded from there or
    /// the last write succeeded.
    pub persisted: bool,
    /// Wall-clock time the value was reached in this session.
    pub achieved_at: Option<DateTime<Local>>,
}

impl HighScore {
    fn unset() -> Self {
        Self {
            value: 0,
            persisted: false,
            achieved_at: None,
        }
    }
}

#[derive(Clone, Copy)]
enum State {
    Uninitialized,
    Loaded(HighScore),
}

/// The best rate ever observed. All access to the persisted key goes
/// through `load` and `submit`.
///
/// Sessions sharing one backend do not coordinate: a session that loaded a
/// stale value can still overwrite a larger one written by another session.
pub struct ScoreStore<S> {
    backend: S,
    state: State,
}

impl<S: KeyValueStore> ScoreStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            state: State::Uninitialized,
        }
    }

    /// Reads the persisted best once. Never fails: anything unusable reads
    /// as 0. Later calls return the in-memory best, which storage can lag.
    pub fn load(&mut self) -> HighScore {
        if let State::Loaded(score) = self.state {
            return score;
        }
        let score = self.read_backend();
        self.state = State::Loaded(score);
        score
    }

    fn read_backend(&self) -> HighScore {
        match self.backend.get(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<RateSample>() {
                Ok(value) => HighScore {
                    value,
                    persisted: true,
                    achieved_at: None,
                },
                Err(_) => {
                    log::warn!("ignoring malformed stored high score {:?}", raw);
                    HighScore::unset()
                }
            },
            Ok(None) => {
                log::debug!("no stored high score");
                HighScore::unset()
            }
            Err(err) => {
                log::warn!("could not read high score: {}", err);
                HighScore::unset()
            }
        }
    }

    /// Records `candidate` if it beats the current best and returns the new
    /// best, or `None` when nothing changed.
    pub fn submit(&mut self, candidate: RateSample) -> Option<HighScore> {
        let current = self.current();
        if candidate <= current.value {
            return None;
        }

        let persisted = match self.backend.set(HIGH_SCORE_KEY, &candidate.to_string()) {
            Ok(()) => true,
            Err(err) => {
                // In-memory value stays authoritative for the session
                log::warn!("high score {} not persisted: {}", candidate, err);
                false
            }
        };
        let score = HighScore {
            value: candidate,
            persisted,
            achieved_at: Some(Local::now()),
        };
        self.state = State::Loaded(score);
        log::info!("new high score {}", candidate);
        Some(score)
    }

    pub fn current(&mut self) -> HighScore {
        match self.state {
            State::Loaded(score) => score,
            State::Uninitialized => self.load(),
        }
    }

    /// Like `current` without loading; reads as 0 before `load`.
    pub fn peek(&self) -> HighScore {
        match self.state {
            State::Loaded(score) => score,
            State::Uninitialized => HighScore::unset(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::{JsonFileStore, MemoryStore};
    use proptest::prelude::*;
    use tempfile::tempdir;

    struct ReadOnlyStore {
        value: Option<String>,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.value.clone())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".into()))
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn empty_storage_loads_zero() {
        let mut scores = ScoreStore::new(MemoryStore::new());
        assert!(!scores.is_loaded());
        let score = scores.load();
        assert_eq!(score.value, 0);
        assert!(!score.persisted);
        assert!(scores.is_loaded());
    }

    #[test]
    fn malformed_values_load_zero() {
        for raw in ["abc", "", "-5", "1.5", "12abc", "99999999999999999999"] {
            let mut scores = ScoreStore::new(MemoryStore::with_value(HIGH_SCORE_KEY, raw));
            assert_eq!(scores.load().value, 0, "raw value {:?}", raw);
        }
    }

    #[test]
    fn stored_value_is_loaded_as_persisted() {
        let mut scores = ScoreStore::new(MemoryStore::with_value(HIGH_SCORE_KEY, " 23\n"));
        let score = scores.load();
        assert_eq!(score.value, 23);
        assert!(score.persisted);
        assert_eq!(score.achieved_at, None);
    }

    #[test]
    fn lower_submit_is_a_noop() {
        let mut scores = ScoreStore::new(MemoryStore::new());
        scores.load();
        assert_eq!(scores.submit(10).map(|s| s.value), Some(10));
        assert_eq!(scores.submit(7), None);
        assert_eq!(scores.submit(10), None);
        assert_eq!(scores.current().value, 10);
        assert_eq!(
            scores.backend().get(HIGH_SCORE_KEY).unwrap().as_deref(),
            Some("10")
        );
    }

    #[test]
    fn submit_before_load_loads_first() {
        let mut scores = ScoreStore::new(MemoryStore::with_value(HIGH_SCORE_KEY, "50"));
        assert_eq!(scores.submit(20), None);
        assert_eq!(scores.current().value, 50);
    }

    #[test]
    fn failed_write_keeps_value_in_memory() {
        let mut scores = ScoreStore::new(ReadOnlyStore {
            value: Some("4".into()),
        });
        assert_eq!(scores.load().value, 4);

        let score = scores.submit(9).expect("9 beats 4");
        assert_eq!(score.value, 9);
        assert!(!score.persisted);
        assert_eq!(scores.current().value, 9);
        assert_eq!(scores.submit(8), None);
    }

    #[test]
    fn reload_never_lowers_best() {
        let mut scores = ScoreStore::new(ReadOnlyStore {
            value: Some("4".into()),
        });
        scores.load();
        scores.submit(9);
        assert_eq!(scores.load().value, 9);
        assert_eq!(scores.current().value, 9);
    }

    #[test]
    fn unreadable_backend_loads_zero() {
        let mut scores = ScoreStore::new(BrokenStore);
        assert_eq!(scores.load().value, 0);
        assert_eq!(scores.submit(1).map(|s| s.value), Some(1));
    }

    #[test]
    fn survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        let mut first = ScoreStore::new(JsonFileStore::new(&path));
        first.load();
        first.submit(12);
        first.submit(31);
        first.submit(30);
        drop(first);

        let mut second = ScoreStore::new(JsonFileStore::new(&path));
        let score = second.load();
        assert_eq!(score.value, 31);
        assert!(score.persisted);
    }

    proptest! {
        #[test]
        fn best_never_decreases(candidates in prop::collection::vec(0u32..1_000, 0..100)) {
            let mut scores = ScoreStore::new(MemoryStore::new());
            let mut previous = scores.load().value;
            for candidate in candidates {
                scores.submit(candidate);
                let current = scores.current().value;
                prop_assert!(current >= previous);
                prop_assert!(current >= candidate);
                previous = current;
            }
        }
    }
}
