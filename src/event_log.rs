use std::collections::VecDeque;

/// Click timestamps (ms) for the current session, in arrival order.
///
/// Arrival order normally matches timestamp order, but nothing here relies
/// on it: every query filters by comparing values, so an entry appended
/// after a backwards clock step is still judged on its own timestamp.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: VecDeque<u64>,
    // Largest window ever passed to `prune`
    horizon_ms: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, timestamp: u64) {
        self.events.push_back(timestamp);
    }

    /// Number of events with `now - window < t <= now`.
    pub fn count_since(&self, now: u64, window: u64) -> usize {
        self.events
            .iter()
            .filter(|&&t| in_window(t, now, window))
            .count()
    }

    /// Drops events that no window seen so far can count again.
    pub fn prune(&mut self, now: u64, window: u64) {
        self.horizon_ms = self.horizon_ms.max(window);
        let horizon = self.horizon_ms;
        let before = self.events.len();
        self.events.retain(|&t| t > now || now - t < horizon);

        let dropped = before - self.events.len();
        if dropped > 0 {
            log::debug!("pruned {} click(s) older than {} ms", dropped, horizon);
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// Written as a difference so `now < window` needs no signed arithmetic.
fn in_window(t: u64, now: u64, window: u64) -> bool {
    t <= now && now - t < window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_half_open_window() {
        let mut log = EventLog::new();
        for t in [0, 1_000, 2_000, 6_000] {
            log.append(t);
        }
        assert_eq!(log.count_since(6_000, 5_000), 2);
        assert_eq!(log.count_since(5_999, 5_000), 2);
        assert_eq!(log.count_since(4_999, 5_000), 3);
    }

    #[test]
    fn future_events_are_not_counted() {
        let mut log = EventLog::new();
        log.append(10_000);
        // Clock went backwards after this click was recorded
        log.append(4_000);
        assert_eq!(log.count_since(5_000, 5_000), 1);
        assert_eq!(log.count_since(10_000, 7_000), 2);
    }

    #[test]
    fn prune_keeps_largest_window() {
        let mut log = EventLog::new();
        for t in [0, 1_000, 30_000, 59_000] {
            log.append(t);
        }
        log.prune(60_000, 60_000);
        assert_eq!(log.len(), 3);

        // A smaller window later on must not shrink the horizon
        log.prune(60_000, 5_000);
        assert_eq!(log.len(), 3);
        assert_eq!(log.count_since(60_000, 60_000), 3);
    }

    #[test]
    fn prune_retains_future_events() {
        let mut log = EventLog::new();
        log.append(0);
        log.append(50_000);
        log.prune(10_000, 5_000);
        assert_eq!(log.len(), 1);
        assert_eq!(log.count_since(50_000, 5_000), 1);
    }

    #[test]
    fn empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.count_since(0, 1), 0);
        assert_eq!(log.count_since(u64::MAX, u64::MAX), 0);
    }
}
