use std::time::Duration;

/// Periodic re-evaluation schedule, polled from the owner's event loop.
///
/// The sampler never spawns anything: it only keeps the next deadline. The
/// loop waits at most `time_until_next` for input, then calls `poll`. Once
/// cancelled it reports no further ticks, so dropping or cancelling it is
/// enough to guarantee nothing fires after the session ends.
#[derive(Debug, Clone)]
pub struct Sampler {
    interval_ms: u64,
    next_due: Option<u64>,
}

impl Sampler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_due: None,
        }
    }

    pub fn start(&mut self, now: u64) {
        if self.next_due.is_none() {
            self.next_due = Some(now.saturating_add(self.interval_ms));
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True when a tick is due at `now`. Ticks missed by a slow loop are
    /// coalesced into this one and the cadence keeps its original phase.
    pub fn poll(&mut self, now: u64) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let missed = (now - due) / self.interval_ms;
        if missed > 0 {
            log::debug!("sampler coalesced {} missed tick(s)", missed);
        }
        self.next_due = Some(due.saturating_add((missed + 1).saturating_mul(self.interval_ms)));
        true
    }

    pub fn time_until_next(&self, now: u64) -> Option<Duration> {
        self.next_due
            .map(|due| Duration::from_millis(due.saturating_sub(now)))
    }
}
