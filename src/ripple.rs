use std::collections::VecDeque;

/// One piece of click feedback. `offset` spreads ripples across the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ripple {
    pub id: u64,
    pub born_at: u64,
    pub offset: u16,
}

/// Short-lived ripples keyed by id. Expired entries are swept lazily on
/// every read, so no timer is needed per ripple.
#[derive(Debug)]
pub struct RippleSet {
    ttl_ms: u64,
    next_id: u64,
    entries: VecDeque<Ripple>,
}

impl RippleSet {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            next_id: 0,
            entries: VecDeque::new(),
        }
    }

    pub fn spawn(&mut self, now: u64, offset: u16) -> u64 {
        self.sweep(now);
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(Ripple {
            id,
            born_at: now,
            offset,
        });
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.id != id);
        self.entries.len() != before
    }

    pub fn sweep(&mut self, now: u64) {
        let ttl = self.ttl_ms;
        self.entries
            .retain(|r| now < r.born_at || now - r.born_at < ttl);
    }

    /// Live ripples with their remaining life as a 0.0..=1.0 fraction.
    pub fn active(&mut self, now: u64) -> Vec<(Ripple, f64)> {
        self.sweep(now);
        self.entries
            .iter()
            .map(|r| {
                let age = now.saturating_sub(r.born_at);
                let left = 1.0 - age as f64 / self.ttl_ms.max(1) as f64;
                (*r, left.clamp(0.0, 1.0))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
