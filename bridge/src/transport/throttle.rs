//! Per-key rate limiting

use std::time::{Duration, Instant};

use hashbrown::HashMap;

/// Tracks the last accepted call per key
#[derive(Debug, Default)]
pub struct Throttle {
    last_fired: HashMap<String, Instant>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `key` against the current time
    pub fn should_suppress(&mut self, key: &str, interval: Duration) -> bool {
        self.should_suppress_at(key, interval, Instant::now())
    }

    /// Check `key` at an explicit instant
    ///
    /// A call is suppressed while less than `interval` has passed since the
    /// last call that wasn't. Accepted calls restart the window.
    pub fn should_suppress_at(&mut self, key: &str, interval: Duration, now: Instant) -> bool {
        if let Some(last) = self.last_fired.get(key) {
            if now.saturating_duration_since(*last) < interval {
                return true;
            }
        }
        self.last_fired.insert(key.to_string(), now);
        false
    }

    /// Forget a key so its next call goes through
    pub fn reset(&mut self, key: &str) {
        self.last_fired.remove(key);
    }

    pub fn clear(&mut self) {
        self.last_fired.clear();
    }
}
