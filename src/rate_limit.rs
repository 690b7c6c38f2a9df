use std::time::{Duration, Instant};

use dashmap::DashMap;

pub const LOGIN_MAX_FAILURES: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Per-email failed-login counter with a fixed window.
pub struct LoginRateLimiter {
    /// lowercased email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(LOGIN_MAX_FAILURES, LOGIN_WINDOW)
    }
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// `Err` carries the seconds until the window closes.
    /// Does not count the attempt; call `record_failure` on a bad password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = *entry.value();
        let elapsed = start.elapsed();

        if elapsed > self.window || count < self.max_failures {
            return Ok(());
        }
        Err(self.window.saturating_sub(elapsed).as_secs().max(1))
    }

    pub fn record_failure(&self, email: &str) {
        let now = Instant::now();
        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget the failures of an email after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    pub fn cleanup(&self) {
        let window = self.window;
        self.entries.retain(|_, (_, start)| start.elapsed() < window);
    }
}
