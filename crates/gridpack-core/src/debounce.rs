use std::time::{Duration, Instant};

/// Trailing-edge debouncer for resize requests.
///
/// Every `request` restarts the quiet window. `poll` returns true once, after
/// the window has elapsed with no further requests. The host event loop owns
/// the clock and passes `now` in.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_request: Option<Instant>,
    coalesced: usize,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_request: None,
            coalesced: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn request(&mut self, now: Instant) {
        if self.last_request.is_some() {
            self.coalesced += 1;
        }
        self.last_request = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_request.is_some()
    }

    /// Requests absorbed into a later one since the last fire.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Time left until the pending request fires, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_request
            .map(|t| self.window.saturating_sub(now.saturating_duration_since(t)))
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_request {
            Some(t) if now.saturating_duration_since(t) >= self.window => {
                self.last_request = None;
                self.coalesced = 0;
                true
            }
            _ => false,
        }
    }

    /// Drops a pending request without firing it.
    pub fn cancel(&mut self) {
        self.last_request = None;
        self.coalesced = 0;
    }
}
