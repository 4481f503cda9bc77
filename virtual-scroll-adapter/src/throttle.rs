/// Leading + trailing throttle for scroll events, driven by adapter timestamps.
///
/// The first event of a quiet period passes through immediately and opens a window of
/// `interval_ms`. Events inside the window are collapsed; if any arrived, [`Throttle::poll`]
/// reports one trailing emission once the window has elapsed, which opens the next window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Throttle {
    interval_ms: u64,
    window_end: Option<u64>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            window_end: None,
            trailing: false,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Records an event. Returns `true` if it should be handled now.
    pub fn on_event(&mut self, now_ms: u64) -> bool {
        match self.window_end {
            Some(end) if now_ms < end => {
                self.trailing = true;
                false
            }
            _ => {
                self.window_end = Some(now_ms.saturating_add(self.interval_ms));
                self.trailing = false;
                true
            }
        }
    }

    /// Returns `true` when a trailing emission is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.window_end {
            Some(end) if now_ms >= end => {
                if core::mem::take(&mut self.trailing) {
                    self.window_end = Some(now_ms.saturating_add(self.interval_ms));
                    true
                } else {
                    self.window_end = None;
                    false
                }
            }
            _ => false,
        }
    }

    /// `true` while collapsed events are waiting for the window to elapse.
    pub fn has_trailing(&self) -> bool {
        self.trailing
    }

    pub fn reset(&mut self) {
        self.window_end = None;
        self.trailing = false;
    }
}
