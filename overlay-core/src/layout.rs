//! Coalescing of resize and orientation bursts.
//!
//! The host schedules a timer for every [`LayoutTicket`] it receives and
//! hands the ticket back when the timer fires. Only the most recent ticket
//! settles; earlier ones are stale and do nothing.

use serde::{Deserialize, Serialize};

/// What changed in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutChange {
    /// Viewport resized.
    Resize,
    /// Device rotated.
    Orientation,
}

/// Trailing-delay timer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTicket {
    /// Monotonic generation; identifies the request.
    pub generation: u64,
    /// How long the host waits before settling, in milliseconds.
    pub delay_ms: u32,
}

/// Collapses bursts of layout changes into one recalibration.
#[derive(Debug, Clone, Default)]
pub struct LayoutCoalescer {
    resize_delay_ms: u32,
    orientation_delay_ms: u32,
    generation: u64,
    pending: bool,
}

impl LayoutCoalescer {
    /// Create a coalescer with per-change delays.
    #[must_use]
    pub const fn new(resize_delay_ms: u32, orientation_delay_ms: u32) -> Self {
        Self {
            resize_delay_ms,
            orientation_delay_ms,
            generation: 0,
            pending: false,
        }
    }

    /// Record a change and get the timer to schedule.
    ///
    /// Any earlier outstanding ticket becomes stale.
    pub fn note(&mut self, change: LayoutChange) -> LayoutTicket {
        self.generation += 1;
        self.pending = true;
        let delay_ms = match change {
            LayoutChange::Resize => self.resize_delay_ms,
            LayoutChange::Orientation => self.orientation_delay_ms,
        };
        LayoutTicket {
            generation: self.generation,
            delay_ms,
        }
    }

    /// Timer fired. Returns `true` if recalibration should run now.
    pub fn settle(&mut self, ticket: LayoutTicket) -> bool {
        if self.pending && ticket.generation == self.generation {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Whether a burst is still waiting to settle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_settles_once_on_last_ticket() {
        let mut layout = LayoutCoalescer::new(150, 500);
        let first = layout.note(LayoutChange::Resize);
        let second = layout.note(LayoutChange::Resize);
        let last = layout.note(LayoutChange::Orientation);
        assert_eq!(first.delay_ms, 150);
        assert_eq!(last.delay_ms, 500);

        assert!(!layout.settle(first));
        assert!(!layout.settle(second));
        assert!(layout.settle(last));
        assert!(!layout.settle(last));
        assert!(!layout.is_pending());
    }
}
