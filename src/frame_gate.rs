//! Minimum gap between frames
//!
//! Some devices need time to latch or process a frame before the next one
//! starts. The gate remembers when the last frame was sent and blocks the
//! next one until the gap has passed.

use embassy_time::{Duration, Instant, block_for};

/// Monotonic "last sent" gate
#[derive(Debug, Clone, Copy)]
pub struct FrameGate {
    min_gap: Duration,
    last_sent: Option<Instant>,
}

impl FrameGate {
    /// Create a gate that keeps frames at least `min_gap` apart
    pub const fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_sent: None,
        }
    }

    /// Gate for a maximum frame rate, `0` disables the limit
    pub const fn from_rate(hz: u32) -> Self {
        if hz == 0 {
            return Self::new(Duration::from_ticks(0));
        }
        Self::new(Duration::from_micros(1_000_000 / hz as u64))
    }

    pub const fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Time left until the next frame may start
    pub fn remaining(&self, now: Instant) -> Duration {
        let Some(last_sent) = self.last_sent else {
            return Duration::from_ticks(0);
        };
        let elapsed = now
            .checked_duration_since(last_sent)
            .unwrap_or(Duration::from_ticks(0));
        if elapsed >= self.min_gap {
            Duration::from_ticks(0)
        } else {
            self.min_gap - elapsed
        }
    }

    /// Block until the gap since the last frame has passed
    pub fn wait(&self) {
        let remaining = self.remaining(Instant::now());
        if remaining.as_ticks() > 0 {
            block_for(remaining);
        }
    }

    /// Record that a frame has just been sent
    pub fn mark(&mut self) {
        self.last_sent = Some(Instant::now());
    }

    /// Record a frame sent at a known instant
    pub fn mark_at(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}
