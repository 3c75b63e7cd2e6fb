//! Timers used between status polls
//!
//! Production code sleeps on the tokio clock; tests use [`ManualTimer`], a fake
//! clock that advances by the requested duration and returns immediately.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Something that can suspend the caller for a duration
#[async_trait]
pub trait Timer: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fake clock: every sleep is recorded and ticks the clock forward
#[derive(Debug, Default)]
pub struct ManualTimer {
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualTimer {
    /// Create a timer at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps requested so far
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Total simulated time elapsed
    pub fn elapsed(&self) -> Duration {
        self.sleeps
            .lock()
            .map(|s| s.iter().sum())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Timer for ManualTimer {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_timer_ticks_without_waiting() {
        let timer = ManualTimer::new();
        timer.sleep(Duration::from_secs(30)).await;
        timer.sleep(Duration::from_secs(30)).await;

        assert_eq!(timer.sleep_count(), 2);
        assert_eq!(timer.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_tokio_timer_zero_duration() {
        TokioTimer.sleep(Duration::ZERO).await;
    }
}
