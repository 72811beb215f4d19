//! The two platform seams the scheduler depends on: a wall clock and a
//! one-shot timer facility with a bounded delay.

use levelcalc_core::time::Timestamp;

use crate::id::TimerId;

/// Longest single delay a platform timer accepts, in milliseconds.
pub const MAX_TIMER_DELAY_MS: i64 = 0x7fff_ffff;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("timer delay {delay_ms} ms is outside 1..={max_ms} ms")]
    DelayOutOfRange { delay_ms: i64, max_ms: i64 },

    #[error("timer host unavailable: {0}")]
    Unavailable(String),
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(chrono::Utc::now().timestamp_millis())
    }
}

/// One-shot timers. When a timer elapses the host calls
/// [`crate::scheduler::NotificationScheduler::on_timer`] with its id.
pub trait TimerHost {
    /// Arm a timer `delay_ms` from now.
    fn set_timer(&mut self, delay_ms: i64) -> Result<TimerId, ScheduleError>;

    /// Disarm a timer. Unknown or already-elapsed ids are ignored.
    fn clear_timer(&mut self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > Timestamp::from_millis(1_577_836_800_000));
    }

    #[test]
    fn max_delay_is_i32_max() {
        assert_eq!(MAX_TIMER_DELAY_MS, i64::from(i32::MAX));
    }
}
