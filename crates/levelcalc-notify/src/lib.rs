//! Levelcalc Notify -- deferred "level reached soon" reminders.
//!
//! [`scheduler::NotificationScheduler`] keeps one reminder per
//! [`scheduler::ReminderClass`] and reaches fire instants beyond the host's
//! longest single timer by chaining timers. The clock and the timer facility
//! are injected through [`host::Clock`] and [`host::TimerHost`], so tests
//! drive time by hand (see `test_utils`, behind the `test-utils` feature).

pub mod host;
pub mod id;
pub mod scheduler;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use host::{Clock, ScheduleError, SystemClock, TimerHost, MAX_TIMER_DELAY_MS};
pub use id::{ReminderId, TimerId};
pub use scheduler::{
    ArmOutcome, Notification, NotificationScheduler, ReminderClass, ReminderState,
    SchedulerConfig,
};
