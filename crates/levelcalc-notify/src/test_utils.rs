//! Simulated clock and timer host for deterministic scheduler tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::cell::Cell;
use std::rc::Rc;

use slotmap::SlotMap;

use levelcalc_core::time::Timestamp;

use crate::host::{Clock, ScheduleError, TimerHost, MAX_TIMER_DELAY_MS};
use crate::id::TimerId;
use crate::scheduler::{Notification, NotificationScheduler};

/// A whole-minute instant in November 2023.
pub const T0: Timestamp = Timestamp::from_millis(1_699_999_980_000);

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct SimClock {
    now: Rc<Cell<i64>>,
}

impl SimClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start.as_millis())),
        }
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at.as_millis());
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.get())
    }
}

/// Records armed timers instead of waiting on them. Rejects delays the
/// platform would not accept.
#[derive(Debug)]
pub struct ManualTimerHost {
    clock: SimClock,
    timers: SlotMap<TimerId, Timestamp>,
    armed_delays: Vec<i64>,
    fail_next: Option<String>,
}

impl ManualTimerHost {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            timers: SlotMap::with_key(),
            armed_delays: Vec::new(),
            fail_next: None,
        }
    }

    /// Every delay ever passed to `set_timer`, in order.
    pub fn armed_delays(&self) -> &[i64] {
        &self.armed_delays
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Make the next `set_timer` call fail.
    pub fn fail_next(&mut self, reason: &str) {
        self.fail_next = Some(reason.to_string());
    }

    pub fn peek_earliest(&self) -> Option<(TimerId, Timestamp)> {
        self.timers
            .iter()
            .min_by_key(|(id, due)| (**due, *id))
            .map(|(id, due)| (id, *due))
    }

    /// Remove and return the earliest pending timer.
    pub fn pop_earliest(&mut self) -> Option<(TimerId, Timestamp)> {
        let (id, due) = self.peek_earliest()?;
        self.timers.remove(id);
        Some((id, due))
    }
}

impl TimerHost for ManualTimerHost {
    fn set_timer(&mut self, delay_ms: i64) -> Result<TimerId, ScheduleError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(ScheduleError::Unavailable(reason));
        }
        if !(1..=MAX_TIMER_DELAY_MS).contains(&delay_ms) {
            return Err(ScheduleError::DelayOutOfRange {
                delay_ms,
                max_ms: MAX_TIMER_DELAY_MS,
            });
        }
        self.armed_delays.push(delay_ms);
        Ok(self.timers.insert(self.clock.now().plus_millis(delay_ms)))
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.timers.remove(id);
    }
}

pub type SimScheduler = NotificationScheduler<SimClock, ManualTimerHost>;

/// A scheduler at [`T0`] plus a handle on its clock.
pub fn sim_scheduler() -> (SimClock, SimScheduler) {
    let clock = SimClock::new(T0);
    let host = ManualTimerHost::new(clock.clone());
    (clock.clone(), NotificationScheduler::new(clock, host))
}

/// Jump to the earliest pending timer and deliver it.
pub fn step(sched: &mut SimScheduler) -> Option<(Timestamp, Notification)> {
    let (id, due) = sched.host_mut().pop_earliest()?;
    sched.clock().set(due);
    sched
        .on_timer(id)
        .expect("host accepts every chained delay")
        .map(|n| (due, n))
}

/// Deliver every timer due at or before `until`, collecting what fired.
/// Leaves the clock at `until`.
pub fn run_until(sched: &mut SimScheduler, until: Timestamp) -> Vec<(Timestamp, Notification)> {
    let mut fired = Vec::new();
    while let Some((_, due)) = sched.host().peek_earliest() {
        if due > until {
            break;
        }
        if let Some(hit) = step(sched) {
            fired.push(hit);
        }
    }
    if sched.clock().now() < until {
        sched.clock().set(until);
    }
    fired
}
