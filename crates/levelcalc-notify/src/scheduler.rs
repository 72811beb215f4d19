//! Deferred reminders over a bounded platform timer.
//!
//! Each [`ReminderClass`] has at most one live reminder. A fire instant
//! further away than the host's maximum single delay is reached through a
//! chain of timers: every link waits at most `max_delay_ms`, and when it
//! elapses the scheduler re-reads the clock and arms the next link for
//! whatever is left. Only the final link produces a [`Notification`].
//!
//! Cancelling clears the pending link at the host and forgets its id, so a
//! link that elapses anyway (a host race) is ignored by [`on_timer`].
//!
//! [`on_timer`]: NotificationScheduler::on_timer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use levelcalc_core::experience::{Projection, ProjectionStatus};
use levelcalc_core::time::Timestamp;

use crate::host::{Clock, ScheduleError, TimerHost, MAX_TIMER_DELAY_MS};
use crate::id::{ReminderId, TimerId};

// ===========================================================================
// Types
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderClass {
    NextLevel,
    TargetLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Longest delay handed to the host in one timer.
    pub max_delay_ms: i64,
    pub title: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: MAX_TIMER_DELAY_MS,
            title: "Level reminder".to_string(),
        }
    }
}

/// What the host shows when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub class: ReminderClass,
    pub title: String,
    pub body: String,
    pub fire_at: Timestamp,
    /// Minutes between `fire_at` and the event it announces; zero for
    /// reminders that fire at the event itself.
    #[serde(default)]
    pub lead_minutes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Idle,
    /// `timer` is the pending link; `remaining_ms` is what will be left of
    /// the delay when it elapses.
    Waiting {
        timer: TimerId,
        fire_at: Timestamp,
        remaining_ms: i64,
    },
    Fired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed(ReminderId),
    /// The fire instant was not in the future; nothing is pending.
    Skipped,
}

#[derive(Debug, Clone)]
struct Reminder {
    notification: Notification,
    state: ReminderState,
}

pub fn level_reminder_body(level: u32, lead_minutes: u64) -> String {
    format!("Your character can reach level {level} in about {lead_minutes} minutes!")
}

// ===========================================================================
// Scheduler
// ===========================================================================

pub struct NotificationScheduler<C, H> {
    clock: C,
    host: H,
    config: SchedulerConfig,
    reminders: SlotMap<ReminderId, Reminder>,
    active: BTreeMap<ReminderClass, ReminderId>,
    links: BTreeMap<TimerId, ReminderId>,
}

impl<C: Clock, H: TimerHost> NotificationScheduler<C, H> {
    pub fn new(clock: C, host: H) -> Self {
        Self::with_config(clock, host, SchedulerConfig::default())
    }

    pub fn with_config(clock: C, host: H, config: SchedulerConfig) -> Self {
        Self {
            clock,
            host,
            config,
            reminders: SlotMap::with_key(),
            active: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn max_delay(&self) -> i64 {
        self.config.max_delay_ms.max(1)
    }

    /// Arm the link that starts `delay_ms` before the fire instant.
    fn arm_link(&mut self, delay_ms: i64, fire_at: Timestamp) -> Result<ReminderState, ScheduleError> {
        let link = delay_ms.min(self.max_delay());
        let timer = self.host.set_timer(link)?;
        Ok(ReminderState::Waiting {
            timer,
            fire_at,
            remaining_ms: delay_ms - link,
        })
    }

    /// Arm `notification` for its `fire_at`, replacing any live reminder of
    /// the same class. A fire instant at or before now is skipped, though the
    /// old reminder is still cancelled.
    pub fn arm(&mut self, notification: Notification) -> Result<ArmOutcome, ScheduleError> {
        let class = notification.class;
        if let Some(old) = self.active.remove(&class) {
            self.cancel(old);
            self.reminders.remove(old);
        }

        let delay = self.clock.now().millis_until(notification.fire_at);
        if delay <= 0 {
            tracing::info!(?class, fire_at = notification.fire_at.as_millis(), "reminder in the past, not armed");
            return Ok(ArmOutcome::Skipped);
        }

        let state = self.arm_link(delay, notification.fire_at)?;
        let id = self.reminders.insert(Reminder {
            notification,
            state,
        });
        if let ReminderState::Waiting { timer, remaining_ms, .. } = state {
            self.links.insert(timer, id);
            tracing::info!(?class, delay_ms = delay, chained = remaining_ms > 0, "reminder armed");
        }
        self.active.insert(class, id);
        Ok(ArmOutcome::Armed(id))
    }

    /// Arm a "can reach level N" reminder `lead_minutes` before `eta`. The
    /// ETA is first rounded up to the whole minute.
    pub fn arm_level_reminder(
        &mut self,
        class: ReminderClass,
        level: u32,
        eta: Timestamp,
        lead_minutes: u64,
    ) -> Result<ArmOutcome, ScheduleError> {
        let fire_at = eta.ceil_to_minute().minus_minutes(lead_minutes);
        self.arm(Notification {
            class,
            title: self.config.title.clone(),
            body: level_reminder_body(level, lead_minutes),
            fire_at,
            lead_minutes,
        })
    }

    /// Arm from an experience projection. Anything but a normal projection
    /// with a completion instant cancels the class instead.
    pub fn arm_from_projection(
        &mut self,
        class: ReminderClass,
        level: u32,
        projection: &Projection,
        lead_minutes: u64,
    ) -> Result<ArmOutcome, ScheduleError> {
        match (projection.status, projection.completion) {
            (ProjectionStatus::Ok, Some(eta)) => {
                self.arm_level_reminder(class, level, eta, lead_minutes)
            }
            _ => {
                self.cancel_class(class);
                Ok(ArmOutcome::Skipped)
            }
        }
    }

    /// Stop a reminder. Returns false for stale handles and for reminders
    /// that already fired or were cancelled.
    pub fn cancel(&mut self, id: ReminderId) -> bool {
        let Some(reminder) = self.reminders.get_mut(id) else {
            return false;
        };
        let ReminderState::Waiting { timer, .. } = reminder.state else {
            return false;
        };
        self.host.clear_timer(timer);
        self.links.remove(&timer);
        reminder.state = ReminderState::Cancelled;
        tracing::info!(class = ?reminder.notification.class, "reminder cancelled");
        true
    }

    pub fn cancel_class(&mut self, class: ReminderClass) -> bool {
        match self.active.get(&class) {
            Some(&id) => self.cancel(id),
            None => false,
        }
    }

    /// Handle an elapsed host timer. Returns the notification to show when
    /// the final link elapses; intermediate links re-arm and return `None`.
    /// Ids the scheduler no longer tracks are ignored.
    pub fn on_timer(&mut self, timer: TimerId) -> Result<Option<Notification>, ScheduleError> {
        let Some(id) = self.links.remove(&timer) else {
            tracing::debug!(?timer, "ignoring stale timer");
            return Ok(None);
        };
        let now = self.clock.now();
        let fire_at = match self.reminders.get(id).map(|r| r.state) {
            Some(ReminderState::Waiting { timer: pending, fire_at, .. }) if pending == timer => fire_at,
            _ => return Ok(None),
        };

        let remaining = now.millis_until(fire_at);
        if remaining > 0 {
            let next = match self.arm_link(remaining, fire_at) {
                Ok(next) => next,
                Err(e) => {
                    if let Some(reminder) = self.reminders.get_mut(id) {
                        reminder.state = ReminderState::Cancelled;
                    }
                    return Err(e);
                }
            };
            if let ReminderState::Waiting { timer: link, .. } = next {
                self.links.insert(link, id);
            }
            if let Some(reminder) = self.reminders.get_mut(id) {
                reminder.state = next;
            }
            tracing::info!(remaining_ms = remaining, "reminder chain re-armed");
            return Ok(None);
        }

        let Some(reminder) = self.reminders.get_mut(id) else {
            return Ok(None);
        };
        reminder.state = ReminderState::Fired;
        tracing::info!(class = ?reminder.notification.class, late_ms = -remaining, "reminder fired");
        Ok(Some(reminder.notification.clone()))
    }

    /// State of the class's most recent reminder.
    pub fn state(&self, class: ReminderClass) -> ReminderState {
        self.active
            .get(&class)
            .and_then(|id| self.reminders.get(*id))
            .map_or(ReminderState::Idle, |r| r.state)
    }

    pub fn handle(&self, class: ReminderClass) -> Option<ReminderId> {
        self.active.get(&class).copied()
    }

    /// What a reminder will deliver, e.g. to re-arm it with the same lead.
    pub fn notification(&self, id: ReminderId) -> Option<&Notification> {
        self.reminders.get(id).map(|r| &r.notification)
    }

    /// Host timers currently pending across all classes.
    pub fn pending_links(&self) -> usize {
        self.links.len()
    }
}
