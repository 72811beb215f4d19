//! Wall-clock instants.
//!
//! The engine never reads the system clock itself: every operation that
//! depends on "now" takes it as a parameter so results are reproducible.

use serde::{Deserialize, Serialize};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Signed distance to `later`. Negative when `later` is in the past.
    pub fn millis_until(self, later: Timestamp) -> i64 {
        later.0.saturating_sub(self.0)
    }

    pub fn plus_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub fn plus_minutes(self, minutes: u64) -> Self {
        let millis = (minutes as i128 * MILLIS_PER_MINUTE as i128).min(i64::MAX as i128) as i64;
        self.plus_millis(millis)
    }

    pub fn minus_minutes(self, minutes: u64) -> Self {
        let millis = (minutes as i128 * MILLIS_PER_MINUTE as i128).min(i64::MAX as i128) as i64;
        Self(self.0.saturating_sub(millis))
    }

    /// Round up to the next whole minute (identity on exact minutes).
    pub fn ceil_to_minute(self) -> Self {
        let rem = self.0.rem_euclid(MILLIS_PER_MINUTE);
        if rem == 0 {
            self
        } else {
            self.plus_millis(MILLIS_PER_MINUTE - rem)
        }
    }
}

/// Time left until `deadline`, clamped at zero. No deadline means no time.
pub fn remaining_millis(now: Timestamp, deadline: Option<Timestamp>) -> i64 {
    deadline.map_or(0, |d| now.millis_until(d).max(0))
}

/// Whole days left until `deadline`, rounded up.
pub fn days_remaining(now: Timestamp, deadline: Option<Timestamp>) -> u64 {
    let millis = remaining_millis(now, deadline);
    (millis as u64).div_ceil(MILLIS_PER_DAY as u64)
}
