//! Time-remaining computation.
//!
//! `days` counts whole calendar days in a timezone, so a 23-hour or 25-hour
//! DST day still counts as one day. The sub-day fields are a plain
//! decomposition of whatever is left after those days are removed.

use std::fmt;

use chrono::{DateTime, Days, Duration, Local, LocalResult, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const SECS_PER_HOUR: u64 = 3_600;
pub const SECS_PER_DAY: u64 = 86_400;

/// Structured breakdown of the time left until a target instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    /// Whole calendar days until the target (unbounded).
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    /// Whole seconds until the target, 0 once it has passed.
    pub total_seconds: u64,
    pub is_past: bool,
}

impl RemainingTime {
    /// The zeroed result for a target at or before now.
    pub const PAST: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        total_seconds: 0,
        is_past: true,
    };

    /// 0.0 .. 100.0 progress through a countdown assumed to have started
    /// `window_secs` before the target.
    pub fn progress_pct(&self, window_secs: u64) -> f64 {
        if self.is_past || window_secs == 0 {
            return 100.0;
        }
        let elapsed = 1.0 - self.total_seconds as f64 / window_secs as f64;
        (elapsed * 100.0).clamp(0.0, 100.0)
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_past {
            return f.write_str("Completed");
        }
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Remaining time measured against the local timezone's calendar.
pub fn remaining(now: DateTime<Utc>, target: DateTime<Utc>) -> RemainingTime {
    remaining_in(now, target, &Local)
}

/// Remaining time measured against the calendar of `tz`.
///
/// Sub-second remainders are truncated, so a target less than one whole
/// second away already reads as past.
pub fn remaining_in<Tz: TimeZone>(
    now: DateTime<Utc>,
    target: DateTime<Utc>,
    tz: &Tz,
) -> RemainingTime {
    let total = (target - now).num_seconds();
    if total <= 0 {
        return RemainingTime::PAST;
    }

    let days = calendar_days_between(now, target, tz);
    let anchor = add_local_days(now, days, tz);
    // After a DST fall-back the leftover can reach 24h, so hours is not
    // folded back into days.
    let rest = (target - anchor).num_seconds().max(0) as u64;

    RemainingTime {
        days,
        hours: rest / SECS_PER_HOUR,
        minutes: (rest % SECS_PER_HOUR) / 60,
        seconds: rest % 60,
        total_seconds: total as u64,
        is_past: false,
    }
}

/// Number of local-calendar days that can be added to `now` without
/// passing `target`.
fn calendar_days_between<Tz: TimeZone>(
    now: DateTime<Utc>,
    target: DateTime<Utc>,
    tz: &Tz,
) -> u64 {
    let local_now = now.with_timezone(tz).date_naive();
    let local_target = target.with_timezone(tz).date_naive();
    let mut days = (local_target - local_now).num_days().max(0) as u64;
    while days > 0 && add_local_days(now, days, tz) > target {
        days -= 1;
    }
    days
}

/// Add `days` to the wall-clock reading of `now` in `tz`.
///
/// Ambiguous results (DST fold) take the earlier instant. Nonexistent
/// results (DST gap) fall back to fixed 24-hour days.
fn add_local_days<Tz: TimeZone>(now: DateTime<Utc>, days: u64, tz: &Tz) -> DateTime<Utc> {
    let local = now.with_timezone(tz).naive_local();
    let Some(shifted) = local.checked_add_days(Days::new(days)) else {
        return DateTime::<Utc>::MAX_UTC;
    };
    match tz.from_local_datetime(&shifted) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => now + Duration::days(days as i64),
    }
}
