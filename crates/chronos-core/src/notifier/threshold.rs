use std::fmt;

use serde::{Deserialize, Serialize};

use crate::countdown::{RemainingTime, SECS_PER_DAY, SECS_PER_HOUR};
use crate::event::NotificationSettings;

/// A point at which an event may raise an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    Completion,
    OneHour,
    OneDay,
}

impl Threshold {
    /// Evaluation order within a tick.
    pub const ALL: [Threshold; 3] = [Threshold::Completion, Threshold::OneHour, Threshold::OneDay];

    /// Seconds before the target at which the threshold opens.
    /// `None` for completion, which opens at the target itself.
    pub fn lead_secs(self) -> Option<u64> {
        match self {
            Threshold::Completion => None,
            Threshold::OneHour => Some(SECS_PER_HOUR),
            Threshold::OneDay => Some(SECS_PER_DAY),
        }
    }

    /// Whether the threshold window contains `remaining`.
    pub fn is_due(self, remaining: &RemainingTime) -> bool {
        match self.lead_secs() {
            None => remaining.is_past,
            Some(lead) => !remaining.is_past && remaining.total_seconds <= lead,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Threshold::Completion => "completion",
            Threshold::OneHour => "one_hour",
            Threshold::OneDay => "one_day",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Threshold::Completion => "is happening now",
            Threshold::OneHour => "starts within the hour",
            Threshold::OneDay => "starts within a day",
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds that should fire now.
///
/// Each threshold is checked on its own, so one evaluation can return
/// several of them (a coarse tick may cross the day and hour windows at once).
pub fn due_thresholds(settings: &NotificationSettings, remaining: &RemainingTime) -> Vec<Threshold> {
    if !settings.enabled {
        return Vec::new();
    }
    Threshold::ALL
        .into_iter()
        .filter(|t| settings.is_armed(*t) && t.is_due(remaining))
        .collect()
}

/// Settings after firing every due threshold, with the thresholds fired.
/// `None` when nothing fires.
pub fn evaluate(
    settings: &NotificationSettings,
    remaining: &RemainingTime,
) -> Option<(NotificationSettings, Vec<Threshold>)> {
    let due = due_thresholds(settings, remaining);
    if due.is_empty() {
        return None;
    }
    let mut next = settings.clone();
    let mut fired = Vec::with_capacity(due.len());
    for threshold in due {
        if let Some(updated) = next.fire(threshold) {
            next = updated;
            fired.push(threshold);
        }
    }
    Some((next, fired))
}
