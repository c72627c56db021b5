//! Countdown event model.
//!
//! An event's target and id never change after creation. Its notification
//! latches can only be set by firing a threshold, and firing produces a new
//! [`NotificationSettings`] value rather than mutating the old one.

use std::fmt;

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::countdown::{remaining, RemainingTime};
use crate::error::ValidationError;
use crate::notifier::Threshold;
use crate::sound::SoundId;

/// Opaque event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const GRADIENTS: [&str; 8] = [
    "from-blue-500 to-purple-600",
    "from-emerald-400 to-cyan-500",
    "from-orange-400 to-pink-600",
    "from-indigo-400 to-blue-600",
    "from-pink-500 to-rose-500",
    "from-amber-300 to-orange-500",
    "from-violet-500 to-fuchsia-500",
    "from-cyan-400 to-blue-500",
];

/// Styling hints for whatever renders the event. Never inspected by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualTag {
    pub color: String,
    pub image_seed: u32,
}

impl VisualTag {
    pub fn new(color: impl Into<String>, image_seed: u32) -> Self {
        Self {
            color: color.into(),
            image_seed,
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let color = GRADIENTS.choose(&mut rng).copied().unwrap_or(GRADIENTS[0]);
        Self::new(color, rng.gen_range(0..1000))
    }
}

/// Which thresholds the user asked to be alerted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default)]
    pub on_completion: bool,
    #[serde(default)]
    pub one_hour_before: bool,
    #[serde(default)]
    pub one_day_before: bool,
}

impl Triggers {
    pub fn wants(&self, threshold: Threshold) -> bool {
        match threshold {
            Threshold::Completion => self.on_completion,
            Threshold::OneHour => self.one_hour_before,
            Threshold::OneDay => self.one_day_before,
        }
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            on_completion: true,
            one_hour_before: false,
            one_day_before: false,
        }
    }
}

/// One-way fired flags, one per threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latches {
    #[serde(default)]
    pub completion: bool,
    #[serde(default)]
    pub one_hour: bool,
    #[serde(default)]
    pub one_day: bool,
}

impl Latches {
    pub fn is_fired(&self, threshold: Threshold) -> bool {
        match threshold {
            Threshold::Completion => self.completion,
            Threshold::OneHour => self.one_hour,
            Threshold::OneDay => self.one_day,
        }
    }

    fn fired(mut self, threshold: Threshold) -> Self {
        match threshold {
            Threshold::Completion => self.completion = true,
            Threshold::OneHour => self.one_hour = true,
            Threshold::OneDay => self.one_day = true,
        }
        self
    }
}

/// Per-event alert configuration plus the latch state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub sound: SoundId,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub triggers: Triggers,
    #[serde(default)]
    latches: Latches,
}

impl NotificationSettings {
    /// Fresh settings with every latch clear.
    pub fn new(sound: SoundId, enabled: bool, triggers: Triggers) -> Self {
        Self {
            sound,
            enabled,
            triggers,
            latches: Latches::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(SoundId::default(), false, Triggers::default())
    }

    pub fn latches(&self) -> Latches {
        self.latches
    }

    /// True when `threshold` is requested and has not fired yet.
    pub fn is_armed(&self, threshold: Threshold) -> bool {
        self.triggers.wants(threshold) && !self.latches.is_fired(threshold)
    }

    /// Settings with `threshold`'s latch set, or `None` if it is not armed.
    ///
    /// This is the only way a latch becomes true.
    pub fn fire(&self, threshold: Threshold) -> Option<Self> {
        if !self.is_armed(threshold) {
            return None;
        }
        Some(Self {
            latches: self.latches.fired(threshold),
            ..self.clone()
        })
    }

    /// Toggle the master switch. Latches carry over unchanged.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

/// A named countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownEvent {
    pub id: EventId,
    pub title: String,
    pub target: DateTime<Utc>,
    pub visual: VisualTag,
    #[serde(default)]
    pub notification: NotificationSettings,
}

impl CountdownEvent {
    /// Remaining time on the local calendar.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> RemainingTime {
        remaining(now, self.target)
    }

    /// Local date line, e.g. "Sunday, Oct 18th, 2026".
    pub fn pretty_date(&self) -> String {
        let local = self.target.with_timezone(&Local);
        format!(
            "{}{}, {}",
            local.format("%A, %b %-d"),
            ordinal_suffix(local.day()),
            local.year()
        )
    }

    /// Local time line, e.g. "7:05 PM".
    pub fn pretty_time(&self) -> String {
        self.target.with_timezone(&Local).format("%-I:%M %p").to_string()
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Unvalidated input for a new event.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub target: DateTime<Utc>,
    pub notification: NotificationSettings,
    pub visual: Option<VisualTag>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, target: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            target,
            notification: NotificationSettings::default(),
            visual: None,
        }
    }

    pub fn with_notification(mut self, notification: NotificationSettings) -> Self {
        self.notification = notification;
        self
    }

    pub fn with_visual(mut self, visual: VisualTag) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Validate and build the event with a freshly generated id.
    ///
    /// Latches are never carried in from a draft.
    pub fn build(self) -> Result<CountdownEvent, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let requested = self.notification;
        Ok(CountdownEvent {
            id: EventId::generate(),
            title: title.to_string(),
            target: self.target,
            visual: self.visual.unwrap_or_else(VisualTag::random),
            notification: NotificationSettings::new(
                requested.sound,
                requested.enabled,
                requested.triggers,
            ),
        })
    }
}

/// Parse a `YYYY-MM-DD` date and optional `HH:MM` time in the local timezone.
pub fn parse_target(date: &str, time: Option<&str>) -> Result<DateTime<Utc>, ValidationError> {
    parse_target_in(date, time, &Local)
}

/// Parse a date and optional time on the calendar of `tz`. Missing time means
/// midnight. A time repeated by a DST fold resolves to its first occurrence.
pub fn parse_target_in<Tz: TimeZone>(
    date: &str,
    time: Option<&str>,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
    let clock = match time.map(str::trim) {
        None | Some("") => NaiveTime::MIN,
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .map_err(|_| ValidationError::InvalidTime(t.to_string()))?,
    };
    let naive = day.and_time(clock);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ValidationError::NonexistentLocalTime(naive.to_string())),
    }
}
