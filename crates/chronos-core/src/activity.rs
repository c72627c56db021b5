use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{CountdownEvent, EventId};
use crate::notifier::{Firing, Threshold};
use crate::sound::SoundId;
use crate::theme::ThemeId;

/// Every user-visible state change, as emitted on the CLI's JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Activity {
    EventAdded {
        id: EventId,
        title: String,
        target: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    EventDeleted {
        id: EventId,
        title: String,
        at: DateTime<Utc>,
    },
    NotificationsToggled {
        id: EventId,
        enabled: bool,
        at: DateTime<Utc>,
    },
    AlertFired {
        event_id: EventId,
        title: String,
        threshold: Threshold,
        sound: SoundId,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: ThemeId,
        at: DateTime<Utc>,
    },
}

impl Activity {
    pub fn added(event: &CountdownEvent, at: DateTime<Utc>) -> Self {
        Activity::EventAdded {
            id: event.id.clone(),
            title: event.title.clone(),
            target: event.target,
            at,
        }
    }

    pub fn deleted(event: &CountdownEvent, at: DateTime<Utc>) -> Self {
        Activity::EventDeleted {
            id: event.id.clone(),
            title: event.title.clone(),
            at,
        }
    }
}

impl From<Firing> for Activity {
    fn from(f: Firing) -> Self {
        Activity::AlertFired {
            event_id: f.event_id,
            title: f.title,
            threshold: f.threshold,
            sound: f.sound,
            at: f.at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let activity = Activity::ThemeChanged {
            theme: ThemeId::Aurora,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "ThemeChanged");
        assert_eq!(json["theme"], "aurora");
    }

    #[test]
    fn firing_converts_to_alert_fired() {
        let firing = Firing {
            event_id: EventId::from("abc"),
            title: "Launch".into(),
            threshold: Threshold::OneDay,
            sound: SoundId::Drift,
            at: Utc::now(),
        };
        let json = serde_json::to_value(Activity::from(firing)).unwrap();
        assert_eq!(json["type"], "AlertFired");
        assert_eq!(json["threshold"], "one_day");
        assert_eq!(json["event_id"], "abc");
    }
}
