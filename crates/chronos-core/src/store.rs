//! Ordered event collection backed by the kv slot.
//!
//! The whole collection is serialized as JSON into one key. Other processes
//! may write the same slot, so every mutation re-reads it inside an
//! immediate transaction, applies the change to what it finds and writes the
//! result back. Writes are best effort: a failed save is logged and the
//! in-memory state stays authoritative.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::error::{Result, ValidationError};
use crate::event::{CountdownEvent, EventDraft, EventId, NotificationSettings, Triggers, VisualTag};
use crate::sound::SoundId;
use crate::storage::Database;
use crate::theme::ThemeId;

/// Key holding the serialized event list.
pub const EVENTS_KEY: &str = "chronos_events_v2";
/// Key holding the selected theme.
pub const THEME_KEY: &str = "chronos_theme_v1";

/// Store handle shared between the notifier loop and display tasks.
pub type SharedStore = Arc<Mutex<EventStore>>;

pub struct EventStore {
    events: Vec<CountdownEvent>,
    db: Option<Database>,
}

impl EventStore {
    /// Rehydrate from the slot.
    ///
    /// A missing key seeds and saves the default events. An unreadable slot or
    /// malformed payload also yields the defaults, but the slot is left as it
    /// is until the next mutation.
    pub fn open(db: Database, now: DateTime<Utc>) -> Self {
        let events = match db.kv_get(EVENTS_KEY) {
            Ok(Some(raw)) => match decode_events(&raw) {
                Ok(events) => {
                    tracing::debug!(count = events.len(), "loaded events");
                    events
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored events are malformed, using defaults");
                    default_events(now)
                }
            },
            Ok(None) => {
                let store = Self {
                    events: default_events(now),
                    db: Some(db),
                };
                store.persist_best_effort();
                return store;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot read stored events, using defaults");
                default_events(now)
            }
        };
        Self {
            events,
            db: Some(db),
        }
    }

    /// A store with no backing slot.
    pub fn in_memory(mut events: Vec<CountdownEvent>) -> Self {
        events.sort_by_key(|e| e.target);
        Self { events, db: None }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn list(&self) -> &[CountdownEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &EventId) -> Option<&CountdownEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve(&self, query: &str) -> Option<&CountdownEvent> {
        if let Some(exact) = self.events.iter().find(|e| e.id.as_str() == query) {
            return Some(exact);
        }
        let mut matches = self
            .events
            .iter()
            .filter(|e| !query.is_empty() && e.id.as_str().starts_with(query));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Validate a draft and insert the resulting event.
    pub fn add(&mut self, draft: EventDraft) -> Result<&CountdownEvent, ValidationError> {
        let event = draft.build()?;
        let idx = self.insert(event);
        Ok(&self.events[idx])
    }

    /// Insert an already-built event, re-sort by target and persist.
    /// Returns the event's new position.
    pub fn insert(&mut self, event: CountdownEvent) -> usize {
        tracing::info!(id = %event.id, title = %event.title, target = %event.target, "event added");
        self.mutate(move |events| {
            let id = event.id.clone();
            events.push(event);
            events.sort_by_key(|e| e.target);
            let idx = events
                .iter()
                .position(|e| e.id == id)
                .unwrap_or(events.len() - 1);
            (idx, true)
        })
    }

    /// Remove by id. Absent ids are a no-op and do not touch the slot.
    pub fn remove(&mut self, id: &EventId) -> Option<CountdownEvent> {
        let removed = self.mutate(|events| match events.iter().position(|e| &e.id == id) {
            Some(idx) => (Some(events.remove(idx)), true),
            None => (None, false),
        })?;
        tracing::info!(id = %removed.id, title = %removed.title, "event deleted");
        Some(removed)
    }

    /// Flip an event's notification master switch. Latches are kept.
    /// Returns false when the event does not exist.
    pub fn set_notifications_enabled(&mut self, id: &EventId, enabled: bool) -> bool {
        self.mutate(|events| match events.iter_mut().find(|e| &e.id == id) {
            Some(event) => {
                let changed = event.notification.enabled != enabled;
                event.notification = event.notification.with_enabled(enabled);
                (true, changed)
            }
            None => (false, false),
        })
    }

    /// Offer every event's notification settings to `update`, which returns
    /// replacement settings for the events it wants to change.
    ///
    /// `update` sees the slot's current contents, not a copy loaded earlier,
    /// and the replacements are written in the same transaction. Persists only
    /// if at least one event actually changed. Returns the number changed.
    pub fn update_notifications<F>(&mut self, mut update: F) -> usize
    where
        F: FnMut(&CountdownEvent) -> Option<NotificationSettings>,
    {
        self.mutate(|events| {
            let mut changed = 0;
            for event in events.iter_mut() {
                if let Some(next) = update(event) {
                    if event.notification != next {
                        event.notification = next;
                        changed += 1;
                    }
                }
            }
            (changed, changed > 0)
        })
    }

    /// Apply `op` to the freshest events and persist when it reports a change.
    ///
    /// With a backing slot the read and the write share one immediate
    /// transaction, so a concurrent writer's changes are merged rather than
    /// overwritten. If the transaction cannot start, `op` runs against the
    /// in-memory copy and the result is not saved.
    fn mutate<T>(&mut self, op: impl FnOnce(&mut Vec<CountdownEvent>) -> (T, bool)) -> T {
        let Some(db) = &self.db else {
            return op(&mut self.events).0;
        };
        let tx = match db.begin() {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!(error = %e, "cannot lock stored events, change is not saved");
                return op(&mut self.events).0;
            }
        };
        match tx.get(EVENTS_KEY) {
            Ok(Some(raw)) => match decode_events(&raw) {
                Ok(fresh) => self.events = fresh,
                Err(e) => tracing::debug!(error = %e, "stored events are malformed, overwriting"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "cannot read stored events"),
        }

        let (out, dirty) = op(&mut self.events);
        if dirty {
            let saved = encode_events(&self.events).and_then(|raw| {
                tx.set(EVENTS_KEY, &raw)?;
                tx.commit()?;
                Ok(())
            });
            if let Err(e) = saved {
                tracing::warn!(error = %e, "failed to save events");
            }
        }
        out
    }

    /// Write the collection to the slot. No-op for in-memory stores.
    pub fn persist(&self) -> Result<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };
        db.kv_set(EVENTS_KEY, &encode_events(&self.events)?)?;
        Ok(())
    }

    fn persist_best_effort(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "failed to save events");
        }
    }

    /// Selected theme. Unknown or unreadable values read as the default.
    pub fn theme(&self) -> ThemeId {
        self.db
            .as_ref()
            .and_then(|db| db.kv_get(THEME_KEY).ok().flatten())
            .map(|raw| ThemeId::from_stored(&raw))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: ThemeId) -> Result<()> {
        if let Some(db) = &self.db {
            db.kv_set(THEME_KEY, theme.as_str())?;
        }
        Ok(())
    }
}

/// Serialize an event list to the slot's JSON format.
pub fn encode_events(events: &[CountdownEvent]) -> Result<String> {
    Ok(serde_json::to_string(events)?)
}

/// Parse the slot's JSON. Events with a blank title are rejected like they
/// would be at creation.
pub fn decode_events(raw: &str) -> Result<Vec<CountdownEvent>> {
    let events: Vec<CountdownEvent> = serde_json::from_str(raw)?;
    if events.iter().any(|e| e.title.trim().is_empty()) {
        return Err(ValidationError::EmptyTitle.into());
    }
    Ok(events)
}

/// Starter events shown before the user has saved anything.
pub fn default_events(now: DateTime<Utc>) -> Vec<CountdownEvent> {
    let next_year = now.year() + 1;
    let new_year = Utc
        .with_ymd_and_hms(next_year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now + Duration::days(365));

    let mut events = vec![
        CountdownEvent {
            id: EventId::from("1"),
            title: format!("New Year {next_year}"),
            target: new_year,
            visual: VisualTag::new("from-blue-500 to-purple-600", 101),
            notification: NotificationSettings::new(
                SoundId::Cosmic,
                true,
                Triggers {
                    on_completion: true,
                    one_hour_before: true,
                    one_day_before: false,
                },
            ),
        },
        CountdownEvent {
            id: EventId::from("2"),
            title: "Kyoto Trip".to_string(),
            target: now + Duration::days(15),
            visual: VisualTag::new("from-emerald-400 to-cyan-500", 204),
            notification: NotificationSettings::new(SoundId::Glass, false, Triggers::default()),
        },
    ];
    events.sort_by_key(|e| e.target);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::Threshold;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn draft(title: &str, target: DateTime<Utc>) -> EventDraft {
        EventDraft::new(title, target).with_visual(VisualTag::new("from-pink-500 to-rose-500", 7))
    }

    #[test]
    fn add_keeps_target_order() {
        let now = at("2026-10-18T12:00:00Z");
        let mut store = EventStore::in_memory(Vec::new());
        store.add(draft("later", now + Duration::days(9))).unwrap();
        store.add(draft("sooner", now + Duration::days(1))).unwrap();
        store.add(draft("middle", now + Duration::days(4))).unwrap();
        let titles: Vec<_> = store.list().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["sooner", "middle", "later"]);
    }

    #[test]
    fn equal_targets_keep_insertion_order() {
        let target = at("2026-12-01T00:00:00Z");
        let mut store = EventStore::in_memory(Vec::new());
        store.add(draft("first", target)).unwrap();
        store.add(draft("second", target)).unwrap();
        assert_eq!(store.list()[0].title, "first");
        assert_eq!(store.list()[1].title, "second");
    }

    #[test]
    fn add_rejects_blank_title_without_inserting() {
        let mut store = EventStore::in_memory(Vec::new());
        let err = store.add(draft(" ", Utc::now())).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = EventStore::in_memory(default_events(Utc::now()));
        assert!(store.remove(&EventId::from("nope")).is_none());
        assert_eq!(store.len(), 2);
        assert!(store.remove(&EventId::from("1")).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn resolve_accepts_unique_prefix_only() {
        let mut store = EventStore::in_memory(Vec::new());
        let id_a = store.add(draft("a", Utc::now())).unwrap().id.clone();
        let found = store.resolve(&id_a.as_str()[..8]).map(|e| e.id.clone());
        assert_eq!(found, Some(id_a.clone()));
        assert!(store.resolve("").is_none());
        assert!(store.resolve(id_a.as_str()).is_some());
    }

    #[test]
    fn open_without_key_seeds_and_saves_defaults() {
        let now = at("2026-10-18T12:00:00Z");
        let store = EventStore::open(Database::open_memory().unwrap(), now);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].title, "Kyoto Trip");
        assert_eq!(store.list()[0].target, now + Duration::days(15));
        assert_eq!(store.list()[1].title, "New Year 2027");

        let db = store.db.as_ref().unwrap();
        assert!(db.kv_get(EVENTS_KEY).unwrap().is_some());
    }

    #[test]
    fn open_with_malformed_payload_falls_back_and_keeps_slot() {
        let db = Database::open_memory().unwrap();
        db.kv_set(EVENTS_KEY, "{not json").unwrap();
        let store = EventStore::open(db, Utc::now());
        assert_eq!(store.len(), 2);
        let raw = store.db.as_ref().unwrap().kv_get(EVENTS_KEY).unwrap();
        assert_eq!(raw.as_deref(), Some("{not json"));
    }

    #[test]
    fn update_notifications_reports_only_real_changes() {
        let mut store = EventStore::in_memory(default_events(Utc::now()));
        let id = store.list()[0].id.clone();
        assert_eq!(store.update_notifications(|e| Some(e.notification.clone())), 0);

        let changed = store.update_notifications(|e| {
            (e.id == id).then(|| e.notification.fire(Threshold::Completion)).flatten()
        });
        assert_eq!(changed, 1);
        assert!(store.get(&id).unwrap().notification.latches().completion);
    }

    #[test]
    fn toggling_notifications_keeps_latches() {
        let mut store = EventStore::in_memory(default_events(Utc::now()));
        let id = EventId::from("1");
        store.update_notifications(|e| {
            (e.id == id).then(|| e.notification.fire(Threshold::OneHour)).flatten()
        });

        assert!(store.set_notifications_enabled(&id, false));
        assert!(store.set_notifications_enabled(&id, true));
        assert!(store.get(&id).unwrap().notification.latches().one_hour);
        assert!(!store.set_notifications_enabled(&EventId::from("missing"), true));
    }

    #[test]
    fn mutations_merge_with_the_slot_instead_of_overwriting_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronos.db");
        let now = at("2026-10-18T12:00:00Z");
        let mut first = EventStore::open(Database::open_at(&path).unwrap(), now);
        let mut second = EventStore::open(Database::open_at(&path).unwrap(), now);

        second.add(draft("from second", now + Duration::days(2))).unwrap();
        first.remove(&EventId::from("2"));

        let titles: Vec<_> = first.list().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["from second", "New Year 2027"]);
        let reopened = EventStore::open(Database::open_at(&path).unwrap(), now);
        assert_eq!(reopened.list(), first.list());
    }

    #[test]
    fn blank_titles_in_the_slot_are_rejected() {
        let mut events = default_events(Utc::now());
        events[0].title = "  ".into();
        let raw = encode_events(&events).unwrap();
        assert!(decode_events(&raw).is_err());

        let db = Database::open_memory().unwrap();
        db.kv_set(EVENTS_KEY, &raw).unwrap();
        let store = EventStore::open(db, Utc::now());
        assert!(store.list().iter().all(|e| !e.title.trim().is_empty()));
    }

    #[test]
    fn theme_round_trip_and_fallback() {
        let store = EventStore::open(Database::open_memory().unwrap(), Utc::now());
        assert_eq!(store.theme(), ThemeId::Obsidian);
        store.set_theme(ThemeId::Cyber).unwrap();
        assert_eq!(store.theme(), ThemeId::Cyber);

        store.db.as_ref().unwrap().kv_set(THEME_KEY, "plaid").unwrap();
        assert_eq!(store.theme(), ThemeId::Obsidian);
    }
}
