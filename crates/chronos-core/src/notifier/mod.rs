//! Threshold notifier.
//!
//! A bounded polling state machine. On every tick each enabled event's
//! remaining time is compared against its requested thresholds; every
//! threshold fires at most once per event, ever.
//!
//! ## Ordering
//!
//! ```text
//! lock slot -> read events -> evaluate -> commit latches (if changed) -> dispatch alerts
//! ```
//!
//! Latches are committed before any alert leaves the notifier, so an
//! overlapping or repeated tick sees them already set and cannot fire twice.
//! Evaluation runs against the slot as it is at tick time, so events added,
//! deleted or muted by another process since startup are honoured.

mod threshold;

pub use threshold::{due_thresholds, evaluate, Threshold};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;

use crate::alert::AlertSink;
use crate::countdown::{remaining, Clock};
use crate::event::EventId;
use crate::sound::SoundId;
use crate::store::{EventStore, SharedStore};

/// Default tick period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// One threshold crossing that produced an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firing {
    pub event_id: EventId,
    pub title: String,
    pub threshold: Threshold,
    pub sound: SoundId,
    pub at: DateTime<Utc>,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Events with notifications enabled that were looked at.
    pub evaluated: usize,
    /// Events whose latches changed (and were persisted).
    pub changed: usize,
    pub firings: Vec<Firing>,
}

/// Evaluate every event in `store` at `now` and commit the resulting latches.
///
/// Does not play anything; callers dispatch `report.firings` afterwards.
pub fn tick_store(store: &mut EventStore, now: DateTime<Utc>) -> TickReport {
    let mut evaluated = 0;
    let mut firings = Vec::new();

    let changed = store.update_notifications(|event| {
        if !event.notification.enabled {
            return None;
        }
        evaluated += 1;
        let left = remaining(now, event.target);
        let (next, fired) = evaluate(&event.notification, &left)?;
        firings.extend(fired.into_iter().map(|threshold| Firing {
            event_id: event.id.clone(),
            title: event.title.clone(),
            threshold,
            sound: next.sound,
            at: now,
        }));
        Some(next)
    });

    let report = TickReport {
        evaluated,
        changed,
        firings,
    };
    tracing::debug!(
        evaluated = report.evaluated,
        changed = report.changed,
        fired = report.firings.len(),
        "notifier tick"
    );
    report
}

/// Periodic notifier bound to a store, a clock and an alert sink.
pub struct Notifier<C: Clock> {
    store: SharedStore,
    clock: C,
    sink: Arc<dyn AlertSink>,
    interval: Duration,
    alerts_enabled: bool,
    listener: Option<UnboundedSender<Firing>>,
}

impl<C: Clock> Notifier<C> {
    pub fn new(store: SharedStore, clock: C, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            store,
            clock,
            sink,
            interval: DEFAULT_TICK,
            alerts_enabled: true,
            listener: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Mute or unmute the sink. Latches advance either way.
    pub fn with_alerts(mut self, enabled: bool) -> Self {
        self.alerts_enabled = enabled;
        self
    }

    /// Receive every firing as it is committed.
    pub fn with_listener(mut self, listener: UnboundedSender<Firing>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one evaluation pass at the clock's current instant.
    ///
    /// Latches are committed and listeners notified; alerts are not played.
    pub fn tick(&self) -> TickReport {
        let now = self.clock.now();
        let report = {
            // A panic elsewhere must not stop alerts; the store data is still whole.
            let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
            tick_store(&mut store, now)
        };
        for firing in &report.firings {
            tracing::info!(
                id = %firing.event_id,
                title = %firing.title,
                threshold = %firing.threshold,
                sound = %firing.sound,
                "threshold fired"
            );
            if let Some(listener) = &self.listener {
                let _ = listener.send(firing.clone());
            }
        }
        report
    }

    /// Tick and play the alerts inline on the current thread.
    pub fn tick_and_alert(&self) -> TickReport {
        let report = self.tick();
        if self.alerts_enabled {
            for firing in &report.firings {
                play_quietly(self.sink.as_ref(), firing.sound);
            }
        }
        report
    }

    /// Tick on a fixed interval until `shutdown` resolves.
    ///
    /// The tick itself (a SQLite transaction under the store lock) and the
    /// alerts run on the blocking pool, so neither stalls the runtime and a
    /// long sound never delays the next tick.
    pub async fn run<F>(self, shutdown: F)
    where
        C: 'static,
        F: Future<Output = ()>,
    {
        let interval = self.interval;
        let notifier = Arc::new(self);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(interval_ms = interval.as_millis() as u64, "notifier started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let this = Arc::clone(&notifier);
                    let report = match tokio::task::spawn_blocking(move || this.tick()).await {
                        Ok(report) => report,
                        Err(e) => {
                            tracing::warn!(error = %e, "notifier tick panicked");
                            continue;
                        }
                    };
                    if notifier.alerts_enabled {
                        for firing in report.firings {
                            let sink = Arc::clone(&notifier.sink);
                            tokio::task::spawn_blocking(move || play_quietly(sink.as_ref(), firing.sound));
                        }
                    }
                }
            }
        }
        tracing::info!("notifier stopped");
    }
}

fn play_quietly(sink: &dyn AlertSink, sound: SoundId) {
    if let Err(e) = sink.play(sound) {
        tracing::debug!(error = %e, sound = %sound, "alert not played");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::RecordingSink;
    use crate::countdown::ManualClock;
    use crate::error::AlertError;
    use crate::event::{CountdownEvent, EventDraft, NotificationSettings, Triggers, VisualTag};
    use chrono::Duration as ChronoDuration;

    struct BrokenSink;

    impl AlertSink for BrokenSink {
        fn play(&self, _sound: SoundId) -> Result<(), AlertError> {
            Err(AlertError::Unavailable("no audio".into()))
        }
    }

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(title: &str, target: DateTime<Utc>, enabled: bool, triggers: Triggers) -> CountdownEvent {
        EventDraft::new(title, target)
            .with_visual(VisualTag::new("from-cyan-400 to-blue-500", 1))
            .with_notification(NotificationSettings::new(SoundId::Orb, enabled, triggers))
            .build()
            .unwrap()
    }

    fn all_triggers() -> Triggers {
        Triggers {
            on_completion: true,
            one_hour_before: true,
            one_day_before: true,
        }
    }

    #[test]
    fn tick_store_fires_and_latches() {
        let now = start();
        let mut store = EventStore::in_memory(vec![event(
            "soon",
            now + ChronoDuration::minutes(30),
            true,
            all_triggers(),
        )]);

        let report = tick_store(&mut store, now);
        let fired: Vec<_> = report.firings.iter().map(|f| f.threshold).collect();
        assert_eq!(fired, vec![Threshold::OneHour, Threshold::OneDay]);
        assert_eq!(report.changed, 1);

        let again = tick_store(&mut store, now + ChronoDuration::seconds(5));
        assert!(again.firings.is_empty());
        assert_eq!(again.changed, 0);
    }

    #[test]
    fn tick_store_skips_disabled_events() {
        let now = start();
        let mut store = EventStore::in_memory(vec![event(
            "muted",
            now - ChronoDuration::minutes(1),
            false,
            all_triggers(),
        )]);
        let report = tick_store(&mut store, now);
        assert_eq!(report.evaluated, 0);
        assert!(report.firings.is_empty());
    }

    #[test]
    fn only_changed_events_count() {
        let now = start();
        let mut store = EventStore::in_memory(vec![
            event("far", now + ChronoDuration::days(10), true, all_triggers()),
            event("near", now + ChronoDuration::minutes(10), true, all_triggers()),
        ]);
        let report = tick_store(&mut store, now);
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.changed, 1);
    }

    #[test]
    fn broken_sink_does_not_stop_the_tick() {
        let clock = ManualClock::new(start());
        let store = EventStore::in_memory(vec![
            event("a", start() - ChronoDuration::minutes(1), true, all_triggers()),
            event("b", start() + ChronoDuration::minutes(5), true, all_triggers()),
        ])
        .into_shared();
        let notifier = Notifier::new(store.clone(), clock, Arc::new(BrokenSink));

        let report = notifier.tick_and_alert();
        assert_eq!(report.firings.len(), 3);
        let store = store.lock().unwrap();
        assert!(store.list().iter().all(|e| e.notification.latches().completion
            || e.notification.latches().one_hour));
    }

    #[test]
    fn muted_notifier_still_latches() {
        let sink = Arc::new(RecordingSink::new());
        let store = EventStore::in_memory(vec![event(
            "a",
            start() - ChronoDuration::minutes(1),
            true,
            all_triggers(),
        )])
        .into_shared();
        let notifier = Notifier::new(store.clone(), ManualClock::new(start()), sink.clone())
            .with_alerts(false);

        assert_eq!(notifier.tick_and_alert().firings.len(), 1);
        assert_eq!(sink.count(), 0);
        assert!(store.lock().unwrap().list()[0].notification.latches().completion);
    }

    #[tokio::test]
    async fn listener_receives_firings() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let store = EventStore::in_memory(vec![event(
            "a",
            start() + ChronoDuration::minutes(59),
            true,
            all_triggers(),
        )])
        .into_shared();
        let notifier = Notifier::new(store, ManualClock::new(start()), Arc::new(RecordingSink::new()))
            .with_listener(tx);

        notifier.tick();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.threshold, Threshold::OneHour);
        assert_eq!(first.sound, SoundId::Orb);
        assert_eq!(rx.recv().await.unwrap().threshold, Threshold::OneDay);
    }

    #[tokio::test]
    async fn run_ticks_until_shutdown() {
        let sink = Arc::new(RecordingSink::new());
        let store = EventStore::in_memory(vec![event(
            "done",
            start() - ChronoDuration::seconds(1),
            true,
            all_triggers(),
        )])
        .into_shared();
        let notifier = Notifier::new(store.clone(), ManualClock::new(start()), sink.clone())
            .with_interval(Duration::from_millis(10));

        notifier
            .run(tokio::time::sleep(Duration::from_millis(60)))
            .await;

        for _ in 0..100 {
            if sink.count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.played(), vec![SoundId::Orb]);
        assert!(store.lock().unwrap().list()[0].notification.latches().completion);
    }
}
