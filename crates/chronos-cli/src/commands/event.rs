//! Countdown event commands for CLI.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};
use chronos_core::{
    parse_target, Activity, Config, CountdownEvent, EventDraft, NotificationSettings,
    RemainingTime, SoundId, Triggers,
};
use serde::Serialize;

use super::{accent, clock_time, open_store, progress_bar, resolve_id};

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a new countdown
    Add {
        /// Event title
        title: String,
        /// Target date (YYYY-MM-DD, local)
        #[arg(long)]
        date: String,
        /// Target time (HH:MM, local; default 00:00)
        #[arg(long)]
        time: Option<String>,
        /// Alert sound (default from config)
        #[arg(long)]
        sound: Option<SoundId>,
        /// Enable notifications for this event
        #[arg(long)]
        notify: bool,
        /// Do not alert when the countdown completes
        #[arg(long)]
        no_completion: bool,
        /// Alert one hour before the target
        #[arg(long)]
        one_hour: bool,
        /// Alert one day before the target
        #[arg(long)]
        one_day: bool,
        /// Print the activity record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List countdowns, soonest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one countdown in detail
    Show {
        /// Event ID or unique prefix
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a countdown
    Delete {
        /// Event ID or unique prefix
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Turn an event's notifications on or off
    Notify {
        /// Event ID or unique prefix
        id: String,
        state: Switch,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

/// One event as shown by `list` and `show`.
#[derive(Serialize)]
struct EventView<'a> {
    #[serde(flatten)]
    event: &'a CountdownEvent,
    date: String,
    time: String,
    remaining: RemainingTime,
    display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_pct: Option<f64>,
}

impl<'a> EventView<'a> {
    fn new(event: &'a CountdownEvent, now: DateTime<Utc>, config: &Config) -> Self {
        let remaining = event.remaining_at(now);
        Self {
            event,
            date: event.pretty_date(),
            time: clock_time(event, config.display.clock_24h),
            remaining,
            display: remaining.to_string(),
            progress_pct: None,
        }
    }

    fn with_progress(mut self, window_secs: u64) -> Self {
        self.progress_pct = Some(self.remaining.progress_pct(window_secs));
        self
    }
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store()?;
    let config = Config::load_or_default();
    let now = Utc::now();

    match action {
        EventAction::Add {
            title,
            date,
            time,
            sound,
            notify,
            no_completion,
            one_hour,
            one_day,
            json,
        } => {
            let target = parse_target(&date, time.as_deref())?;
            let triggers = Triggers {
                on_completion: !no_completion,
                one_hour_before: one_hour,
                one_day_before: one_day,
            };
            let sound = sound.unwrap_or(config.alerts.default_sound);
            let draft = EventDraft::new(title, target)
                .with_notification(NotificationSettings::new(sound, notify, triggers));
            let event = store.add(draft)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&Activity::added(event, now))?);
            } else {
                println!("Event added: {}", event.id);
                println!("{} | {} {}", event.title, event.pretty_date(), clock_time(event, config.display.clock_24h));
            }
        }
        EventAction::List { json } => {
            let views: Vec<_> = store
                .list()
                .iter()
                .map(|e| EventView::new(e, now, &config))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
                return Ok(());
            }
            if views.is_empty() {
                println!("No events");
                return Ok(());
            }
            let color = std::io::stdout().is_terminal().then(|| store.theme().accent_ansi());
            for view in views {
                let title = match color {
                    Some(ansi) => accent(&view.event.title, ansi),
                    None => view.event.title.clone(),
                };
                let bell = if view.event.notification.enabled { "*" } else { " " };
                println!(
                    "{:<8} {bell} {title}  {}  ({} {})",
                    short_id(view.event),
                    view.display,
                    view.date,
                    view.time
                );
            }
        }
        EventAction::Show { id, json } => {
            let id = resolve_id(&store, &id)?;
            let event = store.get(&id).ok_or(format!("Event not found: {id}"))?;
            let view = EventView::new(event, now, &config).with_progress(config.progress_window_secs());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            let n = &event.notification;
            println!("{}", event.title);
            println!("  id:        {}", event.id);
            println!("  target:    {} {}", view.date, view.time);
            println!("  remaining: {}", view.display);
            println!("  progress:  {}", progress_bar(&view.remaining, config.progress_window_secs()));
            println!(
                "  alerts:    {} ({}) completion={} hour={} day={}",
                if n.enabled { "on" } else { "off" },
                n.sound.label(),
                trigger_state(n.triggers.on_completion, n.latches().completion),
                trigger_state(n.triggers.one_hour_before, n.latches().one_hour),
                trigger_state(n.triggers.one_day_before, n.latches().one_day),
            );
        }
        EventAction::Delete { id, json } => {
            let id = resolve_id(&store, &id)?;
            let removed = store.remove(&id).ok_or(format!("Event not found: {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&Activity::deleted(&removed, now))?);
            } else {
                println!("Event deleted: {}", removed.id);
            }
        }
        EventAction::Notify { id, state, json } => {
            let id = resolve_id(&store, &id)?;
            let enabled = matches!(state, Switch::On);
            store.set_notifications_enabled(&id, enabled);
            if json {
                let activity = Activity::NotificationsToggled { id, enabled, at: now };
                println!("{}", serde_json::to_string_pretty(&activity)?);
            } else {
                println!("Notifications {} for {id}", if enabled { "on" } else { "off" });
            }
        }
    }
    Ok(())
}

fn short_id(event: &CountdownEvent) -> &str {
    let id = event.id.as_str();
    id.get(..8).unwrap_or(id)
}

fn trigger_state(requested: bool, fired: bool) -> &'static str {
    match (requested, fired) {
        (false, _) => "off",
        (true, false) => "armed",
        (true, true) => "fired",
    }
}
