pub mod config;
pub mod event;
pub mod sound;
pub mod theme;
pub mod watch;

use chrono::{Local, Utc};
use chronos_core::{CountdownEvent, Database, EventId, EventStore, RemainingTime};

/// Open the event store from the data directory.
pub fn open_store() -> Result<EventStore, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(EventStore::open(db, Utc::now()))
}

/// Resolve a full id or unique prefix to an id.
pub fn resolve_id(store: &EventStore, query: &str) -> Result<EventId, String> {
    store
        .resolve(query)
        .map(|e| e.id.clone())
        .ok_or_else(|| format!("Event not found: {query}"))
}

/// Local clock time honoring the 12/24-hour preference.
pub fn clock_time(event: &CountdownEvent, clock_24h: bool) -> String {
    if clock_24h {
        event.target.with_timezone(&Local).format("%H:%M").to_string()
    } else {
        event.pretty_time()
    }
}

/// Wrap `text` in the theme's accent colour (xterm-256).
pub fn accent(text: &str, ansi: u8) -> String {
    format!("\x1b[38;5;{ansi}m{text}\x1b[0m")
}

/// A 20-cell progress bar.
pub fn progress_bar(left: &RemainingTime, window_secs: u64) -> String {
    let pct = left.progress_pct(window_secs);
    let filled = ((pct / 5.0).round() as usize).min(20);
    format!("[{}{}] {pct:>5.1}%", "#".repeat(filled), "-".repeat(20 - filled))
}
