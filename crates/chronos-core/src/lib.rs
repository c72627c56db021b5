//! # Chronos Core Library
//!
//! This library provides the core logic for the Chronos countdown tracker.
//! Every operation is available through the standalone `chronos` CLI, which
//! is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Countdown**: pure, calendar-aware remaining-time computation
//! - **Notifier**: a polling state machine that fires each requested
//!   threshold (one day before, one hour before, completion) at most once
//! - **Store**: ordered event collection persisted to a SQLite kv slot
//! - **Storage**: the kv slot itself and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`remaining`]: time left until a target instant
//! - [`Notifier`]: tick loop over an [`EventStore`] with an injected [`Clock`]
//! - [`EventStore`]: the event collection and theme selection
//! - [`Config`]: application configuration management

pub mod activity;
pub mod alert;
pub mod countdown;
pub mod error;
pub mod event;
pub mod notifier;
pub mod sound;
pub mod storage;
pub mod store;
pub mod theme;

pub use activity::Activity;
pub use alert::{AlertSink, RecordingSink, SilentSink, TerminalBell};
pub use countdown::{remaining, remaining_in, Clock, ManualClock, RemainingTime, SystemClock};
pub use error::{AlertError, ConfigError, CoreError, StorageError, ValidationError};
pub use event::{
    parse_target, parse_target_in, CountdownEvent, EventDraft, EventId, Latches,
    NotificationSettings, Triggers, VisualTag,
};
pub use notifier::{tick_store, Firing, Notifier, Threshold, TickReport};
pub use sound::SoundId;
pub use storage::{Config, Database};
pub use store::{default_events, EventStore, SharedStore};
pub use theme::ThemeId;
