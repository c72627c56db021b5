//! Foreground threshold notifier.

use std::io::Write;
use std::sync::{Arc, TryLockError};

use chrono::{Local, Utc};
use clap::Args;
use chronos_core::{
    Activity, AlertSink, Config, EventId, Firing, Notifier, SharedStore, SilentSink, SystemClock,
    TerminalBell,
};
use tokio::sync::mpsc;

use super::{open_store, resolve_id};

#[derive(Args)]
pub struct WatchArgs {
    /// Evaluate every event once and exit
    #[arg(long)]
    once: bool,
    /// Keep one event's countdown on screen while watching
    #[arg(long, value_name = "ID")]
    live: Option<String>,
    /// Do not play alerts (thresholds are still marked as fired)
    #[arg(long)]
    mute: bool,
    /// Print firings as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store()?;
    let live = match &args.live {
        Some(query) => Some(resolve_id(&store, query)?),
        None => None,
    };
    let store = store.into_shared();

    let sink: Arc<dyn AlertSink> = if config.alerts.bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentSink)
    };
    let alerts = config.alerts.enabled && !args.mute;

    if args.once {
        let notifier = Notifier::new(store, SystemClock, sink).with_alerts(alerts);
        let report = notifier.tick_and_alert();
        for firing in report.firings {
            print_firing(firing, args.json);
        }
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(store, sink, alerts, live, args.json, &config));
    Ok(())
}

async fn watch(
    store: SharedStore,
    sink: Arc<dyn AlertSink>,
    alerts: bool,
    live: Option<EventId>,
    json: bool,
    config: &Config,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Firing>();
    let notifier = Notifier::new(store.clone(), SystemClock, sink)
        .with_interval(config.tick_interval())
        .with_alerts(alerts)
        .with_listener(tx);

    let printer = tokio::spawn(async move {
        while let Some(firing) = rx.recv().await {
            print_firing(firing, json);
        }
    });
    let display = live.map(|id| tokio::spawn(live_display(store, id, config.display_refresh())));

    eprintln!("watching, Ctrl-C to stop");
    notifier
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    if let Some(display) = display {
        display.abort();
    }
    // The notifier dropped its sender, so the printer drains and exits.
    let _ = printer.await;
}

async fn live_display(store: SharedStore, id: EventId, refresh: std::time::Duration) {
    let mut ticker = tokio::time::interval(refresh);
    loop {
        ticker.tick().await;
        let line = {
            // Skip a frame rather than wait out a tick's SQLite write.
            let store = match store.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(e)) => e.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            };
            match store.get(&id) {
                Some(event) => format!("{}  {}", event.title, event.remaining_at(Utc::now())),
                None => {
                    println!();
                    tracing::warn!(id = %id, "event no longer exists");
                    return;
                }
            }
        };
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r\x1b[2K{line}");
        let _ = out.flush();
    }
}

fn print_firing(firing: Firing, json: bool) {
    if json {
        match serde_json::to_string(&Activity::from(firing)) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "cannot encode firing"),
        }
        return;
    }
    println!(
        "\r\x1b[2K[{}] {} {} ({})",
        firing.at.with_timezone(&Local).format("%H:%M:%S"),
        firing.title,
        firing.threshold.describe(),
        firing.sound.label()
    );
}
