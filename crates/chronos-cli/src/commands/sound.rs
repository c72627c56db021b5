use clap::Subcommand;
use chronos_core::{AlertSink, SoundId, TerminalBell};

#[derive(Subcommand)]
pub enum SoundAction {
    /// List alert sounds
    List {
        /// Include each sound's tone recipe as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play a sound on the terminal bell
    Preview {
        sound: SoundId,
    },
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundAction::List { json } => {
            if json {
                let recipes: Vec<_> = SoundId::ALL
                    .into_iter()
                    .map(|id| {
                        serde_json::json!({
                            "id": id,
                            "label": id.label(),
                            "duration_ms": id.duration_ms(),
                            "tones": id.tones(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&recipes)?);
            } else {
                for id in SoundId::ALL {
                    println!("{:<8} {:<8} {:>5}ms", id.as_str(), id.label(), id.duration_ms());
                }
            }
        }
        SoundAction::Preview { sound } => {
            println!("Playing {}", sound.label());
            TerminalBell.play(sound)?;
        }
    }
    Ok(())
}
