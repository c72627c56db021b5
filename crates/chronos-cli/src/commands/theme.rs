use chrono::Utc;
use clap::Subcommand;
use chronos_core::{Activity, ThemeId};

use super::{accent, open_store};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the selected theme
    Get,
    /// Select a theme
    Set {
        /// Theme name (obsidian, nebula, nova, aurora, cyber)
        theme: ThemeId,
        #[arg(long)]
        json: bool,
    },
    /// List available themes
    List,
}

pub fn run(action: ThemeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        ThemeAction::Get => println!("{}", store.theme()),
        ThemeAction::Set { theme, json } => {
            store.set_theme(theme)?;
            if json {
                let activity = Activity::ThemeChanged { theme, at: Utc::now() };
                println!("{}", serde_json::to_string_pretty(&activity)?);
            } else {
                println!("Theme set: {}", theme.name());
            }
        }
        ThemeAction::List => {
            let current = store.theme();
            for theme in ThemeId::ALL {
                let marker = if theme == current { "*" } else { " " };
                println!("{marker} {:<9} {}", theme.as_str(), accent(theme.name(), theme.accent_ansi()));
            }
        }
    }
    Ok(())
}
