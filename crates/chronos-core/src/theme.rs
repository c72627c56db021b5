use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Visual theme selection. Persisted under its own key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Obsidian,
    Nebula,
    Nova,
    Aurora,
    Cyber,
}

impl ThemeId {
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Obsidian,
        ThemeId::Nebula,
        ThemeId::Nova,
        ThemeId::Aurora,
        ThemeId::Cyber,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Obsidian => "obsidian",
            ThemeId::Nebula => "nebula",
            ThemeId::Nova => "nova",
            ThemeId::Aurora => "aurora",
            ThemeId::Cyber => "cyber",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemeId::Obsidian => "Obsidian",
            ThemeId::Nebula => "Nebula",
            ThemeId::Nova => "Nova",
            ThemeId::Aurora => "Aurora",
            ThemeId::Cyber => "Cyber",
        }
    }

    /// Accent colour as an xterm-256 palette index.
    pub fn accent_ansi(self) -> u8 {
        match self {
            ThemeId::Obsidian => 15,
            ThemeId::Nebula => 135,
            ThemeId::Nova => 69,
            ThemeId::Aurora => 42,
            ThemeId::Cyber => 205,
        }
    }

    /// Parse a stored value, falling back to the default for anything unknown.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ThemeId::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownTheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_fall_back_to_obsidian() {
        assert_eq!(ThemeId::from_stored("aurora"), ThemeId::Aurora);
        assert_eq!(ThemeId::from_stored("Nova"), ThemeId::Nova);
        assert_eq!(ThemeId::from_stored("solarized"), ThemeId::Obsidian);
        assert_eq!(ThemeId::from_stored(""), ThemeId::Obsidian);
    }
}
