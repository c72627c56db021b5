//! Alert sound catalogue.
//!
//! Each sound is a short list of tones. Sinks decide how to render them; the
//! terminal sink only uses the tone count and spacing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use Waveform::{Sawtooth, Sine, Square, Triangle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundId {
    #[default]
    Glass,
    Cosmic,
    Echo,
    Orb,
    Warp,
    Pulse,
    Shimmer,
    Void,
    Drift,
    Quantum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One oscillator in a sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub freq_hz: f32,
    /// Frequency reached by the end of the tone (sweeps only).
    pub sweep_to_hz: Option<f32>,
    pub offset_ms: u32,
    pub duration_ms: u32,
    pub gain: f32,
}

const fn tone(waveform: Waveform, freq_hz: f32, offset_ms: u32, duration_ms: u32, gain: f32) -> Tone {
    Tone {
        waveform,
        freq_hz,
        sweep_to_hz: None,
        offset_ms,
        duration_ms,
        gain,
    }
}

impl SoundId {
    pub const ALL: [SoundId; 10] = [
        SoundId::Glass,
        SoundId::Cosmic,
        SoundId::Echo,
        SoundId::Orb,
        SoundId::Warp,
        SoundId::Pulse,
        SoundId::Shimmer,
        SoundId::Void,
        SoundId::Drift,
        SoundId::Quantum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SoundId::Glass => "glass",
            SoundId::Cosmic => "cosmic",
            SoundId::Echo => "echo",
            SoundId::Orb => "orb",
            SoundId::Warp => "warp",
            SoundId::Pulse => "pulse",
            SoundId::Shimmer => "shimmer",
            SoundId::Void => "void",
            SoundId::Drift => "drift",
            SoundId::Quantum => "quantum",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SoundId::Glass => "Glass",
            SoundId::Cosmic => "Cosmic",
            SoundId::Echo => "Echo",
            SoundId::Orb => "Orb",
            SoundId::Warp => "Warp",
            SoundId::Pulse => "Pulse",
            SoundId::Shimmer => "Shimmer",
            SoundId::Void => "Void",
            SoundId::Drift => "Drift",
            SoundId::Quantum => "Quantum",
        }
    }

    pub fn tones(self) -> Vec<Tone> {
        match self {
            SoundId::Glass => vec![
                tone(Sine, 880.0, 0, 1500, 0.3),
                tone(Triangle, 1760.0, 100, 1000, 0.1),
            ],
            SoundId::Cosmic => vec![
                tone(Sine, 220.0, 0, 2000, 0.5),
                tone(Sine, 440.0, 100, 1500, 0.3),
            ],
            SoundId::Echo => vec![
                tone(Triangle, 330.0, 0, 500, 0.2),
                tone(Triangle, 330.0, 300, 500, 0.1),
                tone(Triangle, 330.0, 600, 500, 0.05),
            ],
            // 2 Hz beat between the two oscillators
            SoundId::Orb => vec![
                tone(Sine, 110.0, 0, 3000, 0.6),
                tone(Sine, 112.0, 0, 3000, 0.6),
            ],
            SoundId::Warp => vec![Tone {
                sweep_to_hz: Some(1000.0),
                ..tone(Sine, 100.0, 0, 500, 0.3)
            }],
            SoundId::Pulse => vec![
                tone(Square, 440.0, 0, 100, 0.1),
                tone(Square, 440.0, 150, 100, 0.1),
            ],
            SoundId::Shimmer => vec![
                tone(Sine, 523.25, 0, 1000, 0.2),
                tone(Sine, 659.25, 50, 1000, 0.2),
                tone(Sine, 783.99, 100, 1000, 0.2),
                tone(Sine, 1046.50, 150, 1000, 0.2),
            ],
            SoundId::Void => vec![tone(Sawtooth, 55.0, 0, 2000, 0.3)],
            SoundId::Drift => vec![
                tone(Sine, 300.0, 0, 4000, 0.2),
                tone(Triangle, 600.0, 0, 4000, 0.05),
            ],
            SoundId::Quantum => vec![
                tone(Square, 880.0, 0, 50, 0.1),
                tone(Sine, 110.0, 50, 1000, 0.5),
            ],
        }
    }

    /// Length of the whole sound in milliseconds.
    pub fn duration_ms(self) -> u32 {
        self.tones()
            .iter()
            .map(|t| t.offset_ms + t.duration_ms)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SoundId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| ValidationError::UnknownSound(s.to_string()))
    }
}
