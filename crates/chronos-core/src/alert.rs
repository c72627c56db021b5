//! Alert output.
//!
//! The notifier hands each firing to an [`AlertSink`]. Sinks are
//! fire-and-forget: their errors are logged by the caller and dropped.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::error::AlertError;
use crate::sound::SoundId;

/// Something that can play an alert sound.
pub trait AlertSink: Send + Sync {
    fn play(&self, sound: SoundId) -> Result<(), AlertError>;
}

/// Discards every alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AlertSink for SilentSink {
    fn play(&self, _sound: SoundId) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Remembers every sound it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingSink {
    played: Mutex<Vec<SoundId>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<SoundId> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.played.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl AlertSink for RecordingSink {
    fn play(&self, sound: SoundId) -> Result<(), AlertError> {
        if let Ok(mut played) = self.played.lock() {
            played.push(sound);
        }
        Ok(())
    }
}

/// Rings the terminal bell once per distinct tone onset, spaced like the
/// sound's tones. Blocks for the length of the sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn play(&self, sound: SoundId) -> Result<(), AlertError> {
        let stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(AlertError::Unavailable("stderr is not a terminal".into()));
        }

        let mut onsets: Vec<u32> = sound.tones().iter().map(|t| t.offset_ms).collect();
        onsets.sort_unstable();
        onsets.dedup();

        let mut elapsed = 0;
        for onset in onsets {
            thread::sleep(Duration::from_millis(u64::from(onset - elapsed)));
            elapsed = onset;
            let mut out = stderr.lock();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}
