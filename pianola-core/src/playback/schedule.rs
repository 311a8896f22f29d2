use std::time::Duration;

use pianola_types::Song;

use crate::error::{DeviceError, Error, Result};

use super::DeviceSink;

/// A single device call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    NoteOn { pitch_id: u8, velocity: u8 },
    NoteOff { pitch_id: u8 },
}

impl DeviceEvent {
    pub fn send(&self, sink: &mut dyn DeviceSink) -> std::result::Result<(), DeviceError> {
        match *self {
            Self::NoteOn { pitch_id, velocity } => sink.note_on(pitch_id, velocity),
            Self::NoteOff { pitch_id } => sink.note_off(pitch_id),
        }
    }
}

/// An event and its offset from the start of the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub offset: Duration,
    pub event: DeviceEvent,
}

/// Ordered events for a whole song.
///
/// Every note contributes an on at its start and an off at its end; the off
/// of one note and the on of the next share an offset and stay in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    events: Vec<ScheduledEvent>,
}

impl Schedule {
    pub fn from_song(song: &Song, velocity: u8) -> Result<Self> {
        if velocity > 127 {
            return Err(DeviceError::OutOfRange {
                what: "velocity",
                value: velocity as i32,
            }
            .into());
        }
        let mut events = Vec::with_capacity(song.note_count() * 2);
        let mut elapsed = 0.0;
        for note in song.notes() {
            let pitch = note.pitch();
            let pitch_id = pitch.midi_note().ok_or(DeviceError::OutOfRange {
                what: "pitch",
                value: pitch.note_id(),
            })?;
            let start = offset(elapsed)?;
            elapsed += note.duration();
            let end = offset(elapsed)?;
            events.push(ScheduledEvent {
                offset: start,
                event: DeviceEvent::NoteOn { pitch_id, velocity },
            });
            events.push(ScheduledEvent {
                offset: end,
                event: DeviceEvent::NoteOff { pitch_id },
            });
        }
        Ok(Self { events })
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn note_count(&self) -> usize {
        self.events.len() / 2
    }

    /// Offset of the final event
    pub fn duration(&self) -> Duration {
        self.events.last().map(|e| e.offset).unwrap_or_default()
    }
}

fn offset(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| Error::InvalidState(format!("note offset {}s: {}", seconds, e)))
}
