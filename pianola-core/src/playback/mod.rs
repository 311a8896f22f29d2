//! Playback: turn a song into timed note on/off events and send them to a
//! device sink.

mod clock;
mod schedule;
mod scheduler;

pub use clock::{CancelToken, Clock, SleepClock};
pub use schedule::{DeviceEvent, Schedule, ScheduledEvent};
pub use scheduler::{play, play_schedule, PlaybackOutcome};

use std::io::Write;

use crate::error::DeviceError;

/// Something that can sound notes: a MIDI port, a recorder, a log.
pub trait DeviceSink {
    fn note_on(&mut self, pitch_id: u8, velocity: u8) -> Result<(), DeviceError>;
    fn note_off(&mut self, pitch_id: u8) -> Result<(), DeviceError>;
}

/// Writes one line per event instead of sounding it. Used for dry runs.
pub struct LogSink<W: Write> {
    out: W,
}

impl LogSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> LogSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) -> Result<(), DeviceError> {
        log::debug!(target: "playback", "{}", text);
        writeln!(self.out, "{}", text).map_err(|e| DeviceError::Send(e.to_string()))
    }
}

impl<W: Write> DeviceSink for LogSink<W> {
    fn note_on(&mut self, pitch_id: u8, velocity: u8) -> Result<(), DeviceError> {
        self.line(format_args!("note_on {} {}", pitch_id, velocity))
    }

    fn note_off(&mut self, pitch_id: u8) -> Result<(), DeviceError> {
        self.line(format_args!("note_off {}", pitch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sink_writes_lines() {
        let mut sink = LogSink::new(Vec::new());
        sink.note_on(60, 80).unwrap();
        sink.note_off(60).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "note_on 60 80\nnote_off 60\n");
    }
}
