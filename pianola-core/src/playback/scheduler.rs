use std::time::Duration;

use pianola_types::Song;

use crate::error::Result;

use super::{CancelToken, Clock, DeviceEvent, DeviceSink, Schedule};

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every note was played
    Finished { notes: usize },
    /// Stopped after `notes_played` complete notes; nothing left sounding
    Cancelled { notes_played: usize },
}

/// Build the schedule for `song` and play it.
pub fn play(
    song: &Song,
    velocity: u8,
    sink: &mut dyn DeviceSink,
    clock: &mut dyn Clock,
    cancel: &CancelToken,
) -> Result<PlaybackOutcome> {
    let schedule = Schedule::from_song(song, velocity)?;
    play_schedule(&schedule, sink, clock, cancel)
}

/// Dispatch events in order, sleeping the gap before each one.
///
/// Gaps are slept as given, so sink latency accumulates. Cancellation is
/// checked only before a note on. The first sink error stops playback and is
/// returned.
pub fn play_schedule(
    schedule: &Schedule,
    sink: &mut dyn DeviceSink,
    clock: &mut dyn Clock,
    cancel: &CancelToken,
) -> Result<PlaybackOutcome> {
    log::info!(
        target: "playback",
        "playing {} notes ({:.1}s)",
        schedule.note_count(),
        schedule.duration().as_secs_f64()
    );

    let mut now = Duration::ZERO;
    let mut notes_played = 0;
    for scheduled in schedule.events() {
        if scheduled.offset > now {
            clock.sleep(scheduled.offset - now);
            now = scheduled.offset;
        }
        if let DeviceEvent::NoteOn { .. } = scheduled.event {
            if cancel.is_cancelled() {
                log::info!(target: "playback", "cancelled after {} notes", notes_played);
                return Ok(PlaybackOutcome::Cancelled { notes_played });
            }
        }
        if let Err(e) = scheduled.event.send(sink) {
            log::error!(target: "playback", "device rejected {:?}: {}", scheduled.event, e);
            return Err(e.into());
        }
        if let DeviceEvent::NoteOff { .. } = scheduled.event {
            notes_played += 1;
        }
    }

    log::info!(target: "playback", "finished {} notes", notes_played);
    Ok(PlaybackOutcome::Finished {
        notes: notes_played,
    })
}
