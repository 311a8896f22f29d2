//! End-to-end: compose a song from the stock config and play it through a
//! recording sink on a virtual clock.

use std::time::Duration;

use pianola_core::config::Config;
use pianola_core::context::GenerationContext;
use pianola_core::error::DeviceError;
use pianola_core::playback::{self, CancelToken, Clock, DeviceSink, LogSink, PlaybackOutcome};
use pianola_core::random::{Lcg, RandomSource};
use pianola_core::song::compose_song;
use pianola_core::Error;
use pianola_types::{Pitch, PitchClass, SectionKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sent {
    On(u8, u8),
    Off(u8),
}

#[derive(Default)]
struct RecordingSink {
    sent: Vec<Sent>,
}

impl DeviceSink for RecordingSink {
    fn note_on(&mut self, pitch_id: u8, velocity: u8) -> Result<(), DeviceError> {
        self.sent.push(Sent::On(pitch_id, velocity));
        Ok(())
    }

    fn note_off(&mut self, pitch_id: u8) -> Result<(), DeviceError> {
        self.sent.push(Sent::Off(pitch_id));
        Ok(())
    }
}

/// Advances a counter instead of sleeping.
#[derive(Default)]
struct VirtualClock {
    elapsed: Duration,
    sleeps: usize,
}

impl Clock for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        self.elapsed += duration;
        self.sleeps += 1;
    }
}

fn context(scale: &str, octave: i32) -> GenerationContext {
    let config = Config::embedded();
    GenerationContext::new(
        config.resolve_scale(scale).unwrap(),
        octave,
        config.generation(),
    )
    .unwrap()
}

#[test]
fn c_major_song_plays_every_note_in_order() {
    let ctx = context("CM", 4);
    let song = compose_song(&ctx, ctx.start_pitch(), 10.0, 1, &mut Lcg::new(4242)).unwrap();
    assert_eq!(
        song.kinds(),
        vec![
            SectionKind::Intro,
            SectionKind::Verse(1),
            SectionKind::Chorus,
            SectionKind::Outro
        ]
    );

    let mut sink = RecordingSink::default();
    let mut clock = VirtualClock::default();
    let outcome = playback::play(&song, 80, &mut sink, &mut clock, &CancelToken::new()).unwrap();
    assert_eq!(outcome, PlaybackOutcome::Finished { notes: song.note_count() });

    // Strict on/off alternation, matching the song's pitches
    assert_eq!(sink.sent.len(), song.note_count() * 2);
    for (pair, note) in sink.sent.chunks(2).zip(song.notes()) {
        let id = note.pitch().midi_note().unwrap();
        assert_eq!(pair, &[Sent::On(id, 80), Sent::Off(id)]);
    }
    assert_eq!(sink.sent[0], Sent::On(60, 80));

    // One sleep per note; virtual time covers the song within rounding
    assert_eq!(clock.sleeps, song.note_count());
    let drift = (clock.elapsed.as_secs_f64() - song.total_duration()).abs();
    assert!(drift < 1e-6, "drift {}", drift);
    assert!(clock.elapsed.as_secs_f64() >= 15.0 + 10.0 + 10.0 + 15.0 - 1e-6);
}

#[test]
fn every_scale_composes_and_plays() {
    let config = Config::embedded();
    for id in config.scale_ids() {
        let ctx = GenerationContext::new(config.resolve_scale(id).unwrap(), 3, config.generation())
            .unwrap();
        let song = compose_song(&ctx, ctx.start_pitch(), 5.0, 2, &mut Lcg::new(11)).unwrap();
        for note in song.notes() {
            assert!(ctx.scale().degree_of(note.pitch().class).is_some(), "{} {}", id, note.pitch());
        }
        let mut sink = RecordingSink::default();
        let outcome = playback::play(
            &song,
            100,
            &mut sink,
            &mut VirtualClock::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert!(matches!(outcome, PlaybackOutcome::Finished { .. }), "{}", id);
    }
}

#[test]
fn notes_stay_within_declared_octaves() {
    let config = Config::embedded();
    for id in config.scale_ids() {
        for octave in [4, 8] {
            let resolved = config.resolve_scale(id).unwrap();
            let Ok(ctx) = GenerationContext::new(resolved, octave, config.generation()) else {
                continue;
            };
            for seed in 0..20 {
                let song = compose_song(&ctx, ctx.start_pitch(), 3.0, 20, &mut Lcg::new(seed)).unwrap();
                for note in song.notes() {
                    let pitch = note.pitch();
                    assert!(
                        (octave..=octave + 1).contains(&pitch.octave),
                        "{} from octave {} seed {} reached {}",
                        id,
                        octave,
                        seed,
                        pitch
                    );
                }
                let outcome = playback::play(
                    &song,
                    80,
                    &mut RecordingSink::default(),
                    &mut VirtualClock::default(),
                    &CancelToken::new(),
                )
                .unwrap();
                assert!(matches!(outcome, PlaybackOutcome::Finished { .. }));
            }
        }
    }
}

#[test]
fn cancel_from_another_thread_leaves_nothing_sounding() {
    let ctx = context("Am", 4);
    let song = compose_song(&ctx, ctx.start_pitch(), 10.0, 3, &mut Lcg::new(9)).unwrap();

    /// Cancels once virtual time passes a threshold, from a spawned thread.
    struct CancellingClock {
        elapsed: Duration,
        at: Duration,
        token: CancelToken,
    }

    impl Clock for CancellingClock {
        fn sleep(&mut self, duration: Duration) {
            self.elapsed += duration;
            if self.elapsed >= self.at && !self.token.is_cancelled() {
                let token = self.token.clone();
                std::thread::spawn(move || token.cancel()).join().unwrap();
            }
        }
    }

    let token = CancelToken::new();
    let mut clock = CancellingClock {
        elapsed: Duration::ZERO,
        at: Duration::from_secs(20),
        token: token.clone(),
    };
    let mut sink = RecordingSink::default();
    let outcome = playback::play(&song, 80, &mut sink, &mut clock, &token).unwrap();

    let PlaybackOutcome::Cancelled { notes_played } = outcome else {
        panic!("expected cancellation, got {:?}", outcome);
    };
    assert!(notes_played > 0 && notes_played < song.note_count());
    assert_eq!(sink.sent.len(), notes_played * 2);
    assert!(matches!(sink.sent.last(), Some(Sent::Off(_))));
}

#[test]
fn failing_sink_surfaces_device_error() {
    struct Unplugged;

    impl DeviceSink for Unplugged {
        fn note_on(&mut self, _: u8, _: u8) -> Result<(), DeviceError> {
            Err(DeviceError::NotConnected)
        }

        fn note_off(&mut self, _: u8) -> Result<(), DeviceError> {
            Err(DeviceError::NotConnected)
        }
    }

    let ctx = context("CM", 4);
    let song = compose_song(&ctx, ctx.start_pitch(), 5.0, 0, &mut Lcg::new(1)).unwrap();
    let mut clock = VirtualClock::default();
    let err = playback::play(&song, 80, &mut Unplugged, &mut clock, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, Error::Device(DeviceError::NotConnected)));
    assert_eq!(clock.sleeps, 0);
}

#[test]
fn dry_run_sink_prints_the_song() {
    let ctx = context("DM", 4);
    let song = compose_song(&ctx, ctx.start_pitch(), 5.0, 1, &mut Lcg::new(3)).unwrap();
    let mut sink = LogSink::new(Vec::new());
    playback::play(&song, 64, &mut sink, &mut VirtualClock::default(), &CancelToken::new()).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), song.note_count() * 2);
    assert_eq!(lines[0], "note_on 62 64");
    assert_eq!(lines[1], "note_off 62");
}

#[test]
fn all_zero_draws_hold_the_tonic() {
    struct Zero;

    impl RandomSource for Zero {
        fn next_unit(&mut self) -> f64 {
            0.0
        }
    }

    let ctx = context("CM", 4);
    let song = compose_song(&ctx, ctx.start_pitch(), 10.0, 2, &mut Zero).unwrap();
    assert!(song.notes().all(|n| n.pitch() == Pitch::new(4, PitchClass::C)));
    assert!(song.notes().all(|n| n.duration() == 0.5));
}

#[test]
fn user_config_scale_drives_composition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[generation]
intro_seconds = 2.0
outro_seconds = 3.0

[scales."Dlyd"]
name = "D Lydian"
degrees = ["D", "E", "F#", "G#", "A", "B", "C#"]
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let ctx = GenerationContext::new(config.resolve_scale("Dlyd").unwrap(), 4, config.generation())
        .unwrap();
    let song = compose_song(&ctx, ctx.start_pitch(), 4.0, 0, &mut Lcg::new(8)).unwrap();
    let parts = song.parts();
    assert!(parts[0].section.total_duration() >= 2.0);
    assert!(parts[0].section.total_duration() < 2.0 + 1.5);
    assert!(parts[2].section.total_duration() >= 3.0);
}
