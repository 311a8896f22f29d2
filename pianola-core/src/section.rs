//! Section generation: walk the transition model from a starting pitch until
//! the accumulated note durations reach a target length.

use pianola_types::{Note, Pitch, Section};

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::random::RandomSource;

/// Generate one section starting at `start`.
///
/// The starting pitch is always emitted, so a target of zero or less yields
/// exactly one note. Otherwise notes are added until the running total first
/// reaches `target_seconds`; the last note may overshoot.
pub fn generate_section(
    ctx: &GenerationContext,
    start: Pitch,
    target_seconds: f64,
    rng: &mut dyn RandomSource,
) -> Result<Section> {
    if target_seconds.is_nan() || target_seconds == f64::INFINITY {
        return Err(Error::InvalidArgument(format!(
            "section target {} is not a finite length",
            target_seconds
        )));
    }

    let scale = ctx.scale();
    let (base_octave, mut degree) = scale.locate_from(ctx.octave(), start).ok_or_else(|| {
        Error::InvalidConfiguration(format!(
            "start pitch {} is not in scale {}",
            start, scale.id
        ))
    })?;
    let settings = ctx.settings();

    let mut notes = Vec::new();
    let mut pitch = start;
    let mut total = 0.0;
    loop {
        let duration = rng.range(settings.min_note_seconds, settings.max_note_seconds);
        let note = Note::new(pitch, duration).ok_or_else(|| {
            Error::InvalidState(format!("generated non-positive duration {}", duration))
        })?;
        notes.push(note);
        total += duration;
        if total >= target_seconds {
            break;
        }

        degree = ctx.model().sample(degree, rng)?;
        pitch = scale.pitch_at(base_octave, degree).ok_or_else(|| {
            Error::InvalidState(format!("degree {} outside scale {}", degree, scale.id))
        })?;
    }

    Section::new(notes).ok_or_else(|| Error::InvalidState("empty section".to_string()))
}
