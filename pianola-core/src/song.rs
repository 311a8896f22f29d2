//! Song composition: intro, chorus, verses and outro chained note to note.

use std::sync::Arc;

use pianola_types::{Pitch, Section, SectionKind, Song};

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::random::RandomSource;
use crate::section::generate_section;

/// Compose a full song starting at `start`.
///
/// The form is intro, then `verse_count` times (verse, chorus), then outro;
/// with no verses the chorus still plays once between intro and outro. The
/// chorus is generated once, from the intro's last note, and every
/// repetition shares it. Each verse and the outro pick up from the last note
/// of the song so far.
pub fn compose_song(
    ctx: &GenerationContext,
    start: Pitch,
    section_seconds: f64,
    verse_count: i32,
    rng: &mut dyn RandomSource,
) -> Result<Song> {
    if !section_seconds.is_finite() || section_seconds <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "section duration must be positive, got {}",
            section_seconds
        )));
    }
    if verse_count < 0 {
        return Err(Error::InvalidArgument(format!(
            "verse count must not be negative, got {}",
            verse_count
        )));
    }
    let settings = ctx.settings();

    let mut song = Song::new();
    let intro = generate(ctx, SectionKind::Intro, start, settings.intro_seconds, rng)?;
    let chorus = generate(ctx, SectionKind::Chorus, intro.last_pitch(), section_seconds, rng)?;
    song.push(SectionKind::Intro, intro);

    if verse_count == 0 {
        song.push(SectionKind::Chorus, Arc::clone(&chorus));
    }
    for n in 1..=verse_count as u32 {
        let kind = SectionKind::Verse(n);
        let verse = generate(ctx, kind, last_pitch(&song)?, section_seconds, rng)?;
        song.push(kind, verse);
        song.push(SectionKind::Chorus, Arc::clone(&chorus));
    }

    let outro = generate(ctx, SectionKind::Outro, last_pitch(&song)?, settings.outro_seconds, rng)?;
    song.push(SectionKind::Outro, outro);

    log::info!(
        target: "generate",
        "composed {} sections, {} notes, {:.1}s",
        song.parts().len(),
        song.note_count(),
        song.total_duration()
    );
    Ok(song)
}

fn generate(
    ctx: &GenerationContext,
    kind: SectionKind,
    start: Pitch,
    target_seconds: f64,
    rng: &mut dyn RandomSource,
) -> Result<Arc<Section>> {
    let section = generate_section(ctx, start, target_seconds, rng)?;
    log::debug!(
        target: "generate",
        "{}: {} notes, {:.2}s from {}",
        kind.name(),
        section.len(),
        section.total_duration(),
        start
    );
    Ok(Arc::new(section))
}

fn last_pitch(song: &Song) -> Result<Pitch> {
    song.last_pitch()
        .ok_or_else(|| Error::InvalidState("song has no notes yet".to_string()))
}
