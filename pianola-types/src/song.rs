use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::music::Pitch;

/// A single note: pitch plus duration in seconds.
///
/// Fields are private so a note can't be edited after creation; the
/// generator is the only producer and guarantees `duration > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pitch: Pitch,
    duration: f64,
}

impl Note {
    /// Returns `None` unless `duration` is finite and strictly positive.
    pub fn new(pitch: Pitch, duration: f64) -> Option<Self> {
        (duration.is_finite() && duration > 0.0).then_some(Self { pitch, duration })
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// A contiguous, non-empty run of generated notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    notes: Vec<Note>,
}

impl Section {
    /// Returns `None` for an empty note list.
    pub fn new(notes: Vec<Note>) -> Option<Self> {
        (!notes.is_empty()).then_some(Self { notes })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sum of note durations in seconds
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().map(Note::duration).sum()
    }

    pub fn last_pitch(&self) -> Pitch {
        // Non-empty by construction
        self.notes[self.notes.len() - 1].pitch()
    }
}

/// Role a section plays in the song form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    Intro,
    /// 1-based verse number
    Verse(u32),
    Chorus,
    Outro,
}

impl SectionKind {
    pub fn name(&self) -> String {
        match self {
            SectionKind::Intro => "intro".to_string(),
            SectionKind::Verse(n) => format!("verse {}", n),
            SectionKind::Chorus => "chorus".to_string(),
            SectionKind::Outro => "outro".to_string(),
        }
    }
}

/// A section placed in the song.
#[derive(Debug, Clone, PartialEq)]
pub struct SongPart {
    pub kind: SectionKind,
    pub section: Arc<Section>,
}

/// Ordered sections forming one piece: intro, (verse, chorus)*, outro.
///
/// Every chorus part points at the same `Section` allocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Song {
    parts: Vec<SongPart>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SectionKind, section: Arc<Section>) {
        self.parts.push(SongPart { kind, section });
    }

    pub fn parts(&self) -> &[SongPart] {
        &self.parts
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.parts.iter().map(|p| p.kind).collect()
    }

    /// All notes in playing order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.parts.iter().flat_map(|p| p.section.notes().iter())
    }

    pub fn note_count(&self) -> usize {
        self.parts.iter().map(|p| p.section.len()).sum()
    }

    pub fn total_duration(&self) -> f64 {
        self.parts.iter().map(|p| p.section.total_duration()).sum()
    }

    pub fn last_pitch(&self) -> Option<Pitch> {
        self.parts.last().map(|p| p.section.last_pitch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::PitchClass;

    fn note(class: PitchClass, duration: f64) -> Note {
        Note::new(Pitch::new(4, class), duration).unwrap()
    }

    #[test]
    fn note_rejects_non_positive_duration() {
        let pitch = Pitch::new(4, PitchClass::C);
        assert!(Note::new(pitch, 0.0).is_none());
        assert!(Note::new(pitch, -1.0).is_none());
        assert!(Note::new(pitch, f64::NAN).is_none());
        assert!(Note::new(pitch, 0.5).is_some());
    }

    #[test]
    fn section_rejects_empty() {
        assert!(Section::new(Vec::new()).is_none());
    }

    #[test]
    fn section_totals_and_last_pitch() {
        let section = Section::new(vec![note(PitchClass::C, 0.5), note(PitchClass::E, 1.25)]).unwrap();
        assert!((section.total_duration() - 1.75).abs() < 1e-12);
        assert_eq!(section.last_pitch(), Pitch::new(4, PitchClass::E));
    }

    #[test]
    fn song_flattens_parts_in_order() {
        let chorus = Arc::new(Section::new(vec![note(PitchClass::G, 1.0)]).unwrap());
        let mut song = Song::new();
        song.push(SectionKind::Intro, Arc::new(Section::new(vec![note(PitchClass::C, 1.0)]).unwrap()));
        song.push(SectionKind::Chorus, Arc::clone(&chorus));
        song.push(SectionKind::Chorus, Arc::clone(&chorus));

        let classes: Vec<PitchClass> = song.notes().map(|n| n.pitch().class).collect();
        assert_eq!(classes, vec![PitchClass::C, PitchClass::G, PitchClass::G]);
        assert_eq!(song.note_count(), 3);
        assert_eq!(song.last_pitch(), Some(Pitch::new(4, PitchClass::G)));
        assert!(Arc::ptr_eq(&song.parts()[1].section, &song.parts()[2].section));
    }

    #[test]
    fn section_kind_names() {
        assert_eq!(SectionKind::Verse(2).name(), "verse 2");
        assert_eq!(SectionKind::Outro.name(), "outro");
    }
}
