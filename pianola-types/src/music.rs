use serde::{Deserialize, Serialize};

/// One of the twelve chromatic pitch classes, ordered by chromatic index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Chromatic index within the octave (C = 0 .. B = 11)
    pub fn semitone(&self) -> i32 {
        *self as i32
    }

    pub fn from_semitone(semitone: i32) -> PitchClass {
        PitchClass::ALL[semitone.rem_euclid(12) as usize]
    }

    /// Parse a pitch class label.
    ///
    /// Accepts sharps (`C#`), the ASCII alias (`Cs`), flats (`Eb`) and the
    /// enharmonic spellings that show up in key signatures (`E#`, `B#`, `Cb`,
    /// `Fb`). Case-sensitive on the letter so `b` always means flat.
    pub fn parse(label: &str) -> Option<PitchClass> {
        let mut chars = label.chars();
        let letter = chars.next()?;
        let natural = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let accidental = match chars.as_str() {
            "" => 0,
            "#" | "s" => 1,
            "b" => -1,
            _ => return None,
        };
        Some(PitchClass::from_semitone(natural + accidental))
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete pitch: octave plus pitch class.
///
/// Displays octave-first (`4C`, `5F#`), the same shape as the symbolic note
/// names the generator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub octave: i32,
    pub class: PitchClass,
}

impl Pitch {
    pub fn new(octave: i32, class: PitchClass) -> Self {
        Self { octave, class }
    }

    /// Device note id: `12 * octave + 12 + chromatic index` (4C = 60).
    ///
    /// Not range-checked; callers that feed a device go through
    /// [`Pitch::midi_note`]. Saturates for absurd octaves.
    pub fn note_id(&self) -> i32 {
        self.octave
            .saturating_mul(12)
            .saturating_add(12 + self.class.semitone())
    }

    /// The device note id if it fits the 0-127 MIDI range.
    pub fn midi_note(&self) -> Option<u8> {
        u8::try_from(self.note_id()).ok().filter(|id| *id <= 127)
    }
}

impl std::fmt::Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.octave, self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pitch_class_all_has_12() {
        assert_eq!(PitchClass::ALL.len(), 12);
    }

    #[test]
    fn pitch_class_names_unique() {
        let names: HashSet<&str> = PitchClass::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn pitch_class_semitones_0_to_11() {
        let semitones: Vec<i32> = PitchClass::ALL.iter().map(|k| k.semitone()).collect();
        assert_eq!(semitones, (0..12).collect::<Vec<i32>>());
    }

    #[test]
    fn pitch_class_ordered_chromatically() {
        assert!(PitchClass::C < PitchClass::Cs);
        assert!(PitchClass::As < PitchClass::B);
    }

    #[test]
    fn parse_sharps_and_aliases() {
        assert_eq!(PitchClass::parse("C"), Some(PitchClass::C));
        assert_eq!(PitchClass::parse("C#"), Some(PitchClass::Cs));
        assert_eq!(PitchClass::parse("Fs"), Some(PitchClass::Fs));
        assert_eq!(PitchClass::parse("A#"), Some(PitchClass::As));
    }

    #[test]
    fn parse_flats_and_enharmonics() {
        assert_eq!(PitchClass::parse("Eb"), Some(PitchClass::Ds));
        assert_eq!(PitchClass::parse("Cb"), Some(PitchClass::B));
        assert_eq!(PitchClass::parse("E#"), Some(PitchClass::F));
        assert_eq!(PitchClass::parse("B#"), Some(PitchClass::C));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(PitchClass::parse(""), None);
        assert_eq!(PitchClass::parse("H"), None);
        assert_eq!(PitchClass::parse("c"), None);
        assert_eq!(PitchClass::parse("C##"), None);
    }

    #[test]
    fn parse_roundtrips_names() {
        for pc in PitchClass::ALL {
            assert_eq!(PitchClass::parse(pc.name()), Some(pc));
        }
    }

    #[test]
    fn middle_c_is_60() {
        assert_eq!(Pitch::new(4, PitchClass::C).note_id(), 60);
        assert_eq!(Pitch::new(4, PitchClass::A).midi_note(), Some(69));
    }

    #[test]
    fn midi_note_range() {
        assert_eq!(Pitch::new(-1, PitchClass::C).midi_note(), Some(0));
        assert_eq!(Pitch::new(9, PitchClass::G).midi_note(), Some(127));
        assert_eq!(Pitch::new(9, PitchClass::Gs).midi_note(), None);
        assert_eq!(Pitch::new(-2, PitchClass::B).midi_note(), None);
    }

    #[test]
    fn extreme_octaves_saturate_out_of_range() {
        assert_eq!(Pitch::new(i32::MAX, PitchClass::B).note_id(), i32::MAX);
        assert_eq!(Pitch::new(i32::MIN, PitchClass::C).midi_note(), None);
        assert_eq!(Pitch::new(i32::MAX, PitchClass::C).midi_note(), None);
    }

    #[test]
    fn pitch_display_octave_first() {
        assert_eq!(Pitch::new(4, PitchClass::C).to_string(), "4C");
        assert_eq!(Pitch::new(5, PitchClass::Fs).to_string(), "5F#");
    }
}
