use serde::{Deserialize, Serialize};

use crate::music::{Pitch, PitchClass};

/// One degree of a scale: a pitch class and how many octaves above the
/// scale's base octave it sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDegree {
    pub class: PitchClass,
    pub octave_shift: i32,
}

impl ScaleDegree {
    pub fn new(class: PitchClass, octave_shift: i32) -> Self {
        Self { class, octave_shift }
    }
}

/// An ordered scale. Degree indices are the transition model's state space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Short identifier used on the command line (e.g. `CM`, `F#m`)
    pub id: String,
    /// Human-readable name (e.g. `C Major`)
    pub name: String,
    pub degrees: Vec<ScaleDegree>,
}

impl Scale {
    pub fn new(id: impl Into<String>, name: impl Into<String>, degrees: Vec<ScaleDegree>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            degrees,
        }
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    pub fn root(&self) -> Option<PitchClass> {
        self.degrees.first().map(|d| d.class)
    }

    /// Lowest degree index carrying the given pitch class.
    pub fn degree_of(&self, class: PitchClass) -> Option<usize> {
        self.degrees.iter().position(|d| d.class == class)
    }

    /// Concrete pitch of `degree` relative to `base_octave`.
    pub fn pitch_at(&self, base_octave: i32, degree: usize) -> Option<Pitch> {
        self.degrees
            .get(degree)
            .map(|d| Pitch::new(base_octave.saturating_add(d.octave_shift), d.class))
    }

    /// Map a concrete pitch back to (base octave, degree).
    ///
    /// The degree's declared octave shift is undone so that the base octave
    /// carries through subsequent transitions.
    pub fn locate(&self, pitch: Pitch) -> Option<(i32, usize)> {
        let degree = self.degree_of(pitch.class)?;
        Some((pitch.octave.saturating_sub(self.degrees[degree].octave_shift), degree))
    }

    /// Like [`Scale::locate`], but when a pitch class appears on more than
    /// one degree (an octave-repeated root) prefer the degree that sounds
    /// exactly `pitch` from `base_octave`.
    pub fn locate_from(&self, base_octave: i32, pitch: Pitch) -> Option<(i32, usize)> {
        let exact = (0..self.len()).find(|&d| self.pitch_at(base_octave, d) == Some(pitch));
        match exact {
            Some(degree) => Some((base_octave, degree)),
            None => self.locate(pitch),
        }
    }
}

/// One (upper bound, target degree) breakpoint of a transition row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub bound: f64,
    pub target: usize,
}

impl TransitionEntry {
    pub fn new(bound: f64, target: usize) -> Self {
        Self { bound, target }
    }
}

/// Cumulative-probability breakpoints governing what follows one degree.
///
/// Entries are scanned in order; the first whose bound is at least the
/// random draw wins and the last entry catches anything left over.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransitionRow {
    pub entries: Vec<TransitionEntry>,
}

impl TransitionRow {
    pub fn new(entries: Vec<TransitionEntry>) -> Self {
        Self { entries }
    }

    /// Build a row from `(bound, target)` pairs.
    pub fn from_pairs(pairs: &[(f64, usize)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|&(bound, target)| TransitionEntry::new(bound, target))
                .collect(),
        }
    }

    /// Half-open probability interval `(previous bound, bound]` owned by entry `i`.
    pub fn interval(&self, i: usize) -> Option<(f64, f64)> {
        let entry = self.entries.get(i)?;
        let low = if i == 0 { 0.0 } else { self.entries[i - 1].bound };
        let high = if i + 1 == self.entries.len() { 1.0 } else { entry.bound };
        Some((low, high))
    }
}

/// Per-degree transition rows, indexed by degree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransitionTable {
    pub id: String,
    pub rows: Vec<TransitionRow>,
}

impl TransitionTable {
    pub fn new(id: impl Into<String>, rows: Vec<TransitionRow>) -> Self {
        Self {
            id: id.into(),
            rows,
        }
    }

    pub fn row(&self, degree: usize) -> Option<&TransitionRow> {
        self.rows.get(degree)
    }
}
