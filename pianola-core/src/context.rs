//! Immutable generation context: the active scale, its transition model,
//! the starting octave and the note-length settings.

use pianola_types::{Pitch, Scale};

use crate::config::{GenerationSettings, ResolvedScale};
use crate::error::{Error, Result};
use crate::transition::TransitionModel;

/// Starting octaves with any chance of fitting the MIDI note range.
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = -1..=9;

/// Everything the generator reads. Built once, shared by reference.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    scale: Scale,
    model: TransitionModel,
    octave: i32,
    settings: GenerationSettings,
}

impl GenerationContext {
    /// Validates the settings and that every degree of the scale, played
    /// from `octave`, maps to a MIDI note id.
    pub fn new(
        resolved: ResolvedScale,
        octave: i32,
        settings: GenerationSettings,
    ) -> Result<Self> {
        settings.validate()?;
        if !OCTAVE_RANGE.contains(&octave) {
            return Err(Error::InvalidArgument(format!(
                "octave {} outside {}..={}",
                octave,
                OCTAVE_RANGE.start(),
                OCTAVE_RANGE.end()
            )));
        }
        let ResolvedScale { scale, model } = resolved;
        if model.degree_count() != scale.len() {
            return Err(Error::InvalidConfiguration(format!(
                "scale '{}' has {} degrees but its model has {} rows",
                scale.id,
                scale.len(),
                model.degree_count()
            )));
        }
        for degree in 0..scale.len() {
            let in_range = scale
                .pitch_at(octave, degree)
                .and_then(|p| p.midi_note())
                .is_some();
            if !in_range {
                return Err(Error::InvalidArgument(format!(
                    "octave {} puts degree {} of {} outside the MIDI note range",
                    octave, degree, scale.id
                )));
            }
        }
        Ok(Self {
            scale,
            model,
            octave,
            settings,
        })
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// The scale's root in the starting octave; where a song begins.
    pub fn start_pitch(&self) -> Pitch {
        // Scales are validated non-empty
        Pitch::new(self.octave, self.scale.degrees[0].class)
    }
}
