//! # pianola-types
//!
//! Plain data types shared by pianola-core and the pianola binary: pitch
//! classes and pitches, scales with their per-degree transition tables, and
//! the note/section/song values the generator produces.

pub mod music;
pub mod scale;
pub mod song;

pub use music::{Pitch, PitchClass};
pub use scale::{Scale, ScaleDegree, TransitionEntry, TransitionRow, TransitionTable};
pub use song::{Note, Section, SectionKind, Song, SongPart};
