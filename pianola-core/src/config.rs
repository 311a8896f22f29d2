use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use pianola_types::{PitchClass, Scale, ScaleDegree, TransitionRow, TransitionTable};

use crate::error::{Error, Result};
use crate::transition::TransitionModel;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Transition table used by scales that don't name one.
pub const DEFAULT_TABLE_ID: &str = "default";

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    generation: GenerationConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    transitions: BTreeMap<String, TableConfig>,
    #[serde(default)]
    scales: BTreeMap<String, ScaleConfig>,
}

#[derive(Deserialize, Default)]
struct GenerationConfig {
    intro_seconds: Option<f64>,
    outro_seconds: Option<f64>,
    min_note_seconds: Option<f64>,
    max_note_seconds: Option<f64>,
}

#[derive(Deserialize, Default)]
struct PlaybackConfig {
    velocity: Option<u8>,
    channel: Option<u8>,
    program: Option<u8>,
}

#[derive(Deserialize, Clone)]
struct TableConfig {
    rows: Vec<Vec<(f64, usize)>>,
}

#[derive(Deserialize, Clone)]
struct ScaleConfig {
    name: Option<String>,
    degrees: Vec<String>,
    #[serde(default)]
    octave_shifts: Vec<i32>,
    transitions: Option<String>,
}

/// Section and note-length settings for the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    /// Target length of the intro, seconds
    pub intro_seconds: f64,
    /// Target length of the outro, seconds
    pub outro_seconds: f64,
    /// Lower bound of the note duration range, seconds (inclusive)
    pub min_note_seconds: f64,
    /// Upper bound of the note duration range, seconds (exclusive)
    pub max_note_seconds: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            intro_seconds: 15.0,
            outro_seconds: 15.0,
            min_note_seconds: 0.5,
            max_note_seconds: 1.5,
        }
    }
}

impl GenerationSettings {
    /// Note bounds must be finite with `0 < min <= max`; intro/outro targets
    /// must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        let min = self.min_note_seconds;
        let max = self.max_note_seconds;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max < min {
            return Err(Error::InvalidArgument(format!(
                "note duration range [{}, {}) must satisfy 0 < min <= max",
                min, max
            )));
        }
        for (what, secs) in [("intro", self.intro_seconds), ("outro", self.outro_seconds)] {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "{} length {} must be positive",
                    what, secs
                )));
            }
        }
        Ok(())
    }
}

/// How notes are sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Note-on velocity (0-127)
    pub velocity: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Program change sent on connect
    pub program: Option<u8>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            velocity: 80,
            channel: 0,
            program: Some(0),
        }
    }
}

/// A scale resolved from config together with its validated transitions.
#[derive(Debug, Clone)]
pub struct ResolvedScale {
    pub scale: Scale,
    pub model: TransitionModel,
}

/// Loaded configuration: embedded defaults with optional user overrides.
pub struct Config {
    generation: GenerationConfig,
    playback: PlaybackConfig,
    transitions: BTreeMap<String, TableConfig>,
    scales: BTreeMap<String, ScaleConfig>,
}

impl Config {
    /// The embedded defaults only.
    pub fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Self::from_file(base)
    }

    /// Embedded defaults merged with the user config, if one exists.
    ///
    /// A malformed or unreadable user file is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::embedded();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            log::debug!(target: "config", "merging user config {}", path.display());
                            config.merge(user);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    /// Embedded defaults merged with an explicit config file. Errors are
    /// returned rather than logged.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!(target: "config", "merging config {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Embedded defaults merged with the given TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::embedded();
        config.merge(user);
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            generation: file.generation,
            playback: file.playback,
            transitions: file.transitions,
            scales: file.scales,
        }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_generation(&mut self.generation, user.generation);
        merge_playback(&mut self.playback, user.playback);
        self.transitions.extend(user.transitions);
        self.scales.extend(user.scales);
    }

    pub fn generation(&self) -> GenerationSettings {
        let fallback = GenerationSettings::default();
        GenerationSettings {
            intro_seconds: self.generation.intro_seconds.unwrap_or(fallback.intro_seconds),
            outro_seconds: self.generation.outro_seconds.unwrap_or(fallback.outro_seconds),
            min_note_seconds: self
                .generation
                .min_note_seconds
                .unwrap_or(fallback.min_note_seconds),
            max_note_seconds: self
                .generation
                .max_note_seconds
                .unwrap_or(fallback.max_note_seconds),
        }
    }

    /// Playback settings; velocity and channel are clamped to MIDI range.
    pub fn playback(&self) -> PlaybackSettings {
        let fallback = PlaybackSettings::default();
        PlaybackSettings {
            velocity: self.playback.velocity.unwrap_or(fallback.velocity).min(127),
            channel: self.playback.channel.unwrap_or(fallback.channel).min(15),
            program: self
                .playback
                .program
                .map(|p| p.min(127))
                .or(fallback.program),
        }
    }

    /// Scale ids in sorted order
    pub fn scale_ids(&self) -> Vec<&str> {
        self.scales.keys().map(String::as_str).collect()
    }

    /// Display name for a scale id, if known
    pub fn scale_name<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        let cfg = self.scales.get(id)?;
        Some(cfg.name.as_deref().unwrap_or(id))
    }

    /// Look up a transition table by id.
    pub fn transition_table(&self, id: &str) -> Result<TransitionTable> {
        let cfg = self.transitions.get(id).ok_or_else(|| {
            Error::InvalidConfiguration(format!("unknown transition table '{}'", id))
        })?;
        let rows = cfg
            .rows
            .iter()
            .map(|pairs| TransitionRow::from_pairs(pairs))
            .collect();
        Ok(TransitionTable::new(id, rows))
    }

    /// Resolve a scale id into a validated scale and transition model.
    ///
    /// Unknown ids are an error; there is no fallback scale.
    pub fn resolve_scale(&self, id: &str) -> Result<ResolvedScale> {
        let cfg = self
            .scales
            .get(id)
            .ok_or_else(|| Error::InvalidConfiguration(format!("unknown scale '{}'", id)))?;
        let scale = build_scale(id, cfg)?;
        let table_id = cfg.transitions.as_deref().unwrap_or(DEFAULT_TABLE_ID);
        let table = self.transition_table(table_id)?;
        let model = TransitionModel::for_scale(&scale, &table)?;
        log::debug!(
            target: "config",
            "resolved scale {} ({} degrees, table '{}')",
            scale.id,
            scale.len(),
            table_id
        );
        Ok(ResolvedScale { scale, model })
    }
}

fn build_scale(id: &str, cfg: &ScaleConfig) -> Result<Scale> {
    let count = cfg.degrees.len();
    if !(7..=8).contains(&count) {
        return Err(Error::InvalidConfiguration(format!(
            "scale '{}' has {} degrees, expected 7 or 8",
            id, count
        )));
    }
    if !cfg.octave_shifts.is_empty() && cfg.octave_shifts.len() != count {
        return Err(Error::InvalidConfiguration(format!(
            "scale '{}' has {} octave shifts for {} degrees",
            id,
            cfg.octave_shifts.len(),
            count
        )));
    }

    let mut degrees = Vec::with_capacity(count);
    for (i, label) in cfg.degrees.iter().enumerate() {
        let class = PitchClass::parse(label).ok_or_else(|| {
            Error::InvalidConfiguration(format!("scale '{}': unknown pitch class '{}'", id, label))
        })?;
        let shift = cfg.octave_shifts.get(i).copied().unwrap_or(0);
        if !(0..=1).contains(&shift) {
            return Err(Error::InvalidConfiguration(format!(
                "scale '{}': octave shift {} on degree {} must be 0 or 1",
                id, shift, i
            )));
        }
        degrees.push(ScaleDegree::new(class, shift));
    }

    if degrees[0].octave_shift != 0 {
        return Err(Error::InvalidConfiguration(format!(
            "scale '{}': root must not be octave-shifted",
            id
        )));
    }
    if count == 8 {
        let top = degrees[7];
        if top.class != degrees[0].class || top.octave_shift != 1 {
            return Err(Error::InvalidConfiguration(format!(
                "scale '{}': eighth degree must be the root one octave up",
                id
            )));
        }
    }

    let name = cfg.name.clone().unwrap_or_else(|| id.to_string());
    Ok(Scale::new(id, name, degrees))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pianola").join("config.toml"))
}

fn merge_generation(base: &mut GenerationConfig, user: GenerationConfig) {
    if user.intro_seconds.is_some() {
        base.intro_seconds = user.intro_seconds;
    }
    if user.outro_seconds.is_some() {
        base.outro_seconds = user.outro_seconds;
    }
    if user.min_note_seconds.is_some() {
        base.min_note_seconds = user.min_note_seconds;
    }
    if user.max_note_seconds.is_some() {
        base.max_note_seconds = user.max_note_seconds;
    }
}

fn merge_playback(base: &mut PlaybackConfig, user: PlaybackConfig) {
    if user.velocity.is_some() {
        base.velocity = user.velocity;
    }
    if user.channel.is_some() {
        base.channel = user.channel;
    }
    if user.program.is_some() {
        base.program = user.program;
    }
}

/// The stock transition table from the embedded config.
#[cfg(test)]
pub(crate) fn default_transition_table() -> TransitionTable {
    Config::embedded()
        .transition_table(DEFAULT_TABLE_ID)
        .expect("embedded config has a default table")
}
