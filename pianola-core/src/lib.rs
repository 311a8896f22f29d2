//! # pianola-core
//!
//! Generative piano engine. Songs are grown note by note from a per-degree
//! Markov transition model over a chosen scale, assembled into
//! intro / verse / chorus / outro form, then played through a device sink
//! (a MIDI output port in practice) on a blocking clock.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pianola_core::config::Config;
//! use pianola_core::context::GenerationContext;
//! use pianola_core::playback::{self, CancelToken, SleepClock};
//! use pianola_core::random::Lcg;
//! use pianola_core::song::compose_song;
//!
//! let config = Config::load();
//! let ctx = GenerationContext::new(config.resolve_scale("CM")?, 4, config.generation())?;
//! let song = compose_song(&ctx, ctx.start_pitch(), 30.0, 2, &mut Lcg::from_time())?;
//!
//! let mut sink = pianola_core::midi::MidiOutputSink::connect(0, &config.playback())?;
//! playback::play(&song, config.playback().velocity, &mut sink, &mut SleepClock, &CancelToken::new())?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod midi;
pub mod playback;
pub mod random;
pub mod section;
pub mod song;
pub mod transition;

pub use error::{DeviceError, Error, Result};
