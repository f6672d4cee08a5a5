//! Configuration for keytone.
//!
//! A [`SynthConfig`] describes one synth voice (waveform, initial pitch,
//! square duty, triangle mode), its declick envelope and the audio settings it
//! renders at. Configs are TOML files; every field has a default.
//!
//! # Example
//!
//! ```rust,no_run
//! use keytone_config::SynthConfig;
//! use keytone_synth::Generator;
//!
//! let config = SynthConfig::load("keytone.toml").unwrap();
//! let (generator, params) = Generator::with_channel(&config.generator_config());
//! ```

mod error;
mod synth_config;

pub use error::ConfigError;
pub use synth_config::{EnvelopeConfig, SynthConfig, VoiceConfig, WaveformKind};
