//! Keytone Synth - render path for the keytone note synthesizer
//!
//! Phase-accumulating oscillators, a declick envelope and the parameter
//! channel that carries control-side changes to the audio thread.
//!
//! # Render Path
//!
//! - [`Oscillator`] - Phase accumulator with sine, variable-duty square and
//!   triangle (naive or PolyBLEP band-limited) shapes
//! - [`DeclickEnvelope`] - Linear attack/release ramps, optionally holding the
//!   release until the waveform crosses zero
//! - [`Voice`] - One oscillator plus one envelope
//! - [`Generator`] - A voice fed by a parameter channel; the entry point the
//!   audio collaborator calls once per block
//!
//! # Control Path
//!
//! - [`ParamMessage`] - Frequency, duty and active flag, each optional
//! - [`ParamSender`] / [`ParamReceiver`] - Append-then-drain queue between threads
//! - [`Synthesizer`] - Capability surface a note dispatcher drives
//! - [`SynthHandle`] - [`Synthesizer`] that sends change-driven snapshots
//! - [`DutyRatio`] - Square duty presets
//!
//! # Real-time Contract
//!
//! [`Generator::process`] never blocks, allocates or logs. Messages queued
//! while a block renders take effect at the next block.
//!
//! # no_std Support
//!
//! The oscillator, envelope, voice and pitch helpers are `no_std`. The
//! channel, generator and façade need the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! keytone-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use keytone_synth::{Generator, GeneratorConfig, Synthesizer, SynthHandle, Waveform, midi_to_freq};
//!
//! let config = GeneratorConfig::new(48000.0, 1, Waveform::Square { duty: 0.125 });
//! let (mut generator, params) = Generator::with_channel(&config);
//! let mut synth = SynthHandle::new(params, 432.0);
//!
//! synth.set_frequency(midi_to_freq(60));
//! synth.set_active(true);
//!
//! let mut block = [0.0f32; 256];
//! generator.process(&mut block);
//! assert!(block.iter().any(|&s| s != 0.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod message;
pub mod oscillator;
pub mod pitch;
pub mod voice;

#[cfg(feature = "std")]
pub mod channel;
#[cfg(feature = "std")]
pub mod facade;
#[cfg(feature = "std")]
pub mod generator;

pub use envelope::{DeclickEnvelope, duration_to_samples};
pub use message::ParamMessage;
pub use oscillator::{MAX_DUTY, MIN_DUTY, Oscillator, Waveform, clamp_duty, poly_blep, wrap_phase};
pub use pitch::{MAX_FREQUENCY, MIN_FREQUENCY, clamp_frequency, midi_to_freq};
pub use voice::{Voice, VoiceSettings};

#[cfg(feature = "std")]
pub use channel::{ChannelError, ParamReceiver, ParamSender, param_channel};
#[cfg(feature = "std")]
pub use facade::{DutyRatio, SynthHandle, Synthesizer};
#[cfg(feature = "std")]
pub use generator::{Generator, GeneratorConfig};
