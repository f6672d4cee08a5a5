//! Synth configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use keytone_synth::{GeneratorConfig, VoiceSettings, Waveform};

use crate::error::ConfigError;

/// Waveform names accepted in `[voice] waveform`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    /// Pure sine.
    Sine,
    /// Variable-duty square.
    #[default]
    Square,
    /// Triangle (naive or band-limited, see `band_limited`).
    Triangle,
}

/// Voice section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    /// Waveform.
    pub waveform: WaveformKind,
    /// Initial frequency in Hz.
    pub frequency: f32,
    /// Square duty ratio.
    pub duty: f32,
    /// Use the band-limited triangle kernel.
    pub band_limited: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            waveform: WaveformKind::default(),
            frequency: 432.0,
            duty: 0.125,
            band_limited: false,
        }
    }
}

/// Envelope section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Attack ramp in milliseconds.
    pub attack_ms: f32,
    /// Release ramp in milliseconds.
    pub release_ms: f32,
    /// Wait for a zero crossing before releasing.
    pub zero_cross_release: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_ms: 5.0,
            release_ms: 20.0,
            zero_cross_release: true,
        }
    }
}

/// Complete synth configuration.
///
/// Every field has a default, so an empty file is a valid config.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// channels = 2
/// block_size = 256
///
/// [voice]
/// waveform = "triangle"
/// frequency = 432.0
/// duty = 0.125
/// band_limited = true
///
/// [envelope]
/// attack_ms = 5.0
/// release_ms = 20.0
/// zero_cross_release = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
    /// Frames per render block.
    pub block_size: usize,
    /// Voice settings.
    pub voice: VoiceConfig,
    /// Envelope settings.
    pub envelope: EnvelopeConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            block_size: 256,
            voice: VoiceConfig::default(),
            envelope: EnvelopeConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SynthConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field the synth depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be greater than 0"));
        }
        if self.channels == 0 {
            return Err(ConfigError::invalid("channels", "must be at least 1"));
        }
        if self.block_size == 0 {
            return Err(ConfigError::invalid("block_size", "must be at least 1"));
        }
        if !self.voice.frequency.is_finite() || self.voice.frequency <= 0.0 {
            return Err(ConfigError::invalid(
                "voice.frequency",
                format!("{} is not a positive frequency", self.voice.frequency),
            ));
        }
        if !self.voice.duty.is_finite() {
            return Err(ConfigError::invalid("voice.duty", "must be finite"));
        }
        check_duration("envelope.attack_ms", self.envelope.attack_ms)?;
        check_duration("envelope.release_ms", self.envelope.release_ms)?;
        Ok(())
    }

    /// The waveform this config selects.
    pub fn waveform(&self) -> Waveform {
        match self.voice.waveform {
            WaveformKind::Sine => Waveform::Sine,
            WaveformKind::Square => Waveform::Square {
                duty: self.voice.duty,
            },
            WaveformKind::Triangle => Waveform::Triangle {
                band_limited: self.voice.band_limited,
            },
        }
    }

    /// Render settings for a [`Generator`](keytone_synth::Generator).
    pub fn generator_config(&self) -> GeneratorConfig {
        let sample_rate = self.sample_rate as f32;
        GeneratorConfig {
            sample_rate,
            channels: usize::from(self.channels),
            voice: VoiceSettings {
                sample_rate,
                waveform: self.waveform(),
                frequency: self.voice.frequency,
                attack_ms: self.envelope.attack_ms,
                release_ms: self.envelope.release_ms,
                zero_cross_release: self.envelope.zero_cross_release,
            },
        }
    }

    /// Interleaved samples in one render block.
    pub fn block_samples(&self) -> usize {
        self.block_size * usize::from(self.channels)
    }
}

fn check_duration(field: &'static str, ms: f32) -> Result<(), ConfigError> {
    if ms.is_finite() && ms >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{ms} ms is not a valid duration")))
    }
}
