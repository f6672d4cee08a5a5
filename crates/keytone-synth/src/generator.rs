//! Render entry point.
//!
//! A [`Generator`] owns one [`Voice`] and the render side of its parameter
//! channel. The audio collaborator calls [`Generator::process`] once per block;
//! the control side holds the matching [`ParamSender`].

use crate::channel::{ParamReceiver, ParamSender, param_channel};
use crate::oscillator::Waveform;
use crate::voice::{Voice, VoiceSettings};

/// Configuration fixed when a generator is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Interleaved channel count of the blocks passed to `process`.
    pub channels: usize,
    /// Voice settings (waveform, initial frequency, envelope).
    pub voice: VoiceSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            channels: 1,
            voice: VoiceSettings::default(),
        }
    }
}

impl GeneratorConfig {
    /// Config for a given sample rate, channel count and waveform, with
    /// default envelope settings.
    pub fn new(sample_rate: f32, channels: usize, waveform: Waveform) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            voice: VoiceSettings {
                sample_rate,
                waveform,
                ..VoiceSettings::default()
            },
        }
    }
}

/// One render voice fed by a parameter channel.
///
/// # Example
///
/// ```rust
/// use keytone_synth::{Generator, GeneratorConfig, ParamMessage, Waveform};
///
/// let config = GeneratorConfig::new(48000.0, 2, Waveform::Sine);
/// let (mut generator, params) = Generator::with_channel(&config);
///
/// params.send(ParamMessage::new().with_frequency(440.0).with_active(true)).unwrap();
///
/// let mut block = vec![0.0f32; 512];
/// let frames = generator.process(&mut block);
/// assert_eq!(frames, 256);
/// ```
#[derive(Debug)]
pub struct Generator {
    voice: Voice,
    params: ParamReceiver,
    channels: usize,
    sample_rate: f32,
}

impl Generator {
    /// Create a generator reading from an existing receiver.
    pub fn new(config: &GeneratorConfig, params: ParamReceiver) -> Self {
        let settings = VoiceSettings {
            sample_rate: config.sample_rate,
            ..config.voice
        };
        Self {
            voice: Voice::new(&settings),
            params,
            channels: config.channels.max(1),
            sample_rate: config.sample_rate,
        }
    }

    /// Create a generator and the sender that controls it.
    pub fn with_channel(config: &GeneratorConfig) -> (Self, ParamSender) {
        let (tx, rx) = param_channel();
        (Self::new(config, rx), tx)
    }

    /// Fill one interleaved block and return the number of frames written.
    ///
    /// All parameter messages queued since the previous call are applied
    /// first, so the whole block renders with one parameter snapshot. Does not
    /// block, allocate or log.
    pub fn process(&mut self, block: &mut [f32]) -> usize {
        let voice = &mut self.voice;
        self.params.drain(|msg| voice.apply(msg));
        self.voice.render(block, self.channels);
        block.len() / self.channels
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The voice, for inspection.
    pub fn voice(&self) -> &Voice {
        &self.voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ParamMessage;

    #[test]
    fn messages_apply_at_block_boundary() {
        let config = GeneratorConfig::new(48000.0, 1, Waveform::Sine);
        let (mut generator, params) = Generator::with_channel(&config);
        let mut block = [0.0f32; 64];

        params
            .send(ParamMessage::new().with_frequency(1000.0).with_active(true))
            .unwrap();
        assert_eq!(generator.voice().oscillator().frequency(), 432.0);

        generator.process(&mut block);
        assert_eq!(generator.voice().oscillator().frequency(), 1000.0);
        assert!(generator.voice().envelope().is_active());
    }

    #[test]
    fn frames_counted_per_channel() {
        let config = GeneratorConfig::new(44100.0, 2, Waveform::Sine);
        let (mut generator, _params) = Generator::with_channel(&config);
        let mut block = [0.0f32; 256];
        assert_eq!(generator.process(&mut block), 128);
    }

    #[test]
    fn zero_channels_treated_as_mono() {
        let mut config = GeneratorConfig::new(44100.0, 1, Waveform::Sine);
        config.channels = 0;
        let (generator, _params) = Generator::with_channel(&config);
        assert_eq!(generator.channels(), 1);
    }
}
