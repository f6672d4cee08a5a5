//! A single render voice: oscillator plus declick envelope.

use crate::envelope::DeclickEnvelope;
use crate::message::ParamMessage;
use crate::oscillator::{Oscillator, Waveform};

/// Static settings for a [`Voice`], fixed when the voice is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Waveform (and triangle mode).
    pub waveform: Waveform,
    /// Initial frequency in Hz.
    pub frequency: f32,
    /// Attack ramp length in milliseconds.
    pub attack_ms: f32,
    /// Release ramp length in milliseconds.
    pub release_ms: f32,
    /// Defer release until the raw waveform crosses zero.
    pub zero_cross_release: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            waveform: Waveform::Sine,
            frequency: 432.0,
            attack_ms: 5.0,
            release_ms: 20.0,
            zero_cross_release: true,
        }
    }
}

/// Oscillator state and envelope for one voice.
///
/// All mutation goes through [`apply`](Self::apply) (parameter messages) and
/// [`render`](Self::render) (one block of samples).
#[derive(Debug, Clone)]
pub struct Voice {
    osc: Oscillator,
    env: DeclickEnvelope,
}

impl Voice {
    /// Create a silent voice from its settings.
    pub fn new(settings: &VoiceSettings) -> Self {
        let mut osc = Oscillator::new(settings.sample_rate);
        osc.set_waveform(settings.waveform);
        osc.set_frequency(settings.frequency);

        let mut env = DeclickEnvelope::new(
            settings.sample_rate,
            settings.attack_ms,
            settings.release_ms,
        );
        env.set_zero_cross_release(settings.zero_cross_release);

        Self { osc, env }
    }

    /// Apply every field present in `msg`.
    pub fn apply(&mut self, msg: &ParamMessage) {
        if let Some(hz) = msg.frequency {
            self.osc.set_frequency(hz);
        }
        if let Some(duty) = msg.duty {
            self.osc.set_duty(duty);
        }
        if let Some(active) = msg.active {
            self.env.set_active(active);
        }
    }

    /// Render one interleaved block. Every channel of a frame gets the same
    /// sample.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let env = &mut self.env;
        self.osc.fill_frames(out, channels, |raw| env.process(raw));
    }

    /// The oscillator.
    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    /// The declick envelope.
    pub fn envelope(&self) -> &DeclickEnvelope {
        &self.env
    }

    /// True when the voice outputs silence and is not ramping up.
    pub fn is_silent(&self) -> bool {
        self.env.is_silent()
    }
}
