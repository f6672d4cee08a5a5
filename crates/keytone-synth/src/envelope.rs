//! Declick envelope.
//!
//! A linear attack/release gain ramp applied to raw oscillator output so note
//! on/off never produces a step discontinuity. Release can optionally wait for
//! the raw waveform to cross zero before it starts ramping down.

use libm::roundf;

/// Convert a duration in milliseconds to a whole number of samples.
///
/// `max(1, round(ms * 0.001 * sample_rate))`. Non-finite or negative input
/// yields 1.
#[inline]
pub fn duration_to_samples(ms: f32, sample_rate: f32) -> u32 {
    let samples = roundf(ms * 0.001 * sample_rate);
    if samples >= 1.0 && samples.is_finite() {
        samples as u32
    } else {
        1
    }
}

/// Linear attack/release amplitude ramp.
///
/// The stage is implied by comparing the current level with the target: the
/// level moves up by `1 / attack_samples` per sample while below the target,
/// and down by `1 / release_samples` while above it.
///
/// With zero-cross gating enabled, a release request leaves the ramp heading
/// where it was (the attack keeps running, a held level stays held) until the
/// raw waveform crosses zero. Only then does the release ramp begin.
///
/// # Example
///
/// ```rust
/// use keytone_synth::DeclickEnvelope;
///
/// let mut env = DeclickEnvelope::new(48000.0, 1.0, 1.0);
/// env.set_active(true);
/// for _ in 0..48 {
///     env.process(1.0);
/// }
/// assert_eq!(env.value(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DeclickEnvelope {
    /// Current gain (0.0 to 1.0)
    value: f32,
    /// Requested target: 1.0 when active, 0.0 otherwise
    target: f32,
    /// Target the ramp is actually heading to. Lags `target` while a gated
    /// release waits for a zero crossing.
    ramp_target: f32,
    attack_samples: u32,
    release_samples: u32,
    attack_step: f32,
    release_step: f32,
    zero_cross_release: bool,
    /// Previous raw (unshaped) sample, for crossing detection
    last_raw: f32,
    stage: Stage,
    /// Steps left in the current ramp. The level is derived from this count,
    /// never accumulated, so endpoints land exactly.
    remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Attack,
    Release,
}

impl Default for DeclickEnvelope {
    fn default() -> Self {
        Self::new(48000.0, 5.0, 20.0)
    }
}

impl DeclickEnvelope {
    /// Create an idle envelope. Durations are converted once with
    /// [`duration_to_samples`]; zero-cross gating starts disabled.
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let attack_samples = duration_to_samples(attack_ms, sample_rate);
        let release_samples = duration_to_samples(release_ms, sample_rate);
        Self {
            value: 0.0,
            target: 0.0,
            ramp_target: 0.0,
            attack_samples,
            release_samples,
            attack_step: 1.0 / attack_samples as f32,
            release_step: 1.0 / release_samples as f32,
            zero_cross_release: false,
            last_raw: 0.0,
            stage: Stage::Idle,
            remaining: 0,
        }
    }

    /// Enable or disable zero-cross-gated release.
    pub fn set_zero_cross_release(&mut self, enabled: bool) {
        self.zero_cross_release = enabled;
        if !enabled {
            self.ramp_target = self.target;
        }
    }

    /// Whether release waits for a zero crossing.
    pub fn zero_cross_release(&self) -> bool {
        self.zero_cross_release
    }

    /// Set the active flag. Target becomes 1.0 when active, 0.0 otherwise.
    pub fn set_active(&mut self, active: bool) {
        self.target = if active { 1.0 } else { 0.0 };
        if active || !self.zero_cross_release || self.value <= 0.0 {
            self.ramp_target = self.target;
        }
    }

    /// Whether the requested target is 1.0.
    pub fn is_active(&self) -> bool {
        self.target > 0.0
    }

    /// True while a gated release is waiting for the next zero crossing.
    pub fn is_release_pending(&self) -> bool {
        self.ramp_target > self.target
    }

    /// Current gain.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Requested target gain (0.0 or 1.0).
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Attack length in samples (at least 1).
    pub fn attack_samples(&self) -> u32 {
        self.attack_samples
    }

    /// Release length in samples (at least 1).
    pub fn release_samples(&self) -> u32 {
        self.release_samples
    }

    /// True when the gain is zero and nothing will raise it.
    pub fn is_silent(&self) -> bool {
        self.value <= 0.0 && self.ramp_target <= 0.0
    }

    /// Drop to silence immediately and forget any pending release.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.target = 0.0;
        self.ramp_target = 0.0;
        self.last_raw = 0.0;
        self.stage = Stage::Idle;
        self.remaining = 0;
    }

    /// Advance one sample and return `raw * gain`.
    #[inline]
    pub fn process(&mut self, raw: f32) -> f32 {
        if self.is_release_pending() && crosses_zero(self.last_raw, raw) {
            self.ramp_target = self.target;
        }
        self.last_raw = raw;

        let stage = if self.ramp_target > self.value {
            Stage::Attack
        } else if self.ramp_target < self.value {
            Stage::Release
        } else {
            Stage::Idle
        };
        if stage != self.stage {
            self.start_ramp(stage);
        }

        match self.stage {
            Stage::Attack => {
                self.remaining = self.remaining.saturating_sub(1);
                self.value = (1.0 - self.remaining as f32 * self.attack_step).max(0.0);
            }
            Stage::Release => {
                self.remaining = self.remaining.saturating_sub(1);
                self.value = (self.remaining as f32 * self.release_step).min(1.0);
            }
            Stage::Idle => {}
        }
        if self.remaining == 0 {
            self.stage = Stage::Idle;
        }

        raw * self.value
    }

    /// Begin a ramp from the current level. A ramp from an endpoint takes
    /// exactly `attack_samples` or `release_samples` steps; one starting
    /// mid-way takes the proportional share, at least one step.
    fn start_ramp(&mut self, stage: Stage) {
        let steps = match stage {
            Stage::Attack => (1.0 - self.value) * self.attack_samples as f32,
            Stage::Release => self.value * self.release_samples as f32,
            Stage::Idle => 0.0,
        };
        self.stage = stage;
        self.remaining = match stage {
            Stage::Idle => 0,
            _ => (roundf(steps) as u32).max(1),
        };
    }
}

/// A raw sample of exactly zero counts as a crossing.
#[inline]
fn crosses_zero(prev: f32, current: f32) -> bool {
    current == 0.0 || (prev < 0.0) != (current < 0.0)
}
