//! Phase-accumulator oscillators.
//!
//! Each waveform is a pure function of the normalized phase `t` in `[0, 1)`.
//! [`Oscillator`] owns the running phase and picks the waveform kernel once per
//! block, so the inner sample loop is monomorphized per waveform instead of
//! matching on every sample.

use core::f32::consts::TAU;
use libm::{fabsf, floorf, sinf};

/// Lowest duty ratio the square kernel will use.
pub const MIN_DUTY: f32 = 0.001;

/// Highest duty ratio the square kernel will use.
pub const MAX_DUTY: f32 = 0.999;

/// Waveform selection for an [`Oscillator`].
///
/// The triangle's `band_limited` flag is a static mode: it is chosen when the
/// voice is configured and is not meant to be toggled mid-stream.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Bipolar square with variable duty ratio (fraction of the cycle spent high).
    Square {
        /// Requested duty ratio. Clamped to [`MIN_DUTY`]..=[`MAX_DUTY`] when rendered.
        duty: f32,
    },
    /// Triangle, either naive or folded from a PolyBLEP-corrected saw.
    Triangle {
        /// Use the PolyBLEP-corrected kernel.
        band_limited: bool,
    },
}

/// Wrap a phase value into `[0, 1)`.
///
/// Uses `phase - floor(phase)`, so increments larger than a full cycle
/// (frequency above the sample rate) and negative phases wrap exactly.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    // -tiny - floor(-tiny) rounds to exactly 1.0 in f32
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Clamp a requested duty ratio into the range the square kernel accepts.
///
/// `0.0` maps to exactly [`MIN_DUTY`] and `1.0` to exactly [`MAX_DUTY`], so the
/// square never degenerates into DC or silence. NaN falls back to `0.5`.
#[inline]
pub fn clamp_duty(duty: f32) -> f32 {
    if duty.is_nan() {
        return 0.5;
    }
    duty.clamp(MIN_DUTY, MAX_DUTY)
}

/// Sine kernel: `sin(2π·t)`.
#[inline]
pub fn sine(t: f32) -> f32 {
    sinf(t * TAU)
}

/// Square kernel: `+1` while `t < duty`, `-1` otherwise.
///
/// `duty` is expected to be pre-clamped with [`clamp_duty`].
#[inline]
pub fn square(t: f32, duty: f32) -> f32 {
    if t < duty { 1.0 } else { -1.0 }
}

/// Naive triangle kernel: `4·|t - 0.5| - 1`, range `[-1, 1]`.
#[inline]
pub fn triangle(t: f32) -> f32 {
    4.0 * fabsf(t - 0.5) - 1.0
}

/// Band-limited triangle kernel.
///
/// Builds a sawtooth `2t - 1` corrected with [`poly_blep`] at its wrap
/// discontinuity, then folds it with `1 - 2·|saw|`. The BLEP window `dt` is the
/// phase increment per sample, capped at `0.5`.
#[inline]
pub fn triangle_band_limited(t: f32, dt: f32) -> f32 {
    let dt = dt.min(0.5);
    let saw = 2.0 * t - 1.0 - poly_blep(t, dt);
    1.0 - 2.0 * fabsf(saw)
}

/// Second-order PolyBLEP residual for a unit step at `t = 0`.
///
/// Non-zero only within one sample (`dt`) of the discontinuity on either side:
///
/// ```text
/// t < dt      : x = t/dt,       2x - x² - 1
/// t > 1 - dt  : x = (t - 1)/dt, x² + 2x + 1
/// otherwise   : 0
/// ```
///
/// Reference: Välimäki and Huovilainen, "Antialiasing Oscillators in
/// Subtractive Synthesis", IEEE Signal Processing Magazine, 2007.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + 2.0 * x + 1.0
    } else {
        0.0
    }
}

/// Phase-accumulator oscillator.
///
/// Produces one sample per step at the current phase, then advances the phase
/// by `frequency / sample_rate` and wraps it with [`wrap_phase`].
///
/// # Example
///
/// ```rust
/// use keytone_synth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_frequency(440.0);
/// osc.set_waveform(Waveform::Square { duty: 0.25 });
///
/// let mut block = [0.0f32; 64];
/// osc.fill(&mut block);
/// assert!(block.iter().all(|s| s.abs() == 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    /// Sample rate in Hz, fixed at construction
    sample_rate: f32,
    /// Frequency in Hz
    frequency: f32,
    waveform: Waveform,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a 440 Hz sine oscillator at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            waveform: Waveform::Sine,
        }
    }

    /// Set frequency in Hz. Non-finite values are ignored.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        if !freq_hz.is_finite() {
            return;
        }
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Get current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Phase increment per sample (`frequency / sample_rate`).
    pub fn phase_increment(&self) -> f32 {
        self.phase_inc
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Get current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Update the duty ratio of a square waveform. No effect on other waveforms.
    pub fn set_duty(&mut self, duty: f32) {
        if let Waveform::Square { duty: current } = &mut self.waveform {
            *current = duty;
        }
    }

    /// Duty ratio actually used by the square kernel, if this is a square.
    pub fn effective_duty(&self) -> Option<f32> {
        match self.waveform {
            Waveform::Square { duty } => Some(clamp_duty(duty)),
            _ => None,
        }
    }

    /// Get current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Set phase directly. The value is wrapped into `[0, 1)`.
    pub fn set_phase(&mut self, phase: f32) {
        if phase.is_finite() {
            self.phase = wrap_phase(phase);
        }
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the sample at the current phase, then advance.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let t = self.phase;
        let out = match self.waveform {
            Waveform::Sine => sine(t),
            Waveform::Square { duty } => square(t, clamp_duty(duty)),
            Waveform::Triangle { band_limited: false } => triangle(t),
            Waveform::Triangle { band_limited: true } => triangle_band_limited(t, self.phase_inc),
        };
        self.phase = wrap_phase(self.phase + self.phase_inc);
        out
    }

    /// Fill a mono buffer with raw waveform samples.
    pub fn fill(&mut self, out: &mut [f32]) {
        self.fill_frames(out, 1, |raw| raw);
    }

    /// Fill an interleaved buffer, writing the same shaped sample to every
    /// channel of a frame.
    ///
    /// `shape` receives each raw waveform sample and returns the value written
    /// out; it runs once per frame. The waveform is selected once for the whole
    /// buffer. Trailing samples that do not make up a full frame are zeroed.
    pub fn fill_frames<F>(&mut self, out: &mut [f32], channels: usize, mut shape: F)
    where
        F: FnMut(f32) -> f32,
    {
        let channels = channels.max(1);
        let dt = self.phase_inc;
        match self.waveform {
            Waveform::Sine => self.run(out, channels, &mut shape, sine),
            Waveform::Square { duty } => {
                let duty = clamp_duty(duty);
                self.run(out, channels, &mut shape, move |t| square(t, duty));
            }
            Waveform::Triangle { band_limited: false } => {
                self.run(out, channels, &mut shape, triangle);
            }
            Waveform::Triangle { band_limited: true } => {
                self.run(out, channels, &mut shape, move |t| {
                    triangle_band_limited(t, dt)
                });
            }
        }
    }

    #[inline(always)]
    fn run<W, F>(&mut self, out: &mut [f32], channels: usize, shape: &mut F, wave: W)
    where
        W: Fn(f32) -> f32,
        F: FnMut(f32) -> f32,
    {
        let inc = self.phase_inc;
        let mut phase = self.phase;
        let whole = out.len() - out.len() % channels;
        let (frames, tail) = out.split_at_mut(whole);
        for frame in frames.chunks_exact_mut(channels) {
            let value = shape(wave(phase));
            frame.fill(value);
            phase = wrap_phase(phase + inc);
        }
        tail.fill(0.0);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_rising_crossings(osc: &mut Oscillator, samples: usize) -> i32 {
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..samples {
            let sample = osc.advance();
            if prev <= 0.0 && sample > 0.0 {
                crossings += 1;
            }
            prev = sample;
        }
        crossings
    }

    #[test]
    fn sine_440hz_cycle_count() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(440.0);

        let crossings = count_rising_crossings(&mut osc, 48000);
        assert!(
            (crossings - 440).abs() <= 2,
            "Expected ~440 zero crossings, got {}",
            crossings
        );
    }

    #[test]
    fn wrap_phase_handles_large_increments() {
        assert_eq!(wrap_phase(0.25), 0.25);
        assert_eq!(wrap_phase(1.0), 0.0);
        assert!((wrap_phase(3.75) - 0.75).abs() < 1e-6);
        assert!((wrap_phase(-0.25) - 0.75).abs() < 1e-6);
        let tiny = wrap_phase(-1e-9);
        assert!((0.0..1.0).contains(&tiny), "got {}", tiny);
    }

    #[test]
    fn phase_stays_wrapped_above_sample_rate() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(48000.0 * 2.3);

        for _ in 0..1000 {
            osc.advance();
            assert!((0.0..1.0).contains(&osc.phase()), "phase {}", osc.phase());
        }
    }

    #[test]
    fn duty_clamp_endpoints() {
        assert_eq!(clamp_duty(0.0), MIN_DUTY);
        assert_eq!(clamp_duty(1.0), MAX_DUTY);
        assert_eq!(clamp_duty(-3.0), MIN_DUTY);
        assert_eq!(clamp_duty(0.25), 0.25);
        assert_eq!(clamp_duty(f32::NAN), 0.5);
    }

    #[test]
    fn square_duty_cycle() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(100.0);
        osc.set_waveform(Waveform::Square { duty: 0.25 });

        let positive = (0..48000).filter(|_| osc.advance() > 0.0).count();
        let ratio = positive as f32 / 48000.0;
        assert!(
            (ratio - 0.25).abs() < 0.01,
            "Expected ~25% high samples, got {:.1}%",
            ratio * 100.0
        );
    }

    #[test]
    fn square_zero_duty_is_not_silent() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(10.0);
        osc.set_waveform(Waveform::Square { duty: 0.0 });
        assert_eq!(osc.effective_duty(), Some(MIN_DUTY));

        // phase 0 < 0.001 so the first sample is high
        assert_eq!(osc.advance(), 1.0);
    }

    #[test]
    fn naive_triangle_shape() {
        assert_eq!(triangle(0.0), 1.0);
        assert_eq!(triangle(0.5), -1.0);
        assert_eq!(triangle(0.25), 0.0);
        assert_eq!(triangle(0.75), 0.0);
    }

    #[test]
    fn poly_blep_is_zero_away_from_edges() {
        let dt = 0.01;
        assert_eq!(poly_blep(0.5, dt), 0.0);
        assert_eq!(poly_blep(0.02, dt), 0.0);
        assert_eq!(poly_blep(0.98, dt), 0.0);
        assert_eq!(poly_blep(0.0, dt), -1.0);
        assert_eq!(poly_blep(0.3, 0.0), 0.0);
    }

    #[test]
    fn band_limited_triangle_corrects_near_wrap() {
        let dt = 0.05;
        for &t in &[0.01f32, 0.03, 0.97, 0.99] {
            let blep = triangle_band_limited(t, dt);
            let uncorrected = 1.0 - 2.0 * fabsf(2.0 * t - 1.0);
            assert!((-1.0..=1.0).contains(&blep), "t={} out={}", t, blep);
            assert!(
                fabsf(blep - uncorrected) > 1e-3,
                "no correction at t={}: {} vs {}",
                t,
                blep,
                uncorrected
            );
            assert!(fabsf(blep - triangle(t)) > 1e-3);
        }
        // at the wrap itself the correction cancels the jump entirely
        assert_eq!(triangle_band_limited(0.0, dt), 1.0);
        // mid-cycle the correction is inactive
        assert!((triangle_band_limited(0.5, dt) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fill_frames_duplicates_channels_and_zeroes_tail() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(1000.0);
        let mut buf = [9.0f32; 7];
        osc.fill_frames(&mut buf, 2, |raw| raw * 0.5);

        for frame in buf[..6].chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_eq!(buf[6], 0.0);
        assert_eq!(buf[0], 0.0); // sin(0)
    }

    #[test]
    fn fill_matches_advance() {
        let mut a = Oscillator::new(44100.0);
        let mut b = Oscillator::new(44100.0);
        for osc in [&mut a, &mut b] {
            osc.set_frequency(3000.0);
            osc.set_waveform(Waveform::Triangle { band_limited: true });
        }

        let mut block = [0.0f32; 128];
        a.fill(&mut block);
        for &sample in &block {
            assert_eq!(sample, b.advance());
        }
        assert_eq!(a.phase(), b.phase());
    }

    #[test]
    fn non_finite_frequency_ignored() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(220.0);
        osc.set_frequency(f32::NAN);
        osc.set_frequency(f32::INFINITY);
        assert_eq!(osc.frequency(), 220.0);
    }
}
