//! Note number to frequency mapping.

/// Lowest frequency handed to an oscillator by the control side, in Hz.
pub const MIN_FREQUENCY: f32 = 20.0;

/// Highest frequency handed to an oscillator by the control side, in Hz.
pub const MAX_FREQUENCY: f32 = 22050.0;

/// Convert a MIDI note number to its fundamental frequency in Hz.
///
/// Twelve-tone equal temperament with A4 (note 69) at 440 Hz:
/// `440 · 2^((note - 69) / 12)`. Total over `i32`, no clamping; callers that
/// need audio-safe bounds use [`clamp_frequency`].
#[inline]
pub fn midi_to_freq(note: i32) -> f32 {
    440.0 * libm::powf(2.0, (note as f32 - 69.0) / 12.0)
}

/// Clamp a frequency to [`MIN_FREQUENCY`]..=[`MAX_FREQUENCY`].
///
/// NaN passes through unchanged; the parameter channel drops it.
#[inline]
pub fn clamp_frequency(hz: f32) -> f32 {
    hz.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
}
