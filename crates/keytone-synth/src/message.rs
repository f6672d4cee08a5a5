//! Parameter messages sent from the control side to a render voice.

use crate::oscillator::clamp_duty;
use crate::pitch::clamp_frequency;

/// A pending parameter update.
///
/// Each field is optional; absent fields leave the voice untouched. Several
/// messages applied in order behave as last-write-wins per field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParamMessage {
    /// Oscillator frequency in Hz.
    pub frequency: Option<f32>,
    /// Square duty ratio (ignored by non-square voices).
    pub duty: Option<f32>,
    /// Gate: drives the declick envelope target.
    pub active: Option<bool>,
}

impl ParamMessage {
    /// An empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frequency field.
    pub fn with_frequency(mut self, hz: f32) -> Self {
        self.frequency = Some(hz);
        self
    }

    /// Set the duty field.
    pub fn with_duty(mut self, duty: f32) -> Self {
        self.duty = Some(duty);
        self
    }

    /// Set the active field.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.duty.is_none() && self.active.is_none()
    }

    /// Make every field safe for the render path.
    ///
    /// Non-finite frequency or duty is dropped. Finite frequency is clamped to
    /// the audible range, finite duty to the square kernel's range.
    pub fn sanitized(self) -> Self {
        Self {
            frequency: self
                .frequency
                .filter(|hz| hz.is_finite())
                .map(clamp_frequency),
            duty: self.duty.filter(|d| d.is_finite()).map(clamp_duty),
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::{MAX_DUTY, MIN_DUTY};
    use crate::pitch::{MAX_FREQUENCY, MIN_FREQUENCY};

    #[test]
    fn builder_sets_fields() {
        let msg = ParamMessage::new()
            .with_frequency(440.0)
            .with_duty(0.25)
            .with_active(true);
        assert_eq!(msg.frequency, Some(440.0));
        assert_eq!(msg.duty, Some(0.25));
        assert_eq!(msg.active, Some(true));
        assert!(!msg.is_empty());
        assert!(ParamMessage::new().is_empty());
    }

    #[test]
    fn sanitize_drops_non_finite() {
        let msg = ParamMessage::new()
            .with_frequency(f32::NAN)
            .with_duty(f32::INFINITY)
            .with_active(false)
            .sanitized();
        assert_eq!(msg.frequency, None);
        assert_eq!(msg.duty, None);
        assert_eq!(msg.active, Some(false));
    }

    #[test]
    fn sanitize_clamps_finite() {
        let msg = ParamMessage::new()
            .with_frequency(1.0e6)
            .with_duty(0.0)
            .sanitized();
        assert_eq!(msg.frequency, Some(MAX_FREQUENCY));
        assert_eq!(msg.duty, Some(MIN_DUTY));

        let msg = ParamMessage::new()
            .with_frequency(-3.0)
            .with_duty(1.0)
            .sanitized();
        assert_eq!(msg.frequency, Some(MIN_FREQUENCY));
        assert_eq!(msg.duty, Some(MAX_DUTY));
    }
}
