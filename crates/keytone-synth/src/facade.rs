//! Control-side synth capability surface.
//!
//! [`Synthesizer`] is the minimal interface the note dispatcher drives.
//! [`SynthHandle`] implements it on top of a [`ParamSender`], sending a full
//! parameter snapshot whenever a value actually changes.

use crate::channel::ParamSender;
use crate::message::ParamMessage;
use crate::pitch::clamp_frequency;

/// What the note dispatcher needs from a synth.
pub trait Synthesizer {
    /// Set the oscillator frequency in Hz. Implementations clamp to the
    /// audible range.
    fn set_frequency(&mut self, hz: f32);

    /// Gate the voice on or off.
    fn set_active(&mut self, active: bool);
}

/// Square-wave duty presets, named by the fraction of the cycle spent high.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DutyRatio {
    /// 1/8 duty.
    #[default]
    Eighth,
    /// 1/4 duty.
    Quarter,
    /// 1/2 duty.
    Half,
}

impl DutyRatio {
    /// Divider `n` such that the duty is `1/n`.
    pub fn divider(self) -> u32 {
        match self {
            Self::Eighth => 8,
            Self::Quarter => 4,
            Self::Half => 2,
        }
    }

    /// Duty ratio sent to the oscillator.
    pub fn ratio(self) -> f32 {
        1.0 / self.divider() as f32
    }

    /// Map a preset toggle index to a ratio: index `i` selects divider
    /// `1 << (3 - i)`, so 0, 1, 2 give eighth, quarter, half.
    pub fn from_toggle_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Eighth),
            1 => Some(Self::Quarter),
            2 => Some(Self::Half),
            _ => None,
        }
    }
}

/// Synth façade backed by a parameter channel.
///
/// Holds the latest frequency, duty and active flag. A setter that changes a
/// value enqueues one message carrying all of them; a setter that repeats the
/// current value sends nothing. Construction sends nothing.
#[derive(Debug, Clone)]
pub struct SynthHandle {
    sender: ParamSender,
    frequency: f32,
    duty: Option<f32>,
    active: bool,
}

impl SynthHandle {
    /// Handle with an initial frequency and no duty (sine or triangle voices).
    pub fn new(sender: ParamSender, frequency: f32) -> Self {
        Self {
            sender,
            frequency: clamp_frequency(frequency),
            duty: None,
            active: false,
        }
    }

    /// Handle for a square voice, starting at the given duty preset.
    pub fn with_duty_ratio(sender: ParamSender, frequency: f32, ratio: DutyRatio) -> Self {
        Self {
            duty: Some(ratio.ratio()),
            ..Self::new(sender, frequency)
        }
    }

    /// Select a duty preset. Turns this handle into a square handle if it was not one.
    pub fn set_duty_ratio(&mut self, ratio: DutyRatio) {
        let duty = ratio.ratio();
        if self.duty == Some(duty) {
            return;
        }
        self.duty = Some(duty);
        self.publish();
    }

    /// Latest frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Latest duty ratio, if this is a square handle.
    pub fn duty(&self) -> Option<f32> {
        self.duty
    }

    /// Latest active flag.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn snapshot(&self) -> ParamMessage {
        let msg = ParamMessage::new()
            .with_frequency(self.frequency)
            .with_active(self.active);
        match self.duty {
            Some(duty) => msg.with_duty(duty),
            None => msg,
        }
    }

    fn publish(&self) {
        if let Err(_err) = self.sender.send(self.snapshot()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "synth parameter update lost");
        }
    }
}

impl Synthesizer for SynthHandle {
    fn set_frequency(&mut self, hz: f32) {
        let hz = clamp_frequency(hz);
        if hz.is_nan() || hz == self.frequency {
            return;
        }
        self.frequency = hz;
        self.publish();
    }

    fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::param_channel;
    use crate::pitch::{MAX_FREQUENCY, MIN_FREQUENCY};

    fn drain_all(rx: &crate::channel::ParamReceiver) -> Vec<ParamMessage> {
        let mut out = Vec::new();
        rx.drain(|m| out.push(*m));
        out
    }

    #[test]
    fn duty_presets() {
        assert_eq!(DutyRatio::Eighth.ratio(), 0.125);
        assert_eq!(DutyRatio::Quarter.ratio(), 0.25);
        assert_eq!(DutyRatio::Half.ratio(), 0.5);
        for (i, expected) in [8u32, 4, 2].into_iter().enumerate() {
            let ratio = DutyRatio::from_toggle_index(i).unwrap();
            assert_eq!(ratio.divider(), expected);
            assert_eq!(ratio.divider(), 1 << (3 - i));
        }
        assert_eq!(DutyRatio::from_toggle_index(3), None);
    }

    #[test]
    fn construction_sends_nothing() {
        let (tx, rx) = param_channel();
        let _handle = SynthHandle::with_duty_ratio(tx, 432.0, DutyRatio::Eighth);
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn changes_send_full_snapshot() {
        let (tx, rx) = param_channel();
        let mut handle = SynthHandle::with_duty_ratio(tx, 432.0, DutyRatio::Eighth);

        handle.set_frequency(440.0);
        handle.set_active(true);
        let msgs = drain_all(&rx);
        assert_eq!(
            msgs,
            vec![
                ParamMessage::new()
                    .with_frequency(440.0)
                    .with_active(false)
                    .with_duty(0.125),
                ParamMessage::new()
                    .with_frequency(440.0)
                    .with_active(true)
                    .with_duty(0.125),
            ]
        );
    }

    #[test]
    fn repeated_values_are_not_resent() {
        let (tx, rx) = param_channel();
        let mut handle = SynthHandle::new(tx, 432.0);
        handle.set_active(false);
        handle.set_frequency(432.0);
        assert_eq!(rx.pending(), 0);

        handle.set_active(true);
        handle.set_active(true);
        assert_eq!(rx.pending(), 1);
    }

    #[test]
    fn frequency_is_clamped() {
        let (tx, rx) = param_channel();
        let mut handle = SynthHandle::new(tx, 432.0);
        handle.set_frequency(1.0);
        assert_eq!(handle.frequency(), MIN_FREQUENCY);
        handle.set_frequency(1.0e9);
        assert_eq!(handle.frequency(), MAX_FREQUENCY);
        handle.set_frequency(f32::NAN);
        assert_eq!(handle.frequency(), MAX_FREQUENCY);
        assert_eq!(rx.pending(), 2);
    }

    #[test]
    fn sine_handle_sends_no_duty() {
        let (tx, rx) = param_channel();
        let mut handle = SynthHandle::new(tx, 432.0);
        handle.set_active(true);
        assert_eq!(drain_all(&rx)[0].duty, None);
    }

    #[test]
    fn dropped_render_side_is_not_fatal() {
        let (tx, rx) = param_channel();
        drop(rx);
        let mut handle = SynthHandle::new(tx, 432.0);
        handle.set_active(true);
        assert!(handle.is_active());
    }
}
