//! Shared CLI helpers used by `render` and `play`.

use clap::{Args, ValueEnum};
use keytone_config::{SynthConfig, WaveformKind};
use keytone_midi::{DispatchSubscription, NoteDispatcher, NoteRouter, piano_bindings};
use keytone_synth::{DutyRatio, ParamSender, SynthHandle};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Square,
    Triangle,
}

impl From<CliWaveform> for WaveformKind {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => WaveformKind::Sine,
            CliWaveform::Square => WaveformKind::Square,
            CliWaveform::Triangle => WaveformKind::Triangle,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDuty {
    /// 12.5%
    Eighth,
    /// 25%
    Quarter,
    /// 50%
    Half,
}

impl From<CliDuty> for DutyRatio {
    fn from(d: CliDuty) -> Self {
        match d {
            CliDuty::Eighth => DutyRatio::Eighth,
            CliDuty::Quarter => DutyRatio::Quarter,
            CliDuty::Half => DutyRatio::Half,
        }
    }
}

/// Voice options accepted by every command that builds a synth.
#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    /// Synth config file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured waveform
    #[arg(short, long)]
    pub waveform: Option<CliWaveform>,

    /// Square duty preset (overrides the configured duty)
    #[arg(short, long)]
    pub duty: Option<CliDuty>,

    /// Use the band-limited triangle
    #[arg(long)]
    pub band_limited: bool,
}

impl SynthArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<SynthConfig> {
        let mut config = match &self.config {
            Some(path) => SynthConfig::load(path)?,
            None => SynthConfig::default(),
        };
        if let Some(waveform) = self.waveform {
            config.voice.waveform = waveform.into();
        }
        if let Some(duty) = self.duty {
            config.voice.duty = DutyRatio::from(duty).ratio();
        }
        if self.band_limited {
            config.voice.band_limited = true;
        }
        Ok(config)
    }

    /// Build the synth façade for `config`.
    ///
    /// A square voice started from a duty preset keeps announcing that preset
    /// with every update. Other voices leave the configured duty untouched.
    pub fn synth_handle(&self, config: &SynthConfig, sender: ParamSender) -> SynthHandle {
        match (config.voice.waveform, self.duty) {
            (WaveformKind::Square, Some(duty)) => {
                SynthHandle::with_duty_ratio(sender, config.voice.frequency, duty.into())
            }
            _ => SynthHandle::new(sender, config.voice.frequency),
        }
    }
}

/// Note router with the 88-key action map, plus a dispatcher for one synth
/// already subscribed to it.
pub struct Rig {
    pub router: NoteRouter,
    subscription: Option<DispatchSubscription>,
}

impl Rig {
    pub fn new(handle: SynthHandle) -> Self {
        let router = NoteRouter::with_bindings(piano_bindings());
        let dispatcher = Arc::new(Mutex::new(NoteDispatcher::new(vec![handle])));
        let subscription = DispatchSubscription::connect(&router, &dispatcher);
        tracing::debug!(actions = router.action_count(), "note router ready");
        Self {
            router,
            subscription: Some(subscription),
        }
    }

    /// Unsubscribe the dispatcher and close the router.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.disconnect();
        }
        self.router.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keytone_synth::param_channel;

    fn args() -> SynthArgs {
        SynthArgs {
            config: None,
            waveform: None,
            duty: None,
            band_limited: false,
        }
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let mut a = args();
        a.waveform = Some(CliWaveform::Triangle);
        a.band_limited = true;
        let config = a.load_config().unwrap();
        assert_eq!(config.voice.waveform, WaveformKind::Triangle);
        assert!(config.voice.band_limited);
    }

    #[test]
    fn duty_preset_sets_config_and_handle() {
        let mut a = args();
        a.duty = Some(CliDuty::Quarter);
        let config = a.load_config().unwrap();
        assert_eq!(config.voice.duty, 0.25);

        let (tx, _rx) = param_channel();
        let handle = a.synth_handle(&config, tx);
        assert_eq!(handle.duty(), Some(0.25));
    }

    #[test]
    fn non_square_handle_has_no_duty() {
        let mut a = args();
        a.waveform = Some(CliWaveform::Sine);
        a.duty = Some(CliDuty::Half);
        let config = a.load_config().unwrap();
        let (tx, _rx) = param_channel();
        assert_eq!(a.synth_handle(&config, tx).duty(), None);
    }

    #[test]
    fn rig_shutdown_closes_router() {
        let (tx, _rx) = param_channel();
        let mut rig = Rig::new(SynthHandle::new(tx, 440.0));
        assert_eq!(rig.router.action_count(), 88);
        rig.shutdown();
        assert!(rig.router.is_closed());
        rig.shutdown();
    }
}
