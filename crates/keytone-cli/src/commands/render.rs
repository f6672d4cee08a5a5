//! Offline rendering of note scripts.

use super::common::{Rig, SynthArgs};
use crate::script::{self, Step};
use crate::wav::write_wav;
use clap::{Args, ValueEnum};
use keytone_config::SynthConfig;
use keytone_midi::{NotePhase, NoteRouter, RawValue};
use keytone_synth::Generator;
use std::path::PathBuf;

/// Which input path the script's notes are sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoteSource {
    /// Fire the bound piano actions
    Action,
    /// Queue notes as if a keyboard device sent them
    Device,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Note script, e.g. "C4:250,E4:250,-:100,G4:500"
    #[arg(short, long)]
    notes: String,

    /// Input path the notes travel through
    #[arg(long, value_enum, default_value = "action")]
    source: NoteSource,

    /// Extra silence after the last release, in milliseconds
    #[arg(long, default_value = "100")]
    tail: u32,

    #[command(flatten)]
    synth: SynthArgs,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let steps = script::parse(&args.notes)?;
    let config = args.synth.load_config()?;

    tracing::info!(
        steps = steps.len(),
        script_ms = script::total_ms(&steps),
        sample_rate = config.sample_rate,
        channels = config.channels,
        source = ?args.source,
        "rendering note script"
    );

    let samples = render_script(&steps, &config, &args.synth, args.source, args.tail)?;
    write_wav(&args.output, &samples, config.channels, config.sample_rate)?;

    let frames = samples.len() / usize::from(config.channels);
    println!(
        "Wrote {} ({} frames, {:.2}s)",
        args.output.display(),
        frames,
        frames as f64 / f64::from(config.sample_rate)
    );
    Ok(())
}

/// Render `steps` through router, dispatcher and generator into interleaved
/// samples.
///
/// Every note is pressed for its duration and released before the next step.
/// The output ends with the configured release time plus `tail_ms`.
pub fn render_script(
    steps: &[Step],
    config: &SynthConfig,
    synth: &SynthArgs,
    source: NoteSource,
    tail_ms: u32,
) -> anyhow::Result<Vec<f32>> {
    let (generator, sender) = Generator::with_channel(&config.generator_config());
    let mut rig = Rig::new(synth.synth_handle(config, sender));

    if source == NoteSource::Action
        && let Some((name, _)) = steps
            .iter()
            .filter_map(|s| s.note.as_ref())
            .find(|(name, _)| rig.router.action_note_number(name).is_none())
    {
        anyhow::bail!("note '{name}' is outside the piano range (A0-C8)");
    }

    let mut renderer = Renderer::new(generator, config.block_size);
    for step in steps {
        match &step.note {
            Some((name, number)) => {
                send(&mut rig.router, source, name, *number, NotePhase::Down, renderer.seconds());
                renderer.render_ms(step.duration_ms);
                send(&mut rig.router, source, name, *number, NotePhase::Up, renderer.seconds());
            }
            None => renderer.render_ms(step.duration_ms),
        }
    }

    // Release ramps in ms; a gated release may wait up to one more period.
    let release_ms = config.envelope.release_ms.ceil() as u32;
    renderer.render_ms(release_ms.saturating_add(tail_ms));

    rig.shutdown();
    Ok(renderer.samples)
}

fn send(
    router: &mut NoteRouter,
    source: NoteSource,
    name: &str,
    number: i32,
    phase: NotePhase,
    timestamp: f64,
) {
    match (source, phase) {
        (NoteSource::Action, NotePhase::Down) => {
            router.trigger_action(name, phase, RawValue::Axis(1.0), timestamp);
        }
        (NoteSource::Action, NotePhase::Up) => {
            router.trigger_action(name, phase, RawValue::Axis(0.0), timestamp);
        }
        (NoteSource::Device, NotePhase::Down) => {
            router.device_note_on(number, 1.0, None);
            router.poll_devices();
        }
        (NoteSource::Device, NotePhase::Up) => {
            router.device_note_off(number, None);
            router.poll_devices();
        }
    }
}

/// Pulls fixed-size blocks from a generator into a growing buffer.
struct Renderer {
    generator: Generator,
    block: Vec<f32>,
    samples: Vec<f32>,
    frames: u64,
}

impl Renderer {
    fn new(generator: Generator, block_frames: usize) -> Self {
        let block = vec![0.0; block_frames.max(1) * generator.channels()];
        Self {
            generator,
            block,
            samples: Vec::new(),
            frames: 0,
        }
    }

    fn seconds(&self) -> f64 {
        self.frames as f64 / f64::from(self.generator.sample_rate())
    }

    fn render_ms(&mut self, ms: u32) {
        let channels = self.generator.channels();
        let block_frames = self.block.len() / channels;
        let mut remaining =
            (f64::from(ms) * f64::from(self.generator.sample_rate()) / 1000.0).round() as usize;

        while remaining > 0 {
            let frames = remaining.min(block_frames);
            let chunk = &mut self.block[..frames * channels];
            self.generator.process(chunk);
            self.samples.extend_from_slice(chunk);
            self.frames += frames as u64;
            remaining -= frames;
        }
    }
}
