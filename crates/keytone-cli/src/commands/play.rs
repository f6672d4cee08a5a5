//! Live playback from MIDI keyboards.

use super::common::{Rig, SynthArgs};
use crate::audio::OutputDevice;
use crate::midi_port::{list_ports, matching_ports};
use clap::Args;
use keytone_midi::MidiDevice;
use keytone_synth::Generator;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(2);

#[derive(Args)]
pub struct PlayArgs {
    /// Only attach input ports whose name contains this text
    #[arg(short, long)]
    port: Option<String>,

    /// List MIDI input ports and exit
    #[arg(long)]
    list: bool,

    #[command(flatten)]
    synth: SynthArgs,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    if args.list {
        let ports = list_ports()?;
        if ports.is_empty() {
            println!("No MIDI input ports found.");
        } else {
            println!("MIDI input ports:");
            for (index, name) in ports.iter().enumerate() {
                println!("  [{index}] {name}");
            }
        }
        return Ok(());
    }

    let mut config = args.synth.load_config()?;
    let output = OutputDevice::open_default()?;
    if output.sample_rate() != config.sample_rate || output.channels() != config.channels {
        tracing::info!(
            device = output.name(),
            sample_rate = output.sample_rate(),
            channels = output.channels(),
            "using the output device's format"
        );
        config.sample_rate = output.sample_rate();
        config.channels = output.channels();
    }

    let (generator, sender) = Generator::with_channel(&config.generator_config());
    let mut rig = Rig::new(args.synth.synth_handle(&config, sender));
    rig.router
        .on_any_down()
        .subscribe(|event| tracing::info!(%event, "key down"));

    let ports = matching_ports(args.port.as_deref())?;
    let mut attached = 0;
    for port in ports {
        let name = port.name().to_string();
        match rig.router.attach_device(Box::new(port)) {
            Ok(true) => attached += 1,
            Ok(false) => {}
            Err(err) => tracing::warn!(port = %name, error = %err, "skipping MIDI port"),
        }
    }
    if attached == 0 {
        anyhow::bail!("no MIDI input port could be attached (try `keytone play --list`)");
    }

    let _stream = output.start(generator, config.block_size)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    println!("Playing from {attached} MIDI port(s)... Press Ctrl+C to stop.");

    while running.load(Ordering::SeqCst) {
        rig.router.poll_devices();
        std::thread::sleep(POLL_INTERVAL);
    }

    println!("\nStopping...");
    rig.shutdown();
    Ok(())
}
