//! keytone CLI - render note scripts and play MIDI keyboards through the synth.

mod audio;
mod commands;
mod midi_port;
mod script;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keytone")]
#[command(author, version, about = "Keyboard-driven synth voice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note script to a WAV file
    Render(commands::render::RenderArgs),

    /// Play the synth live from MIDI input ports
    Play(commands::play::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
    }
}
