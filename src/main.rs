//! Command line entry point: compile a sequence configuration into a plot
//! artifact and a binary packet stream.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seqforge::{encode_packets, packet_count, plot, SequenceConfig, Synthesizer};

/// Compile a pulse sequence configuration into hardware waveform packets.
#[derive(Parser)]
#[command(name = "seqforge")]
#[command(about = "Compile a pulse sequence config into waveform packets")]
struct Cli {
    /// Input sequence configuration file
    #[arg(short, long, default_value = "demos/config.json")]
    config: PathBuf,

    /// Output path for the waveform plot
    #[arg(long, default_value = "sequence.txt")]
    plot: PathBuf,

    /// Output path for the binary packet stream
    #[arg(long, default_value = "sequence.bin")]
    bin: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> seqforge::Result<()> {
    let config = SequenceConfig::load(&cli.config)?;

    let synthesizer = Synthesizer::new();
    let waveforms = synthesizer.synthesize(&config)?;
    info!(
        num_samples = waveforms.len(),
        "synthesized sequence waveforms"
    );

    let mut rendered = Vec::new();
    plot::render(&waveforms, &mut rendered)?;
    fs::write(&cli.plot, rendered)?;
    info!(path = %cli.plot.display(), "wrote waveform plot");

    // Encode fully in memory first: a failed run must not leave a partial
    // binary behind.
    let mut stream = Vec::new();
    encode_packets(&waveforms, &mut stream)?;
    fs::write(&cli.bin, &stream)?;
    info!(
        packets = packet_count(waveforms.len()),
        bytes = stream.len(),
        path = %cli.bin.display(),
        "wrote packet stream"
    );

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
