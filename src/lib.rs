//! seqforge compiles a declarative sequence description - timed RF pulses,
//! gradient pulses on three axes and receive windows - into sampled
//! waveforms, and serializes them into the fixed-size binary packets the
//! sequencer hardware consumes.
//!
//! The crate is split the way the data flows: [`config`] loads and
//! validates the sequence description, [`synth`] turns the events into
//! per-channel sample arrays, [`packet`] encodes those arrays into the wire
//! format. [`plot`] renders the arrays for inspection and has no effect on
//! the binary output.
//!
//! ```no_run
//! use seqforge::{encode_packets, SequenceConfig, Synthesizer};
//!
//! # fn main() -> seqforge::Result<()> {
//! let config = SequenceConfig::load("demos/config.json")?;
//! let waveforms = Synthesizer::new().synthesize(&config)?;
//!
//! let mut stream = Vec::new();
//! encode_packets(&waveforms, &mut stream)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod packet;
pub mod plot;
pub mod synth;
pub mod types;

pub use config::{HardwareConfig, SequenceConfig};
pub use error::{Error, Result};
pub use packet::{decode_packet, encode_packets, packet_count, Packet, PACKET_BYTES, PACKET_LEN};
pub use synth::Synthesizer;
pub use types::{
    EventKind, GradientChannel, GradientEvent, GradientWaveforms, ReceiveEvent, RfEvent,
    SequenceWaveforms,
};
