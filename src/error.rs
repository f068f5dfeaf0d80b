use thiserror::Error;

use crate::types::EventKind;

pub type Result<T> = std::result::Result<T, Error>;

/// All errors abort the pipeline before any packet reaches the output
/// stream; a truncated binary could be misread by the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing, the sample period is not positive, or
    /// there are no events to size the sequence with.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An event that cannot be turned into samples, e.g. a non-positive
    /// duration.
    #[error("invalid {kind} event at t={time}: {reason}")]
    InvalidEvent {
        kind: EventKind,
        time: f64,
        reason: String,
    },

    /// An event whose sample range falls outside the sequence window. Never
    /// silently clipped.
    #[error(
        "{kind} event at t={time} wants samples {start}..{end}, sequence has {num_samples}"
    )]
    EventPlacement {
        kind: EventKind,
        time: f64,
        start: i64,
        end: i64,
        num_samples: usize,
    },

    /// A packet frame came out with the wrong size. Indicates a bug in the
    /// encoder, always fatal.
    #[error("encoded frame is {actual} bytes, expected {expected}")]
    EncodingInvariant { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}
