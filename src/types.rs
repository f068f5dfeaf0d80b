use std::fmt;

use serde::Deserialize;

/// Gradient axis of a `GradientWaveforms` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientChannel {
    X,
    Y,
    Z,
}

impl GradientChannel {
    pub const ALL: [GradientChannel; 3] =
        [GradientChannel::X, GradientChannel::Y, GradientChannel::Z];

    pub fn index(self) -> usize {
        match self {
            GradientChannel::X => 0,
            GradientChannel::Y => 1,
            GradientChannel::Z => 2,
        }
    }
}

impl fmt::Display for GradientChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientChannel::X => write!(f, "x"),
            GradientChannel::Y => write!(f, "y"),
            GradientChannel::Z => write!(f, "z"),
        }
    }
}

/// Which kind of event wrote to a channel. Used in errors and overlap
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RfPulse,
    Gradient,
    Receive,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::RfPulse => write!(f, "rf"),
            EventKind::Gradient => write!(f, "gradient"),
            EventKind::Receive => write!(f, "receive"),
        }
    }
}

// Event types as they appear in the sequence configuration. `time` is the
// event center, `duration` its width, both in the same unit as the hardware
// sample period.

/// A sinc-shaped radio pulse, scaled so that its time integral equals
/// `integral`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RfEvent {
    /// Center of the event.
    pub time: f64,
    /// Width of the event. Must be positive.
    pub duration: f64,
    /// Target area under the amplitude curve.
    pub integral: f64,
}

/// Three constant-amplitude plateaus, one per gradient axis, sharing one
/// time window.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GradientEvent {
    /// Center of the event.
    pub time: f64,
    /// Width of the event. Must be positive.
    pub duration: f64,
    /// Target integral per axis: `[x, y, z]`.
    pub integral: [f64; 3],
}

/// An acquisition window: the receive gate is high for `duration`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReceiveEvent {
    /// Center of the event.
    pub time: f64,
    /// Width of the event. Must be positive.
    pub duration: f64,
    /// Sample count hint for the consumer; has no effect on waveform
    /// generation.
    #[serde(default)]
    pub size: Option<u64>,
}

// Waveform containers. All channels of a synthesized sequence share one
// length; the len() methods assert this invariant.

/// The three gradient axis waveforms of a sequence.
#[derive(Debug, Clone)]
pub struct GradientWaveforms {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl GradientWaveforms {
    pub fn zeroed(num_samples: usize) -> Self {
        Self {
            x: vec![0.0; num_samples],
            y: vec![0.0; num_samples],
            z: vec![0.0; num_samples],
        }
    }

    pub fn channel(&self, channel: GradientChannel) -> &[f64] {
        match channel {
            GradientChannel::X => &self.x,
            GradientChannel::Y => &self.y,
            GradientChannel::Z => &self.z,
        }
    }

    pub fn channel_mut(&mut self, channel: GradientChannel) -> &mut [f64] {
        match channel {
            GradientChannel::X => &mut self.x,
            GradientChannel::Y => &mut self.y,
            GradientChannel::Z => &mut self.z,
        }
    }

    pub fn len(&self) -> usize {
        let len1 = self.x.len();
        let len2 = self.y.len();
        let len3 = self.z.len();
        assert!(len1 == len2 && len2 == len3);
        len1
    }
}

/// All sampled channels of a synthesized sequence.
#[derive(Debug, Clone)]
pub struct SequenceWaveforms {
    pub rf: Vec<f64>,
    pub gradient: GradientWaveforms,
    pub receive: Vec<bool>,
}

impl SequenceWaveforms {
    pub fn len(&self) -> usize {
        let len1 = self.rf.len();
        let len2 = self.gradient.len();
        let len3 = self.receive.len();
        assert!(len1 == len2 && len2 == len3);
        len1
    }
}
