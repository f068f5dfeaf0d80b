//! Waveform synthesis: turns the event lists of a `SequenceConfig` into
//! per-channel sample arrays.
//!
//! All three event kinds share one placement rule: an event's samples start
//! at `round((time - 0.5 * duration) / sample_period)`, so temporal
//! alignment across channels is self-consistent. Placement is an overwrite
//! of the covered range, not an accumulation; when a later event covers
//! samples an earlier one wrote, the later event wins and a warning names
//! the channel and event time. A range that falls outside the sequence
//! window is an error, never clipped.

use std::ops::Range;

use tracing::{debug, warn};

use crate::config::SequenceConfig;
use crate::error::{Error, Result};
use crate::types::{
    EventKind, GradientChannel, GradientWaveforms, RfEvent, SequenceWaveforms,
};

/// Half-width of the sinc support, in normalized time units: RF pulses are
/// sampled over `[-4, 4)`.
const SINC_HALF_WIDTH: f64 = 4.0;

/// Grid size for the reference sinc integral, both endpoints included.
const SINC_REFERENCE_POINTS: usize = 50;

/// Normalized sinc: `sin(pi x) / (pi x)`, with the removable singularity
/// filled in as `sinc(0) = 1`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Mean amplitude of the normalized sinc over `[-4, 4]`: the trapezoidal
/// integral on an evenly spaced 50-point grid, divided by the domain width.
/// RF amplitudes are divided by this constant so that the discrete pulse
/// integral comes out at the requested value.
fn sinc_reference_mean() -> f64 {
    let step = 2.0 * SINC_HALF_WIDTH / (SINC_REFERENCE_POINTS - 1) as f64;
    let mut integral = 0.0;
    for i in 0..SINC_REFERENCE_POINTS - 1 {
        let x0 = -SINC_HALF_WIDTH + i as f64 * step;
        let x1 = -SINC_HALF_WIDTH + (i + 1) as f64 * step;
        integral += 0.5 * (sinc(x0) + sinc(x1)) * step;
    }
    integral / (2.0 * SINC_HALF_WIDTH)
}

/// Tracks the index ranges already written on one channel, so overlapping
/// events can be reported.
#[derive(Default)]
struct Coverage {
    ranges: Vec<Range<usize>>,
}

impl Coverage {
    /// Record `range`; returns true if it intersects an earlier one.
    fn insert(&mut self, range: Range<usize>) -> bool {
        let overlaps = self
            .ranges
            .iter()
            .any(|r| r.start < range.end && range.start < r.end);
        self.ranges.push(range);
        overlaps
    }
}

/// Overwrite `dst[start..start+len]` with the event's samples, where
/// `start` is derived from the event center. Errors if any part of the
/// range lies outside `dst`.
fn place<T: Copy>(
    dst: &mut [T],
    samples: &[T],
    kind: EventKind,
    time: f64,
    duration: f64,
    sample_period: f64,
) -> Result<Range<usize>> {
    let start = ((time - 0.5 * duration) / sample_period).round() as i64;
    let end = start + samples.len() as i64;
    if start < 0 || end > dst.len() as i64 {
        return Err(Error::EventPlacement {
            kind,
            time,
            start,
            end,
            num_samples: dst.len(),
        });
    }

    let range = start as usize..end as usize;
    dst[range.clone()].copy_from_slice(samples);
    Ok(range)
}

/// Synthesizes sequence waveforms. The sinc reference constant is computed
/// once at construction and held immutably for the synthesizer's lifetime.
pub struct Synthesizer {
    k_integral: f64,
}

impl Synthesizer {
    pub fn new() -> Self {
        let k_integral = sinc_reference_mean();
        debug!(k_integral, "computed sinc reference constant");
        Self { k_integral }
    }

    /// Mean amplitude of the reference sinc shape.
    pub fn k_integral(&self) -> f64 {
        self.k_integral
    }

    /// Build the RF, gradient and receive sample arrays for `config`. All
    /// returned channels have length `floor(t_max / sample_period)`, where
    /// `t_max` is the largest event extent `time + 0.5 * duration`.
    pub fn synthesize(&self, config: &SequenceConfig) -> Result<SequenceWaveforms> {
        config.validate()?;
        let sample_period = config.hardware.sample_period;

        let extents = config
            .events_rf
            .iter()
            .map(|e| e.time + 0.5 * e.duration)
            .chain(
                config
                    .events_gradient
                    .iter()
                    .map(|e| e.time + 0.5 * e.duration),
            )
            .chain(
                config
                    .events_receive
                    .iter()
                    .map(|e| e.time + 0.5 * e.duration),
            );
        // validate() guarantees at least one event
        let t_max = extents.fold(f64::NEG_INFINITY, f64::max);
        let num_samples = (t_max / sample_period).floor() as usize;

        let mut rf = vec![0.0; num_samples];
        let mut gradient = GradientWaveforms::zeroed(num_samples);
        let mut receive = vec![false; num_samples];

        let mut rf_coverage = Coverage::default();
        for event in &config.events_rf {
            let pulse = self.rf_pulse(event, sample_period);
            let range = place(
                &mut rf,
                &pulse,
                EventKind::RfPulse,
                event.time,
                event.duration,
                sample_period,
            )?;
            if rf_coverage.insert(range) {
                warn!(kind = %EventKind::RfPulse, time = event.time, "event overwrites earlier samples");
            }
        }

        // One gradient event writes all three axes over the same range, so
        // overlap is tracked once per event, not per axis.
        let mut gradient_coverage = Coverage::default();
        for event in &config.events_gradient {
            let len = sample_count(event.duration, sample_period);
            let mut range = 0..0;
            for channel in GradientChannel::ALL {
                let plateau = vec![event.integral[channel.index()] / event.duration; len];
                range = place(
                    gradient.channel_mut(channel),
                    &plateau,
                    EventKind::Gradient,
                    event.time,
                    event.duration,
                    sample_period,
                )?;
            }
            if gradient_coverage.insert(range) {
                warn!(kind = %EventKind::Gradient, time = event.time, "event overwrites earlier samples");
            }
        }

        let mut receive_coverage = Coverage::default();
        for event in &config.events_receive {
            let len = sample_count(event.duration, sample_period);
            let gate = vec![true; len];
            let range = place(
                &mut receive,
                &gate,
                EventKind::Receive,
                event.time,
                event.duration,
                sample_period,
            )?;
            if receive_coverage.insert(range) {
                warn!(kind = %EventKind::Receive, time = event.time, "event overwrites earlier samples");
            }
        }

        debug!(
            num_samples,
            rf_events = config.events_rf.len(),
            gradient_events = config.events_gradient.len(),
            receive_events = config.events_receive.len(),
            "synthesized sequence waveforms"
        );

        Ok(SequenceWaveforms {
            rf,
            gradient,
            receive,
        })
    }

    /// Sample a sinc pulse over `[-4, 4)` with `round(duration /
    /// sample_period)` points, scaled so its discrete time integral
    /// approximates `event.integral`.
    fn rf_pulse(&self, event: &RfEvent, sample_period: f64) -> Vec<f64> {
        let len = sample_count(event.duration, sample_period);
        let step = (2.0 * SINC_HALF_WIDTH / event.duration) * sample_period;
        let amplitude = event.integral / event.duration / self.k_integral;
        (0..len)
            .map(|i| sinc(-SINC_HALF_WIDTH + i as f64 * step) * amplitude)
            .collect()
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of samples an event of the given duration generates.
fn sample_count(duration: f64, sample_period: f64) -> usize {
    (duration / sample_period).round() as usize
}
