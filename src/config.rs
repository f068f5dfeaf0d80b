//! Loading and validation of the sequence description.
//!
//! The configuration is a JSON document listing the hardware sample period
//! and the three event lists:
//!
//! ```json
//! {
//!     "hardware": { "sample_period": 0.1 },
//!     "events_rf": [ { "time": 2.0, "duration": 4.0, "integral": 1.0 } ],
//!     "events_gradient": [ { "time": 5.0, "duration": 2.0, "integral": [1.0, 0.0, 0.0] } ],
//!     "events_receive": [ { "time": 8.0, "duration": 3.2, "size": 256 } ]
//! }
//! ```
//!
//! `validate` checks the preconditions of waveform synthesis, so that bad
//! input fails here and not halfway through sample generation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{EventKind, GradientEvent, ReceiveEvent, RfEvent};

/// Hardware timing parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HardwareConfig {
    /// Time between consecutive waveform samples. Must be positive.
    pub sample_period: f64,
}

/// A full sequence description as loaded from a configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub events_rf: Vec<RfEvent>,
    #[serde(default)]
    pub events_gradient: Vec<GradientEvent>,
    #[serde(default)]
    pub events_receive: Vec<ReceiveEvent>,
}

impl SequenceConfig {
    /// Read and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Parse and validate a configuration from JSON source.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the synthesis preconditions: a positive sample period, at
    /// least one event overall, and positive event durations.
    pub fn validate(&self) -> Result<()> {
        if !(self.hardware.sample_period > 0.0) {
            return Err(Error::Config(format!(
                "sample_period must be positive, got {}",
                self.hardware.sample_period
            )));
        }

        if self.events_rf.is_empty()
            && self.events_gradient.is_empty()
            && self.events_receive.is_empty()
        {
            return Err(Error::Config(
                "no events, sequence duration cannot be determined".into(),
            ));
        }

        for event in &self.events_rf {
            check_duration(EventKind::RfPulse, event.time, event.duration)?;
        }
        for event in &self.events_gradient {
            check_duration(EventKind::Gradient, event.time, event.duration)?;
        }
        for event in &self.events_receive {
            check_duration(EventKind::Receive, event.time, event.duration)?;
        }

        Ok(())
    }
}

fn check_duration(kind: EventKind, time: f64, duration: f64) -> Result<()> {
    if !(duration > 0.0) {
        return Err(Error::InvalidEvent {
            kind,
            time,
            reason: format!("duration must be positive, got {duration}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    const FULL: &str = r#"{
        "hardware": { "sample_period": 0.1 },
        "events_rf": [ { "time": 2.0, "duration": 4.0, "integral": 1.0 } ],
        "events_gradient": [ { "time": 5.0, "duration": 2.0, "integral": [1.0, -0.5, 0.0] } ],
        "events_receive": [ { "time": 8.0, "duration": 3.2, "size": 256 } ]
    }"#;

    #[test]
    fn parses_a_full_config() {
        let config = SequenceConfig::from_json(FULL).unwrap();
        check!(config.hardware.sample_period == 0.1);
        check!(config.events_rf.len() == 1);
        check!(config.events_gradient[0].integral == [1.0, -0.5, 0.0]);
        check!(config.events_receive[0].size == Some(256));
    }

    #[test]
    fn receive_size_is_optional() {
        let config = SequenceConfig::from_json(
            r#"{
                "hardware": { "sample_period": 0.5 },
                "events_receive": [ { "time": 1.0, "duration": 1.0 } ]
            }"#,
        )
        .unwrap();
        check!(config.events_receive[0].size == None);
    }

    #[test]
    fn individual_event_lists_may_be_empty() {
        let config = SequenceConfig::from_json(
            r#"{
                "hardware": { "sample_period": 0.5 },
                "events_rf": [ { "time": 1.0, "duration": 1.0, "integral": 0.5 } ]
            }"#,
        )
        .unwrap();
        check!(config.events_gradient.is_empty());
        check!(config.events_receive.is_empty());
    }

    #[test]
    fn rejects_missing_hardware_section() {
        let result = SequenceConfig::from_json(r#"{ "events_rf": [] }"#);
        let_assert!(Err(Error::Json(_)) = result);
    }

    #[test]
    fn rejects_non_positive_sample_period() {
        let result = SequenceConfig::from_json(
            r#"{
                "hardware": { "sample_period": 0.0 },
                "events_rf": [ { "time": 1.0, "duration": 1.0, "integral": 0.5 } ]
            }"#,
        );
        let_assert!(Err(Error::Config(_)) = result);
    }

    #[test]
    fn rejects_empty_event_union() {
        let result = SequenceConfig::from_json(r#"{ "hardware": { "sample_period": 0.1 } }"#);
        let_assert!(Err(Error::Config(_)) = result);
    }

    #[test]
    fn rejects_non_positive_duration() {
        let result = SequenceConfig::from_json(
            r#"{
                "hardware": { "sample_period": 0.1 },
                "events_gradient": [ { "time": 1.0, "duration": -2.0, "integral": [0, 0, 0] } ]
            }"#,
        );
        let_assert!(Err(Error::InvalidEvent { kind, .. }) = result);
        check!(kind == EventKind::Gradient);
    }
}
