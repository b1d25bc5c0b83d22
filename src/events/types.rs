//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// All events emitted by the scan-and-plan pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A phase-weighted progress update (§4.7 of the progress model).
    Progress(ProgressState),
    /// A non-fatal error occurred and was logged; the phase continues.
    NonFatalError { phase: Phase, message: String },
    /// The pipeline finished, successfully or otherwise.
    Finished(PipelineOutcome),
}

/// Named phases whose weighted progress sums to the overall scan fraction.
///
/// Weights follow the live-pipeline split from spec §4.7: discovery 0.05,
/// hashing 0.60, planning 0.30, finalize 0.05.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Discovery,
    Hashing,
    Planning,
    Finalize,
}

impl Phase {
    /// Weight of this phase within the overall `[0, 1]` scan fraction.
    pub fn weight(self) -> f64 {
        match self {
            Phase::Discovery => 0.05,
            Phase::Hashing => 0.60,
            Phase::Planning => 0.30,
            Phase::Finalize => 0.05,
        }
    }

    /// Fraction of overall progress completed by the *start* of this phase,
    /// i.e. the sum of the weights of all phases before it.
    pub fn start_offset(self) -> f64 {
        match self {
            Phase::Discovery => 0.0,
            Phase::Hashing => Phase::Discovery.weight(),
            Phase::Planning => Phase::Discovery.weight() + Phase::Hashing.weight(),
            Phase::Finalize => {
                Phase::Discovery.weight() + Phase::Hashing.weight() + Phase::Planning.weight()
            }
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Discovery => write!(f, "Discovery"),
            Phase::Hashing => write!(f, "Hashing"),
            Phase::Planning => write!(f, "Planning"),
            Phase::Finalize => write!(f, "Finalize"),
        }
    }
}

/// Confidence in the current ETA estimate, a function of sample count
/// within the current phase (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Confidence {
    /// Classify from the number of speed samples observed in the current phase.
    pub fn from_sample_count(n: usize) -> Self {
        match n {
            0..=4 => Confidence::Low,
            5..=9 => Confidence::Medium,
            10..=19 => Confidence::High,
            _ => Confidence::VeryHigh,
        }
    }

    /// Weights `[linear, moving_average, exponential]` for blending the
    /// three ETA estimators, indexed by confidence (§4.7). Low confidence
    /// only trusts the first two estimators.
    pub fn estimator_weights(self) -> &'static [f64] {
        match self {
            Confidence::Low => &[0.6, 0.4],
            Confidence::Medium => &[0.4, 0.4, 0.2],
            Confidence::High => &[0.2, 0.3, 0.5],
            Confidence::VeryHigh => &[0.1, 0.2, 0.7],
        }
    }
}

/// A snapshot of overall progress, emitted at any cadence; `fraction` is
/// guaranteed monotone-non-decreasing within a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressState {
    pub phase: Phase,
    pub detail: String,
    pub processed: u64,
    pub total: u64,
    pub fraction: f64,
    #[serde(with = "duration_secs_opt")]
    pub eta: Option<Duration>,
    pub confidence: Confidence,
}

/// How the pipeline concluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineOutcome {
    Completed {
        groups: usize,
        reclaimable_bytes: u64,
    },
    Cancelled,
    Failed {
        message: String,
    },
}

mod duration_secs_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(|d| d.as_secs_f64()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<f64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs_f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_weights_sum_to_one() {
        let total = Phase::Discovery.weight()
            + Phase::Hashing.weight()
            + Phase::Planning.weight()
            + Phase::Finalize.weight();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_from_sample_count_thresholds() {
        assert_eq!(Confidence::from_sample_count(0), Confidence::Low);
        assert_eq!(Confidence::from_sample_count(4), Confidence::Low);
        assert_eq!(Confidence::from_sample_count(5), Confidence::Medium);
        assert_eq!(Confidence::from_sample_count(9), Confidence::Medium);
        assert_eq!(Confidence::from_sample_count(10), Confidence::High);
        assert_eq!(Confidence::from_sample_count(19), Confidence::High);
        assert_eq!(Confidence::from_sample_count(20), Confidence::VeryHigh);
    }

    #[test]
    fn progress_state_is_serializable() {
        let state = ProgressState {
            phase: Phase::Hashing,
            detail: "IMG_0001.heic".to_string(),
            processed: 10,
            total: 100,
            fraction: 0.15,
            eta: Some(Duration::from_secs(42)),
            confidence: Confidence::Medium,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ProgressState = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.processed, 10);
        assert_eq!(deserialized.eta, Some(Duration::from_secs(42)));
    }
}
