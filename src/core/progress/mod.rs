//! # Progress & ETA Manager
//!
//! Tracks phase-weighted overall progress in `[0, 1]` and blends three
//! ETA estimators into a single smoothed remaining-time estimate (§4.7).
//! The only module-level state in the core; reset at the start of every
//! scan, with no cross-run memory (§9).

use crate::events::{Confidence, Event, EventSender, Phase, ProgressState};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Moving-average estimator looks at the last 5 instantaneous speed samples.
const MOVING_AVERAGE_WINDOW: usize = 5;

/// Estimators are computed in terms of work-units/second within the
/// current phase.
struct Sample {
    speed: f64,
}

/// Single-writer, single-observer progress tracker for one phase at a
/// time (§5). Emits `Event::Progress` through the shared sender at
/// whatever cadence the caller invokes `update`.
pub struct ProgressManager {
    sender: EventSender,
    phase: Phase,
    phase_started_at: Instant,
    phase_total: u64,
    processed: u64,
    last_sample_at: Instant,
    last_processed: u64,
    samples: VecDeque<Sample>,
}

impl ProgressManager {
    pub fn new(sender: EventSender) -> Self {
        let now = Instant::now();
        Self {
            sender,
            phase: Phase::Discovery,
            phase_started_at: now,
            phase_total: 0,
            processed: 0,
            last_sample_at: now,
            last_processed: 0,
            samples: VecDeque::new(),
        }
    }

    /// Begin a new phase: resets the sample window so estimators don't
    /// carry speed assumptions across phases with different workloads.
    pub fn start_phase(&mut self, phase: Phase, total: u64) {
        let now = Instant::now();
        self.phase = phase;
        self.phase_started_at = now;
        self.phase_total = total;
        self.processed = 0;
        self.last_sample_at = now;
        self.last_processed = 0;
        self.samples.clear();
    }

    /// Record progress within the current phase and emit a
    /// `ProgressState` snapshot. `processed` must be monotone
    /// non-decreasing within a phase (§8, invariant 8); concurrent hash
    /// workers can report completions out of order, so a `processed`
    /// smaller than one already observed is clamped up rather than
    /// allowed to move `fraction` backwards.
    pub fn update(&mut self, processed: u64, detail: impl Into<String>) {
        let processed = processed.max(self.last_processed);
        let now = Instant::now();
        let dt = now.duration_since(self.last_sample_at);

        if processed > self.last_processed && dt.as_secs_f64() > 0.0 {
            let speed = (processed - self.last_processed) as f64 / dt.as_secs_f64();
            self.samples.push_back(Sample { speed });
            while self.samples.len() > 20 {
                self.samples.pop_front();
            }
        }

        self.processed = processed;
        self.last_sample_at = now;
        self.last_processed = processed;

        let state = self.snapshot(detail.into());
        self.sender.send(Event::Progress(state));
    }

    fn phase_fraction(&self) -> f64 {
        if self.phase_total == 0 {
            0.0
        } else {
            (self.processed as f64 / self.phase_total as f64).min(1.0)
        }
    }

    fn overall_fraction(&self) -> f64 {
        self.phase.start_offset() + self.phase_fraction() * self.phase.weight()
    }

    fn confidence(&self) -> Confidence {
        Confidence::from_sample_count(self.samples.len())
    }

    fn snapshot(&self, detail: String) -> ProgressState {
        ProgressState {
            phase: self.phase,
            detail,
            processed: self.processed,
            total: self.phase_total,
            fraction: self.overall_fraction(),
            eta: self.estimate_eta(),
            confidence: self.confidence(),
        }
    }

    /// Blends the linear, moving-average, and exponential estimators
    /// per the confidence-indexed weights of §4.7, then clamps the
    /// result.
    fn estimate_eta(&self) -> Option<Duration> {
        let fraction = self.phase_fraction();
        if fraction <= 0.0 || fraction >= 1.0 {
            return None;
        }

        let confidence = self.confidence();
        let estimators: Vec<Option<f64>> = match confidence {
            Confidence::Low => vec![self.linear_estimate(fraction), self.moving_average_estimate()],
            _ => vec![
                self.linear_estimate(fraction),
                self.moving_average_estimate(),
                self.exponential_estimate(),
            ],
        };

        let weights = confidence.estimator_weights();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (estimate, weight) in estimators.into_iter().zip(weights) {
            if let Some(secs) = estimate {
                weighted_sum += secs * weight;
                weight_total += weight;
            }
        }

        if weight_total <= 0.0 {
            return None;
        }

        let blended = weighted_sum / weight_total;
        Some(clamp_eta(Duration::from_secs_f64(blended.max(0.0)), fraction))
    }

    fn linear_estimate(&self, fraction: f64) -> Option<f64> {
        let elapsed = Instant::now().duration_since(self.phase_started_at).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        Some(elapsed / fraction - elapsed)
    }

    fn moving_average_estimate(&self) -> Option<f64> {
        let window: Vec<&Sample> = self
            .samples
            .iter()
            .rev()
            .take(MOVING_AVERAGE_WINDOW)
            .collect();
        if window.is_empty() {
            return None;
        }
        let avg_speed: f64 = window.iter().map(|s| s.speed).sum::<f64>() / window.len() as f64;
        remaining_seconds(self.remaining_work(), avg_speed)
    }

    fn exponential_estimate(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let n = self.samples.len();
        let mut weighted_speed = 0.0;
        let mut weight_total = 0.0;
        for (i, sample) in self.samples.iter().enumerate() {
            let weight = 0.8_f64.powi((n - 1 - i) as i32);
            weighted_speed += sample.speed * weight;
            weight_total += weight;
        }
        if weight_total <= 0.0 {
            return None;
        }
        remaining_seconds(self.remaining_work(), weighted_speed / weight_total)
    }

    fn remaining_work(&self) -> f64 {
        (self.phase_total.saturating_sub(self.processed)) as f64
    }
}

fn remaining_seconds(remaining_work: f64, speed: f64) -> Option<f64> {
    if speed <= 0.0 {
        None
    } else {
        Some(remaining_work / speed)
    }
}

/// Clamp to `[1s, 3600s]`; tighten further as the phase nears completion
/// so the estimate doesn't linger on a stale large number (§4.7).
fn clamp_eta(eta: Duration, phase_fraction: f64) -> Duration {
    let mut secs = eta.as_secs_f64().clamp(1.0, 3600.0);
    if phase_fraction > 0.95 {
        secs = secs.min(30.0);
    } else if phase_fraction > 0.90 {
        secs = secs.min(60.0);
    }
    Duration::from_secs_f64(secs)
}
