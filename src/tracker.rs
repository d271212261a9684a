//! Memory tracking over the course of a trial
//!
//! Records resident-memory samples at boundaries chosen by the trial loop
//! and derives the two summary scalars the article reports: total growth
//! (last reading minus first) and the growth trend (least-squares slope of
//! resident memory over wall-clock time, in MB/s).

use crate::error::Result;
use crate::memory::MemoryProbe;
use crate::types::Sample;
use std::time::Instant;
use tracing::debug;

/// Append-only recorder of resident-memory samples
#[derive(Debug)]
pub struct MemoryTracker {
    label: String,
    probe: MemoryProbe,
    started: Instant,
    samples: Vec<Sample>,
}

impl MemoryTracker {
    /// Start tracking now, with an already-verified probe
    pub fn start(label: impl Into<String>, probe: MemoryProbe) -> Self {
        Self {
            label: label.into(),
            probe,
            started: Instant::now(),
            samples: Vec::new(),
        }
    }

    /// Force a collection pass, read resident memory, and append a sample
    pub fn record(&mut self, iteration: u64) -> Result<Sample> {
        self.probe.collect();
        let resident_bytes = self.probe.resident_bytes()?;
        let sample = Sample {
            iteration,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            resident_bytes,
        };
        debug!(
            label = %self.label,
            iteration,
            resident_bytes,
            "recorded memory sample"
        );
        self.samples.push(sample);
        Ok(sample)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Seconds since tracking started
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Consume the tracker, yielding the recorded sequence
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Last sample resident memory minus first, in bytes (0 for short series)
pub fn total_growth_bytes(samples: &[Sample]) -> i64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.resident_bytes as i64 - first.resident_bytes as i64,
        _ => 0,
    }
}

/// Least-squares slope of resident memory (MB) over elapsed time (s)
///
/// The same linear fit the article computes with `polyfit(x, y, 1)`.
/// Returns 0 when fewer than two samples exist or no time elapsed between
/// them.
pub fn growth_rate_mb_per_sec(samples: &[Sample]) -> f64 {
    let n = samples.len() as f64;
    if samples.len() < 2 {
        return 0.0;
    }
    let sum_x: f64 = samples.iter().map(|s| s.elapsed_secs).sum();
    let sum_y: f64 = samples.iter().map(|s| s.resident_mb()).sum();
    let sum_xy: f64 = samples.iter().map(|s| s.elapsed_secs * s.resident_mb()).sum();
    let sum_x2: f64 = samples.iter().map(|s| s.elapsed_secs * s.elapsed_secs).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(iteration: u64, elapsed_secs: f64, resident_bytes: u64) -> Sample {
        Sample {
            iteration,
            elapsed_secs,
            resident_bytes,
        }
    }

    #[test]
    fn test_total_growth() {
        let samples = vec![
            sample(1, 0.0, 1_000_000),
            sample(50, 0.5, 3_000_000),
            sample(100, 1.0, 5_000_000),
        ];
        assert_eq!(total_growth_bytes(&samples), 4_000_000);
    }

    #[test]
    fn test_total_growth_single_sample_is_zero() {
        let samples = vec![sample(1, 0.0, 1_000_000)];
        assert_eq!(total_growth_bytes(&samples), 0);
        assert_eq!(total_growth_bytes(&[]), 0);
    }

    #[test]
    fn test_growth_rate_linear_series() {
        // 1 MB per second, exactly linear
        let samples: Vec<Sample> = (0..10)
            .map(|i| sample(i + 1, i as f64, (i + 1) * 1_048_576))
            .collect();
        let rate = growth_rate_mb_per_sec(&samples);
        assert!((rate - 1.0).abs() < 1e-9, "rate was {}", rate);
    }

    #[test]
    fn test_growth_rate_flat_series() {
        let samples: Vec<Sample> = (0..10)
            .map(|i| sample(i + 1, i as f64, 10 * 1_048_576))
            .collect();
        assert_eq!(growth_rate_mb_per_sec(&samples), 0.0);
    }

    #[test]
    fn test_growth_rate_degenerate_series() {
        assert_eq!(growth_rate_mb_per_sec(&[]), 0.0);
        assert_eq!(growth_rate_mb_per_sec(&[sample(1, 0.0, 100)]), 0.0);
        // Two samples at the same instant: no fit possible
        let coincident = vec![sample(1, 0.0, 100), sample(2, 0.0, 200)];
        assert_eq!(growth_rate_mb_per_sec(&coincident), 0.0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_tracker_records_ordered_samples() {
        use crate::memory::MemoryProbe;

        let probe = MemoryProbe::new().unwrap();
        let mut tracker = MemoryTracker::start("unit", probe);
        tracker.record(1).unwrap();
        tracker.record(5).unwrap();

        let samples = tracker.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].iteration, 1);
        assert_eq!(samples[1].iteration, 5);
        assert!(samples[1].elapsed_secs >= samples[0].elapsed_secs);
    }
}
