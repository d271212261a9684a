//! Core data types for the Lethe demonstration crate
//!
//! This module defines the trial configuration, the memory samples a trial
//! produces, and the trial result that reporting consumes. These types are
//! serde-serializable so artifacts can embed the exact configuration that
//! produced a sample series.

use crate::error::{LetheError, Result};
use serde::{Deserialize, Serialize};

/// How the raised exception is obtained on each iteration
///
/// `Singleton` reuses one long-lived instance across every raise (the
/// problematic pattern); `Factory` constructs a fresh instance per raise
/// (the recommended pattern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseMode {
    Singleton,
    Factory,
}

impl RaiseMode {
    /// Trial label used in progress output and artifact filenames
    pub fn label(&self) -> &'static str {
        match self {
            RaiseMode::Singleton => "singleton",
            RaiseMode::Factory => "factory",
        }
    }
}

impl std::fmt::Display for RaiseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for a single measurement trial
///
/// Immutable once a trial starts. Validated with [`TrialConfig::validate`]
/// before any raise occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Number of raise/catch cycles to execute
    pub iterations: u64,

    /// Exception sourcing pattern under test
    pub mode: RaiseMode,

    /// Size of the synthetic payload attached to each raise, in KB
    pub payload_kb: u64,

    /// Resident memory is sampled every this many iterations
    /// (the first and last iterations are always sampled)
    pub sample_interval: u64,
}

impl TrialConfig {
    /// Construct a configuration for the given mode with the article's
    /// default parameters (1000 raises, 500KB payload, sample every 100).
    pub fn for_mode(mode: RaiseMode) -> Self {
        Self {
            iterations: 1000,
            mode,
            payload_kb: 500,
            sample_interval: 100,
        }
    }

    /// Reject non-positive iteration counts or sample intervals
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(LetheError::InvalidConfig(
                "iterations must be positive".to_string(),
            ));
        }
        if self.sample_interval == 0 {
            return Err(LetheError::InvalidConfig(
                "sample_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether resident memory is sampled after the given 1-based iteration
    pub fn is_sample_boundary(&self, iteration: u64) -> bool {
        iteration == 1 || iteration == self.iterations || iteration % self.sample_interval == 0
    }
}

/// One resident-memory reading, taken at a sample boundary
///
/// Samples form an ordered, append-only sequence; they are never mutated
/// after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// 1-based iteration index at which the reading was taken
    pub iteration: u64,

    /// Wall-clock seconds since the trial started
    pub elapsed_secs: f64,

    /// Process resident set size in bytes
    pub resident_bytes: u64,
}

impl Sample {
    /// Resident memory in MB (for trend fitting and display)
    pub fn resident_mb(&self) -> f64 {
        self.resident_bytes as f64 / 1_048_576.0
    }
}

/// Result of one completed trial
///
/// Owned by the invocation that produced it and discarded after
/// reporting; nothing is persisted unless an artifact is requested.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    /// Trial label ("singleton" or "factory")
    pub label: String,

    /// Configuration the trial ran with
    pub config: TrialConfig,

    /// Ordered sample sequence
    pub samples: Vec<Sample>,

    /// Context references still retained by the exception source at the end
    pub retained_contexts: usize,

    /// Synthetic stack frames still retained at the end
    pub retained_frames: usize,

    /// Last sample resident memory minus first sample resident memory
    pub total_growth_bytes: i64,

    /// Least-squares slope of resident memory over time, in MB/s
    pub growth_rate_mb_per_sec: f64,

    /// Total wall-clock duration of the trial in seconds
    pub elapsed_secs: f64,
}

impl TrialResult {
    /// First recorded sample (trials always record at least one)
    pub fn first_sample(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Last recorded sample
    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }
}
