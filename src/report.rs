//! Reporting and data artifacts
//!
//! Prints the per-trial summary block and the singleton-vs-factory
//! comparison, and writes the plottable artifacts: one CSV per trial and a
//! comparison JSON document embedding both sample series and their derived
//! scalars. Filenames carry a timestamp so repeated runs never clobber
//! each other.

use crate::error::Result;
use crate::types::{TrialConfig, TrialResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Format a byte count the way the article does (B/KB/MB/GB, two decimals)
pub fn format_memory(mut bytes: f64) -> String {
    for unit in ["B", "KB", "MB", "GB"] {
        if bytes < 1024.0 || unit == "GB" {
            return format!("{:.2} {}", bytes, unit);
        }
        bytes /= 1024.0;
    }
    unreachable!()
}

/// Print the demo preamble for a trial
pub fn print_preamble(config: &TrialConfig) {
    let (subject, verdict) = match config.mode {
        crate::types::RaiseMode::Singleton => ("SAME exception object", "BAD"),
        crate::types::RaiseMode::Factory => ("a NEW exception object", "GOOD"),
    };
    println!("{}", "=".repeat(80));
    println!(
        "{} Exception Pattern ({})",
        capitalize(config.mode.label()),
        verdict
    );
    println!("{}", "=".repeat(80));
    println!(
        "This demo will raise and catch {} {} times",
        subject, config.iterations
    );
    println!(
        "Each raise will capture a context of ~{}KB in its traceback",
        config.payload_kb
    );
    println!("{}", "=".repeat(80));
}

/// Print the final summary block for one trial
pub fn print_summary(result: &TrialResult) {
    println!();
    println!("{} Exception Demo Complete:", capitalize(&result.label));
    println!(
        "Memory growth trend: {:.3} MB/s",
        result.growth_rate_mb_per_sec
    );
    println!(
        "Total memory increase: {}",
        format_memory(result.total_growth_bytes.max(0) as f64)
    );
    println!(
        "Retained contexts at end: {} ({} frames)",
        result.retained_contexts, result.retained_frames
    );
}

/// Print the side-by-side comparison of the two patterns
pub fn print_comparison(singleton: &TrialResult, factory: &TrialResult) {
    println!();
    println!("{}", "=".repeat(80));
    println!("SUMMARY: Exception Memory Leak Demonstration");
    println!("{}", "=".repeat(80));
    println!(
        "Singleton pattern (bad) memory growth rate: {:.3} MB/s",
        singleton.growth_rate_mb_per_sec
    );
    println!(
        "Factory pattern (good) memory growth rate: {:.3} MB/s",
        factory.growth_rate_mb_per_sec
    );
    println!(
        "Difference: {:.3} MB/s",
        singleton.growth_rate_mb_per_sec - factory.growth_rate_mb_per_sec
    );
    println!(
        "Singleton total increase: {}",
        format_memory(singleton.total_growth_bytes.max(0) as f64)
    );
    println!(
        "Factory total increase: {}",
        format_memory(factory.total_growth_bytes.max(0) as f64)
    );
    println!("{}", "=".repeat(80));
}

/// CSV rows for one trial's sample series
pub fn trial_csv(result: &TrialResult) -> String {
    let mut out = String::from("iteration,elapsed_secs,memory_mb\n");
    for sample in &result.samples {
        // Row formatting failures cannot occur when writing into a String
        let _ = writeln!(
            out,
            "{},{:.6},{:.6}",
            sample.iteration,
            sample.elapsed_secs,
            sample.resident_mb()
        );
    }
    out
}

/// Write one trial's sample series as a timestamped CSV under `dir`
pub fn write_trial_csv(dir: &Path, result: &TrialResult) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("memory_usage_{}_{}.csv", result.label, stamp));
    std::fs::write(&path, trial_csv(result))?;
    info!(path = %path.display(), "wrote trial CSV");
    Ok(path)
}

/// Comparison artifact: both trials, their configurations, and the rate
/// difference, as one JSON document
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub singleton: &'a TrialResult,
    pub factory: &'a TrialResult,
    pub rate_difference_mb_per_sec: f64,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(singleton: &'a TrialResult, factory: &'a TrialResult) -> Self {
        Self {
            generated_at: Utc::now(),
            rate_difference_mb_per_sec: singleton.growth_rate_mb_per_sec
                - factory.growth_rate_mb_per_sec,
            singleton,
            factory,
        }
    }
}

/// Write the comparison document as timestamped JSON under `dir`
pub fn write_comparison_json(
    dir: &Path,
    singleton: &TrialResult,
    factory: &TrialResult,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let report = ComparisonReport::new(singleton, factory);
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("comparison_{}.json", stamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    info!(path = %path.display(), "wrote comparison JSON");
    Ok(path)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
