//! The measurement procedure
//!
//! Executes a configured number of raise/catch cycles through a synthetic
//! three-level call chain, attaching a payload-carrying context to the
//! exception on every raise, and samples process resident memory at
//! interval boundaries (always including the first and last iteration).
//!
//! The exception source is passed in explicitly so the long-lived
//! singleton instance is owned by the caller, never by module state.

use crate::error::Result;
use crate::exception::{CatchReport, RaiseContext, Raised, RaiseSource};
use crate::memory::MemoryProbe;
use crate::report::format_memory;
use crate::tracker::{growth_rate_mb_per_sec, total_growth_bytes, MemoryTracker};
use crate::types::{TrialConfig, TrialResult};
use tracing::{debug, info};

/// Which progress line a trial prints at sample boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// `Raise #<i>: Traceback frame count = <f>, Memory usage = <m> KB`
    FrameCount,
    /// `Iteration <i>/<n>: Memory usage = <m> (+<delta>)`
    Growth,
    /// No per-boundary output (tests)
    Silent,
}

// The synthetic call chain the raise travels through, mirroring the
// article's level1 -> level2 -> level3 nesting.

fn level3(source: &mut RaiseSource, payload_kb: u64) -> std::result::Result<(), Raised> {
    Err(source.raise(RaiseContext::capture(payload_kb)))
}

fn level2(source: &mut RaiseSource, payload_kb: u64) -> std::result::Result<(), Raised> {
    level3(source, payload_kb)
}

fn level1(source: &mut RaiseSource, payload_kb: u64) -> std::result::Result<(), Raised> {
    level2(source, payload_kb)
}

/// Run one trial with an explicitly provided exception source
///
/// Fails fast with `InvalidConfig` before any raise if the configuration
/// is rejected, and with `CapabilityUnavailable` if resident memory cannot
/// be read on this host.
pub fn run_trial(
    config: &TrialConfig,
    source: &mut RaiseSource,
    style: ProgressStyle,
) -> Result<TrialResult> {
    config.validate()?;
    let probe = MemoryProbe::new()?;

    info!(
        mode = %config.mode,
        iterations = config.iterations,
        payload_kb = config.payload_kb,
        sample_interval = config.sample_interval,
        "starting trial"
    );

    probe.collect();
    let mut tracker = MemoryTracker::start(config.mode.label(), probe);
    let mut last_catch = CatchReport {
        retained_contexts: 0,
        retained_frames: 0,
    };
    let mut baseline_bytes: Option<u64> = None;

    for i in 1..=config.iterations {
        // The call chain always raises; a fresh instance (factory mode) is
        // dropped when `raised` leaves this scope, releasing its context,
        // while the reused instance keeps everything.
        if let Err(raised) = level1(source, config.payload_kb) {
            last_catch = source.observe(&raised);
            if config.is_sample_boundary(i) {
                let sample = tracker.record(i)?;
                let baseline = *baseline_bytes.get_or_insert(sample.resident_bytes);
                match style {
                    ProgressStyle::FrameCount => println!(
                        "Raise #{}: Traceback frame count = {}, Memory usage = {} KB",
                        i,
                        last_catch.retained_frames,
                        sample.resident_bytes / 1024
                    ),
                    ProgressStyle::Growth => println!(
                        "Iteration {}/{}: Memory usage = {} (+{})",
                        i,
                        config.iterations,
                        format_memory(sample.resident_bytes as f64),
                        format_memory(sample.resident_bytes.saturating_sub(baseline) as f64)
                    ),
                    ProgressStyle::Silent => {}
                }
            }
        }
    }

    let elapsed_secs = tracker.elapsed_secs();
    let samples = tracker.into_samples();
    let result = TrialResult {
        label: config.mode.label().to_string(),
        config: *config,
        retained_contexts: last_catch.retained_contexts,
        retained_frames: last_catch.retained_frames,
        total_growth_bytes: total_growth_bytes(&samples),
        growth_rate_mb_per_sec: growth_rate_mb_per_sec(&samples),
        elapsed_secs,
        samples,
    };

    debug!(
        label = %result.label,
        samples = result.samples.len(),
        retained_contexts = result.retained_contexts,
        total_growth_bytes = result.total_growth_bytes,
        "trial complete"
    );
    Ok(result)
}

/// Run one trial, building the exception source from the configured mode
pub fn run_mode(config: &TrialConfig, style: ProgressStyle) -> Result<TrialResult> {
    let mut source = RaiseSource::for_mode(config.mode);
    run_trial(config, &mut source, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LetheError;
    use crate::types::RaiseMode;

    fn small_config(mode: RaiseMode) -> TrialConfig {
        TrialConfig {
            iterations: 10,
            mode,
            payload_kb: 1,
            sample_interval: 3,
        }
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_singleton_trial_samples_and_retention() {
        let config = small_config(RaiseMode::Singleton);
        let result = run_mode(&config, ProgressStyle::Silent).unwrap();

        // Boundaries: 1, 3, 6, 9, 10
        assert_eq!(result.samples.len(), 5);
        assert_eq!(result.samples[0].iteration, 1);
        assert_eq!(result.samples.last().unwrap().iteration, 10);
        assert_eq!(result.retained_contexts, 10);
        assert_eq!(result.retained_frames, 30);
        assert_eq!(result.label, "singleton");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_factory_trial_steady_state() {
        let config = small_config(RaiseMode::Factory);
        let result = run_mode(&config, ProgressStyle::Silent).unwrap();

        assert_eq!(result.retained_contexts, 1);
        assert_eq!(result.retained_frames, 3);
        assert_eq!(result.label, "factory");
    }

    #[test]
    fn test_invalid_config_rejected_before_any_raise() {
        let config = TrialConfig {
            iterations: 0,
            mode: RaiseMode::Singleton,
            payload_kb: 1,
            sample_interval: 3,
        };
        let mut source = RaiseSource::for_mode(RaiseMode::Singleton);
        let err = run_trial(&config, &mut source, ProgressStyle::Silent).unwrap_err();
        assert!(matches!(err, LetheError::InvalidConfig(_)));
        // No raise happened: the singleton retained nothing
        assert_eq!(source.retained().retained_contexts, 0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_single_iteration_records_one_sample_with_zero_growth() {
        let config = TrialConfig {
            iterations: 1,
            mode: RaiseMode::Factory,
            payload_kb: 1,
            sample_interval: 100,
        };
        let result = run_mode(&config, ProgressStyle::Silent).unwrap();
        assert_eq!(result.samples.len(), 1);
        assert_eq!(result.total_growth_bytes, 0);
    }
}
