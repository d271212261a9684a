//! Artifact round-trips for trial CSVs and the comparison JSON

use lethe_core::{
    report::{write_comparison_json, write_trial_csv},
    RaiseMode, Sample, TrialConfig, TrialResult,
};
use tempfile::TempDir;

fn result_with_samples(label: &str, count: u64) -> TrialResult {
    let samples: Vec<Sample> = (1..=count)
        .map(|i| Sample {
            iteration: i,
            elapsed_secs: i as f64 * 0.1,
            resident_bytes: 1_000_000 + i * 250_000,
        })
        .collect();
    TrialResult {
        label: label.to_string(),
        config: TrialConfig {
            iterations: count,
            mode: if label == "singleton" {
                RaiseMode::Singleton
            } else {
                RaiseMode::Factory
            },
            payload_kb: 100,
            sample_interval: 1,
        },
        retained_contexts: count as usize,
        retained_frames: count as usize * 3,
        total_growth_bytes: ((count - 1) * 250_000) as i64,
        growth_rate_mb_per_sec: 0.5,
        elapsed_secs: count as f64 * 0.1,
        samples,
    }
}

#[test]
fn trial_csv_written_with_header_and_all_rows() {
    let dir = TempDir::new().unwrap();
    let result = result_with_samples("singleton", 5);

    let path = write_trial_csv(dir.path(), &result).unwrap();
    assert!(path.exists());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("memory_usage_singleton_"));
    assert!(name.ends_with(".csv"));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "iteration,elapsed_secs,memory_mb");
    for (row, sample) in lines[1..].iter().zip(&result.samples) {
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].parse::<u64>().unwrap(), sample.iteration);
    }
}

#[test]
fn comparison_json_embeds_both_series_and_rate_difference() {
    let dir = TempDir::new().unwrap();
    let singleton = result_with_samples("singleton", 4);
    let mut factory = result_with_samples("factory", 4);
    factory.growth_rate_mb_per_sec = 0.1;

    let path = write_comparison_json(dir.path(), &singleton, &factory).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(doc["singleton"]["label"], "singleton");
    assert_eq!(doc["factory"]["label"], "factory");
    assert_eq!(doc["singleton"]["samples"].as_array().unwrap().len(), 4);
    assert_eq!(doc["factory"]["config"]["mode"], "factory");
    let diff = doc["rate_difference_mb_per_sec"].as_f64().unwrap();
    assert!((diff - 0.4).abs() < 1e-9);
    assert!(doc["generated_at"].is_string());
}

#[test]
fn artifact_directory_created_on_demand() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("out").join("run1");
    assert!(!nested.exists());

    let result = result_with_samples("factory", 2);
    let path = write_trial_csv(&nested, &result).unwrap();
    assert!(nested.is_dir());
    assert!(path.exists());
}
