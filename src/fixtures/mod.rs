//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers recorded accelerometer fixtures, decodes them through
//! the ingest adapters, parses optional expectation JSON, and runs the
//! analysis pipeline so CI can compare reports against known-good values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisReport, MetricKind, SampleSeries, VibrationAnalyzer};
use crate::config::{AnalysisConfig, AppConfig};
use crate::ingest;

/// Default location for fixture CSV/JSON assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Recording extensions recognised as fixtures.
const FIXTURE_EXTENSIONS: [&str; 3] = ["csv", "tsv", "json"];

/// Metadata describing an available fixture.
#[derive(Clone, Debug)]
pub struct FixtureMetadata {
    pub name: String,
    pub data_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Loaded fixture data with the decoded series.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub series: SampleSeries,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureExpectations {
    pub fixture: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Analysis settings the expectations were recorded with
    #[serde(default)]
    pub config: Option<AnalysisConfig>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub record_count: Option<usize>,
    #[serde(default)]
    pub records: Vec<ExpectedRecord>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Expected metric values for the record at `index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedRecord {
    pub index: usize,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub values: BTreeMap<MetricKind, f64>,
}

fn default_tolerance() -> f64 {
    1e-6
}

impl FixtureExpectations {
    pub fn verify(&self, actual: &AnalysisReport) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();
        let mut check = |field: String, expected: f64, actual: Option<f64>| {
            let delta = actual.map(|value| (value - expected).abs());
            if !delta.is_some_and(|d| d <= self.tolerance) {
                failures.push(ExpectationFailure {
                    field,
                    expected,
                    actual,
                    delta,
                });
            }
        };

        if let Some(rate) = self.rate {
            check("rate".to_string(), rate, Some(actual.rate));
        }
        if let Some(count) = self.record_count {
            check(
                "record_count".to_string(),
                count as f64,
                Some(actual.records.len() as f64),
            );
        }

        for expected in &self.records {
            let record = actual.records.get(expected.index);
            if let Some(time) = expected.time {
                check(
                    format!("records[{}].time", expected.index),
                    time,
                    record.map(|r| r.time),
                );
            }
            for (kind, value) in &expected.values {
                check(
                    format!("records[{}].{}", expected.index, kind),
                    *value,
                    record.and_then(|r| r.get(*kind)),
                );
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing actual results with expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failures": self.failures.iter().map(|failure| {
                serde_json::json!({
                    "field": failure.field,
                    "expected": failure.expected,
                    "actual": failure.actual,
                    "delta": failure.delta,
                })
            }).collect::<Vec<_>>()
        })
    }
}

/// Detailed diff entry for a single failure.
#[derive(Debug)]
pub struct ExpectationFailure {
    pub field: String,
    pub expected: f64,
    pub actual: Option<f64>,
    pub delta: Option<f64>,
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_fixture_recording(&path) {
                fixtures.push(self.metadata_for_path(&path)?);
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture series + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>) -> Result<FixtureData> {
        let data_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&data_path)?;
        let series = ingest::read_series(&data_path, &AppConfig::default().ingest)
            .with_context(|| format!("decoding fixture {}", data_path.display()))?;

        let expectation_path = override_expect.or(metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("reading expectation {}", path.display()))?;
                Some(
                    serde_json::from_str(&json)
                        .with_context(|| format!("parsing {}", path.display()))?,
                )
            }
            None => None,
        };

        Ok(FixtureData {
            metadata,
            series,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        FIXTURE_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{fixture}.{ext}")))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| {
                anyhow!(
                    "Fixture '{fixture}' not found in {}",
                    self.root.display()
                )
            })
    }

    fn metadata_for_path(&self, data_path: &Path) -> Result<FixtureMetadata> {
        let name = data_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", data_path.display()))?
            .to_string();
        let expect_path = data_path.with_file_name(format!("{name}.expect.json"));
        Ok(FixtureMetadata {
            name,
            data_path: data_path.to_path_buf(),
            expect_path: expect_path.exists().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// `.expect.json` files share the directory but are not recordings.
fn is_fixture_recording(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if file_name.ends_with(".expect.json") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FIXTURE_EXTENSIONS.contains(&ext))
}

/// Executes fixtures by feeding decoded series through the analysis pipeline.
pub struct FixtureProcessor {
    analyzer: VibrationAnalyzer,
    config: AnalysisConfig,
}

impl FixtureProcessor {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analyzer: VibrationAnalyzer::new(),
            config,
        }
    }

    /// Settings used for `data`: the expectation's recorded config wins.
    pub fn config_for<'a>(&'a self, data: &'a FixtureData) -> &'a AnalysisConfig {
        data.expectations
            .as_ref()
            .and_then(|expect| expect.config.as_ref())
            .unwrap_or(&self.config)
    }

    pub fn run(&self, data: &FixtureData) -> Result<AnalysisReport> {
        let config = self.config_for(data);
        self.analyzer
            .analyze(&data.series, config)
            .with_context(|| format!("analyzing fixture {}", data.metadata.name))
    }
}
