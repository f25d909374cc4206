//! Sweep reports.
//!
//! A [`SweepReport`] is the persisted form of a sweep: the configuration it
//! ran with, and one row per grid point and mode with the statistics and
//! the raw trial probabilities.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qsweep_hal::SamplingMode;

use crate::aggregate::SweepSummary;
use crate::config::{ExperimentConfig, GridPoint};
use crate::error::{BenchError, BenchResult};
use crate::orchestrator::SweepOutcome;

/// Report format version.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// One grid point in one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub agents: usize,
    pub slots: usize,
    pub mode: SamplingMode,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Per-repetition probabilities.
    pub trials: Vec<f64>,
}

impl ReportRow {
    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.agents, self.slots)
    }
}

/// Persisted result of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    /// Name of the sampler that produced the samples.
    pub sampler: String,
    /// Base seed, so the sweep can be replayed.
    pub base_seed: u64,
    pub elapsed_ms: u64,
    pub config: ExperimentConfig,
    /// Rows ordered by grid point, forward before reverse.
    pub rows: Vec<ReportRow>,
}

impl SweepReport {
    /// Build a report from a finished sweep and its summary.
    pub fn new(
        config: &ExperimentConfig,
        sampler: impl Into<String>,
        outcome: &SweepOutcome,
        summary: &SweepSummary,
    ) -> BenchResult<Self> {
        let mut rows = Vec::with_capacity(outcome.pairs.len() * 2);
        for (&point, pair) in &outcome.pairs {
            for mode in [SamplingMode::Forward, SamplingMode::Reverse] {
                let stats = summary.get(point, mode).ok_or(BenchError::EmptyTrials {
                    agents: point.agents,
                    slots: point.slots,
                    mode,
                })?;
                rows.push(ReportRow {
                    agents: point.agents,
                    slots: point.slots,
                    mode,
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                    min: stats.min,
                    max: stats.max,
                    trials: pair.probabilities(mode),
                });
            }
        }

        Ok(Self {
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at: Utc::now(),
            sampler: sampler.into(),
            base_seed: outcome.base_seed,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            config: config.clone(),
            rows,
        })
    }

    /// Rows for one mode.
    pub fn rows_for(&self, mode: SamplingMode) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |r| r.mode == mode)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> BenchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> BenchResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a report written by [`SweepReport::save`].
    pub fn load(path: impl AsRef<Path>) -> BenchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&text)?;
        if report.schema_version != REPORT_SCHEMA_VERSION {
            return Err(BenchError::Config(format!(
                "unsupported report schema version {}",
                report.schema_version
            )));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{PairOutcome, TrialResult};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn outcome() -> SweepOutcome {
        let trial = |repetition, probability| TrialResult {
            repetition,
            probability,
            min_energy: Some(0.6),
            hits: 1,
        };
        let mut pairs = BTreeMap::new();
        for point in [GridPoint::new(3, 4), GridPoint::new(3, 3)] {
            pairs.insert(
                point,
                PairOutcome {
                    point,
                    forward: vec![trial(0, 100.0), trial(1, 80.0), trial(2, 90.0)],
                    reverse: vec![trial(0, 90.0), trial(1, 90.0), trial(2, 90.0)],
                },
            );
        }
        SweepOutcome {
            pairs,
            base_seed: 42,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_rows_follow_grid_order() {
        let outcome = outcome();
        let summary = outcome.summarize().unwrap();
        let report = SweepReport::new(
            &ExperimentConfig::default(),
            "exact",
            &outcome,
            &summary,
        )
        .unwrap();
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].point(), GridPoint::new(3, 3));
        assert_eq!(report.rows[0].mode, SamplingMode::Forward);
        assert_eq!(report.rows[1].mode, SamplingMode::Reverse);
        assert_eq!(report.rows[2].point(), GridPoint::new(3, 4));
        assert_eq!(report.rows_for(SamplingMode::Reverse).count(), 2);
        assert_eq!(report.rows[0].trials, vec![100.0, 80.0, 90.0]);
        assert!((report.rows[0].mean - 90.0).abs() < 1e-12);
        assert_eq!(report.elapsed_ms, 1500);
        assert_eq!(report.base_seed, 42);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let outcome = outcome();
        let summary = outcome.summarize().unwrap();
        let report =
            SweepReport::new(&ExperimentConfig::default(), "exact", &outcome, &summary).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save(&path).unwrap();
        let loaded = SweepReport::load(&path).unwrap();
        assert_eq!(loaded.rows.len(), report.rows.len());
        for (a, b) in loaded.rows.iter().zip(&report.rows) {
            assert_eq!(a.point(), b.point());
            assert_eq!(a.mode, b.mode);
            assert_eq!(a.trials, b.trials);
            assert!((a.std_dev - b.std_dev).abs() < 1e-12);
        }
        assert_eq!(loaded.sampler, "exact");
        assert_eq!(loaded.config.schedule, report.config.schedule);

        let json = report.to_json().unwrap();
        assert!(json.contains(r#""mode": "forward""#));
    }
}
