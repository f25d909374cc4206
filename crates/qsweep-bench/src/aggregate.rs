//! Per-grid-point statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use qsweep_hal::SamplingMode;

use crate::config::GridPoint;
use crate::error::{BenchError, BenchResult};

/// Summary statistics of a trial sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
    /// Smallest trial value.
    pub min: f64,
    /// Largest trial value.
    pub max: f64,
    /// Number of trials.
    pub count: usize,
}

impl Statistics {
    /// Statistics of `values`, `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: values.len(),
        })
    }
}

/// Statistics per grid point for one mode.
///
/// Every point must have at least one trial.
pub fn aggregate(
    per_point: &BTreeMap<GridPoint, Vec<f64>>,
    mode: SamplingMode,
) -> BenchResult<BTreeMap<GridPoint, Statistics>> {
    per_point
        .iter()
        .map(|(&point, values)| {
            Statistics::from_values(values)
                .map(|stats| (point, stats))
                .ok_or(BenchError::EmptyTrials {
                    agents: point.agents,
                    slots: point.slots,
                    mode,
                })
        })
        .collect()
}

/// Forward and reverse statistics of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    /// Forward success-probability statistics per grid point.
    pub forward: BTreeMap<GridPoint, Statistics>,
    /// Reverse success-probability statistics per grid point.
    pub reverse: BTreeMap<GridPoint, Statistics>,
}

impl SweepSummary {
    /// Statistics for `mode`.
    pub fn mode(&self, mode: SamplingMode) -> &BTreeMap<GridPoint, Statistics> {
        match mode {
            SamplingMode::Forward => &self.forward,
            SamplingMode::Reverse => &self.reverse,
        }
    }

    /// Statistics for one point and mode.
    pub fn get(&self, point: GridPoint, mode: SamplingMode) -> Option<&Statistics> {
        self.mode(mode).get(&point)
    }
}
