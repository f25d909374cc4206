//! Ground-state probability estimation.
//!
//! The lowest energy in a batch stands in for the ground energy, since the
//! true minimum is unknown in general. The probability is the share of
//! *requested* reads that landed within `tolerance` of it, so a sampler that
//! under-delivers is penalised rather than rewarded.

use serde::{Deserialize, Serialize};

use qsweep_hal::{HalError, Sample};

use crate::error::{BenchError, BenchResult};

/// Default energy tolerance for counting a sample as a ground-state hit.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// What one batch says about the ground state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundStateEstimate {
    /// Lowest energy in the batch, `None` for an empty batch.
    pub min_energy: Option<f64>,
    /// Samples within tolerance of `min_energy`.
    pub hits: usize,
    /// Samples actually delivered.
    pub delivered: usize,
    /// Reads requested.
    pub requested: u32,
    /// `hits / requested × 100`.
    pub probability: f64,
}

impl GroundStateEstimate {
    /// Estimate from a batch.
    ///
    /// A sample counts when `|energy − min| < tolerance`.
    pub fn from_samples(samples: &[Sample], num_reads: u32, tolerance: f64) -> BenchResult<Self> {
        if num_reads == 0 {
            return Err(BenchError::Config("num_reads must be at least 1".into()));
        }
        if samples.len() > num_reads as usize {
            return Err(BenchError::Sampler(HalError::MalformedBatch(format!(
                "{} samples delivered for {} requested reads",
                samples.len(),
                num_reads
            ))));
        }

        let min_energy = samples.iter().map(|s| s.energy).reduce(f64::min);
        let hits = match min_energy {
            Some(min) => samples
                .iter()
                .filter(|s| (s.energy - min).abs() < tolerance)
                .count(),
            None => 0,
        };

        Ok(Self {
            min_energy,
            hits,
            delivered: samples.len(),
            requested: num_reads,
            probability: hits as f64 / f64::from(num_reads) * 100.0,
        })
    }

    /// Whether the sampler returned fewer samples than requested.
    pub fn is_short(&self) -> bool {
        self.delivered < self.requested as usize
    }
}

/// Percentage of requested reads that hit the batch's lowest energy.
pub fn probability(samples: &[Sample], num_reads: u32, tolerance: f64) -> BenchResult<f64> {
    GroundStateEstimate::from_samples(samples, num_reads, tolerance).map(|e| e.probability)
}
