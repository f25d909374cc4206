//! Sample batches returned by samplers.

use serde::{Deserialize, Serialize};
use tracing::warn;

use qsweep_model::BinaryQuadraticModel;

use crate::error::{HalError, HalResult};

/// One assignment of 0/1 to every model variable, with its energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Variable values in model index order.
    pub state: Vec<u8>,
    /// Energy of `state` under the sampled model.
    pub energy: f64,
}

impl Sample {
    /// Create a sample.
    pub fn new(state: Vec<u8>, energy: f64) -> Self {
        Self { state, energy }
    }

    /// Evaluate `state` under `model`.
    pub fn evaluate(model: &BinaryQuadraticModel, state: Vec<u8>) -> HalResult<Self> {
        let energy = model.energy(&state)?;
        Ok(Self { state, energy })
    }
}

/// Metadata about how a batch was produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleInfo {
    /// Name of the sampler that produced the batch.
    pub sampler: String,
    /// Backend job identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Wall-clock time spent sampling, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl SampleInfo {
    /// Metadata naming the producing sampler.
    pub fn new(sampler: impl Into<String>) -> Self {
        Self {
            sampler: sampler.into(),
            job_id: None,
            elapsed_ms: None,
        }
    }

    /// Attach a backend job identifier.
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    /// Attach the elapsed time.
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }
}

/// Ordered batch of samples from one sampling call. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
    info: SampleInfo,
}

impl SampleSet {
    /// Wrap a batch.
    pub fn new(samples: Vec<Sample>, info: SampleInfo) -> Self {
        Self { samples, info }
    }

    /// Build a batch by evaluating raw states under `model`.
    pub fn from_states(
        model: &BinaryQuadraticModel,
        states: impl IntoIterator<Item = Vec<u8>>,
        info: SampleInfo,
    ) -> HalResult<Self> {
        let samples = states
            .into_iter()
            .map(|s| Sample::evaluate(model, s))
            .collect::<HalResult<Vec<_>>>()?;
        Ok(Self { samples, info })
    }

    /// The samples, in the order the sampler returned them.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume the batch, keeping only the samples.
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Batch metadata.
    pub fn info(&self) -> &SampleInfo {
        &self.info
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample energies in batch order.
    pub fn energies(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.energy)
    }

    /// A sample with the lowest energy (the first one on ties).
    pub fn lowest(&self) -> Option<&Sample> {
        self.samples
            .iter()
            .reduce(|best, s| if s.energy < best.energy { s } else { best })
    }

    /// The lowest energy in the batch.
    pub fn lowest_energy(&self) -> Option<f64> {
        self.lowest().map(|s| s.energy)
    }

    /// Check the batch against the sampling contract.
    ///
    /// Every state must have `num_variables` binary entries and a finite
    /// energy. More samples than `requested` is always malformed; fewer is
    /// malformed when `strict`, otherwise logged.
    pub fn check(&self, num_variables: usize, requested: u32, strict: bool) -> HalResult<()> {
        for (i, sample) in self.samples.iter().enumerate() {
            if sample.state.len() != num_variables {
                return Err(HalError::MalformedBatch(format!(
                    "sample {i} has {} values, model has {num_variables} variables",
                    sample.state.len()
                )));
            }
            if sample.state.iter().any(|&v| v > 1) {
                return Err(HalError::MalformedBatch(format!(
                    "sample {i} contains a non-binary value"
                )));
            }
            if !sample.energy.is_finite() {
                return Err(HalError::MalformedBatch(format!(
                    "sample {i} has non-finite energy {}",
                    sample.energy
                )));
            }
        }

        let delivered = self.samples.len();
        let requested = requested as usize;
        if delivered > requested {
            return Err(HalError::MalformedBatch(format!(
                "sampler returned {delivered} samples but only {requested} were requested"
            )));
        }
        if delivered < requested {
            if strict {
                return Err(HalError::MalformedBatch(format!(
                    "sampler returned {delivered} of {requested} requested samples"
                )));
            }
            warn!(
                "{} under-delivered: {} of {} samples",
                self.info.sampler, delivered, requested
            );
        }
        Ok(())
    }
}
