//! Exhaustive ground-state solver.
//!
//! Walks all `2^n` states in Gray-code order, so each step flips a single
//! variable and costs one neighbour update. Candidate minima are re-scored
//! with [`BinaryQuadraticModel::energy`] at the end, so reported energies do
//! not carry the drift of the running sum.

use async_trait::async_trait;
use tracing::{debug, instrument};

use qsweep_hal::{
    Capabilities, HalError, HalResult, Sample, SampleInfo, SampleRequest, SampleSet, Sampler,
    SamplerAvailability, SamplerConfig, SamplerFactory,
};
use qsweep_model::BinaryQuadraticModel;

use crate::anneal::{Couplings, Walker};

/// Registered name of the exact sampler.
pub const EXACT: &str = "exact";

/// Largest model the exact sampler will enumerate.
pub const MAX_EXACT_VARIABLES: usize = 24;

/// Slack for keeping candidates while the running energy drifts.
const CANDIDATE_SLACK: f64 = 1e-6;

/// Degenerate ground-state set of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundStates {
    /// Minimum energy.
    pub energy: f64,
    /// Every state at the minimum, ordered by their index read as a binary
    /// number with variable 0 as the least significant bit.
    pub states: Vec<Vec<u8>>,
}

/// Enumerate every state of `model` and return its ground states.
///
/// `tolerance` decides which states count as degenerate with the minimum.
pub fn ground_states(model: &BinaryQuadraticModel, tolerance: f64) -> HalResult<GroundStates> {
    let n = model.num_variables();
    if n > MAX_EXACT_VARIABLES {
        return Err(HalError::ModelTooLarge(format!(
            "exact enumeration supports at most {MAX_EXACT_VARIABLES} variables, model has {n}"
        )));
    }

    let couplings = Couplings::from_model(model);
    let mut walker = Walker::new(&couplings, vec![0; n]);
    let mut running = model.offset();
    let mut best = running;
    let mut candidates: Vec<(f64, u64)> = vec![(running, 0)];
    let mut code: u64 = 0;

    for k in 1..(1u64 << n) {
        let bit = k.trailing_zeros() as usize;
        running += walker.delta(bit);
        walker.flip(&couplings, bit);
        code ^= 1 << bit;

        if running < best + CANDIDATE_SLACK {
            if running < best {
                best = running;
                candidates.retain(|(e, _)| *e < best + CANDIDATE_SLACK);
            }
            candidates.push((running, code));
        }
    }

    let scored = candidates
        .into_iter()
        .map(|(_, code)| {
            let state = decode(code, n);
            model.energy(&state).map(|e| (e, code, state))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let energy = scored
        .iter()
        .map(|(e, _, _)| *e)
        .fold(f64::INFINITY, f64::min);
    let mut ground: Vec<(u64, Vec<u8>)> = scored
        .into_iter()
        .filter(|(e, _, _)| (e - energy).abs() < tolerance.max(0.0) || *e == energy)
        .map(|(_, code, state)| (code, state))
        .collect();
    ground.sort_by_key(|(code, _)| *code);

    debug!("{} ground states at energy {}", ground.len(), energy);
    Ok(GroundStates {
        energy,
        states: ground.into_iter().map(|(_, s)| s).collect(),
    })
}

fn decode(code: u64, n: usize) -> Vec<u8> {
    (0..n).map(|i| ((code >> i) & 1) as u8).collect()
}

/// Ideal sampler: every read is a true ground state.
///
/// Reads cycle through the degenerate ground states in order. Reverse
/// requests are validated like any other but the schedule does not change
/// the outcome.
pub struct ExactSampler {
    capabilities: Capabilities,
    tolerance: f64,
}

impl ExactSampler {
    /// Create an exact sampler with a `1e-9` degeneracy tolerance.
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities::simulator(EXACT, MAX_EXACT_VARIABLES),
            tolerance: 1e-9,
        }
    }

    /// Set the degeneracy tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for ExactSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerFactory for ExactSampler {
    fn from_config(config: SamplerConfig) -> HalResult<Self> {
        let mut sampler = Self::new();
        if let Some(tolerance) = config.extra_f64("tolerance")? {
            sampler = sampler.with_tolerance(tolerance);
        }
        Ok(sampler)
    }
}

#[async_trait]
impl Sampler for ExactSampler {
    fn name(&self) -> &str {
        EXACT
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<SamplerAvailability> {
        Ok(SamplerAvailability::always_available())
    }

    #[instrument(skip(self, model, request), fields(reads = request.num_reads))]
    async fn sample(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<SampleSet> {
        if request.num_reads == 0 {
            return Err(HalError::InvalidReads("num_reads must be at least 1".into()));
        }
        let owned = model.clone();
        let tolerance = self.tolerance;
        let ground = tokio::task::spawn_blocking(move || ground_states(&owned, tolerance))
            .await
            .map_err(|e| HalError::Backend(format!("enumeration task failed: {e}")))??;

        let samples = ground
            .states
            .iter()
            .cycle()
            .take(request.num_reads as usize)
            .map(|state| Sample::evaluate(model, state.clone()))
            .collect::<HalResult<Vec<_>>>()?;
        Ok(SampleSet::new(samples, SampleInfo::new(EXACT)))
    }
}
