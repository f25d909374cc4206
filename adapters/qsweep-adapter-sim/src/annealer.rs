//! Simulated-annealing sampler.

use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use qsweep_hal::{
    AnnealMode, Capabilities, HalError, HalResult, ReverseAnneal, Sample, SampleInfo,
    SampleRequest, SampleSet, Sampler, SamplerAvailability, SamplerConfig, SamplerFactory,
};
use qsweep_model::BinaryQuadraticModel;

use crate::anneal::{BetaRange, Couplings, Walker};

/// Registered name of the simulated-annealing sampler.
pub const SIMULATED_ANNEALING: &str = "simulated-annealing";

const DEFAULT_NUM_SWEEPS: usize = 1000;
const DEFAULT_MAX_VARIABLES: usize = 4096;

/// Local simulated-annealing sampler.
///
/// Forward reads start from a uniformly random state and follow a geometric
/// β ramp from hot to cold over `num_sweeps` sweeps. Reverse reads spread
/// the sweeps over the schedule's duration and map the anneal fraction `s`
/// onto the same ramp, so `s = 1` is cold (frozen) and smaller `s` lets the
/// state wander before it re-freezes.
pub struct SimulatedAnnealingSampler {
    name: String,
    capabilities: Capabilities,
    num_sweeps: usize,
    beta_range: Option<BetaRange>,
}

impl SimulatedAnnealingSampler {
    /// Create a sampler with default settings.
    pub fn new() -> Self {
        Self {
            name: SIMULATED_ANNEALING.to_string(),
            capabilities: Capabilities::simulator(SIMULATED_ANNEALING, DEFAULT_MAX_VARIABLES),
            num_sweeps: DEFAULT_NUM_SWEEPS,
            beta_range: None,
        }
    }

    /// Set the number of sweeps per read.
    pub fn with_num_sweeps(mut self, num_sweeps: usize) -> Self {
        self.num_sweeps = num_sweeps.max(1);
        self
    }

    /// Fix the β range instead of deriving it from each model.
    pub fn with_beta_range(mut self, hot: f64, cold: f64) -> Self {
        self.beta_range = Some(BetaRange { hot, cold });
        self
    }

    /// Sweeps per read.
    pub fn num_sweeps(&self) -> usize {
        self.num_sweeps
    }
}

impl Default for SimulatedAnnealingSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerFactory for SimulatedAnnealingSampler {
    /// Recognised settings: `num_sweeps`, `beta_hot` + `beta_cold`,
    /// `max_variables`.
    fn from_config(config: SamplerConfig) -> HalResult<Self> {
        let mut sampler = Self::new();
        if let Some(sweeps) = config.extra_u64("num_sweeps")? {
            if sweeps == 0 {
                return Err(HalError::Configuration("num_sweeps must be at least 1".into()));
            }
            sampler = sampler.with_num_sweeps(sweeps as usize);
        }
        match (config.extra_f64("beta_hot")?, config.extra_f64("beta_cold")?) {
            (Some(hot), Some(cold)) => {
                if !(hot > 0.0 && cold >= hot && cold.is_finite()) {
                    return Err(HalError::Configuration(format!(
                        "beta range must satisfy 0 < beta_hot <= beta_cold, got {hot}..{cold}"
                    )));
                }
                sampler = sampler.with_beta_range(hot, cold);
            }
            (None, None) => {}
            _ => {
                return Err(HalError::Configuration(
                    "beta_hot and beta_cold must be set together".into(),
                ));
            }
        }
        if let Some(max) = config.extra_u64("max_variables")? {
            sampler.capabilities.max_variables = max as usize;
        }
        Ok(sampler)
    }
}

/// Everything the blocking annealing task needs.
struct AnnealJob {
    model: BinaryQuadraticModel,
    num_reads: u32,
    mode: AnnealMode,
    num_sweeps: usize,
    beta_range: Option<BetaRange>,
    seed: u64,
}

impl AnnealJob {
    fn run(self) -> HalResult<Vec<Sample>> {
        let couplings = Couplings::from_model(&self.model);
        let beta = self
            .beta_range
            .unwrap_or_else(|| couplings.default_beta_range());
        let mut rng = StdRng::seed_from_u64(self.seed);
        debug!(
            "annealing {} reads x {} sweeps, beta {:.4}..{:.4}",
            self.num_reads, self.num_sweeps, beta.hot, beta.cold
        );

        let mut samples = Vec::with_capacity(self.num_reads as usize);
        match &self.mode {
            AnnealMode::Forward => {
                let last = (self.num_sweeps - 1).max(1) as f64;
                for _ in 0..self.num_reads {
                    let mut walker = Walker::random(&couplings, &mut rng);
                    for k in 0..self.num_sweeps {
                        walker.sweep(&couplings, beta.at(k as f64 / last), &mut rng);
                    }
                    samples.push(Sample::evaluate(&self.model, walker.into_state())?);
                }
            }
            AnnealMode::Reverse(params) => {
                let duration = params.schedule.duration();
                let mut carried = params.initial_state.clone();
                for _ in 0..self.num_reads {
                    let start = if params.reinitialize_state {
                        params.initial_state.clone()
                    } else {
                        carried
                    };
                    let mut walker = Walker::new(&couplings, start);
                    for k in 0..self.num_sweeps {
                        let t = (k as f64 + 0.5) / self.num_sweeps as f64 * duration;
                        walker.sweep(&couplings, beta.at(params.schedule.s_at(t)), &mut rng);
                    }
                    carried = walker.state().to_vec();
                    samples.push(Sample::evaluate(&self.model, walker.into_state())?);
                }
            }
        }
        Ok(samples)
    }
}

/// Reject requests the kernel cannot run, with specific error kinds.
fn check_runnable(
    caps: &Capabilities,
    model: &BinaryQuadraticModel,
    request: &SampleRequest,
) -> HalResult<()> {
    if request.num_reads == 0 || request.num_reads > caps.max_reads {
        return Err(HalError::InvalidReads(format!(
            "num_reads must be in 1..={}, got {}",
            caps.max_reads, request.num_reads
        )));
    }
    if model.num_variables() > caps.max_variables {
        return Err(HalError::ModelTooLarge(format!(
            "model has {} variables but {} supports at most {}",
            model.num_variables(),
            caps.name,
            caps.max_variables
        )));
    }
    if let AnnealMode::Reverse(ReverseAnneal {
        schedule,
        initial_state,
        ..
    }) = &request.mode
    {
        schedule.validate_reverse()?;
        if initial_state.len() != model.num_variables() || initial_state.iter().any(|&v| v > 1) {
            return Err(HalError::InvalidInitialState(format!(
                "expected {} binary values, got {:?}",
                model.num_variables(),
                initial_state
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Sampler for SimulatedAnnealingSampler {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<SamplerAvailability> {
        Ok(SamplerAvailability::always_available())
    }

    #[instrument(skip(self, model, request), fields(mode = %request.mode.kind(), reads = request.num_reads))]
    async fn sample(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<SampleSet> {
        check_runnable(&self.capabilities, model, request)?;

        let start = Instant::now();
        let job = AnnealJob {
            model: model.clone(),
            num_reads: request.num_reads,
            mode: request.mode.clone(),
            num_sweeps: self.num_sweeps,
            beta_range: self.beta_range,
            seed: request.seed.unwrap_or_else(|| rand::thread_rng().r#gen()),
        };
        let samples = tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| HalError::Backend(format!("annealing task failed: {e}")))??;

        let elapsed = start.elapsed();
        debug!("annealing completed in {:?}", elapsed);
        Ok(SampleSet::new(
            samples,
            SampleInfo::new(&self.name).with_elapsed_ms(elapsed.as_millis() as u64),
        ))
    }
}
