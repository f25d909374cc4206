//! Grid sweep orchestration.
//!
//! Every `(N, D)` grid point is one task on a bounded worker pool. A task
//! builds its own sampler session and runs all repetitions of its point in
//! order:
//!
//! ```text
//!   for i in 0..repetitions:
//!       model   = build_model(N, D, weights)
//!       fwd_i   = sampler.forward(model)             → probability
//!       seed_i  = pick(fwd_i)                        (uniform by default)
//!       rev_i   = sampler.reverse(model, seed_i)     → probability
//! ```
//!
//! Results come back tagged with their grid point and are merged into a
//! `BTreeMap` only after every task has returned, so completion order never
//! matters. All randomness of a point comes from a seed derived from the
//! base seed and `(N, D)`, which makes a seeded sweep reproducible
//! regardless of how the tasks interleave.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use qsweep_hal::{
    BatchPolicy, HalError, ReverseAnneal, SampleRequest, SampleSet, Sampler, SamplingMode,
    SharedSamplerFactory,
};
use qsweep_model::build_model;

use crate::aggregate::{SweepSummary, aggregate};
use crate::config::{ExperimentConfig, GridPoint, SeedSelection};
use crate::error::{BenchError, BenchResult};
use crate::estimator::GroundStateEstimate;

/// Outcome of one sampling call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Repetition index, starting at 0.
    pub repetition: u32,
    /// Ground-state probability in percent.
    pub probability: f64,
    /// Lowest energy in the batch.
    pub min_energy: Option<f64>,
    /// Samples at the lowest energy.
    pub hits: usize,
}

impl TrialResult {
    fn new(repetition: u32, estimate: &GroundStateEstimate) -> Self {
        Self {
            repetition,
            probability: estimate.probability,
            min_energy: estimate.min_energy,
            hits: estimate.hits,
        }
    }
}

/// All trials of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOutcome {
    /// Grid point these trials belong to.
    pub point: GridPoint,
    /// Forward trials in repetition order.
    pub forward: Vec<TrialResult>,
    /// Reverse trials, each seeded from the forward trial of the same
    /// repetition.
    pub reverse: Vec<TrialResult>,
}

impl PairOutcome {
    /// Trials for `mode`.
    pub fn trials(&self, mode: SamplingMode) -> &[TrialResult] {
        match mode {
            SamplingMode::Forward => &self.forward,
            SamplingMode::Reverse => &self.reverse,
        }
    }

    /// Probabilities for `mode`, in repetition order.
    pub fn probabilities(&self, mode: SamplingMode) -> Vec<f64> {
        self.trials(mode).iter().map(|t| t.probability).collect()
    }
}

/// Every grid point's outcome, keyed by point.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Outcomes keyed by grid point.
    pub pairs: BTreeMap<GridPoint, PairOutcome>,
    /// Base seed the per-point seeds were derived from.
    pub base_seed: u64,
    /// Wall-clock time of the whole sweep.
    pub elapsed: Duration,
}

impl SweepOutcome {
    /// Probability sequences per point for `mode`.
    pub fn probabilities(&self, mode: SamplingMode) -> BTreeMap<GridPoint, Vec<f64>> {
        self.pairs
            .iter()
            .map(|(&point, pair)| (point, pair.probabilities(mode)))
            .collect()
    }

    /// Mean and standard deviation per point and mode.
    pub fn summarize(&self) -> BenchResult<SweepSummary> {
        Ok(SweepSummary {
            forward: aggregate(&self.probabilities(SamplingMode::Forward), SamplingMode::Forward)?,
            reverse: aggregate(&self.probabilities(SamplingMode::Reverse), SamplingMode::Reverse)?,
        })
    }
}

/// Seed for one grid point, mixed from the base seed with SplitMix64 so that
/// neighbouring points get unrelated streams.
pub fn pair_seed(base: u64, point: GridPoint) -> u64 {
    let mut z = base
        ^ (point.agents as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (point.slots as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Runs a sweep over the configured grid.
pub struct Orchestrator {
    config: Arc<ExperimentConfig>,
    factory: SharedSamplerFactory,
    show_progress: bool,
}

impl Orchestrator {
    /// Validate `config` and prepare a sweep. Each worker calls `factory`
    /// once for its own sampler session.
    pub fn new(config: ExperimentConfig, factory: SharedSamplerFactory) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            factory,
            show_progress: false,
        })
    }

    /// Show a progress bar advancing once per finished grid point.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every grid point and merge the results by key.
    ///
    /// Waits for all tasks before reporting. The first failed point in grid
    /// order is returned as [`BenchError::PairFailed`]; every failure is
    /// logged.
    pub async fn run(&self) -> BenchResult<SweepOutcome> {
        let start = Instant::now();
        let grid = self.config.grid();
        let base_seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().r#gen());
        info!(
            "Sweeping {} grid points on {} workers ({} repetitions x {} reads)",
            grid.len(),
            self.config.workers,
            self.config.repetitions,
            self.config.num_reads
        );

        let progress = self.progress_bar(grid.len() as u64);
        let pool = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = JoinSet::new();
        for point in grid {
            let config = Arc::clone(&self.config);
            let factory = Arc::clone(&self.factory);
            let pool = Arc::clone(&pool);
            let seed = pair_seed(base_seed, point);
            tasks.spawn(async move {
                let result = pair_task(config, factory, pool, point, seed).await;
                (point, result)
            });
        }

        let mut pairs = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let mut panics = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((point, Ok(outcome))) => {
                    if pairs.insert(point, outcome).is_some() {
                        return Err(BenchError::DuplicateResult {
                            agents: point.agents,
                            slots: point.slots,
                        });
                    }
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                }
                Ok((point, Err(e))) => {
                    error!("Pair {} failed: {}", point, e);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    failures.insert(point, e);
                }
                Err(e) => {
                    error!("Worker task failed: {}", e);
                    panics.push(e.to_string());
                }
            }
        }
        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        if let Some(message) = panics.into_iter().next() {
            return Err(BenchError::WorkerPanicked(message));
        }
        if let Some((point, source)) = failures.into_iter().next() {
            return Err(BenchError::PairFailed {
                agents: point.agents,
                slots: point.slots,
                source: Box::new(source),
            });
        }

        let elapsed = start.elapsed();
        info!("Sweep finished in {:?}", elapsed);
        Ok(SweepOutcome {
            pairs,
            base_seed,
            elapsed,
        })
    }

    fn progress_bar(&self, len: u64) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("grid points");
        Some(pb)
    }
}

async fn pair_task(
    config: Arc<ExperimentConfig>,
    factory: SharedSamplerFactory,
    pool: Arc<Semaphore>,
    point: GridPoint,
    seed: u64,
) -> BenchResult<PairOutcome> {
    let _permit = pool
        .acquire_owned()
        .await
        .map_err(|e| BenchError::Config(format!("worker pool closed: {e}")))?;
    let sampler = factory()?;
    run_pair(&config, sampler.as_ref(), point, seed).await
}

/// Run every repetition of one grid point on `sampler`.
///
/// Repetition `i`'s reverse call is seeded from repetition `i`'s forward
/// batch. Any sampler error aborts the point.
#[instrument(skip(config, sampler), fields(point = %point))]
pub async fn run_pair(
    config: &ExperimentConfig,
    sampler: &dyn Sampler,
    point: GridPoint,
    seed: u64,
) -> BenchResult<PairOutcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let policy = if config.strict_batch_size {
        BatchPolicy::Strict
    } else {
        BatchPolicy::AllowShort
    };
    let reps = config.repetitions as usize;
    let mut forward = Vec::with_capacity(reps);
    let mut reverse = Vec::with_capacity(reps);

    for repetition in 0..config.repetitions {
        let model = build_model(point.agents, point.slots, &config.weights)?;

        let request = SampleRequest::forward(config.num_reads).with_seed(rng.r#gen());
        let batch = sampler.run(&model, &request, policy).await?;
        let forward_estimate = estimate_batch(&batch, config)?;
        forward.push(TrialResult::new(repetition, &forward_estimate));

        let initial_state = select_seed(&batch, config.seed_selection, &mut rng)?;
        let params = ReverseAnneal::new(config.schedule.clone(), initial_state)
            .with_reinitialize_state(config.reinitialize_state);
        let request = SampleRequest::reverse(config.num_reads, params).with_seed(rng.r#gen());
        let batch = sampler.run(&model, &request, policy).await?;
        let reverse_estimate = estimate_batch(&batch, config)?;
        reverse.push(TrialResult::new(repetition, &reverse_estimate));

        debug!(
            "repetition {}: forward {:.1}%, reverse {:.1}%",
            repetition, forward_estimate.probability, reverse_estimate.probability
        );
    }

    info!("Pair {} done on {}", point, sampler.name());
    Ok(PairOutcome {
        point,
        forward,
        reverse,
    })
}

fn estimate_batch(batch: &SampleSet, config: &ExperimentConfig) -> BenchResult<GroundStateEstimate> {
    let estimate =
        GroundStateEstimate::from_samples(batch.samples(), config.num_reads, config.tolerance)?;
    if estimate.is_short() {
        warn!(
            "Sampler delivered {} of {} reads",
            estimate.delivered, estimate.requested
        );
    }
    Ok(estimate)
}

/// Pick the reverse seed state from a forward batch.
pub fn select_seed(
    batch: &SampleSet,
    selection: SeedSelection,
    rng: &mut StdRng,
) -> BenchResult<Vec<u8>> {
    let chosen = match selection {
        SeedSelection::Uniform => batch.samples().choose(rng),
        SeedSelection::LowestEnergy => batch.lowest(),
    };
    chosen.map(|s| s.state.clone()).ok_or_else(|| {
        BenchError::Sampler(HalError::MalformedBatch(
            "forward batch is empty, no reverse seed to draw".into(),
        ))
    })
}
