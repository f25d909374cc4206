//! qsweep Sweep Engine
//!
//! Compares forward and reverse annealing on the agent-to-slot assignment
//! problem over a grid of `(agents, slots)` sizes.
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Immutable experiment configuration, YAML/JSON loading |
//! | [`estimator`] | Ground-state probability of one batch |
//! | [`orchestrator`] | Worker-pool sweep, per-repetition reverse seeding |
//! | [`aggregate`] | Mean and population standard deviation per point |
//! | [`report`] | Persisted sweep report |
//!
//! # Example
//!
//! ```ignore
//! use qsweep_adapter_sim::register_local_samplers;
//! use qsweep_bench::{ExperimentConfig, Orchestrator};
//! use qsweep_hal::SamplerRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExperimentConfig::default();
//!     let mut registry = SamplerRegistry::new();
//!     register_local_samplers(&mut registry);
//!     let factory = registry.shared_factory(config.sampler.to_sampler_config())?;
//!
//!     let outcome = Orchestrator::new(config, factory)?.run().await?;
//!     let summary = outcome.summarize()?;
//!     for (point, stats) in &summary.reverse {
//!         println!("{point}: {:.1} ± {:.1}", stats.mean, stats.std_dev);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod estimator;
pub mod orchestrator;
pub mod report;

pub use aggregate::{Statistics, SweepSummary, aggregate};
pub use config::{ExperimentConfig, GridPoint, SamplerSettings, SeedSelection, SlotRange};
pub use error::{BenchError, BenchResult};
pub use estimator::{DEFAULT_TOLERANCE, GroundStateEstimate, probability};
pub use orchestrator::{
    Orchestrator, PairOutcome, SweepOutcome, TrialResult, pair_seed, run_pair, select_seed,
};
pub use report::{REPORT_SCHEMA_VERSION, ReportRow, SweepReport};
