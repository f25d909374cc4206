//! qsweep Sampler Abstraction Layer
//!
//! This crate provides a uniform interface to samplers of binary quadratic
//! models, so that a hardware annealer and a local heuristic are
//! interchangeable behind the experiment code.
//!
//! # Overview
//!
//! - A common [`Sampler`] trait with forward and reverse modes
//! - [`Capabilities`] describing model size, read and schedule limits
//! - [`AnnealSchedule`] for validated piecewise-linear reverse schedules
//! - [`SampleSet`] batches with a contract check ([`SampleSet::check`])
//! - A [`SamplerRegistry`] to create samplers by name
//!
//! # Samplers
//!
//! | Sampler | Crate | Authentication |
//! |---------|-------|----------------|
//! | Simulated annealing | `qsweep-adapter-sim` | None |
//! | Exact enumeration | `qsweep-adapter-sim` | None |
//! | Remote annealer | `qsweep-adapter-remote` | `QSWEEP_REMOTE_TOKEN` env var |
//!
//! # Example: Forward then Reverse
//!
//! ```ignore
//! use qsweep_hal::{AnnealSchedule, BatchPolicy, ReverseAnneal, SampleRequest, Sampler};
//! use qsweep_adapter_sim::SimulatedAnnealingSampler;
//! use qsweep_model::{ProblemWeights, build_model};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = build_model(3, 5, &ProblemWeights::default())?;
//!     let sampler = SimulatedAnnealingSampler::new();
//!
//!     let forward = sampler
//!         .run(&model, &SampleRequest::forward(100), BatchPolicy::Strict)
//!         .await?;
//!     let seed = forward.lowest().expect("non-empty batch").state.clone();
//!
//!     let schedule = AnnealSchedule::reverse(0.45, 2.0, 6.0)?;
//!     let reverse = sampler
//!         .run(
//!             &model,
//!             &SampleRequest::reverse(100, ReverseAnneal::new(schedule, seed)),
//!             BatchPolicy::Strict,
//!         )
//!         .await?;
//!     println!("lowest reverse energy: {:?}", reverse.lowest_energy());
//!     Ok(())
//! }
//! ```

pub mod capability;
pub mod error;
pub mod registry;
pub mod request;
pub mod sample;
pub mod sampler;
pub mod schedule;

pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use registry::{SamplerRegistry, SharedSamplerFactory};
pub use request::{AnnealMode, ReverseAnneal, SampleRequest, SamplingMode};
pub use sample::{Sample, SampleInfo, SampleSet};
pub use sampler::{
    BatchPolicy, Sampler, SamplerAvailability, SamplerConfig, SamplerFactory, ValidationResult,
    check_request,
};
pub use schedule::AnnealSchedule;
