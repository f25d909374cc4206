//! qsweep Local Samplers
//!
//! This crate provides samplers that run in-process, for development,
//! small-scale sweeps and as a reference for hardware results.
//!
//! # Samplers
//!
//! | Name | Type | Forward | Reverse | Limit |
//! |------|------|---------|---------|-------|
//! | `simulated-annealing` | [`SimulatedAnnealingSampler`] | random start, geometric β ramp | schedule `s` mapped onto β | 4096 variables |
//! | `exact` | [`ExactSampler`] | true ground states | true ground states | 24 variables |
//!
//! Both run their CPU work on tokio's blocking pool, so an async caller can
//! drive many samplers at once without starving the runtime.
//!
//! # Example
//!
//! ```ignore
//! use qsweep_adapter_sim::SimulatedAnnealingSampler;
//! use qsweep_hal::{BatchPolicy, SampleRequest, Sampler};
//! use qsweep_model::{ProblemWeights, build_model};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = build_model(3, 5, &ProblemWeights::default())?;
//!     let sampler = SimulatedAnnealingSampler::new().with_num_sweeps(500);
//!
//!     let request = SampleRequest::forward(100).with_seed(42);
//!     let set = sampler.run(&model, &request, BatchPolicy::Strict).await?;
//!     println!("lowest energy: {:?}", set.lowest_energy());
//!     Ok(())
//! }
//! ```

mod anneal;
mod annealer;
mod exact;

pub use anneal::BetaRange;
pub use annealer::{SIMULATED_ANNEALING, SimulatedAnnealingSampler};
pub use exact::{EXACT, ExactSampler, GroundStates, MAX_EXACT_VARIABLES, ground_states};

use qsweep_hal::SamplerRegistry;

/// Register every local sampler under its default name.
pub fn register_local_samplers(registry: &mut SamplerRegistry) {
    registry.register::<SimulatedAnnealingSampler>(SIMULATED_ANNEALING);
    registry.register::<ExactSampler>(EXACT);
}
