//! qsweep Adapter for Remote Annealers
//!
//! This crate provides a [`Sampler`] for a hardware annealer reached over an
//! HTTP JSON problem API. Problems are submitted as linear and quadratic
//! triplets, polled until completion, and the answer is expanded into one
//! sample per read.
//!
//! # Authentication
//!
//! ```bash
//! export QSWEEP_REMOTE_URL="https://annealer.example.com/v1"
//! export QSWEEP_REMOTE_TOKEN="your-token"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use qsweep_adapter_remote::RemoteSampler;
//! use qsweep_hal::{BatchPolicy, SampleRequest, Sampler};
//! use qsweep_model::{ProblemWeights, build_model};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sampler = RemoteSampler::new("advantage")?;
//!     let model = build_model(3, 5, &ProblemWeights::default())?;
//!     let set = sampler
//!         .run(&model, &SampleRequest::forward(100), BatchPolicy::Strict)
//!         .await?;
//!     println!("lowest energy: {:?}", set.lowest_energy());
//!     Ok(())
//! }
//! ```
//!
//! [`Sampler`]: qsweep_hal::Sampler

mod api;
mod backend;
mod error;

pub use api::{Answer, ProblemRequest, ProblemStatus, RemoteClient, SolverInfo};
pub use backend::{DEFAULT_SOLVER, REMOTE, RemoteSampler, TOKEN_ENV, URL_ENV};
pub use error::{RemoteError, RemoteResult};

use qsweep_hal::SamplerRegistry;

/// Register the remote sampler under its default name.
pub fn register_remote_sampler(registry: &mut SamplerRegistry) {
    registry.register::<RemoteSampler>(REMOTE);
}
