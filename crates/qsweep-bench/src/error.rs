//! Error types for sweeps.

use thiserror::Error;

use qsweep_hal::{HalError, SamplingMode};
use qsweep_model::ModelError;

/// Result type for sweep operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while running or summarising a sweep.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid experiment configuration, reported before any sampling.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model construction failed.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Sampler failed or returned a malformed batch.
    #[error("Sampler error: {0}")]
    Sampler(#[from] HalError),

    /// A grid point has no completed trials to aggregate.
    #[error("No completed {mode} trials for {agents} agents x {slots} slots")]
    EmptyTrials {
        agents: usize,
        slots: usize,
        mode: SamplingMode,
    },

    /// A grid point's trial sequence aborted.
    #[error("Pair ({agents}, {slots}) failed: {source}")]
    PairFailed {
        agents: usize,
        slots: usize,
        source: Box<BenchError>,
    },

    /// A worker task panicked.
    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    /// Two workers reported the same grid point.
    #[error("Duplicate result for pair ({agents}, {slots})")]
    DuplicateResult { agents: usize, slots: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
