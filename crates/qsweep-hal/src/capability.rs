//! Sampler capability introspection.
//!
//! [`Capabilities`] describe the limits a sampler enforces on the model size,
//! the read count and the anneal schedule. The default [`Sampler::run`]
//! checks requests against them before dispatch.
//!
//! [`Sampler::run`]: crate::Sampler::run

use serde::{Deserialize, Serialize};

/// Limits and features of a sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the sampler.
    pub name: String,
    /// Largest model (number of variables) accepted.
    pub max_variables: usize,
    /// Largest read count per call.
    pub max_reads: u32,
    /// Whether reverse annealing is available.
    pub supports_reverse: bool,
    /// Longest schedule accepted, in schedule time units. `None` means no
    /// backend-imposed limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_anneal_duration: Option<f64>,
    /// Whether this is a software sampler (`true`) or hardware (`false`).
    pub is_simulator: bool,
}

impl Capabilities {
    /// Capabilities of a local software sampler.
    pub fn simulator(name: impl Into<String>, max_variables: usize) -> Self {
        Self {
            name: name.into(),
            max_variables,
            max_reads: 100_000,
            supports_reverse: true,
            max_anneal_duration: None,
            is_simulator: true,
        }
    }

    /// Capabilities of a hardware annealer.
    pub fn annealer(name: impl Into<String>, max_variables: usize) -> Self {
        Self {
            name: name.into(),
            max_variables,
            max_reads: 10_000,
            supports_reverse: true,
            max_anneal_duration: Some(2000.0),
            is_simulator: false,
        }
    }

    /// Override the read limit.
    pub fn with_max_reads(mut self, max_reads: u32) -> Self {
        self.max_reads = max_reads;
        self
    }

    /// Override reverse-anneal support.
    pub fn with_reverse(mut self, supports_reverse: bool) -> Self {
        self.supports_reverse = supports_reverse;
        self
    }

    /// Override the schedule duration limit.
    pub fn with_max_anneal_duration(mut self, duration: Option<f64>) -> Self {
        self.max_anneal_duration = duration;
        self
    }
}
