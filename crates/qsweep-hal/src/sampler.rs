//! Sampler trait and configuration.
//!
//! The [`Sampler`] trait is the single seam between the experiment code and
//! whatever produces samples: a hardware annealer behind an HTTP API or a
//! local heuristic.
//!
//! ```text
//!   capabilities() ──→ validate() ──→ sample() ──→ SampleSet::check()
//!    (sync, &ref)       (async)       (async)       (inside run())
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<SamplerAvailability>` |
//! | `validate()` | async | provided | `HalResult<ValidationResult>` |
//! | `sample()` | async | yes | `HalResult<SampleSet>` |
//! | `run()` | async | provided | `HalResult<SampleSet>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qsweep_model::BinaryQuadraticModel;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::request::{AnnealMode, SampleRequest};
use crate::sample::SampleSet;

/// Configuration for a sampler instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Registered name of the sampler.
    pub name: String,
    /// API endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Sampler-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SamplerConfig {
    /// Create a new sampler configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add a sampler-specific setting.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer setting.
    pub fn extra_u64(&self, key: &str) -> HalResult<Option<u64>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                HalError::Configuration(format!("'{key}' must be a non-negative integer, got {v}"))
            }),
        }
    }

    /// Read a float setting.
    pub fn extra_f64(&self, key: &str) -> HalResult<Option<f64>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| HalError::Configuration(format!("'{key}' must be a number, got {v}"))),
        }
    }

    /// Read a string setting.
    pub fn extra_str(&self, key: &str) -> HalResult<Option<&str>> {
        match self.extra.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| HalError::Configuration(format!("'{key}' must be a string, got {v}"))),
        }
    }
}

impl fmt::Debug for SamplerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// What to do when a sampler returns fewer samples than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Under-delivery is a malformed batch.
    #[default]
    Strict,
    /// Under-delivery is logged and the short batch is returned.
    AllowShort,
}

/// Trait for samplers of binary quadratic models.
///
/// # Contract
///
/// - `capabilities()` MUST be synchronous and infallible, cached at
///   construction time.
/// - `sample()` MUST return at most `num_reads` samples, each carrying its
///   energy under the supplied model.
/// - Reverse requests MUST start every read from `initial_state` when
///   `reinitialize_state` is set.
/// - A session is used by one caller at a time; implementations need not
///   support concurrent calls with shared progress.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Get the name of this sampler.
    fn name(&self) -> &str;

    /// Get the capabilities of this sampler.
    fn capabilities(&self) -> &Capabilities;

    /// Check sampler availability.
    async fn availability(&self) -> HalResult<SamplerAvailability>;

    /// Validate a request against the sampler's capabilities.
    async fn validate(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<ValidationResult> {
        Ok(check_request(self.capabilities(), model, request))
    }

    /// Draw samples.
    async fn sample(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
    ) -> HalResult<SampleSet>;

    /// Validate, sample and check the returned batch.
    async fn run(
        &self,
        model: &BinaryQuadraticModel,
        request: &SampleRequest,
        policy: BatchPolicy,
    ) -> HalResult<SampleSet> {
        if let ValidationResult::Invalid { reasons } = self.validate(model, request).await? {
            return Err(HalError::Rejected { reasons });
        }
        let set = self.sample(model, request).await?;
        set.check(
            model.num_variables(),
            request.num_reads,
            policy == BatchPolicy::Strict,
        )?;
        debug!(
            "{} returned {} samples ({} mode)",
            self.name(),
            set.len(),
            request.mode.kind()
        );
        Ok(set)
    }
}

/// Check `request` against `caps`, collecting every violation.
pub fn check_request(
    caps: &Capabilities,
    model: &BinaryQuadraticModel,
    request: &SampleRequest,
) -> ValidationResult {
    let mut reasons = Vec::new();

    if model.num_variables() > caps.max_variables {
        reasons.push(format!(
            "model has {} variables but {} supports at most {}",
            model.num_variables(),
            caps.name,
            caps.max_variables
        ));
    }
    if request.num_reads == 0 {
        reasons.push("num_reads must be at least 1".into());
    } else if request.num_reads > caps.max_reads {
        reasons.push(format!(
            "requested {} reads but {} allows at most {}",
            request.num_reads, caps.name, caps.max_reads
        ));
    }

    if let AnnealMode::Reverse(params) = &request.mode {
        if !caps.supports_reverse {
            reasons.push(format!("{} does not support reverse annealing", caps.name));
        }
        if let Err(e) = params.schedule.validate_reverse() {
            reasons.push(e.to_string());
        }
        if let Some(max) = caps.max_anneal_duration {
            if params.schedule.duration() > max {
                reasons.push(format!(
                    "schedule lasts {} but {} allows at most {}",
                    params.schedule.duration(),
                    caps.name,
                    max
                ));
            }
        }
        if params.initial_state.len() != model.num_variables() {
            reasons.push(format!(
                "initial state has {} values, model has {} variables",
                params.initial_state.len(),
                model.num_variables()
            ));
        } else if params.initial_state.iter().any(|&v| v > 1) {
            reasons.push("initial state contains a non-binary value".into());
        }
    }

    if reasons.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid { reasons }
    }
}

/// Sampler availability information.
#[derive(Debug, Clone)]
pub struct SamplerAvailability {
    /// Whether the sampler is currently accepting requests.
    pub is_available: bool,
    /// Number of problems queued ahead (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new problem (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl SamplerAvailability {
    /// Availability of a sampler that is always ready, e.g. a local one.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Availability of an offline sampler.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of request validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Request can be dispatched as-is.
    Valid,
    /// Request cannot run on this sampler.
    Invalid {
        /// Reasons the request is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the request is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Trait for creating samplers from configuration.
pub trait SamplerFactory: Sampler + Sized {
    /// Create a sampler from configuration.
    fn from_config(config: SamplerConfig) -> HalResult<Self>;
}
