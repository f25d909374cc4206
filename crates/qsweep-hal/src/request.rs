//! Sampling requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schedule::AnnealSchedule;

/// Which way a sampler anneals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Cold start.
    Forward,
    /// Refinement from a supplied state.
    Reverse,
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingMode::Forward => write!(f, "forward"),
            SamplingMode::Reverse => write!(f, "reverse"),
        }
    }
}

/// Parameters of a reverse anneal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseAnneal {
    /// Schedule starting and ending at `s = 1`.
    pub schedule: AnnealSchedule,
    /// State every read starts from.
    pub initial_state: Vec<u8>,
    /// Restart each read from `initial_state` rather than from the previous
    /// read's final state.
    pub reinitialize_state: bool,
}

impl ReverseAnneal {
    /// Reverse anneal from `initial_state`, reinitialising every read.
    pub fn new(schedule: AnnealSchedule, initial_state: Vec<u8>) -> Self {
        Self {
            schedule,
            initial_state,
            reinitialize_state: true,
        }
    }

    /// Set the reinitialisation flag.
    pub fn with_reinitialize_state(mut self, reinitialize_state: bool) -> Self {
        self.reinitialize_state = reinitialize_state;
        self
    }
}

/// Mode-specific request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnnealMode {
    /// Search from an unbiased start.
    Forward,
    /// Search from a supplied state along a schedule.
    Reverse(ReverseAnneal),
}

impl AnnealMode {
    /// The parameter-free mode tag.
    pub fn kind(&self) -> SamplingMode {
        match self {
            AnnealMode::Forward => SamplingMode::Forward,
            AnnealMode::Reverse(_) => SamplingMode::Reverse,
        }
    }
}

/// One sampling call: how many reads, which mode, optional RNG seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRequest {
    /// Number of samples to return.
    pub num_reads: u32,
    /// Forward or reverse parameters.
    #[serde(flatten)]
    pub mode: AnnealMode,
    /// Seed for samplers with a local RNG. Remote samplers may ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SampleRequest {
    /// Forward request.
    pub fn forward(num_reads: u32) -> Self {
        Self {
            num_reads,
            mode: AnnealMode::Forward,
            seed: None,
        }
    }

    /// Reverse request.
    pub fn reverse(num_reads: u32, params: ReverseAnneal) -> Self {
        Self {
            num_reads,
            mode: AnnealMode::Reverse(params),
            seed: None,
        }
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reverse parameters, if this is a reverse request.
    pub fn reverse_params(&self) -> Option<&ReverseAnneal> {
        match &self.mode {
            AnnealMode::Reverse(params) => Some(params),
            AnnealMode::Forward => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_request() {
        let req = SampleRequest::forward(100).with_seed(7);
        assert_eq!(req.mode.kind(), SamplingMode::Forward);
        assert_eq!(req.seed, Some(7));
        assert!(req.reverse_params().is_none());
    }

    #[test]
    fn test_reverse_request() {
        let schedule = AnnealSchedule::reverse(0.45, 2.0, 6.0).unwrap();
        let params = ReverseAnneal::new(schedule, vec![1, 0, 0, 1]).with_reinitialize_state(false);
        let req = SampleRequest::reverse(10, params);
        assert_eq!(req.mode.kind(), SamplingMode::Reverse);
        let p = req.reverse_params().unwrap();
        assert_eq!(p.initial_state, vec![1, 0, 0, 1]);
        assert!(!p.reinitialize_state);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(SamplingMode::Forward.to_string(), "forward");
        assert_eq!(SamplingMode::Reverse.to_string(), "reverse");
    }

    #[test]
    fn test_request_json_shape() {
        let json = serde_json::to_value(SampleRequest::forward(5)).unwrap();
        assert_eq!(json, serde_json::json!({ "num_reads": 5, "mode": "forward" }));
    }
}
