//! Experiment configuration.
//!
//! An [`ExperimentConfig`] is read once at startup and passed by value (or
//! behind an `Arc`) to the orchestrator; nothing reads ambient state. Files
//! ending in `.json` are parsed as JSON, everything else as YAML.
//!
//! ```yaml
//! agents: [3]
//! slots: { min: 3, max: 5 }
//! weights: { alpha: 1.0, lambda: 0.3, gamma: 1.3, adjacency: 3.5 }
//! num_reads: 100
//! repetitions: 10
//! schedule: [[0.0, 1.0], [2.0, 0.45], [8.0, 0.45], [10.0, 1.0]]
//! sampler:
//!   name: simulated-annealing
//!   num_sweeps: 1000
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use qsweep_hal::{AnnealSchedule, SamplerConfig};
use qsweep_model::ProblemWeights;

use crate::error::{BenchError, BenchResult};
use crate::estimator::DEFAULT_TOLERANCE;

/// One `(N, D)` point of the sweep grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    /// Number of agents `N`.
    pub agents: usize,
    /// Number of slots `D`.
    pub slots: usize,
}

impl GridPoint {
    pub fn new(agents: usize, slots: usize) -> Self {
        Self { agents, slots }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.agents, self.slots)
    }
}

/// Inclusive range of slot counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub min: usize,
    pub max: usize,
}

impl SlotRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Slot counts in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }
}

/// How the reverse seed is drawn from a forward batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedSelection {
    /// Any sample, uniformly at random.
    #[default]
    Uniform,
    /// The lowest-energy sample (first on ties).
    LowestEnergy,
}

/// Which sampler to build and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Registered sampler name.
    pub name: String,
    /// API endpoint for remote samplers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Sampler-specific settings, passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SamplerSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Build the registry configuration. Tokens never live in experiment
    /// files; adapters read them from the environment.
    pub fn to_sampler_config(&self) -> SamplerConfig {
        let mut config = SamplerConfig::new(&self.name);
        config.endpoint = self.endpoint.clone();
        config.extra = self.extra.clone();
        config
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self::new("simulated-annealing")
    }
}

/// Full description of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Agent counts to sweep.
    pub agents: Vec<usize>,
    /// Slot counts to sweep, for every agent count.
    pub slots: SlotRange,
    /// Energy weights.
    pub weights: ProblemWeights,
    /// Reads per sampling call.
    pub num_reads: u32,
    /// Forward/reverse repetitions per grid point.
    pub repetitions: u32,
    /// Reverse anneal schedule.
    pub schedule: AnnealSchedule,
    /// Restart every reverse read from the seed state.
    pub reinitialize_state: bool,
    /// Grid points processed in parallel.
    pub workers: usize,
    /// Base seed; `None` draws one from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Energy tolerance for counting ground-state hits.
    pub tolerance: f64,
    /// Treat short batches as errors.
    pub strict_batch_size: bool,
    /// Reverse seed selection rule.
    pub seed_selection: SeedSelection,
    /// Sampler to use.
    pub sampler: SamplerSettings,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            agents: vec![3],
            slots: SlotRange::new(3, 5),
            weights: ProblemWeights::default(),
            num_reads: 100,
            repetitions: 10,
            schedule: AnnealSchedule::default(),
            reinitialize_state: true,
            workers: default_workers(),
            seed: None,
            tolerance: DEFAULT_TOLERANCE,
            strict_batch_size: true,
            seed_selection: SeedSelection::Uniform,
            sampler: SamplerSettings::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

impl ExperimentConfig {
    /// Load a configuration file, JSON or YAML by extension.
    pub fn from_file(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&text)?)
        } else {
            Self::from_yaml(&text)
        }
    }

    /// Parse YAML.
    pub fn from_yaml(text: &str) -> BenchResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> BenchResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Write a configuration file, JSON or YAML by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> BenchResult<()> {
        let path = path.as_ref();
        let text = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_yaml()?
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check every setting that would otherwise fail mid-sweep.
    pub fn validate(&self) -> BenchResult<()> {
        if self.agents.is_empty() {
            return Err(BenchError::Config("agent grid is empty".into()));
        }
        if let Some(&n) = self.agents.iter().find(|&&n| n == 0) {
            return Err(BenchError::Config(format!(
                "agent counts must be at least 1, got {n}"
            )));
        }
        let distinct: BTreeSet<_> = self.agents.iter().collect();
        if distinct.len() != self.agents.len() {
            return Err(BenchError::Config(format!(
                "agent counts must be distinct, got {:?}",
                self.agents
            )));
        }
        if self.slots.min == 0 || self.slots.min > self.slots.max {
            return Err(BenchError::Config(format!(
                "slot range must satisfy 1 <= min <= max, got {}..={}",
                self.slots.min, self.slots.max
            )));
        }
        if self.num_reads == 0 {
            return Err(BenchError::Config("num_reads must be at least 1".into()));
        }
        if self.repetitions == 0 {
            return Err(BenchError::Config("repetitions must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(BenchError::Config("workers must be at least 1".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(BenchError::Config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        self.weights.validate()?;
        self.schedule
            .validate_reverse()
            .map_err(|e| BenchError::Config(e.to_string()))?;
        if self.sampler.name.is_empty() {
            return Err(BenchError::Config("sampler name is empty".into()));
        }
        Ok(())
    }

    /// Grid points in ascending `(N, D)` order.
    pub fn grid(&self) -> Vec<GridPoint> {
        let mut points: Vec<GridPoint> = self
            .agents
            .iter()
            .flat_map(|&n| self.slots.iter().map(move |d| GridPoint::new(n, d)))
            .collect();
        points.sort();
        points
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
