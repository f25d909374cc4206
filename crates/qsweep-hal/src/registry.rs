//! Sampler registry.
//!
//! The [`SamplerRegistry`] maps names to constructors. The orchestrator does
//! not share one sampler between workers; it asks the registry for a
//! [`SharedSamplerFactory`] and every worker builds its own session.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{HalError, HalResult};
use crate::sampler::{Sampler, SamplerConfig, SamplerFactory};

/// Constructor taking a configuration.
type ConfigFactory = Arc<dyn Fn(SamplerConfig) -> HalResult<Box<dyn Sampler>> + Send + Sync>;

/// Zero-argument constructor bound to one configuration.
pub type SharedSamplerFactory = Arc<dyn Fn() -> HalResult<Box<dyn Sampler>> + Send + Sync>;

/// Central registry of sampler constructors.
pub struct SamplerRegistry {
    factories: FxHashMap<String, ConfigFactory>,
}

impl SamplerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a sampler type that implements [`SamplerFactory`].
    pub fn register<S>(&mut self, name: impl Into<String>)
    where
        S: SamplerFactory + 'static,
    {
        let name = name.into();
        debug!("Registering sampler: {}", name);
        self.factories.insert(
            name,
            Arc::new(|config: SamplerConfig| {
                let sampler: Box<dyn Sampler> = Box::new(S::from_config(config)?);
                Ok(sampler)
            }),
        );
    }

    /// Register a sampler with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(SamplerConfig) -> HalResult<Box<dyn Sampler>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering sampler factory: {}", name);
        self.factories.insert(name, Arc::new(factory));
    }

    /// Create a sampler by name.
    pub fn create(&self, config: SamplerConfig) -> HalResult<Box<dyn Sampler>> {
        let factory = self.lookup(&config.name)?;
        factory(config)
    }

    /// A factory that creates fresh sessions of the configured sampler.
    ///
    /// Fails immediately when the name is unknown, so configuration errors
    /// surface before any work is dispatched.
    pub fn shared_factory(&self, config: SamplerConfig) -> HalResult<SharedSamplerFactory> {
        let factory = Arc::clone(self.lookup(&config.name)?);
        let shared: SharedSamplerFactory = Arc::new(move || factory(config.clone()));
        Ok(shared)
    }

    /// List all registered sampler names, sorted.
    pub fn available_samplers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a sampler is registered.
    pub fn has_sampler(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn lookup(&self, name: &str) -> HalResult<&ConfigFactory> {
        self.factories.get(name).ok_or_else(|| {
            HalError::BackendUnavailable(format!(
                "No sampler registered with name '{}' (available: {})",
                name,
                self.available_samplers().join(", ")
            ))
        })
    }
}

impl Default for SamplerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
