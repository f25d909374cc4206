//! Run command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qsweep_bench::{ExperimentConfig, Orchestrator, SamplerSettings, SweepReport};

use super::common::{load_config, print_summary, sampler_registry};

/// Options of the `run` command. Flags override the configuration file.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Experiment configuration (YAML, or JSON by extension)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sampler to use (simulated-annealing, exact, remote)
    #[arg(long)]
    pub sampler: Option<String>,

    /// Grid points processed in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Reads per sampling call
    #[arg(short, long)]
    pub reads: Option<u32>,

    /// Repetitions per grid point
    #[arg(long)]
    pub repetitions: Option<u32>,

    /// Base seed for reproducible sweeps
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl RunArgs {
    /// Configuration with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<ExperimentConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(name) = &self.sampler {
            if *name != config.sampler.name {
                config.sampler = SamplerSettings::new(name.clone());
            }
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(reads) = self.reads {
            config.num_reads = reads;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let grid = config.grid();

    println!(
        "{} Sweeping {} grid points on {} ({} repetitions x {} reads, {} workers)",
        style("→").cyan().bold(),
        grid.len(),
        style(&config.sampler.name).yellow(),
        config.repetitions,
        config.num_reads,
        config.workers
    );

    let registry = sampler_registry();
    if !registry.has_sampler(&config.sampler.name) {
        anyhow::bail!(
            "Unknown sampler: '{}'. Available: {}",
            config.sampler.name,
            registry.available_samplers().join(", ")
        );
    }
    let factory = registry
        .shared_factory(config.sampler.to_sampler_config())
        .with_context(|| format!("Failed to configure sampler '{}'", config.sampler.name))?;

    // Check availability before starting any worker
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Checking sampler availability...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let probe = factory()?;
    let availability = probe.availability().await?;
    spinner.finish_and_clear();
    if !availability.is_available {
        anyhow::bail!(
            "Sampler '{}' is not available{}",
            config.sampler.name,
            availability
                .status_message
                .map(|m| format!(": {m}"))
                .unwrap_or_default()
        );
    }
    drop(probe);

    let orchestrator =
        Orchestrator::new(config.clone(), factory)?.with_progress(!args.no_progress);
    let outcome = orchestrator.run().await?;
    let summary = outcome.summarize()?;

    println!(
        "\n{} Sweep finished in {:.1?} (seed {})",
        style("✓").green().bold(),
        outcome.elapsed,
        outcome.base_seed
    );
    print_summary(&summary);

    if let Some(path) = args.output {
        let report = SweepReport::new(&config, config.sampler.name.clone(), &outcome, &summary)?;
        report
            .save(&path)
            .with_context(|| format!("Failed to write report: {path}"))?;
        println!("\n  Report written to {}", style(&path).green());
    }

    Ok(())
}
