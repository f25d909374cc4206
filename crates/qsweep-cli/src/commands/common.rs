//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsweep_bench::{ExperimentConfig, SweepSummary};
use qsweep_hal::{SamplerRegistry, SamplingMode};

/// Registry with every sampler this binary ships.
pub fn sampler_registry() -> SamplerRegistry {
    let mut registry = SamplerRegistry::new();
    qsweep_adapter_sim::register_local_samplers(&mut registry);
    qsweep_adapter_remote::register_remote_sampler(&mut registry);
    registry
}

/// Load an experiment configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<ExperimentConfig> {
    let Some(path) = path else {
        return Ok(ExperimentConfig::default());
    };
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    ExperimentConfig::from_file(path).with_context(|| format!("Failed to load config: {path}"))
}

/// Print forward and reverse statistics side by side.
pub fn print_summary(summary: &SweepSummary) {
    println!(
        "\n  {:>6} {:>6}   {:>18}   {:>18}",
        style("agents").bold(),
        style("slots").bold(),
        style("forward (%)").cyan().bold(),
        style("reverse (%)").magenta().bold()
    );

    for (point, forward) in &summary.forward {
        let reverse = summary.get(*point, SamplingMode::Reverse);
        println!(
            "  {:>6} {:>6}   {:>18}   {:>18}",
            point.agents,
            point.slots,
            format_stats(forward.mean, forward.std_dev),
            reverse.map_or_else(|| "-".to_string(), |r| format_stats(r.mean, r.std_dev)),
        );
    }
}

fn format_stats(mean: f64, std_dev: f64) -> String {
    format!("{mean:6.2} ± {std_dev:5.2}")
}

/// Render a state as one `agent -> slots` line per agent.
pub fn format_assignment(rows: &[Vec<usize>]) -> String {
    rows.iter()
        .enumerate()
        .map(|(n, slots)| {
            let slots = if slots.is_empty() {
                "-".to_string()
            } else {
                slots
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            };
            format!("a{n}->{slots}")
        })
        .collect::<Vec<_>>()
        .join("  ")
}
