//! Init-config command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsweep_bench::ExperimentConfig;

/// Execute the init-config command.
pub fn execute(output: &str, force: bool) -> Result<()> {
    if Path::new(output).exists() && !force {
        anyhow::bail!("{output} already exists (use --force to overwrite)");
    }

    ExperimentConfig::default()
        .save(output)
        .with_context(|| format!("Failed to write config: {output}"))?;

    println!(
        "{} Wrote default configuration to {}",
        style("✓").green().bold(),
        style(output).green()
    );
    Ok(())
}
