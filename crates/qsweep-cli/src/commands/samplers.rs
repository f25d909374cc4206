//! Samplers command implementation.

use anyhow::Result;
use console::style;

use qsweep_hal::{Sampler, SamplerConfig};

use super::common::sampler_registry;

/// Execute the samplers command.
pub async fn execute() -> Result<()> {
    println!("{} Available samplers:\n", style("qsweep").cyan().bold());

    let registry = sampler_registry();
    for name in registry.available_samplers() {
        match registry.create(SamplerConfig::new(&name)) {
            Ok(sampler) => print_sampler(&name, sampler.as_ref()).await,
            Err(e) => {
                println!(
                    "  {} {} (not configured)",
                    style("○").dim(),
                    style(&name).dim()
                );
                println!("    {e}");
            }
        }
        println!();
    }

    Ok(())
}

async fn print_sampler(name: &str, sampler: &dyn Sampler) {
    let caps = sampler.capabilities();
    let availability = sampler.availability().await;
    let available = availability.as_ref().is_ok_and(|a| a.is_available);

    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").yellow()
        },
        style(name).bold(),
        if caps.is_simulator { "(local)" } else { "" }
    );
    println!("    Max variables: {}", caps.max_variables);
    println!("    Max reads: {}", caps.max_reads);
    println!(
        "    Reverse annealing: {}",
        if caps.supports_reverse { "yes" } else { "no" }
    );
    if let Some(duration) = caps.max_anneal_duration {
        println!("    Max anneal duration: {duration}");
    }
    match availability {
        Ok(a) if !a.is_available => {
            println!(
                "    Status: {}",
                a.status_message.as_deref().unwrap_or("offline")
            );
        }
        Ok(a) => {
            if let Some(depth) = a.queue_depth.filter(|d| *d > 0) {
                println!("    Queue depth: {depth}");
            }
        }
        Err(e) => println!("    Status: {e}"),
    }
}
