//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - forward vs. reverse annealing sweeps",
        style("qsweep").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsweep-model   QUBO construction for agent-to-slot assignment");
    println!("  qsweep-hal     Sampler abstraction layer");
    println!("  qsweep-bench   Sweep orchestration, estimation and statistics");
    println!("  qsweep-cli     Command-line interface");
    println!();
    println!("Samplers:");
    println!("  simulated-annealing, exact   (local)");
    println!("  remote                       (HTTP annealing service)");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
