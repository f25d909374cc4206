//! qsweep Command-Line Interface
//!
//! Runs forward vs. reverse annealing sweeps over the agent-to-slot
//! assignment problem and inspects the models they sample.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{init_config, model, run, samplers, version};

/// qsweep - forward vs. reverse annealing on agent-to-slot assignment
#[derive(Parser)]
#[command(name = "qsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sweep over the (agents, slots) grid
    Run(run::RunArgs),

    /// Build one model and print its structure
    Model {
        /// Number of agents
        #[arg(short, long)]
        agents: usize,

        /// Number of slots
        #[arg(short, long)]
        slots: usize,

        /// Weight of the adjacency term
        #[arg(long, default_value = "1.0")]
        alpha: f64,

        /// Weight of the one-agent-per-slot term
        #[arg(long, default_value = "0.3")]
        lambda: f64,

        /// Weight of the one-slot-per-agent term
        #[arg(long, default_value = "1.3")]
        gamma: f64,

        /// Adjacency penalty constant
        #[arg(long, default_value = "3.5")]
        adjacency: f64,

        /// Enumerate ground states (small models only)
        #[arg(long)]
        exact: bool,
    },

    /// List available samplers
    Samplers,

    /// Write a default experiment configuration
    InitConfig {
        /// Output file (YAML, or JSON by extension)
        #[arg(short, long, default_value = "qsweep.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(args).await,

        Commands::Model {
            agents,
            slots,
            alpha,
            lambda,
            gamma,
            adjacency,
            exact,
        } => {
            let weights = qsweep_model::ProblemWeights::new(lambda, gamma, adjacency)
                .with_alpha(alpha);
            model::execute(agents, slots, &weights, exact).await
        }

        Commands::Samplers => samplers::execute().await,

        Commands::InitConfig { output, force } => init_config::execute(&output, force),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_minimal() {
        let cli = Cli::try_parse_from(["qsweep", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.config.is_none());
                assert!(args.sampler.is_none());
                assert!(args.workers.is_none());
                assert!(args.output.is_none());
                assert!(!args.no_progress);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "qsweep",
            "run",
            "-c",
            "sweep.yaml",
            "--sampler",
            "exact",
            "-w",
            "4",
            "-r",
            "500",
            "--repetitions",
            "3",
            "--seed",
            "42",
            "-o",
            "report.json",
            "--no-progress",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config.as_deref(), Some("sweep.yaml"));
                assert_eq!(args.sampler.as_deref(), Some("exact"));
                assert_eq!(args.workers, Some(4));
                assert_eq!(args.reads, Some(500));
                assert_eq!(args.repetitions, Some(3));
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.output.as_deref(), Some("report.json"));
                assert!(args.no_progress);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_parse_run_rejects_bad_reads() {
        assert!(Cli::try_parse_from(["qsweep", "run", "--reads", "many"]).is_err());
    }

    #[test]
    fn test_parse_model_defaults() {
        let cli = Cli::try_parse_from(["qsweep", "model", "-a", "3", "-s", "5"]).unwrap();
        match cli.command {
            Commands::Model {
                agents,
                slots,
                alpha,
                lambda,
                gamma,
                adjacency,
                exact,
            } => {
                assert_eq!((agents, slots), (3, 5));
                assert_eq!(alpha, 1.0);
                assert_eq!(lambda, 0.3);
                assert_eq!(gamma, 1.3);
                assert_eq!(adjacency, 3.5);
                assert!(!exact);
            }
            _ => panic!("Expected Model command"),
        }
    }

    #[test]
    fn test_parse_model_missing_slots() {
        assert!(Cli::try_parse_from(["qsweep", "model", "--agents", "3"]).is_err());
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["qsweep", "init-config"]).unwrap();
        match cli.command {
            Commands::InitConfig { output, force } => {
                assert_eq!(output, "qsweep.yaml");
                assert!(!force);
            }
            _ => panic!("Expected InitConfig command"),
        }
    }

    #[test]
    fn test_parse_samplers_and_version() {
        let cli = Cli::try_parse_from(["qsweep", "samplers"]).unwrap();
        assert!(matches!(cli.command, Commands::Samplers));
        let cli = Cli::try_parse_from(["qsweep", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["qsweep", "-vv", "samplers"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["qsweep", "samplers", "-vvv"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_no_subcommand() {
        assert!(Cli::try_parse_from(["qsweep"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
