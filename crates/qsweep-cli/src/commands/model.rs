//! Model command implementation.

use anyhow::{Context, Result};
use console::style;

use qsweep_adapter_sim::{MAX_EXACT_VARIABLES, ground_states};
use qsweep_bench::DEFAULT_TOLERANCE;
use qsweep_model::{AssignmentProblem, ProblemWeights};

use super::common::format_assignment;

/// Ground states printed at most.
const MAX_PRINTED_STATES: usize = 8;

/// Execute the model command.
pub async fn execute(
    agents: usize,
    slots: usize,
    weights: &ProblemWeights,
    exact: bool,
) -> Result<()> {
    let problem = AssignmentProblem::new(agents, slots, *weights)?;
    let model = problem.compile();

    println!(
        "{} Model {} (α={}, λ={}, γ={}, A={})",
        style("→").cyan().bold(),
        style(problem.grid()).green(),
        weights.alpha,
        weights.lambda,
        weights.gamma,
        weights.adjacency
    );
    println!("  Variables:    {}", model.num_variables());
    println!(
        "  Linear terms: {}",
        model.linear_terms().iter().filter(|h| **h != 0.0).count()
    );
    println!("  Interactions: {}", model.num_interactions());
    println!("  Offset:       {}", model.offset());
    println!("  Max |coeff|:  {}", model.max_abs_coefficient());

    if !exact {
        return Ok(());
    }
    if model.num_variables() > MAX_EXACT_VARIABLES {
        anyhow::bail!(
            "Exact enumeration supports at most {MAX_EXACT_VARIABLES} variables, model has {}",
            model.num_variables()
        );
    }

    let owned = model.clone();
    let ground = tokio::task::spawn_blocking(move || ground_states(&owned, DEFAULT_TOLERANCE))
        .await
        .context("Enumeration task failed")??;

    println!(
        "\n{} Ground energy {} ({} degenerate states)",
        style("✓").green().bold(),
        style(ground.energy).yellow(),
        ground.states.len()
    );
    for state in ground.states.iter().take(MAX_PRINTED_STATES) {
        let rows = problem.grid().decode(state)?;
        let feasible = problem.grid().is_feasible(state)?;
        println!(
            "  {} {}",
            if feasible {
                style("●").green()
            } else {
                style("○").yellow()
            },
            format_assignment(&rows)
        );
    }
    if ground.states.len() > MAX_PRINTED_STATES {
        println!("  ... and {} more", ground.states.len() - MAX_PRINTED_STATES);
    }

    Ok(())
}
