//! Property-based tests for model compilation.
//!
//! The compiled model must agree with the term-by-term energy definition on
//! arbitrary grids, weights and states.

use proptest::prelude::*;
use qsweep_model::{AssignmentProblem, ProblemWeights};

/// Generate a grid size, weights and a matching binary state.
fn arb_instance() -> impl Strategy<Value = (usize, usize, ProblemWeights, Vec<u8>)> {
    (1_usize..=4, 1_usize..=6).prop_flat_map(|(agents, slots)| {
        (
            Just(agents),
            Just(slots),
            (-5.0_f64..5.0, -5.0_f64..5.0, -5.0_f64..5.0, 0.0_f64..10.0).prop_map(
                |(alpha, lambda, gamma, adjacency)| {
                    ProblemWeights::new(lambda, gamma, adjacency).with_alpha(alpha)
                },
            ),
            prop::collection::vec(0_u8..=1, agents * slots),
        )
    })
}

proptest! {
    #[test]
    fn compiled_energy_matches_terms((agents, slots, weights, state) in arb_instance()) {
        let problem = AssignmentProblem::new(agents, slots, weights).unwrap();
        let direct = problem.energy(&state).unwrap();
        let compiled = problem.compile().energy(&state).unwrap();
        prop_assert!((direct - compiled).abs() < 1e-9);
    }

    #[test]
    fn exclusivity_terms_are_non_negative((agents, slots, weights, state) in arb_instance()) {
        let problem = AssignmentProblem::new(agents, slots, weights).unwrap();
        prop_assert!(problem.slot_exclusivity_energy(&state).unwrap() >= 0.0);
        prop_assert!(problem.agent_exclusivity_energy(&state).unwrap() >= 0.0);
    }

    #[test]
    fn feasible_states_have_zero_exclusivity((agents, slots, weights, state) in arb_instance()) {
        let problem = AssignmentProblem::new(agents, slots, weights).unwrap();
        if problem.grid().is_feasible(&state).unwrap() {
            prop_assert_eq!(problem.slot_exclusivity_energy(&state).unwrap(), 0.0);
            prop_assert_eq!(problem.agent_exclusivity_energy(&state).unwrap(), 0.0);
        }
    }
}
