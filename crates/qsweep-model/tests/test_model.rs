//! Tests for the compiled assignment model.

use qsweep_model::{AssignmentProblem, ProblemWeights, build_model};

fn weights() -> ProblemWeights {
    ProblemWeights::new(0.3, 1.3, 3.5)
}

/// Every state of an `n`-variable grid, in index order.
fn all_states(n: usize) -> impl Iterator<Item = Vec<u8>> {
    (0u32..(1 << n)).map(move |bits| (0..n).map(|i| ((bits >> i) & 1) as u8).collect())
}

// ---------------------------------------------------------------------------
// Compiled energy vs. term-by-term definition
// ---------------------------------------------------------------------------

#[test]
fn compiled_energy_matches_definition_exhaustively() {
    for (agents, slots) in [(1, 1), (1, 4), (2, 2), (2, 3), (3, 3), (3, 4)] {
        let problem = AssignmentProblem::new(agents, slots, weights()).unwrap();
        let bqm = problem.compile();
        for state in all_states(agents * slots) {
            let direct = problem.energy(&state).unwrap();
            let compiled = bqm.energy(&state).unwrap();
            assert!(
                (direct - compiled).abs() < 1e-9,
                "{agents}x{slots} state {state:?}: direct {direct} vs compiled {compiled}"
            );
        }
    }
}

#[test]
fn alpha_scales_adjacency_only() {
    let base = AssignmentProblem::new(2, 3, weights()).unwrap();
    let doubled = AssignmentProblem::new(2, 3, weights().with_alpha(2.0)).unwrap();
    let state = [1, 1, 0, 0, 0, 1];
    let h1 = base.adjacency_energy(&state).unwrap();
    assert_eq!(h1, 3.5);
    let delta = doubled.compile().energy(&state).unwrap() - base.compile().energy(&state).unwrap();
    assert!((delta - h1).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Structure of the quadratic terms
// ---------------------------------------------------------------------------

#[test]
fn quadratic_terms_only_on_rows_and_columns() {
    for (agents, slots) in [(1, 1), (2, 5), (3, 5), (4, 2), (5, 5)] {
        let problem = AssignmentProblem::new(agents, slots, weights()).unwrap();
        let grid = *problem.grid();
        let bqm = problem.compile();

        let bound = agents * slots * slots.saturating_sub(1) / 2
            + slots * agents * agents.saturating_sub(1) / 2;
        assert!(bqm.num_interactions() <= bound);
        // With non-zero λ and γ every row and column pair is present.
        assert_eq!(bqm.num_interactions(), bound);

        for ((i, j), _) in bqm.interactions() {
            assert!(i < j);
            let (a, b) = (grid.label(i), grid.label(j));
            assert!(
                a.agent == b.agent || a.slot == b.slot,
                "unexpected coupling {a} - {b}"
            );
        }
    }
}

#[test]
fn zero_exclusivity_weights_leave_only_adjacency_pairs() {
    let w = ProblemWeights::new(0.0, 0.0, 3.5);
    let bqm = build_model(3, 5, &w).unwrap();
    assert_eq!(bqm.num_interactions(), 3 * 4);
    for ((i, j), c) in bqm.interactions() {
        assert_eq!(j, i + 1);
        assert_eq!(c, 3.5);
    }
}

// ---------------------------------------------------------------------------
// Exclusivity terms
// ---------------------------------------------------------------------------

#[test]
fn exclusivity_terms_vanish_on_permutations() {
    let problem = AssignmentProblem::new(3, 3, weights()).unwrap();
    let grid = *problem.grid();
    let perms = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for perm in perms {
        let mut state = vec![0u8; 9];
        for (agent, &slot) in perm.iter().enumerate() {
            state[grid.index(agent, slot)] = 1;
        }
        assert_eq!(problem.slot_exclusivity_energy(&state).unwrap(), 0.0);
        assert_eq!(problem.agent_exclusivity_energy(&state).unwrap(), 0.0);
        assert!(grid.is_feasible(&state).unwrap());
    }
}

#[test]
fn deviation_strictly_increases_exclusivity_terms() {
    let problem = AssignmentProblem::new(3, 3, weights()).unwrap();
    let grid = *problem.grid();
    let mut state = vec![0u8; 9];
    for n in 0..3 {
        state[grid.index(n, n)] = 1;
    }

    // Column 0 goes 1 → 2 → 3 selected agents.
    let mut previous = problem.slot_exclusivity_energy(&state).unwrap();
    for n in 1..3 {
        state[grid.index(n, 0)] = 1;
        let next = problem.slot_exclusivity_energy(&state).unwrap();
        assert!(next > previous);
        previous = next;
    }

    // Row 0 goes 1 → 2 → 3 selected slots.
    let mut state = vec![0u8; 9];
    for n in 0..3 {
        state[grid.index(n, n)] = 1;
    }
    let mut previous = problem.agent_exclusivity_energy(&state).unwrap();
    for d in 1..3 {
        state[grid.index(0, d)] = 1;
        let next = problem.agent_exclusivity_energy(&state).unwrap();
        assert!(next > previous);
        previous = next;
    }

    // Emptying a feasible row or column also costs.
    let mut state = vec![0u8; 9];
    state[grid.index(1, 1)] = 1;
    state[grid.index(2, 2)] = 1;
    assert_eq!(problem.agent_exclusivity_energy(&state).unwrap(), 1.0);
    assert_eq!(problem.slot_exclusivity_energy(&state).unwrap(), 1.0);
}

// ---------------------------------------------------------------------------
// Ground states
// ---------------------------------------------------------------------------

#[test]
fn ground_energy_of_three_by_five() {
    let problem = AssignmentProblem::new(3, 5, weights()).unwrap();
    let bqm = problem.compile();
    let mut min = f64::INFINITY;
    let mut degeneracy = 0;
    for state in all_states(15) {
        let e = bqm.energy(&state).unwrap();
        if e < min - 1e-9 {
            min = e;
            degeneracy = 1;
        } else if (e - min).abs() < 1e-9 {
            degeneracy += 1;
        }
    }
    // Each agent on a distinct slot, two slots left uncovered.
    assert!((min - 0.6).abs() < 1e-9);
    assert_eq!(degeneracy, 5 * 4 * 3);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn builds_are_bit_identical() {
    let a = build_model(4, 6, &weights()).unwrap();
    let b = build_model(4, 6, &weights()).unwrap();
    assert_eq!(a, b);
    let bits = |m: &qsweep_model::BinaryQuadraticModel| {
        m.interactions()
            .map(|(k, c)| (k, c.to_bits()))
            .collect::<Vec<_>>()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.offset().to_bits(), b.offset().to_bits());
}
