//! Metropolis single-flip annealing kernel.
//!
//! The kernel keeps a local field per variable,
//!
//!   f_i = h_i + Σ_j Q_ij·x_j
//!
//! so that the energy change of flipping `x_i` is `(1 − 2·x_i)·f_i` and a
//! flip costs one pass over `i`'s neighbours.

use rand::Rng;
use rand::rngs::StdRng;

use qsweep_model::BinaryQuadraticModel;

/// Inverse-temperature bounds `(hot, cold)` with `hot < cold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaRange {
    /// Starting (high temperature) β.
    pub hot: f64,
    /// Final (low temperature) β.
    pub cold: f64,
}

impl BetaRange {
    /// β at `fraction ∈ [0, 1]` of a geometric hot → cold ramp.
    pub fn at(&self, fraction: f64) -> f64 {
        self.hot * (self.cold / self.hot).powf(fraction.clamp(0.0, 1.0))
    }
}

/// Sparse view of a model prepared for flipping.
pub(crate) struct Couplings {
    linear: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl Couplings {
    pub(crate) fn from_model(model: &BinaryQuadraticModel) -> Self {
        Self {
            linear: model.linear_terms().to_vec(),
            neighbors: model.adjacency(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.linear.len()
    }

    /// Default β range: a hot start accepts the worst single flip with
    /// probability 1/2, a cold end accepts the smallest one with 1/100.
    pub(crate) fn default_beta_range(&self) -> BetaRange {
        let mut max_delta = 0.0_f64;
        let mut min_delta = f64::INFINITY;
        for (h, nbrs) in self.linear.iter().zip(&self.neighbors) {
            let bound = h.abs() + nbrs.iter().map(|(_, q)| q.abs()).sum::<f64>();
            max_delta = max_delta.max(bound);
            for c in std::iter::once(*h).chain(nbrs.iter().map(|(_, q)| *q)) {
                if c != 0.0 {
                    min_delta = min_delta.min(c.abs());
                }
            }
        }
        if max_delta == 0.0 || !min_delta.is_finite() {
            return BetaRange { hot: 0.1, cold: 1.0 };
        }
        let hot = std::f64::consts::LN_2 / max_delta;
        let cold = 100.0_f64.ln() / min_delta;
        BetaRange {
            hot,
            cold: cold.max(hot),
        }
    }
}

/// One annealing trajectory.
pub(crate) struct Walker {
    state: Vec<u8>,
    field: Vec<f64>,
}

impl Walker {
    pub(crate) fn new(couplings: &Couplings, state: Vec<u8>) -> Self {
        let mut field = couplings.linear.clone();
        for (i, nbrs) in couplings.neighbors.iter().enumerate() {
            for &(j, q) in nbrs {
                if state[j] == 1 {
                    field[i] += q;
                }
            }
        }
        Self { state, field }
    }

    pub(crate) fn random(couplings: &Couplings, rng: &mut StdRng) -> Self {
        let state = (0..couplings.len()).map(|_| u8::from(rng.gen_bool(0.5))).collect();
        Self::new(couplings, state)
    }

    /// Energy change of flipping variable `i`.
    pub(crate) fn delta(&self, i: usize) -> f64 {
        if self.state[i] == 1 {
            -self.field[i]
        } else {
            self.field[i]
        }
    }

    pub(crate) fn flip(&mut self, couplings: &Couplings, i: usize) {
        let step = if self.state[i] == 1 { -1.0 } else { 1.0 };
        self.state[i] ^= 1;
        for &(j, q) in &couplings.neighbors[i] {
            self.field[j] += step * q;
        }
    }

    /// One Metropolis pass over every variable at inverse temperature `beta`.
    pub(crate) fn sweep(&mut self, couplings: &Couplings, beta: f64, rng: &mut StdRng) {
        for i in 0..self.state.len() {
            let delta = self.delta(i);
            if delta <= 0.0 || rng.r#gen::<f64>() < (-beta * delta).exp() {
                self.flip(couplings, i);
            }
        }
    }

    pub(crate) fn state(&self) -> &[u8] {
        &self.state
    }

    pub(crate) fn into_state(self) -> Vec<u8> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsweep_model::{ProblemWeights, build_model};
    use rand::SeedableRng;

    fn model() -> BinaryQuadraticModel {
        build_model(2, 3, &ProblemWeights::default()).unwrap()
    }

    #[test]
    fn test_delta_matches_energy_difference() {
        let m = model();
        let couplings = Couplings::from_model(&m);
        let mut rng = StdRng::seed_from_u64(1);
        let mut walker = Walker::random(&couplings, &mut rng);
        for i in 0..couplings.len() {
            let before = m.energy(walker.state()).unwrap();
            let delta = walker.delta(i);
            walker.flip(&couplings, i);
            let after = m.energy(walker.state()).unwrap();
            assert!((after - before - delta).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_temperature_sweep_never_increases_energy() {
        let m = model();
        let couplings = Couplings::from_model(&m);
        let mut rng = StdRng::seed_from_u64(2);
        let mut walker = Walker::random(&couplings, &mut rng);
        let mut last = m.energy(walker.state()).unwrap();
        for _ in 0..10 {
            walker.sweep(&couplings, f64::INFINITY, &mut rng);
            let e = m.energy(walker.state()).unwrap();
            assert!(e <= last + 1e-12);
            last = e;
        }
    }

    #[test]
    fn test_default_beta_range() {
        let couplings = Couplings::from_model(&model());
        let range = couplings.default_beta_range();
        assert!(range.hot > 0.0);
        assert!(range.cold > range.hot);
        assert_eq!(range.at(0.0), range.hot);
        assert!((range.at(1.0) - range.cold).abs() < 1e-12);
    }

    #[test]
    fn test_beta_range_is_geometric() {
        let range = BetaRange { hot: 0.1, cold: 10.0 };
        assert!((range.at(0.5) - 1.0).abs() < 1e-12);
    }
}
