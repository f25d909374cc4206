//! Piecewise-linear anneal schedules.
//!
//! A schedule is a list of `(time, s)` checkpoints where `s ∈ [0, 1]` is the
//! normalised anneal fraction (`s = 1` is fully classical, `s = 0` fully
//! disordered). Between checkpoints `s` is interpolated linearly.
//!
//! ```text
//!   s
//!   1 ●                       ●       reverse schedule
//!      \                     /        [(0,1), (2,0.45), (8,0.45), (10,1)]
//!       \                   /
//! 0.45   ●─────────────────●
//!     0  2                 8  10  t
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Validated anneal schedule.
///
/// Serialises as a list of `[time, s]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct AnnealSchedule {
    points: Vec<(f64, f64)>,
}

impl AnnealSchedule {
    /// Create a schedule from `(time, s)` checkpoints.
    ///
    /// Requires at least two points, a first time of exactly 0, strictly
    /// increasing finite times, and every `s` in `[0, 1]`.
    pub fn new(points: Vec<(f64, f64)>) -> HalResult<Self> {
        if points.len() < 2 {
            return Err(HalError::InvalidSchedule(format!(
                "schedule needs at least 2 points, got {}",
                points.len()
            )));
        }
        if points[0].0 != 0.0 {
            return Err(HalError::InvalidSchedule(format!(
                "schedule must start at t=0, starts at t={}",
                points[0].0
            )));
        }
        for (i, &(t, s)) in points.iter().enumerate() {
            if !t.is_finite() || !s.is_finite() {
                return Err(HalError::InvalidSchedule(format!(
                    "point {i} is not finite: ({t}, {s})"
                )));
            }
            if !(0.0..=1.0).contains(&s) {
                return Err(HalError::InvalidSchedule(format!(
                    "point {i} has s={s}, expected a value in [0, 1]"
                )));
            }
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 {
                return Err(HalError::InvalidSchedule(format!(
                    "time must strictly increase: point {} (t={}) follows t={}",
                    i + 1,
                    pair[1].0,
                    pair[0].0
                )));
            }
        }
        Ok(Self { points })
    }

    /// Canonical reverse schedule: ramp from `s = 1` down to `target`, hold
    /// for `pause`, ramp back up over the same `ramp` time.
    pub fn reverse(target: f64, ramp: f64, pause: f64) -> HalResult<Self> {
        if ramp.is_nan() || ramp <= 0.0 || pause.is_nan() || pause < 0.0 {
            return Err(HalError::InvalidSchedule(format!(
                "ramp must be positive and pause non-negative, got ramp={ramp}, pause={pause}"
            )));
        }
        let mut points = vec![(0.0, 1.0), (ramp, target)];
        if pause > 0.0 {
            points.push((ramp + pause, target));
        }
        points.push((2.0 * ramp + pause, 1.0));
        Self::new(points)
    }

    /// Additional checks for reverse annealing: the schedule must start and
    /// end fully annealed (`s = 1`).
    pub fn validate_reverse(&self) -> HalResult<()> {
        let first = self.points[0].1;
        let last = self.points[self.points.len() - 1].1;
        if first != 1.0 || last != 1.0 {
            return Err(HalError::InvalidSchedule(format!(
                "reverse schedule must start and end at s=1, got s={first} .. s={last}"
            )));
        }
        Ok(())
    }

    /// The checkpoints.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Total anneal time (time of the last checkpoint).
    pub fn duration(&self) -> f64 {
        self.points[self.points.len() - 1].0
    }

    /// Smallest `s` reached, i.e. how far the schedule perturbs the state.
    pub fn min_s(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min)
    }

    /// Interpolated `s` at time `t`, clamped to the schedule's ends.
    pub fn s_at(&self, t: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        let seg = self.points.partition_point(|p| p.0 <= t);
        let (t0, s0) = self.points[seg - 1];
        let (t1, s1) = self.points[seg];
        s0 + (s1 - s0) * (t - t0) / (t1 - t0)
    }
}

impl Default for AnnealSchedule {
    /// Ramp to `s = 0.45` over 2 time units, hold for 6, ramp back over 2.
    fn default() -> Self {
        Self {
            points: vec![(0.0, 1.0), (2.0, 0.45), (8.0, 0.45), (10.0, 1.0)],
        }
    }
}

impl TryFrom<Vec<(f64, f64)>> for AnnealSchedule {
    type Error = HalError;

    fn try_from(points: Vec<(f64, f64)>) -> HalResult<Self> {
        Self::new(points)
    }
}

impl From<AnnealSchedule> for Vec<(f64, f64)> {
    fn from(schedule: AnnealSchedule) -> Self {
        schedule.points
    }
}
