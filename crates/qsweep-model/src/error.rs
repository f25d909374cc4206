//! Error types for the model crate.

use thiserror::Error;

/// Errors produced while building or evaluating an assignment model.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ModelError {
    /// The grid must have at least one agent and one slot.
    #[error("invalid problem dimensions: {agents} agents x {slots} slots (both must be at least 1)")]
    InvalidDimensions {
        /// Requested number of agents.
        agents: usize,
        /// Requested number of slots.
        slots: usize,
    },

    /// A penalty weight is NaN or infinite.
    #[error("penalty weight '{name}' must be finite, got {value}")]
    NonFiniteWeight {
        /// Name of the offending weight.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A state vector does not cover every model variable.
    #[error("state has {actual} entries but the model has {expected} variables")]
    StateLength {
        /// Number of variables in the model.
        expected: usize,
        /// Length of the supplied state.
        actual: usize,
    },

    /// A state vector contains something other than 0 or 1.
    #[error("state entry {index} is {value}, expected 0 or 1")]
    NonBinaryValue {
        /// Position of the offending entry.
        index: usize,
        /// The offending value.
        value: u8,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Check that `state` is a binary vector of length `expected`.
pub(crate) fn check_state(state: &[u8], expected: usize) -> ModelResult<()> {
    if state.len() != expected {
        return Err(ModelError::StateLength {
            expected,
            actual: state.len(),
        });
    }
    if let Some((index, &value)) = state.iter().enumerate().find(|(_, v)| **v > 1) {
        return Err(ModelError::NonBinaryValue { index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_display() {
        let err = ModelError::InvalidDimensions {
            agents: 0,
            slots: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("0 agents"));
        assert!(msg.contains("4 slots"));
    }

    #[test]
    fn test_check_state() {
        assert!(check_state(&[0, 1, 1], 3).is_ok());
        assert_eq!(
            check_state(&[0, 1], 3),
            Err(ModelError::StateLength {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            check_state(&[0, 2, 1], 3),
            Err(ModelError::NonBinaryValue { index: 1, value: 2 })
        );
    }
}
