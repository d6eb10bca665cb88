use std::{error::Error, fmt};

/// Recoverable failures reported by the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// An obstacle mask whose cell count does not match the grid
    MaskSize { expected: usize, actual: usize },

    /// A mask with the right cell count but a different (nx, ny) shape
    MaskShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Rejected construction parameters
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::MaskSize { expected, actual } => write!(
                f,
                "obstacle mask has {actual} cells, expected {expected}"
            ),
            SimError::MaskShape { expected, actual } => write!(
                f,
                "obstacle mask is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            SimError::InvalidConfig(reason) => write!(f, "invalid simulation config: {reason}"),
        }
    }
}

impl Error for SimError {}
