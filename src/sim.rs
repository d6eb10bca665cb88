// Numerical core of the channel-flow solver

pub mod advection;
pub mod boundary;
pub mod diffusion;
pub mod error;
pub mod grid;
pub mod numeric;
pub mod poisson;
pub mod simulator;
pub mod task;

pub use error::SimError;
pub use grid::Grid;
pub use simulator::{Simulator, SolverConfig};
