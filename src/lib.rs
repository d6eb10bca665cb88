extern crate nalgebra as na;

pub mod observers;
pub mod postprocessing;
pub mod preprocessing;
pub mod sim;

/// A scalar quantity stored on the simulation grid
pub type ScalarField = sim::grid::Grid<f32>;

/// The (u, v) components of a velocity field
pub type VelocityField = [ScalarField; 2];
