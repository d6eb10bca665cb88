// Inlet/outlet and solid-obstacle constraints on the velocity field

use crate::{
    ScalarField,
    sim::{grid::Grid, numeric},
};

/// Channel boundary: a constant inflow through column 0 and a closed wall at
/// the last column. The top and bottom rows are left to the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelBoundary {
    /// Horizontal inlet speed (u_in)
    pub inflow: f32,
}

impl ChannelBoundary {
    pub fn new(inflow: f32) -> Self {
        ChannelBoundary { inflow }
    }

    /// Set the boundary values on the velocity field <u,v>
    pub fn apply(&self, u: &mut ScalarField, v: &mut ScalarField) {
        let (nx, ny) = u.shape();

        for row in 0..ny {
            // inflow on left
            u[(row, 0)] = self.inflow;
            v[(row, 0)] = 0.;

            // wall on right
            u[(row, nx - 1)] = 0.;
            v[(row, nx - 1)] = 0.;
        }
    }

    /// Dye concentration held at the inlet column
    pub fn apply_scalar(&self, field: &mut ScalarField, inlet_value: f32) {
        for row in 0..field.ny() {
            field[(row, 0)] = inlet_value;
        }
    }
}

/// Zero-out velocity in the solid object
pub fn apply_obstacle(u: &mut ScalarField, v: &mut ScalarField, mask: &Grid<bool>) {
    numeric::zero_where_mask(u, mask);
    numeric::zero_where_mask(v, mask);
}
