// Finite-difference operators on flat grids

use crate::{ScalarField, sim::grid::Grid};

/// Compute the 5-point laplacian of a scalar field f. That is ∇²f
///
/// Mathematically, this is ∇²f = (f[r,c+1] + f[r,c-1] + f[r+1,c] + f[r-1,c] - 4f[r,c]) / dx²
///
/// Only interior cells are computed; the boundary ring of the result is zero.
///
/// Parameters
/// - `field` - The scalar field to take the laplacian of
/// - `dx` - The (uniform) grid spacing
///
/// Returns:
///     A new `ScalarField` of the laplacian.
pub fn laplacian(field: &ScalarField, dx: f32) -> ScalarField {
    let (nx, ny) = field.shape();
    let mut lap: ScalarField = Grid::from_element(nx, ny, 0.);
    let dx2 = dx * dx;

    for (r, c) in field.interior() {
        lap[(r, c)] = (field[(r, c + 1)] + field[(r, c - 1)] + field[(r + 1, c)]
            + field[(r - 1, c)]
            - 4. * field[(r, c)])
            / dx2;
    }

    lap
}

/// Compute the central-difference divergence of the velocity field <u,v>. That is ∇⋅u
///
/// Mathematically, this is du/dx + dv/dy, evaluated at interior cells only.
///
/// Parameters:
/// - `u` - The horizontal velocity component
/// - `v` - The vertical velocity component
/// - `dx` - The (uniform) grid spacing
///
/// Returns:
///     A `ScalarField` of the divergence, zero on the boundary ring.
pub fn divergence(u: &ScalarField, v: &ScalarField, dx: f32) -> ScalarField {
    let (nx, ny) = u.shape();
    let mut div: ScalarField = Grid::from_element(nx, ny, 0.);

    for (r, c) in u.interior() {
        div[(r, c)] =
            ((u[(r, c + 1)] - u[(r, c - 1)]) + (v[(r + 1, c)] - v[(r - 1, c)])) / (2. * dx);
    }

    div
}

/// Summary norms of the interior of a field
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteriorNorm {
    /// sqrt of the sum of squares over interior cells
    pub l2: f32,
    /// largest absolute value over interior cells
    pub max_abs: f32,
}

pub fn interior_norm(field: &ScalarField) -> InteriorNorm {
    let mut sum_sq = 0.0f32;
    let mut max_abs = 0.0f32;

    for (r, c) in field.interior() {
        let x = field[(r, c)];
        sum_sq += x * x;
        max_abs = max_abs.max(x.abs());
    }

    InteriorNorm {
        l2: sum_sq.sqrt(),
        max_abs,
    }
}

/// Element-wise velocity magnitude sqrt(u² + v²)
pub fn magnitude(u: &ScalarField, v: &ScalarField) -> ScalarField {
    let (nx, ny) = u.shape();
    Grid::from_fn(nx, ny, |r, c| u[(r, c)].hypot(v[(r, c)]))
}

pub fn zero_where_mask(field: &mut ScalarField, mask: &Grid<bool>) {
    for (x, msk) in field.as_mut_slice().iter_mut().zip(mask.iter()) {
        if *msk {
            *x = 0.;
        }
    }
}
