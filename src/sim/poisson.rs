// Fixed-budget Jacobi pressure solve and velocity projection

use tracing::debug;

use crate::{
    ScalarField,
    sim::{
        boundary::{self, ChannelBoundary},
        grid::Grid,
        numeric::{self, InteriorNorm},
    },
};

/// Interior divergence measured on either side of a projection
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionReport {
    pub divergence_before: InteriorNorm,
    pub divergence_after: InteriorNorm,
}

/// Relax the pressure poisson equation ∇²p = div with Jacobi sweeps.
///
/// Runs exactly `iterations` sweeps; there is no convergence test. `p` is
/// used as the initial guess and its boundary ring is never written, which
/// acts as a Dirichlet condition. Solid cells are pinned to zero at the end
/// of every sweep.
///
/// Parameters
/// - `p` - The pressure field, updated in place
/// - `div` - The RHS of the poisson equation
/// - `mask` - A boolean mask representing the solid object
/// - `dx` - The (uniform) grid spacing
/// - `iterations` - The number of sweeps to perform
pub fn jacobi_relax(
    p: &mut ScalarField,
    div: &ScalarField,
    mask: &Grid<bool>,
    dx: f32,
    iterations: usize,
) {
    let dx2 = dx * dx;
    let mut next = p.clone();

    for _ in 0..iterations {
        for (r, c) in p.interior() {
            if mask[(r, c)] {
                continue;
            }
            next[(r, c)] = 0.25
                * (p[(r, c + 1)] + p[(r, c - 1)] + p[(r + 1, c)] + p[(r - 1, c)]
                    - div[(r, c)] * dx2);
        }
        numeric::zero_where_mask(&mut next, mask);

        std::mem::swap(p, &mut next);
    }
}

/// Subtract the central-difference pressure gradient from the interior velocity
pub fn subtract_gradient(u: &mut ScalarField, v: &mut ScalarField, p: &ScalarField, dx: f32) {
    let two_dx = 2. * dx;

    for (r, c) in p.interior() {
        u[(r, c)] -= (p[(r, c + 1)] - p[(r, c - 1)]) / two_dx;
        v[(r, c)] -= (p[(r + 1, c)] - p[(r - 1, c)]) / two_dx;
    }
}

/// Project the velocity field towards a divergence-free one.
///
/// The order is significant: divergence, relaxation, gradient correction,
/// then the boundary and obstacle constraints last so neither of the earlier
/// stages can push flow through a wall or solid. The constraints are also
/// imposed on the incoming field so the inlet drives the pressure solve.
///
/// Parameters
/// - `u`, `v` - The velocity field, updated in place
/// - `p` - The pressure field, warm-started and updated in place
/// - `mask` - A boolean mask representing the solid object
/// - `bc` - The channel boundary conditions
/// - `dx` - The (uniform) grid spacing
/// - `iterations` - The Jacobi sweep budget
///
/// Returns
/// - A `ProjectionReport` with the divergence before and after
pub fn project(
    u: &mut ScalarField,
    v: &mut ScalarField,
    p: &mut ScalarField,
    mask: &Grid<bool>,
    bc: &ChannelBoundary,
    dx: f32,
    iterations: usize,
) -> ProjectionReport {
    bc.apply(u, v);
    boundary::apply_obstacle(u, v, mask);

    let div = numeric::divergence(u, v, dx);
    let divergence_before = numeric::interior_norm(&div);

    jacobi_relax(p, &div, mask, dx, iterations);
    subtract_gradient(u, v, p, dx);

    bc.apply(u, v);
    boundary::apply_obstacle(u, v, mask);

    let divergence_after = numeric::interior_norm(&numeric::divergence(u, v, dx));

    debug!(
        "projection: |div| {:.3e} -> {:.3e} (max {:.3e} -> {:.3e})",
        divergence_before.l2,
        divergence_after.l2,
        divergence_before.max_abs,
        divergence_after.max_abs
    );

    ProjectionReport {
        divergence_before,
        divergence_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jacobi_zero_rhs_keeps_zero() {
        let mut p = Grid::from_element(6, 6, 0.);
        let div = Grid::from_element(6, 6, 0.);
        let mask = Grid::from_element(6, 6, false);

        jacobi_relax(&mut p, &div, &mask, 1., 100);

        assert!(p.iter().all(|x| *x == 0.));
    }

    #[test]
    fn test_jacobi_converges_on_small_system() {
        // one interior unknown: p = 0.25 * (0 - div * dx²)
        let mut p = Grid::from_element(3, 3, 0.);
        let mut div = Grid::from_element(3, 3, 0.);
        div[(1, 1)] = 2.;
        let mask = Grid::from_element(3, 3, false);

        jacobi_relax(&mut p, &div, &mask, 0.5, 1);

        assert!((p[(1, 1)] - -0.125).abs() < 1e-7);
    }

    #[test]
    fn test_jacobi_solves_poisson() {
        let (nx, ny) = (8, 8);
        let dx = 1.;
        let mut div = Grid::from_element(nx, ny, 0.);
        div[(3, 4)] = 1.;
        div[(4, 3)] = -1.;
        let mask = Grid::from_element(nx, ny, false);
        let mut p = Grid::from_element(nx, ny, 0.);

        jacobi_relax(&mut p, &div, &mask, dx, 500);

        // the residual of ∇²p = div should be small everywhere inside
        let lap = numeric::laplacian(&p, dx);
        for (r, c) in p.interior() {
            assert!((lap[(r, c)] - div[(r, c)]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_jacobi_pins_obstacle() {
        let (nx, ny) = (6, 6);
        let mut p = Grid::from_element(nx, ny, 0.);
        p[(2, 2)] = 5.;
        let div = Grid::from_fn(nx, ny, |r, c| (r as f32) - (c as f32));
        let mask = Grid::from_fn(nx, ny, |r, c| (2..4).contains(&r) && (2..4).contains(&c));

        for iterations in [1, 2, 7] {
            jacobi_relax(&mut p, &div, &mask, 1., iterations);
            for (k, solid) in mask.iter().enumerate() {
                if *solid {
                    assert_eq!(p.as_slice()[k], 0.);
                }
            }
        }
    }

    #[test]
    fn test_project_enforces_constraints_last() {
        let (nx, ny) = (7, 6);
        let mut u = Grid::from_fn(nx, ny, |r, c| ((r * 3 + c) % 4) as f32 - 1.);
        let mut v = Grid::from_fn(nx, ny, |r, c| ((r + c * 5) % 3) as f32 - 1.);
        let mut p = Grid::from_element(nx, ny, 0.);
        let mask = Grid::from_fn(nx, ny, |r, c| r == 3 && (2..4).contains(&c));
        let bc = ChannelBoundary::new(2.);

        project(&mut u, &mut v, &mut p, &mask, &bc, 1., 100);

        for row in 0..ny {
            assert_eq!((u[(row, 0)], v[(row, 0)]), (2., 0.));
            assert_eq!((u[(row, nx - 1)], v[(row, nx - 1)]), (0., 0.));
        }
        for (k, solid) in mask.iter().enumerate() {
            if *solid {
                assert_eq!(u.as_slice()[k], 0.);
                assert_eq!(v.as_slice()[k], 0.);
                assert_eq!(p.as_slice()[k], 0.);
            }
        }
    }

    #[test]
    fn test_project_reduces_divergence() {
        let (nx, ny) = (10, 8);
        let mut u = Grid::from_element(nx, ny, 0.);
        let mut v = Grid::from_element(nx, ny, 0.);
        let mut p = Grid::from_element(nx, ny, 0.);
        let mask = Grid::from_element(nx, ny, false);
        let bc = ChannelBoundary::new(1.);

        let report = project(&mut u, &mut v, &mut p, &mask, &bc, 1., 100);

        assert!(report.divergence_before.l2 > 0.);
        assert!(report.divergence_after.l2 < report.divergence_before.l2);
    }
}
