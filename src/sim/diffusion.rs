// Explicit (forward-Euler) viscous diffusion

use crate::{ScalarField, sim::numeric};

/// Largest timestep for which explicit diffusion stays stable, i.e. dx² / (4ν).
///
/// Returns `None` when `viscosity` is zero (no diffusion, no bound).
pub fn stable_dt(dx: f32, viscosity: f32) -> Option<f32> {
    if viscosity > 0. {
        Some(dx * dx / (4. * viscosity))
    } else {
        None
    }
}

/// Diffuse a scalar field over one timestep: f + ν·dt·∇²f
///
/// The boundary ring passes through unchanged since the laplacian is zero
/// there. Stable only while `dt <= stable_dt(dx, viscosity)`.
///
/// Parameters
/// - `field` - The field to diffuse
/// - `viscosity` - The kinematic viscosity ν
/// - `dt` - The timestep
/// - `dx` - The (uniform) grid spacing
pub fn diffuse(field: &ScalarField, viscosity: f32, dt: f32, dx: f32) -> ScalarField {
    let lap = numeric::laplacian(field, dx);
    let k = viscosity * dt;

    let mut diffused = field.clone();
    for (x, l) in diffused.as_mut_slice().iter_mut().zip(lap.iter()) {
        *x += k * l;
    }

    diffused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Grid;

    #[test]
    fn test_zero_viscosity_is_identity() {
        let field = Grid::from_fn(6, 5, |r, c| ((r * 7 + c * 3) % 5) as f32 - 1.5);

        let diffused = diffuse(&field, 0., 0.1, 1.);

        assert_eq!(field, diffused);
    }

    #[test]
    fn test_spike_spreads_to_neighbours() {
        let mut field = Grid::from_element(5, 5, 0.);
        field[(2, 2)] = 1.;

        let diffused = diffuse(&field, 0.1, 0.5, 1.);

        // ν·dt = 0.05
        assert!((diffused[(2, 2)] - 0.8).abs() < 1e-6);
        for (r, c) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert!((diffused[(r, c)] - 0.05).abs() < 1e-6);
        }

        // total mass is conserved for an interior spike
        let total: f32 = diffused.iter().sum();
        assert!((total - 1.).abs() < 1e-5);
    }

    #[test]
    fn test_ring_passes_through() {
        let field = Grid::from_fn(4, 4, |r, c| (r + c) as f32 * 1.5);

        let diffused = diffuse(&field, 0.2, 0.3, 0.5);

        for c in 0..4 {
            assert_eq!(diffused[(0, c)], field[(0, c)]);
            assert_eq!(diffused[(3, c)], field[(3, c)]);
        }
        for r in 0..4 {
            assert_eq!(diffused[(r, 0)], field[(r, 0)]);
            assert_eq!(diffused[(r, 3)], field[(r, 3)]);
        }
    }

    #[test]
    fn test_stable_dt() {
        let bound = stable_dt(1., 0.02).unwrap();
        assert!((bound - 12.5).abs() < 1e-4);
        assert_eq!(stable_dt(0.5, 0.25), Some(0.25));
        assert_eq!(stable_dt(1., 0.), None);
    }
}
