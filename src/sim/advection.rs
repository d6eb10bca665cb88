// Semi-Lagrangian transport of scalar fields

use crate::{ScalarField, sim::grid::Grid};

/// Sample `field` at a fractional `(row, col)` position using bilinear
/// interpolation over the four surrounding cells. The position must already
/// be inside `[0, ny-1] x [0, nx-1]`; the upper neighbours are clamped to the
/// last row/column.
pub fn sample_bilinear(field: &ScalarField, row: f32, col: f32) -> f32 {
    let (nx, ny) = field.shape();

    let c0 = col.floor() as usize;
    let r0 = row.floor() as usize;
    let c1 = (c0 + 1).min(nx - 1);
    let r1 = (r0 + 1).min(ny - 1);

    let sx = col - c0 as f32;
    let sy = row - r0 as f32;

    let f00 = field[(r0, c0)];
    let f01 = field[(r0, c1)];
    let f10 = field[(r1, c0)];
    let f11 = field[(r1, c1)];

    (1. - sx) * (1. - sy) * f00 + sx * (1. - sy) * f01 + (1. - sx) * sy * f10 + sx * sy * f11
}

/// Advect a scalar field through the velocity field <u,v> by tracing each
/// cell backwards over one timestep and sampling the field at the source.
///
/// Unconditionally stable; repeated interpolation smears the field, which is
/// accepted.
///
/// Parameters
/// - `field` - The field to transport
/// - `u` - The horizontal velocity used for the back-trace
/// - `v` - The vertical velocity used for the back-trace
/// - `mask` - Solid cells, which are skipped and left at zero
/// - `dt` - The timestep
/// - `dx` - The (uniform) grid spacing
///
/// Returns
/// - The advected field as a new `ScalarField`
pub fn advect(
    field: &ScalarField,
    u: &ScalarField,
    v: &ScalarField,
    mask: &Grid<bool>,
    dt: f32,
    dx: f32,
) -> ScalarField {
    let (nx, ny) = field.shape();
    let mut advected: ScalarField = Grid::from_element(nx, ny, 0.);

    let dt_dx = dt / dx;
    let (max_col, max_row) = ((nx - 1) as f32, (ny - 1) as f32);

    for row in 0..ny {
        for col in 0..nx {
            let k = field.idx(row, col);
            if mask.as_slice()[k] {
                continue;
            }

            // trace back and keep the source inside the domain
            let src_col = (col as f32 - u.as_slice()[k] * dt_dx).clamp(0., max_col);
            let src_row = (row as f32 - v.as_slice()[k] * dt_dx).clamp(0., max_row);

            advected.as_mut_slice()[k] = sample_bilinear(field, src_row, src_col);
        }
    }

    advected
}
