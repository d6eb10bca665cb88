// Built-in obstacle shapes rasterized onto the simulation grid

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::sim::grid::Grid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleShape {
    /// Centered square, side a quarter of the shorter grid edge
    Square,
    /// Centered disc, radius a quarter of the shorter grid edge
    Circle,
    /// Centered ellipse with semi-axes nx/4 and ny/6
    Ellipse,
    /// Wedge filling the lower-left half of the domain
    Triangle,
    /// Flat plate left of center, facing the inflow
    Plate,
}

impl ObstacleShape {
    /// Rasterize the shape into an `nx` x `ny` mask
    pub fn mask(&self, nx: usize, ny: usize) -> Grid<bool> {
        let shortest = nx.min(ny);

        match self {
            ObstacleShape::Square => {
                let side = shortest / 4;
                let x0 = (nx - side) / 2;
                let y0 = (ny - side) / 2;
                Grid::from_fn(nx, ny, |r, c| {
                    (y0..y0 + side).contains(&r) && (x0..x0 + side).contains(&c)
                })
            }
            ObstacleShape::Circle => {
                let radius = (shortest / 4) as f32;
                let (cx, cy) = ((nx / 2) as f32, (ny / 2) as f32);
                Grid::from_fn(nx, ny, |r, c| {
                    let (dx, dy) = (c as f32 - cx, r as f32 - cy);
                    dx * dx + dy * dy <= radius * radius
                })
            }
            ObstacleShape::Ellipse => {
                let (rx, ry) = (nx as f32 / 4., ny as f32 / 6.);
                let (cx, cy) = (nx as f32 / 2., ny as f32 / 2.);
                Grid::from_fn(nx, ny, |r, c| {
                    let (ex, ey) = ((c as f32 - cx) / rx, (r as f32 - cy) / ry);
                    ex * ex + ey * ey <= 1.
                })
            }
            ObstacleShape::Triangle => Grid::from_fn(nx, ny, |r, c| c < (r * nx) / ny),
            ObstacleShape::Plate => {
                let height = ny / 4;
                let width = (nx / 6).max(1);

                let y_start = ny / 2 - height / 2;
                let x_start = nx / 3 - width / 2;

                Grid::from_fn(nx, ny, |r, c| {
                    (y_start..y_start + height).contains(&r)
                        && (x_start..x_start + width).contains(&c)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(mask: &Grid<bool>) -> usize {
        mask.iter().filter(|m| **m).count()
    }

    #[test]
    fn test_square_area() {
        let mask = ObstacleShape::Square.mask(40, 20);

        assert_eq!(mask.shape(), (40, 20));
        assert_eq!(count(&mask), 5 * 5);
        assert!(mask[(10, 20)]);
    }

    #[test]
    fn test_circle_is_symmetric() {
        let mask = ObstacleShape::Circle.mask(21, 21);

        assert!(mask[(10, 10)]);
        assert!(!mask[(0, 0)]);
        for r in 0..21 {
            for c in 0..21 {
                assert_eq!(mask[(r, c)], mask[(20 - r, 20 - c)]);
            }
        }
    }

    #[test]
    fn test_shapes_leave_inlet_column_open() {
        for shape in [
            ObstacleShape::Square,
            ObstacleShape::Circle,
            ObstacleShape::Ellipse,
            ObstacleShape::Plate,
        ] {
            let mask = shape.mask(60, 30);
            assert!(count(&mask) > 0, "{shape:?} is empty");
            assert!((0..30).all(|r| !mask[(r, 0)]), "{shape:?} blocks the inlet");
        }
    }

    #[test]
    fn test_triangle_grows_with_row() {
        let mask = ObstacleShape::Triangle.mask(10, 10);

        let widths: Vec<usize> = (0..10)
            .map(|r| (0..10).filter(|&c| mask[(r, c)]).count())
            .collect();

        assert_eq!(widths, (0..10).collect::<Vec<_>>());
    }
}
