use serde::{Deserialize, Serialize};

use crate::sim::grid::Grid;

/// A JSON-friendly obstacle mask: row-major bytes plus the grid shape
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SerialMask {
    data: Vec<u8>,
    nx: usize,
    ny: usize,
}

impl SerialMask {
    pub fn from_mask(mask: &Grid<bool>) -> Self {
        let (nx, ny) = mask.shape();

        Self {
            data: mask.iter().map(|b| (*b) as u8).collect(),
            nx,
            ny,
        }
    }

    /// Rebuild the grid. Returns `None` if the stored data does not cover
    /// `nx * ny` cells (e.g. a hand-edited input file).
    pub fn to_mask(&self) -> Option<Grid<bool>> {
        Grid::from_vec(
            self.nx,
            self.ny,
            self.data.iter().map(|b| *b != 0).collect(),
        )
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}
