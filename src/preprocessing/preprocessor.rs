// Handles PNG obstacle input

use image::{GenericImageView, ImageReader, Pixel};
use na::DMatrix;
use std::{error::Error, path::Path};

use crate::sim::grid::Grid;

const THRESHOLD_LUMA: u8 = 127;

/// Load a DMatrix boolean mask from a PNG image by looking at pixel luminosity.
/// Dark pixels are solid.
///
/// Parameters
/// - `image` - The path to the image to process
///
/// Returns
/// - The boolean mask as a Result
pub fn mask_from_image(image: &Path) -> Result<DMatrix<bool>, Box<dyn Error>> {
    let image = ImageReader::open(image)?.decode()?;

    let (nrows, ncols) = (image.height(), image.width());

    let mut mask: DMatrix<bool> = DMatrix::from_element(nrows as usize, ncols as usize, false);

    // load mask
    image.pixels().for_each(|(x, y, color)| {
        *(mask.index_mut((y as usize, x as usize))) = color.to_luma().0[0] < THRESHOLD_LUMA
    });

    Ok(mask)
}

/// Convert a (column-major) nalgebra mask into a row-major simulation grid
pub fn grid_from_matrix(mask: &DMatrix<bool>) -> Grid<bool> {
    let (nrows, ncols) = mask.shape();
    Grid::from_fn(ncols, nrows, |r, c| mask[(r, c)])
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use na::dmatrix;

    use super::*;

    #[test]
    fn test_grid_from_matrix_keeps_orientation() {
        let mask = dmatrix![
            true, false, false;
            false, false, true;
        ];

        let grid = grid_from_matrix(&mask);

        assert_eq!(grid.shape(), (3, 2));
        assert_eq!(grid.as_slice(), &[true, false, false, false, false, true]);
    }

    #[test]
    fn test_mask_from_image() {
        let mut img = GrayImage::from_pixel(4, 3, Luma([255u8]));
        img.put_pixel(1, 2, Luma([0u8]));
        img.put_pixel(3, 0, Luma([100u8]));

        let path = std::env::temp_dir().join(format!("channel-flow-mask-{}.png", std::process::id()));
        img.save(&path).unwrap();

        let mask = mask_from_image(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(mask.shape(), (3, 4));
        assert!(mask[(2, 1)]);
        assert!(mask[(0, 3)]);
        assert_eq!(mask.iter().filter(|m| **m).count(), 2);
    }
}
