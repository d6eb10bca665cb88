use anyhow::Context;
use plotters::prelude::*;
use std::{fs, path::Path, sync::mpsc};
use tracing::debug;

use crate::{ScalarField, sim::grid::Grid};

#[derive(Clone)]
pub struct DisplayPacket {
    pub field: ScalarField,
    pub i: usize,
}

/// Map a field onto [0, 1] by its own range. A constant field maps to 0.
pub fn normalize(field: &ScalarField) -> ScalarField {
    let (lo, hi) = field
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let span = hi - lo;

    if !(span > 0.) {
        return field.map(|_| 0.);
    }
    field.map(|x| (x - lo) / span)
}

/// Save a grayscale PNG of `bitmap`, with solid cells drawn black
pub fn image_save(
    bitmap: &ScalarField,
    mask: &Grid<bool>,
    filename: &str,
    frames_dir: &Path,
) -> anyhow::Result<()> {
    let (cols, rows) = bitmap.shape();

    let filename = frames_dir.join(filename);

    let root = BitMapBackend::new(&filename, (cols as u32, rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    let bitmap = normalize(bitmap);

    for i in 0..rows {
        for j in 0..cols {
            let pixel_color = if mask[(i, j)] {
                BLACK
            } else {
                let pixel_intensity = (254.0 * bitmap[(i, j)]).floor() as u8;
                RGBColor(pixel_intensity, pixel_intensity, pixel_intensity)
            };

            root.draw_pixel((j as i32, i as i32), &pixel_color)?;
        }
    }
    root.present()?;

    Ok(())
}

/// Receive frames until the sending side hangs up, writing each to `frames_dir`
pub fn image_io_loop(
    inbound_bitmaps: mpsc::Receiver<DisplayPacket>,
    mask: Grid<bool>,
    frames_dir: &Path,
) -> anyhow::Result<usize> {
    if frames_dir.exists() {
        fs::remove_dir_all(frames_dir)
            .with_context(|| format!("Failed to clear {:?}", frames_dir))?;
    }
    fs::create_dir_all(frames_dir).with_context(|| format!("Failed to create {:?}", frames_dir))?;

    let mut written = 0;
    for inbound in inbound_bitmaps {
        image_save(
            &inbound.field,
            &mask,
            format!("{}.png", inbound.i).as_str(),
            frames_dir,
        )
        .with_context(|| format!("Image save failed for frame {}", inbound.i))?;

        debug!("Wrote frame {}", inbound.i);
        written += 1;
    }

    Ok(written)
}
