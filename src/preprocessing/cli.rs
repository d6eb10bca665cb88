use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use tracing::info;

use crate::{
    preprocessing::{
        ImageStreamSettings, OutputField, SimulationInput,
        preprocessor::{grid_from_matrix, mask_from_image},
        serial_mask::SerialMask,
        shapes::ObstacleShape,
    },
    sim::{SolverConfig, grid::Grid, simulator::DEFAULT_PRESSURE_ITERATIONS},
};

static DEFAULT_FRAMES_PATH: LazyLock<&Path> = LazyLock::new(|| Path::new("sim-frames"));

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(help = "The path to a PNG image to use as the solid object. Sets the grid size.")]
    mask_path: Option<PathBuf>,

    #[arg(long, value_enum, help = "A built-in obstacle shape, used when no image is given.")]
    shape: Option<ObstacleShape>,

    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(long, help = "Optional path to save the effective input file to.")]
    pub input_json_savepath: Option<PathBuf>,

    #[arg(long, help = "Write PNG frames of the selected field.")]
    frames: bool,

    #[arg(
        long,
        help = "An optional directory pointing to where frames should be saved."
    )]
    frames_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Whether or not frames should be retained after the run.",
        default_value = "false"
    )]
    retain_frames: bool,

    #[arg(long, value_enum, default_value = "velocity", help = "The field drawn in each frame.")]
    field: OutputField,

    #[arg(long, default_value = "10", help = "Write a frame every N steps.")]
    frame_interval: usize,

    #[arg(long, default_value = "200", help = "Grid columns.")]
    nx: usize,

    #[arg(long, default_value = "80", help = "Grid rows.")]
    ny: usize,

    #[arg(long, default_value = "1.0", help = "Grid spacing.")]
    dx: f32,

    #[arg(long, default_value = "0.1", help = "Requested timestep.")]
    dt: f32,

    #[arg(long, default_value = "0.02", help = "Kinematic viscosity.")]
    viscosity: f32,

    #[arg(long, help = "Inflow x velocity.", default_value = "1.0")]
    inflow: f32,

    #[arg(long, default_value_t = DEFAULT_PRESSURE_ITERATIONS, help = "Jacobi sweeps per step.")]
    pressure_iterations: usize,

    #[arg(long, help = "Do not cap dt at the diffusion stability bound.")]
    no_clamp: bool,

    #[arg(long, help = "Inject dye of this concentration at the inlet.")]
    dye: Option<f32>,

    #[arg(short, long, default_value = "500", help = "Number of steps to run.")]
    steps: usize,

    #[arg(short, long, help = "Log per-step diagnostics.")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn build_input(&self) -> anyhow::Result<SimulationInput> {
        // if the input file is supplied, just use that
        if let Some(input_filepath) = &self.input_json {
            if input_filepath.is_dir() {
                bail!("Input file {:?} is a directory.", input_filepath);
            }

            info!("Using input file {}", input_filepath.display());

            let input_file = File::open(input_filepath)
                .with_context(|| format!("Failed to open input file {:?}", input_filepath))?;

            let reader = BufReader::new(input_file);
            let mut loaded_input: SimulationInput = serde_json::from_reader(reader)
                .context("Failed to deserialize input file")?;

            if loaded_input.mask.is_none() {
                if let Some(mask) = self.load_mask(loaded_input.nx, loaded_input.ny)? {
                    (loaded_input.nx, loaded_input.ny) = mask.shape();
                    loaded_input.mask = Some(SerialMask::from_mask(&mask));
                }
            }

            if let Some(mask) = &loaded_input.mask {
                if mask.shape() != (loaded_input.nx, loaded_input.ny) {
                    bail!(
                        "Input file mask is {:?} but the grid is {}x{}",
                        mask.shape(),
                        loaded_input.nx,
                        loaded_input.ny
                    );
                }
            }

            return Ok(loaded_input);
        }

        // otherwise, build the input from the other arguments
        let mask = self.load_mask(self.nx, self.ny)?;
        let (nx, ny) = mask.as_ref().map(Grid::shape).unwrap_or((self.nx, self.ny));

        let frames = self.frames.then(|| ImageStreamSettings {
            frames_dir: self
                .frames_dir
                .clone()
                .unwrap_or_else(|| (*DEFAULT_FRAMES_PATH).into()),
            retain_frames: self.retain_frames,
            field: self.field,
            frame_interval: self.frame_interval.max(1),
        });

        Ok(SimulationInput {
            nx,
            ny,
            solver: SolverConfig {
                dx: self.dx,
                dt: self.dt,
                viscosity: self.viscosity,
                inflow: self.inflow,
                pressure_iterations: self.pressure_iterations,
                stability_clamp: !self.no_clamp,
                dye_inflow: self.dye,
            },
            steps: self.steps,
            mask: mask.as_ref().map(SerialMask::from_mask),
            frames,
        })
    }

    /// Resolve the obstacle from the image path or the built-in shape. An
    /// image takes precedence and dictates the grid size.
    fn load_mask(&self, nx: usize, ny: usize) -> anyhow::Result<Option<Grid<bool>>> {
        if let Some(mask_path) = &self.mask_path {
            let matrix = mask_from_image(mask_path)
                .map_err(|err| anyhow!("Failed to load mask {:?}: {}", mask_path, err))?;
            let mask = grid_from_matrix(&matrix);

            info!(
                "Loaded obstacle from {}; grid is {}x{}",
                mask_path.display(),
                mask.nx(),
                mask.ny()
            );
            return Ok(Some(mask));
        }

        Ok(self.shape.map(|shape| shape.mask(nx, ny)))
    }
}

/// Write the effective input next to the run so it can be replayed with `--input-json`
pub fn save_input(input: &SimulationInput, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), input)
        .with_context(|| format!("Failed to write input to {:?}", path))?;

    info!("Saved input to {}", path.display());
    Ok(())
}
