use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    preprocessing::serial_mask::SerialMask,
    sim::{Grid, SolverConfig},
};

pub mod cli;
pub mod preprocessor;
pub mod serial_mask;
pub mod shapes;

/// The field written to each frame
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputField {
    Velocity,
    Pressure,
    Dye,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ImageStreamSettings {
    pub frames_dir: PathBuf,
    pub retain_frames: bool,
    pub field: OutputField,

    /// Write a frame every `frame_interval` steps
    pub frame_interval: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SimulationInput {
    pub nx: usize,
    pub ny: usize,
    pub solver: SolverConfig,
    pub steps: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<SerialMask>, // None means an open channel

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<ImageStreamSettings>,
}

impl SimulationInput {
    pub fn get_mask(&self) -> Option<Grid<bool>> {
        self.mask.as_ref().and_then(SerialMask::to_mask)
    }
}

impl SimulationInput {
    pub fn log(&self) {
        let solid_cells = self
            .get_mask()
            .map(|m| m.iter().filter(|s| **s).count())
            .unwrap_or(0);

        info!(
            "Simulation is shown below:\n\n\
        \t grid:       {} x {} cells (dx = {})\n\
        \t steps:      {} (dt = {} requested)\n\
        \t inflow:     {}\n\
        \t viscosity:  {}\n\
        \t pressure:   {} jacobi sweeps\n\
        \t clamp dt:   {}\n\
        \t dye:        {:?}\n\
        \t obstacle:   {} solid cells\n\n\
        ",
            self.nx,
            self.ny,
            self.solver.dx,
            self.steps,
            self.solver.dt,
            self.solver.inflow,
            self.solver.viscosity,
            self.solver.pressure_iterations,
            self.solver.stability_clamp,
            self.solver.dye_inflow,
            solid_cells,
        );

        if let Some(frames) = &self.frames {
            match serde_json::to_string_pretty(frames) {
                Ok(frames_str) => info!("Frame output parameters are:\n\n{}", frames_str),
                Err(err) => info!("Frame output parameters unavailable: {err}"),
            }
        }
    }
}
