// Task runner for the solver thread

use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};

use anyhow::{Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    ScalarField,
    observers::imgstream::{self, DisplayPacket},
    preprocessing::{ImageStreamSettings, OutputField, SimulationInput},
    sim::{numeric, poisson::ProjectionReport, simulator::Simulator},
};

pub struct SimulationOutput {
    /// Maximum velocity magnitude after each step
    pub max_velocity: Vec<f32>,
    pub final_projection: Option<ProjectionReport>,
    pub effective_dt: f32,
    pub elapsed: f32,
    pub frames_written: usize,
}

/// Build a simulator from the input, including its obstacle
pub fn build_simulator(simulation_input: &SimulationInput) -> anyhow::Result<Simulator> {
    let mut sim = Simulator::new(
        simulation_input.nx,
        simulation_input.ny,
        simulation_input.solver.clone(),
    )?;

    if let Some(serial) = &simulation_input.mask {
        let mask = serial
            .to_mask()
            .ok_or_else(|| anyhow!("Obstacle mask data does not match its shape"))?;
        sim.set_obstacle_grid(&mask)?;
    }

    Ok(sim)
}

/// Copy out the field to be drawn
pub fn snapshot(sim: &Simulator, field: OutputField) -> ScalarField {
    match field {
        OutputField::Velocity => {
            let (u, v) = sim.velocity();
            numeric::magnitude(&u, &v)
        }
        OutputField::Pressure => sim.pressure().clone(),
        OutputField::Dye => sim.dye().clone(),
    }
}

/// Step the simulator `steps` times, optionally streaming frames to an
/// image-io thread.
pub fn run(
    mut sim: Simulator,
    steps: usize,
    frames: Option<&ImageStreamSettings>,
) -> anyhow::Result<SimulationOutput> {
    let bar = ProgressBar::new(steps as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[Elapsed: {elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps (Remaining: {eta_precise})",
        )?
        .progress_chars("##-"),
    );

    // spawn image io thread
    let writer = frames.map(|settings| {
        let (sender, receiver) = mpsc::channel();
        let mask = sim.obstacle().clone();
        let frames_dir = settings.frames_dir.clone();
        let handle =
            thread::spawn(move || imgstream::image_io_loop(receiver, mask, &frames_dir));
        (sender, handle, settings)
    });

    let mut max_velocity: Vec<f32> = Vec::with_capacity(steps);
    for i in 0..steps {
        let report = sim.step();
        let vmax = sim.max_velocity_magnitude();

        debug!(
            "step {i}: max |u| = {vmax:.4}, |div| {:.3e} -> {:.3e}",
            report.divergence_before.l2, report.divergence_after.l2
        );

        if let Some((sender, _, settings)) = &writer {
            if i % settings.frame_interval.max(1) == 0 {
                let packet = DisplayPacket {
                    field: snapshot(&sim, settings.field),
                    i,
                };
                // the writer only hangs up after failing; its error surfaces on join
                if sender.send(packet).is_err() {
                    break;
                }
            }
        }

        max_velocity.push(vmax);
        bar.inc(1);
    }
    bar.finish();

    let frames_written = match writer {
        Some((sender, handle, _)) => {
            drop(sender);
            handle
                .join()
                .map_err(|_| anyhow!("Image io thread panicked"))?
                .context("Frame output failed")?
        }
        None => 0,
    };

    info!(
        "Finished {} steps in {:.3} time units",
        sim.step_count(),
        sim.elapsed()
    );

    Ok(SimulationOutput {
        max_velocity,
        final_projection: sim.last_projection(),
        effective_dt: sim.effective_dt(),
        elapsed: sim.elapsed(),
        frames_written,
    })
}

/// Spawns the simulation thread and starts the corresponding task
pub fn spawn_sim_thread(
    simulation_input: SimulationInput,
) -> JoinHandle<anyhow::Result<SimulationOutput>> {
    thread::spawn(move || {
        let sim = build_simulator(&simulation_input)?;
        run(sim, simulation_input.steps, simulation_input.frames.as_ref())
    })
}
