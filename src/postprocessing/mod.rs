// Contains post-processors for summarizing simulation results

use crate::{preprocessing::SimulationInput, sim::task::SimulationOutput};
use std::fs;
use tracing::{info, warn};

pub fn postprocess(sim_input: &SimulationInput, sim_output: &SimulationOutput) {
    let peak = sim_output
        .max_velocity
        .iter()
        .fold(0.0f32, |m, &v| m.max(v));

    info!(
        "Run summary:\n\n\
        \t steps:          {}\n\
        \t simulated time: {:.3}\n\
        \t effective dt:   {} (requested {})\n\
        \t peak |u|:       {:.4}\n\
        \t final |u|max:   {:.4}\n\
        \t frames written: {}\n",
        sim_output.max_velocity.len(),
        sim_output.elapsed,
        sim_output.effective_dt,
        sim_input.solver.dt,
        peak,
        sim_output.max_velocity.last().copied().unwrap_or(0.),
        sim_output.frames_written,
    );

    if let Some(report) = sim_output.final_projection {
        info!(
            "Final projection: |div| {:.3e} -> {:.3e} (max {:.3e} -> {:.3e})",
            report.divergence_before.l2,
            report.divergence_after.l2,
            report.divergence_before.max_abs,
            report.divergence_after.max_abs,
        );
    }

    if let Some(settings) = &sim_input.frames {
        if settings.retain_frames {
            info!("Frames kept in {}", settings.frames_dir.display());
        } else {
            _ = fs::remove_dir_all(&settings.frames_dir)
                .inspect_err(|err| warn!("Unable to cleanup frames output: {:?}", err));
        }
    }
}
