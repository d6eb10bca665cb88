use anyhow::anyhow;
use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use channel_flow::{
    postprocessing,
    preprocessing::cli::{self, CliArgs},
    sim::task,
};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .init();

    let simulation_input = args.build_input().inspect_err(|err| error!("{:#}", err))?;
    simulation_input.log();

    if let Some(savepath) = &args.input_json_savepath {
        cli::save_input(&simulation_input, savepath)?;
    }

    let sim_thread = task::spawn_sim_thread(simulation_input.clone());

    let sim_output = sim_thread
        .join()
        .map_err(|_| anyhow!("Solver thread panicked"))?
        .inspect_err(|err| error!("Simulation failed: {:#}", err))?;

    postprocessing::postprocess(&simulation_input, &sim_output);

    Ok(())
}
