use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use breakfast_kata::{EnergySource, Kitchen, LoadSim, Menu, TracingSink};

/// Cook a breakfast of eggs, bacon, and toast on shared appliances.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Increase verbosity (-v for cooking detail, -vv for scheduler traces).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Number of eggs to fry.
    #[arg(long, default_value_t = 3)]
    eggs: usize,
    /// Number of bacon slices to fry.
    #[arg(long, default_value_t = 3)]
    bacon: usize,
    /// Number of bread slices to toast.
    #[arg(long, default_value_t = 2)]
    bread: usize,
    /// Slots in the frying pan.
    #[arg(long, default_value_t = 3)]
    pan_capacity: usize,
    /// Slots in the toaster.
    #[arg(long, default_value_t = 2)]
    toaster_capacity: usize,
    /// Upper bound on the randomized energy per frame.
    #[arg(long, default_value_t = 0.25)]
    max_energy: f32,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match cook(&args) {
        // The exit code counts the wasted items.
        Ok(wasted) => ExitCode::from(wasted.min(255) as u8),
        Err(error) => {
            eprintln!("Failed to cook breakfast: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn cook(args: &Args) -> anyhow::Result<usize> {
    let menu = Menu {
        eggs: args.eggs,
        bacon: args.bacon,
        bread: args.bread,
        pan_capacity: args.pan_capacity,
        toaster_capacity: args.toaster_capacity,
        energy: EnergySource::Uniform {
            max: args.max_energy,
        },
        load: LoadSim::Uniform { max_millis: 250 },
    };

    let report = Kitchen::new(menu, Arc::new(TracingSink))
        .context("planning breakfast")?
        .run();
    println!("{report}");
    Ok(report.wasted().len())
}
