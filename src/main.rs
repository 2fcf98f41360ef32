use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use elevator_sim::simulation::{RandomPassengerSource, SimConfig, SimWorld, Tick, DEFAULT_CAPACITY};

#[derive(Parser)]
#[command(name = "elevator_sim")]
#[command(about = "Discrete-event elevator simulation")]
struct Cli {
    /// Number of floors in the building
    #[arg(long, default_value = "10")]
    floors: usize,

    /// Number of elevators
    #[arg(long, default_value = "2")]
    elevators: usize,

    /// Passengers each elevator can carry
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "3600")]
    ticks: Tick,

    /// Seed for the passenger generator; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of new passengers that are workers
    #[arg(long, default_value = "0.2")]
    worker_ratio: f64,

    /// Longest gap in ticks between two new passengers
    #[arg(long, default_value = "10")]
    max_gap: Tick,

    /// Print the building every this many ticks (0 disables rendering)
    #[arg(long, default_value = "60")]
    render_every: Tick,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation without any interaction
fn run_headless(cli: &Cli) -> Result<()> {
    let config = SimConfig::new(cli.floors, cli.elevators).with_capacity(cli.capacity);
    let source = RandomPassengerSource::new(cli.seed)
        .with_worker_ratio(cli.worker_ratio)
        .with_max_gap(cli.max_gap);
    let mut world = SimWorld::with_source(&config, Box::new(source))
        .context("Invalid building configuration")?;

    info!(
        "Running elevator simulation: {} floors, {} elevators, {} ticks",
        cli.floors, cli.elevators, cli.ticks
    );
    println!("Initial state:");
    println!("{}", world.snapshot());

    let chunk = if cli.render_every == 0 {
        cli.ticks
    } else {
        cli.render_every
    };
    while world.now() < cli.ticks {
        let horizon = world.now().saturating_add(chunk).min(cli.ticks);
        world
            .run_until(horizon)
            .with_context(|| format!("Simulation failed before tick {}", horizon))?;

        if cli.render_every > 0 {
            println!("--- After tick {} ---", world.now());
            println!("{}", world.snapshot());
        }
    }

    info!("=== SIMULATION COMPLETE ===");
    world.print_summary();
    Ok(())
}
