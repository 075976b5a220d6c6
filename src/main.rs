use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use vertiport_sim::scenario::Scenario;
use vertiport_sim::simulation::{parse_time_of_day, SimCommand, SimConfig, SimWorld};

#[derive(Parser)]
#[command(name = "vertiport_sim")]
#[command(about = "Headless simulation of VTOLs flying between vertiports")]
struct Cli {
    /// Directory with stations.csv, links.csv and optional demand.csv / routes.json
    /// (the built-in demo network is used when omitted)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding simulation parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value = "1200")]
    ticks: u64,

    /// Seed for reproducible passenger demand
    #[arg(long)]
    seed: Option<u64>,

    /// Print a report every N ticks (0 = only at the end)
    #[arg(long, default_value = "300")]
    report_every: u64,

    /// Draw the ASCII network map with each report
    #[arg(long)]
    map: bool,

    /// Print the final snapshot as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Add an ad hoc VTOL, as ORIGIN:DEST or ORIGIN:DEST:HH:MM
    #[arg(long, value_name = "ORIGIN:DEST[:START]")]
    spawn: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,vertiport_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };

    let mut world = match &cli.data_dir {
        Some(dir) => {
            let scenario = Scenario::load_dir(dir)?;
            SimWorld::from_scenario(&scenario, config, cli.seed)?
        }
        None => SimWorld::build_demo_world(SimWorld::with_config(config, cli.seed))?,
    };

    for arg in &cli.spawn {
        let command = parse_spawn(&world, arg)?;
        world.apply(command)?;
    }

    run_headless(&mut world, &cli)
}

/// Turn `ORIGIN:DEST[:HH:MM]` into a spawn command
fn parse_spawn(world: &SimWorld, text: &str) -> Result<SimCommand> {
    let mut parts = text.splitn(3, ':');
    let (Some(origin), Some(destination)) = (parts.next(), parts.next()) else {
        bail!("--spawn expects ORIGIN:DEST[:HH:MM], got {text:?}");
    };

    let start_secs = match parts.next() {
        Some(start) => parse_time_of_day(start)
            .with_context(|| format!("Invalid start time {start:?} in --spawn {text:?}"))?,
        None => world.clock().time_of_day(),
    };

    Ok(SimCommand::SpawnVtol {
        origin: world.station_id(origin)?,
        destination: world.station_id(destination)?,
        start_secs,
        speed: None,
    })
}

/// Run the simulation without any interactive front end
fn run_headless(world: &mut SimWorld, cli: &Cli) -> Result<()> {
    info!(
        "Running {} ticks of {}s from {}",
        cli.ticks,
        world.clock().tick_secs(),
        world.clock()
    );

    if !cli.json {
        println!("Initial state:");
        world.print_summary();
        if cli.map {
            world.draw_map();
        }
        println!();
    }

    for _ in 0..cli.ticks {
        world.tick();

        let tick = world.clock().tick();
        if !cli.json && cli.report_every > 0 && tick % cli.report_every == 0 && tick < cli.ticks {
            println!("--- After tick {} ({}) ---", tick, world.clock());
            world.print_summary();
            if cli.map {
                world.draw_map();
            }
            println!();
        }
    }

    if cli.json {
        let snapshot = world.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
        );
    } else {
        println!("=== Final State ===");
        world.print_summary();
        if cli.map {
            world.draw_map();
        }
    }

    Ok(())
}
