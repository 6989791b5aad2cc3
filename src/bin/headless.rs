//! Runs the simulation without a window and reports population statistics.

use std::path::PathBuf;
use std::time::Instant;

use cellsim::simulation::error::Result;
use cellsim::simulation::params::Params;
use cellsim::simulation::world::World;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cellsim-headless")]
#[command(about = "Run the cell simulation without rendering")]
struct Args {
    /// JSON parameter file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the seed from the parameter file.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Ticks between progress reports.
    #[arg(long, default_value_t = 600)]
    report_every: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let params = Params::resolve(args.config.as_deref(), args.seed)?;
    let mut world = World::new(params)?;
    world.initialize()?;

    let started = Instant::now();
    for tick in 1..=args.ticks {
        world.update(args.dt)?;

        if args.report_every > 0 && tick % args.report_every == 0 {
            let stats = world.stats();
            info!(
                tick,
                cells = world.cell_count(),
                entities = world.entity_count(),
                births = stats.births,
                deaths = stats.cell_deaths,
                max_generation = stats.max_generation,
                "progress"
            );
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let stats = world.stats().clone();
    let cells = world.cell_count();
    world.destroy()?;

    println!("ticks:           {}", stats.ticks);
    println!("cells alive:     {}", cells);
    println!("simulated time:  {:.1}s", stats.time);
    println!("wall time:       {:.2}s", elapsed);
    println!("births:          {}", stats.births);
    println!("cell deaths:     {}", stats.cell_deaths);
    println!("replacements:    {}", stats.replacements);
    println!("food depleted:   {}", stats.food_depleted);
    println!("water depleted:  {}", stats.water_depleted);
    println!("respawns:        {}", stats.respawns);
    println!("max generation:  {}", stats.max_generation);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
