use std::path::PathBuf;

use cellsim::simulation::params::Params;
use cellsim::simulation::world::World;
use clap::Parser;
use macroquad::prelude::*;
use tracing::{error, info};

mod graphics;

/// Longest step fed to the simulation, so a stalled frame does not tunnel
/// entities through each other.
const MAX_FRAME_DT: f32 = 1.0 / 30.0;

#[derive(Parser, Debug)]
#[command(name = "cellsim")]
#[command(about = "Watch cells evolve in a circular arena")]
struct Args {
    /// JSON parameter file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the seed from the parameter file.
    #[arg(long)]
    seed: Option<u64>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Cell Simulation".to_owned(),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();

    let mut world = match Params::resolve(args.config.as_deref(), args.seed).and_then(World::new) {
        Ok(world) => world,
        Err(err) => {
            error!(%err, "could not build the world");
            return;
        }
    };
    if let Err(err) = world.initialize() {
        error!(%err, "could not initialize the world");
        return;
    }

    let mut camera = graphics::WorldCamera::new(world.radius());
    let mut window_size = (screen_width(), screen_height());
    let mut paused = false;

    info!("Starting cell simulation");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::P) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::I) {
            let debug = !world.debug();
            world.set_debug(debug);
        }
        if is_key_pressed(KeyCode::R) {
            world.track_next();
        }
        if is_key_pressed(KeyCode::T) {
            world.track_previous();
        }

        let size = (screen_width(), screen_height());
        if size != window_size {
            window_size = size;
            camera.resize(size.0, size.1, world.radius());
        }

        let frame_dt = get_frame_time();
        if !paused {
            if let Err(err) = world.update(frame_dt.min(MAX_FRAME_DT)) {
                error!(%err, "simulation stopped");
                break;
            }
        }

        camera.apply_keyboard_controls(frame_dt);
        camera.follow(world.tracked_entity());

        clear_background(Color::from_rgba(16, 16, 16, 255));
        graphics::render(&world, &camera);
        graphics::draw_overlay(&world, paused);

        next_frame().await
    }

    if let Err(err) = world.destroy() {
        error!(%err, "could not save the population");
    }
}
