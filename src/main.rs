//! Gaze Arena entry point
//!
//! Native builds run the simulation headless at a fixed frame rate and print
//! the final statistics. The browser build is driven from JS via `web.rs`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use gaze_arena::{SimConfig, Simulation};

    /// Command line arguments for the headless runner
    #[derive(Parser, Debug)]
    #[command(name = "gaze-arena")]
    #[command(about = "Run the eye-contact arena without a renderer")]
    struct Args {
        /// JSON file of options (camelCase keys, missing keys use defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of agents (overrides the config file)
        #[arg(long)]
        participants: Option<u32>,

        /// Frames per real second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Stop after this many frames even if the game is not over
        #[arg(long, default_value_t = 60 * 60 * 10)]
        max_frames: u64,

        /// Log a statistics line every this many frames (0 disables)
        #[arg(long, default_value_t = 600)]
        report_every: u64,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let args = Args::parse();

        let mut config = match &args.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        config.seed = args.seed.unwrap_or_else(rand::random);
        if let Some(count) = args.participants {
            config.participant_count = count;
        }
        config.validate()?;

        let elapsed = 1.0 / args.fps.max(1) as f64;
        log::info!(
            "Running {} agents, seed {}, {} fps",
            config.participant_count,
            config.seed,
            args.fps
        );

        let mut sim = Simulation::new(config);
        sim.start();

        let mut frames = 0;
        while !sim.is_game_over() && frames < args.max_frames {
            sim.tick(elapsed);
            frames += 1;

            for event in sim.drain_events() {
                log::debug!("t={:.2} {:?}", sim.clock(), event);
            }
            if args.report_every > 0 && frames % args.report_every == 0 {
                let stats = sim.statistics();
                log::info!(
                    "t={:.1}s inside={} excluded={} contacts={} exits={}",
                    stats.clock,
                    stats.inside,
                    stats.excluded + stats.moving_to_edge,
                    stats.total_eye_contacts,
                    stats.total_exits
                );
            }
        }

        if sim.is_game_over() {
            log::info!("Everyone excluded after {:.1}s", sim.clock());
        } else {
            log::info!("Stopped after {} frames", frames);
        }
        println!("{}", serde_json::to_string_pretty(&sim.statistics())?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
