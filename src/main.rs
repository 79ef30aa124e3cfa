use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use kindred::{
    config::Config,
    display::FrameWriter,
    engine::{EngineBuilder, EngineSettings},
    rng::RngManager,
    stress,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "kindred ECS stress runner")]
struct Cli {
    /// Path to a YAML config file (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the number of generated entities
    #[arg(long)]
    entities: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for JSON frame dumps
    #[arg(long)]
    frame_dir: Option<PathBuf>,

    /// Disable pixel smoothing on the display
    #[arg(long)]
    no_smoothing: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_yaml(path)?,
        None => Config::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(entities) = cli.entities {
        config.stress.entities = entities;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(dir) = cli.frame_dir {
        config.frames.output_dir = Some(dir);
    }
    if cli.no_smoothing {
        config.display.smoothing = false;
    }
    config.validate()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();

    let mut builder = EngineBuilder::new(EngineSettings {
        display: config.display.clone(),
    });
    if let Some(dir) = &config.frames.output_dir {
        builder = builder.with_backend(FrameWriter::new(dir, config.frames.every_ticks)?);
    }
    let mut engine = builder.build()?;

    let bounds = engine.display()?.size();
    let mut rng = RngManager::new(config.seed);
    info!("creating {} entities", config.stress.entities);
    stress::populate(
        engine.manager_mut(),
        &mut rng.stream("stress"),
        &config.stress,
        bounds,
    )?;
    info!("{} entities created", engine.manager().entity_count());

    engine.run(config.ticks)?;

    let commands = engine
        .display()?
        .last_frame()
        .map(|frame| frame.commands.len())
        .unwrap_or(0);
    println!(
        "Ran {} ticks over {} entities. Last frame: {} draw commands.",
        config.ticks,
        engine.manager().entity_count(),
        commands
    );
    Ok(())
}
