//! # Delve Main Entry Point
//!
//! Generates a dungeon level from command-line parameters and prints the
//! diagnostic character grid, or a JSON dump of the generated data.

use clap::Parser;
use delve::{
    defaults, DelveResult, DungeonGrid, GenerationConfig, Generator, LevelGenerator, RandomSource,
};
use log::info;

/// Command line arguments for the delve generator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Seeded grid-dungeon generation with rooms, hallways and lock-and-key puzzles")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Square grid size in cells
    #[arg(short, long)]
    grid_size: Option<i32>,

    /// Minimum number of rooms
    #[arg(long)]
    min_rooms: Option<usize>,

    /// Maximum number of rooms (exclusive)
    #[arg(long)]
    max_rooms: Option<usize>,

    /// Emit the generated level as JSON instead of the character grid
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    info!("delve v{}", delve::VERSION);

    let mut config = GenerationConfig::grid_size(args.grid_size.unwrap_or(defaults::DEFAULT_GRID_SIZE));
    if let Some(min_rooms) = args.min_rooms {
        config.min_rooms = min_rooms;
    }
    if let Some(max_rooms) = args.max_rooms {
        config.max_rooms = max_rooms;
    }

    let seed = args.seed.unwrap_or(defaults::DEFAULT_SEED);
    info!("generating {}x{} level with seed {}", config.columns, config.rows, seed);

    let generator = LevelGenerator::new();
    let mut rng = RandomSource::from_seed(seed);
    let level = generator.generate(&config, &mut rng)?;
    generator.validate(&level, &config)?;

    if args.json {
        print_json(&level)?;
    } else {
        print_summary(&level);
    }

    Ok(())
}

/// Prints the character grid and a short inventory of the level.
fn print_summary(level: &DungeonGrid) {
    println!("{}", level.render());
    println!(
        "rooms: {}  hallways: {}  doors: {}  keys: {}",
        level.rooms.len(),
        level.hallways.len(),
        level.doors.len(),
        level.keys.len()
    );
    println!(
        "player spawn: {} (room {})",
        level.player_spawn, level.player_spawn_room
    );
}

/// Dumps the generated data model as JSON.
fn print_json(level: &DungeonGrid) -> DelveResult<()> {
    let json = serde_json::to_string_pretty(level)?;
    println!("{}", json);
    Ok(())
}
