//! # Delve
//!
//! Seeded procedural generation of grid-based dungeon levels.
//!
//! ## Architecture Overview
//!
//! The crate is a deterministic, single-threaded pipeline over a shared
//! integer grid:
//!
//! - **Segmentation**: randomized binary space partitioning tiles the grid
//!   into rectangular segments
//! - **Rooms**: adjacent segments merge into rooms whose perimeter,
//!   interior and corners are classified by a boundary walk
//! - **Hallways**: one-cell-wide corridors connect each room to its
//!   nearest neighbour, with a healing pass guaranteeing one connected
//!   component
//! - **Puzzle**: locked doors partition the rooms into access sectors and
//!   every door's key is placed so it is reachable before the door blocks
//!   progress
//!
//! All randomness flows through one seedable [`RandomSource`] in strict
//! call order, so the same seed and configuration reproduce the same
//! level byte for byte. The finished [`DungeonGrid`] is plain data for a
//! rendering or gameplay layer to consume; only door lock/open state is
//! expected to mutate afterwards.

pub mod dungeon;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use dungeon::*;
pub use generation::*;
pub use utils::*;

// Explicit re-exports for the commonly used types
pub use dungeon::{
    DistanceGrid, Door, DoorId, DoorKey, DungeonGrid, GridLayer, Hallway, HallwayId,
    HubSeparation, Room, RoomId, SectorId, WallPosition, EMPTY_SPACE, HUB_ROOM_ID, ROOM_CORNER,
    ROOM_EXIT, ROOM_FORBIDDEN_EXIT, ROOM_INTERIOR, ROOM_PERIMETER,
};

pub use generation::{
    choose_start_position, spawn_look_direction, GenerationConfig, Generator, GridSegmenter,
    HallwayGenerator, LevelGenerator, PuzzleGenerator, RandomSource, RoomGenerator,
};

pub use utils::math::{GridPoint, Rect};

/// Core error type for the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A configuration or argument value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation could not satisfy its constraints
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A structural invariant of the grid was violated
    #[error("Corrupt grid: {0}")]
    CorruptGrid(String),
}

/// Result type used throughout the delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default parameters shared by the binary and tests.
pub mod defaults {
    /// Default square grid size in cells
    pub const DEFAULT_GRID_SIZE: i32 = 30;

    /// Default generation seed
    pub const DEFAULT_SEED: u64 = 1234;
}
