//! # Generation Module
//!
//! The deterministic level-generation pipeline: recursive space
//! partitioning, room placement, hallway routing and the lock-and-key
//! puzzle graph. Each stage completes fully before the next begins; all
//! randomness flows through one shared [`RandomSource`] in strict call
//! order.

pub mod hallways;
pub mod level;
pub mod puzzle;
pub mod random;
pub mod rooms;
pub mod segmenter;
pub mod spawn;

pub use hallways::*;
pub use level::*;
pub use puzzle::*;
pub use random::*;
pub use rooms::*;
pub use segmenter::*;
pub use spawn::*;

use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Configuration for a level-generation run.
///
/// Plain numeric data with no behavior; every stage reads the fields it
/// needs. Constructor presets mirror the reference setups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Grid height in cells.
    pub rows: i32,
    /// Grid width in cells.
    pub columns: i32,
    /// World-units edge length of one cell.
    pub tile_size: f32,

    /// Probability that an already small segment half is split anyway.
    pub over_split_probability: f64,
    /// Probability that a splittable half is accepted as-is, leaving an
    /// irregularly large segment.
    pub under_split_probability: f64,
    /// Cap on the total number of segments.
    pub max_segments: usize,
    /// Minimum side length a split may leave on either side.
    pub min_segment_length: i32,

    /// Minimum shared-border overlap for a segment to join a room.
    pub room_part_min_overlap: i32,
    /// Largest cell count a room may reach.
    pub max_room_area: i32,
    /// Lower bound of the random room-count target.
    pub min_rooms: usize,
    /// Upper bound (exclusive) of the random room-count target.
    pub max_rooms: usize,
    /// Cap on segments merged into one room.
    pub max_segments_per_room: usize,
    /// Probability that a room tries to absorb neighbouring segments.
    pub multi_segment_room_probability: f64,

    /// How much farther than the best candidate an exit candidate may be
    /// and still stay in the draw.
    pub exit_candidate_tolerance: i32,
    /// Lower bound of the random extra-hallway count.
    pub min_extra_hallways: usize,
    /// Upper bound (exclusive) of the random extra-hallway count.
    pub max_extra_hallways: usize,
    /// Lower bound of the random dead-end-hallway count.
    pub min_dead_end_hallways: usize,
    /// Upper bound (exclusive) of the random dead-end-hallway count.
    pub max_dead_end_hallways: usize,

    /// Lower bound of the random locked-door count.
    pub min_doors: usize,
    /// Upper bound (exclusive) of the random locked-door count.
    pub max_doors: usize,
}

impl GenerationConfig {
    /// Reference preset for a square grid of the given size.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::grid_size(30);
    /// assert_eq!(config.rows, 30);
    /// assert!(config.min_rooms <= config.max_rooms);
    /// ```
    pub fn grid_size(size: i32) -> Self {
        Self::new(size, size, (size / 3) as usize, (size / 2) as usize)
    }

    /// Creates a configuration for an arbitrary grid and room-count range.
    pub fn new(columns: i32, rows: i32, min_rooms: usize, max_rooms: usize) -> Self {
        Self {
            rows,
            columns,
            tile_size: 1.0,
            over_split_probability: 0.05,
            under_split_probability: 0.025,
            max_segments: ((rows * columns) / 10).max(0) as usize,
            min_segment_length: 4,
            room_part_min_overlap: 2,
            max_room_area: 200,
            min_rooms,
            max_rooms,
            max_segments_per_room: 5,
            multi_segment_room_probability: 0.4,
            exit_candidate_tolerance: 2,
            min_extra_hallways: 2,
            max_extra_hallways: 4,
            min_dead_end_hallways: 4,
            max_dead_end_hallways: 8,
            min_doors: 2,
            max_doors: 4,
        }
    }

    /// Creates a configuration for testing: a 20x20 grid with a small
    /// room-count target.
    pub fn for_testing() -> Self {
        Self::new(20, 20, 6, 10)
    }

    /// Sanity-checks field ranges before a run.
    pub fn validate(&self) -> DelveResult<()> {
        if self.rows <= 0 || self.columns <= 0 {
            return Err(DelveError::InvalidConfig(format!(
                "grid must be positive, got {}x{}",
                self.columns, self.rows
            )));
        }
        if self.min_segment_length < 1 {
            return Err(DelveError::InvalidConfig(
                "min_segment_length must be at least 1".to_string(),
            ));
        }
        if self.min_rooms > self.max_rooms {
            return Err(DelveError::InvalidConfig(format!(
                "min_rooms {} exceeds max_rooms {}",
                self.min_rooms, self.max_rooms
            )));
        }
        for (name, p) in [
            ("over_split_probability", self.over_split_probability),
            ("under_split_probability", self.under_split_probability),
            (
                "multi_segment_room_probability",
                self.multi_segment_room_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DelveError::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.max_room_area <= 0 {
            return Err(DelveError::InvalidConfig(
                "max_room_area must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::grid_size(30)
    }
}

/// Trait for the pipeline's generators, allowing a consistent interface
/// for generation and post-generation validation.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random
    /// source.
    fn generate(&self, config: &GenerationConfig, rng: &mut RandomSource) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}
