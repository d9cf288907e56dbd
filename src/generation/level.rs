//! # Level Generator
//!
//! Orchestrates the full pipeline — segmentation, room placement, hallway
//! routing, hub separation, extra and dead-end hallways, spawn selection
//! and the lock-and-key puzzle — into one published [`DungeonGrid`].

use crate::dungeon::grid::{DungeonGrid, GridLayer};
use crate::generation::{
    choose_start_position, GenerationConfig, Generator, GridSegmenter, HallwayGenerator,
    PuzzleGenerator, RandomSource, RoomGenerator,
};
use crate::{DelveError, DelveResult};
use log::{debug, info};
use pathfinding::prelude::bfs_reach;

/// Side length of the generated hub room.
const HUB_ROOM_SIZE: i32 = 5;

/// Runs the whole generation pipeline for one level.
///
/// # Examples
///
/// ```
/// use delve::{GenerationConfig, Generator, LevelGenerator, RandomSource};
///
/// let config = GenerationConfig::for_testing();
/// let mut rng = RandomSource::from_seed(1234);
/// let level = LevelGenerator::new().generate(&config, &mut rng).unwrap();
/// assert!(!level.rooms.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelGenerator;

impl LevelGenerator {
    /// Creates a level generator.
    pub fn new() -> Self {
        Self
    }
}

impl Generator<DungeonGrid> for LevelGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut RandomSource) -> DelveResult<DungeonGrid> {
        config.validate()?;

        let mut grid = GridLayer::new(config.rows, config.columns);

        let segmenter = GridSegmenter::segment(config, rng)?;
        info!("level: {} segments", segmenter.segments().len());

        let mut room_generator = RoomGenerator::new();
        room_generator.place_rooms(segmenter.segments(), &mut grid, config, rng)?;
        info!("level: {} rooms", room_generator.rooms().len());

        let mut hallway_generator = HallwayGenerator::new();
        hallway_generator.make_hallways(room_generator.rooms_mut(), &mut grid, config, rng)?;
        room_generator.calculate_hub_separations(hallway_generator.hallways());

        let extra_hallways = rng.range(
            config.min_extra_hallways as i32,
            config.max_extra_hallways as i32,
        );
        for _ in 0..extra_hallways {
            hallway_generator.add_extra_hallway(room_generator.rooms_mut(), &mut grid, config, rng);
            room_generator.calculate_hub_separations(hallway_generator.hallways());
        }

        let dead_ends = rng.range(
            config.min_dead_end_hallways as i32,
            config.max_dead_end_hallways as i32,
        );
        for _ in 0..dead_ends {
            hallway_generator.add_dead_end_hallway(room_generator.rooms_mut(), &mut grid, rng);
        }
        info!("level: {} hallways", hallway_generator.hallways().len());

        let Some((spawn_room, player_spawn)) =
            choose_start_position(room_generator.rooms(), &grid, rng)
        else {
            return Err(DelveError::GenerationFailed(
                "no start position could be chosen".to_string(),
            ));
        };
        let player_look_direction = crate::generation::spawn_look_direction(
            player_spawn,
            &room_generator.rooms()[(spawn_room - 1) as usize],
            hallway_generator.hallways(),
            rng,
        );
        debug!(
            "level: player spawns at {} in room {} facing {}",
            player_spawn, spawn_room, player_look_direction
        );

        let mut puzzle = PuzzleGenerator::new(room_generator.rooms(), spawn_room);
        let requested_doors = rng.range(config.min_doors as i32, config.max_doors as i32);
        let added_doors = puzzle.add_doors(
            requested_doors as usize,
            true,
            room_generator.rooms(),
            hallway_generator.hallways(),
            rng,
        );
        info!(
            "level: added {} of {} requested doors across {} sectors",
            added_doors,
            requested_doors,
            puzzle.sector_count()
        );

        let hub = RoomGenerator::create_hub(HUB_ROOM_SIZE)?;

        let (doors, keys, _sectors) = puzzle.into_parts();
        Ok(DungeonGrid {
            layer: grid,
            rooms: room_generator.into_rooms(),
            hallways: hallway_generator.into_hallways(),
            doors,
            keys,
            hub: Some(hub),
            player_spawn,
            player_spawn_room: spawn_room,
            player_look_direction,
            tile_size: config.tile_size,
        })
    }

    fn validate(&self, level: &DungeonGrid, _config: &GenerationConfig) -> DelveResult<()> {
        if level.rooms.is_empty() {
            return Err(DelveError::GenerationFailed(
                "level has no rooms".to_string(),
            ));
        }

        // Every room cell must be stamped as something non-empty.
        for room in &level.rooms {
            for tile in room.tiles() {
                if !level.layer.in_bounds(tile) || level.layer.is_empty(tile) {
                    return Err(DelveError::CorruptGrid(format!(
                        "cell {} of room {} is not stamped",
                        tile, room.id
                    )));
                }
            }
        }

        // The hallway graph must cover all rooms in one component.
        let reachable = bfs_reach(level.rooms[0].id, |&id| {
            level.rooms[(id - 1) as usize]
                .exits
                .iter()
                .filter_map(|&hall_id| level.hallways.get((hall_id - 1) as usize))
                .filter_map(|hall| hall.other_room(id))
                .collect::<Vec<_>>()
        })
        .count();
        if reachable != level.rooms.len() {
            return Err(DelveError::GenerationFailed(format!(
                "only {} of {} rooms are connected",
                reachable,
                level.rooms.len()
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_valid_level() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(1234);
        let generator = LevelGenerator::new();

        let level = generator.generate(&config, &mut rng).unwrap();
        generator.validate(&level, &config).unwrap();

        assert!(!level.rooms.is_empty());
        assert!(!level.hallways.is_empty());
        assert!(level.hub.is_some());
        assert!(level
            .rooms
            .iter()
            .any(|room| room.id == level.player_spawn_room));
    }

    #[test]
    fn test_spawn_room_contains_spawn_tile() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(77);
        let level = LevelGenerator::new().generate(&config, &mut rng).unwrap();

        let spawn_room = level.room(level.player_spawn_room).unwrap();
        assert!(spawn_room.contains(level.player_spawn));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = GenerationConfig::for_testing();
        config.rows = -5;
        let mut rng = RandomSource::from_seed(1);

        assert!(matches!(
            LevelGenerator::new().generate(&config, &mut rng),
            Err(DelveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_keys_match_locked_doors() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(4242);
        let level = LevelGenerator::new().generate(&config, &mut rng).unwrap();

        for (door_id, door) in level.doors.iter().enumerate() {
            if !door.unlocked {
                assert_eq!(
                    level.keys.iter().filter(|key| key.door == door_id).count(),
                    1
                );
            }
        }
    }
}
