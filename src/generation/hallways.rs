//! # Hallway Generator
//!
//! Connects rooms with one-cell-wide corridors: a nearest-neighbour pass,
//! then a healing pass that joins any disconnected components, plus the
//! optional extra and dead-end hallways. Digging validates every step and
//! rolls the whole corridor back on any collision.

use crate::dungeon::grid::{GridLayer, EMPTY_SPACE, ROOM_EXIT, ROOM_FORBIDDEN_EXIT};
use crate::dungeon::hallway::{Hallway, HallwayId};
use crate::dungeon::room::{Room, RoomId};
use crate::generation::{GenerationConfig, RandomSource};
use crate::utils::math::GridPoint;
use crate::{DelveError, DelveResult};
use log::{debug, error, warn};
use pathfinding::prelude::bfs_reach;
use std::collections::HashSet;

/// Shortest and longest (exclusive) dead-end corridor to attempt.
const DEAD_END_LENGTH_RANGE: (i32, i32) = (2, 8);

/// Digs hallways and owns the hallway registry.
#[derive(Debug, Clone, Default)]
pub struct HallwayGenerator {
    hallways: Vec<Hallway>,
}

impl HallwayGenerator {
    /// Creates an empty generator.
    pub fn new() -> Self {
        Self {
            hallways: Vec::new(),
        }
    }

    /// The valid hallways dug so far, in id order (id = index + 1).
    pub fn hallways(&self) -> &[Hallway] {
        &self.hallways
    }

    /// Consumes the generator, yielding the hallway registry.
    pub fn into_hallways(self) -> Vec<Hallway> {
        self.hallways
    }

    /// Connects every room to its nearest unconnected neighbour, then
    /// heals until the room graph is one component.
    ///
    /// Fails with [`DelveError::GenerationFailed`] when healing exhausts
    /// every candidate pair and rooms remain unreachable.
    pub fn make_hallways(
        &mut self,
        rooms: &mut [Room],
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> DelveResult<()> {
        self.hallways.clear();

        self.connect_rooms(rooms, grid, config, rng);
        self.heal_grid(rooms, grid, config, rng)?;

        debug!("hallways: grid after digging:\n{}", grid.render(rooms));
        Ok(())
    }

    /// Adds one nearest-neighbour-style connection starting from a random
    /// room, for loop variety. Returns whether a hallway was added.
    pub fn add_extra_hallway(
        &mut self,
        rooms: &mut [Room],
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> bool {
        if rooms.len() < 2 {
            return false;
        }

        let room_idx = rng.index(rooms.len());
        let Some(closest_idx) = self.find_closest_room(rooms, room_idx, grid) else {
            warn!(
                "hallways: no unconnected room left for extra hallway from {}",
                rooms[room_idx]
            );
            return false;
        };

        match self.connect(rooms, room_idx, closest_idx, grid, config, rng) {
            Some(hallway) if hallway.valid => {
                self.finalize_hallway(hallway, rooms, grid);
                true
            }
            Some(hallway) => {
                warn!(
                    "hallways: extra hallway between {} and {} failed",
                    rooms[room_idx].id, rooms[closest_idx].id
                );
                Self::clear_hallway(grid, &hallway);
                false
            }
            None => false,
        }
    }

    /// Digs a short single-exit corridor from a random room into open
    /// space. Returns whether a hallway was added.
    pub fn add_dead_end_hallway(
        &mut self,
        rooms: &mut [Room],
        grid: &mut GridLayer,
        rng: &mut RandomSource,
    ) -> bool {
        if rooms.is_empty() {
            return false;
        }

        let room = &rooms[rng.index(rooms.len())];

        // Any plain perimeter cell with an empty neighbour can host the
        // dead end.
        let candidates: Vec<(GridPoint, GridPoint)> = room
            .perimeter()
            .iter()
            .filter_map(|&cell| {
                let neighbour = grid.empty_neighbour(cell)?;
                grid.is_perimeter(cell).then_some((cell, neighbour))
            })
            .collect();

        if candidates.is_empty() {
            warn!("hallways: no dead-end exit candidates on {}", room);
            return false;
        }

        let (exit, start) = *rng.pick(&candidates);
        let direction = start - exit;
        let target_length = rng.range(DEAD_END_LENGTH_RANGE.0, DEAD_END_LENGTH_RANGE.1);

        let id = self.hallways.len() as HallwayId + 1;
        let mut hallway = Hallway::dead_end(id, room.id, start, exit);

        let mut point = start;
        for step in 0..target_length {
            let is_last = step == target_length - 1;
            if !Self::record_hallway_position(grid, &mut hallway, point, direction, is_last) {
                break;
            }
            point = point + direction;
        }

        if (hallway.path.len() as i32) < DEAD_END_LENGTH_RANGE.0 {
            debug!("hallways: dead end from {} too short, rolling back", room.id);
            Self::clear_hallway(grid, &hallway);
            return false;
        }

        hallway.destination = *hallway.path.last().unwrap();
        hallway.valid = true;
        let room_id = room.id;
        self.finalize_hallway(hallway, rooms, grid);
        debug!("hallways: dead end added from room {}", room_id);
        true
    }

    fn connect_rooms(
        &mut self,
        rooms: &mut [Room],
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) {
        for room_idx in 0..rooms.len() {
            let Some(closest_idx) = self.find_closest_room(rooms, room_idx, grid) else {
                warn!("hallways: no room closest to {}", rooms[room_idx]);
                continue;
            };

            if rooms[closest_idx].size() == 0 {
                error!("hallways: found room without size {}", rooms[closest_idx]);
                continue;
            }

            match self.connect(rooms, room_idx, closest_idx, grid, config, rng) {
                Some(hallway) if hallway.valid => self.finalize_hallway(hallway, rooms, grid),
                Some(hallway) => {
                    warn!(
                        "hallways: failed to connect {} with {}",
                        rooms[room_idx], rooms[closest_idx]
                    );
                    Self::clear_hallway(grid, &hallway);
                }
                None => {
                    warn!(
                        "hallways: failed to connect {} with {}",
                        rooms[room_idx], rooms[closest_idx]
                    );
                }
            }
        }
    }

    /// The nearest room (by center Manhattan distance) not yet connected
    /// to `rooms[room_idx]` by any hallway.
    fn find_closest_room(
        &self,
        rooms: &[Room],
        room_idx: usize,
        grid: &GridLayer,
    ) -> Option<usize> {
        let mut closest_distance = grid.largest_manhattan_distance() + 1;
        let mut closest = None;
        let room_id = rooms[room_idx].id;

        for (idx, other) in rooms.iter().enumerate() {
            if idx == room_idx {
                continue;
            }
            if self
                .hallways
                .iter()
                .any(|hall| hall.connects(room_id, other.id))
            {
                continue;
            }

            let distance = rooms[room_idx].center_distance(other);
            if distance < closest_distance {
                closest = Some(idx);
                closest_distance = distance;
            }
        }

        closest
    }

    /// All rooms reachable from `start` over valid hallways, in BFS order.
    fn grouped_rooms(&self, rooms: &[Room], start: RoomId) -> Vec<RoomId> {
        bfs_reach(start, |&id| {
            rooms[(id - 1) as usize]
                .exits
                .iter()
                .filter_map(|&hall_id| self.hallways.get((hall_id - 1) as usize))
                .filter_map(|hall| hall.other_room(id))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Repeatedly connects the globally closest (ungrouped, grouped) room
    /// pair until the room graph is one component.
    fn heal_grid(
        &mut self,
        rooms: &mut [Room],
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> DelveResult<()> {
        if rooms.is_empty() {
            error!("hallways: there were no rooms in the level, nothing to heal");
            return Err(DelveError::GenerationFailed(
                "no rooms were placed".to_string(),
            ));
        }

        let mut grouped = self.grouped_rooms(rooms, rooms[0].id);
        let mut ungrouped: Vec<RoomId> = rooms
            .iter()
            .map(|room| room.id)
            .filter(|id| !grouped.contains(id))
            .collect();
        let mut impossible: HashSet<(RoomId, RoomId)> = HashSet::new();

        debug!(
            "hallways: healing with {} grouped, {} ungrouped rooms",
            grouped.len(),
            ungrouped.len()
        );

        while !ungrouped.is_empty() {
            let mut distance = grid.largest_manhattan_distance() + 1;
            let mut best: Option<(RoomId, RoomId)> = None;

            for &candidate_id in &ungrouped {
                for &connector_id in &grouped {
                    let dist = rooms[(candidate_id - 1) as usize]
                        .center_distance(&rooms[(connector_id - 1) as usize]);
                    if dist < distance && !impossible.contains(&(candidate_id, connector_id)) {
                        best = Some((candidate_id, connector_id));
                        distance = dist;
                    }
                }
            }

            let Some((candidate_id, connector_id)) = best else {
                error!(
                    "hallways: though {} rooms are left ungrouped, none of them can be connected",
                    ungrouped.len()
                );
                return Err(DelveError::GenerationFailed(format!(
                    "{} rooms remained unreachable after healing",
                    ungrouped.len()
                )));
            };

            let candidate_idx = (candidate_id - 1) as usize;
            let connector_idx = (connector_id - 1) as usize;

            match self.connect(rooms, candidate_idx, connector_idx, grid, config, rng) {
                Some(hallway) if hallway.valid => {
                    self.finalize_hallway(hallway, rooms, grid);

                    grouped = self.grouped_rooms(rooms, rooms[0].id);
                    ungrouped = rooms
                        .iter()
                        .map(|room| room.id)
                        .filter(|id| !grouped.contains(id))
                        .collect();
                }
                other => {
                    error!(
                        "hallways: failed to heal grid by connecting {} to {}",
                        candidate_id, connector_id
                    );
                    if let Some(hallway) = other {
                        Self::clear_hallway(grid, &hallway);
                    }
                    impossible.insert((candidate_id, connector_id));
                }
            }
        }

        Ok(())
    }

    /// Attempts a corridor between two rooms: picks compatible exits on
    /// both perimeters and digs a straight, S-shaped or elbow path. The
    /// returned hallway carries its validity; invalid hallways must be
    /// cleared by the caller.
    fn connect(
        &self,
        rooms: &[Room],
        source_idx: usize,
        destination_idx: usize,
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> Option<Hallway> {
        let hallway_id = self.hallways.len() as HallwayId + 1;
        let source = &rooms[source_idx];
        let destination = &rooms[destination_idx];

        let (_, destination_corner) = source.closest_bounding_corner(destination);
        debug!(
            "hallways: connecting room {} to {} aiming at corner {}",
            source.id, destination.id, destination_corner
        );

        let source_candidates = Self::exit_candidates(
            source,
            destination_corner,
            config.exit_candidate_tolerance,
            grid,
        );
        if source_candidates.is_empty() {
            error!("hallways: room {} had no possible exits", source);
            return None;
        }
        let source_exit = *rng.pick(&source_candidates);
        let source_direction = source.exit_direction(source_exit)?;

        let destination_candidates: Vec<GridPoint> = Self::exit_candidates(
            destination,
            source_exit,
            config.exit_candidate_tolerance,
            grid,
        )
        .into_iter()
        .filter(|&candidate| {
            let Some(destination_direction) = destination.exit_direction(candidate) else {
                return false;
            };

            if destination_direction.is_inverse_of(source_direction) {
                let diff = candidate - source_exit;
                let exit_direction_distance = source_direction.x * (source_exit.x - candidate.x)
                    + source_direction.y * (source_exit.y - candidate.y);
                let abs_distance = exit_direction_distance.abs();

                if diff.x * diff.y == 0 {
                    // Straight line needs headroom for the two hall ends.
                    abs_distance > 2
                } else {
                    // S-shape additionally needs space to turn twice.
                    abs_distance > 4
                }
            } else {
                let elbow = candidate.ortho_intersection(source_exit, source_direction);
                grid.in_bounds(elbow)
                    && grid.is_empty(elbow)
                    && source_exit.manhattan_distance(elbow) > 1
                    && candidate.manhattan_distance(elbow) > 1
            }
        })
        .collect();

        if destination_candidates.is_empty() {
            error!(
                "hallways: room {} had no possible exits matching {} of room {}",
                destination, source_exit, source.id
            );
            return None;
        }
        let destination_exit = *rng.pick(&destination_candidates);
        let destination_direction = destination.exit_direction(destination_exit)?;

        let hall_source = source_exit + source_direction;
        let hall_destination = destination_exit + destination_direction;
        let mut hallway = Hallway::new(
            hallway_id,
            source.id,
            hall_source,
            source_exit,
            destination.id,
            hall_destination,
            destination_exit,
        );

        debug!(
            "hallways: attempting to connect room {} {} to {} {}",
            source.id, source_exit, destination.id, destination_exit
        );

        if source_direction.is_inverse_of(destination_direction) {
            let hall_diff = hall_destination - hall_source;
            if hall_diff.x == 0 || hall_diff.y == 0 {
                hallway.valid =
                    Self::dig_straight_line(grid, &mut hallway, hall_source, hall_destination);
            } else {
                hallway.valid = Self::dig_s_shape(grid, &mut hallway, source_direction, rng);
            }
        } else {
            hallway.valid = Self::dig_elbow(grid, &mut hallway, source_direction);
        }

        Some(hallway)
    }

    /// Perimeter cells of `room` that could open a corridor towards
    /// `target`: plain perimeter, with an empty neighbour strictly closer
    /// to the target, within `tolerance` of the best candidate.
    fn exit_candidates(
        room: &Room,
        target: GridPoint,
        tolerance: i32,
        grid: &GridLayer,
    ) -> Vec<GridPoint> {
        let mut candidates: Vec<(GridPoint, GridPoint)> = room
            .perimeter()
            .iter()
            .filter_map(|&candidate| {
                if !grid.in_bounds(candidate) || !grid.is_perimeter(candidate) {
                    return None;
                }
                let neighbour = grid.empty_neighbour(candidate)?;

                if neighbour.manhattan_distance(target) >= candidate.manhattan_distance(target) {
                    return None;
                }

                // The exit must not point away from the target on either
                // axis.
                let exit_direction = neighbour - candidate;
                let diff = target - neighbour;
                let prod = exit_direction.component_mul(diff);
                if prod.x == 0 && prod.y == 0 || prod.x < 0 || prod.y < 0 {
                    return None;
                }

                Some((candidate, neighbour))
            })
            .collect();

        candidates.sort_by_key(|(_, neighbour)| neighbour.manhattan_distance(target));

        let Some(&(closest_candidate, _)) = candidates.first() else {
            return Vec::new();
        };
        let closest_distance = closest_candidate.manhattan_distance(target);
        let limit = (closest_distance + tolerance).min(grid.largest_manhattan_distance());

        candidates
            .iter()
            .take_while(|(candidate, _)| candidate.manhattan_distance(target) < limit)
            .map(|(candidate, _)| *candidate)
            .collect()
    }

    /// Stamps one corridor cell after validating it: the cell itself and
    /// both flanks must be empty, plus the cell ahead when
    /// `require_forward_free` is set (elbow turns).
    fn record_hallway_position(
        grid: &mut GridLayer,
        hallway: &mut Hallway,
        point: GridPoint,
        direction: GridPoint,
        require_forward_free: bool,
    ) -> bool {
        if !grid.in_bounds(point) {
            error!("hallways: tried to dig at {} which is out of bounds", point);
            return false;
        }

        let left = point + direction.rotate_ccw();
        let right = point + direction.rotate_cw();
        let forward = point + direction;

        if !grid.is_empty(point) {
            warn!(
                "hallways: tried to dig out {} but {} is already there",
                point, grid[point]
            );
            return false;
        } else if grid.in_bounds(left) && !grid.is_empty(left) {
            warn!(
                "hallways: tried to dig out {} but {} sits to its left",
                point, grid[left]
            );
            return false;
        } else if grid.in_bounds(right) && !grid.is_empty(right) {
            warn!(
                "hallways: tried to dig out {} but {} sits to its right",
                point, grid[right]
            );
            return false;
        } else if require_forward_free && grid.in_bounds(forward) && !grid.is_empty(forward) {
            warn!(
                "hallways: tried to dig out {} but {} sits ahead of it",
                point, grid[forward]
            );
            return false;
        }

        grid[point] = hallway.id;
        hallway.path.push(point);
        true
    }

    fn dig_straight_line(
        grid: &mut GridLayer,
        hallway: &mut Hallway,
        source: GridPoint,
        destination: GridPoint,
    ) -> bool {
        let direction = source.main_direction_to(destination);

        if hallway.source == source
            && !Self::record_hallway_position(grid, hallway, source, direction, false)
        {
            return false;
        }

        let mut hall_point = source + direction;
        let mut steps = 0;
        while hall_point != destination {
            if !Self::record_hallway_position(grid, hallway, hall_point, direction, false) {
                return false;
            }

            steps += 1;
            if steps > grid.largest_manhattan_distance() {
                return false;
            }

            hall_point = hall_point + direction;
        }

        if hallway.destination == hall_point
            && !Self::record_hallway_position(grid, hallway, hall_point, direction, false)
        {
            return false;
        }

        true
    }

    fn dig_s_shape(
        grid: &mut GridLayer,
        hallway: &mut Hallway,
        start_direction: GridPoint,
        rng: &mut RandomSource,
    ) -> bool {
        if !Self::record_hallway_position(grid, hallway, hallway.source, start_direction, false) {
            warn!("hallways: could not dig S-shape source");
            return false;
        }

        let walk_diff = hallway.destination - hallway.source;
        let main_axis_distance = walk_diff.component_mul(start_direction);
        let last_turn_step = main_axis_distance.x.max(main_axis_distance.y) - 1;
        let mut turn_after_steps = rng.range(1, last_turn_step);

        debug!(
            "hallways: digging S-shape from {} to {} turning after {} steps",
            hallway.source, hallway.destination, turn_after_steps
        );

        let mut hall_point = hallway.source + start_direction;
        let mut length = 1;

        while hall_point != hallway.destination {
            if !Self::record_hallway_position(
                grid,
                hallway,
                hall_point,
                start_direction,
                turn_after_steps == 0,
            ) {
                warn!(
                    "hallways: failed to dig S-shape at {} after {} digs",
                    hall_point, length
                );
                return false;
            }

            turn_after_steps -= 1;

            if turn_after_steps == 0 {
                let elbow_target =
                    hall_point.ortho_intersection(hallway.destination, start_direction);
                let elbow_direction = hall_point.main_direction_to(elbow_target);

                debug!(
                    "hallways: turning at {} towards {} heading {}",
                    hall_point, elbow_target, elbow_direction
                );

                while hall_point != elbow_target {
                    hall_point = hall_point + elbow_direction;

                    if !Self::record_hallway_position(
                        grid,
                        hallway,
                        hall_point,
                        elbow_direction,
                        hall_point == elbow_target,
                    ) {
                        warn!("hallways: failed to dig elbow stretch at {}", hall_point);
                        return false;
                    }

                    length += 1;
                    if length > grid.largest_manhattan_distance() {
                        error!(
                            "hallways: gave up digging from {} to {} after {} cells",
                            hallway.source, hallway.destination, length
                        );
                        return false;
                    }
                }
            }

            length += 1;
            if length > grid.largest_manhattan_distance() {
                error!(
                    "hallways: gave up digging from {} to {} after {} cells",
                    hallway.source, hallway.destination, length
                );
                return false;
            }

            hall_point = hall_point + start_direction;
        }

        if !Self::record_hallway_position(
            grid,
            hallway,
            hallway.destination,
            start_direction,
            false,
        ) {
            debug!(
                "hallways: failed to dig hallway destination at {}",
                hallway.destination
            );
            return false;
        }

        true
    }

    fn dig_elbow(grid: &mut GridLayer, hallway: &mut Hallway, start_direction: GridPoint) -> bool {
        // Source and destination legs are dug as straight lines meeting at
        // the corner.
        let corner = if start_direction.x == 0 {
            GridPoint::new(hallway.source.x, hallway.destination.y)
        } else {
            GridPoint::new(hallway.destination.x, hallway.source.y)
        };

        debug!(
            "hallways: digging elbow from {} via {} to {}",
            hallway.source, corner, hallway.destination
        );

        if !Self::dig_straight_line(grid, hallway, hallway.source, corner) {
            warn!(
                "hallways: failed to dig from {} to corner {}",
                hallway.source, corner
            );
            return false;
        }

        if !Self::record_hallway_position(grid, hallway, corner, start_direction, true) {
            warn!("hallways: failed to dig out corner {}", corner);
            return false;
        }

        if !Self::dig_straight_line(grid, hallway, corner, hallway.destination) {
            warn!(
                "hallways: failed to dig from {} to {}",
                corner, hallway.destination
            );
            return false;
        }

        true
    }

    /// Registers a dug hallway: stamps both exits, blocks the flanking
    /// perimeter cells around each exit and records the exit on its rooms.
    fn finalize_hallway(&mut self, hallway: Hallway, rooms: &mut [Room], grid: &mut GridLayer) {
        debug!(
            "hallways: connected rooms {:?} and {:?}",
            hallway.source_room, hallway.destination_room
        );

        if let Some(source_room) = hallway.source_room {
            Self::add_room_exit_and_block_neighbours(
                grid,
                hallway.source_exit,
                hallway.source - hallway.source_exit,
            );
            rooms[(source_room - 1) as usize].exits.push(hallway.id);
        }
        if let Some(destination_room) = hallway.destination_room {
            Self::add_room_exit_and_block_neighbours(
                grid,
                hallway.destination_exit,
                hallway.destination - hallway.destination_exit,
            );
            rooms[(destination_room - 1) as usize].exits.push(hallway.id);
        }

        self.hallways.push(hallway);
    }

    /// Reverts every cell of a failed dig to empty space.
    fn clear_hallway(grid: &mut GridLayer, hallway: &Hallway) {
        for point in &hallway.path {
            grid[*point] = EMPTY_SPACE;
        }
    }

    /// Marks an exit cell and forbids the two perimeter cells flanking it,
    /// so exits never crowd a corner.
    fn add_room_exit_and_block_neighbours(
        grid: &mut GridLayer,
        point: GridPoint,
        exit_direction: GridPoint,
    ) {
        grid[point] = ROOM_EXIT;
        for direction in [exit_direction.rotate_ccw(), exit_direction.rotate_cw()] {
            let neighbour = point + direction;
            if grid.in_bounds(neighbour) && grid.is_perimeter(neighbour) {
                grid[neighbour] = ROOM_FORBIDDEN_EXIT;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::grid::ROOM_INTERIOR;
    use crate::generation::rooms::RoomGenerator;
    use crate::utils::math::Rect;

    fn build_rooms(
        segments: &[Rect],
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> (RoomGenerator, GridLayer) {
        let mut generator = RoomGenerator::new();
        let mut grid = GridLayer::new(config.rows, config.columns);
        generator
            .place_rooms(segments, &mut grid, config, rng)
            .unwrap();
        (generator, grid)
    }

    fn two_room_setup() -> (RoomGenerator, GridLayer, GenerationConfig, RandomSource) {
        let config = GenerationConfig::new(20, 20, 2, 3);
        let mut rng = RandomSource::from_seed(21);
        let segments = [Rect::new(2, 2, 6, 6), Rect::new(12, 2, 6, 6)];
        let (generator, grid) = build_rooms(&segments, &config, &mut rng);
        (generator, grid, config, rng)
    }

    #[test]
    fn test_make_hallways_connects_two_rooms() {
        let (mut room_gen, mut grid, config, mut rng) = two_room_setup();
        let mut hall_gen = HallwayGenerator::new();

        hall_gen
            .make_hallways(room_gen.rooms_mut(), &mut grid, &config, &mut rng)
            .unwrap();

        assert!(!hall_gen.hallways().is_empty());
        let hallway = &hall_gen.hallways()[0];
        assert!(hallway.valid);
        assert!(hallway.connects(1, 2));

        // Both exits are stamped and the path carries the hallway id.
        assert_eq!(grid[hallway.source_exit], ROOM_EXIT);
        assert_eq!(grid[hallway.destination_exit], ROOM_EXIT);
        for cell in &hallway.path {
            assert_eq!(grid[*cell], hallway.id);
        }

        // Exits are registered on both rooms.
        assert!(room_gen.rooms()[0].exits.contains(&hallway.id));
        assert!(room_gen.rooms()[1].exits.contains(&hallway.id));
    }

    #[test]
    fn test_corridors_stay_one_cell_wide() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(1234);
        let segmenter = crate::generation::GridSegmenter::segment(&config, &mut rng).unwrap();

        let mut room_gen = RoomGenerator::new();
        let mut grid = GridLayer::new(config.rows, config.columns);
        room_gen
            .place_rooms(segmenter.segments(), &mut grid, &config, &mut rng)
            .unwrap();

        let mut hall_gen = HallwayGenerator::new();
        hall_gen
            .make_hallways(room_gen.rooms_mut(), &mut grid, &config, &mut rng)
            .unwrap();

        for hallway in hall_gen.hallways() {
            for cell in &hallway.path {
                for neighbour in cell.cardinal_neighbours() {
                    if !grid.in_bounds(neighbour) {
                        continue;
                    }
                    let value = grid[neighbour];
                    // A corridor cell may touch its own hallway, empty
                    // space or room boundary cells, but never another
                    // hallway or a room interior.
                    assert_ne!(value, ROOM_INTERIOR, "corridor hugs a room interior");
                    if value > EMPTY_SPACE {
                        assert_eq!(value, hallway.id, "two corridors touch at {}", neighbour);
                    }
                }
            }
        }
    }

    #[test]
    fn test_healing_yields_single_component() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(99);
        let segmenter = crate::generation::GridSegmenter::segment(&config, &mut rng).unwrap();

        let mut room_gen = RoomGenerator::new();
        let mut grid = GridLayer::new(config.rows, config.columns);
        room_gen
            .place_rooms(segmenter.segments(), &mut grid, &config, &mut rng)
            .unwrap();

        let mut hall_gen = HallwayGenerator::new();
        hall_gen
            .make_hallways(room_gen.rooms_mut(), &mut grid, &config, &mut rng)
            .unwrap();

        let grouped = hall_gen.grouped_rooms(room_gen.rooms(), 1);
        assert_eq!(grouped.len(), room_gen.rooms().len());
    }

    #[test]
    fn test_record_rejects_occupied_flank() {
        let mut grid = GridLayer::new(10, 10);
        let mut hallway = Hallway::dead_end(1, 1, GridPoint::new(5, 5), GridPoint::new(4, 5));

        // Something sits on the flank of the dig direction.
        grid[GridPoint::new(5, 4)] = ROOM_INTERIOR;

        let ok = HallwayGenerator::record_hallway_position(
            &mut grid,
            &mut hallway,
            GridPoint::new(5, 5),
            GridPoint::RIGHT,
            false,
        );
        assert!(!ok);
        assert!(hallway.path.is_empty());
        assert!(grid.is_empty(GridPoint::new(5, 5)));
    }

    #[test]
    fn test_failed_hallway_rolls_back() {
        let mut grid = GridLayer::new(12, 12);
        let mut hallway = Hallway::dead_end(3, 1, GridPoint::new(2, 5), GridPoint::new(1, 5));

        // Wall off the corridor three cells in.
        grid[GridPoint::new(5, 5)] = ROOM_INTERIOR;

        let ok = HallwayGenerator::dig_straight_line(
            &mut grid,
            &mut hallway,
            GridPoint::new(2, 5),
            GridPoint::new(8, 5),
        );
        assert!(!ok);

        HallwayGenerator::clear_hallway(&mut grid, &hallway);
        for x in 2..9 {
            let cell = GridPoint::new(x, 5);
            assert!(grid.is_empty(cell) || cell == GridPoint::new(5, 5));
        }
        assert_eq!(grid[GridPoint::new(5, 5)], ROOM_INTERIOR);
    }

    #[test]
    fn test_dead_end_hallway_has_single_exit() {
        let (mut room_gen, mut grid, config, mut rng) = two_room_setup();
        let mut hall_gen = HallwayGenerator::new();
        hall_gen
            .make_hallways(room_gen.rooms_mut(), &mut grid, &config, &mut rng)
            .unwrap();

        let before = hall_gen.hallways().len();
        let mut added = false;
        for _ in 0..8 {
            if hall_gen.add_dead_end_hallway(room_gen.rooms_mut(), &mut grid, &mut rng) {
                added = true;
                break;
            }
        }
        assert!(added, "no dead end could be dug on an open grid");

        let dead_end = hall_gen.hallways().last().unwrap();
        assert!(dead_end.destination_room.is_none());
        assert!(dead_end.valid);
        assert!(dead_end.path.len() >= 2);
        assert_eq!(grid[dead_end.source_exit], ROOM_EXIT);
        assert!(hall_gen.hallways().len() == before + 1);
    }

    #[test]
    fn test_extra_hallway_connects_new_pair() {
        let config = GenerationConfig::new(26, 26, 3, 4);
        let mut rng = RandomSource::from_seed(8);
        let segments = [
            Rect::new(2, 2, 6, 6),
            Rect::new(12, 2, 6, 6),
            Rect::new(2, 12, 6, 6),
        ];
        let (mut room_gen, mut grid) = build_rooms(&segments, &config, &mut rng);

        let mut hall_gen = HallwayGenerator::new();
        hall_gen
            .make_hallways(room_gen.rooms_mut(), &mut grid, &config, &mut rng)
            .unwrap();

        let before = hall_gen.hallways().len();
        let mut added = false;
        for _ in 0..6 {
            if hall_gen.add_extra_hallway(room_gen.rooms_mut(), &mut grid, &config, &mut rng) {
                added = true;
                break;
            }
        }

        if added {
            let extra = hall_gen.hallways().last().unwrap();
            assert!(extra.valid);
            assert!(hall_gen.hallways().len() > before);
            // The pair was not connected before this hallway.
            let (a, b) = (
                extra.source_room.unwrap(),
                extra.destination_room.unwrap(),
            );
            assert_eq!(
                hall_gen
                    .hallways()
                    .iter()
                    .filter(|h| h.connects(a, b))
                    .count(),
                1
            );
        }
    }
}
