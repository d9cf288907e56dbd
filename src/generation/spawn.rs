//! # Start Position Selection
//!
//! Chooses the player's starting room by hub separation: prefer the quiet
//! far reaches of the level, falling back gracefully when the level is
//! small or has no hub at all.

use crate::dungeon::grid::{GridLayer, ROOM_PERIMETER};
use crate::dungeon::hallway::Hallway;
use crate::dungeon::room::{HubSeparation, Room, RoomId};
use crate::generation::RandomSource;
use crate::utils::math::GridPoint;
use log::error;
use std::cmp::Reverse;

/// Picks the start room and tile.
///
/// The most separated room anchors the choice: separation 0 is taken
/// directly; shallow levels (max separation below 4) draw among all rooms
/// with positive separation up to the maximum; deep levels draw among
/// rooms within one step of the maximum.
pub fn choose_start_position(
    rooms: &[Room],
    grid: &GridLayer,
    rng: &mut RandomSource,
) -> Option<(RoomId, GridPoint)> {
    let mut candidates: Vec<&Room> = rooms.iter().collect();
    candidates.sort_by_key(|room| Reverse(room.hub_separation));

    let candidate = *candidates.first()?;

    if candidate.hub_separation.is_hub() {
        return choose_in_room(candidate, grid, rng).map(|point| (candidate.id, point));
    }

    if candidate.hub_separation < HubSeparation::Steps(4) {
        let pool: Vec<&Room> = candidates
            .iter()
            .filter(|room| {
                room.hub_separation <= candidate.hub_separation
                    && room.hub_separation > HubSeparation::Steps(0)
            })
            .copied()
            .collect();
        let room = *rng.pick(&pool);
        return choose_in_room(room, grid, rng).map(|point| (room.id, point));
    }

    let threshold = candidate.hub_separation.saturating_pred();
    let pool: Vec<&Room> = candidates
        .iter()
        .filter(|room| room.hub_separation >= threshold)
        .copied()
        .collect();

    if pool.is_empty() {
        error!(
            "spawn: no start candidates out of {} rooms around separation {:?}",
            candidates.len(),
            candidate.hub_separation
        );
        return choose_in_room(candidate, grid, rng).map(|point| (candidate.id, point));
    }

    let room = *rng.pick(&pool);
    choose_in_room(room, grid, rng).map(|point| (room.id, point))
}

/// A random interior tile, or a random plain-perimeter tile when the room
/// has no interior.
fn choose_in_room(room: &Room, grid: &GridLayer, rng: &mut RandomSource) -> Option<GridPoint> {
    if !room.interior().is_empty() {
        return Some(room.interior()[rng.index(room.interior().len())]);
    }

    let options: Vec<GridPoint> = room
        .perimeter()
        .iter()
        .filter(|&&point| grid.in_bounds(point) && grid[point] == ROOM_PERIMETER)
        .copied()
        .collect();

    if options.is_empty() {
        return None;
    }
    Some(options[rng.index(options.len())])
}

/// The direction the player initially faces: along the most axis-aligned
/// exit, or a random cardinal when the room has no exits.
pub fn spawn_look_direction(
    spawn: GridPoint,
    room: &Room,
    hallways: &[Hallway],
    rng: &mut RandomSource,
) -> GridPoint {
    let mut directions: Vec<GridPoint> = room.directions_to_exits(spawn, hallways).collect();
    directions.sort_by_key(|direction| direction.smallest_dimension());

    match directions.first() {
        Some(direction) => direction.main_direction(),
        None => rng.direction(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::Rect;

    fn room_with_separation(id: RoomId, x: i32, separation: HubSeparation) -> Room {
        let mut room = Room::from_segments(id, vec![Rect::new(x, 2, 5, 5)]).unwrap();
        room.hub_separation = separation;
        room
    }

    #[test]
    fn test_spawn_lands_in_most_separated_region() {
        let grid = GridLayer::new(40, 40);
        let rooms = vec![
            room_with_separation(1, 0, HubSeparation::Steps(0)),
            room_with_separation(2, 8, HubSeparation::Steps(4)),
            room_with_separation(3, 16, HubSeparation::Steps(5)),
            room_with_separation(4, 24, HubSeparation::Steps(5)),
        ];
        let mut rng = RandomSource::from_seed(2);

        let (room_id, point) = choose_start_position(&rooms, &grid, &mut rng).unwrap();
        // Deep level: only rooms within one step of the maximum qualify.
        assert!(room_id >= 2);
        let room = rooms.iter().find(|room| room.id == room_id).unwrap();
        assert!(room.contains(point));
        assert!(room.interior().contains(&point));
    }

    #[test]
    fn test_shallow_level_avoids_hub_rooms() {
        let grid = GridLayer::new(40, 40);
        let rooms = vec![
            room_with_separation(1, 0, HubSeparation::Steps(0)),
            room_with_separation(2, 8, HubSeparation::Steps(1)),
            room_with_separation(3, 16, HubSeparation::Steps(2)),
        ];
        let mut rng = RandomSource::from_seed(9);

        let (room_id, _) = choose_start_position(&rooms, &grid, &mut rng).unwrap();
        assert_ne!(room_id, 1);
    }

    #[test]
    fn test_no_rooms_yields_none() {
        let grid = GridLayer::new(10, 10);
        let mut rng = RandomSource::from_seed(1);
        assert!(choose_start_position(&[], &grid, &mut rng).is_none());
    }

    #[test]
    fn test_look_direction_follows_exits() {
        let mut room = Room::from_segments(1, vec![Rect::new(2, 2, 5, 5)]).unwrap();
        room.exits.push(1);

        let mut hall = Hallway::new(
            1,
            1,
            GridPoint::new(7, 4),
            GridPoint::new(6, 4),
            2,
            GridPoint::new(10, 4),
            GridPoint::new(11, 4),
        );
        hall.valid = true;
        let hallways = vec![hall];

        let mut rng = RandomSource::from_seed(1);
        let direction =
            spawn_look_direction(GridPoint::new(3, 4), &room, &hallways, &mut rng);
        assert_eq!(direction, GridPoint::RIGHT);
    }
}
