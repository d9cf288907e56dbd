//! # Hallways
//!
//! A [`Hallway`] is a one-cell-wide corridor between two room exits (or a
//! dead end into open space). Its path cells carry the hallway's id on the
//! grid; wall directions for consumers are derived from the path alone.

use crate::dungeon::room::RoomId;
use crate::utils::math::GridPoint;
use serde::{Deserialize, Serialize};

/// Identifies a hallway. Ids are 1-based and match the positive cell code
/// stamped on the grid.
pub type HallwayId = i32;

/// A corridor between two rooms, or from one room into open space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hallway {
    /// Unique 1-based id; equal to the grid stamp of the path cells.
    pub id: HallwayId,
    /// Room the corridor starts from, if any.
    pub source_room: Option<RoomId>,
    /// First corridor cell, one step outside the source room.
    pub source: GridPoint,
    /// The source room's perimeter cell the corridor opens through.
    pub source_exit: GridPoint,
    /// Room the corridor ends in; `None` for dead-end hallways.
    pub destination_room: Option<RoomId>,
    /// Last corridor cell, one step outside the destination room.
    pub destination: GridPoint,
    /// The destination room's perimeter cell; for dead ends this repeats
    /// the source exit so the far end keeps its wall.
    pub destination_exit: GridPoint,
    /// Set once the whole path was dug without collisions.
    pub valid: bool,
    /// Path cells from source to destination, in dig order.
    pub path: Vec<GridPoint>,
}

impl Hallway {
    /// Creates an empty (not yet dug) hallway between two room exits.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: HallwayId,
        source_room: RoomId,
        source: GridPoint,
        source_exit: GridPoint,
        destination_room: RoomId,
        destination: GridPoint,
        destination_exit: GridPoint,
    ) -> Self {
        Hallway {
            id,
            source_room: Some(source_room),
            source,
            source_exit,
            destination_room: Some(destination_room),
            destination,
            destination_exit,
            valid: false,
            path: Vec::new(),
        }
    }

    /// Creates an empty dead-end hallway leaving `source_room` with no
    /// destination. The destination point is updated as digging proceeds.
    pub fn dead_end(
        id: HallwayId,
        source_room: RoomId,
        source: GridPoint,
        source_exit: GridPoint,
    ) -> Self {
        Hallway {
            id,
            source_room: Some(source_room),
            source,
            source_exit,
            destination_room: None,
            destination: source,
            destination_exit: source_exit,
            valid: false,
            path: Vec::new(),
        }
    }

    /// Whether the corridor contains the given cell.
    pub fn contains(&self, point: GridPoint) -> bool {
        self.path.contains(&point)
    }

    /// Whether the point is one of the two room-side exit cells.
    pub fn is_hall_exit(&self, point: GridPoint) -> bool {
        self.source_exit == point || self.destination_exit == point
    }

    /// Whether this hallway connects the two given rooms (either way).
    pub fn connects(&self, room: RoomId, other: RoomId) -> bool {
        self.source_room == Some(room) && self.destination_room == Some(other)
            || self.source_room == Some(other) && self.destination_room == Some(room)
    }

    /// The room on the other end from `room`, if there is one.
    pub fn other_room(&self, room: RoomId) -> Option<RoomId> {
        if self.source_room == Some(room) {
            self.destination_room
        } else {
            self.source_room
        }
    }

    /// The perimeter cell on `room`'s side.
    pub fn room_exit(&self, room: RoomId) -> Option<GridPoint> {
        if self.source_room == Some(room) {
            Some(self.source_exit)
        } else if self.destination_room == Some(room) {
            Some(self.destination_exit)
        } else {
            None
        }
    }

    /// The first corridor cell on `room`'s side.
    pub fn hall_start(&self, room: RoomId) -> Option<GridPoint> {
        if self.source_room == Some(room) {
            Some(self.source)
        } else if self.destination_room == Some(room) {
            Some(self.destination)
        } else {
            None
        }
    }

    /// For every path cell, the cardinal directions that face open space
    /// rather than another cell of this hallway — where a consumer places
    /// wall geometry. Reproducible from the path alone.
    pub fn wall_directions(&self) -> Vec<Vec<GridPoint>> {
        let mut walls = Vec::with_capacity(self.path.len());
        let mut current_direction = self.source - self.source_exit;

        for (i, &point) in self.path.iter().enumerate() {
            let mut candidates = vec![
                GridPoint::new(-current_direction.y, current_direction.x),
                GridPoint::new(current_direction.y, -current_direction.x),
            ];
            if point + current_direction != self.destination_exit {
                candidates.push(current_direction);
            }

            let mut directions = Vec::new();
            for direction in candidates.drain(..) {
                let neighbour = point + direction;
                if !self.path.contains(&neighbour) {
                    directions.push(direction);
                }
            }
            walls.push(directions);

            if i + 1 < self.path.len() {
                current_direction = self.path[i + 1] - point;
            }
        }

        walls
    }

    /// World-space wall placements for every exposed path-cell side.
    pub fn walls(&self, scale: f32, elevation: f32) -> Vec<WallPosition> {
        self.wall_directions()
            .iter()
            .zip(self.path.iter())
            .flat_map(|(directions, &point)| {
                directions
                    .iter()
                    .map(move |&direction| WallPosition::from(point, direction, scale, elevation))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl std::fmt::Display for Hallway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Hallway {} {:?}:{} -> {:?}:{} ({} cells{})>",
            self.id,
            self.source_room,
            self.source_exit,
            self.destination_room,
            self.destination_exit,
            self.path.len(),
            if self.valid { "" } else { "; invalid" }
        )
    }
}

/// A wall panel position derived from a cell and an exposed side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallPosition {
    /// The corridor cell owning the wall.
    pub coordinates: GridPoint,
    /// The exposed cardinal side.
    pub direction: GridPoint,
    /// World position of the wall panel midpoint.
    pub position: [f32; 3],
    /// Yaw of the facing direction, radians.
    pub yaw: f32,
}

impl WallPosition {
    /// Places a wall panel halfway between `point` and its neighbour in
    /// `direction`, scaled to world units and raised to `elevation`.
    pub fn from(point: GridPoint, direction: GridPoint, scale: f32, elevation: f32) -> Self {
        let x = (point.x as f32 + 0.5 * direction.x as f32) * scale;
        let z = (point.y as f32 + 0.5 * direction.y as f32) * scale;

        WallPosition {
            coordinates: point,
            direction,
            position: [x, elevation, z],
            yaw: (direction.x as f32).atan2(direction.y as f32),
        }
    }
}
