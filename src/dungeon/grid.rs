//! # Dungeon Grid
//!
//! The shared integer cell grid every generation stage stamps into
//! ([`GridLayer`]), a Chebyshev distance transform over it
//! ([`DistanceGrid`]), and the finished read-only level published to
//! consumers ([`DungeonGrid`]).

use crate::dungeon::door::{Door, DoorKey};
use crate::dungeon::hallway::{Hallway, HallwayId};
use crate::dungeon::room::{Room, RoomId, HUB_ROOM_ID};
use crate::utils::math::GridPoint;
use serde::{Deserialize, Serialize};

/// Cell not claimed by any room or hallway.
pub const EMPTY_SPACE: i32 = 0;
/// Plain room boundary cell, a potential hallway exit.
pub const ROOM_PERIMETER: i32 = -1;
/// Boundary cell a hallway opens through.
pub const ROOM_EXIT: i32 = -2;
/// Boundary cell no hallway may open through.
pub const ROOM_FORBIDDEN_EXIT: i32 = -4;
/// Boundary cell where the perimeter turns a corner.
pub const ROOM_CORNER: i32 = -5;
/// Cell strictly inside a room.
pub const ROOM_INTERIOR: i32 = -10;

/// Offset turning cell codes into printable characters in the diagnostic
/// dump.
const GRID_VALUE_TO_CHAR_BASE: i32 = 73;

/// The mutable integer grid the pipeline carves rooms and hallways into.
///
/// Every in-bounds cell holds exactly one code: [`EMPTY_SPACE`], one of
/// the negative room codes, or a positive hallway id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridLayer {
    cells: Vec<i32>,
    rows: i32,
    columns: i32,
}

impl GridLayer {
    /// Allocates an all-empty grid.
    pub fn new(rows: i32, columns: i32) -> Self {
        GridLayer {
            cells: vec![EMPTY_SPACE; (rows * columns).max(0) as usize],
            rows,
            columns,
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// An upper bound on any in-grid Manhattan distance; used as a "give
    /// up" budget by hallway digging.
    pub fn largest_manhattan_distance(&self) -> i32 {
        self.rows + self.columns
    }

    /// Whether the point lies on the grid.
    pub fn in_bounds(&self, point: GridPoint) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.columns && point.y < self.rows
    }

    fn offset(&self, point: GridPoint) -> usize {
        (point.y * self.columns + point.x) as usize
    }

    /// Whether the cell is unclaimed.
    pub fn is_empty(&self, point: GridPoint) -> bool {
        self[point] == EMPTY_SPACE
    }

    /// Whether the cell is a plain perimeter cell (a legal exit host).
    pub fn is_perimeter(&self, point: GridPoint) -> bool {
        self[point] == ROOM_PERIMETER
    }

    /// Whether the cell belongs to any room.
    pub fn is_any_room(&self, point: GridPoint) -> bool {
        matches!(
            self[point],
            ROOM_CORNER | ROOM_EXIT | ROOM_FORBIDDEN_EXIT | ROOM_INTERIOR | ROOM_PERIMETER
        )
    }

    /// Whether the cell belongs to a hallway.
    pub fn is_hallway(&self, point: GridPoint) -> bool {
        self[point] > EMPTY_SPACE
    }

    /// Whether an entity can stand on the cell (any claimed cell).
    pub fn is_walkable(&self, point: GridPoint) -> bool {
        self[point] != EMPTY_SPACE
    }

    /// The first empty cardinal neighbour of `point`, scanning in the
    /// canonical direction order.
    pub fn empty_neighbour(&self, point: GridPoint) -> Option<GridPoint> {
        GridPoint::CARDINALS.into_iter().find_map(|direction| {
            let candidate = point + direction;
            (self.in_bounds(candidate) && self.is_empty(candidate)).then_some(candidate)
        })
    }

    /// Renders the grid as a character map for diagnostics. Room interiors
    /// print a pattern derived from the owning room's id, empty space
    /// prints `.`, everything else prints as an offset character. Not a
    /// stable format.
    pub fn render(&self, rooms: &[Room]) -> String {
        let mut output = String::with_capacity((self.rows * (self.columns + 1)) as usize);

        for row in 0..self.rows {
            for col in 0..self.columns {
                let point = GridPoint::new(col, row);
                let value = self[point];

                if value == ROOM_INTERIOR {
                    if let Some(room) = rooms.iter().find(|room| room.contains(point)) {
                        let name = format!("{}#", room.id);
                        let chars: Vec<char> = name.chars().collect();
                        let idx = (chars.len() - 1).min(((row + col) as usize) % chars.len());
                        output.push(chars[idx]);
                    } else {
                        output.push(code_char(value));
                    }
                } else if value == EMPTY_SPACE {
                    output.push('.');
                } else {
                    output.push(code_char(value));
                }
            }
            output.push('\n');
        }

        output
    }
}

fn code_char(value: i32) -> char {
    char::from_u32((value + GRID_VALUE_TO_CHAR_BASE).clamp(33, 126) as u32).unwrap_or('?')
}

impl std::ops::Index<GridPoint> for GridLayer {
    type Output = i32;

    fn index(&self, point: GridPoint) -> &i32 {
        &self.cells[self.offset(point)]
    }
}

impl std::ops::IndexMut<GridPoint> for GridLayer {
    fn index_mut(&mut self, point: GridPoint) -> &mut i32 {
        let offset = self.offset(point);
        &mut self.cells[offset]
    }
}

/// Chebyshev distance transform from a seed region.
///
/// Cells satisfying the seed predicate get distance 0; everything else gets
/// the ring distance to the region, expanding one ring per pass.
#[derive(Debug, Clone)]
pub struct DistanceGrid {
    distances: Vec<i32>,
    rows: i32,
    columns: i32,
    max_distance: i32,
}

impl DistanceGrid {
    /// Builds the transform over a `rows` x `columns` grid with seed cells
    /// chosen by `is_in`.
    pub fn new(rows: i32, columns: i32, is_in: impl Fn(GridPoint) -> bool) -> Self {
        let mut distances = vec![0; (rows * columns).max(0) as usize];

        let mut in_group = Vec::new();
        let mut out_group = Vec::new();
        for row in 0..rows {
            for col in 0..columns {
                let point = GridPoint::new(col, row);
                if is_in(point) {
                    in_group.push(point);
                } else {
                    out_group.push(point);
                }
            }
        }

        let mut distance = 0;
        while !out_group.is_empty() {
            distance += 1;

            let mut next_group = Vec::new();
            for &point in &out_group {
                if in_group
                    .iter()
                    .any(|other| point.chebyshev_distance(*other) == 1)
                {
                    distances[(point.y * columns + point.x) as usize] = distance;
                    next_group.push(point);
                }
            }

            if next_group.is_empty() {
                // Isolated remainder; nothing borders the region any more.
                break;
            }

            in_group = next_group;
            out_group.retain(|point| !in_group.contains(point));
        }

        DistanceGrid {
            distances,
            rows,
            columns,
            max_distance: distance,
        }
    }

    /// The largest distance assigned to any cell.
    pub fn max_distance(&self) -> i32 {
        self.max_distance
    }

    /// Distance at a point.
    pub fn distance(&self, point: GridPoint) -> i32 {
        self.distances[(point.y * self.columns + point.x) as usize]
    }

    /// All coordinates at exactly the given distance, in row-major order.
    pub fn coordinates(&self, distance: i32) -> impl Iterator<Item = GridPoint> + '_ {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| {
            (0..columns).filter_map(move |col| {
                let point = GridPoint::new(col, row);
                (self.distance(point) == distance).then_some(point)
            })
        })
    }
}

/// The finished level: the stamped grid plus every registry a consumer
/// needs, published read-only after generation. Door lock/open state is
/// the single post-generation mutation surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonGrid {
    /// The stamped cell grid.
    pub layer: GridLayer,
    /// All rooms, in creation order (ids are 1-based).
    pub rooms: Vec<Room>,
    /// All valid hallways, in creation order (ids are 1-based).
    pub hallways: Vec<Hallway>,
    /// All doors, in creation order.
    pub doors: Vec<Door>,
    /// All door keys, one per locked door.
    pub keys: Vec<DoorKey>,
    /// The home-base room outside the playfield, if one was built.
    pub hub: Option<Room>,
    /// The chosen player start tile.
    pub player_spawn: GridPoint,
    /// The room containing the start tile.
    pub player_spawn_room: RoomId,
    /// The cardinal direction the player initially faces.
    pub player_look_direction: GridPoint,
    /// World-units edge length of one grid cell.
    pub tile_size: f32,
}

impl DungeonGrid {
    /// Looks up a room by id, including the hub.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        if id == HUB_ROOM_ID {
            return self.hub.as_ref();
        }
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Looks up a hallway by its 1-based id.
    pub fn hallway(&self, id: HallwayId) -> Option<&Hallway> {
        self.hallways.get((id - 1) as usize)
    }

    /// Raw cell code at a coordinate, or `None` when out of bounds.
    pub fn cell(&self, point: GridPoint) -> Option<i32> {
        self.layer.in_bounds(point).then(|| self.layer[point])
    }

    /// Whether a gameplay entity can occupy the cell: inside the hub
    /// (except its focal center), or on a claimed grid cell not blocked by
    /// a closed door.
    pub fn accessible(&self, point: GridPoint) -> bool {
        if let Some(hub) = &self.hub {
            if hub.contains(point) && hub.center != point {
                return true;
            }
        }

        self.layer.in_bounds(point)
            && self.layer.is_walkable(point)
            && !self.doors.iter().any(|door| {
                door.closed && door.coordinates(&self.hallways) == Some(point)
            })
    }

    /// World position of a grid cell at the given elevation.
    pub fn local_world_position(&self, point: GridPoint, elevation: f32) -> [f32; 3] {
        [
            point.x as f32 * self.tile_size,
            elevation,
            point.y as f32 * self.tile_size,
        ]
    }

    /// The diagnostic character map of the layer.
    pub fn render(&self) -> String {
        self.layer.render(&self.rooms)
    }
}
