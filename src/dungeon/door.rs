//! # Doors and Keys
//!
//! A [`Door`] sits at the room-side end of one hallway and separates two
//! access sectors. Its lock and open state are the only data the gameplay
//! layer mutates after generation. A [`DoorKey`] opens exactly one door
//! and records where (and in which sector) it spawns.

use crate::dungeon::hallway::{Hallway, HallwayId};
use crate::dungeon::room::RoomId;
use crate::utils::math::GridPoint;
use serde::{Deserialize, Serialize};

/// Index of a door in the level's door registry.
pub type DoorId = usize;

/// Identifies an access sector (an index into the sector room lists).
pub type SectorId = usize;

/// A door between two sectors, placed where a hallway leaves a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    /// The room whose exit hosts the door.
    pub room: RoomId,
    /// The hallway the door opens into.
    pub hallway: HallwayId,
    /// The two sector ids the door separates; updated in place when later
    /// doors subdivide a sector.
    pub sectors: [SectorId; 2],
    /// Whether the lock has been opened. Doors are created locked unless
    /// the puzzle stage is asked otherwise.
    pub unlocked: bool,
    /// Physical open/closed state, independent of the lock.
    pub closed: bool,
}

impl Door {
    /// Creates a door on `room`'s exit into `hallway`.
    pub fn new(room: RoomId, hallway: HallwayId, sectors: [SectorId; 2], locked: bool) -> Self {
        Door {
            room,
            hallway,
            sectors,
            unlocked: !locked,
            closed: true,
        }
    }

    /// Grid cell the door occupies: the first corridor cell on the room's
    /// side of its hallway.
    pub fn coordinates(&self, hallways: &[Hallway]) -> Option<GridPoint> {
        hallways
            .get((self.hallway - 1) as usize)
            .and_then(|hall| hall.hall_start(self.room))
    }

    /// Facing direction, from the room's exit cell towards the corridor.
    pub fn direction_from_room(&self, hallways: &[Hallway]) -> Option<GridPoint> {
        let hall = hallways.get((self.hallway - 1) as usize)?;
        let exit = hall.room_exit(self.room)?;
        let start = hall.hall_start(self.room)?;
        Some(start - exit)
    }

    /// Whether the door separates the given sector from somewhere else.
    pub fn faces_sector(&self, sector: SectorId) -> bool {
        self.sectors[0] == sector || self.sectors[1] == sector
    }

    /// The sector on the other side of the door from `sector`.
    pub fn other_sector(&self, sector: SectorId) -> Option<SectorId> {
        if self.sectors[0] == sector {
            Some(self.sectors[1])
        } else if self.sectors[1] == sector {
            Some(self.sectors[0])
        } else {
            None
        }
    }
}

/// A key bound to one door, spawned at a fixed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorKey {
    /// The door this key opens.
    pub door: DoorId,
    /// The tile the key spawns on.
    pub spawn_position: GridPoint,
    /// The sector the spawn tile belongs to.
    pub spawn_sector: SectorId,
}

impl DoorKey {
    /// Creates a key for `door` at the given spawn tile.
    pub fn new(door: DoorId, spawn_position: GridPoint, spawn_sector: SectorId) -> Self {
        DoorKey {
            door,
            spawn_position,
            spawn_sector,
        }
    }
}

impl std::fmt::Display for DoorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Key for door {}; spawn: {} / {}>",
            self.door, self.spawn_sector, self.spawn_position
        )
    }
}
