//! # Puzzle Generator
//!
//! Partitions the connected dungeon into access sectors by inserting
//! locked doors at chosen room/hallway boundaries, then places a key for
//! every locked door in a sector reachable before that door is needed.

use crate::dungeon::door::{Door, DoorId, DoorKey, SectorId};
use crate::dungeon::hallway::{Hallway, HallwayId};
use crate::dungeon::room::{HubSeparation, Room, RoomId};
use crate::generation::RandomSource;
use crate::utils::math::GridPoint;
use log::{debug, warn};
use pathfinding::prelude::{bfs, bfs_reach};

/// Builds the lock-and-key sector graph over a finished room layout.
#[derive(Debug, Clone)]
pub struct PuzzleGenerator {
    spawn_room: RoomId,
    sectors: Vec<Vec<RoomId>>,
    doors: Vec<Door>,
    keys: Vec<DoorKey>,
}

impl PuzzleGenerator {
    /// Starts with a single sector containing every room; `spawn_room`
    /// seeds sector-0 splits so the player side keeps enough rooms.
    pub fn new(rooms: &[Room], spawn_room: RoomId) -> Self {
        PuzzleGenerator {
            spawn_room,
            sectors: vec![rooms.iter().map(|room| room.id).collect()],
            doors: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// The sector room lists, indexed by sector id.
    pub fn sectors(&self) -> &[Vec<RoomId>] {
        &self.sectors
    }

    /// The doors added so far.
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// The keys placed so far.
    pub fn keys(&self) -> &[DoorKey] {
        &self.keys
    }

    /// Number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Room count of the largest sector.
    pub fn largest_sector(&self) -> usize {
        self.sectors.iter().map(|sector| sector.len()).max().unwrap_or(0)
    }

    /// Consumes the generator, yielding doors, keys and sectors.
    pub fn into_parts(self) -> (Vec<Door>, Vec<DoorKey>, Vec<Vec<RoomId>>) {
        (self.doors, self.keys, self.sectors)
    }

    /// Adds up to `n` doors (each locked unless `locked` is false), then
    /// places keys for every locked door still lacking one. Returns how
    /// many doors were actually added.
    pub fn add_doors(
        &mut self,
        n: usize,
        locked: bool,
        rooms: &[Room],
        hallways: &[Hallway],
        rng: &mut RandomSource,
    ) -> usize {
        let mut added = 0;
        for _ in 0..n {
            if self.add_door(rooms, hallways, locked, rng).is_some() {
                added += 1;
            }
        }

        self.place_keys(rooms, hallways, rng);
        added
    }

    /// Splits one sector with a new door. Returns the new door's id, or
    /// `None` when no sector is large enough or no valid split exists.
    pub fn add_door(
        &mut self,
        rooms: &[Room],
        hallways: &[Hallway],
        locked: bool,
        rng: &mut RandomSource,
    ) -> Option<DoorId> {
        let largest = self.largest_sector();
        if largest < 3 {
            return None;
        }

        let sector_candidates: Vec<SectorId> = (0..self.sectors.len())
            .filter(|&id| self.sectors[id].len() >= largest - 1)
            .collect();
        let sector_id = *rng.pick(&sector_candidates);
        let sector = self.sectors[sector_id].clone();

        let seed_room = if sector_id == 0 {
            self.spawn_room
        } else {
            sector[0]
        };

        let mut valid_splits = Vec::new();
        for (room_id, hall_id) in self.candidate_door_positions(rooms, hallways, sector_id, rng) {
            let (near, far) = check_sector_split(&sector, seed_room, hall_id, rooms, hallways);

            if far.is_empty() {
                continue;
            }
            // The spawn side must keep at least three rooms.
            if sector_id == 0 && near.len() < 3 {
                continue;
            }
            // Never isolate a through-room behind a lock.
            let isolates_through_room = [&near, &far].into_iter().any(|group| {
                group.len() == 1 && !rooms[(group[0] - 1) as usize].is_terminus(hallways)
            });
            if isolates_through_room {
                continue;
            }

            debug!(
                "puzzle: splitting sector {} at room {} hall {} gives {} / {} rooms",
                sector_id,
                room_id,
                hall_id,
                near.len(),
                far.len()
            );
            valid_splits.push((room_id, hall_id, near, far));
        }

        if valid_splits.is_empty() {
            return None;
        }

        // Prefer the three most even splits, then draw among them.
        valid_splits
            .sort_by_key(|(_, _, near, far)| (near.len() as i32 - far.len() as i32).abs());
        let top = &valid_splits[..valid_splits.len().min(3)];
        let (room_id, hall_id, near, far) = top[rng.index(top.len())].clone();

        let new_sector_id = self.sectors.len();
        self.sectors[sector_id] = near;
        self.sectors.push(far);

        self.doors
            .push(Door::new(room_id, hall_id, [sector_id, new_sector_id], locked));
        self.relabel_doors(hallways);

        Some(self.doors.len() - 1)
    }

    /// Re-derives every door's two sector ids from current room
    /// membership; earlier doors may now face a freshly split-off sector.
    fn relabel_doors(&mut self, hallways: &[Hallway]) {
        let sector_of = |room: RoomId| -> Option<SectorId> {
            self.sectors
                .iter()
                .position(|sector| sector.contains(&room))
        };

        let mut relabelled = Vec::with_capacity(self.doors.len());
        for door in &self.doors {
            let near = sector_of(door.room);
            let far = hallways
                .get((door.hallway - 1) as usize)
                .and_then(|hall| hall.other_room(door.room))
                .and_then(sector_of);

            let sectors = match (near, far) {
                (Some(a), Some(b)) => [a, b],
                _ => door.sectors,
            };
            relabelled.push(sectors);
        }

        for (door, sectors) in self.doors.iter_mut().zip(relabelled) {
            door.sectors = sectors;
        }
    }

    /// Door-position candidates: rooms near the hub (separation 1 or 2)
    /// that do not border more than one hub room. Rooms with deep
    /// downstream branches may host the door on any exit; otherwise only
    /// exits descending towards the hub qualify, which also prunes dead
    /// ends.
    fn candidate_door_positions(
        &self,
        rooms: &[Room],
        hallways: &[Hallway],
        sector_id: SectorId,
        rng: &mut RandomSource,
    ) -> Vec<(RoomId, HallwayId)> {
        let mut candidates = Vec::new();

        for &room_id in &self.sectors[sector_id] {
            let room = &rooms[(room_id - 1) as usize];
            if !matches!(
                room.hub_separation,
                HubSeparation::Steps(1) | HubSeparation::Steps(2)
            ) {
                continue;
            }

            let hub_neighbours = room
                .exits
                .iter()
                .filter_map(|&id| hallways.get((id - 1) as usize))
                .filter_map(|hall| hall.other_room(room_id))
                .filter(|&other| rooms[(other - 1) as usize].hub_separation.is_hub())
                .count();
            if hub_neighbours > 1 {
                continue;
            }

            let max_downstream = max_reachable_separation(room_id, rooms, hallways);
            if max_downstream > HubSeparation::Steps(2) {
                candidates.push((room_id, room.exits[rng.index(room.exits.len())]));
            } else {
                let descending: Vec<HallwayId> = room
                    .exits
                    .iter()
                    .filter(|&&id| {
                        let other_separation = hallways
                            .get((id - 1) as usize)
                            .and_then(|hall| hall.other_room(room_id))
                            .map(|other| rooms[(other - 1) as usize].hub_separation)
                            .unwrap_or(room.hub_separation);
                        other_separation < room.hub_separation
                    })
                    .copied()
                    .collect();

                if descending.is_empty() {
                    continue;
                }
                candidates.push((room_id, descending[rng.index(descending.len())]));
            }
        }

        candidates
    }

    /// Places a key for every locked door that lacks one, in ascending
    /// order of the door's sector-graph distance from sector 0. Each key
    /// lands on a random tile of a random room in a sector on the door's
    /// longer upstream chain, so it is collectable before the door blocks
    /// progress; with no reachable chain the key falls back to sector 0.
    pub fn place_keys(&mut self, rooms: &[Room], hallways: &[Hallway], rng: &mut RandomSource) {
        let distances = self.sector_distances_from_spawn();

        let mut pending: Vec<DoorId> = (0..self.doors.len())
            .filter(|&id| !self.doors[id].unlocked)
            .filter(|&id| self.keys.iter().all(|key| key.door != id))
            .collect();
        pending.sort_by_key(|&id| {
            let [a, b] = self.doors[id].sectors;
            distances[a].min(distances[b])
        });

        for door_id in pending {
            let [near_sector, far_sector] = self.doors[door_id].sectors;

            let near_chain = self.upstream_sector_chain(near_sector);
            let far_chain = self.upstream_sector_chain(far_sector);
            let chain = if near_chain.len() >= far_chain.len() {
                near_chain
            } else {
                far_chain
            };

            let spawn_sector = if chain.is_empty() {
                warn!(
                    "puzzle: no reachable sector for the key of door {}; falling back to sector 0",
                    door_id
                );
                0
            } else {
                chain[rng.index(chain.len())]
            };

            let sector_rooms = &self.sectors[spawn_sector];
            if sector_rooms.is_empty() {
                warn!("puzzle: sector {} is empty, key skipped", spawn_sector);
                continue;
            }

            let room_id = sector_rooms[rng.index(sector_rooms.len())];
            let room = &rooms[(room_id - 1) as usize];
            let tiles: Vec<GridPoint> = room.tiles().collect();
            let spawn = tiles[rng.index(tiles.len())];

            debug!(
                "puzzle: key for door {} spawns in sector {} room {} at {}",
                door_id, spawn_sector, room_id, spawn
            );
            self.keys.push(DoorKey::new(door_id, spawn, spawn_sector));
        }
    }

    /// BFS distance of every sector from sector 0, over all doors
    /// regardless of lock state. Unreached sectors get `usize::MAX`.
    fn sector_distances_from_spawn(&self) -> Vec<usize> {
        let mut distances = vec![usize::MAX; self.sectors.len()];
        if self.sectors.is_empty() {
            return distances;
        }

        distances[0] = 0;
        let mut queue = std::collections::VecDeque::from([0usize]);
        while let Some(sector) = queue.pop_front() {
            for door in &self.doors {
                let Some(other) = door.other_sector(sector) else {
                    continue;
                };
                if distances[other] == usize::MAX {
                    distances[other] = distances[sector] + 1;
                    queue.push_back(other);
                }
            }
        }

        distances
    }

    /// The sector chain from sector 0 to `target` crossing only doors
    /// that are already unlocked or have a key placed; empty when no such
    /// chain exists.
    fn upstream_sector_chain(&self, target: SectorId) -> Vec<SectorId> {
        let traversable: Vec<&Door> = self
            .doors
            .iter()
            .enumerate()
            .filter(|(id, door)| {
                door.unlocked || self.keys.iter().any(|key| key.door == *id)
            })
            .map(|(_, door)| door)
            .collect();

        bfs(
            &0usize,
            |&sector| {
                traversable
                    .iter()
                    .filter_map(|door| door.other_sector(sector))
                    .collect::<Vec<_>>()
            },
            |&sector| sector == target,
        )
        .unwrap_or_default()
    }
}

/// Simulates removing `splitter` from the sector's hallway graph: BFS
/// flood from `seed_room` restricted to sector members, returning the
/// reached ("near") and unreached ("far") room groups.
fn check_sector_split(
    sector: &[RoomId],
    seed_room: RoomId,
    splitter: HallwayId,
    rooms: &[Room],
    hallways: &[Hallway],
) -> (Vec<RoomId>, Vec<RoomId>) {
    let near: Vec<RoomId> = bfs_reach(seed_room, |&id| {
        rooms[(id - 1) as usize]
            .exits
            .iter()
            .filter(|&&hall_id| hall_id != splitter)
            .filter_map(|&hall_id| hallways.get((hall_id - 1) as usize))
            .filter_map(|hall| hall.other_room(id))
            .filter(|other| sector.contains(other))
            .collect::<Vec<_>>()
    })
    .collect();

    let far: Vec<RoomId> = sector
        .iter()
        .filter(|id| !near.contains(id))
        .copied()
        .collect();

    (near, far)
}

/// The largest hub separation reachable from `start` without ever
/// stepping to a room closer to the hub, i.e. the depth of the branch
/// hanging off this room.
fn max_reachable_separation(start: RoomId, rooms: &[Room], hallways: &[Hallway]) -> HubSeparation {
    let mut seen = vec![start];
    let mut stack = vec![start];
    let mut max_separation = rooms[(start - 1) as usize].hub_separation;

    while let Some(id) = stack.pop() {
        let separation = rooms[(id - 1) as usize].hub_separation;
        for &hall_id in &rooms[(id - 1) as usize].exits {
            let Some(other) = hallways
                .get((hall_id - 1) as usize)
                .and_then(|hall| hall.other_room(id))
            else {
                continue;
            };
            if seen.contains(&other) {
                continue;
            }
            let other_separation = rooms[(other - 1) as usize].hub_separation;
            if other_separation < separation {
                continue;
            }

            seen.push(other);
            stack.push(other);
            if other_separation > max_separation {
                max_separation = other_separation;
            }
        }
    }

    max_separation
}
