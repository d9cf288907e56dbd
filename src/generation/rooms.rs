//! # Room Generator
//!
//! Merges adjacent segments into rooms, stamps their geometry onto the
//! shared grid and maintains the hub-separation metric over the room
//! graph once hallways exist.

use crate::dungeon::grid::{
    GridLayer, EMPTY_SPACE, ROOM_CORNER, ROOM_FORBIDDEN_EXIT, ROOM_INTERIOR, ROOM_PERIMETER,
};
use crate::dungeon::hallway::Hallway;
use crate::dungeon::room::{HubSeparation, Room, RoomId, HUB_ROOM_ID};
use crate::generation::{GenerationConfig, RandomSource};
use crate::utils::math::Rect;
use crate::{DelveError, DelveResult};
use log::{debug, warn};

/// Overlap threshold that accepts any shared border, corner contact
/// included.
const CORNER_OVERLAP_THRESHOLD: i32 = -1;

/// Builds rooms from segments and owns the room registry.
#[derive(Debug, Clone, Default)]
pub struct RoomGenerator {
    rooms: Vec<Room>,
}

impl RoomGenerator {
    /// Creates an empty generator.
    pub fn new() -> Self {
        Self { rooms: Vec::new() }
    }

    /// The rooms placed so far, in id order (room id = index + 1).
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Mutable access for stages that record exits and separations.
    pub fn rooms_mut(&mut self) -> &mut [Room] {
        &mut self.rooms
    }

    /// Consumes the generator, yielding the room registry.
    pub fn into_rooms(self) -> Vec<Room> {
        self.rooms
    }

    /// Claims segments into rooms until the random room-count target is
    /// reached or the segments run out, stamping each room onto `grid`.
    ///
    /// Rooms whose geometry cannot be classified are skipped with a
    /// warning; structural grid corruption aborts the run.
    pub fn place_rooms(
        &mut self,
        segments: &[Rect],
        grid: &mut GridLayer,
        config: &GenerationConfig,
        rng: &mut RandomSource,
    ) -> DelveResult<()> {
        let n_segments = segments.len();
        let n_rooms = rng.range(config.min_rooms as i32, config.max_rooms as i32) as usize;
        debug!("rooms: targeting {} rooms from {} segments", n_rooms, n_segments);

        let mut discarded = vec![false; n_segments];
        let mut claimed = vec![false; n_segments];
        let mut claimed_count = 0usize;
        let mut discarded_too_large = 0usize;

        for candidate_idx in 0..n_segments {
            if discarded[candidate_idx] || claimed[candidate_idx] {
                continue;
            }

            let room_core = segments[candidate_idx];
            let mut room_area = room_core.area();
            if room_area > config.max_room_area {
                warn!(
                    "rooms: segment {} area {} exceeds max_room_area {}",
                    room_core, room_area, config.max_room_area
                );
                discarded[candidate_idx] = true;
                discarded_too_large += 1;
                continue;
            }

            let mut room_segments = vec![room_core];
            claimed[candidate_idx] = true;
            claimed_count += 1;

            let wanted_segments = if rng.chance(config.multi_segment_room_probability) {
                rng.range(2, config.max_segments_per_room as i32) as usize
            } else {
                1
            };

            for neighbour_idx in (candidate_idx + 1)..n_segments {
                if discarded[neighbour_idx] || claimed[neighbour_idx] {
                    continue;
                }

                let neighbour = segments[neighbour_idx];
                let expand = room_segments.len() < wanted_segments;

                let overlap = if expand {
                    config.room_part_min_overlap
                } else {
                    CORNER_OVERLAP_THRESHOLD
                };

                if neighbouring_segments(&room_core, &neighbour, overlap) {
                    let neighbour_area = neighbour.area();
                    if expand && !room_core.unites_to_rect(&neighbour) {
                        if room_area + neighbour_area < config.max_room_area {
                            room_area += neighbour_area;
                            claimed[neighbour_idx] = true;
                            claimed_count += 1;
                            room_segments.push(neighbour);

                            // Segments that touch the absorbed neighbour at
                            // a corner would leave diagonal slivers; drop
                            // them outright.
                            for next_idx in (candidate_idx + 1)..n_segments {
                                if next_idx == neighbour_idx
                                    || claimed[next_idx]
                                    || discarded[next_idx]
                                {
                                    continue;
                                }
                                if neighbouring_segments(
                                    &neighbour,
                                    &segments[next_idx],
                                    CORNER_OVERLAP_THRESHOLD,
                                ) {
                                    discarded[next_idx] = true;
                                }
                            }
                        } else {
                            discarded_too_large += 1;
                            discarded[neighbour_idx] = true;
                        }
                    } else {
                        discarded[neighbour_idx] = true;
                    }
                } else if expand
                    && neighbouring_segments(&room_core, &neighbour, CORNER_OVERLAP_THRESHOLD)
                {
                    discarded[neighbour_idx] = true;
                }
            }

            let room_id = (self.rooms.len() + 1) as RoomId;
            match Room::from_segments(room_id, room_segments) {
                Ok(room) => {
                    record_room_on_grid(grid, &room, config);
                    debug!("rooms: placed {}", room);
                    self.rooms.push(room);
                }
                Err(DelveError::GenerationFailed(message)) => {
                    warn!("rooms: skipping unbuildable room: {}", message);
                }
                Err(error) => return Err(error),
            }

            if self.rooms.len() >= n_rooms {
                break;
            }
        }

        let discarded_count = discarded.iter().filter(|&&d| d).count();
        if self.rooms.len() < n_rooms {
            warn!(
                "rooms: made {} rooms using {} segments (wanted {}) out of {}; discarded {} ({} too large)",
                self.rooms.len(), claimed_count, n_rooms, n_segments, discarded_count, discarded_too_large
            );
        } else {
            debug!(
                "rooms: made {} rooms using {} segments (wanted {}) out of {}; discarded {} ({} too large)",
                self.rooms.len(), claimed_count, n_rooms, n_segments, discarded_count, discarded_too_large
            );
        }

        Ok(())
    }

    /// Recomputes every room's hub separation: rooms with more than two
    /// exits are hubs at distance 0, everything else gets its BFS distance
    /// over the hallway graph, unreached rooms stay `Unreachable`.
    pub fn calculate_hub_separations(&mut self, hallways: &[Hallway]) {
        for room in &mut self.rooms {
            room.hub_separation = HubSeparation::Unreachable;
        }

        let mut calculated: Vec<usize> = Vec::new();
        for idx in 0..self.rooms.len() {
            if self.rooms[idx].exits.len() > 2 {
                self.rooms[idx].hub_separation = HubSeparation::Steps(0);
                calculated.push(idx);
            }
        }

        if calculated.is_empty() {
            return;
        }

        let mut head = 0;
        while head < calculated.len() {
            let room_idx = calculated[head];
            let separation = self.rooms[room_idx].hub_separation;
            let room_id = self.rooms[room_idx].id;
            let exits = self.rooms[room_idx].exits.clone();

            for hall_id in exits {
                let Some(hall) = hallways.get((hall_id - 1) as usize) else {
                    continue;
                };
                let Some(other_id) = hall.other_room(room_id) else {
                    continue;
                };
                let other_idx = (other_id - 1) as usize;
                if calculated.contains(&other_idx) {
                    continue;
                }

                self.rooms[other_idx].hub_separation = separation.successor();
                calculated.push(other_idx);
            }

            head += 1;
        }
    }

    /// Builds the fixed home-base room entirely at negative coordinates:
    /// an odd-sized square with two one-wide cross arms.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::RoomGenerator;
    ///
    /// assert!(RoomGenerator::create_hub(5).is_ok());
    /// assert!(RoomGenerator::create_hub(4).is_err());
    /// assert!(RoomGenerator::create_hub(-1).is_err());
    /// ```
    pub fn create_hub(room_size: i32) -> DelveResult<Room> {
        if room_size < 0 {
            return Err(DelveError::InvalidConfig(
                "hub room size must be positive".to_string(),
            ));
        }
        if room_size % 2 == 0 {
            return Err(DelveError::InvalidConfig(
                "hub room size must not be even".to_string(),
            ));
        }

        let anchor = -10 - room_size;
        Room::from_segments(
            HUB_ROOM_ID,
            vec![
                Rect::new(anchor, anchor, room_size, room_size),
                Rect::new(anchor - 1, anchor + room_size / 2, room_size + 2, 1),
                Rect::new(anchor + room_size / 2, anchor - 1, 1, room_size + 2),
            ],
        )
    }
}

fn segments_touch_col_border(s1: &Rect, s2: &Rect) -> bool {
    s1.min.x == s2.max().x || s1.max().x == s2.min.x
}

fn segments_touch_row_border(s1: &Rect, s2: &Rect) -> bool {
    s1.min.y == s2.max().y || s1.max().y == s2.min.y
}

fn overlapping_line_segments(s1_min: i32, s1_max: i32, s2_min: i32, s2_max: i32, overlap: i32) -> bool {
    s1_max.min(s2_max) - s1_min.max(s2_min) >= overlap
}

/// Whether two segments share a border with at least `overlap_threshold`
/// cells of contact along it.
fn neighbouring_segments(s1: &Rect, s2: &Rect, overlap_threshold: i32) -> bool {
    segments_touch_col_border(s1, s2)
        && overlapping_line_segments(
            s1.min.y,
            s1.max().y,
            s2.min.y,
            s2.max().y,
            overlap_threshold,
        )
        || segments_touch_row_border(s1, s2)
            && overlapping_line_segments(
                s1.min.x,
                s1.max().x,
                s2.min.x,
                s2.max().x,
                overlap_threshold,
            )
}

/// Stamps the room's cells onto the grid, classifying each perimeter cell
/// by walking the boundary: corners where the walk turns, forbidden exits
/// flanking concave corners and along the outer grid boundary, plain
/// perimeter elsewhere.
fn record_room_on_grid(grid: &mut GridLayer, room: &Room, config: &GenerationConfig) {
    for cell in room.interior() {
        grid[*cell] = ROOM_INTERIOR;
    }

    let perimeter = room.perimeter();
    if perimeter.is_empty() {
        return;
    }

    let last_row = config.rows - 1;
    let last_col = config.columns - 1;

    let mut prev = *perimeter.last().unwrap();
    let mut current = perimeter[0];

    for idx in 1..perimeter.len() {
        let next = perimeter[idx];
        let d_prev = current - prev;
        let d_next = next - current;

        if d_next.is_orthogonal_cardinal(d_prev) {
            grid[current] = ROOM_CORNER;

            // Concave turn: both flanking cells are unusable as exits.
            if d_next.is_ccw_rotation_of(d_prev) {
                grid[prev] = ROOM_FORBIDDEN_EXIT;
                grid[next] = ROOM_FORBIDDEN_EXIT;
            }
        } else if grid[current] == EMPTY_SPACE {
            if current.y == 0 || current.x == 0 || current.y == last_row || current.x == last_col {
                grid[current] = ROOM_FORBIDDEN_EXIT;
            } else {
                grid[current] = ROOM_PERIMETER;
            }
        }

        prev = current;
        current = next;
    }

    if grid[current] == EMPTY_SPACE {
        if current.y == 0 || current.x == 0 || current.y == last_row || current.x == last_col {
            grid[current] = ROOM_FORBIDDEN_EXIT;
        } else if perimeter[0] - current == current - prev {
            grid[current] = ROOM_PERIMETER;
        } else {
            grid[current] = ROOM_CORNER;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::grid::ROOM_EXIT;
    use crate::utils::math::GridPoint;

    fn place_on(segments: &[Rect], config: &GenerationConfig, seed: u64) -> (RoomGenerator, GridLayer) {
        let mut generator = RoomGenerator::new();
        let mut grid = GridLayer::new(config.rows, config.columns);
        let mut rng = RandomSource::from_seed(seed);
        generator
            .place_rooms(segments, &mut grid, config, &mut rng)
            .unwrap();
        (generator, grid)
    }

    #[test]
    fn test_rooms_are_disjoint() {
        let config = GenerationConfig::for_testing();
        let mut rng = RandomSource::from_seed(1234);
        let segmenter = crate::generation::GridSegmenter::segment(&config, &mut rng).unwrap();

        let mut generator = RoomGenerator::new();
        let mut grid = GridLayer::new(config.rows, config.columns);
        generator
            .place_rooms(segmenter.segments(), &mut grid, &config, &mut rng)
            .unwrap();

        let rooms = generator.rooms();
        assert!(!rooms.is_empty());

        for a in rooms {
            for b in rooms {
                if a.id == b.id {
                    continue;
                }
                for tile in a.tiles() {
                    assert!(!b.contains(tile), "rooms {} and {} share {}", a.id, b.id, tile);
                }
            }
        }
    }

    #[test]
    fn test_room_cells_are_stamped() {
        let config = GenerationConfig::new(12, 12, 1, 2);
        let segments = [Rect::new(2, 2, 5, 5)];
        let (generator, grid) = place_on(&segments, &config, 9);

        let room = &generator.rooms()[0];
        for cell in room.interior() {
            assert_eq!(grid[*cell], ROOM_INTERIOR);
        }
        for cell in room.perimeter() {
            assert!(
                matches!(
                    grid[*cell],
                    ROOM_PERIMETER | ROOM_CORNER | ROOM_FORBIDDEN_EXIT | ROOM_EXIT
                ),
                "unclassified perimeter cell {} = {}",
                cell,
                grid[*cell]
            );
        }
    }

    #[test]
    fn test_rect_room_has_four_corners() {
        let config = GenerationConfig::new(12, 12, 1, 2);
        let segments = [Rect::new(2, 2, 5, 4)];
        let (generator, grid) = place_on(&segments, &config, 3);

        let room = &generator.rooms()[0];
        let corners = room
            .perimeter()
            .iter()
            .filter(|cell| grid[**cell] == ROOM_CORNER)
            .count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn test_edge_perimeter_is_forbidden() {
        let config = GenerationConfig::new(10, 10, 1, 2);
        let segments = [Rect::new(0, 0, 5, 5)];
        let (_generator, grid) = place_on(&segments, &config, 3);

        // Cells on the outer grid boundary can never host an exit.
        assert_eq!(grid[GridPoint::new(0, 2)], ROOM_FORBIDDEN_EXIT);
        assert_eq!(grid[GridPoint::new(2, 0)], ROOM_FORBIDDEN_EXIT);
    }

    #[test]
    fn test_oversized_segment_is_skipped() {
        let mut config = GenerationConfig::new(30, 30, 1, 2);
        config.max_room_area = 20;
        let segments = [Rect::new(0, 0, 10, 10), Rect::new(10, 0, 4, 4)];
        let (generator, _grid) = place_on(&segments, &config, 3);

        assert_eq!(generator.rooms().len(), 1);
        assert_eq!(generator.rooms()[0].segments()[0], Rect::new(10, 0, 4, 4));
    }

    #[test]
    fn test_create_hub_rejects_bad_sizes() {
        assert!(matches!(
            RoomGenerator::create_hub(4),
            Err(DelveError::InvalidConfig(_))
        ));
        assert!(matches!(
            RoomGenerator::create_hub(-1),
            Err(DelveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_create_hub_geometry() {
        let hub = RoomGenerator::create_hub(5).unwrap();

        assert_eq!(hub.id, HUB_ROOM_ID);
        assert_eq!(hub.segments().len(), 3);
        // Entirely in negative space, clear of the playfield.
        assert!(hub.bounding_box.max().x < 0);
        assert!(hub.bounding_box.max().y < 0);
        // 5x5 square plus two 1-wide arms of length 7; each arm adds two
        // cells beyond the square.
        assert_eq!(hub.size(), 25 + 2 + 2);

        // Anchor slots sit on the bounding-box edges around the center.
        for anchor in hub.anchor_points() {
            assert!(hub.bounding_box.contains(anchor));
            assert_ne!(anchor, hub.center);
        }
    }

    #[test]
    fn test_hub_separation_prefers_busy_rooms() {
        let mut generator = RoomGenerator::new();
        let mut grid = GridLayer::new(40, 40);
        let mut rng = RandomSource::from_seed(5);
        let config = GenerationConfig::new(40, 40, 4, 5);
        let segments = [
            Rect::new(0, 0, 6, 6),
            Rect::new(8, 0, 6, 6),
            Rect::new(16, 0, 6, 6),
            Rect::new(8, 8, 6, 6),
            Rect::new(8, 16, 6, 6),
        ];
        generator
            .place_rooms(&segments, &mut grid, &config, &mut rng)
            .unwrap();
        let n = generator.rooms().len();
        assert!(n >= 4, "expected at least 4 rooms, got {}", n);

        // Star topology: room 2 connects to 1, 3 and 4.
        let mut hallways = Vec::new();
        for (idx, (a, b)) in [(2, 1), (2, 3), (2, 4)].into_iter().enumerate() {
            let hall_id = (idx + 1) as i32;
            let mut hall = Hallway::new(
                hall_id,
                a,
                GridPoint::ZERO,
                GridPoint::ZERO,
                b,
                GridPoint::ZERO,
                GridPoint::ZERO,
            );
            hall.valid = true;
            hallways.push(hall);
            generator.rooms_mut()[(a - 1) as usize].exits.push(hall_id);
            generator.rooms_mut()[(b - 1) as usize].exits.push(hall_id);
        }

        generator.calculate_hub_separations(&hallways);

        let rooms = generator.rooms();
        assert_eq!(rooms[1].hub_separation, HubSeparation::Steps(0));
        assert_eq!(rooms[0].hub_separation, HubSeparation::Steps(1));
        assert_eq!(rooms[2].hub_separation, HubSeparation::Steps(1));
        assert_eq!(rooms[3].hub_separation, HubSeparation::Steps(1));
        // Rooms with no hallway at all stay unreachable.
        if n > 4 {
            assert_eq!(rooms[4].hub_separation, HubSeparation::Unreachable);
        }
    }

    #[test]
    fn test_no_hub_leaves_everything_unreachable() {
        let mut generator = RoomGenerator::new();
        let mut grid = GridLayer::new(20, 20);
        let mut rng = RandomSource::from_seed(5);
        let config = GenerationConfig::new(20, 20, 2, 3);
        let segments = [Rect::new(0, 0, 6, 6), Rect::new(8, 0, 6, 6)];
        generator
            .place_rooms(&segments, &mut grid, &config, &mut rng)
            .unwrap();

        generator.calculate_hub_separations(&[]);
        for room in generator.rooms() {
            assert_eq!(room.hub_separation, HubSeparation::Unreachable);
        }
    }
}
