//! # Rooms
//!
//! A [`Room`] is a merged group of segments with its geometry fully
//! classified at construction time: bounding box, integer centroid, the
//! closed perimeter walk and the enclosed interior cells. Geometry is
//! immutable afterwards; only the incident-exit list and the hub
//! separation change as later generation stages run.

use crate::dungeon::hallway::{Hallway, HallwayId};
use crate::utils::math::{GridPoint, Rect};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Identifies a room. Positive ids are regular dungeon rooms; the hub room
/// outside the playfield uses [`HUB_ROOM_ID`].
pub type RoomId = i32;

/// Reserved id of the hub room.
pub const HUB_ROOM_ID: RoomId = -1;

/// Upper bound on perimeter-walk steps before the walk is declared corrupt.
const MAX_PERIMETER_STEPS: usize = 10_000;

/// Graph distance (in rooms) from the nearest room with more than two
/// exits. `Unreachable` replaces the magic numeric sentinel: it orders
/// above every finite separation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum HubSeparation {
    /// The room is this many hallway hops away from a hub-like room.
    Steps(u32),
    /// No hub-like room can reach this room.
    Unreachable,
}

impl HubSeparation {
    /// Whether this room itself counts as hub-like.
    pub fn is_hub(self) -> bool {
        self == HubSeparation::Steps(0)
    }

    /// One step further out; `Unreachable` stays `Unreachable`.
    pub fn successor(self) -> HubSeparation {
        match self {
            HubSeparation::Steps(n) => HubSeparation::Steps(n + 1),
            HubSeparation::Unreachable => HubSeparation::Unreachable,
        }
    }

    /// One step closer in, saturating at zero; `Unreachable` stays put.
    pub fn saturating_pred(self) -> HubSeparation {
        match self {
            HubSeparation::Steps(n) => HubSeparation::Steps(n.saturating_sub(1)),
            HubSeparation::Unreachable => HubSeparation::Unreachable,
        }
    }
}

impl Default for HubSeparation {
    fn default() -> Self {
        HubSeparation::Unreachable
    }
}

/// A merged group of segments forming one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier; doubles as the owner tag in door and key records.
    pub id: RoomId,
    /// The constituent segments the room was merged from.
    segments: Vec<Rect>,
    /// Bounding box over all segments, max exclusive.
    pub bounding_box: Rect,
    /// The four bounding corners, max sides inclusive.
    pub bounding_corners: [GridPoint; 4],
    /// Integer centroid over all segment cells.
    pub center: GridPoint,
    /// The closed boundary walk, in walk order.
    perimeter: Vec<GridPoint>,
    /// Cells strictly enclosed by the perimeter.
    interior: Vec<GridPoint>,
    /// Ids of hallways that open into this room.
    pub exits: Vec<HallwayId>,
    /// Distance from the most connected room; see [`HubSeparation`].
    pub hub_separation: HubSeparation,
}

impl Room {
    /// Builds a room from its segments, tracing the perimeter and
    /// classifying the interior.
    ///
    /// Fails with [`DelveError::GenerationFailed`] when no segment cell
    /// touches the bounding box (the room has no walkable boundary), and
    /// with [`DelveError::CorruptGrid`] when the boundary walk does not
    /// close within the step cap.
    pub fn from_segments(id: RoomId, segments: Vec<Rect>) -> DelveResult<Room> {
        let bounding_box = Self::bounding_box_of(&segments);
        let max = bounding_box.max();
        let bounding_corners = [
            bounding_box.min,
            GridPoint::new(max.x - 1, bounding_box.min.y),
            GridPoint::new(max.x - 1, max.y - 1),
            GridPoint::new(bounding_box.min.x, max.y - 1),
        ];

        let perimeter = Self::trace_perimeter(id, &segments, &bounding_box)?;

        // Segments from the partitioner never overlap, but the hub room's
        // cross arms do; keep each cell once.
        let mut interior = Vec::new();
        for segment in &segments {
            for cell in segment.cells() {
                if !perimeter.contains(&cell) && !interior.contains(&cell) {
                    interior.push(cell);
                }
            }
        }

        let center = Self::centroid(&segments);

        Ok(Room {
            id,
            segments,
            bounding_box,
            bounding_corners,
            center,
            perimeter,
            interior,
            exits: Vec::new(),
            hub_separation: HubSeparation::Unreachable,
        })
    }

    fn bounding_box_of(segments: &[Rect]) -> Rect {
        let Some(first) = segments.first() else {
            return Rect::new(0, 0, 0, 0);
        };

        let mut min = first.min;
        let mut max = first.max();
        for segment in &segments[1..] {
            min.x = min.x.min(segment.min.x);
            min.y = min.y.min(segment.min.y);
            max.x = max.x.max(segment.max().x);
            max.y = max.y.max(segment.max().y);
        }

        Rect::from_min_max(min, max)
    }

    fn centroid(segments: &[Rect]) -> GridPoint {
        let mut sum = GridPoint::ZERO;
        let mut count = 0;
        for segment in segments {
            for cell in segment.cells() {
                sum = sum + cell;
                count += 1;
            }
        }

        if count == 0 {
            return GridPoint::ZERO;
        }
        GridPoint::new(sum.x / count, sum.y / count)
    }

    fn contains_by_segments(segments: &[Rect], point: GridPoint) -> bool {
        segments.iter().any(|segment| segment.contains(point))
    }

    /// Wall-following boundary walk: prefer turning into the room, else
    /// continue straight, else turn outward, until the start cell comes
    /// around again.
    fn trace_perimeter(
        id: RoomId,
        segments: &[Rect],
        bounding_box: &Rect,
    ) -> DelveResult<Vec<GridPoint>> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        let mut direction = GridPoint::UP;
        let mut point = bounding_box.min;
        let bb_max = bounding_box.max();

        let mut start = None;
        while point.y < bb_max.y {
            if Self::contains_by_segments(segments, point) {
                start = Some(point);
                break;
            }
            point = point + direction;
        }

        let Some(start) = start else {
            return Err(DelveError::GenerationFailed(format!(
                "no cell of room {} touches its bounding box {}",
                id, bounding_box
            )));
        };

        let mut perimeter: Vec<GridPoint> = Vec::new();
        let mut ortho = direction.rotate_cw();

        for _ in 0..MAX_PERIMETER_STEPS {
            // Each distinct cell is recorded once, even where a one-wide
            // arm makes the walk pass a cell twice.
            if !perimeter.contains(&point) {
                perimeter.push(point);
            }

            let ortho_candidate = point + ortho;
            if Self::contains_by_segments(segments, ortho_candidate) {
                direction = ortho;
                ortho = direction.rotate_cw();
                point = ortho_candidate;
            } else {
                let para_candidate = point + direction;
                if Self::contains_by_segments(segments, para_candidate) {
                    point = para_candidate;
                } else {
                    ortho = direction;
                    direction = direction.rotate_ccw();
                }
            }

            if point == start {
                return Ok(perimeter);
            }
        }

        Err(DelveError::CorruptGrid(format!(
            "perimeter walk of room {} did not close within {} steps",
            id, MAX_PERIMETER_STEPS
        )))
    }

    /// The boundary cells in walk order.
    pub fn perimeter(&self) -> &[GridPoint] {
        &self.perimeter
    }

    /// The strictly enclosed cells.
    pub fn interior(&self) -> &[GridPoint] {
        &self.interior
    }

    /// The segments this room was merged from.
    pub fn segments(&self) -> &[Rect] {
        &self.segments
    }

    /// Interior cells followed by perimeter cells.
    pub fn tiles(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.interior.iter().chain(self.perimeter.iter()).copied()
    }

    /// Total cell count.
    pub fn size(&self) -> usize {
        self.perimeter.len() + self.interior.len()
    }

    /// Whether the point belongs to this room.
    pub fn contains(&self, point: GridPoint) -> bool {
        self.perimeter.contains(&point) || self.interior.contains(&point)
    }

    /// Manhattan distance between the two rooms' centers.
    pub fn center_distance(&self, other: &Room) -> i32 {
        self.center.manhattan_distance(other.center)
    }

    /// The pair of bounding corners (ours, theirs) closest to each other
    /// by Manhattan distance.
    pub fn closest_bounding_corner(&self, other: &Room) -> (GridPoint, GridPoint) {
        let mut best = (self.bounding_corners[0], other.bounding_corners[0]);
        let mut closest = i32::MAX;

        for mine in self.bounding_corners {
            for theirs in other.bounding_corners {
                let distance = mine.manhattan_distance(theirs);
                if distance < closest {
                    closest = distance;
                    best = (mine, theirs);
                }
            }
        }

        best
    }

    /// Outward direction at a perimeter cell: the first cardinal whose
    /// neighbour is outside the room. `None` for cells that are fully
    /// surrounded (not actually on the boundary).
    pub fn exit_direction(&self, perimeter_point: GridPoint) -> Option<GridPoint> {
        GridPoint::CARDINALS
            .into_iter()
            .find(|direction| !self.contains(perimeter_point + *direction))
    }

    /// Whether the room has fewer than two hallways leading to another
    /// room, i.e. locking it away cannot cut a through-route.
    pub fn is_terminus(&self, hallways: &[Hallway]) -> bool {
        self.exits
            .iter()
            .filter_map(|&id| hallways.get((id - 1) as usize))
            .filter(|hall| hall.other_room(self.id).is_some())
            .count()
            < 2
    }

    /// Vectors from `position` to each hallway exit of this room.
    pub fn directions_to_exits<'a>(
        &'a self,
        position: GridPoint,
        hallways: &'a [Hallway],
    ) -> impl Iterator<Item = GridPoint> + 'a {
        self.exits
            .iter()
            .filter_map(|&id| hallways.get((id - 1) as usize))
            .filter_map(move |hall| hall.room_exit(self.id).map(|exit| exit - position))
    }

    /// The four bounding-box edge midpoints, anchor slots for fixtures in
    /// the hub room; the room center is the matching focal point.
    pub fn anchor_points(&self) -> [GridPoint; 4] {
        let bbox = &self.bounding_box;
        let max = bbox.max();
        [
            GridPoint::new(bbox.min.x, self.center.y),
            GridPoint::new(max.x - 1, self.center.y),
            GridPoint::new(self.center.x, bbox.min.y),
            GridPoint::new(self.center.x, max.y - 1),
        ]
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Room {} {} ({} segments; {} center; {} perimeter; {} interior)>",
            self.id,
            self.bounding_box,
            self.segments.len(),
            self.center,
            self.perimeter.len(),
            self.interior.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_room_geometry() {
        let room = Room::from_segments(1, vec![Rect::new(0, 0, 4, 4)]).unwrap();

        // 4x4 square: 12 boundary cells, 4 enclosed.
        assert_eq!(room.perimeter().len(), 12);
        assert_eq!(room.interior().len(), 4);
        assert_eq!(room.size(), 16);
        assert_eq!(room.center, GridPoint::new(1, 1));
        assert_eq!(room.bounding_box, Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn test_perimeter_walk_closes_on_l_shape() {
        let room = Room::from_segments(
            2,
            vec![Rect::new(0, 0, 4, 4), Rect::new(4, 0, 3, 2)],
        )
        .unwrap();

        let perimeter = room.perimeter();
        assert!(!perimeter.is_empty());

        // Consecutive walk cells are cardinal neighbours, and the walk
        // closes back onto its start.
        for pair in perimeter.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
        let first = perimeter[0];
        let last = *perimeter.last().unwrap();
        assert_eq!(first.manhattan_distance(last), 1);

        // No cell is both perimeter and interior.
        for cell in room.interior() {
            assert!(!perimeter.contains(cell));
        }
    }

    #[test]
    fn test_interior_cells_are_enclosed() {
        let room = Room::from_segments(3, vec![Rect::new(2, 2, 5, 5)]).unwrap();

        for cell in room.interior() {
            for neighbour in cell.cardinal_neighbours() {
                assert!(room.contains(neighbour));
            }
        }
    }

    #[test]
    fn test_exit_direction_points_outward() {
        let room = Room::from_segments(4, vec![Rect::new(0, 0, 3, 3)]).unwrap();

        let direction = room.exit_direction(GridPoint::new(0, 1)).unwrap();
        assert!(!room.contains(GridPoint::new(0, 1) + direction));
    }

    #[test]
    fn test_closest_bounding_corner() {
        let a = Room::from_segments(1, vec![Rect::new(0, 0, 3, 3)]).unwrap();
        let b = Room::from_segments(2, vec![Rect::new(10, 0, 3, 3)]).unwrap();

        let (mine, theirs) = a.closest_bounding_corner(&b);
        assert_eq!(mine.x, 2);
        assert_eq!(theirs.x, 10);
    }

    #[test]
    fn test_hub_separation_ordering() {
        assert!(HubSeparation::Steps(3) < HubSeparation::Unreachable);
        assert!(HubSeparation::Steps(1) < HubSeparation::Steps(2));
        assert_eq!(
            HubSeparation::Steps(2).successor(),
            HubSeparation::Steps(3)
        );
        assert_eq!(
            HubSeparation::Unreachable.successor(),
            HubSeparation::Unreachable
        );
    }
}
