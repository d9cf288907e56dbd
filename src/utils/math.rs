//! # Grid Mathematics
//!
//! Integer-grid geometry primitives used by every generation stage:
//! [`GridPoint`] for cell coordinates and cardinal directions, and [`Rect`]
//! for axis-aligned integer rectangles (segments, bounding boxes).

use serde::{Deserialize, Serialize};

/// A point or direction vector on the integer grid.
///
/// `x` indexes columns and `y` indexes rows. Unit vectors double as
/// cardinal directions; rotation helpers operate on that convention.
///
/// # Examples
///
/// ```
/// use delve::GridPoint;
///
/// let p = GridPoint::new(3, 4);
/// assert_eq!(p.manhattan_distance(GridPoint::ZERO), 7);
/// assert_eq!(GridPoint::UP.rotate_cw(), GridPoint::LEFT);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const ZERO: GridPoint = GridPoint { x: 0, y: 0 };
    pub const LEFT: GridPoint = GridPoint { x: -1, y: 0 };
    pub const RIGHT: GridPoint = GridPoint { x: 1, y: 0 };
    pub const UP: GridPoint = GridPoint { x: 0, y: 1 };
    pub const DOWN: GridPoint = GridPoint { x: 0, y: -1 };

    /// The four cardinal directions in the order used for neighbour scans.
    pub const CARDINALS: [GridPoint; 4] = [
        GridPoint::LEFT,
        GridPoint::UP,
        GridPoint::RIGHT,
        GridPoint::DOWN,
    ];

    /// Creates a new point with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another point.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GridPoint;
    ///
    /// let a = GridPoint::new(0, 0);
    /// let b = GridPoint::new(3, 4);
    /// assert_eq!(a.manhattan_distance(b), 7);
    /// ```
    pub fn manhattan_distance(self, other: GridPoint) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Calculates the Chebyshev (chessboard) distance to another point.
    pub fn chebyshev_distance(self, other: GridPoint) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The smaller of the two absolute components.
    pub fn smallest_dimension(self) -> i32 {
        self.x.abs().min(self.y.abs())
    }

    /// Componentwise product with another vector.
    pub fn component_mul(self, other: GridPoint) -> GridPoint {
        GridPoint::new(self.x * other.x, self.y * other.y)
    }

    /// Rotates a direction a quarter turn clockwise.
    pub fn rotate_cw(self) -> GridPoint {
        GridPoint::new(-self.y, self.x)
    }

    /// Rotates a direction a quarter turn counter-clockwise.
    pub fn rotate_ccw(self) -> GridPoint {
        GridPoint::new(self.y, -self.x)
    }

    /// Whether this is a cardinal unit vector.
    pub fn is_unit(self) -> bool {
        self.x.abs() + self.y.abs() == 1
    }

    /// Whether two cardinal directions are perpendicular.
    pub fn is_orthogonal_cardinal(self, other: GridPoint) -> bool {
        self.x == 0 && other.y == 0 || self.y == 0 && other.x == 0
    }

    /// Whether `other` points exactly the opposite way.
    pub fn is_inverse_of(self, other: GridPoint) -> bool {
        self.x == -other.x && self.y == -other.y
    }

    /// Whether rotating this direction clockwise yields `other`.
    pub fn is_cw_rotation_of(self, other: GridPoint) -> bool {
        self.rotate_cw() == other
    }

    /// Whether rotating this direction counter-clockwise yields `other`.
    pub fn is_ccw_rotation_of(self, other: GridPoint) -> bool {
        self.rotate_ccw() == other
    }

    /// Collapses a vector to a unit vector along its dominant axis.
    ///
    /// Ties go to the y axis, matching the behaviour hallway digging
    /// depends on when exits are diagonal from each other.
    pub fn main_direction(self) -> GridPoint {
        if self.x.abs() > self.y.abs() {
            GridPoint::new(self.x.signum(), 0)
        } else {
            GridPoint::new(0, self.y.signum())
        }
    }

    /// Dominant-axis unit direction from `self` towards `destination`.
    pub fn main_direction_to(self, destination: GridPoint) -> GridPoint {
        (destination - self).main_direction()
    }

    /// The corner point where an axis-aligned path from `self` meets an
    /// axis-aligned path from `target`, preferring the corner that is not
    /// straight ahead along `direction`.
    pub fn ortho_intersection(self, target: GridPoint, direction: GridPoint) -> GridPoint {
        let candidate = GridPoint::new(self.x, target.y);
        let diff = candidate - self;
        if diff.x * direction.x + diff.y * direction.y == 0 {
            return candidate;
        }
        GridPoint::new(target.x, self.y)
    }

    /// The four cardinal neighbours of this point.
    pub fn cardinal_neighbours(self) -> [GridPoint; 4] {
        [
            self + GridPoint::LEFT,
            self + GridPoint::UP,
            self + GridPoint::RIGHT,
            self + GridPoint::DOWN,
        ]
    }
}

impl std::ops::Add for GridPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for GridPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<i32> for GridPoint {
    type Output = Self;

    fn mul(self, scalar: i32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned integer rectangle with inclusive min and exclusive max.
///
/// Segments produced by the space partitioner and room bounding boxes are
/// both `Rect`s. A rect may sit at negative coordinates (the hub room does).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min: GridPoint,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a rect from its min corner and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min: GridPoint::new(x, y),
            width,
            height,
        }
    }

    /// Creates a rect spanning `min` (inclusive) to `max` (exclusive).
    pub fn from_min_max(min: GridPoint, max: GridPoint) -> Self {
        Self {
            min,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    /// Exclusive max corner.
    pub fn max(&self) -> GridPoint {
        GridPoint::new(self.min.x + self.width, self.min.y + self.height)
    }

    /// Number of cells covered.
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Whether the point lies inside (max-exclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GridPoint, Rect};
    ///
    /// let r = Rect::new(0, 0, 4, 3);
    /// assert!(r.contains(GridPoint::new(3, 2)));
    /// assert!(!r.contains(GridPoint::new(4, 2)));
    /// ```
    pub fn contains(&self, point: GridPoint) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.x < self.min.x + self.width
            && point.y < self.min.y + self.height
    }

    /// Iterates all covered cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPoint> + '_ {
        let min = self.min;
        let max = self.max();
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| GridPoint::new(x, y)))
    }

    /// Whether this rect and `other` would merge into one larger rectangle,
    /// i.e. they share a full edge and equal extent along it.
    pub fn unites_to_rect(&self, other: &Rect) -> bool {
        let (smin, smax) = (self.min, self.max());
        let (omin, omax) = (other.min, other.max());

        smin.x == omin.x && smax.x == omax.x && (smin.y == omax.y || smax.y == omin.y)
            || smin.y == omin.y && smax.y == omax.y && (smin.x == omax.x || smax.x == omin.x)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}x{}]", self.min, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_are_inverse() {
        for direction in GridPoint::CARDINALS {
            assert_eq!(direction.rotate_cw().rotate_ccw(), direction);
            assert_eq!(direction.rotate_cw().rotate_cw(), direction * -1);
        }
    }

    #[test]
    fn test_rotation_predicates() {
        assert!(GridPoint::UP.is_cw_rotation_of(GridPoint::LEFT));
        assert!(GridPoint::UP.is_ccw_rotation_of(GridPoint::RIGHT));
        assert!(GridPoint::UP.is_inverse_of(GridPoint::DOWN));
        assert!(GridPoint::UP.is_orthogonal_cardinal(GridPoint::LEFT));
        assert!(!GridPoint::UP.is_orthogonal_cardinal(GridPoint::DOWN));
    }

    #[test]
    fn test_main_direction() {
        assert_eq!(GridPoint::new(5, 2).main_direction(), GridPoint::RIGHT);
        assert_eq!(GridPoint::new(-1, 3).main_direction(), GridPoint::UP);
        // Ties collapse onto the y axis.
        assert_eq!(GridPoint::new(2, -2).main_direction(), GridPoint::DOWN);
    }

    #[test]
    fn test_ortho_intersection() {
        let source = GridPoint::new(2, 2);
        let target = GridPoint::new(6, 5);

        // Moving along x, the corner must not lie straight ahead.
        let corner = source.ortho_intersection(target, GridPoint::RIGHT);
        assert_eq!(corner, GridPoint::new(2, 5));

        let corner = source.ortho_intersection(target, GridPoint::UP);
        assert_eq!(corner, GridPoint::new(6, 2));
    }

    #[test]
    fn test_rect_cells_cover_area() {
        let rect = Rect::new(1, 2, 3, 2);
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(cells.len() as i32, rect.area());
        assert_eq!(cells[0], GridPoint::new(1, 2));
        assert_eq!(*cells.last().unwrap(), GridPoint::new(3, 3));
        assert!(cells.iter().all(|c| rect.contains(*c)));
    }

    #[test]
    fn test_unites_to_rect() {
        let left = Rect::new(0, 0, 2, 4);
        let right = Rect::new(2, 0, 3, 4);
        let offset = Rect::new(2, 1, 3, 4);

        assert!(left.unites_to_rect(&right));
        assert!(right.unites_to_rect(&left));
        assert!(!left.unites_to_rect(&offset));
    }
}
