use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer 2D coordinate.
///
/// Used both for world positions and for chunk coordinates. Ordering is by
/// `x` then `y`, which is the order chunk-indexed collections are written in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing the world position `pos` for chunks of side
    /// `chunk_size`. Rounds toward negative infinity, so `(-1, -1)` lies in
    /// chunk `(-1, -1)` rather than `(0, 0)`. `None` unless `chunk_size > 0`.
    pub fn chunk_of(pos: Point, chunk_size: i32) -> Option<Self> {
        if chunk_size <= 0 {
            return None;
        }
        Some(
            IVec2::from(pos)
                .div_euclid(IVec2::splat(chunk_size))
                .into(),
        )
    }

    /// Offset by `(dx, dy)`, wrapping on overflow.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        (IVec2::from(self).wrapping_add(IVec2::new(dx, dy))).into()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<IVec2> for Point {
    fn from(v: IVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for IVec2 {
    fn from(p: Point) -> Self {
        IVec2::new(p.x, p.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_x_then_y() {
        let mut points = vec![Point::new(1, 0), Point::new(0, 5), Point::new(0, -2)];
        points.sort();
        assert_eq!(
            points,
            vec![Point::new(0, -2), Point::new(0, 5), Point::new(1, 0)]
        );
    }

    #[test]
    fn chunk_of_floors_negative_positions() {
        assert_eq!(Point::chunk_of(Point::new(0, 0), 16), Some(Point::new(0, 0)));
        assert_eq!(Point::chunk_of(Point::new(15, 16), 16), Some(Point::new(0, 1)));
        assert_eq!(Point::chunk_of(Point::new(-1, -16), 16), Some(Point::new(-1, -1)));
        assert_eq!(Point::chunk_of(Point::new(-17, 3), 16), Some(Point::new(-2, 0)));
    }

    #[test]
    fn chunk_of_rejects_non_positive_size() {
        assert_eq!(Point::chunk_of(Point::new(5, 5), 0), None);
        assert_eq!(Point::chunk_of(Point::new(5, 5), -8), None);
    }

    #[test]
    fn ivec2_conversion_roundtrip() {
        let p = Point::new(-7, 42);
        let v: IVec2 = p.into();
        assert_eq!(v, IVec2::new(-7, 42));
        assert_eq!(Point::from(v), p);
    }

    #[test]
    fn display_is_a_pair() {
        assert_eq!(Point::new(-3, 8).to_string(), "(-3, 8)");
    }

    #[test]
    fn offset_moves_point() {
        assert_eq!(Point::new(2, 3).offset(-5, 1), Point::new(-3, 4));
        assert_eq!(Point::new(i32::MAX, 0).offset(1, 0), Point::new(i32::MIN, 0));
    }
}
