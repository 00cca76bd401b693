/// World-space position or delta in pixels. `y` grows downward, matching
/// the map's pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        Self::new(self.x - other.x, self.y - other.y).length()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Axis-aligned integer rectangle with an exclusive max corner.
///
/// Entity boxes truncate their float position toward zero before adding the
/// size, so an entity at `(10.7, 3.2)` with a 16 px box covers `10..26 × 3..19`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_position_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Box of a `size`×`size` sprite whose top-left corner sits at `position`.
    pub fn square_at(position: Vec2, size: i32) -> Self {
        let x = position.x as i32;
        let y = position.y as i32;
        Self::from_position_size(x, y, size, size)
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Strict overlap: rectangles that only share an edge do not overlap, and
    /// empty rectangles never overlap anything.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Half-open containment test for a point in the same pixel space.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min_x as f32
            && point.x < self.max_x as f32
            && point.y >= self.min_y as f32
            && point.y < self.max_y as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_at_truncates_position() {
        let rect = Rect::square_at(Vec2::new(10.7, 3.2), 16);
        assert_eq!(rect, Rect::new(10, 3, 26, 19));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 32, 16);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&Rect::new(15, 15, 20, 20)));
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let empty = Rect::new(5, 5, 5, 10);
        assert!(!empty.overlaps(&Rect::new(0, 0, 100, 100)));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0, 0, 16, 16);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(15.9, 15.9)));
        assert!(!rect.contains_point(Vec2::new(16.0, 8.0)));
    }

    #[test]
    fn distance_is_euclidean() {
        let d = Vec2::new(0.0, 0.0).distance(Vec2::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }
}
