//! Geometry primitives shared by the input pipeline
//!
//! Coordinates are in device pixels unless a type says otherwise.

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Vector from `origin` to this point
    pub fn delta_from(&self, origin: Point) -> Vec2 {
        Vec2::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn offset(&self, v: Vec2) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// The shorter of the two sides
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle centered on `center` extending `half_width`/`half_height` each way
    pub fn from_center(center: Point, half_width: f32, half_height: f32) -> Self {
        Self::new(
            center.x - half_width,
            center.y - half_height,
            half_width * 2.0,
            half_height * 2.0,
        )
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width * 0.5,
            self.origin.y + self.size.height * 0.5,
        )
    }

    /// Edges are inclusive on the top-left and exclusive on the bottom-right
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x < self.right()
            && point.y >= self.origin.y
            && point.y < self.bottom()
    }
}

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Project onto the circle of `radius` if longer, keeping the angle
    pub fn clamp_length(&self, radius: f32) -> Self {
        if self.length() <= radius {
            return *self;
        }
        let angle = self.y.atan2(self.x);
        Self::new(angle.cos() * radius, angle.sin() * radius)
    }
}

/// Round a fractional pixel delta away from zero so any movement registers.
pub fn round_away_from_zero(value: f32) -> i32 {
    if value <= 0.0 {
        value.floor() as i32
    } else {
        value.ceil() as i32
    }
}

/// Snap `value` to the nearest multiple of `step`.
pub fn round_to(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Sign as `-1.0`, `0.0` or `1.0`.
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::from_center(Point::new(100.0, 100.0), 10.0, 20.0);
        assert!(rect.contains(Point::new(100.0, 100.0)));
        assert!(rect.contains(Point::new(90.0, 80.0)));
        assert!(!rect.contains(Point::new(110.0, 100.0)));
        assert!(!rect.contains(Point::new(100.0, 121.0)));
        assert_eq!(rect.center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_clamp_length_preserves_angle() {
        let v = Vec2::new(30.0, 40.0).clamp_length(10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.x - 6.0).abs() < 1e-4);
        assert!((v.y - 8.0).abs() < 1e-4);

        let short = Vec2::new(3.0, 4.0);
        assert_eq!(short.clamp_length(10.0), short);
    }

    #[test]
    fn test_round_away_from_zero() {
        assert_eq!(round_away_from_zero(0.2), 1);
        assert_eq!(round_away_from_zero(-0.2), -1);
        assert_eq!(round_away_from_zero(0.0), 0);
        assert_eq!(round_away_from_zero(2.0), 2);
        assert_eq!(round_away_from_zero(-2.5), -3);
    }

    #[test]
    fn test_round_to_grid() {
        assert_eq!(round_to(37.0, 10.0), 40.0);
        assert_eq!(round_to(34.0, 10.0), 30.0);
        assert_eq!(round_to(34.0, 0.0), 34.0);
    }
}
