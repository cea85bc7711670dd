//! View-to-guest coordinate mapping
//!
//! The guest screen is letterboxed inside the view at a uniform scale. Touch
//! coordinates arrive in view space and are mapped into guest pixels before
//! they reach the display server.

use crate::geometry::{Point, Size, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    offset: Point,
    inv_scale: f32,
    guest: Size,
}

impl ViewTransform {
    /// One view pixel per guest pixel
    pub fn identity(guest: Size) -> Self {
        Self {
            offset: Point::ZERO,
            inv_scale: 1.0,
            guest,
        }
    }

    /// Aspect-fit `guest` inside `view`, centered.
    ///
    /// When `fullscreen` the guest image is anchored at the view origin, so
    /// only the scale applies.
    pub fn fit(view: Size, guest: Size, fullscreen: bool) -> Self {
        if view.is_empty() || guest.is_empty() {
            return Self::identity(guest);
        }
        let aspect = (view.width / guest.width).min(view.height / guest.height);
        let offset = if fullscreen {
            Point::ZERO
        } else {
            Point::new(
                ((view.width - guest.width * aspect) * 0.5).trunc(),
                ((view.height - guest.height * aspect) * 0.5).trunc(),
            )
        };
        Self {
            offset,
            inv_scale: 1.0 / aspect,
            guest,
        }
    }

    /// Map a view point into guest coordinates
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset.x) * self.inv_scale,
            (point.y - self.offset.y) * self.inv_scale,
        )
    }

    /// Map a view point into whole guest pixels, truncating
    pub fn apply_int(&self, point: Point) -> (i32, i32) {
        let p = self.apply(point);
        (p.x as i32, p.y as i32)
    }

    /// Map a view-space displacement; translation does not apply
    pub fn apply_delta(&self, delta: Vec2) -> Vec2 {
        delta.scale(self.inv_scale)
    }

    pub fn guest_size(&self) -> Size {
        self.guest
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity(Size::new(1280.0, 720.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_fit() {
        // 2000x1000 view showing a 1000x1000 guest: scale 1, 500px bars left and right
        let xf = ViewTransform::fit(
            Size::new(2000.0, 1000.0),
            Size::new(1000.0, 1000.0),
            false,
        );
        assert_eq!(xf.apply(Point::new(500.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(xf.apply(Point::new(1000.0, 500.0)), Point::new(500.0, 500.0));
    }

    #[test]
    fn test_scaled_fit() {
        // 1920x1080 view showing 960x540: half scale
        let xf = ViewTransform::fit(Size::new(1920.0, 1080.0), Size::new(960.0, 540.0), false);
        assert_eq!(xf.apply(Point::new(1920.0, 1080.0)), Point::new(960.0, 540.0));
        assert_eq!(xf.apply_delta(Vec2::new(10.0, -4.0)), Vec2::new(5.0, -2.0));
        assert_eq!(xf.apply_int(Point::new(3.0, 3.0)), (1, 1));
    }

    #[test]
    fn test_degenerate_sizes_fall_back_to_identity() {
        let xf = ViewTransform::fit(Size::ZERO, Size::new(800.0, 600.0), false);
        assert_eq!(xf.apply(Point::new(12.0, 34.0)), Point::new(12.0, 34.0));
    }
}
