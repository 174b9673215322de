//! # Screen Geometry
//!
//! Integer screen points and the per-process display geometry.

use std::ops::{Add, Sub};

use crate::config::ScreenConfig;

/// A point in screen coordinates (origin top-left, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Host display geometry, computed once at startup.
///
/// `center` is the anchor the left stick moves around; it sits
/// `center_offset_y` pixels above the true middle of the screen.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::geometry::{Point, ScreenGeometry};
///
/// let geometry = ScreenGeometry::new(1920, 1080, 30);
/// assert_eq!(geometry.center(), Point::new(960, 510));
/// assert_eq!(geometry.midpoint(), Point::new(960, 540));
/// assert!((geometry.aspect_ratio() - 1.777).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenGeometry {
    width: i32,
    height: i32,
    center: Point,
    aspect_ratio: f32,
}

impl ScreenGeometry {
    /// Creates the geometry for a `width` x `height` display.
    ///
    /// `height` must be non-zero; the configuration layer guarantees it.
    #[must_use]
    pub fn new(width: i32, height: i32, center_offset_y: i32) -> Self {
        Self {
            width,
            height,
            center: Point::new(width / 2, height / 2 - center_offset_y),
            aspect_ratio: width as f32 / height as f32,
        }
    }

    /// Builds the geometry from the `[screen]` configuration section.
    #[must_use]
    pub fn from_config(config: &ScreenConfig) -> Self {
        Self::new(
            config.width as i32,
            config.height as i32,
            config.center_offset_y as i32,
        )
    }

    /// Creates a geometry with an explicit centre and aspect ratio.
    #[must_use]
    pub fn with_center(width: i32, height: i32, center: Point, aspect_ratio: f32) -> Self {
        Self {
            width,
            height,
            center,
            aspect_ratio,
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Left-stick anchor point.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// True middle of the screen, used when a session starts.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// `width / height`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Clamps a point to `[0, width) x [0, height)`.
    #[must_use]
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0, (self.width - 1).max(0)),
            point.y.clamp(0, (self.height - 1).max(0)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(10, 20);
        let b = Point::new(3, -5);
        assert_eq!(a + b, Point::new(13, 15));
        assert_eq!(a - b, Point::new(7, 25));
    }

    #[test]
    fn test_point_arithmetic_saturates() {
        let max = Point::new(i32::MAX, i32::MAX);
        let min = Point::new(i32::MIN, i32::MIN);
        assert_eq!(max - min, max);
        assert_eq!(min - max, min);
        assert_eq!(max + max, max);
    }

    #[test]
    fn test_geometry_clamp() {
        let geometry = ScreenGeometry::new(1920, 1080, 30);
        assert_eq!(geometry.clamp(Point::new(100, 200)), Point::new(100, 200));
        assert_eq!(geometry.clamp(Point::new(i32::MIN, i32::MAX)), Point::new(0, 1079));
        assert_eq!(geometry.clamp(Point::new(1920, -1)), Point::new(1919, 0));
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(-1, 2).to_string(), "(-1, 2)");
    }

    #[test]
    fn test_geometry_full_hd() {
        let geometry = ScreenGeometry::new(1920, 1080, 30);
        assert_eq!(geometry.width(), 1920);
        assert_eq!(geometry.height(), 1080);
        assert_eq!(geometry.center(), Point::new(960, 510));
        assert_eq!(geometry.midpoint(), Point::new(960, 540));
    }

    #[test]
    fn test_geometry_without_offset() {
        let geometry = ScreenGeometry::new(1280, 1024, 0);
        assert_eq!(geometry.center(), geometry.midpoint());
        assert!((geometry.aspect_ratio() - 1.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_geometry_from_config() {
        let config = ScreenConfig {
            width: 2560,
            height: 1440,
            center_offset_y: 0,
        };
        let geometry = ScreenGeometry::from_config(&config);
        assert_eq!(geometry.center(), Point::new(1280, 720));
    }

    #[test]
    fn test_geometry_with_center() {
        let geometry = ScreenGeometry::with_center(1920, 1000, Point::new(960, 500), 1.77);
        assert_eq!(geometry.center(), Point::new(960, 500));
        assert_eq!(geometry.midpoint(), Point::new(960, 500));
        assert_eq!(geometry.aspect_ratio(), 1.77);
    }
}
