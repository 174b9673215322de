//! # Pointer Correction Module
//!
//! Maps the left stick onto an absolute screen target and corrects the pointer
//! move request for display scaling.
//!
//! ## Display Scaling
//!
//! With a desktop scale factor `s > 1`, an absolute move request under-shoots the
//! requested displacement by a fixed proportion. The model over-shoots the target
//! by that same proportion so the two errors cancel:
//!
//! ```text
//! mod       = 1 - 1/s
//! delta     = target - origin
//! corrected = target - delta * mod
//! ```
//!
//! `s == 1.0` (no scaling) is the identity. Scale factors below 1.0 are outside
//! the model's domain and are also treated as identity.
//!
//! ## Left Stick Target
//!
//! ```text
//! target.y = center.y + radius * (-vertical)
//! target.x = center.x + radius * horizontal * aspect_ratio
//! ```
//!
//! Missing axes keep the previous target component. The target is clamped to
//! the screen, so out-of-range deflections pin the pointer to an edge.

use super::geometry::{Point, ScreenGeometry};

/// Scale factor used when none is configured (125% desktop scaling).
pub const DEFAULT_SCALE_FACTOR: f32 = 1.25;

/// Pixels the pointer travels from the centre at full vertical deflection.
pub const DEFAULT_STICK_RADIUS: f32 = 320.0;

/// Display-scaling corrector and left-stick target mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerCorrectionModel {
    scale_factor: f32,
    stick_radius: f32,
}

impl Default for PointerCorrectionModel {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_FACTOR, DEFAULT_STICK_RADIUS)
    }
}

impl PointerCorrectionModel {
    /// Creates a model with the given scale factor and stick radius.
    #[must_use]
    pub fn new(scale_factor: f32, stick_radius: f32) -> Self {
        Self {
            scale_factor,
            stick_radius,
        }
    }

    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    #[must_use]
    pub fn stick_radius(&self) -> f32 {
        self.stick_radius
    }

    /// Corrects `target` using this model's scale factor.
    #[must_use]
    pub fn apply(&self, target: Point, origin: Point) -> Point {
        Self::correct(target, origin, self.scale_factor)
    }

    /// Computes the move request that lands on `target` when starting at `origin`.
    ///
    /// # Arguments
    ///
    /// * `target` - Where the pointer should end up
    /// * `origin` - Where the pointer is now
    /// * `scale_factor` - Desktop scale factor (`1.25` for 125%)
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::controller::geometry::Point;
    /// use pad_bridge::controller::pointer::PointerCorrectionModel;
    ///
    /// let target = Point::new(1000, 300);
    /// let origin = Point::new(600, 500);
    ///
    /// // 200% scaling: over-shoot by half the displacement
    /// assert_eq!(
    ///     PointerCorrectionModel::correct(target, origin, 2.0),
    ///     Point::new(800, 400)
    /// );
    ///
    /// // No scaling, no correction
    /// assert_eq!(PointerCorrectionModel::correct(target, origin, 1.0), target);
    /// ```
    #[must_use]
    pub fn correct(target: Point, origin: Point, scale_factor: f32) -> Point {
        if !scale_factor.is_finite() || scale_factor <= 1.0 {
            return target;
        }

        let mod_factor = 1.0 - 1.0 / f64::from(scale_factor);
        let correct_axis = |target: i32, origin: i32| {
            let delta = f64::from(target) - f64::from(origin);
            // Float to int casts saturate
            (f64::from(target) - delta * mod_factor) as i32
        };

        Point::new(
            correct_axis(target.x, origin.x),
            correct_axis(target.y, origin.y),
        )
    }

    /// Updates the left-stick target with whichever axes are present.
    ///
    /// # Arguments
    ///
    /// * `previous` - Current left-stick target
    /// * `geometry` - Screen geometry providing centre and aspect ratio
    /// * `vertical` - Stick vertical deflection (-1.0 down to 1.0 up)
    /// * `horizontal` - Stick horizontal deflection (-1.0 left to 1.0 right)
    #[must_use]
    pub fn left_stick_target(
        &self,
        previous: Point,
        geometry: &ScreenGeometry,
        vertical: Option<f32>,
        horizontal: Option<f32>,
    ) -> Point {
        let center = geometry.center();
        let mut target = previous;

        if let Some(v) = vertical {
            target.y = (center.y as f32 + self.stick_radius * -v) as i32;
        }
        if let Some(h) = horizontal {
            target.x = (center.x as f32 + self.stick_radius * h * geometry.aspect_ratio()) as i32;
        }

        geometry.clamp(target)
    }
}
