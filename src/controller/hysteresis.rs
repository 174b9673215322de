//! # Stick Hysteresis Module
//!
//! Turns a right-stick reading into directional key decisions.
//!
//! Each axis is compared against a dead-zone threshold independently:
//!
//! - `value >= threshold`: press the positive direction
//! - `value <= -threshold`: press the negative direction
//! - otherwise: release both
//!
//! Ties go to the active direction. The engine is stateless; the memory of which
//! keys are down lives in the translator's latch, which diffs consecutive plans.
//!
//! ## Usage
//!
//! ```
//! use pad_bridge::controller::geometry::Point;
//! use pad_bridge::controller::hysteresis::{StickHysteresisEngine, VerticalDecision};
//!
//! let engine = StickHysteresisEngine::new(50);
//!
//! // Screen orientation: negative y is "up"
//! let plan = engine.plan(Point::new(0, -80));
//! assert_eq!(plan.vertical, VerticalDecision::PressUp);
//! ```

use super::geometry::Point;
use super::keymap::{stick_keys, AbstractKey};

/// Vertical axis decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDecision {
    PressUp,
    PressDown,
    ReleaseBoth,
}

/// Horizontal axis decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDecision {
    PressRight,
    PressLeft,
    ReleaseBoth,
}

/// The two independent axis decisions for one stick reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalKeyPlan {
    pub vertical: VerticalDecision,
    pub horizontal: HorizontalDecision,
}

impl DirectionalKeyPlan {
    /// Plan with every directional key released.
    pub const RELEASED: DirectionalKeyPlan = DirectionalKeyPlan {
        vertical: VerticalDecision::ReleaseBoth,
        horizontal: HorizontalDecision::ReleaseBoth,
    };

    /// Desired state of each of the four directional keys.
    ///
    /// At most one key per axis is `true`.
    #[must_use]
    pub fn key_states(&self) -> [(AbstractKey, bool); 4] {
        [
            (stick_keys::UP, self.vertical == VerticalDecision::PressUp),
            (stick_keys::DOWN, self.vertical == VerticalDecision::PressDown),
            (stick_keys::LEFT, self.horizontal == HorizontalDecision::PressLeft),
            (stick_keys::RIGHT, self.horizontal == HorizontalDecision::PressRight),
        ]
    }
}

/// Dead-zone comparator for the right stick.
#[derive(Debug, Clone, Copy)]
pub struct StickHysteresisEngine {
    threshold: i32,
}

impl Default for StickHysteresisEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Default dead-zone threshold in stick units (stick value × 100).
pub const DEFAULT_THRESHOLD: i32 = 50;

impl StickHysteresisEngine {
    /// Creates an engine with the given threshold. Values below 1 are raised to 1
    /// so a centred stick always lands in the dead zone.
    #[must_use]
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Resolves a reading against this engine's threshold.
    #[must_use]
    pub fn plan(&self, current: Point) -> DirectionalKeyPlan {
        Self::resolve(current, self.threshold)
    }

    /// Resolves a right-stick reading into a key plan.
    ///
    /// # Arguments
    ///
    /// * `current` - Stick offset in screen orientation (positive y = down)
    /// * `threshold` - Dead-zone half width; values below 1 are treated as 1
    #[must_use]
    pub fn resolve(current: Point, threshold: i32) -> DirectionalKeyPlan {
        let threshold = threshold.max(1);

        // Screen y grows downwards, the "up" key wants the opposite sign
        let up = current.y.saturating_neg();
        let vertical = if up >= threshold {
            VerticalDecision::PressUp
        } else if up <= -threshold {
            VerticalDecision::PressDown
        } else {
            VerticalDecision::ReleaseBoth
        };

        let horizontal = if current.x >= threshold {
            HorizontalDecision::PressRight
        } else if current.x <= -threshold {
            HorizontalDecision::PressLeft
        } else {
            HorizontalDecision::ReleaseBoth
        };

        DirectionalKeyPlan {
            vertical,
            horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i32 = 50;

    // ==================== Dead Zone Tests ====================

    #[test]
    fn test_centered_releases_everything() {
        assert_eq!(
            StickHysteresisEngine::resolve(Point::new(0, 0), T),
            DirectionalKeyPlan::RELEASED
        );
    }

    #[test]
    fn test_inside_dead_zone() {
        for v in -(T - 1)..T {
            let plan = StickHysteresisEngine::resolve(Point::new(v, v), T);
            assert_eq!(plan, DirectionalKeyPlan::RELEASED, "value {} should be neutral", v);
        }
    }

    #[test]
    fn test_ties_are_active() {
        let plan = StickHysteresisEngine::resolve(Point::new(T, -T), T);
        assert_eq!(plan.horizontal, HorizontalDecision::PressRight);
        assert_eq!(plan.vertical, VerticalDecision::PressUp);

        let plan = StickHysteresisEngine::resolve(Point::new(-T, T), T);
        assert_eq!(plan.horizontal, HorizontalDecision::PressLeft);
        assert_eq!(plan.vertical, VerticalDecision::PressDown);
    }

    // ==================== Orientation Tests ====================

    #[test]
    fn test_vertical_axis_is_inverted() {
        // Numerically smaller y is up on screen
        let plan = StickHysteresisEngine::resolve(Point::new(0, -100), T);
        assert_eq!(plan.vertical, VerticalDecision::PressUp);
        assert_eq!(plan.horizontal, HorizontalDecision::ReleaseBoth);

        let plan = StickHysteresisEngine::resolve(Point::new(0, 100), T);
        assert_eq!(plan.vertical, VerticalDecision::PressDown);
    }

    #[test]
    fn test_axes_are_independent() {
        let plan = StickHysteresisEngine::resolve(Point::new(-100, 10), T);
        assert_eq!(plan.horizontal, HorizontalDecision::PressLeft);
        assert_eq!(plan.vertical, VerticalDecision::ReleaseBoth);
    }

    #[test]
    fn test_extreme_values() {
        let plan = StickHysteresisEngine::resolve(Point::new(i32::MAX, i32::MIN), T);
        assert_eq!(plan.horizontal, HorizontalDecision::PressRight);
        assert_eq!(plan.vertical, VerticalDecision::PressUp);
    }

    // ==================== Key State Tests ====================

    #[test]
    fn test_key_states_mutually_exclusive() {
        for x in [-200, -T, 0, T, 200] {
            for y in [-200, -T, 0, T, 200] {
                let plan = StickHysteresisEngine::resolve(Point::new(x, y), T);
                let states = plan.key_states();
                let up = states[0].1;
                let down = states[1].1;
                let left = states[2].1;
                let right = states[3].1;
                assert!(!(up && down), "up and down both held at ({}, {})", x, y);
                assert!(!(left && right), "left and right both held at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_key_states_mapping() {
        let plan = DirectionalKeyPlan {
            vertical: VerticalDecision::PressDown,
            horizontal: HorizontalDecision::PressRight,
        };
        assert_eq!(
            plan.key_states(),
            [
                (stick_keys::UP, false),
                (stick_keys::DOWN, true),
                (stick_keys::LEFT, false),
                (stick_keys::RIGHT, true),
            ]
        );
    }

    // ==================== Engine Tests ====================

    #[test]
    fn test_engine_threshold_floor() {
        assert_eq!(StickHysteresisEngine::new(0).threshold(), 1);
        assert_eq!(StickHysteresisEngine::new(-5).threshold(), 1);
        assert_eq!(
            StickHysteresisEngine::new(0).plan(Point::new(0, 0)),
            DirectionalKeyPlan::RELEASED
        );
    }

    #[test]
    fn test_engine_default() {
        let engine = StickHysteresisEngine::default();
        assert_eq!(engine.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(
            engine.plan(Point::new(49, -49)),
            DirectionalKeyPlan::RELEASED
        );
    }
}
