//! # uinput Sink
//!
//! Injects keyboard and absolute pointer events through a Linux virtual input
//! device.
//!
//! This module handles:
//! - Creating a uinput device exposing every mapped key plus `ABS_X`/`ABS_Y`
//! - Translating [`AbstractKey`]s to evdev key codes
//! - Clamping pointer targets to the configured screen
//!
//! The device needs write access to `/dev/uinput` (root or the `input` group).

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use tracing::{debug, info};

use super::InputSink;
use crate::controller::geometry::{Point, ScreenGeometry};
use crate::controller::keymap::AbstractKey;
use crate::error::{PadBridgeError, Result};

/// Key event value for a press
const KEY_PRESSED: i32 = 1;

/// Key event value for a release
const KEY_RELEASED: i32 = 0;

/// uinput-backed input sink
///
/// Pointer coordinates are reported in screen pixels: the absolute axes span
/// exactly the configured screen, so the compositor maps them 1:1.
pub struct UinputSink {
    device: VirtualDevice,
    width: i32,
    height: i32,
}

impl std::fmt::Debug for UinputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputSink")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl UinputSink {
    /// Create the virtual device
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown by `evtest` and `libinput list-devices`
    /// * `geometry` - Screen the absolute axes should span
    ///
    /// # Errors
    ///
    /// Returns `InputDevice` if `/dev/uinput` cannot be opened or the device
    /// cannot be registered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::controller::geometry::ScreenGeometry;
    /// use pad_bridge::sink::UinputSink;
    ///
    /// let geometry = ScreenGeometry::new(1920, 1080, 30);
    /// let sink = UinputSink::new("Pad Bridge Virtual Input", &geometry)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(name: &str, geometry: &ScreenGeometry) -> Result<Self> {
        let width = geometry.width().max(1);
        let height = geometry.height().max(1);

        let mut keys = AttributeSet::<Key>::new();
        for key in AbstractKey::ALL {
            keys.insert(key_code(key));
        }
        // Pointer button so the device is classified as a pointer, never emitted
        keys.insert(Key::BTN_LEFT);

        let abs_x = UinputAbsSetup::new(
            AbsoluteAxisType::ABS_X,
            AbsInfo::new(0, 0, width - 1, 0, 0, 0),
        );
        let abs_y = UinputAbsSetup::new(
            AbsoluteAxisType::ABS_Y,
            AbsInfo::new(0, 0, height - 1, 0, 0, 0),
        );

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(name).with_keys(&keys))
            .and_then(|builder| builder.with_absolute_axis(&abs_x))
            .and_then(|builder| builder.with_absolute_axis(&abs_y))
            .and_then(|builder| builder.build())
            .map_err(|e| {
                PadBridgeError::InputDevice(format!("Failed to create uinput device: {}", e))
            })?;

        info!("Created virtual input device '{}' ({}x{})", name, width, height);

        Ok(Self {
            device,
            width,
            height,
        })
    }

    /// Get the `/dev/input/eventX` node of the virtual device
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }

    fn emit(&mut self, events: &[InputEvent]) -> Result<()> {
        self.device
            .emit(events)
            .map_err(|e| PadBridgeError::Injection(format!("Failed to emit events: {}", e)))
    }

    fn emit_key(&mut self, key: AbstractKey, value: i32) -> Result<()> {
        let event = InputEvent::new(EventType::KEY, key_code(key).code(), value);
        self.emit(&[event])
    }
}

impl InputSink for UinputSink {
    fn key_down(&mut self, key: AbstractKey) -> Result<()> {
        debug!("Key down: {:?}", key);
        self.emit_key(key, KEY_PRESSED)
    }

    fn key_up(&mut self, key: AbstractKey) -> Result<()> {
        debug!("Key up: {:?}", key);
        self.emit_key(key, KEY_RELEASED)
    }

    fn move_to(&mut self, point: Point) -> Result<()> {
        let clamped = clamp_to_screen(point, self.width, self.height);
        debug!("Pointer to {}", clamped);

        self.emit(&[
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, clamped.x),
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, clamped.y),
        ])
    }
}

/// Maps an abstract key to its evdev key code
fn key_code(key: AbstractKey) -> Key {
    match key {
        AbstractKey::C => Key::KEY_C,
        AbstractKey::D => Key::KEY_D,
        AbstractKey::F => Key::KEY_F,
        AbstractKey::G => Key::KEY_G,
        AbstractKey::H => Key::KEY_H,
        AbstractKey::I => Key::KEY_I,
        AbstractKey::J => Key::KEY_J,
        AbstractKey::K => Key::KEY_K,
        AbstractKey::L => Key::KEY_L,
        AbstractKey::O => Key::KEY_O,
        AbstractKey::P => Key::KEY_P,
        AbstractKey::Q => Key::KEY_Q,
        AbstractKey::S => Key::KEY_S,
        AbstractKey::T => Key::KEY_T,
        AbstractKey::X => Key::KEY_X,
        AbstractKey::Z => Key::KEY_Z,
    }
}

/// Clamps a point to `[0, width) x [0, height)`
fn clamp_to_screen(point: Point, width: i32, height: i32) -> Point {
    Point::new(point.x.clamp(0, width - 1), point.y.clamp(0, height - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_codes_are_distinct() {
        let codes: HashSet<u16> = AbstractKey::ALL.iter().map(|&k| key_code(k).code()).collect();
        assert_eq!(codes.len(), AbstractKey::ALL.len());
    }

    #[test]
    fn test_key_code_letters() {
        assert_eq!(key_code(AbstractKey::X), Key::KEY_X);
        assert_eq!(key_code(AbstractKey::I), Key::KEY_I);
        assert_eq!(key_code(AbstractKey::Q), Key::KEY_Q);
    }

    #[test]
    fn test_clamp_inside_screen() {
        assert_eq!(clamp_to_screen(Point::new(960, 540), 1920, 1080), Point::new(960, 540));
    }

    #[test]
    fn test_clamp_outside_screen() {
        assert_eq!(clamp_to_screen(Point::new(-10, 5000), 1920, 1080), Point::new(0, 1079));
        assert_eq!(clamp_to_screen(Point::new(1920, -1), 1920, 1080), Point::new(1919, 0));
    }

    // Integration test - only runs with uinput access
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_create_device_with_uinput() {
        let geometry = ScreenGeometry::new(1920, 1080, 30);
        let mut sink = UinputSink::new("Pad Bridge Test Device", &geometry)
            .expect("uinput not available");

        assert!(sink.key_down(AbstractKey::X).is_ok());
        assert!(sink.key_up(AbstractKey::X).is_ok());
        assert!(sink.move_to(Point::new(100, 100)).is_ok());
    }
}
