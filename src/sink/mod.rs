//! # Input Sink Module
//!
//! Trait abstraction over the platform's key and pointer injection primitives,
//! so the translator can be driven against a recording double in tests.
//!
//! - [`uinput::UinputSink`]: Linux virtual input device via evdev/uinput

pub mod uinput;

use crate::controller::geometry::Point;
use crate::controller::keymap::AbstractKey;
use crate::error::Result;

pub use uinput::UinputSink;

/// Host input injection primitives
///
/// Calls are fire-and-forget: an `Err` means that single call was dropped.
#[cfg_attr(test, mockall::automock)]
pub trait InputSink: Send {
    /// Press a key
    fn key_down(&mut self, key: AbstractKey) -> Result<()>;

    /// Release a key
    fn key_up(&mut self, key: AbstractKey) -> Result<()>;

    /// Move the pointer to absolute screen coordinates
    fn move_to(&mut self, point: Point) -> Result<()>;

    /// Current pointer location, when the platform can report it
    fn pointer_position(&self) -> Option<Point> {
        None
    }
}
