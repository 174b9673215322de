//! # Key Map Module
//!
//! Fixed mapping from controller buttons to host keyboard keys.
//!
//! ## Key Assignments
//!
//! | Category | Button | Key |
//! |----------|--------|-----|
//! | BTN | A / B / X / Y | X / C / Z / S |
//! | DPAD | U / D / L / R | T / G / F / H |
//! | TRIG | L / R | Q / D |
//! | BRAKE | L / R | P / O |
//! | JOY-R | up / down / left / right | I / K / J / L |
//!
//! ## Usage
//!
//! ```
//! use pad_bridge::controller::keymap::{AbstractKey, KeyMapTable};
//! use pad_bridge::protocol::Category;
//!
//! assert_eq!(KeyMapTable::resolve(Category::Face, "A"), Some(AbstractKey::X));
//! assert_eq!(KeyMapTable::resolve(Category::Face, "Z"), None);
//! ```

use crate::protocol::Category;

/// Platform-independent keyboard key.
///
/// Only the keys the mapping table can produce exist here; the sink decides
/// how each one is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AbstractKey {
    C,
    D,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    O,
    P,
    Q,
    S,
    T,
    X,
    Z,
}

impl AbstractKey {
    /// Every key the table can emit.
    pub const ALL: [AbstractKey; 16] = [
        AbstractKey::C,
        AbstractKey::D,
        AbstractKey::F,
        AbstractKey::G,
        AbstractKey::H,
        AbstractKey::I,
        AbstractKey::J,
        AbstractKey::K,
        AbstractKey::L,
        AbstractKey::O,
        AbstractKey::P,
        AbstractKey::Q,
        AbstractKey::S,
        AbstractKey::T,
        AbstractKey::X,
        AbstractKey::Z,
    ];
}

/// Keys driven by the right stick.
pub mod stick_keys {
    use super::AbstractKey;

    pub const UP: AbstractKey = AbstractKey::I;
    pub const DOWN: AbstractKey = AbstractKey::K;
    pub const LEFT: AbstractKey = AbstractKey::J;
    pub const RIGHT: AbstractKey = AbstractKey::L;
}

/// Static button-to-key lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMapTable;

impl KeyMapTable {
    /// Resolves a button of a category to its host key.
    ///
    /// # Arguments
    ///
    /// * `category` - Command category the button belongs to
    /// * `button_id` - Wire id of the button (`"A"`, `"U"`, `"L"`, ...)
    ///
    /// # Returns
    ///
    /// `None` for ids outside the table and for stick categories.
    #[must_use]
    pub fn resolve(category: Category, button_id: &str) -> Option<AbstractKey> {
        let key = match (category, button_id) {
            (Category::Face, "A") => AbstractKey::X,
            (Category::Face, "B") => AbstractKey::C,
            (Category::Face, "X") => AbstractKey::Z,
            (Category::Face, "Y") => AbstractKey::S,

            (Category::DPad, "U") => AbstractKey::T,
            (Category::DPad, "D") => AbstractKey::G,
            (Category::DPad, "L") => AbstractKey::F,
            (Category::DPad, "R") => AbstractKey::H,

            (Category::Trigger, "L") => AbstractKey::Q,
            (Category::Trigger, "R") => AbstractKey::D,

            (Category::Brake, "L") => AbstractKey::P,
            (Category::Brake, "R") => AbstractKey::O,

            _ => return None,
        };
        Some(key)
    }
}
