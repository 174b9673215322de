//! # Protocol Constants and Types
//!
//! Core definitions for the controller text protocol.
//!
//! ## Wire Format
//!
//! ```text
//! BTN:<A|B|X|Y>=<0|1>
//! DPAD:<U|D|L|R>=<0|1>
//! TRIG:<L|R>=<0|1>
//! BRAKE:<L|R>=<float>
//! JOY-L:[V=<float>][H=<float>]
//! JOY-R:[V=<float>][H=<float>]
//! I am here!                      (whole-frame greeting)
//! ```

/// Whole-frame liveness probe sent by the controller
pub const GREETING: &str = "I am here!";

/// Reply sent back for every greeting
pub const GREETING_REPLY: &str = "I got you!";

/// Separates commands inside a frame
pub const COMMAND_SEPARATOR: char = ';';

/// Separates the category tag from the payload
pub const CATEGORY_SEPARATOR: char = ':';

/// Separates a key from its value in button-like payloads
pub const VALUE_SEPARATOR: char = '=';

/// Button value meaning "pressed"
pub const PRESSED_VALUE: &str = "1";

/// Command category, identified by the tag before the first `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Face buttons (`BTN`)
    Face,
    /// Directional pad (`DPAD`)
    DPad,
    /// Shoulder triggers (`TRIG`)
    Trigger,
    /// Analog brakes (`BRAKE`)
    Brake,
    /// Left analog stick (`JOY-L`)
    LeftStick,
    /// Right analog stick (`JOY-R`)
    RightStick,
}

impl Category {
    /// Parses a wire tag into a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::protocol::Category;
    ///
    /// assert_eq!(Category::from_tag("DPAD"), Some(Category::DPad));
    /// assert_eq!(Category::from_tag("dpad"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BTN" => Some(Self::Face),
            "DPAD" => Some(Self::DPad),
            "TRIG" => Some(Self::Trigger),
            "BRAKE" => Some(Self::Brake),
            "JOY-L" => Some(Self::LeftStick),
            "JOY-R" => Some(Self::RightStick),
            _ => None,
        }
    }

    /// Returns the wire tag of this category.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Face => "BTN",
            Self::DPad => "DPAD",
            Self::Trigger => "TRIG",
            Self::Brake => "BRAKE",
            Self::LeftStick => "JOY-L",
            Self::RightStick => "JOY-R",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Brake side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Parses the `L`/`R` wire id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            _ => None,
        }
    }

    /// Returns the wire id, which doubles as the key table id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }
}

/// Analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    /// Drives the pointer
    Left,
    /// Drives the four directional keys
    Right,
}

/// Why a fragment could not be decoded into a concrete command.
#[derive(Debug, Clone, PartialEq)]
pub enum UnknownReason {
    /// Shape is broken (missing separator, bad number, stray characters)
    Malformed(String),
    /// Category tag is not part of the protocol
    UnknownCategory,
    /// Category is known but the button id is not
    UnknownButton { category: Category, id: String },
}

/// A decoded controller command.
///
/// Commands are built once by the parser and consumed once by the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Digital button from the face, D-pad or trigger group
    Button {
        category: Category,
        button_id: String,
        pressed: bool,
    },
    /// Analog brake; pressed while `magnitude != 0`
    Brake { side: Side, magnitude: f32 },
    /// Stick sample; `None` axes keep their previous value
    Stick {
        stick: Stick,
        vertical: Option<f32>,
        horizontal: Option<f32>,
    },
    /// Liveness probe
    Greeting,
    /// Anything that could not be decoded
    Unknown { raw: String, reason: UnknownReason },
}

impl Command {
    /// Builds an `Unknown` command for a malformed fragment.
    pub fn malformed(raw: &str, detail: impl Into<String>) -> Self {
        Self::Unknown {
            raw: raw.to_string(),
            reason: UnknownReason::Malformed(detail.into()),
        }
    }

    /// Returns `true` for commands the translator can act on.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }
}
