//! # Error Types
//!
//! Custom error types for Pad Bridge using `thiserror`.
//!
//! Protocol-level variants (`Parse`, `UnknownButton`, `UnknownCategory`,
//! `Injection`) are never fatal: the translator reports them as diagnostics and
//! keeps going. `InputDevice`, `Config` and `Io` surface at startup.

use thiserror::Error;

/// Main error type for Pad Bridge
#[derive(Debug, Error)]
pub enum PadBridgeError {
    /// Malformed command fragment
    #[error("Parse error in '{fragment}': {detail}")]
    Parse { fragment: String, detail: String },

    /// Known command category with a button id outside the key table
    #[error("Unknown button found in {category} command: '{button}'")]
    UnknownButton { category: String, button: String },

    /// Fragment whose category is not part of the protocol
    #[error("Received unknown input: '{0}'")]
    UnknownCategory(String),

    /// A key or pointer injection call failed
    #[error("Input injection failed: {0}")]
    Injection(String),

    /// Virtual input device could not be created
    #[error("Input device error: {0}")]
    InputDevice(String),

    /// WebSocket transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pad Bridge
pub type Result<T> = std::result::Result<T, PadBridgeError>;
