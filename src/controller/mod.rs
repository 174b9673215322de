//! # Controller Module
//!
//! Turns decoded controller commands into host key and pointer actions.
//!
//! This module handles:
//! - Screen geometry and integer screen points
//! - Mapping controller buttons to keyboard keys
//! - Right-stick dead zone and directional keys
//! - Left-stick pointer targeting with display-scaling correction
//! - Per-session state and the latch of held keys

pub mod geometry;
pub mod hysteresis;
pub mod keymap;
pub mod pointer;
pub mod translator;

pub use translator::{FrameOutcome, InputTranslator, SessionState};
