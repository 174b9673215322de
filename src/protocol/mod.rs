//! # Controller Protocol Module
//!
//! Implementation of the text protocol spoken by the remote controller.
//!
//! This module handles:
//! - Splitting a frame into `;`-separated command fragments
//! - Decoding button, brake and stick fragments into typed [`command::Command`]s
//! - Recognising the liveness greeting
//! - Degrading malformed fragments to `Unknown` without touching their siblings

pub mod command;
pub mod parser;

pub use command::{Category, Command, Side, Stick, UnknownReason};
pub use parser::parse_frame;
