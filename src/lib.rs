//! # Pad Bridge Library
//!
//! Drive the desktop with a phone-based game controller over WebSocket.
//!
//! This library decodes the controller's text protocol and injects the matching
//! keyboard and pointer events through a Linux virtual input device.

pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod server;
pub mod sink;
