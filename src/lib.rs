//! Command-line controller for the mouse-remapper firmware
//!
//! The protocol lives in `remapper-transport`, the semantic operations in
//! `remapper-mouse`. This crate adds persistent configuration for the binary.

pub mod config;

pub use config::{ControllerConfig, Overrides, PacingConfig};
