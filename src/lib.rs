//! # Stick Conditioner Library
//!
//! Turns raw analogue joystick samples into calibrated, circularly-bounded
//! HID gamepad axes.
//!
//! This library provides noise-averaged sampling, persisted per-axis center
//! calibration, deadzone-aware split-range mapping and circular clamping of
//! stick output, plus a small debouncer for the digital buttons.

pub mod buttons;
pub mod config;
pub mod error;
pub mod sticks;
pub mod store;
