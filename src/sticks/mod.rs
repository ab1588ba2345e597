//! # Sticks Module
//!
//! Analogue stick conditioning.
//!
//! This module handles:
//! - Noise-averaged sampling of the four stick axes
//! - Persisted per-axis center calibration and the calibration routine
//! - Inner/outer deadzones and split-range mapping to HID axis values
//! - Circular clamping of each stick's X/Y pair
//! - Rate-limited diagnostic output

pub mod calibration;
pub mod circular;
pub mod conditioner;
pub mod diagnostics;
pub mod mapper;
pub mod sampler;

pub use calibration::{CalibrationSettings, CalibrationState};
pub use circular::{circularize, OutputAxisPair};
pub use conditioner::{Conditioner, StickOutput};
pub use mapper::AxisRange;
pub use sampler::{Axis, RawSample, SampleSource, Sampler};
