//! # Conditioner Module
//!
//! Runs one full conditioning pass per control cycle:
//!
//! ```text
//! RawSample -> map_axis x4 (with calibration) -> circularize x2 -> StickOutput
//! ```
//!
//! The [`Conditioner`] owns the calibration state and the store it is
//! persisted in. Processing only reads the state; calibration and deadzone
//! updates need `&mut self`, so a cycle can never observe a half-written
//! calibration.
//!
//! ## Usage
//!
//! ```
//! use stick_conditioner::sticks::calibration::CalibrationSettings;
//! use stick_conditioner::sticks::conditioner::Conditioner;
//! use stick_conditioner::sticks::mapper::AxisRange;
//! use stick_conditioner::sticks::sampler::RawSample;
//! use stick_conditioner::store::MemoryStore;
//!
//! let conditioner = Conditioner::load(
//!     AxisRange::default(),
//!     MemoryStore::new(),
//!     150,
//!     CalibrationSettings::default(),
//! );
//!
//! let output = conditioner.process(&RawSample::splat(2047));
//! assert_eq!((output.left.x, output.left.y), (16383, 16383));
//! ```

use super::calibration::{self, CalibrationRoutine, CalibrationSettings, CalibrationState, Delay};
use super::circular::OutputAxisPair;
use super::mapper::AxisRange;
use super::sampler::{Axis, RawSample, SampleSource};
use crate::error::Result;
use crate::store::CalibrationStore;

/// Conditioned output of both sticks for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickOutput {
    /// Left stick.
    pub left: OutputAxisPair,
    /// Right stick.
    pub right: OutputAxisPair,
}

impl StickOutput {
    /// Both sticks at logical zero for `range`.
    #[must_use]
    pub fn centered(range: &AxisRange) -> Self {
        let mid = range.output_mid();
        Self {
            left: OutputAxisPair::new(mid, mid),
            right: OutputAxisPair::new(mid, mid),
        }
    }

    /// Output value of one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::LeftX => self.left.x,
            Axis::LeftY => self.left.y,
            Axis::RightX => self.right.x,
            Axis::RightY => self.right.y,
        }
    }
}

/// Calibrated stick conditioning pipeline.
#[derive(Debug)]
pub struct Conditioner<S> {
    range: AxisRange,
    calibration: CalibrationState,
    store: S,
    routine: CalibrationRoutine,
}

impl<S: CalibrationStore> Conditioner<S> {
    /// Builds a conditioner, loading the calibration from `store`.
    ///
    /// # Arguments
    ///
    /// * `range` - Raw/output ranges and outer deadzone
    /// * `store` - Persistent calibration storage
    /// * `default_inner_deadzone` - Deadzone used when none is stored
    /// * `settings` - Calibration routine timing
    pub fn load(range: AxisRange, store: S, default_inner_deadzone: i32, settings: CalibrationSettings) -> Self {
        let calibration = CalibrationState::load(&store, &range, default_inner_deadzone);
        Self {
            range,
            calibration,
            store,
            routine: CalibrationRoutine::new(settings),
        }
    }

    /// Current calibration snapshot.
    #[must_use]
    pub fn calibration(&self) -> CalibrationState {
        self.calibration
    }

    /// Range configuration.
    #[must_use]
    pub fn range(&self) -> &AxisRange {
        &self.range
    }

    /// Backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Maps one axis with its calibrated center and fixed polarity.
    #[must_use]
    pub fn map_axis(&self, axis: Axis, raw: i32) -> i32 {
        self.range.map_axis(
            raw,
            self.calibration.center(axis),
            self.calibration.inner_deadzone,
            axis.is_inverted(),
        )
    }

    /// Conditions one raw sample into circularly-bounded stick output.
    #[must_use]
    pub fn process(&self, raw: &RawSample) -> StickOutput {
        let pair = |x_axis: Axis, y_axis: Axis| {
            OutputAxisPair::new(
                self.map_axis(x_axis, raw.get(x_axis)),
                self.map_axis(y_axis, raw.get(y_axis)),
            )
            .circularized(self.range.output_max)
        };

        StickOutput {
            left: pair(Axis::LeftX, Axis::LeftY),
            right: pair(Axis::RightX, Axis::RightY),
        }
    }

    /// Runs the calibration routine against `source`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the new centers cannot be persisted; the
    /// previous calibration stays active.
    pub fn calibrate<A, D>(&mut self, source: &mut A, delay: &mut D) -> Result<RawSample>
    where
        A: SampleSource + ?Sized,
        D: Delay + ?Sized,
    {
        self.routine
            .run(source, delay, &mut self.store, &mut self.calibration)
    }

    /// Updates the inner deadzone; negative values are ignored.
    ///
    /// # Errors
    ///
    /// Returns the store error if the value cannot be persisted.
    pub fn set_inner_deadzone(&mut self, inner_deadzone: i32) -> Result<()> {
        calibration::set_inner_deadzone(&mut self.store, &mut self.calibration, inner_deadzone)
    }
}
