//! # Calibration Module
//!
//! Owns the persisted stick calibration and the operator-triggered routine
//! that re-measures the rest position.
//!
//! ## Calibration State
//!
//! Four center offsets (one per axis) and one inner deadzone threshold.
//! Loaded once at startup; keys missing from the store fall back to the
//! midpoint of the raw range and the default deadzone.
//!
//! ## Calibration Routine
//!
//! ```text
//! Idle -> Sampling -> Committing -> Idle
//! ```
//!
//! - **Sampling**: wait for the operator to release the sticks, then average
//!   a batch of reads spaced a few milliseconds apart.
//! - **Committing**: persist the four averages and install them as the new
//!   centers.
//!
//! If the store rejects a write the in-memory calibration is left untouched
//! and keys already written in this commit get their previously stored
//! values back.
//!
//! ## Usage
//!
//! ```
//! use stick_conditioner::sticks::calibration::{CalibrationRoutine, CalibrationSettings, CalibrationState};
//! use stick_conditioner::sticks::mapper::AxisRange;
//! use stick_conditioner::sticks::sampler::{Axis, SimulatedAdc};
//! use stick_conditioner::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let mut state = CalibrationState::load(&store, &AxisRange::default(), 150);
//! assert_eq!(state.center(Axis::LeftX), 2047);
//!
//! let mut adc = SimulatedAdc::new([2010, 2080, 1999, 2101], 0);
//! let mut routine = CalibrationRoutine::new(CalibrationSettings::default());
//! routine.run(&mut adc, &mut |_ms: u64| {}, &mut store, &mut state)?;
//!
//! assert_eq!(state.center(Axis::LeftX), 2010);
//! # Ok::<(), stick_conditioner::error::ConditionerError>(())
//! ```

use std::time::Duration;
use tracing::{debug, info, warn};

use super::mapper::AxisRange;
use super::sampler::{average_reads, Axis, RawSample, SampleSource};
use crate::error::Result;
use crate::store::{read_or_default, CalibrationStore, KEY_INNER_DEADZONE};

/// Default inner deadzone threshold in raw counts.
pub const DEFAULT_INNER_DEADZONE: i32 = 150;
/// Default pause before sampling, giving the operator time to let go.
pub const DEFAULT_SETTLE_MS: u64 = 1000;
/// Default number of reads averaged during calibration.
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 50;
/// Default pause between calibration reads.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 2;

/// Blocking millisecond delay.
#[cfg_attr(test, mockall::automock)]
pub trait Delay {
    /// Pauses for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u64);
}

/// Closures can stand in for a delay, e.g. in tests.
impl<F: FnMut(u64)> Delay for F {
    fn delay_ms(&mut self, ms: u64) {
        self(ms)
    }
}

/// Delay backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Persisted calibration for all four axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationState {
    /// Rest position of each axis.
    pub centers: RawSample,
    /// Inner deadzone threshold in raw counts (never negative).
    pub inner_deadzone: i32,
}

impl CalibrationState {
    /// Uncalibrated state: every center at the raw midpoint.
    #[must_use]
    pub fn defaults(range: &AxisRange, inner_deadzone: i32) -> Self {
        Self {
            centers: RawSample::splat(range.input_mid()),
            inner_deadzone: inner_deadzone.max(0),
        }
    }

    /// Loads the calibration from `store`, falling back per key to
    /// [`CalibrationState::defaults`].
    pub fn load<S: CalibrationStore + ?Sized>(store: &S, range: &AxisRange, default_inner_deadzone: i32) -> Self {
        let defaults = Self::defaults(range, default_inner_deadzone);

        let mut centers = defaults.centers;
        for axis in Axis::ALL {
            centers.set(axis, read_or_default(store, axis.store_key(), defaults.centers.get(axis)));
        }

        let stored_deadzone = read_or_default(store, KEY_INNER_DEADZONE, defaults.inner_deadzone);
        let inner_deadzone = if stored_deadzone < 0 {
            warn!("Stored inner deadzone {} is negative, using {}", stored_deadzone, defaults.inner_deadzone);
            defaults.inner_deadzone
        } else {
            stored_deadzone
        };

        info!(
            "Calibration loaded: Lx={} Ly={} Rx={} Ry={} dz={}",
            centers.get(Axis::LeftX),
            centers.get(Axis::LeftY),
            centers.get(Axis::RightX),
            centers.get(Axis::RightY),
            inner_deadzone
        );

        Self {
            centers,
            inner_deadzone,
        }
    }

    /// Calibrated center of one axis.
    #[must_use]
    pub fn center(&self, axis: Axis) -> i32 {
        self.centers.get(axis)
    }
}

/// Step of the calibration routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationPhase {
    /// Not calibrating.
    Idle,
    /// Waiting for the sticks to settle and averaging reads.
    Sampling,
    /// Writing the new centers.
    Committing,
}

/// Timing and batch size of the calibration routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSettings {
    /// Pause before the first read.
    pub settle_ms: u64,
    /// Reads averaged per axis.
    pub sample_count: usize,
    /// Pause after each round of reads.
    pub sample_interval_ms: u64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            sample_count: DEFAULT_CALIBRATION_SAMPLES,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}

/// One-shot rest position calibration.
///
/// A run always completes and leaves the routine in
/// [`CalibrationPhase::Idle`], whether or not the commit succeeded.
#[derive(Debug, Clone)]
pub struct CalibrationRoutine {
    settings: CalibrationSettings,
    phase: CalibrationPhase,
}

impl CalibrationRoutine {
    /// Creates an idle routine.
    #[must_use]
    pub fn new(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            phase: CalibrationPhase::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Routine settings.
    #[must_use]
    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    /// Measures the rest position and commits it to `store` and `state`.
    ///
    /// Equivalent to [`settle`](Self::settle), [`sample`](Self::sample) and
    /// [`commit`](Self::commit) in sequence.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting a center fails. `state` keeps
    /// its previous centers in that case.
    pub fn run<A, D, S>(
        &mut self,
        source: &mut A,
        delay: &mut D,
        store: &mut S,
        state: &mut CalibrationState,
    ) -> Result<RawSample>
    where
        A: SampleSource + ?Sized,
        D: Delay + ?Sized,
        S: CalibrationStore + ?Sized,
    {
        self.settle(delay);
        let centers = self.sample(source, delay);
        self.commit(store, state, centers)
    }

    /// Enters [`CalibrationPhase::Sampling`] and waits for the sticks to be
    /// released.
    pub fn settle<D: Delay + ?Sized>(&mut self, delay: &mut D) {
        info!("Calibrating, release the sticks");
        self.enter(CalibrationPhase::Sampling);
        delay.delay_ms(self.settings.settle_ms);
    }

    /// Averages the calibration batch and enters
    /// [`CalibrationPhase::Committing`].
    pub fn sample<A, D>(&mut self, source: &mut A, delay: &mut D) -> RawSample
    where
        A: SampleSource + ?Sized,
        D: Delay + ?Sized,
    {
        if self.phase == CalibrationPhase::Idle {
            self.enter(CalibrationPhase::Sampling);
        }
        let interval = self.settings.sample_interval_ms;
        let centers = average_reads(source, self.settings.sample_count.max(1), || delay.delay_ms(interval));
        self.enter(CalibrationPhase::Committing);
        centers
    }

    /// Persists `centers` and installs them in `state`, then returns to
    /// [`CalibrationPhase::Idle`] whether or not the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting a center fails. `state` keeps
    /// its previous centers in that case.
    pub fn commit<S: CalibrationStore + ?Sized>(
        &mut self,
        store: &mut S,
        state: &mut CalibrationState,
        centers: RawSample,
    ) -> Result<RawSample> {
        let committed = persist_centers(store, &centers);
        self.enter(CalibrationPhase::Idle);

        committed?;
        state.centers = centers;

        info!(
            "Calibration complete: Lx={} Ly={} Rx={} Ry={}",
            centers.get(Axis::LeftX),
            centers.get(Axis::LeftY),
            centers.get(Axis::RightX),
            centers.get(Axis::RightY)
        );
        Ok(centers)
    }

    fn enter(&mut self, phase: CalibrationPhase) {
        debug!("Calibration phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Writes all four centers. If a write fails, keys written earlier in this
/// commit get their previously stored values back; keys that were absent
/// before are left with the new value since the store cannot delete.
fn persist_centers<S: CalibrationStore + ?Sized>(store: &mut S, centers: &RawSample) -> Result<()> {
    let stored: Vec<Option<i32>> = Axis::ALL
        .iter()
        .map(|axis| store.get(axis.store_key()).ok().flatten())
        .collect();

    for (written, axis) in Axis::ALL.into_iter().enumerate() {
        if let Err(e) = store.put(axis.store_key(), centers.get(axis)) {
            warn!("Failed to persist {} center: {}", axis.store_key(), e);

            for (restored, previous) in Axis::ALL[..written].iter().zip(&stored) {
                let Some(previous) = previous else {
                    continue;
                };
                if let Err(e) = store.put(restored.store_key(), *previous) {
                    warn!("Failed to restore {} center: {}", restored.store_key(), e);
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Updates and persists the inner deadzone.
///
/// Negative values are ignored and the current threshold is kept.
///
/// # Errors
///
/// Returns the store error if the new value cannot be persisted; `state` is
/// left unchanged in that case.
pub fn set_inner_deadzone<S: CalibrationStore + ?Sized>(
    store: &mut S,
    state: &mut CalibrationState,
    inner_deadzone: i32,
) -> Result<()> {
    if inner_deadzone < 0 {
        warn!("Ignoring negative inner deadzone {}", inner_deadzone);
        return Ok(());
    }

    store.put(KEY_INNER_DEADZONE, inner_deadzone)?;
    state.inner_deadzone = inner_deadzone;
    info!("Inner deadzone updated: {}", inner_deadzone);
    Ok(())
}
