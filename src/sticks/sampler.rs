//! # Sampler Module
//!
//! Reads the four stick potentiometers and averages a fixed window of
//! conversions per axis to suppress electrical jitter.
//!
//! ## Axes
//!
//! | Axis | Store key | Polarity |
//! |------|-----------|----------|
//! | Left X | `Lx` | inverted (raw up, output down) |
//! | Left Y | `Ly` | direct |
//! | Right X | `Rx` | inverted |
//! | Right Y | `Ry` | direct |
//!
//! ## Usage
//!
//! ```
//! use stick_conditioner::sticks::sampler::{Axis, Sampler, SimulatedAdc};
//!
//! let adc = SimulatedAdc::new([2048, 2000, 2100, 1990], 0);
//! let mut sampler = Sampler::new(adc, 50);
//!
//! let raw = sampler.sample();
//! assert_eq!(raw.get(Axis::RightX), 2100);
//! ```

/// Default number of conversions averaged per axis on every cycle.
pub const DEFAULT_SAMPLE_COUNT: usize = 50;

/// One of the four analogue stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left stick horizontal.
    LeftX,
    /// Left stick vertical.
    LeftY,
    /// Right stick horizontal.
    RightX,
    /// Right stick vertical.
    RightY,
}

impl Axis {
    /// All axes in read order.
    pub const ALL: [Axis; 4] = [Axis::LeftX, Axis::LeftY, Axis::RightX, Axis::RightY];

    /// Key under which this axis' center offset is persisted.
    #[must_use]
    pub fn store_key(self) -> &'static str {
        match self {
            Axis::LeftX => "Lx",
            Axis::LeftY => "Ly",
            Axis::RightX => "Rx",
            Axis::RightY => "Ry",
        }
    }

    /// Whether the output falls as the raw reading rises.
    ///
    /// Horizontal and vertical axes always have opposite polarity so the
    /// report matches HID gamepad orientation.
    #[must_use]
    pub fn is_inverted(self) -> bool {
        matches!(self, Axis::LeftX | Axis::RightX)
    }

    /// Short operator-facing name (`lx`, `ly`, `rx`, `ry`).
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Axis::LeftX => "lx",
            Axis::LeftY => "ly",
            Axis::RightX => "rx",
            Axis::RightY => "ry",
        }
    }

    /// Parses a short axis name, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_conditioner::sticks::sampler::Axis;
    ///
    /// assert_eq!(Axis::from_short_name("RY"), Some(Axis::RightY));
    /// assert_eq!(Axis::from_short_name("z"), None);
    /// ```
    #[must_use]
    pub fn from_short_name(name: &str) -> Option<Self> {
        Axis::ALL
            .into_iter()
            .find(|axis| axis.short_name().eq_ignore_ascii_case(name))
    }

    fn index(self) -> usize {
        match self {
            Axis::LeftX => 0,
            Axis::LeftY => 1,
            Axis::RightX => 2,
            Axis::RightY => 3,
        }
    }
}

/// Averaged raw readings for all four axes, each in `0..=input_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    values: [i32; 4],
}

impl RawSample {
    /// Creates a sample from per-axis values in [`Axis::ALL`] order.
    #[must_use]
    pub fn new(left_x: i32, left_y: i32, right_x: i32, right_y: i32) -> Self {
        Self {
            values: [left_x, left_y, right_x, right_y],
        }
    }

    /// Creates a sample with the same value on every axis.
    #[must_use]
    pub fn splat(value: i32) -> Self {
        Self { values: [value; 4] }
    }

    /// Value for one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> i32 {
        self.values[axis.index()]
    }

    /// Replaces the value for one axis.
    pub fn set(&mut self, axis: Axis, value: i32) {
        self.values[axis.index()] = value;
    }
}

/// Source of instantaneous ADC conversions.
#[cfg_attr(test, mockall::automock)]
pub trait SampleSource {
    /// Reads one conversion for `axis`. Hardware reads are assumed to succeed.
    fn read(&mut self, axis: Axis) -> i32;
}

/// Takes `count` reads of every axis and returns the truncated mean.
///
/// Axes are read interleaved (LX, LY, RX, RY, LX, ...) and `after_each` runs
/// once after every full round, which lets callers space reads out in time.
pub fn average_reads<S, F>(source: &mut S, count: usize, mut after_each: F) -> RawSample
where
    S: SampleSource + ?Sized,
    F: FnMut(),
{
    let mut sums = [0i64; 4];

    for _ in 0..count {
        for axis in Axis::ALL {
            sums[axis.index()] += i64::from(source.read(axis));
        }
        after_each();
    }

    let divisor = count.max(1) as i64;
    let mut sample = RawSample::default();
    for axis in Axis::ALL {
        sample.set(axis, (sums[axis.index()] / divisor) as i32);
    }
    sample
}

/// Noise-averaging reader over a [`SampleSource`].
///
/// The window size is fixed when the sampler is built.
#[derive(Debug)]
pub struct Sampler<S> {
    source: S,
    sample_count: usize,
}

impl<S: SampleSource> Sampler<S> {
    /// Creates a sampler averaging `sample_count` reads per axis (minimum 1).
    #[must_use]
    pub fn new(source: S, sample_count: usize) -> Self {
        Self {
            source,
            sample_count: sample_count.max(1),
        }
    }

    /// Number of reads averaged per axis.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Reads every axis `sample_count` times and returns the mean.
    pub fn sample(&mut self) -> RawSample {
        average_reads(&mut self.source, self.sample_count, || {})
    }

    /// Mutable access to the underlying source, e.g. for calibration.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Deterministic stand-in for the stick ADCs.
///
/// Each axis sits at a configurable position and every read adds
/// pseudo-random jitter of up to `noise` counts, clamped to the 12-bit range.
#[derive(Debug, Clone)]
pub struct SimulatedAdc {
    positions: RawSample,
    noise: i32,
    input_max: i32,
    seed: u32,
}

impl SimulatedAdc {
    /// Creates a simulated ADC resting at `positions` (in [`Axis::ALL`] order).
    #[must_use]
    pub fn new(positions: [i32; 4], noise: i32) -> Self {
        Self {
            positions: RawSample { values: positions },
            noise: noise.max(0),
            input_max: 4095,
            seed: 0x2545_f491,
        }
    }

    /// Sets the upper rail of the simulated converter.
    #[must_use]
    pub fn with_input_max(mut self, input_max: i32) -> Self {
        self.input_max = input_max;
        self
    }

    /// Moves one axis to a new position.
    pub fn set_position(&mut self, axis: Axis, value: i32) {
        self.positions.set(axis, value);
    }

    /// Current position of one axis, without jitter.
    #[must_use]
    pub fn position(&self, axis: Axis) -> i32 {
        self.positions.get(axis)
    }

    // xorshift32
    fn next_jitter(&mut self) -> i32 {
        if self.noise == 0 {
            return 0;
        }
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.seed = x;

        let span = (2 * self.noise + 1) as u32;
        (x % span) as i32 - self.noise
    }
}

impl SampleSource for SimulatedAdc {
    fn read(&mut self, axis: Axis) -> i32 {
        let jitter = self.next_jitter();
        (self.positions.get(axis) + jitter).clamp(0, self.input_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    /// Source that replays a fixed list of reads per axis.
    struct ScriptedSource {
        reads: [Vec<i32>; 4],
        cursor: [usize; 4],
    }

    impl ScriptedSource {
        fn new(reads: [Vec<i32>; 4]) -> Self {
            Self {
                reads,
                cursor: [0; 4],
            }
        }
    }

    impl SampleSource for ScriptedSource {
        fn read(&mut self, axis: Axis) -> i32 {
            let i = axis.index();
            let value = self.reads[i][self.cursor[i] % self.reads[i].len()];
            self.cursor[i] += 1;
            value
        }
    }

    // ==================== Axis Tests ====================

    #[test]
    fn test_axis_store_keys() {
        assert_eq!(Axis::LeftX.store_key(), "Lx");
        assert_eq!(Axis::LeftY.store_key(), "Ly");
        assert_eq!(Axis::RightX.store_key(), "Rx");
        assert_eq!(Axis::RightY.store_key(), "Ry");
    }

    #[test]
    fn test_axis_polarity_is_opposite_per_stick() {
        assert!(Axis::LeftX.is_inverted());
        assert!(!Axis::LeftY.is_inverted());
        assert!(Axis::RightX.is_inverted());
        assert!(!Axis::RightY.is_inverted());
    }

    #[test]
    fn test_axis_short_name_roundtrip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_short_name(axis.short_name()), Some(axis));
        }
        assert_eq!(Axis::from_short_name("Lx"), Some(Axis::LeftX));
        assert_eq!(Axis::from_short_name(""), None);
    }

    // ==================== RawSample Tests ====================

    #[test]
    fn test_raw_sample_accessors() {
        let mut sample = RawSample::new(1, 2, 3, 4);
        assert_eq!(sample.get(Axis::LeftX), 1);
        assert_eq!(sample.get(Axis::RightY), 4);

        sample.set(Axis::LeftY, 20);
        assert_eq!(sample, RawSample::new(1, 20, 3, 4));
        assert_eq!(RawSample::splat(7), RawSample::new(7, 7, 7, 7));
    }

    // ==================== Averaging Tests ====================

    #[test]
    fn test_average_truncates() {
        let mut source = ScriptedSource::new([
            vec![10, 11],
            vec![0, 1, 1],
            vec![4095],
            vec![100, 101, 101, 101],
        ]);

        let sample = average_reads(&mut source, 4, || {});

        assert_eq!(sample.get(Axis::LeftX), 10); // 42 / 4 = 10.5
        assert_eq!(sample.get(Axis::LeftY), 0); // 2 / 4 = 0.5
        assert_eq!(sample.get(Axis::RightX), 4095);
        assert_eq!(sample.get(Axis::RightY), 100); // 403 / 4 = 100.75
    }

    #[test]
    fn test_average_reads_interleaved() {
        let mut source = MockSampleSource::new();
        let mut seq = Sequence::new();

        for _ in 0..2 {
            for axis in Axis::ALL {
                source
                    .expect_read()
                    .withf(move |a| *a == axis)
                    .times(1)
                    .in_sequence(&mut seq)
                    .return_const(1000);
            }
        }

        let sample = average_reads(&mut source, 2, || {});
        assert_eq!(sample, RawSample::splat(1000));
    }

    #[test]
    fn test_average_runs_hook_per_round() {
        let mut source = SimulatedAdc::new([0; 4], 0);
        let mut rounds = 0;

        average_reads(&mut source, 7, || rounds += 1);
        assert_eq!(rounds, 7);
    }

    #[test]
    fn test_average_zero_count_is_zero() {
        let mut source = SimulatedAdc::new([2048; 4], 0);
        assert_eq!(average_reads(&mut source, 0, || {}), RawSample::default());
    }

    // ==================== Sampler Tests ====================

    #[test]
    fn test_sampler_reads_window() {
        let mut source = MockSampleSource::new();
        source.expect_read().times(4 * DEFAULT_SAMPLE_COUNT).return_const(2048);

        let mut sampler = Sampler::new(source, DEFAULT_SAMPLE_COUNT);
        assert_eq!(sampler.sample(), RawSample::splat(2048));
    }

    #[test]
    fn test_sampler_minimum_window() {
        let sampler = Sampler::new(SimulatedAdc::new([0; 4], 0), 0);
        assert_eq!(sampler.sample_count(), 1);
    }

    #[test]
    fn test_sampler_suppresses_noise() {
        let adc = SimulatedAdc::new([2048, 2048, 2048, 2048], 40);
        let mut sampler = Sampler::new(adc, DEFAULT_SAMPLE_COUNT);

        let sample = sampler.sample();
        for axis in Axis::ALL {
            assert!((sample.get(axis) - 2048).abs() <= 40);
        }
    }

    // ==================== SimulatedAdc Tests ====================

    #[test]
    fn test_simulated_adc_without_noise_is_exact() {
        let mut adc = SimulatedAdc::new([1, 2, 3, 4], 0);
        assert_eq!(adc.read(Axis::LeftX), 1);
        assert_eq!(adc.read(Axis::RightY), 4);
    }

    #[test]
    fn test_simulated_adc_jitter_bounded_and_clamped() {
        let mut adc = SimulatedAdc::new([0, 4095, 2000, 2000], 25);
        for _ in 0..500 {
            let lx = adc.read(Axis::LeftX);
            let ly = adc.read(Axis::LeftY);
            let rx = adc.read(Axis::RightX);
            assert!((0..=25).contains(&lx));
            assert!((4070..=4095).contains(&ly));
            assert!((1975..=2025).contains(&rx));
        }
    }

    #[test]
    fn test_simulated_adc_set_position() {
        let mut adc = SimulatedAdc::new([2048; 4], 0).with_input_max(1023);
        adc.set_position(Axis::LeftY, 5000);
        assert_eq!(adc.position(Axis::LeftY), 5000);
        assert_eq!(adc.read(Axis::LeftY), 1023);
    }
}
