//! # Axis Mapper Module
//!
//! Converts an averaged raw reading and its calibrated center into a HID axis
//! value.
//!
//! ## Pipeline
//!
//! 1. **Inner deadzone**: readings closer to the center than the threshold
//!    report logical zero (`output_max / 2`).
//! 2. **Outer deadzone**: readings are clamped to
//!    `outer_deadzone..=input_max - outer_deadzone`, discarding rail noise.
//! 3. **Split-range interpolation**: the lower and upper halves are mapped
//!    with separate linear segments joined at the calibrated center, so a
//!    center that is off the numeric midpoint does not bias one direction.
//!
//! All arithmetic is integer and truncates toward zero.
//!
//! ## Usage
//!
//! ```
//! use stick_conditioner::sticks::mapper::AxisRange;
//!
//! let range = AxisRange::default(); // 12-bit in, 0..=32767 out
//!
//! // Inside the inner deadzone
//! assert_eq!(range.map_axis(2100, 2048, 150, false), 16383);
//!
//! // Full deflection past the outer deadzone
//! assert_eq!(range.map_axis(4095, 2048, 150, false), 32767);
//! assert_eq!(range.map_axis(4095, 2048, 150, true), 0);
//! ```

/// Upper rail of the 12-bit stick ADC.
pub const DEFAULT_INPUT_MAX: i32 = 4095;
/// Upper bound of the HID axis (signed 16-bit logical range, unsigned domain).
pub const DEFAULT_OUTPUT_MAX: i32 = 32767;
/// Margin excluded at both ends of the raw travel.
pub const DEFAULT_OUTER_DEADZONE: i32 = 50;

/// Linearly maps `x` from `in_lo..=in_hi` onto `out_lo..=out_hi`.
///
/// Division truncates toward zero. Returns `None` for a zero-width input
/// domain.
///
/// # Examples
///
/// ```
/// use stick_conditioner::sticks::mapper::map_range;
///
/// assert_eq!(map_range(5, 0, 10, 0, 100), Some(50));
/// assert_eq!(map_range(5, 0, 10, 100, 0), Some(50));
/// assert_eq!(map_range(5, 5, 5, 0, 100), None);
/// ```
#[must_use]
pub fn map_range(x: i32, in_lo: i32, in_hi: i32, out_lo: i32, out_hi: i32) -> Option<i32> {
    let span = i64::from(in_hi) - i64::from(in_lo);
    if span == 0 {
        return None;
    }
    let scaled = (i64::from(x) - i64::from(in_lo)) * (i64::from(out_hi) - i64::from(out_lo)) / span;
    Some((scaled + i64::from(out_lo)) as i32)
}

/// Raw and output ranges shared by every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    /// Largest raw reading (`0..=input_max`).
    pub input_max: i32,
    /// Largest output value (`0..=output_max`).
    pub output_max: i32,
    /// Margin clamped off both ends of the raw range.
    pub outer_deadzone: i32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            input_max: DEFAULT_INPUT_MAX,
            output_max: DEFAULT_OUTPUT_MAX,
            outer_deadzone: DEFAULT_OUTER_DEADZONE,
        }
    }
}

impl AxisRange {
    /// Creates a range description.
    #[must_use]
    pub fn new(input_max: i32, output_max: i32, outer_deadzone: i32) -> Self {
        Self {
            input_max,
            output_max,
            outer_deadzone,
        }
    }

    /// Midpoint of the raw range, used as the uncalibrated center.
    #[must_use]
    pub fn input_mid(&self) -> i32 {
        self.input_max / 2
    }

    /// Logical zero of the output axis.
    #[must_use]
    pub fn output_mid(&self) -> i32 {
        self.output_max / 2
    }

    /// Lowest raw value that is mapped; anything below is clamped up to it.
    #[must_use]
    pub fn usable_min(&self) -> i32 {
        self.outer_deadzone
    }

    /// Highest raw value that is mapped; anything above is clamped down to it.
    #[must_use]
    pub fn usable_max(&self) -> i32 {
        self.input_max - self.outer_deadzone
    }

    /// Maps one raw axis reading to its output value.
    ///
    /// # Arguments
    ///
    /// * `raw` - Averaged raw reading
    /// * `center` - Calibrated rest position for this axis
    /// * `inner_deadzone` - Readings with `|raw - center| < inner_deadzone` report center
    /// * `invert` - When set the output falls from `output_max` to 0 as `raw` rises
    ///
    /// # Returns
    ///
    /// Output value in `0..=output_max`. A zero-width half (center sitting on
    /// the outer deadzone boundary) contains only the center, which maps to
    /// `output_max / 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_conditioner::sticks::mapper::AxisRange;
    ///
    /// let range = AxisRange::default();
    ///
    /// // Off-center calibration: both halves still reach the rails
    /// assert_eq!(range.map_axis(50, 1500, 0, false), 0);
    /// assert_eq!(range.map_axis(1500, 1500, 0, false), 16383);
    /// assert_eq!(range.map_axis(4045, 1500, 0, false), 32767);
    /// ```
    #[must_use]
    pub fn map_axis(&self, raw: i32, center: i32, inner_deadzone: i32, invert: bool) -> i32 {
        let mid = self.output_mid();

        if (i64::from(raw) - i64::from(center)).abs() < i64::from(inner_deadzone) {
            return mid;
        }

        let (out_min, out_max) = if invert {
            (self.output_max, 0)
        } else {
            (0, self.output_max)
        };

        let lo = self.usable_min();
        let hi = self.usable_max();
        let value = raw.max(lo).min(hi);

        if value <= center {
            map_range(value, lo, center, out_min, mid).unwrap_or(mid)
        } else {
            map_range(value, center, hi, mid, out_max).unwrap_or(mid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: i32 = 2048;
    const DZ: i32 = 150;

    fn range() -> AxisRange {
        AxisRange::default()
    }

    // ==================== map_range Tests ====================

    #[test]
    fn test_map_range_endpoints() {
        assert_eq!(map_range(50, 50, 2048, 0, 16383), Some(0));
        assert_eq!(map_range(2048, 50, 2048, 0, 16383), Some(16383));
    }

    #[test]
    fn test_map_range_truncates_toward_zero() {
        // -15564800 / 1998 = -7790.19 -> -7790
        assert_eq!(map_range(1000, 50, 2048, 32767, 16383), Some(24977));
        // 15563850 / 1998 = 7789.71 -> 7789
        assert_eq!(map_range(1000, 50, 2048, 0, 16383), Some(7789));
    }

    #[test]
    fn test_map_range_zero_width() {
        assert_eq!(map_range(50, 50, 50, 0, 16383), None);
    }

    // ==================== Reference Values ====================

    #[test]
    fn test_center_maps_to_midpoint() {
        assert_eq!(range().map_axis(CENTER, CENTER, DZ, false), 16383);
        assert_eq!(range().map_axis(CENTER, CENTER, DZ, true), 16383);
    }

    #[test]
    fn test_inside_deadzone_maps_to_midpoint() {
        assert_eq!(range().map_axis(2100, CENTER, DZ, false), 16383);
        assert_eq!(range().map_axis(2100, CENTER, DZ, true), 16383);
        assert_eq!(range().map_axis(1899, CENTER, DZ, true), 16383);
    }

    #[test]
    fn test_deadzone_boundary_is_exclusive() {
        // |2198 - 2048| = 150 is not < 150, so it is mapped
        assert_eq!(range().map_axis(2198, CENTER, DZ, false), 17613);
        assert_eq!(range().map_axis(2197, CENTER, DZ, false), 16383);
    }

    #[test]
    fn test_full_deflection_inverted() {
        assert_eq!(range().map_axis(4095, CENTER, DZ, true), 0);
        assert_eq!(range().map_axis(0, CENTER, DZ, true), 32767);
    }

    #[test]
    fn test_full_deflection_direct() {
        assert_eq!(range().map_axis(4095, CENTER, DZ, false), 32767);
        assert_eq!(range().map_axis(0, CENTER, DZ, false), 0);
    }

    #[test]
    fn test_partial_deflection_values() {
        assert_eq!(range().map_axis(3000, CENTER, DZ, true), 8573);
        assert_eq!(range().map_axis(1000, CENTER, DZ, true), 24977);
        assert_eq!(range().map_axis(3000, CENTER, DZ, false), 24193);
        assert_eq!(range().map_axis(1000, CENTER, DZ, false), 7789);
    }

    #[test]
    fn test_outer_deadzone_clamps_rails() {
        for raw in [4045, 4046, 4070, 4095] {
            assert_eq!(range().map_axis(raw, CENTER, DZ, false), 32767);
        }
        for raw in [-10, 0, 25, 50] {
            assert_eq!(range().map_axis(raw, CENTER, DZ, false), 0);
        }
    }

    #[test]
    fn test_asymmetric_center() {
        // Center well below the numeric midpoint still splits evenly
        assert_eq!(range().map_axis(1000, 1500, 0, false), 10733);
        assert_eq!(range().map_axis(3000, 1500, 0, false), 26039);
        assert_eq!(range().map_axis(1500, 1500, 0, false), 16383);
    }

    // ==================== Degenerate Centers ====================

    #[test]
    fn test_center_on_lower_boundary() {
        // Lower half has zero width: its only point is the center
        assert_eq!(range().map_axis(50, 50, 0, false), 16383);
        assert_eq!(range().map_axis(50, 50, 0, true), 16383);
        assert_eq!(range().map_axis(10, 50, 0, true), 16383);
        assert_eq!(range().map_axis(4095, 50, 0, false), 32767);
        assert_eq!(range().map_axis(4095, 50, 0, true), 0);
    }

    #[test]
    fn test_center_on_upper_boundary() {
        assert_eq!(range().map_axis(4045, 4045, 0, false), 16383);
        assert_eq!(range().map_axis(4095, 4045, 0, false), 16383);
        assert_eq!(range().map_axis(50, 4045, 0, false), 0);
    }

    #[test]
    fn test_center_outside_usable_range() {
        assert_eq!(range().map_axis(50, 0, 0, false), 16585);
        assert_eq!(range().map_axis(4045, 0, 0, false), 32767);
        assert_eq!(range().map_axis(4045, 4095, 0, false), 16180);
    }

    // ==================== Properties ====================

    #[test]
    fn test_deadzone_holds_for_all_centers() {
        for center in (0..=4095).step_by(97) {
            for dz in [0, 1, 40, 150, 600] {
                for offset in -(dz - 1)..dz {
                    assert_eq!(
                        range().map_axis(center + offset, center, dz, false),
                        16383,
                        "center {} dz {} offset {}",
                        center,
                        dz,
                        offset
                    );
                }
            }
        }
    }

    #[test]
    fn test_range_containment() {
        for center in (0..=4095).step_by(131) {
            for raw in (-100..=4200).step_by(7) {
                for invert in [false, true] {
                    let out = range().map_axis(raw, center, DZ, invert);
                    assert!((0..=32767).contains(&out), "raw {} center {} -> {}", raw, center, out);
                }
            }
        }
    }

    #[test]
    fn test_monotonic_per_half() {
        for center in [1200, 2048, 2600] {
            let mut prev_direct = i32::MIN;
            let mut prev_inverted = i32::MAX;
            for raw in 0..=4095 {
                let direct = range().map_axis(raw, center, DZ, false);
                let inverted = range().map_axis(raw, center, DZ, true);
                assert!(direct >= prev_direct, "direct not monotonic at {}", raw);
                assert!(inverted <= prev_inverted, "inverted not monotonic at {}", raw);
                prev_direct = direct;
                prev_inverted = inverted;
            }
        }
    }

    #[test]
    fn test_custom_range() {
        let range = AxisRange::new(1023, 255, 10);
        assert_eq!(range.input_mid(), 511);
        assert_eq!(range.output_mid(), 127);
        assert_eq!(range.usable_min(), 10);
        assert_eq!(range.usable_max(), 1013);
        assert_eq!(range.map_axis(1023, 511, 20, false), 255);
        assert_eq!(range.map_axis(0, 511, 20, false), 0);
    }
}
