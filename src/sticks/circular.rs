//! # Circularizer Module
//!
//! Per-axis mapping gives each stick a square travel envelope, so a diagonal
//! can report up to √2 times the magnitude of a cardinal deflection. This
//! module pulls such points back onto the circle of radius `output_max / 2`
//! centered at `(output_max / 2, output_max / 2)`.
//!
//! Points already inside the circle are returned unchanged. The inside test
//! is done on doubled integer coordinates, so it is exact even though the
//! geometric center of an odd output range sits on a half step.
//!
//! ## Usage
//!
//! ```
//! use stick_conditioner::sticks::circular::circularize;
//!
//! // Corner is pulled inward
//! assert_eq!(circularize(32767, 0, 32767), (27968, 4799));
//!
//! // Centered stick is untouched
//! assert_eq!(circularize(16383, 16383, 32767), (16383, 16383));
//! ```

/// Conditioned X/Y output of one stick, each component in `0..=output_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputAxisPair {
    /// Horizontal axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
}

impl OutputAxisPair {
    /// Creates a pair from its components.
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the pair clamped to the circular envelope of `output_max`.
    #[must_use]
    pub fn circularized(self, output_max: i32) -> Self {
        let (x, y) = circularize(self.x, self.y, output_max);
        Self { x, y }
    }
}

/// Returns `true` if `(x, y)` lies within or on the output circle.
#[must_use]
pub fn is_within_circle(x: i32, y: i32, output_max: i32) -> bool {
    let dx = 2 * i64::from(x) - i64::from(output_max);
    let dy = 2 * i64::from(y) - i64::from(output_max);
    let r = i64::from(output_max);
    dx * dx + dy * dy <= r * r
}

/// Clamps an axis-mapped `(x, y)` pair to the circular envelope.
///
/// Outside points are scaled toward the center by `radius / magnitude` and
/// each component is truncated toward the center, which keeps the result on
/// or just inside the circle and makes the operation idempotent.
#[must_use]
pub fn circularize(x: i32, y: i32, output_max: i32) -> (i32, i32) {
    if is_within_circle(x, y, output_max) {
        return (x, y);
    }

    let center = f64::from(output_max) / 2.0;
    let radius = center;

    let dx = f64::from(x) - center;
    let dy = f64::from(y) - center;
    let scale = radius / dx.hypot(dy);

    let mut px = toward_center(dx * scale, center);
    let mut py = toward_center(dy * scale, center);

    // Float rounding can leave a point a hair outside
    while !is_within_circle(px, py, output_max) {
        let ox = (2 * i64::from(px) - i64::from(output_max)).abs();
        let oy = (2 * i64::from(py) - i64::from(output_max)).abs();
        if ox >= oy {
            px = step_inward(px, output_max);
        } else {
            py = step_inward(py, output_max);
        }
    }

    (px, py)
}

fn toward_center(offset: f64, center: f64) -> i32 {
    let value = center + offset;
    let truncated = if offset >= 0.0 { value.floor() } else { value.ceil() };
    truncated as i32
}

fn step_inward(value: i32, output_max: i32) -> i32 {
    let doubled = 2 * i64::from(value);
    let max = i64::from(output_max);
    if doubled > max {
        value - 1
    } else if doubled < max {
        value + 1
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: i32 = 32767;
    const RADIUS: f64 = 16383.5;

    fn distance(x: i32, y: i32) -> f64 {
        (f64::from(x) - RADIUS).hypot(f64::from(y) - RADIUS)
    }

    #[test]
    fn test_corners_pulled_onto_circle() {
        assert_eq!(circularize(32767, 0, MAX), (27968, 4799));
        assert_eq!(circularize(0, 32767, MAX), (4799, 27968));
        assert_eq!(circularize(0, 0, MAX), (4799, 4799));
        assert_eq!(circularize(32767, 32767, MAX), (27968, 27968));
    }

    #[test]
    fn test_corner_lands_within_one_step_of_circle() {
        let (x, y) = circularize(32767, 0, MAX);
        let d = distance(x, y);
        assert!(d <= RADIUS);
        assert!(RADIUS - d < 1.0, "distance {} too far inside", d);
    }

    #[test]
    fn test_center_unchanged() {
        assert_eq!(circularize(16383, 16383, MAX), (16383, 16383));
        assert_eq!(circularize(16384, 16383, MAX), (16384, 16383));
    }

    #[test]
    fn test_cardinal_full_deflection_loses_one_step() {
        // Logical zero (16383) sits half a step below the geometric center
        assert!(!is_within_circle(32767, 16383, MAX));
        assert_eq!(circularize(32767, 16383, MAX), (32766, 16384));
        assert_eq!(circularize(16383, 0, MAX), (16384, 1));
    }

    #[test]
    fn test_inside_points_returned_exactly() {
        for x in (0..=MAX).step_by(509) {
            for y in (0..=MAX).step_by(577) {
                if distance(x, y) <= RADIUS - 1.0 {
                    assert_eq!(circularize(x, y, MAX), (x, y));
                }
            }
        }
    }

    #[test]
    fn test_containment_over_grid() {
        for x in (0..=MAX).step_by(257) {
            for y in (0..=MAX).step_by(263) {
                let (cx, cy) = circularize(x, y, MAX);
                assert!(is_within_circle(cx, cy, MAX), "({}, {}) -> ({}, {})", x, y, cx, cy);
                assert!(distance(cx, cy) <= RADIUS + 1e-9);
                assert!((0..=MAX).contains(&cx));
                assert!((0..=MAX).contains(&cy));
            }
        }
    }

    #[test]
    fn test_idempotent_over_grid() {
        for x in (0..=MAX).step_by(311) {
            for y in (0..=MAX).step_by(293) {
                let once = circularize(x, y, MAX);
                let twice = circularize(once.0, once.1, MAX);
                assert_eq!(once, twice, "not idempotent at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_direction_preserved() {
        let (x, y) = circularize(30000, 30000, MAX);
        assert_eq!(x, y);
        assert!(x > 16383);

        let (x, y) = circularize(32767, 24000, MAX);
        assert!(x > y);
        assert!(y > 16383);
    }

    #[test]
    fn test_small_output_range() {
        assert_eq!(circularize(255, 255, 255), (217, 217));
        assert!(is_within_circle(217, 217, 255));
        assert_eq!(circularize(127, 127, 255), (127, 127));
    }

    #[test]
    fn test_output_axis_pair_circularized() {
        let pair = OutputAxisPair::new(32767, 0).circularized(MAX);
        assert_eq!(pair, OutputAxisPair::new(27968, 4799));
    }
}
