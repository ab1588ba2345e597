//! Rate-limited raw vs. mapped debug output for the left stick.

use std::time::{Duration, Instant};
use tracing::info;

use super::conditioner::StickOutput;
use super::sampler::{Axis, RawSample};

/// Default minimum spacing between diagnostic lines.
pub const DEFAULT_DIAGNOSTIC_INTERVAL_MS: u64 = 300;

/// Period gate: lets at most one emission through per interval.
#[derive(Debug, Clone)]
pub struct DiagnosticThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl DiagnosticThrottle {
    /// Creates a gate that opens once more than `interval` has passed.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Returns `true` (and restarts the period) if an emission is due at `now`.
    ///
    /// The first call always passes.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Logs the left stick at INFO if the gate is open at `now`.
    pub fn emit(&mut self, now: Instant, raw: &RawSample, output: &StickOutput) -> bool {
        if !self.ready(now) {
            return false;
        }
        info!("{}", describe_left_stick(raw, output));
        true
    }
}

/// Formats the left stick as `LX [Raw:r -> Map:m]  |  LY [Raw:r -> Map:m]`.
#[must_use]
pub fn describe_left_stick(raw: &RawSample, output: &StickOutput) -> String {
    format!(
        "LX [Raw:{} -> Map:{}]  |  LY [Raw:{} -> Map:{}]",
        raw.get(Axis::LeftX),
        output.left.x,
        raw.get(Axis::LeftY),
        output.left.y
    )
}
