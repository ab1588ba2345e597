//! # Buttons Module
//!
//! Fixed-threshold debouncing for the digital buttons and the D-pad.
//!
//! A raw reading that differs from the previous raw reading restarts the
//! debounce timer. Once a reading has been stable for longer than the
//! threshold it becomes the reported pressed state.
//!
//! ## Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use stick_conditioner::buttons::Debouncer;
//!
//! let mut button = Debouncer::new(Duration::from_millis(10));
//! let t0 = Instant::now();
//!
//! button.update(true, t0);
//! assert!(!button.is_pressed()); // still bouncing
//!
//! button.update(true, t0 + Duration::from_millis(11));
//! assert!(button.is_pressed());
//! ```

use std::time::{Duration, Instant};

/// Default debounce threshold.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// HID button numbers of the standard face and stick buttons.
///
/// | Button | HID |
/// |--------|-----|
/// | Action down (A / Cross) | 1 |
/// | Action right (B / Circle) | 2 |
/// | Action left (X / Square) | 4 |
/// | Action up (Y / Triangle) | 5 |
/// | L3 | 14 |
/// | R3 | 15 |
pub const STANDARD_HID_BUTTONS: [u8; 6] = [1, 2, 4, 5, 14, 15];

/// Debounce state machine for one button.
#[derive(Debug, Clone)]
pub struct Debouncer {
    threshold: Duration,
    pressed: bool,
    last_reading: bool,
    last_change: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Creates a released button with the given threshold.
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed: false,
            last_reading: false,
            last_change: None,
        }
    }

    /// Feeds one raw reading (`true` = pressed) taken at `now`.
    pub fn update(&mut self, reading: bool, now: Instant) {
        if reading != self.last_reading {
            self.last_change = Some(now);
        }

        let stable = self
            .last_change
            .map_or(true, |changed| now.saturating_duration_since(changed) > self.threshold);
        if stable {
            self.pressed = reading;
        }

        self.last_reading = reading;
    }

    /// Debounced state.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

/// Set of debounced buttons, each bound to a HID button number.
#[derive(Debug, Clone)]
pub struct ButtonBank {
    buttons: Vec<(u8, Debouncer)>,
}

impl ButtonBank {
    /// Creates a bank for the given HID button numbers (1..=32).
    #[must_use]
    pub fn new(hid_buttons: &[u8], threshold: Duration) -> Self {
        Self {
            buttons: hid_buttons
                .iter()
                .filter(|&&hid| (1..=32).contains(&hid))
                .map(|&hid| (hid, Debouncer::new(threshold)))
                .collect(),
        }
    }

    /// Bank of the [`STANDARD_HID_BUTTONS`] with the default threshold.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(&STANDARD_HID_BUTTONS, DEFAULT_DEBOUNCE)
    }

    /// Number of buttons in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Returns `true` if the bank has no buttons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Feeds one raw reading per button, in bank order.
    ///
    /// Extra readings are ignored; missing ones leave their buttons untouched.
    pub fn update(&mut self, readings: &[bool], now: Instant) {
        for ((_, button), &reading) in self.buttons.iter_mut().zip(readings) {
            button.update(reading, now);
        }
    }

    /// Pressed buttons as a HID bitmask (bit `n - 1` for button `n`).
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_conditioner::buttons::ButtonBank;
    ///
    /// let bank = ButtonBank::standard();
    /// assert_eq!(bank.pressed_mask(), 0);
    /// ```
    #[must_use]
    pub fn pressed_mask(&self) -> u32 {
        self.buttons
            .iter()
            .filter(|(_, button)| button.is_pressed())
            .fold(0, |mask, (hid, _)| mask | (1 << (hid - 1)))
    }
}

/// D-pad axis value when neither direction is held (or both are).
pub const DPAD_RELEASED: i32 = 0;
/// D-pad axis value for left / up.
pub const DPAD_NEGATIVE: i32 = -1;
/// D-pad axis value for right / down.
pub const DPAD_POSITIVE: i32 = 1;

/// HID hat switch value with no direction held.
pub const HAT_CENTERED: u8 = 0;
/// HID hat switch value for up; the rest follow clockwise up to 8 (up-left).
pub const HAT_UP: u8 = 1;

/// Four debounced direction switches reported as a HID hat switch.
///
/// | Direction | X | Y | Hat |
/// |-----------|---|---|-----|
/// | Up | 0 | -1 | 1 |
/// | Up-right | 1 | -1 | 2 |
/// | Right | 1 | 0 | 3 |
/// | Down-right | 1 | 1 | 4 |
/// | Down | 0 | 1 | 5 |
/// | Down-left | -1 | 1 | 6 |
/// | Left | -1 | 0 | 7 |
/// | Up-left | -1 | -1 | 8 |
///
/// Opposite directions held together cancel out.
#[derive(Debug, Clone, Default)]
pub struct Dpad {
    up: Debouncer,
    right: Debouncer,
    down: Debouncer,
    left: Debouncer,
}

impl Dpad {
    /// Creates a released D-pad with the given threshold.
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self {
            up: Debouncer::new(threshold),
            right: Debouncer::new(threshold),
            down: Debouncer::new(threshold),
            left: Debouncer::new(threshold),
        }
    }

    /// Feeds one raw reading per direction, in `[up, right, down, left]` order.
    pub fn update(&mut self, readings: [bool; 4], now: Instant) {
        let [up, right, down, left] = readings;
        self.up.update(up, now);
        self.right.update(right, now);
        self.down.update(down, now);
        self.left.update(left, now);
    }

    /// Debounced `(x, y)` in `-1..=1`, with Y growing downwards.
    #[must_use]
    pub fn axes(&self) -> (i32, i32) {
        let axis = |negative: &Debouncer, positive: &Debouncer| match (negative.is_pressed(), positive.is_pressed()) {
            (true, false) => DPAD_NEGATIVE,
            (false, true) => DPAD_POSITIVE,
            _ => DPAD_RELEASED,
        };
        (axis(&self.left, &self.right), axis(&self.up, &self.down))
    }

    /// Debounced state as a HID hat switch value.
    ///
    /// # Examples
    ///
    /// ```
    /// use stick_conditioner::buttons::{Dpad, HAT_CENTERED};
    ///
    /// assert_eq!(Dpad::default().hat(), HAT_CENTERED);
    /// ```
    #[must_use]
    pub fn hat(&self) -> u8 {
        match self.axes() {
            (0, -1) => HAT_UP,
            (1, -1) => HAT_UP + 1,
            (1, 0) => HAT_UP + 2,
            (1, 1) => HAT_UP + 3,
            (0, 1) => HAT_UP + 4,
            (-1, 1) => HAT_UP + 5,
            (-1, 0) => HAT_UP + 6,
            (-1, -1) => HAT_UP + 7,
            _ => HAT_CENTERED,
        }
    }
}
