//! # Calibration Store Module
//!
//! Key/value persistence for stick calibration across power cycles.
//!
//! The conditioner only ever talks to storage through [`CalibrationStore`],
//! so the pipeline can be driven from a [`MemoryStore`] in tests and from a
//! [`FileStore`] in the binary.
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `Lx` | Left stick X center |
//! | `Ly` | Left stick Y center |
//! | `Rx` | Right stick X center |
//! | `Ry` | Right stick Y center |
//! | `dz` | Inner deadzone threshold |

mod file;

pub use file::FileStore;

use std::collections::BTreeMap;
use tracing::warn;

use crate::error::Result;

/// Store key for the inner deadzone threshold.
pub const KEY_INNER_DEADZONE: &str = "dz";

/// Persistent integer key/value storage for calibration data.
#[cfg_attr(test, mockall::automock)]
pub trait CalibrationStore {
    /// Reads the value stored under `key`, `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<i32>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: i32) -> Result<()>;
}

/// Reads `key` from the store, falling back to `default` when the key is
/// absent or the read fails.
///
/// # Examples
///
/// ```
/// use stick_conditioner::store::{read_or_default, CalibrationStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// assert_eq!(read_or_default(&store, "dz", 150), 150);
///
/// store.put("dz", 90)?;
/// assert_eq!(read_or_default(&store, "dz", 150), 90);
/// # Ok::<(), stick_conditioner::error::ConditionerError>(())
/// ```
pub fn read_or_default<S: CalibrationStore + ?Sized>(store: &S, key: &str, default: i32) -> i32 {
    match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("Failed to read calibration key '{}', using default {}: {}", key, default, e);
            default
        }
    }
}

/// Volatile in-memory store.
///
/// Used in tests and for runs where calibration should not outlive the
/// process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, i32>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CalibrationStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<i32>> {
        Ok(self.values.get(key).copied())
    }

    fn put(&mut self, key: &str, value: i32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
