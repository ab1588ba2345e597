//! JSON file backed calibration store.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::CalibrationStore;
use crate::error::Result;

/// Calibration store persisted as a flat JSON object on disk.
///
/// Every [`put`](CalibrationStore::put) rewrites the whole file through a
/// temporary sibling and a rename, so a crash mid-write leaves either the old
/// or the new contents behind.
///
/// # Examples
///
/// ```no_run
/// use stick_conditioner::store::{CalibrationStore, FileStore};
///
/// let mut store = FileStore::open("calibration.json")?;
/// store.put("dz", 120)?;
/// # Ok::<(), stick_conditioner::error::ConditionerError>(())
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, i32>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. Unparseable contents are treated
    /// the same way (logged and ignored) so a damaged file degrades to the
    /// default calibration instead of blocking startup.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring unreadable calibration file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No calibration file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Calibration store opened at {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling `<file name>.tmp`, never equal to the store path itself.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn flush(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.temp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CalibrationStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<i32>> {
        Ok(self.values.get(key).copied())
    }

    fn put(&mut self, key: &str, value: i32) -> Result<()> {
        let previous = self.values.insert(key.to_string(), value);

        if let Err(e) = self.flush() {
            // Keep memory in line with what is actually on disk
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }
}
