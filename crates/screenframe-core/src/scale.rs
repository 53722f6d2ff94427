//! Per-resolution calibration scale factors
//!
//! Template matching downstream was tuned at 3440x1440. Other resolutions
//! either have a hand-calibrated entry in the [`ScaleTable`] or fall back to
//! scaling proportionally against that reference.
//!
//! The table is persisted as a JSON object mapping `"WIDTHxHEIGHT"` keys to
//! `[scaleX, scaleY]` pairs. A missing or corrupt file is never fatal: the
//! built-in table is kept and a warning is logged.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Width at which the calibration scale is 1.0
pub const REFERENCE_WIDTH: f64 = 3440.0;

/// Height at which the calibration scale is 1.0
pub const REFERENCE_HEIGHT: f64 = 1440.0;

/// Default location of the calibration file
pub const DEFAULT_CALIBRATION_PATH: &str = "./configs/resolution.json";

/// Hand-tested scale factors shipped with the crate
static DEFAULT_ENTRIES: Lazy<BTreeMap<String, [f64; 2]>> = Lazy::new(|| {
    [
        ("1024x768", 0.39),
        ("1080x1080", 0.5),
        ("1280x800", 0.48),
        ("1280x1024", 0.5),
        ("1600x900", 0.6),
        ("1920x1080", 0.75),
        ("1920x1200", 0.73),
        ("1920x1440", 0.8),
        ("2560x1080", 0.75),
        ("2560x1440", 1.0),
        ("3440x1440", 1.0),
    ]
    .into_iter()
    .map(|(key, s)| (key.to_string(), [s, s]))
    .collect()
});

/// Calibration scale pair for one resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    /// Proportional scale against the 3440x1440 reference
    pub fn proportional(width: u32, height: u32) -> Self {
        Self {
            x: width as f64 / REFERENCE_WIDTH,
            y: height as f64 / REFERENCE_HEIGHT,
        }
    }
}

/// Formats the lookup key for a resolution, e.g. `"1920x1080"`
pub fn resolution_key(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

/// Mapping from resolution key to calibration scale
///
/// Owned by the screen frame that uses it; there is no process-wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleTable {
    entries: BTreeMap<String, [f64; 2]>,
}

impl Default for ScaleTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES.clone(),
        }
    }
}

impl ScaleTable {
    /// Creates an empty table (every lookup uses the proportional fallback)
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Resolves the scale for a resolution
    ///
    /// An exact key match wins; otherwise the proportional fallback is used.
    /// A miss is not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use screenframe_core::scale::ScaleTable;
    ///
    /// let table = ScaleTable::default();
    /// let scale = table.resolve(1920, 1080);
    /// assert_eq!((scale.x, scale.y), (0.75, 0.75));
    ///
    /// let scale = table.resolve(7680, 4320);
    /// assert_eq!((scale.x, scale.y), (7680.0 / 3440.0, 4320.0 / 1440.0));
    /// ```
    pub fn resolve(&self, width: u32, height: u32) -> Scale {
        match self.entries.get(&resolution_key(width, height)) {
            Some([x, y]) => Scale { x: *x, y: *y },
            None => {
                let scale = Scale::proportional(width, height);
                tracing::debug!(
                    "No scale entry for {}x{}, using proportional {:.3}, {:.3}",
                    width,
                    height,
                    scale.x,
                    scale.y
                );
                scale
            }
        }
    }

    /// Looks up an exact entry without falling back
    pub fn get(&self, width: u32, height: u32) -> Option<Scale> {
        self.entries
            .get(&resolution_key(width, height))
            .map(|[x, y]| Scale { x: *x, y: *y })
    }

    /// Adds or replaces the entry for a resolution
    pub fn insert(&mut self, width: u32, height: u32, scale: Scale) {
        self.entries.insert(resolution_key(width, height), [scale.x, scale.y]);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Scale)> {
        self.entries
            .iter()
            .map(|(key, [x, y])| (key.as_str(), Scale { x: *x, y: *y }))
    }

    /// Reads a table from a calibration file
    ///
    /// The file's entries replace the built-in table entirely, as the file
    /// is expected to have been written from a full table.
    ///
    /// # Errors
    ///
    /// - [`FrameError::ConfigLoad`] - file missing, unreadable, not JSON, or
    ///   an entry is not a pair of positive numbers
    pub fn load(path: &Path) -> FrameResult<Self> {
        let config_err = |reason: String| FrameError::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        };

        let data = fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let entries: BTreeMap<String, [f64; 2]> =
            serde_json::from_str(&data).map_err(|e| config_err(e.to_string()))?;

        if let Some((key, _)) = entries
            .iter()
            .find(|(_, [x, y])| !(x.is_finite() && y.is_finite() && *x > 0.0 && *y > 0.0))
        {
            return Err(config_err(format!("entry '{key}' must hold two positive numbers")));
        }

        tracing::debug!("Loaded {} scale entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Reads a table, keeping the built-in defaults if the file is unusable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("{}; using built-in scale table", e);
                Self::default()
            }
        }
    }

    /// Writes the whole table to a calibration file with 4-space indentation
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// - [`FrameError::Io`] - directory or file could not be written
    /// - [`FrameError::Serialization`] - table could not be encoded
    pub fn save(&self, path: &Path) -> FrameResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;

        fs::write(path, out)?;
        tracing::info!("Wrote {} scale entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}

/// The default calibration path as a `PathBuf`
pub fn default_calibration_path() -> PathBuf {
    PathBuf::from(DEFAULT_CALIBRATION_PATH)
}
