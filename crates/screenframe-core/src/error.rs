//! Error types for screen framing and capture operations
//!
//! Every failure in this crate is either recoverable at construction time
//! (missing target window, unreadable calibration file), in which case it is
//! logged and a default is used, or it is reported per call as a
//! [`FrameError`]. Each variant carries enough context to explain what went
//! wrong and offers a remediation hint via [`FrameError::remediation_hint`].

use std::path::PathBuf;

/// Result type alias for framing and capture operations
pub type FrameResult<T> = Result<T, FrameError>;

/// Error type for screen framing and capture operations
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No window with the requested title exists
    #[error("Window not found: '{title}'")]
    WindowNotFound {
        /// Exact title that was searched for
        title: String,
    },

    /// The display service reported no selectable monitor
    #[error("No display monitor available (only the virtual desktop was reported)")]
    NoMonitor,

    /// A monitor index no longer exists (e.g. the display was disconnected)
    #[error("Monitor {index} is not available")]
    MonitorNotFound {
        /// Monitor index as reported by the display service
        index: usize,
    },

    /// A region has non-positive size or lies outside the source image
    #[error("Invalid region {rect}: {reason}")]
    InvalidRegion {
        /// Human readable rendering of the rejected rectangle
        rect:   String,
        /// Why the region was rejected
        reason: String,
    },

    /// The underlying pixel grab failed or produced an unusable buffer
    #[error("Screen capture failed: {reason}")]
    CaptureFailed {
        /// Backend-provided failure description
        reason: String,
    },

    /// The requested operation is not supported on this platform
    #[error("{operation} is not available on this platform")]
    BackendNotAvailable {
        /// Operation that was attempted
        operation: String,
    },

    /// The calibration file could not be read or parsed
    #[error("Failed to load calibration table from {}: {reason}", path.display())]
    ConfigLoad {
        /// Path of the calibration file
        path:   PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),
}

impl FrameError {
    /// Builds an [`FrameError::InvalidRegion`] from any displayable rectangle
    pub fn invalid_region(rect: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        FrameError::InvalidRegion {
            rect:   rect.to_string(),
            reason: reason.into(),
        }
    }

    /// Builds a [`FrameError::CaptureFailed`] from any displayable cause
    pub fn capture_failed(reason: impl std::fmt::Display) -> Self {
        FrameError::CaptureFailed {
            reason: reason.to_string(),
        }
    }

    /// Returns true if retrying the same call may succeed
    ///
    /// Capture failures never invalidate monitor, crop or scale state, so a
    /// transient OS failure can simply be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, FrameError::CaptureFailed { .. } | FrameError::MonitorNotFound { .. })
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use screenframe_core::error::FrameError;
    ///
    /// let error = FrameError::NoMonitor;
    /// assert!(error.remediation_hint().contains("display"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            FrameError::WindowNotFound { .. } => {
                "Start the target application, or check that the configured window title matches \
                 the title bar exactly."
            }
            FrameError::NoMonitor => {
                "No physical display was reported. Check that a display is connected and that the \
                 session has access to it."
            }
            FrameError::MonitorNotFound { .. } => {
                "The selected monitor disappeared. Reconnect the display or rebuild the screen \
                 frame to pick a new monitor."
            }
            FrameError::InvalidRegion { .. } => {
                "Regions must have left < right and top < bottom and must overlap the source \
                 image."
            }
            FrameError::CaptureFailed { .. } => {
                "The pixel grab failed. This is usually transient (display mode change, locked \
                 session); retry the capture."
            }
            FrameError::BackendNotAvailable { .. } => {
                "This operation is only implemented for some platforms. Use a still image for \
                 offline work."
            }
            FrameError::ConfigLoad { .. } => {
                "The calibration file is missing or malformed. The built-in scale table is used; \
                 run `screenframe-cli write-scales` to regenerate the file."
            }
            FrameError::Io(_) => "An I/O error occurred. Check file permissions and disk space.",
            FrameError::Serialization(_) => {
                "The calibration table must be a JSON object of \"WIDTHxHEIGHT\": [scaleX, scaleY]."
            }
            FrameError::Image(_) => "Image processing failed. Ensure the image data is valid.",
        }
    }
}
