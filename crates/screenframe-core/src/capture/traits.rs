//! Service traits at the OS boundary
//!
//! - [`WindowService`]: find, probe and focus the target window by title
//! - [`DisplayService`]: enumerate monitors and grab raw pixels
//! - [`HandleFactory`]: open a per-thread [`DisplayService`] handle

use crate::{
    error::FrameResult,
    model::{MonitorDescriptor, RawPixels, ScreenRect, WindowRect},
};

/// Window discovery and focus.
///
/// Lookups are by exact title. Enumeration failures are reported as "not
/// found" since the caller falls back to a default monitor either way.
pub trait WindowService: Send + Sync {
    /// Returns the rectangle of the window with exactly this title, if any
    fn find_window_rect(&self, title: &str) -> Option<WindowRect>;

    /// Returns true when a window with exactly this title exists
    fn is_window_present(&self, title: &str) -> bool {
        self.find_window_rect(title).is_some()
    }

    /// Brings the window to the foreground.
    ///
    /// Does nothing if the window already has focus.
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::WindowNotFound`] - no such window
    /// - [`crate::error::FrameError::BackendNotAvailable`] - focus is not
    ///   supported on this platform
    fn bring_to_foreground(&self, title: &str) -> FrameResult<()>;
}

/// Monitor enumeration and raw pixel grabs.
///
/// Implementations need not be `Send` or `Sync`: a handle is used only on
/// the thread that opened it (see [`super::ThreadLocalHandle`]).
pub trait DisplayService {
    /// Lists monitors; index 0 is the virtual desktop aggregate
    fn list_monitors(&self) -> FrameResult<Vec<MonitorDescriptor>>;

    /// Grabs one absolute desktop rectangle from the given monitor.
    ///
    /// Called exactly once per capture. The returned buffer's layout is
    /// whatever the backend produces natively.
    fn grab_pixels(&self, monitor_index: usize, rect: ScreenRect) -> FrameResult<RawPixels>;
}

/// Opens [`DisplayService`] handles, one per thread
pub trait HandleFactory: Send + Sync + 'static {
    /// Handle type produced by this factory
    type Handle: DisplayService + 'static;

    /// Opens a new handle for the calling thread
    fn open(&self) -> FrameResult<Self::Handle>;
}
