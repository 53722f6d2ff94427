//! Target window and monitor selection
//!
//! The capture monitor is the one whose top-left corner coincides with the
//! target window's top-left corner, which is where a fullscreen or
//! borderless window sits. When the window is missing or is not aligned
//! with any monitor origin, the first physical monitor is used.

use super::traits::{DisplayService, WindowService};
use crate::{
    error::{FrameError, FrameResult},
    model::MonitorDescriptor,
};

/// Finds the target window and the monitor it occupies
pub struct MonitorLocator<'a> {
    windows: &'a dyn WindowService,
    title:   &'a str,
}

impl<'a> MonitorLocator<'a> {
    /// Creates a locator for the window with exactly `title`
    pub fn new(windows: &'a dyn WindowService, title: &'a str) -> Self {
        Self { windows, title }
    }

    /// Selects the capture monitor.
    ///
    /// The virtual desktop aggregate (index 0) is never selected. When
    /// several monitors share the window's origin the first one wins.
    ///
    /// # Errors
    ///
    /// - [`FrameError::NoMonitor`] - no physical monitor was reported
    /// - Whatever [`DisplayService::list_monitors`] returns
    pub fn locate(&self, display: &dyn DisplayService) -> FrameResult<MonitorDescriptor> {
        let monitors: Vec<MonitorDescriptor> = display
            .list_monitors()?
            .into_iter()
            .filter(|m| !m.is_aggregate())
            .collect();
        let fallback = *monitors.first().ok_or(FrameError::NoMonitor)?;

        let Some(window) = self.windows.find_window_rect(self.title) else {
            tracing::error!(
                "Window '{}' not found, using monitor {} ({}x{})",
                self.title,
                fallback.index,
                fallback.width,
                fallback.height
            );
            return Ok(fallback);
        };

        match monitors
            .iter()
            .find(|m| m.left == window.left && m.top == window.top)
        {
            Some(monitor) => {
                tracing::debug!(
                    "Window '{}' is on monitor {} at ({}, {}), {}x{}",
                    self.title,
                    monitor.index,
                    monitor.left,
                    monitor.top,
                    monitor.width,
                    monitor.height
                );
                Ok(*monitor)
            }
            None => {
                tracing::warn!(
                    "Window '{}' at ({}, {}) is not aligned with any monitor, using monitor {}",
                    self.title,
                    window.left,
                    window.top,
                    fallback.index
                );
                Ok(fallback)
            }
        }
    }

    /// Returns true when the target window exists
    pub fn is_target_present(&self) -> bool {
        self.windows.is_window_present(self.title)
    }

    /// Brings the target window to the foreground unless it already is
    ///
    /// # Errors
    ///
    /// Whatever [`WindowService::bring_to_foreground`] returns.
    pub fn focus_target(&self) -> FrameResult<()> {
        self.windows.bring_to_foreground(self.title)
    }
}
