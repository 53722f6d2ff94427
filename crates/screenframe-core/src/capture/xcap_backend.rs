//! Live backend using xcap
//!
//! - Monitor enumeration and region grabs via `xcap::Monitor`
//! - Window lookup by exact title via `xcap::Window`
//! - Foreground focus via Win32 `SetForegroundWindow` (Windows only)
//!
//! xcap monitor handles are not shareable across threads, so
//! [`XcapDisplay`] is opened per thread through [`XcapFactory`] and a
//! [`super::ThreadLocalHandle`]. Grabs come back as RGBA.

use super::traits::{DisplayService, HandleFactory, WindowService};
use crate::{
    error::{FrameError, FrameResult},
    model::{MonitorDescriptor, PixelLayout, RawPixels, ScreenRect, WindowRect},
};

/// Opens one [`XcapDisplay`] per thread
#[derive(Debug, Clone, Copy, Default)]
pub struct XcapFactory;

impl HandleFactory for XcapFactory {
    type Handle = XcapDisplay;

    fn open(&self) -> FrameResult<XcapDisplay> {
        XcapDisplay::open()
    }
}

/// Monitors enumerated once when the handle is opened
pub struct XcapDisplay {
    monitors: Vec<xcap::Monitor>,
}

impl std::fmt::Debug for XcapDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XcapDisplay")
            .field("monitors", &self.monitors.len())
            .finish()
    }
}

impl XcapDisplay {
    /// Enumerates monitors on the calling thread
    ///
    /// # Errors
    ///
    /// - [`FrameError::CaptureFailed`] - xcap could not enumerate monitors
    pub fn open() -> FrameResult<Self> {
        let monitors = xcap::Monitor::all().map_err(|e| {
            tracing::error!("xcap failed to enumerate monitors: {}", e);
            FrameError::capture_failed(format!("monitor enumeration failed: {e}"))
        })?;
        tracing::debug!("xcap reported {} monitors", monitors.len());
        Ok(Self { monitors })
    }

    fn describe(index: usize, monitor: &xcap::Monitor) -> FrameResult<MonitorDescriptor> {
        let query = |e: xcap::XCapError| {
            FrameError::capture_failed(format!("monitor {index} geometry query failed: {e}"))
        };
        Ok(MonitorDescriptor::new(
            index,
            monitor.x().map_err(query)?,
            monitor.y().map_err(query)?,
            monitor.width().map_err(query)?,
            monitor.height().map_err(query)?,
        ))
    }
}

impl DisplayService for XcapDisplay {
    fn list_monitors(&self) -> FrameResult<Vec<MonitorDescriptor>> {
        let physical = self
            .monitors
            .iter()
            .enumerate()
            .map(|(i, m)| Self::describe(i + 1, m))
            .collect::<FrameResult<Vec<_>>>()?;

        let mut monitors = Vec::with_capacity(physical.len() + 1);
        monitors.push(MonitorDescriptor::aggregate_of(&physical));
        monitors.extend(physical);
        Ok(monitors)
    }

    fn grab_pixels(&self, monitor_index: usize, rect: ScreenRect) -> FrameResult<RawPixels> {
        let monitor = monitor_index
            .checked_sub(1)
            .and_then(|i| self.monitors.get(i))
            .ok_or(FrameError::MonitorNotFound {
                index: monitor_index,
            })?;
        let origin = Self::describe(monitor_index, monitor)?;

        // xcap regions are relative to the monitor, not the desktop
        let (x, y) = (rect.left - origin.left, rect.top - origin.top);
        if x < 0 || y < 0 || rect.width <= 0 || rect.height <= 0 {
            return Err(FrameError::invalid_region(
                rect,
                format!("outside monitor {monitor_index} at ({}, {})", origin.left, origin.top),
            ));
        }

        let image = monitor
            .capture_region(x as u32, y as u32, rect.width as u32, rect.height as u32)
            .map_err(|e| {
                tracing::warn!("xcap region capture failed for {}: {}", rect, e);
                FrameError::capture_failed(e)
            })?;

        Ok(RawPixels {
            width:  image.width(),
            height: image.height(),
            layout: PixelLayout::Rgba8,
            data:   image.into_raw(),
        })
    }
}

/// Window lookup through xcap, focus through Win32
#[derive(Debug, Clone, Copy, Default)]
pub struct XcapWindows;

impl WindowService for XcapWindows {
    fn find_window_rect(&self, title: &str) -> Option<WindowRect> {
        let windows = match xcap::Window::all() {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!("xcap failed to enumerate windows: {}", e);
                return None;
            }
        };

        let window = windows
            .into_iter()
            .find(|w| w.title().map(|t| t == title).unwrap_or(false))?;

        let geometry = (|| -> Result<_, xcap::XCapError> {
            Ok((window.x()?, window.y()?, window.width()?, window.height()?))
        })();
        match geometry {
            Ok((x, y, width, height)) => {
                Some(WindowRect::new(x, y, x + width as i32, y + height as i32))
            }
            Err(e) => {
                tracing::warn!("Window '{}' found but its geometry is unavailable: {}", title, e);
                None
            }
        }
    }

    fn bring_to_foreground(&self, title: &str) -> FrameResult<()> {
        focus::bring_to_foreground(title)
    }
}

#[cfg(target_os = "windows")]
mod focus {
    use std::{ffi::OsStr, os::windows::ffi::OsStrExt, ptr};

    use windows_sys::Win32::UI::WindowsAndMessaging::{
        FindWindowW, GetForegroundWindow, SW_NORMAL, SetForegroundWindow, ShowWindow,
    };

    use crate::error::{FrameError, FrameResult};

    pub(super) fn bring_to_foreground(title: &str) -> FrameResult<()> {
        let wide: Vec<u16> = OsStr::new(title).encode_wide().chain(Some(0)).collect();

        // SAFETY: `wide` is NUL-terminated and outlives the call
        let hwnd = unsafe { FindWindowW(ptr::null(), wide.as_ptr()) };
        if hwnd.is_null() {
            return Err(FrameError::WindowNotFound {
                title: title.to_string(),
            });
        }

        // SAFETY: plain Win32 calls on a handle FindWindowW just returned
        unsafe {
            if GetForegroundWindow() == hwnd {
                tracing::debug!("'{}' already has focus", title);
                return Ok(());
            }
            ShowWindow(hwnd, SW_NORMAL);
            if SetForegroundWindow(hwnd) == 0 {
                return Err(FrameError::capture_failed(format!(
                    "SetForegroundWindow refused to focus '{title}'"
                )));
            }
        }

        tracing::debug!("Brought '{}' to the foreground", title);
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
mod focus {
    use crate::error::{FrameError, FrameResult};

    pub(super) fn bring_to_foreground(title: &str) -> FrameResult<()> {
        tracing::warn!("Cannot focus '{}': window focus is only implemented on Windows", title);
        Err(FrameError::BackendNotAvailable {
            operation: "window focus".to_string(),
        })
    }
}

#[cfg(all(test, feature = "live-tests"))]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a real display"]
    fn test_live_monitor_enumeration() {
        let display = XcapDisplay::open().unwrap();
        let monitors = display.list_monitors().unwrap();
        assert!(monitors[0].is_aggregate());
        assert!(monitors.len() >= 2);
    }

    #[test]
    #[ignore = "requires a real display"]
    fn test_live_grab_matches_requested_size() {
        let display = XcapDisplay::open().unwrap();
        let monitor = display.list_monitors().unwrap()[1];
        let raw = display
            .grab_pixels(1, ScreenRect {
                left:   monitor.left,
                top:    monitor.top,
                width:  64,
                height: 32,
            })
            .unwrap();
        assert_eq!((raw.width, raw.height), (64, 32));
        assert_eq!(raw.data.len(), raw.expected_len());
    }
}
