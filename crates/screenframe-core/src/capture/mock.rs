//! Mock window and display services for testing
//!
//! [`MockDisplay`] and [`MockWindows`] implement the service traits without
//! touching the OS, so framing and capture can be exercised deterministically
//! in unit and integration tests.
//!
//! # Features
//!
//! - Configurable monitor list, window rectangles and foreground window
//! - Position-encoding pixel pattern or a solid fill, in any
//!   [`PixelLayout`]
//! - Error injection: failing grabs, disconnected monitors, truncated
//!   buffers, failing enumeration
//! - Grab log and handle-open counter shared by every clone
//!
//! # Examples
//!
//! ```
//! use screenframe_core::{
//!     capture::{DisplayService, MockDisplay},
//!     model::{MonitorDescriptor, ScreenRect},
//! };
//!
//! let display = MockDisplay::new(vec![MonitorDescriptor::new(1, 0, 0, 1920, 1080)]);
//! let monitors = display.list_monitors().unwrap();
//! assert!(monitors[0].is_aggregate());
//!
//! let raw = display
//!     .grab_pixels(1, ScreenRect { left: 0, top: 0, width: 4, height: 2 })
//!     .unwrap();
//! assert_eq!(raw.data.len(), raw.expected_len());
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{DisplayService, HandleFactory, WindowService};
use crate::{
    error::{FrameError, FrameResult},
    model::{MonitorDescriptor, PixelLayout, RawPixels, ScreenRect, WindowRect},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct DisplayState {
    grab_log:      Vec<(usize, ScreenRect)>,
    opened:        usize,
    failing_grabs: usize,
    disconnected:  Vec<usize>,
}

/// In-memory display service.
///
/// Cloning shares the grab log, open counter and injected failures, so a
/// test can keep one clone while the code under test opens others through
/// [`HandleFactory`].
#[derive(Debug, Clone)]
pub struct MockDisplay {
    monitors:  Vec<MonitorDescriptor>,
    layout:    PixelLayout,
    fill:      Option<[u8; 3]>,
    truncate:  bool,
    fail_list: bool,
    state:     Arc<Mutex<DisplayState>>,
}

impl MockDisplay {
    /// Creates a display with the given physical monitors.
    ///
    /// The aggregate (index 0) is synthesized by [`DisplayService::list_monitors`].
    pub fn new(monitors: Vec<MonitorDescriptor>) -> Self {
        Self {
            monitors,
            layout: PixelLayout::Bgra8,
            fill: None,
            truncate: false,
            fail_list: false,
            state: Arc::new(Mutex::new(DisplayState::default())),
        }
    }

    /// Single 1920x1080 monitor at the origin
    pub fn single_1080p() -> Self {
        Self::new(vec![MonitorDescriptor::new(1, 0, 0, 1920, 1080)])
    }

    /// Sets the layout grabs are returned in
    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Fills every grab with one RGB color instead of the position pattern
    pub fn with_fill(mut self, rgb: [u8; 3]) -> Self {
        self.fill = Some(rgb);
        self
    }

    /// Drops the last byte of every grab
    pub fn with_truncated_grabs(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Makes monitor enumeration fail
    pub fn with_failing_enumeration(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Makes the next `count` grabs fail with [`FrameError::CaptureFailed`]
    pub fn fail_next_grabs(&self, count: usize) {
        lock(&self.state).failing_grabs = count;
    }

    /// Makes grabs from `index` fail with [`FrameError::MonitorNotFound`]
    pub fn disconnect(&self, index: usize) {
        lock(&self.state).disconnected.push(index);
    }

    /// Every grab attempted so far, as `(monitor_index, rect)`
    pub fn grab_log(&self) -> Vec<(usize, ScreenRect)> {
        lock(&self.state).grab_log.clone()
    }

    /// Number of handles opened through [`HandleFactory::open`]
    pub fn opened_count(&self) -> usize {
        lock(&self.state).opened
    }

    fn pixel_at(&self, x: i32, y: i32) -> [u8; 3] {
        self.fill
            .unwrap_or([x.rem_euclid(256) as u8, y.rem_euclid(256) as u8, 128])
    }

    fn encode(&self, rgb: [u8; 3], out: &mut Vec<u8>) {
        let [r, g, b] = rgb;
        match self.layout {
            PixelLayout::Bgra8 => out.extend_from_slice(&[b, g, r, 255]),
            PixelLayout::Rgba8 => out.extend_from_slice(&[r, g, b, 255]),
            PixelLayout::Bgr8 => out.extend_from_slice(&[b, g, r]),
            PixelLayout::Rgb8 => out.extend_from_slice(&[r, g, b]),
        }
    }
}

impl DisplayService for MockDisplay {
    fn list_monitors(&self) -> FrameResult<Vec<MonitorDescriptor>> {
        if self.fail_list {
            return Err(FrameError::capture_failed("mock monitor enumeration failed"));
        }
        let mut monitors = Vec::with_capacity(self.monitors.len() + 1);
        monitors.push(MonitorDescriptor::aggregate_of(&self.monitors));
        monitors.extend(self.monitors.iter().copied());
        Ok(monitors)
    }

    fn grab_pixels(&self, monitor_index: usize, rect: ScreenRect) -> FrameResult<RawPixels> {
        {
            let mut state = lock(&self.state);
            state.grab_log.push((monitor_index, rect));

            let known = self.monitors.iter().any(|m| m.index == monitor_index);
            if !known || state.disconnected.contains(&monitor_index) {
                return Err(FrameError::MonitorNotFound {
                    index: monitor_index,
                });
            }
            if state.failing_grabs > 0 {
                state.failing_grabs -= 1;
                return Err(FrameError::capture_failed("injected grab failure"));
            }
        }

        let (width, height) = (rect.width.max(0) as u32, rect.height.max(0) as u32);
        let mut data =
            Vec::with_capacity(width as usize * height as usize * self.layout.bytes_per_pixel());
        for y in 0..rect.height.max(0) {
            for x in 0..rect.width.max(0) {
                self.encode(self.pixel_at(rect.left + x, rect.top + y), &mut data);
            }
        }
        if self.truncate {
            data.pop();
        }

        Ok(RawPixels {
            width,
            height,
            layout: self.layout,
            data,
        })
    }
}

impl HandleFactory for MockDisplay {
    type Handle = MockDisplay;

    fn open(&self) -> FrameResult<MockDisplay> {
        lock(&self.state).opened += 1;
        Ok(self.clone())
    }
}

#[derive(Debug, Default)]
struct WindowState {
    windows:     Vec<(String, WindowRect)>,
    foreground:  Option<String>,
    activations: usize,
}

/// In-memory window service.
///
/// Cloning shares state, so tests can move a window or change focus after
/// handing a clone to the code under test.
#[derive(Debug, Clone)]
pub struct MockWindows {
    focus_supported: bool,
    state:           Arc<Mutex<WindowState>>,
}

impl Default for MockWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWindows {
    /// Creates a service with no windows
    pub fn new() -> Self {
        Self {
            focus_supported: true,
            state:           Arc::new(Mutex::new(WindowState::default())),
        }
    }

    /// Adds a window with the given title and rectangle
    pub fn with_window(self, title: impl Into<String>, rect: WindowRect) -> Self {
        lock(&self.state).windows.push((title.into(), rect));
        self
    }

    /// Makes [`WindowService::bring_to_foreground`] report
    /// [`FrameError::BackendNotAvailable`]
    pub fn without_focus_support(mut self) -> Self {
        self.focus_supported = false;
        self
    }

    /// Removes every window with this title
    pub fn close(&self, title: &str) {
        let mut state = lock(&self.state);
        state.windows.retain(|(t, _)| t != title);
        if state.foreground.as_deref() == Some(title) {
            state.foreground = None;
        }
    }

    /// Title of the current foreground window
    pub fn foreground(&self) -> Option<String> {
        lock(&self.state).foreground.clone()
    }

    /// Marks a window as foreground without counting an activation
    pub fn set_foreground(&self, title: &str) {
        lock(&self.state).foreground = Some(title.to_string());
    }

    /// Number of times a window was actually brought to the foreground
    pub fn activation_count(&self) -> usize {
        lock(&self.state).activations
    }
}

impl WindowService for MockWindows {
    fn find_window_rect(&self, title: &str) -> Option<WindowRect> {
        lock(&self.state)
            .windows
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, rect)| *rect)
    }

    fn bring_to_foreground(&self, title: &str) -> FrameResult<()> {
        if !self.focus_supported {
            return Err(FrameError::BackendNotAvailable {
                operation: "window focus".to_string(),
            });
        }

        let mut state = lock(&self.state);
        if !state.windows.iter().any(|(t, _)| t == title) {
            return Err(FrameError::WindowNotFound {
                title: title.to_string(),
            });
        }
        if state.foreground.as_deref() == Some(title) {
            return Ok(());
        }
        state.foreground = Some(title.to_string());
        state.activations += 1;
        Ok(())
    }
}
