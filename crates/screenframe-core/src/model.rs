//! Data models shared by the framing, mapping and capture modules
//!
//! - Monitor and window geometry reported by the OS services
//! - Percent and pixel rectangles, with pixel rectangles tagged at the type
//!   level by the coordinate space they belong to
//! - Raw pixel buffers as returned by a pixel grab, before channel
//!   normalization

use std::{fmt, marker::PhantomData};

use serde::{Deserialize, Serialize};

/// Raw geometry of one display as reported by the display service
///
/// Index 0 is reserved for the virtual full-desktop aggregate (the bounding
/// box of all monitors) and is never selected as a capture target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    /// Position in the display service's monitor list
    pub index:  usize,
    /// Left edge in desktop coordinates
    pub left:   i32,
    /// Top edge in desktop coordinates
    pub top:    i32,
    /// Width in physical pixels
    pub width:  u32,
    /// Height in physical pixels
    pub height: u32,
}

impl MonitorDescriptor {
    /// Index reserved for the virtual desktop aggregate
    pub const AGGREGATE_INDEX: usize = 0;

    /// Creates a new monitor descriptor
    pub fn new(index: usize, left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            index,
            left,
            top,
            width,
            height,
        }
    }

    /// Returns true for the virtual full-desktop pseudo-monitor
    pub fn is_aggregate(&self) -> bool {
        self.index == Self::AGGREGATE_INDEX
    }

    /// Builds the aggregate descriptor (index 0) spanning all given monitors
    pub fn aggregate_of(monitors: &[MonitorDescriptor]) -> Self {
        let left = monitors.iter().map(|m| m.left).min().unwrap_or(0);
        let top = monitors.iter().map(|m| m.top).min().unwrap_or(0);
        let right = monitors.iter().map(|m| m.left + m.width as i32).max().unwrap_or(0);
        let bottom = monitors.iter().map(|m| m.top + m.height as i32).max().unwrap_or(0);

        Self::new(
            Self::AGGREGATE_INDEX,
            left,
            top,
            (right - left).max(0) as u32,
            (bottom - top).max(0) as u32,
        )
    }
}

/// Window rectangle as reported by the window discovery service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub left:   i32,
    pub top:    i32,
    pub right:  i32,
    pub bottom: i32,
}

impl WindowRect {
    /// Creates a window rectangle from its corners
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// A region expressed as fractions of a frame's width and height
///
/// Components are conceptually in `[0, 1]` with `left < right` and
/// `top < bottom`, but neither is enforced: mapping is total and only a
/// capture request rejects an empty or inverted result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub left:   f64,
    pub top:    f64,
    pub right:  f64,
    pub bottom: f64,
}

impl PercentRect {
    /// The whole frame
    pub const FULL: PercentRect = PercentRect {
        left:   0.0,
        top:    0.0,
        right:  1.0,
        bottom: 1.0,
    };

    /// Creates a percent rectangle from `[L, T, R, B]` components
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Returns true when `left < right` and `top < bottom`
    pub fn is_ordered(&self) -> bool {
        self.left < self.right && self.top < self.bottom
    }
}

impl From<[f64; 4]> for PercentRect {
    fn from(r: [f64; 4]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }
}

impl fmt::Display for PercentRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.left, self.top, self.right, self.bottom)
    }
}

/// Crop-relative pixels: origin at the top-left of the 16:9 working frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureSpace;

/// Full-screen pixels of the selected monitor, crop offset included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlaySpace;

/// Pixels relative to the top-left of a still image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSpace;

/// Integer pixel rectangle `[L, T, R, B]` in coordinate space `S`
///
/// The space tag prevents passing an overlay rectangle where a capture
/// rectangle is expected; conversions go through [`crate::mapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect<S> {
    pub left:   i32,
    pub top:    i32,
    pub right:  i32,
    pub bottom: i32,
    space:      PhantomData<S>,
}

impl<S> PixelRect<S> {
    /// Creates a pixel rectangle from `[L, T, R, B]` components
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            space: PhantomData,
        }
    }

    /// Width in pixels; negative for an inverted rectangle, saturating at
    /// the `i32` range
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height in pixels; negative for an inverted rectangle, saturating at
    /// the `i32` range
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns true when the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Shifts both corners by `(dx, dy)` and retags the result
    pub(crate) fn translate<T>(self, dx: i32, dy: i32) -> PixelRect<T> {
        PixelRect::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.right.saturating_add(dx),
            self.bottom.saturating_add(dy),
        )
    }

    /// Returns the components as `[L, T, R, B]`
    pub fn to_array(&self) -> [i32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

impl<S> From<[i32; 4]> for PixelRect<S> {
    fn from(r: [i32; 4]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }
}

impl<S> fmt::Display for PixelRect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.left, self.top, self.right, self.bottom)
    }
}

/// Absolute desktop rectangle handed to the pixel-grab service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left:   i32,
    pub top:    i32,
    pub width:  i32,
    pub height: i32,
}

impl fmt::Display for ScreenRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.left, self.top)
    }
}

/// Channel order and width of an undecoded pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelLayout {
    /// 4 bytes per pixel, blue first (GDI / BitBlt order)
    Bgra8,
    /// 4 bytes per pixel, red first
    Rgba8,
    /// 3 bytes per pixel, blue first
    Bgr8,
    /// 3 bytes per pixel, red first
    Rgb8,
}

impl PixelLayout {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Bgra8 | PixelLayout::Rgba8 => 4,
            PixelLayout::Bgr8 | PixelLayout::Rgb8 => 3,
        }
    }

    /// Returns true when the first channel is blue
    pub fn is_bgr(&self) -> bool {
        matches!(self, PixelLayout::Bgra8 | PixelLayout::Bgr8)
    }
}

/// Pixel buffer as returned by the display service, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixels {
    pub width:  u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data:   Vec<u8>,
}

impl RawPixels {
    /// Number of bytes a complete buffer of this size and layout must hold
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.bytes_per_pixel()
    }
}
