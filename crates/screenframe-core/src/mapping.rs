//! Conversions between percent, capture, overlay and image coordinates
//!
//! All functions are pure and total. Percent components are scaled by the
//! cropped frame size and truncated toward zero; the overlay conversions add
//! the crop offset so the result lines up with the untouched full screen.
//! Out-of-range components saturate at the `i32` range instead of wrapping.
//!
//! The two routes to overlay space always agree:
//!
//! ```
//! use screenframe_core::{crop::CropGeometry, mapping, model::PercentRect};
//!
//! let g = CropGeometry::compute(3440, 1440);
//! let r = PercentRect::new(0.25, 0.1, 0.75, 0.2);
//! assert_eq!(
//!     mapping::percent_to_overlay(&g, &r),
//!     mapping::capture_to_overlay(&g, &mapping::percent_to_capture(&g, &r)),
//! );
//! ```

use crate::{
    crop::CropGeometry,
    model::{CaptureSpace, ImageSpace, OverlaySpace, PercentRect, PixelRect, ScreenRect},
};

/// Scales a percent rect by `width` x `height`, truncating toward zero
fn scale_percent<S>(rect: &PercentRect, width: u32, height: u32) -> PixelRect<S> {
    let (w, h) = (width as f64, height as f64);
    PixelRect::new(
        (rect.left * w) as i32,
        (rect.top * h) as i32,
        (rect.right * w) as i32,
        (rect.bottom * h) as i32,
    )
}

/// Percent rect to crop-relative pixels, for building capture requests
pub fn percent_to_capture(geometry: &CropGeometry, rect: &PercentRect) -> PixelRect<CaptureSpace> {
    scale_percent(rect, geometry.cropped_width, geometry.cropped_height)
}

/// Percent rect to full-screen pixels, for drawing over the real screen
pub fn percent_to_overlay(geometry: &CropGeometry, rect: &PercentRect) -> PixelRect<OverlaySpace> {
    capture_to_overlay(geometry, &percent_to_capture(geometry, rect))
}

/// Crop-relative pixels to full-screen pixels (offset only, no scaling)
pub fn capture_to_overlay(
    geometry: &CropGeometry,
    rect: &PixelRect<CaptureSpace>,
) -> PixelRect<OverlaySpace> {
    rect.translate(geometry.offset_x, geometry.offset_y)
}

/// Full-screen pixels back to crop-relative pixels
pub fn overlay_to_capture(
    geometry: &CropGeometry,
    rect: &PixelRect<OverlaySpace>,
) -> PixelRect<CaptureSpace> {
    rect.translate(-geometry.offset_x, -geometry.offset_y)
}

/// Percent rect to pixels of a `width` x `height` still image
pub fn percent_to_image(width: u32, height: u32, rect: &PercentRect) -> PixelRect<ImageSpace> {
    scale_percent(rect, width, height)
}

/// Absolute desktop rectangle for a crop-relative region of a monitor
///
/// `origin` is the monitor's `(left, top)` in desktop coordinates.
pub fn capture_to_screen(
    origin: (i32, i32),
    geometry: &CropGeometry,
    rect: &PixelRect<CaptureSpace>,
) -> ScreenRect {
    ScreenRect {
        left:   origin.0.saturating_add(geometry.offset_x).saturating_add(rect.left),
        top:    origin.1.saturating_add(geometry.offset_y).saturating_add(rect.top),
        width:  rect.width(),
        height: rect.height(),
    }
}
