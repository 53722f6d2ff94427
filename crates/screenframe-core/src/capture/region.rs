//! Live region grabs
//!
//! Turns a crop-relative pixel rectangle into an absolute desktop rectangle,
//! performs exactly one pixel grab and normalizes the result to RGB.

use super::{frame::CaptureFrame, traits::DisplayService};
use crate::{
    crop::CropGeometry,
    error::{FrameError, FrameResult},
    mapping,
    model::{CaptureSpace, MonitorDescriptor, PixelRect},
};

/// Grabs crop-relative regions of one monitor
#[derive(Debug, Clone, Copy)]
pub struct RegionCapture<'a> {
    monitor:  &'a MonitorDescriptor,
    geometry: &'a CropGeometry,
}

impl<'a> RegionCapture<'a> {
    /// Captures relative to `geometry`'s 16:9 frame on `monitor`
    pub fn new(monitor: &'a MonitorDescriptor, geometry: &'a CropGeometry) -> Self {
        Self { monitor, geometry }
    }

    /// Grabs `rect` (crop-relative) from the screen.
    ///
    /// # Errors
    ///
    /// - [`FrameError::InvalidRegion`] - `rect` has non-positive width or
    ///   height, or is larger than the whole monitor; no grab is attempted
    /// - [`FrameError::CaptureFailed`] - the grab failed or returned a buffer
    ///   that does not match the requested size
    /// - [`FrameError::MonitorNotFound`] - the monitor disappeared
    pub fn grab(
        &self,
        display: &dyn DisplayService,
        rect: &PixelRect<CaptureSpace>,
    ) -> FrameResult<CaptureFrame> {
        if rect.is_empty() {
            return Err(FrameError::invalid_region(
                rect,
                format!("size {}x{} is not positive", rect.width(), rect.height()),
            ));
        }
        if rect.width() as i64 > self.monitor.width as i64
            || rect.height() as i64 > self.monitor.height as i64
        {
            return Err(FrameError::invalid_region(
                rect,
                format!(
                    "size {}x{} exceeds monitor {} ({}x{})",
                    rect.width(),
                    rect.height(),
                    self.monitor.index,
                    self.monitor.width,
                    self.monitor.height
                ),
            ));
        }

        let screen = mapping::capture_to_screen(
            (self.monitor.left, self.monitor.top),
            self.geometry,
            rect,
        );
        tracing::debug!("Grabbing {} from monitor {}", screen, self.monitor.index);

        let raw = display.grab_pixels(self.monitor.index, screen)?;
        if (raw.width as i32, raw.height as i32) != (screen.width, screen.height) {
            return Err(FrameError::capture_failed(format!(
                "requested {}, got {}x{}",
                screen, raw.width, raw.height
            )));
        }

        CaptureFrame::from_raw(raw)
    }

    /// Grabs the whole 16:9 frame
    pub fn grab_full(&self, display: &dyn DisplayService) -> FrameResult<CaptureFrame> {
        let rect = PixelRect::new(
            0,
            0,
            self.geometry.cropped_width as i32,
            self.geometry.cropped_height as i32,
        );
        self.grab(display, &rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capture::mock::MockDisplay,
        model::{PixelLayout, ScreenRect},
    };

    fn ultrawide() -> (MonitorDescriptor, CropGeometry) {
        (MonitorDescriptor::new(1, -3440, 0, 3440, 1440), CropGeometry::compute(3440, 1440))
    }

    #[test]
    fn test_grab_requests_absolute_rect() {
        let (monitor, geometry) = ultrawide();
        let display = MockDisplay::new(vec![monitor]);

        let frame = RegionCapture::new(&monitor, &geometry)
            .grab(&display, &PixelRect::new(100, 50, 300, 150))
            .unwrap();

        assert_eq!(frame.dimensions(), (200, 100));
        assert_eq!(display.grab_log(), vec![(1, ScreenRect {
            left:   -3440 + 440 + 100,
            top:    50,
            width:  200,
            height: 100,
        })]);
    }

    #[test]
    fn test_bgra_grab_is_rgb() {
        let (monitor, geometry) = ultrawide();
        let display = MockDisplay::new(vec![monitor])
            .with_layout(PixelLayout::Bgra8)
            .with_fill([200, 100, 50]);

        let frame = RegionCapture::new(&monitor, &geometry)
            .grab(&display, &PixelRect::new(0, 0, 4, 4))
            .unwrap();
        assert_eq!(frame.pixel(3, 3), Some([200, 100, 50]));
    }

    #[test]
    fn test_empty_rect_never_grabs() {
        let (monitor, geometry) = ultrawide();
        let display = MockDisplay::new(vec![monitor]);
        let capture = RegionCapture::new(&monitor, &geometry);

        for rect in [PixelRect::new(10, 10, 10, 20), PixelRect::new(50, 10, 20, 40)] {
            let err = capture.grab(&display, &rect).unwrap_err();
            assert!(matches!(err, FrameError::InvalidRegion { .. }));
        }
        assert!(display.grab_log().is_empty());
    }

    #[test]
    fn test_region_larger_than_monitor_never_grabs() {
        let (monitor, geometry) = ultrawide();
        let display = MockDisplay::new(vec![monitor]);
        let capture = RegionCapture::new(&monitor, &geometry);

        for rect in [
            PixelRect::new(i32::MIN, 0, i32::MAX, 720),
            PixelRect::new(0, 0, 100, 1441),
        ] {
            let err = capture.grab(&display, &rect).unwrap_err();
            assert!(matches!(err, FrameError::InvalidRegion { .. }));
        }
        assert!(display.grab_log().is_empty());

        // Past the crop edge but within the monitor size is still grabbed
        capture.grab(&display, &PixelRect::new(2500, 0, 2600, 10)).unwrap();
        assert_eq!(display.grab_log().len(), 1);
    }

    #[test]
    fn test_truncated_buffer_is_capture_failure() {
        let (monitor, geometry) = ultrawide();
        let display = MockDisplay::new(vec![monitor]).with_truncated_grabs(true);

        let err = RegionCapture::new(&monitor, &geometry)
            .grab(&display, &PixelRect::new(0, 0, 8, 8))
            .unwrap_err();
        assert!(matches!(err, FrameError::CaptureFailed { .. }));
    }

    #[test]
    fn test_grab_full_uses_cropped_size() {
        let monitor = MonitorDescriptor::new(1, 0, 0, 1280, 1024);
        let geometry = CropGeometry::compute(1280, 1024);
        let display = MockDisplay::new(vec![monitor]);

        let frame = RegionCapture::new(&monitor, &geometry).grab_full(&display).unwrap();
        assert_eq!(frame.dimensions(), (1280, 720));
        assert_eq!(display.grab_log()[0].1.top, 152);
    }
}
