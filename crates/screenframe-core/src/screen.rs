//! The screen frame service
//!
//! [`ScreenFrame`] ties the pieces together. Construction resolves the
//! capture monitor, its 16:9 crop and the calibration scale once; after
//! that every capture maps its region through the active crop geometry and
//! goes either to the live screen or to the injected still image.
//!
//! # Examples
//!
//! ```
//! use screenframe_core::{
//!     capture::{CaptureFrame, MockDisplay, MockWindows},
//!     config::FrameConfig,
//!     model::PercentRect,
//!     screen::ScreenFrame,
//! };
//!
//! let config = FrameConfig::new("Game").with_calibration_path("/nonexistent/resolution.json");
//! let mut frame = ScreenFrame::new(config, MockWindows::new(), MockDisplay::single_1080p()).unwrap();
//! assert_eq!((frame.screen_width(), frame.screen_height()), (1920, 1080));
//!
//! frame.set_still_image(CaptureFrame::from_test_pattern(800, 600));
//! let region = frame.capture_percent(&PercentRect::new(0.0, 0.0, 0.5, 0.5)).unwrap();
//! assert_eq!(region.dimensions(), (400, 300));
//! ```

use crate::{
    capture::{
        CaptureFrame, HandleFactory, MockDisplay, MockWindows, MonitorLocator, RegionCapture,
        ThreadLocalHandle, WindowService, XcapFactory, XcapWindows,
    },
    config::FrameConfig,
    crop::CropGeometry,
    error::{FrameError, FrameResult},
    mapping,
    model::{CaptureSpace, MonitorDescriptor, OverlaySpace, PercentRect, PixelRect},
    scale::{Scale, ScaleTable},
    source::{self, ImageSource},
};

/// Screen capture and coordinate service for one target window.
///
/// `Send + Sync`: captures take `&self` and may run from any thread, each
/// thread using its own display handle. Mode switches and scale reloads
/// take `&mut self`.
#[derive(Debug)]
pub struct ScreenFrame<W: WindowService = XcapWindows, F: HandleFactory = XcapFactory> {
    config:        FrameConfig,
    windows:       W,
    display:       ThreadLocalHandle<F>,
    monitor:       MonitorDescriptor,
    live_geometry: CropGeometry,
    scale_table:   ScaleTable,
    scale:         Scale,
    source:        ImageSource,
}

impl ScreenFrame<XcapWindows, XcapFactory> {
    /// Builds a screen frame on the live xcap backend
    ///
    /// # Errors
    ///
    /// See [`ScreenFrame::new`].
    pub fn live(config: FrameConfig) -> FrameResult<Self> {
        Self::new(config, XcapWindows, XcapFactory)
    }
}

impl ScreenFrame<MockWindows, MockDisplay> {
    /// Builds a screen frame over a still image without touching the OS
    ///
    /// A single monitor the size of the image stands in for the screen, so
    /// the live geometry and scale describe that image. The frame starts in
    /// still mode and reports no target window.
    ///
    /// # Errors
    ///
    /// See [`ScreenFrame::new`].
    pub fn offline(config: FrameConfig, image: CaptureFrame) -> FrameResult<Self> {
        let monitor = MonitorDescriptor::new(1, 0, 0, image.width(), image.height());
        let mut frame = Self::new(config, MockWindows::new(), MockDisplay::new(vec![monitor]))?;
        frame.set_still_image(image);
        Ok(frame)
    }
}

impl<W: WindowService, F: HandleFactory> ScreenFrame<W, F> {
    /// Resolves the capture monitor, its crop and the calibration scale.
    ///
    /// A missing target window or an unusable calibration file is logged
    /// and replaced by a default; neither fails construction.
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::NoMonitor`] - no physical monitor
    /// - Whatever opening the display handle or enumerating monitors returns
    pub fn new(config: FrameConfig, windows: W, factory: F) -> FrameResult<Self> {
        let display = ThreadLocalHandle::new(factory);
        let monitor = display
            .with(|handle| MonitorLocator::new(&windows, &config.window_title).locate(handle))?;

        let live_geometry = CropGeometry::compute(monitor.width, monitor.height);
        let scale_table = ScaleTable::load_or_default(&config.calibration_path);
        let scale = scale_table.resolve(live_geometry.cropped_width, live_geometry.cropped_height);

        tracing::info!(
            "Monitor {}: raw {}x{}, 16:9 area {}x{} at offset ({}, {}), scale {}, {}",
            monitor.index,
            live_geometry.raw_width,
            live_geometry.raw_height,
            live_geometry.cropped_width,
            live_geometry.cropped_height,
            live_geometry.offset_x,
            live_geometry.offset_y,
            scale.x,
            scale.y
        );

        Ok(Self {
            config,
            windows,
            display,
            monitor,
            live_geometry,
            scale_table,
            scale,
            source: ImageSource::Live,
        })
    }

    /// Configuration this frame was built from
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// The selected capture monitor
    pub fn monitor(&self) -> &MonitorDescriptor {
        &self.monitor
    }

    /// Crop geometry of the current source
    ///
    /// The live crop while capturing the screen, identity over the image in
    /// still mode.
    pub fn geometry(&self) -> CropGeometry {
        self.source.geometry(&self.live_geometry)
    }

    /// Crop geometry of the live monitor, whatever the current source
    pub fn live_geometry(&self) -> &CropGeometry {
        &self.live_geometry
    }

    /// Width of the working frame (still image width in still mode)
    pub fn screen_width(&self) -> u32 {
        self.geometry().cropped_width
    }

    /// Height of the working frame (still image height in still mode)
    pub fn screen_height(&self) -> u32 {
        self.geometry().cropped_height
    }

    /// Calibration scale resolved at construction or last reload
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// The calibration table in use
    pub fn scale_table(&self) -> &ScaleTable {
        &self.scale_table
    }

    /// The current image source
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Returns true while capturing from the live screen
    pub fn is_live(&self) -> bool {
        self.source.is_live()
    }

    /// Captures a percent region of the working frame
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::InvalidRegion`] - the region is empty,
    ///   inverted, NaN, larger than the monitor, or (still mode) outside
    ///   the image
    /// - [`crate::error::FrameError::CaptureFailed`] - the live grab failed;
    ///   later captures are unaffected
    pub fn capture_percent(&self, rect: &PercentRect) -> FrameResult<CaptureFrame> {
        if !rect.is_ordered() {
            return Err(FrameError::invalid_region(rect, "left/top must be below right/bottom"));
        }
        match &self.source {
            ImageSource::Live => {
                let pixels = mapping::percent_to_capture(&self.live_geometry, rect);
                self.grab_live(&pixels)
            }
            ImageSource::Still(image) => source::crop_still_percent(image, rect),
        }
    }

    /// Captures a pixel region of the working frame
    ///
    /// Coordinates are crop-relative on the live screen and image pixels in
    /// still mode.
    ///
    /// # Errors
    ///
    /// As [`ScreenFrame::capture_percent`].
    pub fn capture_pixels(&self, rect: &PixelRect<CaptureSpace>) -> FrameResult<CaptureFrame> {
        match &self.source {
            ImageSource::Live => self.grab_live(rect),
            ImageSource::Still(image) => {
                source::crop_still_pixels(image, &PixelRect::from(rect.to_array()))
            }
        }
    }

    /// Captures the whole working frame; in still mode, the unmodified image
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::CaptureFailed`] - the live grab failed
    pub fn capture_full(&self) -> FrameResult<CaptureFrame> {
        match &self.source {
            ImageSource::Live => self
                .display
                .with(|handle| self.region_capture().grab_full(handle)),
            ImageSource::Still(image) => Ok(image.clone()),
        }
    }

    fn region_capture(&self) -> RegionCapture<'_> {
        RegionCapture::new(&self.monitor, &self.live_geometry)
    }

    fn grab_live(&self, rect: &PixelRect<CaptureSpace>) -> FrameResult<CaptureFrame> {
        self.display
            .with(|handle| self.region_capture().grab(handle, rect))
    }

    /// Percent region to crop-relative pixels under the active geometry
    pub fn percent_to_capture(&self, rect: &PercentRect) -> PixelRect<CaptureSpace> {
        mapping::percent_to_capture(&self.geometry(), rect)
    }

    /// Percent region to full-screen pixels under the active geometry
    pub fn percent_to_overlay(&self, rect: &PercentRect) -> PixelRect<OverlaySpace> {
        mapping::percent_to_overlay(&self.geometry(), rect)
    }

    /// Adds the active crop offset to crop-relative pixels
    pub fn capture_to_overlay(&self, rect: &PixelRect<CaptureSpace>) -> PixelRect<OverlaySpace> {
        mapping::capture_to_overlay(&self.geometry(), rect)
    }

    /// Switches to still mode
    ///
    /// The working frame becomes the image's own size. The calibration
    /// scale is left as it is.
    pub fn set_still_image(&mut self, image: CaptureFrame) {
        tracing::debug!("Using still image {}x{}", image.width(), image.height());
        self.source = ImageSource::Still(image);
    }

    /// Switches back to the live screen, restoring the live geometry
    pub fn use_live_screen(&mut self) {
        tracing::debug!("Using live screen");
        self.source = ImageSource::Live;
    }

    /// Re-reads the calibration file and re-resolves the scale
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::ConfigLoad`] - the file is missing or
    ///   malformed; the current table and scale are kept
    pub fn reload_scales(&mut self) -> FrameResult<()> {
        let table = ScaleTable::load(&self.config.calibration_path).inspect_err(|e| {
            tracing::warn!("{}; keeping the current scale table", e);
        })?;
        self.scale = table.resolve(
            self.live_geometry.cropped_width,
            self.live_geometry.cropped_height,
        );
        self.scale_table = table;
        tracing::debug!("Reloaded scale table, scale {}, {}", self.scale.x, self.scale.y);
        Ok(())
    }

    /// Writes the calibration table to the configured file
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::Io`] - the file could not be written
    pub fn save_scales(&self) -> FrameResult<()> {
        self.scale_table.save(&self.config.calibration_path)
    }

    /// Returns true when the target window exists
    pub fn is_target_present(&self) -> bool {
        self.locator().is_target_present()
    }

    /// Brings the target window to the foreground unless it already is
    ///
    /// # Errors
    ///
    /// - [`crate::error::FrameError::WindowNotFound`] - the window is gone
    /// - [`crate::error::FrameError::BackendNotAvailable`] - unsupported
    ///   platform
    pub fn focus_target(&self) -> FrameResult<()> {
        self.locator().focus_target()
    }

    fn locator(&self) -> MonitorLocator<'_> {
        MonitorLocator::new(&self.windows, &self.config.window_title)
    }
}
