//! RGB pixel buffer returned by every capture
//!
//! A [`CaptureFrame`] wraps an [`image::RgbImage`]. It is created per call,
//! owned by the caller and carries no identity beyond that call. Frames
//! coming from the OS are normalized to RGB channel order by
//! [`CaptureFrame::from_raw`] whatever the backend's native layout.
//!
//! # Examples
//!
//! ```
//! use screenframe_core::{capture::CaptureFrame, model::PixelRect};
//!
//! let frame = CaptureFrame::from_test_pattern(1920, 1080);
//! let region = frame.crop(&PixelRect::new(100, 100, 900, 500)).unwrap();
//! assert_eq!(region.dimensions(), (800, 400));
//! ```

use std::path::Path;

use image::RgbImage;

use crate::{
    error::{FrameError, FrameResult},
    model::{ImageSpace, PixelLayout, PixelRect, RawPixels},
};

/// Owned RGB8 image produced by a capture
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureFrame {
    inner: RgbImage,
}

impl CaptureFrame {
    /// Wraps an RGB image
    pub fn new(image: RgbImage) -> Self {
        Self { inner: image }
    }

    /// Converts any decoded image to RGB8
    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }

    /// Decodes a raw grab buffer into RGB channel order.
    ///
    /// Alpha is dropped and blue-first layouts are swapped.
    ///
    /// # Errors
    ///
    /// - [`FrameError::CaptureFailed`] - the buffer is empty or its length
    ///   does not match `width * height * bytes_per_pixel`
    pub fn from_raw(raw: RawPixels) -> FrameResult<Self> {
        if raw.width == 0 || raw.height == 0 {
            return Err(FrameError::capture_failed(format!(
                "grab returned an empty {}x{} buffer",
                raw.width, raw.height
            )));
        }
        if raw.data.len() != raw.expected_len() {
            return Err(FrameError::capture_failed(format!(
                "grab returned {} bytes, expected {} for {}x{} {:?}",
                raw.data.len(),
                raw.expected_len(),
                raw.width,
                raw.height,
                raw.layout
            )));
        }

        let bpp = raw.layout.bytes_per_pixel();
        let rgb: Vec<u8> = if raw.layout == PixelLayout::Rgb8 {
            raw.data
        } else {
            let bgr = raw.layout.is_bgr();
            raw.data
                .chunks_exact(bpp)
                .flat_map(|px| if bgr { [px[2], px[1], px[0]] } else { [px[0], px[1], px[2]] })
                .collect()
        };

        RgbImage::from_raw(raw.width, raw.height, rgb)
            .map(Self::new)
            .ok_or_else(|| FrameError::capture_failed("decoded buffer does not fit its dimensions"))
    }

    /// Creates a frame whose pixels encode their own position.
    ///
    /// Red is `x % 256`, green is `y % 256`, blue is 128, so a crop can be
    /// checked by reading its first pixel.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        Self::new(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    /// Loads a still image from disk
    ///
    /// # Errors
    ///
    /// - [`FrameError::Image`] - the file is missing or cannot be decoded
    pub fn open(path: &Path) -> FrameResult<Self> {
        let image = image::open(path)
            .map_err(|e| FrameError::Image(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_dynamic(image))
    }

    /// Writes the frame to disk; the format follows the file extension
    ///
    /// # Errors
    ///
    /// - [`FrameError::Image`] - encoding or writing failed
    pub fn save(&self, path: &Path) -> FrameResult<()> {
        self.inner
            .save(path)
            .map_err(|e| FrameError::Image(format!("{}: {}", path.display(), e)))
    }

    /// Copies out a pixel region.
    ///
    /// Coordinates are clamped to the image bounds the way array slicing
    /// clamps, so a region hanging off an edge returns the overlapping part.
    ///
    /// # Errors
    ///
    /// - [`FrameError::InvalidRegion`] - nothing of the region lies inside
    ///   the image, or the region is empty or inverted
    pub fn crop(&self, rect: &PixelRect<ImageSpace>) -> FrameResult<Self> {
        let (width, height) = self.dimensions();
        let clamp = |v: i32, max: u32| v.clamp(0, max as i32) as u32;

        let (x0, x1) = (clamp(rect.left, width), clamp(rect.right, width));
        let (y0, y1) = (clamp(rect.top, height), clamp(rect.bottom, height));
        if x1 <= x0 || y1 <= y0 {
            return Err(FrameError::invalid_region(
                rect,
                format!("no pixels inside the {width}x{height} image"),
            ));
        }

        let region = image::imageops::crop_imm(&self.inner, x0, y0, x1 - x0, y1 - y0).to_image();
        Ok(Self::new(region))
    }

    /// Returns `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// RGB value at `(x, y)`, or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.inner.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_raw()
    }

    /// Borrows the wrapped image
    pub fn inner(&self) -> &RgbImage {
        &self.inner
    }

    /// Consumes the frame, returning the wrapped image
    pub fn into_inner(self) -> RgbImage {
        self.inner
    }
}
