//! Where captures come from: the live screen or an injected still image
//!
//! Still images let every consumer of the screen frame run offline against
//! saved screenshots. A still image is treated as already framed, so
//! percent regions are taken against its own dimensions with no crop
//! offset.

use crate::{
    capture::CaptureFrame,
    crop::CropGeometry,
    error::FrameResult,
    mapping,
    model::{ImageSpace, PercentRect, PixelRect},
};

/// Current image source of a [`crate::screen::ScreenFrame`]
#[derive(Debug, Clone, Default)]
pub enum ImageSource {
    /// Grab from the selected monitor on every call
    #[default]
    Live,
    /// Cut regions out of this image
    Still(CaptureFrame),
}

impl ImageSource {
    /// Returns true for [`ImageSource::Live`]
    pub fn is_live(&self) -> bool {
        matches!(self, ImageSource::Live)
    }

    /// The still image, if any
    pub fn still(&self) -> Option<&CaptureFrame> {
        match self {
            ImageSource::Live => None,
            ImageSource::Still(image) => Some(image),
        }
    }

    /// Crop geometry to map with: identity over a still image, otherwise
    /// `live`
    pub fn geometry(&self, live: &CropGeometry) -> CropGeometry {
        match self {
            ImageSource::Live => *live,
            ImageSource::Still(image) => CropGeometry::identity(image.width(), image.height()),
        }
    }
}

/// Cuts a percent region out of a still image
///
/// # Errors
///
/// - [`crate::error::FrameError::InvalidRegion`] - the region covers no
///   pixel of the image
pub fn crop_still_percent(image: &CaptureFrame, rect: &PercentRect) -> FrameResult<CaptureFrame> {
    let pixels = mapping::percent_to_image(image.width(), image.height(), rect);
    image.crop(&pixels)
}

/// Cuts a pixel region out of a still image
///
/// # Errors
///
/// - [`crate::error::FrameError::InvalidRegion`] - the region covers no
///   pixel of the image
pub fn crop_still_pixels(
    image: &CaptureFrame,
    rect: &PixelRect<ImageSpace>,
) -> FrameResult<CaptureFrame> {
    image.crop(rect)
}
