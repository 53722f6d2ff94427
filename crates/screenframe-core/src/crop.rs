//! Centered 16:9 working frame
//!
//! All percent regions are authored against a 16:9 frame. On a display of
//! any other shape the frame is the largest centered 16:9 sub-rectangle:
//! ultrawide displays lose their sides, 4:3 and 5:4 displays lose a band at
//! the top and bottom.

use serde::{Deserialize, Serialize};

/// Aspect ratio of the canonical working frame
pub const TARGET_ASPECT: f64 = 16.0 / 9.0;

/// Aspect difference below which a display is treated as already 16:9
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Placement of the 16:9 working frame inside a raw display
///
/// Immutable once computed. `cropped_* <= raw_*` and offsets are never
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropGeometry {
    pub offset_x:       i32,
    pub offset_y:       i32,
    pub cropped_width:  u32,
    pub cropped_height: u32,
    pub raw_width:      u32,
    pub raw_height:     u32,
}

impl CropGeometry {
    /// Computes the centered 16:9 crop of a `raw_width` x `raw_height` display
    ///
    /// # Examples
    ///
    /// ```
    /// use screenframe_core::crop::CropGeometry;
    ///
    /// // 32:9 super-ultrawide keeps full height and loses both sides
    /// let geometry = CropGeometry::compute(3840, 1080);
    /// assert_eq!(geometry.cropped_width, 1920);
    /// assert_eq!(geometry.offset_x, 960);
    /// assert_eq!(geometry.offset_y, 0);
    /// ```
    pub fn compute(raw_width: u32, raw_height: u32) -> Self {
        let current_aspect = if raw_height > 0 {
            raw_width as f64 / raw_height as f64
        } else {
            TARGET_ASPECT
        };

        if (current_aspect - TARGET_ASPECT).abs() < ASPECT_TOLERANCE {
            tracing::debug!("Screen {}x{} is already 16:9, no cropping needed", raw_width, raw_height);
            return Self::identity(raw_width, raw_height);
        }

        if current_aspect > TARGET_ASPECT {
            let cropped_width = (raw_height as f64 * TARGET_ASPECT) as u32;
            tracing::debug!(
                "Screen is wider than 16:9 (aspect {:.2}), cropping sides to {}x{}",
                current_aspect,
                cropped_width,
                raw_height
            );
            Self {
                offset_x: ((raw_width - cropped_width) / 2) as i32,
                offset_y: 0,
                cropped_width,
                cropped_height: raw_height,
                raw_width,
                raw_height,
            }
        } else {
            let cropped_height = (raw_width as f64 / TARGET_ASPECT) as u32;
            tracing::debug!(
                "Screen is taller than 16:9 (aspect {:.2}), cropping top/bottom to {}x{}",
                current_aspect,
                raw_width,
                cropped_height
            );
            Self {
                offset_x: 0,
                offset_y: ((raw_height - cropped_height) / 2) as i32,
                cropped_width: raw_width,
                cropped_height,
                raw_width,
                raw_height,
            }
        }
    }

    /// Geometry that uses the whole `width` x `height` area with no offset
    ///
    /// Used for still images, which are treated as already framed.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            offset_x:       0,
            offset_y:       0,
            cropped_width:  width,
            cropped_height: height,
            raw_width:      width,
            raw_height:     height,
        }
    }

    /// Aspect ratio of the cropped frame
    pub fn aspect(&self) -> f64 {
        if self.cropped_height == 0 {
            return TARGET_ASPECT;
        }
        self.cropped_width as f64 / self.cropped_height as f64
    }

    /// Returns true when the raw display needed no cropping
    pub fn is_uncropped(&self) -> bool {
        self.cropped_width == self.raw_width && self.cropped_height == self.raw_height
    }
}
