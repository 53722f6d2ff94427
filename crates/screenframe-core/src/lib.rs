//! screenframe-core: 16:9 screen framing, coordinate mapping and capture
//!
//! Visual elements of the target application are located by percent
//! regions of a canonical 16:9 frame. This library finds the monitor the
//! target window is on, fits the largest centered 16:9 frame into it,
//! resolves the calibration scale for that frame, maps percent regions to
//! pixels and captures them from the live screen or from a still image.

pub mod capture;
pub mod config;
pub mod crop;
pub mod error;
pub mod mapping;
pub mod model;
pub mod scale;
pub mod screen;
pub mod source;

pub use capture::CaptureFrame;
pub use config::FrameConfig;
pub use crop::CropGeometry;
pub use error::{FrameError, FrameResult};
pub use model::{PercentRect, PixelRect};
pub use scale::{Scale, ScaleTable};
pub use screen::ScreenFrame;
pub use source::ImageSource;
