//! Window discovery, monitor selection and pixel capture
//!
//! # Architecture
//!
//! The OS is reached only through the service traits:
//!
//! - [`WindowService`] - find, probe and focus the target window
//! - [`DisplayService`] - enumerate monitors and grab raw pixels
//! - [`HandleFactory`] - open a per-thread [`DisplayService`] handle
//!
//! On top of them:
//!
//! - [`MonitorLocator`] - picks the monitor the target window occupies
//! - [`RegionCapture`] - grabs a crop-relative region with one OS call
//! - [`ThreadLocalHandle`] - keeps one display handle per thread
//! - [`CaptureFrame`] - the RGB result of every capture
//!
//! ## Backends
//!
//! | Backend | Windows | Displays | Focus |
//! |---------|---------|----------|-------|
//! | xcap    | ✓ | ✓ | Windows only |
//! | Mock    | ✓ | ✓ | ✓ |

pub mod frame;
pub mod handle;
pub mod mock;
pub mod monitor;
pub mod region;
pub mod traits;
pub mod xcap_backend;

pub use frame::CaptureFrame;
pub use handle::ThreadLocalHandle;
pub use mock::{MockDisplay, MockWindows};
pub use monitor::MonitorLocator;
pub use region::RegionCapture;
pub use traits::{DisplayService, HandleFactory, WindowService};
pub use xcap_backend::{XcapDisplay, XcapFactory, XcapWindows};
