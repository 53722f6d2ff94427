//! Shared fixtures for integration tests

use std::path::Path;

use screenframe_core::{
    capture::{MockDisplay, MockWindows},
    config::FrameConfig,
    model::{MonitorDescriptor, WindowRect},
};

/// Title of the target window in every fixture
pub const GAME: &str = "Game Client";

/// Config targeting [`GAME`] with its calibration file inside `dir`
pub fn config_with(dir: &Path) -> FrameConfig {
    FrameConfig::new(GAME).with_calibration_path(dir.join("resolution.json"))
}

/// 2560x1440 primary at the origin and a 3440x1440 ultrawide to its right
pub fn dual_monitor_display() -> MockDisplay {
    MockDisplay::new(vec![
        MonitorDescriptor::new(1, 0, 0, 2560, 1440),
        MonitorDescriptor::new(2, 2560, 0, 3440, 1440),
    ])
}

/// A window service with [`GAME`] open at the given position and size
pub fn window_on(left: i32, top: i32, width: i32, height: i32) -> MockWindows {
    MockWindows::new().with_window(GAME, WindowRect::new(left, top, left + width, top + height))
}
