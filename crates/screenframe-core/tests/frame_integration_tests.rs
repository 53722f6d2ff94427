//! Screen frame integration tests on mock services
//!
//! Exercises construction, live and still capture, calibration files and
//! per-thread display handles end to end without a real display.

mod common;

use std::sync::Arc;

use common::{GAME, config_with, dual_monitor_display, window_on};
use screenframe_core::{
    capture::{CaptureFrame, MockDisplay, MockWindows},
    error::FrameError,
    model::{MonitorDescriptor, PercentRect, PixelRect, WindowRect},
    scale::{Scale, ScaleTable},
    screen::ScreenFrame,
};

#[test]
fn test_window_on_second_monitor_is_captured_there() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let frame = ScreenFrame::new(
        config_with(dir.path()),
        window_on(2560, 0, 3440, 1440),
        display.clone(),
    )
    .unwrap();

    assert_eq!(frame.monitor().index, 2);
    assert_eq!(frame.live_geometry().offset_x, 440);

    frame.capture_percent(&PercentRect::new(0.0, 0.0, 0.5, 0.5)).unwrap();
    let (index, rect) = display.grab_log()[0];
    assert_eq!(index, 2);
    assert_eq!((rect.left, rect.top, rect.width, rect.height), (2560 + 440, 0, 1280, 720));
}

#[test]
fn test_missing_window_uses_first_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();

    assert_eq!(frame.monitor().index, 1);
    assert_eq!((frame.screen_width(), frame.screen_height()), (2560, 1440));
    assert!(!frame.is_target_present());
}

#[test]
fn test_no_monitor_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScreenFrame::new(config_with(dir.path()), MockWindows::new(), MockDisplay::new(vec![]))
        .unwrap_err();
    assert!(matches!(err, FrameError::NoMonitor));
}

#[test]
fn test_failed_monitor_enumeration_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display().with_failing_enumeration();
    let windows = window_on(0, 0, 2560, 1440);
    let err = ScreenFrame::new(config_with(dir.path()), windows, display.clone()).unwrap_err();

    assert!(matches!(err, FrameError::CaptureFailed { .. }));
    assert!(err.is_transient());
    assert!(display.grab_log().is_empty());
}

#[test]
fn test_still_image_capture_never_touches_display() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let mut frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone()).unwrap();

    frame.set_still_image(CaptureFrame::from_test_pattern(1920, 1080));
    let region = frame
        .capture_percent(&PercentRect::new(0.5, 0.5, 0.75, 1.0))
        .unwrap();
    assert_eq!(region.dimensions(), (480, 540));
    assert_eq!(region.pixel(0, 0), Some([(960 % 256) as u8, (540 % 256) as u8, 128]));

    let pixels = frame.capture_pixels(&PixelRect::new(10, 10, 20, 30)).unwrap();
    assert_eq!(pixels.dimensions(), (10, 20));

    frame.capture_full().unwrap();
    assert!(display.grab_log().is_empty());
}

#[test]
fn test_still_region_past_edge_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let mut frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();
    frame.set_still_image(CaptureFrame::from_test_pattern(100, 100));

    let region = frame
        .capture_percent(&PercentRect::new(0.9, 0.9, 1.2, 1.5))
        .unwrap();
    assert_eq!(region.dimensions(), (10, 10));

    let err = frame
        .capture_percent(&PercentRect::new(1.1, 0.0, 1.5, 0.5))
        .unwrap_err();
    assert!(matches!(err, FrameError::InvalidRegion { .. }));
}

#[test]
fn test_capture_failure_does_not_poison_state() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let frame = ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone())
        .unwrap();
    let geometry = frame.geometry();
    let scale = frame.scale();

    display.fail_next_grabs(1);
    let err = frame.capture_full().unwrap_err();
    assert!(err.is_transient());

    assert_eq!(frame.geometry(), geometry);
    assert_eq!(frame.scale(), scale);
    let full = frame.capture_full().unwrap();
    assert_eq!(full.dimensions(), (2560, 1440));
}

#[test]
fn test_disconnected_monitor_is_reported_per_call() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let frame = ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone())
        .unwrap();

    display.disconnect(1);
    let err = frame.capture_full().unwrap_err();
    assert!(matches!(err, FrameError::MonitorNotFound { index: 1 }));
}

#[test]
fn test_empty_region_is_rejected_before_grabbing() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let frame = ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone())
        .unwrap();

    let err = frame
        .capture_percent(&PercentRect::new(0.6, 0.2, 0.4, 0.8))
        .unwrap_err();
    assert!(matches!(err, FrameError::InvalidRegion { .. }));
    assert!(display.grab_log().is_empty());
}

#[test]
fn test_calibration_file_overrides_scale() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = ScaleTable::empty();
    table.insert(2560, 1440, Scale { x: 0.9, y: 0.8 });
    table.save(&dir.path().join("resolution.json")).unwrap();

    let frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();
    assert_eq!(frame.scale(), Scale { x: 0.9, y: 0.8 });
    assert_eq!(frame.scale_table().len(), 1);
}

#[test]
fn test_corrupt_calibration_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("resolution.json"), "{ not json").unwrap();

    let frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();
    assert_eq!(frame.scale_table(), &ScaleTable::default());
    assert_eq!(frame.scale(), Scale { x: 1.0, y: 1.0 });
}

#[test]
fn test_save_then_reload_scales() {
    let dir = tempfile::tempdir().unwrap();
    let mut frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();

    frame.save_scales().unwrap();
    let text = std::fs::read_to_string(dir.path().join("resolution.json")).unwrap();
    assert!(text.contains("\n    \"1024x768\": ["));

    let mut edited = ScaleTable::load(&dir.path().join("resolution.json")).unwrap();
    assert_eq!(&edited, frame.scale_table());
    edited.insert(2560, 1440, Scale { x: 0.5, y: 0.5 });
    edited.save(&dir.path().join("resolution.json")).unwrap();

    frame.reload_scales().unwrap();
    assert_eq!(frame.scale(), Scale { x: 0.5, y: 0.5 });
}

#[test]
fn test_failed_reload_keeps_current_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut frame =
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), dual_monitor_display())
            .unwrap();

    let err = frame.reload_scales().unwrap_err();
    assert!(matches!(err, FrameError::ConfigLoad { .. }));
    assert_eq!(frame.scale_table(), &ScaleTable::default());
}

#[test]
fn test_save_scales_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("configs");
    let frame =
        ScreenFrame::new(config_with(&nested), MockWindows::new(), dual_monitor_display())
            .unwrap();

    frame.save_scales().unwrap();
    assert!(nested.join("resolution.json").exists());
}

#[test]
fn test_handle_opened_once_per_thread() {
    let dir = tempfile::tempdir().unwrap();
    let display = dual_monitor_display();
    let frame = Arc::new(
        ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone()).unwrap(),
    );
    // Construction opened the handle for this thread
    assert_eq!(display.opened_count(), 1);

    frame.capture_full().unwrap();
    assert_eq!(display.opened_count(), 1);

    let workers: Vec<_> = (0..3)
        .map(|_| {
            let frame = Arc::clone(&frame);
            std::thread::spawn(move || {
                for _ in 0..3 {
                    frame
                        .capture_percent(&PercentRect::new(0.0, 0.0, 0.1, 0.1))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(display.opened_count(), 4);
    assert_eq!(display.grab_log().len(), 1 + 9);
}

#[test]
fn test_focus_target() {
    let dir = tempfile::tempdir().unwrap();
    let windows = MockWindows::new().with_window(GAME, WindowRect::new(0, 0, 2560, 1440));
    let frame = ScreenFrame::new(config_with(dir.path()), windows.clone(), dual_monitor_display())
        .unwrap();

    frame.focus_target().unwrap();
    frame.focus_target().unwrap();
    assert_eq!(windows.activation_count(), 1);

    windows.close(GAME);
    assert!(!frame.is_target_present());
    assert!(matches!(frame.focus_target().unwrap_err(), FrameError::WindowNotFound { .. }));
}

#[test]
fn test_4_3_monitor_crops_top_and_bottom() {
    let dir = tempfile::tempdir().unwrap();
    let display = MockDisplay::new(vec![MonitorDescriptor::new(1, 0, 0, 1024, 768)]);
    let frame = ScreenFrame::new(config_with(dir.path()), MockWindows::new(), display.clone())
        .unwrap();

    assert_eq!((frame.screen_width(), frame.screen_height()), (1024, 576));
    let overlay = frame.percent_to_overlay(&PercentRect::FULL);
    assert_eq!(overlay.to_array(), [0, 96, 1024, 672]);
    // 1024x576 has no table entry
    assert_eq!(frame.scale(), Scale {
        x: 1024.0 / 3440.0,
        y: 576.0 / 1440.0,
    });

    let region = frame.capture_percent(&PercentRect::FULL).unwrap();
    assert_eq!(region.dimensions(), (1024, 576));
    assert_eq!(region.pixel(0, 0), Some([0, 96, 128]));
}
