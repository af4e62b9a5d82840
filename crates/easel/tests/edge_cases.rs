//! Process-level tests for easel
//!
//! Everything here shares one installed backend, so the tests only ever
//! request the recording backend.

use easel::*;

fn recording_config() -> EaselConfig {
    EaselConfig {
        backend: BackendKind::Recording,
        ..EaselConfig::default()
    }
}

// ============================================================================
// INSTALL
// ============================================================================

#[test]
fn test_init_installs_requested_backend() {
    let backend = init(&recording_config());
    assert_eq!(backend.kind(), BackendKind::Recording);
    assert_eq!(init(&recording_config()).kind(), BackendKind::Recording);
}

#[test]
fn test_canvas_new_uses_installed_backend() {
    init(&recording_config());
    let canvas = Canvas::new(16, 8).unwrap();
    assert_eq!(canvas.context().backend_name(), "recording");
    assert_eq!((canvas.width(), canvas.height()), (16, 8));
}

#[test]
fn test_logging_init_is_idempotent() {
    init_logging();
    init_logging();
}

// ============================================================================
// RE-EXPORTS
// ============================================================================

#[test]
fn test_text_helpers_reexported() {
    assert_eq!(parse_font_size("12pt serif"), 16.0);
    assert_eq!(text::with_font_size("bold 10px Arial", 12.0), "bold 12px Arial");
}

#[test]
fn test_filter_by_name() {
    init(&recording_config());
    let mut canvas = Canvas::new(1, 1).unwrap();
    let sepia: Filter = "sepia".parse().unwrap();
    canvas.set_color(Color::WHITE).print_rectangle(0.0, 0.0, 1.0, 1.0).apply_filter(&sepia);
    let px = canvas.get_image_data().get_pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
    assert!(px[0] >= px[2]);
}
