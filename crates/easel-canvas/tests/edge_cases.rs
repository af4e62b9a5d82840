//! Edge case tests for easel-canvas

use easel_canvas::*;

fn recording(width: u32, height: u32) -> (Canvas, DisplayList) {
    let context = RecordingContext::new(width, height).unwrap();
    let list = context.display_list();
    (Canvas::from_context(Box::new(context)), list)
}

fn skia(width: u32, height: u32) -> Canvas {
    Canvas::with_backend(&SkiaBackend::new(), width, height).unwrap()
}

fn text_calls(list: &DisplayList) -> Vec<(String, f64, String)> {
    list.commands()
        .into_iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::FillText { text, y, font, .. } => Some((text, y, font)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// SURFACE
// ============================================================================

#[test]
fn test_empty_surface_rejected() {
    let err = Canvas::with_backend(&RecordingBackend::new(), 0, 10).unwrap_err();
    assert!(matches!(err, CanvasError::InvalidSurface { width: 0, height: 10 }));
}

#[test]
fn test_resize_resets_state() {
    let (mut canvas, list) = recording(4, 4);
    canvas.set_text_font("bold 30px serif").translate(5.0, 5.0);
    canvas.change_canvas_width(8).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (8, 4));
    assert_eq!(canvas.text_font(), "10px sans-serif");
    assert!(canvas.transform().is_identity());
    assert_eq!(list.names(), vec!["resize"]);
}

#[test]
fn test_restore_without_save_is_noop() {
    let (mut canvas, _) = recording(4, 4);
    canvas.set_global_alpha(0.5).restore().restore();
    assert_eq!(canvas.context().state().global_alpha, 0.5);
}

// ============================================================================
// SHAPES
// ============================================================================

#[test]
fn test_skia_rectangle_pixels() {
    let mut canvas = skia(10, 10);
    canvas.set_color(Color::rgb(255, 0, 0)).print_rectangle(2.0, 2.0, 4.0, 4.0);
    let data = canvas.get_image_data();
    assert_eq!(data.get_pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(data.get_pixel(8, 8), Some([0, 0, 0, 0]));
}

#[test]
fn test_skia_circle_leaves_corners_empty() {
    let mut canvas = skia(20, 20);
    canvas.set_color(Color::rgb(0, 0, 255)).print_circle(10.0, 10.0, 8.0);
    let data = canvas.get_image_data();
    assert_eq!(data.get_pixel(10, 10), Some([0, 0, 255, 255]));
    assert_eq!(data.get_pixel(0, 0), Some([0, 0, 0, 0]));
    assert!(canvas.context().state().clips.is_empty());
}

#[test]
fn test_clear_circle_keeps_outside() {
    let mut canvas = skia(20, 20);
    canvas
        .set_color(Color::rgb(0, 255, 0))
        .print_rectangle(0.0, 0.0, 20.0, 20.0)
        .clear_circle(10.0, 10.0, 5.0);
    let data = canvas.get_image_data();
    assert_eq!(data.get_pixel(10, 10).map(|p| p[3]), Some(0));
    assert_eq!(data.get_pixel(1, 1), Some([0, 255, 0, 255]));
}

#[test]
fn test_rounded_rectangle_path_shape() {
    let (mut canvas, _) = recording(40, 40);
    canvas.create_rounded_path(0.0, 0.0, 40.0, 20.0, 10.0);
    assert!(canvas.is_point_in_path(20.0, 10.0, FillRule::NonZero));
    // corner cut away by the radius
    assert!(!canvas.is_point_in_path(0.5, 0.5, FillRule::NonZero));
}

#[test]
fn test_rounded_path_with_partial_corners() {
    let (mut canvas, _) = recording(40, 40);
    let radius = BorderRadius {
        bottom_right: Some(0.0),
        ..BorderRadius::default()
    };
    canvas.create_rounded_path(0.0, 0.0, 20.0, 20.0, radius);
    assert!(canvas.is_point_in_path(19.9, 19.9, FillRule::NonZero));
    assert!(!canvas.is_point_in_path(0.1, 0.1, FillRule::NonZero));
}

#[test]
fn test_rectangle_path_does_not_begin_path() {
    let (mut canvas, _) = recording(20, 20);
    canvas
        .begin_path()
        .create_rectangle_path(0.0, 0.0, 5.0, 5.0)
        .create_rectangle_path(10.0, 10.0, 5.0, 5.0);
    assert!(canvas.is_point_in_path(2.0, 2.0, FillRule::NonZero));
    assert!(canvas.is_point_in_path(12.0, 12.0, FillRule::NonZero));
}

// ============================================================================
// CIRCULAR IMAGES
// ============================================================================

#[test]
fn test_circular_coordinates() {
    let at = |w, h, fit| Canvas::resolve_circular_coordinates(w, h, 50.0, 50.0, 10.0, fit);
    let tuple = |c: CircularCoordinates| (c.position_x, c.position_y, c.size_x, c.size_y);

    assert_eq!(tuple(at(40.0, 20.0, ImageFit::None)), (30.0, 40.0, 40.0, 20.0));
    assert_eq!(tuple(at(40.0, 20.0, ImageFit::Fill)), (40.0, 40.0, 20.0, 20.0));
    assert_eq!(tuple(at(30.0, 30.0, ImageFit::Cover)), (40.0, 40.0, 20.0, 20.0));

    // landscape
    assert_eq!(tuple(at(40.0, 20.0, ImageFit::Contain)), (40.0, 45.0, 20.0, 10.0));
    assert_eq!(tuple(at(40.0, 20.0, ImageFit::Cover)), (30.0, 40.0, 40.0, 20.0));

    // portrait
    assert_eq!(tuple(at(20.0, 40.0, ImageFit::Contain)), (45.0, 40.0, 10.0, 20.0));
    assert_eq!(tuple(at(20.0, 40.0, ImageFit::Cover)), (40.0, 30.0, 20.0, 40.0));
}

#[test]
fn test_circular_image_is_clipped() {
    let image = Image::new(PixelBuffer::filled(4, 4, [255, 255, 0, 255]));
    let mut canvas = skia(20, 20);
    canvas.print_circular_image(&image, 10.0, 10.0, 6.0, ImageFit::Fill);
    let data = canvas.get_image_data();
    assert_eq!(data.get_pixel(10, 10), Some([255, 255, 0, 255]));
    assert_eq!(data.get_pixel(3, 3).map(|p| p[3]), Some(0));
    assert!(canvas.context().state().clips.is_empty());
}

#[test]
fn test_draw_image_recorded() {
    let image = Image::new(PixelBuffer::new(3, 2));
    let (mut canvas, list) = recording(10, 10);
    canvas.print_image(&image, 1.0, 1.0);
    assert_eq!(
        list.commands(),
        vec![DrawCommand::DrawImage {
            width: 3,
            height: 2,
            source: Rect::new(0.0, 0.0, 3.0, 2.0),
            dest: Rect::new(1.0, 1.0, 3.0, 2.0),
        }]
    );
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_multiline_text_advances_by_font_height() {
    let (mut canvas, list) = recording(100, 100);
    canvas.set_text_font("20px sans-serif").print_multiline_text("one\ntwo\nthree", 0.0, 10.5);
    let calls = text_calls(&list);
    let ys: Vec<f64> = calls.iter().map(|(_, y, _)| *y).collect();
    assert_eq!(ys, vec![10.0, 30.0, 50.0]);
    assert_eq!(calls[2].0, "three");
}

#[test]
fn test_single_line_keeps_raw_y() {
    let (mut canvas, list) = recording(100, 100);
    canvas.print_multiline_text("alone", 0.0, 10.5);
    assert_eq!(text_calls(&list)[0].1, 10.5);
}

#[test]
fn test_wrapped_text_uses_current_font() {
    // recording backend measures half the font size per character
    let (mut canvas, list) = recording(100, 100);
    assert_eq!(canvas.wrap_text("aaa bbb", 20.0), "aaa\nbbb");
    canvas.print_wrapped_text("aaa bbb", 0.0, 0.0, 20.0);
    let texts: Vec<String> = text_calls(&list).into_iter().map(|(t, _, _)| t).collect();
    assert_eq!(texts, vec!["aaa", "bbb"]);
}

#[test]
fn test_responsive_text_shrinks_font() {
    let (mut canvas, list) = recording(100, 100);
    canvas
        .set_text_font("bold 20px sans-serif")
        .print_responsive_text("abcd", 0.0, 0.0, 20.0);
    assert_eq!(canvas.text_font(), "bold 10px sans-serif");
    assert_eq!(text_calls(&list)[0].2, "bold 10px sans-serif");
}

#[test]
fn test_responsive_text_keeps_fitting_font() {
    let (mut canvas, _) = recording(100, 100);
    canvas
        .set_text_font("20px sans-serif")
        .print_responsive_text("ab", 0.0, 0.0, 100.0);
    assert_eq!(canvas.text_font(), "20px sans-serif");
}

#[test]
fn test_font_units_resolve_to_pixels() {
    let (mut canvas, _) = recording(10, 10);
    canvas.set_text_font("italic 12pt serif");
    assert_eq!(canvas.text_font_height(), 16.0);
}

// ============================================================================
// STYLES
// ============================================================================

#[test]
fn test_css_colors_on_canvas() {
    let (mut canvas, _) = recording(4, 4);
    canvas.set_color_css("rgba(10, 20, 30, 0.5)").unwrap();
    assert_eq!(canvas.context().state().fill_style, Paint::Color(Color::rgba(10, 20, 30, 128)));
    canvas.set_stroke_css("rebeccapurple").unwrap();
    assert_eq!(canvas.context().state().stroke_style, Paint::Color(Color::rgb(102, 51, 153)));
}

#[test]
fn test_reset_shadows_and_filters() {
    let (mut canvas, _) = recording(4, 4);
    canvas
        .set_shadow_blur(4.0)
        .set_shadow_offset_x(2.0)
        .set_shadow_color(Color::BLACK)
        .set_filter(&filter("blur", &["2px"]))
        .reset_shadows()
        .reset_filters();
    let state = canvas.context().state();
    assert_eq!(state.shadow_blur, 0.0);
    assert_eq!(state.shadow_offset_x, 0.0);
    assert_eq!(state.shadow_color, Color::TRANSPARENT);
    assert_eq!(state.filter, "none");
}

#[test]
fn test_line_dash_odd_list_duplicated() {
    let (mut canvas, _) = recording(4, 4);
    canvas.set_line_dash(&[5.0, 10.0, 15.0]);
    assert_eq!(canvas.line_dash(), vec![5.0, 10.0, 15.0, 5.0, 10.0, 15.0]);
}

#[test]
fn test_gradient_stops_sorted() {
    let (mut canvas, _) = recording(4, 4);
    canvas.print_linear_color_gradient(0.0, 0.0, 4.0, 0.0, &[(1.0, Color::WHITE), (0.0, Color::BLACK)]);
    let Paint::Gradient(gradient) = &canvas.context().state().fill_style else {
        panic!("expected gradient fill");
    };
    let offsets: Vec<f64> = gradient.stops.iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 1.0]);
}

#[test]
fn test_skia_gradient_renders() {
    let mut canvas = skia(10, 1);
    canvas
        .print_linear_color_gradient(0.0, 0.0, 10.0, 0.0, &[(0.0, Color::BLACK), (1.0, Color::WHITE)])
        .print_rectangle(0.0, 0.0, 10.0, 1.0);
    let data = canvas.get_image_data();
    let left = data.get_pixel(0, 0).unwrap();
    let right = data.get_pixel(9, 0).unwrap();
    assert!(left[0] < right[0]);
    assert_eq!(right[3], 255);
}

#[test]
fn test_unknown_keywords_name_their_kind() {
    let (mut canvas, _) = recording(4, 4);
    let op: CompositeOperation = "xor".parse().unwrap();
    canvas.set_global_composite_operation(op);
    assert_eq!(canvas.context().state().global_composite_operation, CompositeOperation::Xor);

    let err = "plus-darker".parse::<CompositeOperation>().unwrap_err();
    assert!(matches!(&err, CanvasError::UnknownKeyword { kind: "composite operation", value } if value == "plus-darker"));
    assert!(matches!(
        "space".parse::<PatternRepetition>(),
        Err(CanvasError::UnknownKeyword { kind: "pattern repetition", .. })
    ));
    assert_eq!("cairo".parse::<BackendKind>().unwrap_err().to_string(), "Unknown backend: `cairo`");
}

#[test]
fn test_backend_specific_setters() {
    let mut canvas = skia(4, 4);
    assert!(canvas.set_anti_aliasing(false).is_ok());
    assert!(canvas.set_pattern_quality(PatternQuality::Nearest).is_ok());
    assert!(matches!(
        canvas.set_text_drawing_mode(TextDrawingMode::Glyph),
        Err(CanvasError::NotSupported { .. })
    ));

    let (mut canvas, _) = recording(4, 4);
    assert!(canvas.set_text_drawing_mode(TextDrawingMode::Glyph).is_ok());
}

// ============================================================================
// FILTERS
// ============================================================================

#[test]
fn test_invert_matches_pixel_filter() {
    let (mut composited, _) = recording(2, 2);
    composited.set_color(Color::rgb(10, 20, 30)).print_rectangle(0.0, 0.0, 2.0, 2.0).invert();

    let (mut filtered, _) = recording(2, 2);
    filtered
        .set_color(Color::rgb(10, 20, 30))
        .print_rectangle(0.0, 0.0, 2.0, 2.0)
        .apply_filter(&Filter::Invert);

    assert_eq!(composited.get_image_data().get_pixel(1, 1), Some([245, 235, 225, 255]));
    assert_eq!(composited.get_image_data(), filtered.get_image_data());
}

#[test]
fn test_threshold_on_canvas() {
    let (mut canvas, _) = recording(2, 1);
    canvas
        .set_color(Color::rgb(200, 200, 200))
        .print_rectangle(0.0, 0.0, 1.0, 1.0)
        .set_color(Color::rgb(20, 20, 20))
        .print_rectangle(1.0, 0.0, 1.0, 1.0)
        .threshold(128.0);
    let data = canvas.get_image_data();
    assert_eq!(data.get_pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(data.get_pixel(1, 0), Some([0, 0, 0, 255]));
}

#[test]
fn test_filters_keep_size() {
    let (mut canvas, list) = recording(3, 3);
    canvas.blur(2).sharpen(1).edge();
    assert_eq!(canvas.get_image_data().width(), 3);
    assert_eq!(list.names(), vec!["putImageData"; 3]);
}

#[test]
fn test_region_outside_surface_is_transparent() {
    let (mut canvas, _) = recording(2, 2);
    canvas.print_rectangle(0.0, 0.0, 2.0, 2.0);
    let region = canvas.get_image_data_region(-1, -1, 2, 2);
    assert_eq!(region.get_pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(region.get_pixel(1, 1), Some([0, 0, 0, 255]));
}

// ============================================================================
// EXPORT
// ============================================================================

#[test]
fn test_png_export() {
    let mut canvas = skia(3, 3);
    canvas.set_color(Color::WHITE).print_rectangle(0.0, 0.0, 3.0, 3.0);
    let png = canvas.to_buffer().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = Image::decode(&png).unwrap();
    assert_eq!(decoded.pixels().get_pixel(1, 1), Some([255, 255, 255, 255]));
}

#[test]
fn test_async_export_matches_sync() {
    let mut canvas = skia(2, 2);
    canvas.set_color(Color::rgb(1, 2, 3)).print_rectangle(0.0, 0.0, 1.0, 1.0);
    let sync = canvas.to_data_url().unwrap();
    let async_url = smol::block_on(canvas.to_data_url_async()).unwrap();
    assert!(sync.starts_with("data:image/png;base64,"));
    assert_eq!(sync, async_url);
    assert_eq!(smol::block_on(canvas.to_buffer_async()).unwrap(), canvas.to_buffer().unwrap());
}

#[test]
fn test_resolve_image_from_data_url() {
    let mut canvas = skia(2, 2);
    canvas.set_color(Color::rgb(9, 8, 7)).print_rectangle(0.0, 0.0, 2.0, 2.0);
    let url = canvas.to_data_url().unwrap();
    let image = smol::block_on(resolve_image(url)).unwrap();
    assert_eq!((image.width(), image.height()), (2, 2));
    assert_eq!(image.pixels().get_pixel(0, 0), Some([9, 8, 7, 255]));
}

#[test]
fn test_missing_image_file() {
    let err = smol::block_on(resolve_image(std::path::PathBuf::from("/nonexistent/easel.png"))).unwrap_err();
    assert!(matches!(err, CanvasError::ImageLoad { .. }));
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_config_from_json() {
    let config: EaselConfig = serde_json::from_str(r#"{"backend": "recording"}"#).unwrap();
    assert_eq!(config.backend, BackendKind::Recording);
    assert!(!config.load_system_fonts);
    assert_eq!(config.default_font, "10px sans-serif");
}

#[test]
fn test_backend_default_font() {
    let backend = RecordingBackend::with_default_font("bold 14px serif");
    let canvas = Canvas::with_backend(&backend, 4, 4).unwrap();
    assert_eq!(canvas.text_font(), "bold 14px serif");
    assert_eq!(canvas.text_font_height(), 14.0);
}
