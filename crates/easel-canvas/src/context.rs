//! Drawing context
//!
//! The 2D-canvas primitives every backend provides. Backends implement the
//! rasterizing operations; state handling, path building and the setters are
//! provided on top of the state stack and current path they expose.

use easel_filters::PixelBuffer;

use crate::{
    bitmap::Image,
    color::Color,
    compositing::CompositeOperation,
    path::Path2D,
    state::{CanvasState, ClipRegion, StateStack},
    style::{FillRule, LineCap, LineJoin, Paint, PatternQuality, TextAlign, TextBaseline, TextDrawingMode},
    transforms::TransformMatrix,
    CanvasError, Result,
};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Text metrics as returned by `measure_text`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub actual_bounding_box_ascent: f64,
    pub actual_bounding_box_descent: f64,
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
}

impl TextMetrics {
    /// Metrics from an advance width and font ascent/descent (both positive)
    pub fn from_extents(width: f64, ascent: f64, descent: f64) -> Self {
        Self {
            width,
            actual_bounding_box_left: 0.0,
            actual_bounding_box_right: width,
            actual_bounding_box_ascent: ascent,
            actual_bounding_box_descent: descent,
            font_bounding_box_ascent: ascent,
            font_bounding_box_descent: descent,
        }
    }

    /// Ascent plus descent
    pub fn height(&self) -> f64 {
        self.actual_bounding_box_ascent + self.actual_bounding_box_descent
    }
}

/// A 2D drawing context
pub trait DrawingContext: Send {
    /// Short backend name used in errors and logs
    fn backend_name(&self) -> &'static str;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Replace the surface with a blank one of the new size and reset the state
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    fn state_stack(&self) -> &StateStack;

    fn state_stack_mut(&mut self) -> &mut StateStack;

    fn current_path(&self) -> &Path2D;

    fn current_path_mut(&mut self) -> &mut Path2D;

    /// Fill a device-space path with the current fill style
    fn fill_path(&mut self, path: &Path2D, rule: FillRule);

    /// Stroke a device-space path with the current stroke style
    fn stroke_path(&mut self, path: &Path2D);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    fn measure_text(&self, text: &str) -> TextMetrics;

    /// Draw the `source` region of `image` into `dest` (user space)
    fn draw_image(&mut self, image: &Image, source: Rect, dest: Rect);

    /// Copy a device-space region out; pixels outside the surface are transparent
    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelBuffer;

    /// Write pixels at a device-space position, ignoring state
    fn put_image_data(&mut self, data: &PixelBuffer, x: i32, y: i32);

    fn set_anti_aliasing(&mut self, _enabled: bool) -> Result<()> {
        Err(self.not_supported("antialias"))
    }

    fn set_pattern_quality(&mut self, _quality: PatternQuality) -> Result<()> {
        Err(self.not_supported("patternQuality"))
    }

    fn set_text_drawing_mode(&mut self, _mode: TextDrawingMode) -> Result<()> {
        Err(self.not_supported("textDrawingMode"))
    }

    fn not_supported(&self, feature: &'static str) -> CanvasError {
        CanvasError::NotSupported {
            backend: self.backend_name(),
            feature,
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    fn state(&self) -> &CanvasState {
        self.state_stack().current()
    }

    fn state_mut(&mut self) -> &mut CanvasState {
        self.state_stack_mut().current_mut()
    }

    fn save(&mut self) {
        self.state_stack_mut().save();
    }

    fn restore(&mut self) {
        self.state_stack_mut().restore();
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    fn get_transform(&self) -> TransformMatrix {
        self.state().transform
    }

    /// Multiply the current transform by `m`
    fn transform(&mut self, m: TransformMatrix) {
        let state = self.state_mut();
        state.transform = state.transform.multiply(&m);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform(TransformMatrix::translate(x, y));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.transform(TransformMatrix::scale(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.transform(TransformMatrix::rotate(angle));
    }

    fn set_transform(&mut self, m: TransformMatrix) {
        self.state_mut().transform = m;
    }

    fn reset_transform(&mut self) {
        self.set_transform(TransformMatrix::identity());
    }

    // ========================================================================
    // Path building
    // ========================================================================

    /// Current path with its transform synced to the current transform
    fn path_for_building(&mut self) -> &mut Path2D {
        let transform = self.state().transform;
        let path = self.current_path_mut();
        path.set_transform(transform);
        path
    }

    fn begin_path(&mut self) {
        self.current_path_mut().clear();
    }

    fn close_path(&mut self) {
        self.current_path_mut().close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path_for_building().move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path_for_building().line_to(x, y);
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.path_for_building().quadratic_curve_to(cpx, cpy, x, y);
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.path_for_building().bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, counterclockwise: bool) {
        self.path_for_building().arc(x, y, radius, start_angle, end_angle, counterclockwise);
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        self.path_for_building().arc_to(x1, y1, x2, y2, radius);
    }

    #[allow(clippy::too_many_arguments)]
    fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) {
        self.path_for_building()
            .ellipse(x, y, rx, ry, rotation, start_angle, end_angle, counterclockwise);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.path_for_building().rect(x, y, width, height);
    }

    // ========================================================================
    // Painting
    // ========================================================================

    fn fill(&mut self, rule: FillRule) {
        let path = self.current_path().clone();
        self.fill_path(&path, rule);
    }

    fn stroke(&mut self) {
        let path = self.current_path().clone();
        self.stroke_path(&path);
    }

    /// Intersect the clip with the current path
    fn clip(&mut self, rule: FillRule) {
        let path = self.current_path().clone();
        self.state_mut().clips.push(ClipRegion { path, rule });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut path = Path2D::new();
        path.set_transform(self.state().transform);
        path.rect(x, y, width, height);
        self.fill_path(&path, FillRule::NonZero);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut path = Path2D::new();
        path.set_transform(self.state().transform);
        path.rect(x, y, width, height);
        self.stroke_path(&path);
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    /// Device-space point against the current path
    fn is_point_in_path(&self, x: f64, y: f64, rule: FillRule) -> bool {
        self.current_path().contains(x, y, rule)
    }

    fn is_point_in_stroke(&self, x: f64, y: f64) -> bool {
        let state = self.state();
        let width = state.line_width * state.transform.scale_factor();
        self.current_path().stroke_contains(x, y, width)
    }

    // ========================================================================
    // Style setters
    // ========================================================================

    fn set_fill_style(&mut self, paint: Paint) {
        self.state_mut().fill_style = paint;
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.state_mut().stroke_style = paint;
    }

    /// Non-finite or non-positive widths are ignored
    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state_mut().line_width = width;
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state_mut().line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state_mut().line_join = join;
    }

    fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit > 0.0 {
            self.state_mut().miter_limit = limit;
        }
    }

    /// Odd-length lists are repeated once; lists with negative or
    /// non-finite entries are ignored
    fn set_line_dash(&mut self, segments: &[f64]) {
        if segments.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return;
        }
        let mut dash = segments.to_vec();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(segments);
        }
        self.state_mut().line_dash = dash;
    }

    fn line_dash(&self) -> Vec<f64> {
        self.state().line_dash.clone()
    }

    fn set_line_dash_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.state_mut().line_dash_offset = offset;
        }
    }

    fn set_font(&mut self, font: &str) {
        self.state_mut().font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state_mut().text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state_mut().text_baseline = baseline;
    }

    /// Values outside 0..=1 are ignored
    fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state_mut().global_alpha = alpha;
        }
    }

    fn set_global_composite_operation(&mut self, op: CompositeOperation) {
        self.state_mut().global_composite_operation = op;
    }

    fn set_shadow_blur(&mut self, blur: f64) {
        if blur.is_finite() && blur >= 0.0 {
            self.state_mut().shadow_blur = blur;
        }
    }

    fn set_shadow_color(&mut self, color: Color) {
        self.state_mut().shadow_color = color;
    }

    fn set_shadow_offset_x(&mut self, offset: f64) {
        self.state_mut().shadow_offset_x = offset;
    }

    fn set_shadow_offset_y(&mut self, offset: f64) {
        self.state_mut().shadow_offset_y = offset;
    }

    fn set_filter(&mut self, filter: &str) {
        self.state_mut().filter = filter.to_string();
    }
}
