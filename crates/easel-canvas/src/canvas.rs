//! Canvas facade
//!
//! `Canvas` wraps one drawing context and exposes chainable helpers for
//! shapes, images, text, styles and whole-image filters.

use std::f64::consts::TAU;

use easel_filters::{Filter, FilterList, Kernel, PixelBuffer};
use easel_text::{multiline_positions, parse_font_size, responsive_font_size, with_font_size, FontShorthand};

use crate::{
    backend::{self, Backend},
    bitmap::{encode_png, to_data_url, Image},
    color::{parse_css_color, Color},
    compositing::CompositeOperation,
    context::{DrawingContext, Rect, TextMetrics},
    style::{
        FillRule, Gradient, LineCap, LineJoin, Paint, Pattern, PatternQuality, PatternRepetition,
        TextAlign, TextBaseline, TextDrawingMode,
    },
    transforms::TransformMatrix,
    CanvasError, Result,
};

/// How an image is fitted into a circle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFit {
    /// Natural size, centered
    None,
    /// Stretched to the circle's bounding square
    #[default]
    Fill,
    /// Whole image visible inside the bounding square
    Contain,
    /// Bounding square covered, overflow clipped
    Cover,
}

/// Placement computed by `Canvas::resolve_circular_coordinates`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularCoordinates {
    pub position_x: f64,
    pub position_y: f64,
    pub size_x: f64,
    pub size_y: f64,
}

/// Per-corner radii; missing corners default to `min(5, w / 2, h / 2)`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderRadius {
    pub top_left: Option<f64>,
    pub top_right: Option<f64>,
    pub bottom_right: Option<f64>,
    pub bottom_left: Option<f64>,
}

/// Radius argument of the rounded shape helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundedRadius {
    /// Same radius everywhere, clamped to half the width and height
    Uniform(f64),
    Corners(BorderRadius),
}

impl From<f64> for RoundedRadius {
    fn from(radius: f64) -> Self {
        Self::Uniform(radius)
    }
}

impl From<BorderRadius> for RoundedRadius {
    fn from(radius: BorderRadius) -> Self {
        Self::Corners(radius)
    }
}

impl RoundedRadius {
    /// `[top_left, top_right, bottom_right, bottom_left]` for a `width` x `height` box
    fn resolve(self, width: f64, height: f64) -> [f64; 4] {
        match self {
            Self::Uniform(radius) => [radius.min(width / 2.0).min(height / 2.0); 4],
            Self::Corners(corners) => {
                let fallback = 5f64.min(width / 2.0).min(height / 2.0);
                [
                    corners.top_left.unwrap_or(fallback),
                    corners.top_right.unwrap_or(fallback),
                    corners.bottom_right.unwrap_or(fallback),
                    corners.bottom_left.unwrap_or(fallback),
                ]
            }
        }
    }
}

/// Chainable drawing surface
pub struct Canvas {
    context: Box<dyn DrawingContext>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("backend", &self.context.backend_name())
            .field("width", &self.context.width())
            .field("height", &self.context.height())
            .finish()
    }
}

impl Canvas {
    /// New canvas on the installed backend
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_backend(backend::active(), width, height)
    }

    pub fn with_backend(backend: &dyn Backend, width: u32, height: u32) -> Result<Self> {
        let context = backend.create_context(width, height)?;
        tracing::debug!(backend = %backend.kind(), width, height, "canvas created");
        Ok(Self::from_context(context))
    }

    pub fn from_context(context: Box<dyn DrawingContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &dyn DrawingContext {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> &mut dyn DrawingContext {
        self.context.as_mut()
    }

    pub fn into_context(self) -> Box<dyn DrawingContext> {
        self.context
    }

    // ========================================================================
    // Size
    // ========================================================================

    pub fn width(&self) -> u32 {
        self.context.width()
    }

    pub fn height(&self) -> u32 {
        self.context.height()
    }

    /// Resize; the surface and drawing state are reset
    pub fn change_canvas_size(&mut self, width: u32, height: u32) -> Result<&mut Self> {
        self.context.resize(width, height)?;
        Ok(self)
    }

    pub fn change_canvas_width(&mut self, width: u32) -> Result<&mut Self> {
        let height = self.height();
        self.change_canvas_size(width, height)
    }

    pub fn change_canvas_height(&mut self, height: u32) -> Result<&mut Self> {
        let width = self.width();
        self.change_canvas_size(width, height)
    }

    // ========================================================================
    // State and transforms
    // ========================================================================

    pub fn save(&mut self) -> &mut Self {
        self.context.save();
        self
    }

    pub fn restore(&mut self) -> &mut Self {
        self.context.restore();
        self
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.context.rotate(angle);
        self
    }

    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.context.scale(x, y);
        self
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.context.translate(x, y);
        self
    }

    pub fn set_transform(&mut self, transform: TransformMatrix) -> &mut Self {
        self.context.set_transform(transform);
        self
    }

    pub fn transform(&self) -> TransformMatrix {
        self.context.get_transform()
    }

    pub fn reset_transformation(&mut self) -> &mut Self {
        self.context.reset_transform();
        self
    }

    /// Reset the CSS filter to `none`
    pub fn reset_filters(&mut self) -> &mut Self {
        self.set_filter("none")
    }

    pub fn reset_shadows(&mut self) -> &mut Self {
        self.set_shadow_blur(0.0)
            .set_shadow_offset_x(0.0)
            .set_shadow_offset_y(0.0)
            .set_shadow_color(Color::TRANSPARENT)
    }

    // ========================================================================
    // Paths
    // ========================================================================

    pub fn begin_path(&mut self) -> &mut Self {
        self.context.begin_path();
        self
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.context.close_path();
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.context.move_to(x, y);
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.context.line_to(x, y);
        self
    }

    pub fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, counterclockwise: bool) -> &mut Self {
        self.context.arc(x, y, radius, start_angle, end_angle, counterclockwise);
        self
    }

    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> &mut Self {
        self.context.arc_to(x1, y1, x2, y2, radius);
        self
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) -> &mut Self {
        self.context.quadratic_curve_to(cpx, cpy, x, y);
        self
    }

    pub fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) -> &mut Self {
        self.context.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
        self
    }

    /// Add a rectangle subpath to the current path
    pub fn create_rectangle_path(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.context.rect(x, y, width, height);
        self
    }

    pub fn create_rectangle_clip(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.create_rectangle_path(x, y, width, height).clip()
    }

    /// Start a new path holding a full circle
    pub fn create_circular_path(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.create_arc_path(x, y, radius, 0.0, TAU, false)
    }

    /// Start a new path holding one arc of a circle
    pub fn create_arc_path(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        self.context.begin_path();
        self.context.arc(x, y, radius, start_angle, end_angle, counterclockwise);
        self
    }

    pub fn create_circular_clip(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.create_circular_path(x, y, radius).clip()
    }

    pub fn create_arc_clip(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        self.create_arc_path(x, y, radius, start_angle, end_angle, counterclockwise)
            .clip()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_ellipse_path(
        &mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        self.context
            .ellipse(x, y, radius_x, radius_y, rotation, start_angle, end_angle, counterclockwise);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_ellipse_clip(
        &mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
    ) -> &mut Self {
        self.create_ellipse_path(x, y, radius_x, radius_y, rotation, start_angle, end_angle, counterclockwise)
            .clip()
    }

    /// Start a new path holding a rounded rectangle. Empty boxes leave the path untouched.
    pub fn create_rounded_path(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: impl Into<RoundedRadius>,
    ) -> &mut Self {
        if width <= 0.0 || height <= 0.0 {
            return self;
        }
        let [tl, tr, br, bl] = radius.into().resolve(width, height);

        let ctx = self.context.as_mut();
        ctx.begin_path();
        ctx.move_to(x + tl, y);
        ctx.line_to(x + width - tr, y);
        ctx.quadratic_curve_to(x + width, y, x + width, y + tr);
        ctx.line_to(x + width, y + height - br);
        ctx.quadratic_curve_to(x + width, y + height, x + width - br, y + height);
        ctx.line_to(x + bl, y + height);
        ctx.quadratic_curve_to(x, y + height, x, y + height - bl);
        ctx.line_to(x, y + tl);
        ctx.quadratic_curve_to(x, y, x + tl, y);
        ctx.close_path();
        self
    }

    pub fn create_rounded_clip(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: impl Into<RoundedRadius>,
    ) -> &mut Self {
        self.create_rounded_path(x, y, width, height, radius).clip()
    }

    /// Intersect the clip with the current path (non-zero rule)
    pub fn clip(&mut self) -> &mut Self {
        self.clip_with(FillRule::NonZero)
    }

    pub fn clip_with(&mut self, rule: FillRule) -> &mut Self {
        self.context.clip(rule);
        self
    }

    /// Fill the current path (non-zero rule)
    pub fn fill(&mut self) -> &mut Self {
        self.fill_with(FillRule::NonZero)
    }

    pub fn fill_with(&mut self, rule: FillRule) -> &mut Self {
        self.context.fill(rule);
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.context.stroke();
        self
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    pub fn print_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.context.fill_rect(x, y, width, height);
        self
    }

    pub fn print_stroke_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.context.stroke_rect(x, y, width, height);
        self
    }

    pub fn print_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.save().create_circular_path(x, y, radius).fill().restore()
    }

    pub fn print_rounded_rectangle(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: impl Into<RoundedRadius>,
    ) -> &mut Self {
        self.save()
            .create_rounded_path(x, y, width, height, radius)
            .fill()
            .restore()
    }

    pub fn clear_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.context.clear_rect(x, y, width, height);
        self
    }

    /// Clear the whole surface
    pub fn clear(&mut self) -> &mut Self {
        let (width, height) = (self.width() as f64, self.height() as f64);
        self.clear_rectangle(0.0, 0.0, width, height)
    }

    /// Clear a circle; the clip it needs is dropped afterwards
    pub fn clear_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.save()
            .create_circular_clip(x, y, radius)
            .clear_rectangle(x - radius, y - radius, radius * 2.0, radius * 2.0)
            .restore()
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Draw at natural size
    pub fn print_image(&mut self, image: &Image, x: f64, y: f64) -> &mut Self {
        let (width, height) = (image.width() as f64, image.height() as f64);
        self.print_image_scaled(image, x, y, width, height)
    }

    pub fn print_image_scaled(&mut self, image: &Image, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let source = Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64);
        self.print_image_cropped(image, source, Rect::new(x, y, width, height))
    }

    /// Draw the `source` region of the image into `dest`
    pub fn print_image_cropped(&mut self, image: &Image, source: Rect, dest: Rect) -> &mut Self {
        self.context.draw_image(image, source, dest);
        self
    }

    /// Draw an image clipped to a circle centred on (`x`, `y`)
    pub fn print_circular_image(&mut self, image: &Image, x: f64, y: f64, radius: f64, fit: ImageFit) -> &mut Self {
        let placement = Self::resolve_circular_coordinates(
            image.width() as f64,
            image.height() as f64,
            x,
            y,
            radius,
            fit,
        );
        self.save()
            .create_circular_clip(x, y, radius)
            .print_image_scaled(image, placement.position_x, placement.position_y, placement.size_x, placement.size_y)
            .restore()
    }

    pub fn print_rounded_image(
        &mut self,
        image: &Image,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: impl Into<RoundedRadius>,
    ) -> &mut Self {
        self.save()
            .create_rounded_clip(x, y, width, height, radius)
            .print_image_scaled(image, x, y, width, height)
            .restore()
    }

    /// Where to draw an image of `image_width` x `image_height` so it fits a
    /// circle of `radius` centred on (`x`, `y`)
    pub fn resolve_circular_coordinates(
        image_width: f64,
        image_height: f64,
        x: f64,
        y: f64,
        radius: f64,
        fit: ImageFit,
    ) -> CircularCoordinates {
        if fit == ImageFit::None {
            return CircularCoordinates {
                position_x: x - image_width / 2.0,
                position_y: y - image_height / 2.0,
                size_x: image_width,
                size_y: image_height,
            };
        }

        let ratio = image_width / image_height;
        let diameter = radius * 2.0;

        if fit == ImageFit::Fill || ratio == 1.0 {
            return CircularCoordinates {
                position_x: x - radius,
                position_y: y - radius,
                size_x: diameter,
                size_y: diameter,
            };
        }

        match (fit, ratio > 1.0) {
            (ImageFit::Contain, true) => CircularCoordinates {
                position_x: x - radius,
                position_y: y - radius / ratio,
                size_x: diameter,
                size_y: diameter / ratio,
            },
            (ImageFit::Contain, false) => CircularCoordinates {
                position_x: x - radius * ratio,
                position_y: y - radius,
                size_x: diameter * ratio,
                size_y: diameter,
            },
            (_, true) => {
                let size_x = diameter * ratio;
                CircularCoordinates {
                    position_x: x - size_x / 2.0,
                    position_y: y - diameter / 2.0,
                    size_x,
                    size_y: diameter,
                }
            }
            (_, false) => {
                let size_y = diameter / ratio;
                CircularCoordinates {
                    position_x: x - diameter / 2.0,
                    position_y: y - size_y / 2.0,
                    size_x: diameter,
                    size_y,
                }
            }
        }
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn print_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.context.fill_text(text, x, y, None);
        self
    }

    /// Fill text squeezed horizontally to at most `max_width`
    pub fn print_text_max_width(&mut self, text: &str, x: f64, y: f64, max_width: f64) -> &mut Self {
        self.context.fill_text(text, x, y, Some(max_width));
        self
    }

    pub fn print_stroke_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.context.stroke_text(text, x, y, None);
        self
    }

    pub fn print_stroke_text_max_width(&mut self, text: &str, x: f64, y: f64, max_width: f64) -> &mut Self {
        self.context.stroke_text(text, x, y, Some(max_width));
        self
    }

    /// Shrink the font so `text` fits in `max_width`, then draw it. The
    /// shrunken font stays set.
    pub fn print_responsive_text(&mut self, text: &str, x: f64, y: f64, max_width: f64) -> &mut Self {
        let font = self.context.state().font.clone();
        if let Ok(shorthand) = font.parse::<FontShorthand>() {
            let measured = self.context.measure_text(text).width;
            let size = responsive_font_size(shorthand.size.trunc(), measured, max_width);
            self.set_text_font(&shorthand.with_size(size).to_string());
        }
        self.print_text(text, x, y)
    }

    /// Draw each line of `text` one font height below the previous
    pub fn print_multiline_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        let line_height = self.text_font_height();
        let lines = multiline_positions(text, y, line_height);
        if lines.len() <= 1 {
            return self.print_text(text, x, y);
        }
        for (line, at) in lines {
            self.context.fill_text(line, x, at, None);
        }
        self
    }

    /// Wrap `text` to `max_width` with the current font, then draw it
    pub fn print_wrapped_text(&mut self, text: &str, x: f64, y: f64, max_width: f64) -> &mut Self {
        let wrapped = self.wrap_text(text, max_width);
        self.print_multiline_text(&wrapped, x, y)
    }

    /// Greedy word wrap measured with the current font
    pub fn wrap_text(&self, text: &str, max_width: f64) -> String {
        let context = self.context.as_ref();
        let measure = |s: &str| context.measure_text(s).width;
        easel_text::wrap_text(&measure, text, max_width)
    }

    pub fn measure_text(&self, text: &str) -> TextMetrics {
        self.context.measure_text(text)
    }

    /// Pixel size of the current font
    pub fn text_font_height(&self) -> f64 {
        parse_font_size(&self.context.state().font)
    }

    pub fn text_font(&self) -> &str {
        &self.context.state().font
    }

    pub fn set_text_font(&mut self, font: &str) -> &mut Self {
        self.context.set_font(font);
        self
    }

    /// Replace only the numeric size of the current font
    pub fn set_text_size(&mut self, size: f64) -> &mut Self {
        let font = with_font_size(&self.context.state().font, size);
        self.set_text_font(&font)
    }

    pub fn set_text_align(&mut self, align: TextAlign) -> &mut Self {
        self.context.set_text_align(align);
        self
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) -> &mut Self {
        self.context.set_text_baseline(baseline);
        self
    }

    // ========================================================================
    // Styles
    // ========================================================================

    /// Fill style
    pub fn set_color(&mut self, paint: impl Into<Paint>) -> &mut Self {
        self.context.set_fill_style(paint.into());
        self
    }

    /// Fill style from a CSS color string
    pub fn set_color_css(&mut self, css: &str) -> Result<&mut Self> {
        let color = parse_css_color(css).ok_or_else(|| CanvasError::InvalidColor(css.to_string()))?;
        Ok(self.set_color(color))
    }

    pub fn set_stroke(&mut self, paint: impl Into<Paint>) -> &mut Self {
        self.context.set_stroke_style(paint.into());
        self
    }

    pub fn set_stroke_css(&mut self, css: &str) -> Result<&mut Self> {
        let color = parse_css_color(css).ok_or_else(|| CanvasError::InvalidColor(css.to_string()))?;
        Ok(self.set_stroke(color))
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.context.set_line_width(width);
        self
    }

    pub fn set_stroke_width(&mut self, width: f64) -> &mut Self {
        self.set_line_width(width)
    }

    pub fn set_line_dash(&mut self, segments: &[f64]) -> &mut Self {
        self.context.set_line_dash(segments);
        self
    }

    pub fn set_line_dash_offset(&mut self, offset: f64) -> &mut Self {
        self.context.set_line_dash_offset(offset);
        self
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.context.set_line_join(join);
        self
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.context.set_line_cap(cap);
        self
    }

    pub fn set_miter_limit(&mut self, limit: f64) -> &mut Self {
        self.context.set_miter_limit(limit);
        self
    }

    pub fn set_shadow_blur(&mut self, blur: f64) -> &mut Self {
        self.context.set_shadow_blur(blur);
        self
    }

    pub fn set_shadow_color(&mut self, color: Color) -> &mut Self {
        self.context.set_shadow_color(color);
        self
    }

    pub fn set_shadow_offset_x(&mut self, offset: f64) -> &mut Self {
        self.context.set_shadow_offset_x(offset);
        self
    }

    pub fn set_shadow_offset_y(&mut self, offset: f64) -> &mut Self {
        self.context.set_shadow_offset_y(offset);
        self
    }

    pub fn set_global_alpha(&mut self, alpha: f64) -> &mut Self {
        self.context.set_global_alpha(alpha);
        self
    }

    pub fn set_global_composite_operation(&mut self, op: CompositeOperation) -> &mut Self {
        self.context.set_global_composite_operation(op);
        self
    }

    /// CSS filter string, see `color::filter`
    pub fn set_filter(&mut self, filter: &str) -> &mut Self {
        self.context.set_filter(filter);
        self
    }

    pub fn set_anti_aliasing(&mut self, enabled: bool) -> Result<&mut Self> {
        self.context.set_anti_aliasing(enabled)?;
        Ok(self)
    }

    pub fn set_pattern_quality(&mut self, quality: PatternQuality) -> Result<&mut Self> {
        self.context.set_pattern_quality(quality)?;
        Ok(self)
    }

    pub fn set_text_drawing_mode(&mut self, mode: TextDrawingMode) -> Result<&mut Self> {
        self.context.set_text_drawing_mode(mode)?;
        Ok(self)
    }

    // ========================================================================
    // Gradients and patterns
    // ========================================================================

    pub fn create_linear_gradient(&self, x0: f64, y0: f64, x1: f64, y1: f64, stops: &[(f64, Color)]) -> Gradient {
        Gradient::linear(x0, y0, x1, y1).with_stops(stops.iter().copied())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_radial_gradient(
        &self,
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        stops: &[(f64, Color)],
    ) -> Gradient {
        Gradient::radial(x0, y0, r0, x1, y1, r1).with_stops(stops.iter().copied())
    }

    pub fn print_linear_color_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, stops: &[(f64, Color)]) -> &mut Self {
        let gradient = self.create_linear_gradient(x0, y0, x1, y1, stops);
        self.set_color(gradient)
    }

    pub fn print_linear_stroke_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, stops: &[(f64, Color)]) -> &mut Self {
        let gradient = self.create_linear_gradient(x0, y0, x1, y1, stops);
        self.set_stroke(gradient)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn print_radial_color_gradient(
        &mut self,
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        stops: &[(f64, Color)],
    ) -> &mut Self {
        let gradient = self.create_radial_gradient(x0, y0, r0, x1, y1, r1, stops);
        self.set_color(gradient)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn print_radial_stroke_gradient(
        &mut self,
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        stops: &[(f64, Color)],
    ) -> &mut Self {
        let gradient = self.create_radial_gradient(x0, y0, r0, x1, y1, r1, stops);
        self.set_stroke(gradient)
    }

    pub fn create_pattern(&self, image: &Image, repetition: PatternRepetition) -> Pattern {
        Pattern::new(image.clone(), repetition)
    }

    /// Use an image pattern as the fill style
    pub fn print_pattern(&mut self, image: &Image, repetition: PatternRepetition) -> &mut Self {
        let pattern = self.create_pattern(image, repetition);
        self.set_color(pattern)
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    pub fn is_point_in_path(&self, x: f64, y: f64, rule: FillRule) -> bool {
        self.context.is_point_in_path(x, y, rule)
    }

    pub fn is_point_in_stroke(&self, x: f64, y: f64) -> bool {
        self.context.is_point_in_stroke(x, y)
    }

    pub fn line_dash(&self) -> Vec<f64> {
        self.context.line_dash()
    }

    // ========================================================================
    // Pixels and filters
    // ========================================================================

    /// The whole surface
    pub fn get_image_data(&self) -> PixelBuffer {
        self.get_image_data_region(0, 0, self.width(), self.height())
    }

    pub fn get_image_data_region(&self, x: i32, y: i32, width: u32, height: u32) -> PixelBuffer {
        self.context.get_image_data(x, y, width, height)
    }

    pub fn put_image_data(&mut self, data: &PixelBuffer, x: i32, y: i32) -> &mut Self {
        self.context.put_image_data(data, x, y);
        self
    }

    /// Read the surface, run `filter` over it and write it back
    pub fn apply_filter(&mut self, filter: &Filter) -> &mut Self {
        tracing::trace!(filter = filter.name(), "filtering canvas");
        let mut pixels = self.get_image_data();
        filter.apply(&mut pixels);
        self.put_image_data(&pixels, 0, 0)
    }

    pub fn apply_filters(&mut self, filters: &FilterList) -> &mut Self {
        let mut pixels = self.get_image_data();
        filters.apply(&mut pixels);
        self.put_image_data(&pixels, 0, 0)
    }

    pub fn convolve(&mut self, kernel: &Kernel, preserve_transparency: bool) -> &mut Self {
        self.apply_filter(&Filter::Convolve {
            kernel: kernel.clone(),
            preserve_transparency,
        })
    }

    /// Invert colors by compositing a white rectangle with `difference`
    pub fn invert(&mut self) -> &mut Self {
        let (width, height) = (self.width() as f64, self.height() as f64);
        self.save()
            .set_global_composite_operation(CompositeOperation::Difference)
            .set_color(Color::WHITE)
            .print_rectangle(0.0, 0.0, width, height)
            .restore()
    }

    pub fn grayscale(&mut self) -> &mut Self {
        self.apply_filter(&Filter::Grayscale)
    }

    pub fn greyscale(&mut self) -> &mut Self {
        self.grayscale()
    }

    pub fn invert_grayscale(&mut self) -> &mut Self {
        self.apply_filter(&Filter::InvertGrayscale)
    }

    pub fn invert_greyscale(&mut self) -> &mut Self {
        self.invert_grayscale()
    }

    pub fn sepia(&mut self) -> &mut Self {
        self.apply_filter(&Filter::Sepia)
    }

    pub fn silhouette(&mut self) -> &mut Self {
        self.apply_filter(&Filter::Silhouette)
    }

    pub fn threshold(&mut self, threshold: f64) -> &mut Self {
        self.apply_filter(&Filter::Threshold(threshold))
    }

    pub fn inverted_threshold(&mut self, threshold: f64) -> &mut Self {
        self.apply_filter(&Filter::InvertedThreshold(threshold))
    }

    pub fn brightness(&mut self, amount: f64) -> &mut Self {
        self.apply_filter(&Filter::Brightness(amount))
    }

    pub fn darkness(&mut self, amount: f64) -> &mut Self {
        self.apply_filter(&Filter::Darkness(amount))
    }

    pub fn edge(&mut self) -> &mut Self {
        self.apply_filter(&Filter::Edge)
    }

    pub fn sharpen(&mut self, iterations: u32) -> &mut Self {
        self.apply_filter(&Filter::Sharpen(iterations))
    }

    pub fn blur(&mut self, iterations: u32) -> &mut Self {
        self.apply_filter(&Filter::Blur(iterations))
    }

    // ========================================================================
    // Misc and export
    // ========================================================================

    /// Run `f` against the canvas mid-chain
    pub fn process(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        f(self);
        self
    }

    /// Snapshot of the surface usable as an image source
    pub fn to_image(&self) -> Image {
        Image::new(self.get_image_data())
    }

    /// PNG bytes
    pub fn to_buffer(&self) -> Result<Vec<u8>> {
        encode_png(&self.get_image_data())
    }

    /// `data:image/png;base64,...`
    pub fn to_data_url(&self) -> Result<String> {
        to_data_url(&self.get_image_data())
    }

    /// PNG bytes, encoded on the blocking pool
    pub async fn to_buffer_async(&self) -> Result<Vec<u8>> {
        let pixels = self.get_image_data();
        smol::unblock(move || encode_png(&pixels)).await
    }

    pub async fn to_data_url_async(&self) -> Result<String> {
        let pixels = self.get_image_data();
        smol::unblock(move || to_data_url(&pixels)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DisplayList, RecordingContext};

    fn recording(width: u32, height: u32) -> (Canvas, DisplayList) {
        let context = RecordingContext::new(width, height).unwrap();
        let list = context.display_list();
        (Canvas::from_context(Box::new(context)), list)
    }

    #[test]
    fn test_rounded_radius_resolution() {
        assert_eq!(RoundedRadius::Uniform(50.0).resolve(40.0, 100.0), [20.0; 4]);
        let corners = BorderRadius {
            top_left: Some(8.0),
            ..BorderRadius::default()
        };
        assert_eq!(RoundedRadius::from(corners).resolve(6.0, 100.0), [8.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_rounded_path_skips_empty_box() {
        let (mut canvas, _) = recording(10, 10);
        canvas.create_rounded_path(0.0, 0.0, 0.0, 5.0, 2.0);
        assert!(canvas.context().current_path().is_empty());
    }

    #[test]
    fn test_set_text_size_keeps_style_and_family() {
        let (mut canvas, _) = recording(10, 10);
        canvas.set_text_font("bold 16px Arial").set_text_size(24.0);
        assert_eq!(canvas.text_font(), "bold 24px Arial");
        assert_eq!(canvas.text_font_height(), 24.0);
    }

    #[test]
    fn test_clear_circle_restores_clip() {
        let (mut canvas, _) = recording(10, 10);
        canvas.clear_circle(5.0, 5.0, 2.0);
        assert!(canvas.context().state().clips.is_empty());
    }

    #[test]
    fn test_invalid_css_color() {
        let (mut canvas, _) = recording(10, 10);
        assert!(canvas.set_color_css("#ff0000").is_ok());
        assert!(matches!(
            canvas.set_color_css("not-a-color"),
            Err(CanvasError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_process_runs_closure() {
        let (mut canvas, list) = recording(10, 10);
        canvas
            .process(|c| {
                c.print_rectangle(0.0, 0.0, 1.0, 1.0);
            })
            .print_text("after", 0.0, 0.0);
        assert_eq!(list.names(), vec!["fillRect", "fillText"]);
    }
}
