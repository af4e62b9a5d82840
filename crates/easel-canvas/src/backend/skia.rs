//! tiny-skia backend
//!
//! Raster surface on a premultiplied `Pixmap`. Text is drawn from glyph
//! outlines of the process font library.

use std::path::PathBuf;
use std::sync::PoisonError;

use easel_filters::{convolve, Kernel, PixelBuffer};
use tiny_skia::{
    BlendMode, FilterQuality, GradientStop, IntSize, LinearGradient, Mask, Pixmap, PixmapPaint,
    Point, RadialGradient, Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

use super::{check_surface, Backend, BackendKind};
use crate::{
    bitmap::Image,
    color::Color,
    compositing::CompositeOperation,
    context::{DrawingContext, Rect, TextMetrics},
    fonts::{aligned_origin, font_library, FontSpec, FontVariant},
    path::{Path2D, PathCommand},
    state::{CanvasState, StateStack},
    style::{FillRule, GradientType, LineCap, LineJoin, Paint, PatternQuality, PatternRepetition},
    transforms::TransformMatrix,
    CanvasError, Result,
};

/// Backend producing `SkiaContext`s
#[derive(Debug, Clone, Default)]
pub struct SkiaBackend {
    default_font: Option<String>,
}

impl SkiaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Font new contexts start with instead of `10px sans-serif`
    pub fn with_default_font(font: impl Into<String>) -> Self {
        Self {
            default_font: Some(font.into()),
        }
    }
}

impl Backend for SkiaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Skia
    }

    fn create_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawingContext>> {
        let initial = match &self.default_font {
            Some(font) => CanvasState::with_font(font.clone()),
            None => CanvasState::default(),
        };
        Ok(Box::new(SkiaContext::with_state(width, height, initial)?))
    }

    fn register_font(&self, family: Option<&str>, paths: &[PathBuf]) -> Result<Vec<FontVariant>> {
        crate::fonts::register_font(family, paths)
    }
}

/// Drawing context rendering into a tiny-skia pixmap
pub struct SkiaContext {
    pixmap: Pixmap,
    states: StateStack,
    path: Path2D,
    initial: CanvasState,
    anti_alias: bool,
    quality: PatternQuality,
}

enum Shape<'a> {
    Fill(&'a tiny_skia::Path, tiny_skia::FillRule),
    Stroke(&'a tiny_skia::Path, &'a Stroke),
}

impl SkiaContext {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_state(width, height, CanvasState::default())
    }

    fn with_state(width: u32, height: u32, initial: CanvasState) -> Result<Self> {
        check_surface(width, height)?;
        let pixmap = Pixmap::new(width, height).ok_or(CanvasError::InvalidSurface { width, height })?;
        Ok(Self {
            pixmap,
            states: StateStack::new(initial.clone()),
            path: Path2D::new(),
            initial,
            anti_alias: true,
            quality: PatternQuality::Good,
        })
    }

    /// The underlying premultiplied pixmap
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Intersection of every clip region, `None` when unclipped
    fn clip_mask(&self) -> Option<Mask> {
        let clips = &self.states.current().clips;
        if clips.is_empty() {
            return None;
        }

        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        for (i, clip) in clips.iter().enumerate() {
            let Some(path) = to_skia_path(&clip.path) else {
                // Empty clip path: nothing is drawable
                return Mask::new(self.pixmap.width(), self.pixmap.height());
            };
            let rule = to_skia_rule(clip.rule);
            if i == 0 {
                mask.fill_path(&path, rule, self.anti_alias, Transform::identity());
            } else {
                mask.intersect_path(&path, rule, self.anti_alias, Transform::identity());
            }
        }
        Some(mask)
    }

    fn stroke_settings(&self) -> Stroke {
        let state = self.states.current();
        let scale = state.transform.scale_factor() as f32;
        let dash = if state.line_dash.is_empty() {
            None
        } else {
            StrokeDash::new(
                state.line_dash.iter().map(|d| *d as f32 * scale).collect(),
                state.line_dash_offset as f32 * scale,
            )
        };
        Stroke {
            width: state.line_width as f32 * scale,
            miter_limit: state.miter_limit as f32,
            line_cap: match state.line_cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match state.line_join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            dash,
        }
    }

    /// Paint `shape` with `style`, drawing the shadow first
    fn paint_shape(&mut self, shape: Shape<'_>, stroke: bool) {
        let mask = self.clip_mask();
        let state = self.states.current();
        let style = if stroke { &state.stroke_style } else { &state.fill_style };

        if has_shadow(state) {
            if let Some(layer) = self.shadow_layer(&shape) {
                let paint = PixmapPaint {
                    blend_mode: to_blend_mode(state.global_composite_operation),
                    ..PixmapPaint::default()
                };
                self.pixmap
                    .draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), mask.as_ref());
            }
        }

        let pattern = pattern_pixmap(style);
        let Some(paint) = make_paint(style, pattern.as_ref(), state, self.anti_alias, self.quality) else {
            return;
        };

        match shape {
            Shape::Fill(path, rule) => {
                self.pixmap
                    .fill_path(path, &paint, rule, Transform::identity(), mask.as_ref());
            }
            Shape::Stroke(path, stroke) => {
                self.pixmap
                    .stroke_path(path, &paint, stroke, Transform::identity(), mask.as_ref());
            }
        }
    }

    /// Shadow of `shape` on its own layer, offset and blurred with the box kernel
    fn shadow_layer(&self, shape: &Shape<'_>) -> Option<Pixmap> {
        let state = self.states.current();
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut layer = Pixmap::new(width, height)?;

        let color = state.shadow_color.with_alpha_factor(state.global_alpha);
        let mut paint = tiny_skia::Paint {
            anti_alias: self.anti_alias,
            ..Default::default()
        };
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        let offset = Transform::from_translate(state.shadow_offset_x as f32, state.shadow_offset_y as f32);

        match shape {
            Shape::Fill(path, rule) => layer.fill_path(path, &paint, *rule, offset, None),
            Shape::Stroke(path, stroke) => layer.stroke_path(path, &paint, stroke, offset, None),
        }

        if state.shadow_blur <= 0.0 {
            return Some(layer);
        }
        let passes = (state.shadow_blur / 2.0).ceil().clamp(1.0, 8.0) as u32;
        let mut buffer = PixelBuffer::from_data(layer.take(), width, height).ok()?;
        let kernel = Kernel::blur();
        for _ in 0..passes {
            buffer = convolve(&buffer, &kernel, false);
        }
        Pixmap::from_vec(buffer.into_data(), IntSize::from_wh(width, height)?)
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>, stroke: bool) {
        let state = self.states.current();
        let spec = FontSpec::parse(&state.font);
        let library = font_library().read().unwrap_or_else(PoisonError::into_inner);

        let metrics = library.measure(&spec, text);
        let h_scale = match max_width {
            Some(max) if max > 0.0 && metrics.width > max => max / metrics.width,
            Some(max) if max <= 0.0 => return,
            _ => 1.0,
        };
        let squeezed = TextMetrics {
            width: metrics.width * h_scale,
            ..metrics
        };
        let (ox, oy) = aligned_origin(&squeezed, state.text_align, state.text_baseline, x, y);

        let Some(path) = library.text_path(&spec, text, ox, oy, h_scale, state.transform) else {
            tracing::debug!(font = %state.font, "no font face available, text skipped");
            return;
        };
        drop(library);

        if stroke {
            self.stroke_path(&path);
        } else {
            self.fill_path(&path, FillRule::NonZero);
        }
    }
}

impl DrawingContext for SkiaContext {
    fn backend_name(&self) -> &'static str {
        "skia"
    }

    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_surface(width, height)?;
        self.pixmap = Pixmap::new(width, height).ok_or(CanvasError::InvalidSurface { width, height })?;
        self.states.reset(self.initial.clone());
        self.path.clear();
        Ok(())
    }

    fn state_stack(&self) -> &StateStack {
        &self.states
    }

    fn state_stack_mut(&mut self) -> &mut StateStack {
        &mut self.states
    }

    fn current_path(&self) -> &Path2D {
        &self.path
    }

    fn current_path_mut(&mut self) -> &mut Path2D {
        &mut self.path
    }

    fn fill_path(&mut self, path: &Path2D, rule: FillRule) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        self.paint_shape(Shape::Fill(&path, to_skia_rule(rule)), false);
    }

    fn stroke_path(&mut self, path: &Path2D) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let stroke = self.stroke_settings();
        self.paint_shape(Shape::Stroke(&path, &stroke), true);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut rect = Path2D::new();
        rect.set_transform(self.states.current().transform);
        rect.rect(x, y, width, height);
        let Some(path) = to_skia_path(&rect) else {
            return;
        };

        let paint = tiny_skia::Paint {
            blend_mode: BlendMode::Clear,
            anti_alias: self.anti_alias,
            ..Default::default()
        };
        let mask = self.clip_mask();
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            mask.as_ref(),
        );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, false);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, true);
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        let spec = FontSpec::parse(&self.states.current().font);
        font_library()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .measure(&spec, text)
    }

    fn draw_image(&mut self, image: &Image, source: Rect, dest: Rect) {
        if source.width == 0.0 || source.height == 0.0 || dest.width == 0.0 || dest.height == 0.0 {
            return;
        }
        let Some(pixmap) = premultiplied_pixmap(image.pixels(), true) else {
            return;
        };

        let state = self.states.current();
        // Image space (offset by the transparent border) to user space
        let image_to_user = TransformMatrix::translate(dest.x, dest.y)
            .multiply(&TransformMatrix::scale(dest.width / source.width, dest.height / source.height))
            .multiply(&TransformMatrix::translate(-source.x - 1.0, -source.y - 1.0));
        let shader_transform = to_skia_transform(&state.transform.multiply(&image_to_user));

        let mut paint = tiny_skia::Paint {
            anti_alias: self.anti_alias,
            blend_mode: to_blend_mode(state.global_composite_operation),
            ..Default::default()
        };
        paint.shader = tiny_skia::Pattern::new(
            pixmap.as_ref(),
            SpreadMode::Pad,
            to_filter_quality(self.quality),
            state.global_alpha as f32,
            shader_transform,
        );

        let mut rect = Path2D::new();
        rect.set_transform(state.transform);
        rect.rect(dest.x, dest.y, dest.width, dest.height);
        let Some(path) = to_skia_path(&rect) else {
            return;
        };
        let mask = self.clip_mask();
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            mask.as_ref(),
        );
    }

    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        let (surface_w, surface_h) = (self.pixmap.width() as i32, self.pixmap.height() as i32);
        let data = self.pixmap.data();

        for dy in 0..height {
            for dx in 0..width {
                let (sx, sy) = (x + dx as i32, y + dy as i32);
                if sx < 0 || sy < 0 || sx >= surface_w || sy >= surface_h {
                    continue;
                }
                let idx = ((sy * surface_w + sx) * 4) as usize;
                let px = [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]];
                out.set_pixel(dx, dy, demultiply(px));
            }
        }
        out
    }

    fn put_image_data(&mut self, data: &PixelBuffer, x: i32, y: i32) {
        let (surface_w, surface_h) = (self.pixmap.width() as i32, self.pixmap.height() as i32);
        let target = self.pixmap.data_mut();

        for dy in 0..data.height() {
            for dx in 0..data.width() {
                let (tx, ty) = (x + dx as i32, y + dy as i32);
                if tx < 0 || ty < 0 || tx >= surface_w || ty >= surface_h {
                    continue;
                }
                let Some(px) = data.get_pixel(dx, dy) else {
                    continue;
                };
                let idx = ((ty * surface_w + tx) * 4) as usize;
                target[idx..idx + 4].copy_from_slice(&premultiply(px));
            }
        }
    }

    fn set_anti_aliasing(&mut self, enabled: bool) -> Result<()> {
        self.anti_alias = enabled;
        Ok(())
    }

    fn set_pattern_quality(&mut self, quality: PatternQuality) -> Result<()> {
        self.quality = quality;
        Ok(())
    }
}

fn has_shadow(state: &CanvasState) -> bool {
    state.shadow_color.a > 0
        && (state.shadow_blur > 0.0 || state.shadow_offset_x != 0.0 || state.shadow_offset_y != 0.0)
}

fn to_skia_path(path: &Path2D) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(x, y) => builder.move_to(x as f32, y as f32),
            PathCommand::LineTo(x, y) => builder.line_to(x as f32, y as f32),
            PathCommand::QuadraticCurveTo { cpx, cpy, x, y } => {
                builder.quad_to(cpx as f32, cpy as f32, x as f32, y as f32)
            }
            PathCommand::BezierCurveTo { cp1x, cp1y, cp2x, cp2y, x, y } => builder.cubic_to(
                cp1x as f32,
                cp1y as f32,
                cp2x as f32,
                cp2y as f32,
                x as f32,
                y as f32,
            ),
            PathCommand::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn to_skia_transform(m: &TransformMatrix) -> Transform {
    Transform::from_row(m.a as f32, m.b as f32, m.c as f32, m.d as f32, m.e as f32, m.f as f32)
}

fn to_skia_color(color: Color, alpha: f64) -> tiny_skia::Color {
    let color = color.with_alpha_factor(alpha);
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn to_filter_quality(quality: PatternQuality) -> FilterQuality {
    match quality {
        PatternQuality::Fast | PatternQuality::Nearest => FilterQuality::Nearest,
        PatternQuality::Good | PatternQuality::Bilinear => FilterQuality::Bilinear,
        PatternQuality::Best => FilterQuality::Bicubic,
    }
}

fn to_blend_mode(op: CompositeOperation) -> BlendMode {
    use CompositeOperation as Op;
    match op {
        Op::SourceOver => BlendMode::SourceOver,
        Op::SourceIn => BlendMode::SourceIn,
        Op::SourceOut => BlendMode::SourceOut,
        Op::SourceAtop => BlendMode::SourceAtop,
        Op::DestinationOver => BlendMode::DestinationOver,
        Op::DestinationIn => BlendMode::DestinationIn,
        Op::DestinationOut => BlendMode::DestinationOut,
        Op::DestinationAtop => BlendMode::DestinationAtop,
        Op::Lighter => BlendMode::Plus,
        Op::Copy => BlendMode::Source,
        Op::Xor => BlendMode::Xor,
        Op::Multiply => BlendMode::Multiply,
        Op::Screen => BlendMode::Screen,
        Op::Overlay => BlendMode::Overlay,
        Op::Darken => BlendMode::Darken,
        Op::Lighten => BlendMode::Lighten,
        Op::ColorDodge => BlendMode::ColorDodge,
        Op::ColorBurn => BlendMode::ColorBurn,
        Op::HardLight => BlendMode::HardLight,
        Op::SoftLight => BlendMode::SoftLight,
        Op::Difference => BlendMode::Difference,
        Op::Exclusion => BlendMode::Exclusion,
        Op::Hue => BlendMode::Hue,
        Op::Saturation => BlendMode::Saturation,
        Op::Color => BlendMode::Color,
        Op::Luminosity => BlendMode::Luminosity,
    }
}

/// Pixmap backing a pattern style, with a transparent border when it must not repeat
fn pattern_pixmap(style: &Paint) -> Option<Pixmap> {
    match style {
        Paint::Pattern(pattern) => premultiplied_pixmap(
            pattern.image.pixels(),
            pattern.repetition == PatternRepetition::NoRepeat,
        ),
        _ => None,
    }
}

fn make_paint<'a>(
    style: &Paint,
    pattern_source: Option<&'a Pixmap>,
    state: &CanvasState,
    anti_alias: bool,
    quality: PatternQuality,
) -> Option<tiny_skia::Paint<'a>> {
    let mut paint = tiny_skia::Paint {
        anti_alias,
        blend_mode: to_blend_mode(state.global_composite_operation),
        ..Default::default()
    };
    let ctm = to_skia_transform(&state.transform);

    paint.shader = match style {
        Paint::Color(color) => Shader::SolidColor(to_skia_color(*color, state.global_alpha)),
        Paint::Gradient(gradient) => {
            let stops: Vec<GradientStop> = gradient
                .stops
                .iter()
                .map(|stop| GradientStop::new(stop.offset as f32, to_skia_color(stop.color, state.global_alpha)))
                .collect();
            match stops.len() {
                0 => return None,
                1 => Shader::SolidColor(to_skia_color(gradient.stops[0].color, state.global_alpha)),
                _ => match gradient.kind {
                    GradientType::Linear { x0, y0, x1, y1 } => LinearGradient::new(
                        Point::from_xy(x0 as f32, y0 as f32),
                        Point::from_xy(x1 as f32, y1 as f32),
                        stops,
                        SpreadMode::Pad,
                        ctm,
                    )?,
                    GradientType::Radial { x0, y0, x1, y1, r1, .. } => RadialGradient::new(
                        Point::from_xy(x0 as f32, y0 as f32),
                        Point::from_xy(x1 as f32, y1 as f32),
                        r1 as f32,
                        stops,
                        SpreadMode::Pad,
                        ctm,
                    )?,
                },
            }
        }
        Paint::Pattern(pattern) => {
            let pixmap = pattern_source?;
            let (spread, offset) = match pattern.repetition {
                PatternRepetition::NoRepeat => (SpreadMode::Pad, -1.0),
                _ => (SpreadMode::Repeat, 0.0),
            };
            tiny_skia::Pattern::new(
                pixmap.as_ref(),
                spread,
                to_filter_quality(quality),
                state.global_alpha as f32,
                ctm.pre_translate(offset, offset),
            )
        }
    };
    Some(paint)
}

/// Premultiplied pixmap of `pixels`, optionally with a 1px transparent border
fn premultiplied_pixmap(pixels: &PixelBuffer, border: bool) -> Option<Pixmap> {
    let pad = u32::from(border);
    let mut pixmap = Pixmap::new(pixels.width() + pad * 2, pixels.height() + pad * 2)?;
    let stride = pixmap.width() as usize;
    let data = pixmap.data_mut();

    for y in 0..pixels.height() {
        for x in 0..pixels.width() {
            let Some(px) = pixels.get_pixel(x, y) else {
                continue;
            };
            let idx = (((y + pad) as usize) * stride + (x + pad) as usize) * 4;
            data[idx..idx + 4].copy_from_slice(&premultiply(px));
        }
    }
    Some(pixmap)
}

fn premultiply(px: [u8; 4]) -> [u8; 4] {
    let a = px[3] as u16;
    let mul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
    [mul(px[0]), mul(px[1]), mul(px[2]), px[3]]
}

fn demultiply(px: [u8; 4]) -> [u8; 4] {
    let a = px[3] as u16;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let div = |c: u8| ((c as u16 * 255 + a / 2) / a).min(255) as u8;
    [div(px[0]), div(px[1]), div(px[2]), px[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_solid() {
        let mut ctx = SkiaContext::new(10, 10).unwrap();
        ctx.set_fill_style(Color::rgb(255, 0, 0).into());
        ctx.fill_rect(2.0, 2.0, 4.0, 4.0);

        let data = ctx.get_image_data(0, 0, 10, 10);
        assert_eq!(data.get_pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(data.get_pixel(8, 8), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_limits_fill() {
        let mut ctx = SkiaContext::new(10, 10).unwrap();
        ctx.rect(0.0, 0.0, 5.0, 10.0);
        ctx.clip(FillRule::NonZero);
        ctx.set_fill_style(Color::rgb(0, 0, 255).into());
        ctx.fill_rect(0.0, 0.0, 10.0, 10.0);

        let data = ctx.get_image_data(0, 0, 10, 10);
        assert_eq!(data.get_pixel(2, 5), Some([0, 0, 255, 255]));
        assert_eq!(data.get_pixel(7, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clear_rect() {
        let mut ctx = SkiaContext::new(4, 4).unwrap();
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0);
        ctx.clear_rect(0.0, 0.0, 2.0, 4.0);
        let data = ctx.get_image_data(0, 0, 4, 4);
        assert_eq!(data.get_pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(data.get_pixel(3, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_premultiply_round_trip_opaque() {
        for px in [[12, 34, 56, 255], [0, 0, 0, 255], [255, 255, 255, 255]] {
            assert_eq!(demultiply(premultiply(px)), px);
        }
        assert_eq!(demultiply([10, 10, 10, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_backend_specific_setters() {
        let mut ctx = SkiaContext::new(2, 2).unwrap();
        assert!(ctx.set_anti_aliasing(false).is_ok());
        assert!(matches!(
            ctx.set_text_drawing_mode(crate::style::TextDrawingMode::Glyph),
            Err(CanvasError::NotSupported { backend: "skia", .. })
        ));
    }
}
