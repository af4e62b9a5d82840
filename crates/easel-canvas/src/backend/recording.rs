//! Recording backend
//!
//! Headless context that records every drawing call into a display list.
//! Solid rectangles are also rasterized into a plain RGBA surface so image
//! data reads and pixel filters work without a raster engine.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use easel_filters::PixelBuffer;

use super::{check_surface, Backend, BackendKind};
use crate::{
    bitmap::Image,
    compositing::{blend_colors, CompositeOperation},
    context::{DrawingContext, Rect, TextMetrics},
    fonts::{approximate_metrics, FontSpec, FontVariant},
    path::Path2D,
    state::{CanvasState, StateStack},
    style::{FillRule, Paint, PatternQuality, TextDrawingMode},
    Result,
};

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize { width: u32, height: u32 },
    FillPath { path: Path2D, rule: FillRule, style: Paint, composite: CompositeOperation },
    StrokePath { path: Path2D, style: Paint, line_width: f64 },
    FillRect { rect: Rect, style: Paint, composite: CompositeOperation },
    StrokeRect { rect: Rect, style: Paint, line_width: f64 },
    ClearRect { rect: Rect },
    FillText { text: String, x: f64, y: f64, font: String },
    StrokeText { text: String, x: f64, y: f64, font: String },
    DrawImage { width: u32, height: u32, source: Rect, dest: Rect },
    PutImageData { x: i32, y: i32, width: u32, height: u32 },
}

impl DrawCommand {
    /// Short name, handy in assertions
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::FillPath { .. } => "fill",
            Self::StrokePath { .. } => "stroke",
            Self::FillRect { .. } => "fillRect",
            Self::StrokeRect { .. } => "strokeRect",
            Self::ClearRect { .. } => "clearRect",
            Self::FillText { .. } => "fillText",
            Self::StrokeText { .. } => "strokeText",
            Self::DrawImage { .. } => "drawImage",
            Self::PutImageData { .. } => "putImageData",
        }
    }
}

/// Shared handle to a context's recorded commands
#[derive(Debug, Clone, Default)]
pub struct DisplayList(Arc<Mutex<Vec<DrawCommand>>>);

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: DrawCommand) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(command);
    }

    /// Snapshot of the commands recorded so far
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(DrawCommand::name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Backend producing `RecordingContext`s
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    default_font: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_font(font: impl Into<String>) -> Self {
        Self {
            default_font: Some(font.into()),
        }
    }
}

impl Backend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Recording
    }

    fn create_context(&self, width: u32, height: u32) -> Result<Box<dyn DrawingContext>> {
        let initial = match &self.default_font {
            Some(font) => CanvasState::with_font(font.clone()),
            None => CanvasState::default(),
        };
        Ok(Box::new(RecordingContext::with_state(width, height, initial)?))
    }

    fn register_font(&self, family: Option<&str>, paths: &[PathBuf]) -> Result<Vec<FontVariant>> {
        crate::fonts::register_font(family, paths)
    }
}

/// Display-list drawing context
pub struct RecordingContext {
    surface: PixelBuffer,
    states: StateStack,
    path: Path2D,
    initial: CanvasState,
    list: DisplayList,
    anti_alias: bool,
    quality: PatternQuality,
    text_mode: TextDrawingMode,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_state(width, height, CanvasState::default())
    }

    fn with_state(width: u32, height: u32, initial: CanvasState) -> Result<Self> {
        check_surface(width, height)?;
        Ok(Self {
            surface: PixelBuffer::new(width, height),
            states: StateStack::new(initial.clone()),
            path: Path2D::new(),
            initial,
            list: DisplayList::new(),
            anti_alias: true,
            quality: PatternQuality::Good,
            text_mode: TextDrawingMode::Path,
        })
    }

    /// Handle that stays valid after the context is boxed
    pub fn display_list(&self) -> DisplayList {
        self.list.clone()
    }

    pub fn anti_aliasing(&self) -> bool {
        self.anti_alias
    }

    pub fn pattern_quality(&self) -> PatternQuality {
        self.quality
    }

    pub fn text_drawing_mode(&self) -> TextDrawingMode {
        self.text_mode
    }

    /// Device-space bounds of a user-space rect, if the transform keeps it axis aligned
    fn device_rect(&self, x: f64, y: f64, width: f64, height: f64) -> Option<(i64, i64, i64, i64)> {
        let m = self.states.current().transform;
        if m.b.abs() > 1e-9 || m.c.abs() > 1e-9 {
            return None;
        }
        let (x0, y0) = m.transform_point(x, y);
        let (x1, y1) = m.transform_point(x + width, y + height);
        let clamp_x = |v: f64| v.round().clamp(0.0, self.surface.width() as f64) as i64;
        let clamp_y = |v: f64| v.round().clamp(0.0, self.surface.height() as f64) as i64;
        Some((
            clamp_x(x0.min(x1)),
            clamp_y(y0.min(y1)),
            clamp_x(x0.max(x1)),
            clamp_y(y0.max(y1)),
        ))
    }

    fn clipped(&self, px: i64, py: i64) -> bool {
        let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
        self.states
            .current()
            .clips
            .iter()
            .any(|clip| !clip.path.contains(cx, cy, clip.rule))
    }

    /// Write `pixel_for(current)` over the device rect, honouring the clip
    fn rasterize_rect(&mut self, bounds: (i64, i64, i64, i64), pixel_for: impl Fn([u8; 4]) -> [u8; 4]) {
        let (x0, y0, x1, y1) = bounds;
        for py in y0..y1 {
            for px in x0..x1 {
                if self.clipped(px, py) {
                    continue;
                }
                let (ux, uy) = (px as u32, py as u32);
                if let Some(current) = self.surface.get_pixel(ux, uy) {
                    self.surface.set_pixel(ux, uy, pixel_for(current));
                }
            }
        }
    }
}

impl DrawingContext for RecordingContext {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn width(&self) -> u32 {
        self.surface.width()
    }

    fn height(&self) -> u32 {
        self.surface.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_surface(width, height)?;
        self.surface = PixelBuffer::new(width, height);
        self.states.reset(self.initial.clone());
        self.path.clear();
        self.list.push(DrawCommand::Resize { width, height });
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
        let state = self.states.current();
        self.list.push(DrawCommand::FillPath {
            path: path.clone(),
            rule,
            style: state.fill_style.clone(),
            composite: state.global_composite_operation,
        });
    }

    fn stroke_path(&mut self, path: &Path2D) {
        let state = self.states.current();
        self.list.push(DrawCommand::StrokePath {
            path: path.clone(),
            style: state.stroke_style.clone(),
            line_width: state.line_width,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let state = self.states.current();
        let style = state.fill_style.clone();
        let composite = state.global_composite_operation;
        let alpha = state.global_alpha;
        self.list.push(DrawCommand::FillRect {
            rect: Rect::new(x, y, width, height),
            style: style.clone(),
            composite,
        });

        let Paint::Color(color) = style else {
            return;
        };
        let Some(bounds) = self.device_rect(x, y, width, height) else {
            return;
        };
        let src = color.with_alpha_factor(alpha);
        let src = [src.r, src.g, src.b, src.a];
        self.rasterize_rect(bounds, |dst| blend_colors(src, dst, composite));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let state = self.states.current();
        self.list.push(DrawCommand::StrokeRect {
            rect: Rect::new(x, y, width, height),
            style: state.stroke_style.clone(),
            line_width: state.line_width,
        });
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.list.push(DrawCommand::ClearRect {
            rect: Rect::new(x, y, width, height),
        });
        if let Some(bounds) = self.device_rect(x, y, width, height) {
            self.rasterize_rect(bounds, |_| [0, 0, 0, 0]);
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, _max_width: Option<f64>) {
        let font = self.states.current().font.clone();
        self.list.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, _max_width: Option<f64>) {
        let font = self.states.current().font.clone();
        self.list.push(DrawCommand::StrokeText {
            text: text.to_string(),
            x,
            y,
            font,
        });
    }

    /// Half the font size per character
    fn measure_text(&self, text: &str) -> TextMetrics {
        approximate_metrics(&FontSpec::parse(&self.states.current().font), text)
    }

    fn draw_image(&mut self, image: &Image, source: Rect, dest: Rect) {
        self.list.push(DrawCommand::DrawImage {
            width: image.width(),
            height: image.height(),
            source,
            dest,
        });
    }

    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        for dy in 0..height {
            for dx in 0..width {
                let (sx, sy) = (x + dx as i32, y + dy as i32);
                if sx < 0 || sy < 0 {
                    continue;
                }
                if let Some(px) = self.surface.get_pixel(sx as u32, sy as u32) {
                    out.set_pixel(dx, dy, px);
                }
            }
        }
        out
    }

    fn put_image_data(&mut self, data: &PixelBuffer, x: i32, y: i32) {
        self.list.push(DrawCommand::PutImageData {
            x,
            y,
            width: data.width(),
            height: data.height(),
        });
        for dy in 0..data.height() {
            for dx in 0..data.width() {
                let (tx, ty) = (x + dx as i32, y + dy as i32);
                if tx < 0 || ty < 0 || tx as u32 >= self.surface.width() || ty as u32 >= self.surface.height() {
                    continue;
                }
                if let Some(px) = data.get_pixel(dx, dy) {
                    self.surface.set_pixel(tx as u32, ty as u32, px);
                }
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

    fn set_text_drawing_mode(&mut self, mode: TextDrawingMode) -> Result<()> {
        self.text_mode = mode;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_records_in_order() {
        let mut ctx = RecordingContext::new(8, 8).unwrap();
        let list = ctx.display_list();
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0);
        ctx.fill_text("hi", 1.0, 1.0, None);
        ctx.clear_rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(list.names(), vec!["fillRect", "fillText", "clearRect"]);
    }

    #[test]
    fn test_fill_rect_rasterizes_solid_colors() {
        let mut ctx = RecordingContext::new(4, 4).unwrap();
        ctx.set_fill_style(Color::rgb(10, 20, 30).into());
        ctx.translate(1.0, 1.0);
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0);

        let data = ctx.get_image_data(0, 0, 4, 4);
        assert_eq!(data.get_pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(data.get_pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(data.get_pixel(2, 2), Some([10, 20, 30, 255]));
        assert_eq!(data.get_pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_respected() {
        let mut ctx = RecordingContext::new(4, 4).unwrap();
        ctx.rect(0.0, 0.0, 2.0, 4.0);
        ctx.clip(FillRule::NonZero);
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0);
        let data = ctx.get_image_data(0, 0, 4, 4);
        assert_eq!(data.get_pixel(1, 0), Some([0, 0, 0, 255]));
        assert_eq!(data.get_pixel(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_measure_is_deterministic() {
        let mut ctx = RecordingContext::new(4, 4).unwrap();
        ctx.set_font("20px sans-serif");
        assert_eq!(ctx.measure_text("abc").width, 30.0);
    }
}
