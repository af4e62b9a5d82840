//! Drawing state
//!
//! Everything `save()` pushes and `restore()` pops.

use crate::{
    color::Color,
    compositing::CompositeOperation,
    path::Path2D,
    style::{FillRule, LineCap, LineJoin, Paint, TextAlign, TextBaseline},
    transforms::TransformMatrix,
};

/// Clip path intersected into the current clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRegion {
    pub path: Path2D,
    pub rule: FillRule,
}

/// Canvas drawing state
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pub transform: TransformMatrix,
    pub fill_style: Paint,
    pub stroke_style: Paint,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub line_dash: Vec<f64>,
    pub line_dash_offset: f64,
    pub font: String,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    pub global_alpha: f64,
    pub global_composite_operation: CompositeOperation,
    pub shadow_blur: f64,
    pub shadow_color: Color,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    /// CSS filter string, `none` when unset
    pub filter: String,
    pub clips: Vec<ClipRegion>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: TransformMatrix::identity(),
            fill_style: Paint::Color(Color::BLACK),
            stroke_style: Paint::Color(Color::BLACK),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            global_alpha: 1.0,
            global_composite_operation: CompositeOperation::SourceOver,
            shadow_blur: 0.0,
            shadow_color: Color::TRANSPARENT,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            filter: "none".to_string(),
            clips: Vec::new(),
        }
    }
}

impl CanvasState {
    /// Default state with a different default font
    pub fn with_font(font: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            ..Self::default()
        }
    }
}

/// Saved states plus the live one; `restore()` on an empty stack is a no-op
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    saved: Vec<CanvasState>,
    current: CanvasState,
}

impl StateStack {
    pub fn new(initial: CanvasState) -> Self {
        Self {
            saved: Vec::new(),
            current: initial,
        }
    }

    pub fn current(&self) -> &CanvasState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut CanvasState {
        &mut self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Back to `initial` with nothing saved, as after a surface resize
    pub fn reset(&mut self, initial: CanvasState) {
        self.saved.clear();
        self.current = initial;
    }
}
