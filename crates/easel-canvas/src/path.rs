//! Path2D
//!
//! Path construction for the drawing context. Points are transformed by the
//! path's transform as they are added, so the stored commands are in device
//! space and later transform changes do not affect segments already built.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::{style::FillRule, transforms::TransformMatrix};

/// Device-space path command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadraticCurveTo { cpx: f64, cpy: f64, x: f64, y: f64 },
    BezierCurveTo { cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64 },
    ClosePath,
}

/// 2D Path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path2D {
    commands: Vec<PathCommand>,
    transform: TransformMatrix,
    /// Current point, device space
    current: Option<(f64, f64)>,
    /// Start of the current subpath, device space
    start: (f64, f64),
}

/// Curves are flattened into this many line segments
const CURVE_SEGMENTS: usize = 16;

impl Path2D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform applied to points added from now on
    pub fn set_transform(&mut self, transform: TransformMatrix) {
        self.transform = transform;
    }

    pub fn transform(&self) -> TransformMatrix {
        self.transform
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every subpath (`beginPath`)
    pub fn clear(&mut self) {
        self.commands.clear();
        self.current = None;
    }

    /// Current point in user space, if any
    pub fn current_point(&self) -> Option<(f64, f64)> {
        let (x, y) = self.current?;
        let inverse = self.transform.invert()?;
        Some(inverse.transform_point(x, y))
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.transform.transform_point(x, y);
        self.commands.push(PathCommand::MoveTo(p.0, p.1));
        self.current = Some(p);
        self.start = p;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }
        let p = self.transform.transform_point(x, y);
        self.commands.push(PathCommand::LineTo(p.0, p.1));
        self.current = Some(p);
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.ensure_subpath(cpx, cpy);
        let (cpx, cpy) = self.transform.transform_point(cpx, cpy);
        let (x, y) = self.transform.transform_point(x, y);
        self.commands.push(PathCommand::QuadraticCurveTo { cpx, cpy, x, y });
        self.current = Some((x, y));
    }

    pub fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.ensure_subpath(cp1x, cp1y);
        let (cp1x, cp1y) = self.transform.transform_point(cp1x, cp1y);
        let (cp2x, cp2y) = self.transform.transform_point(cp2x, cp2y);
        let (x, y) = self.transform.transform_point(x, y);
        self.commands.push(PathCommand::BezierCurveTo { cp1x, cp1y, cp2x, cp2y, x, y });
        self.current = Some((x, y));
    }

    pub fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, counterclockwise: bool) {
        self.ellipse(x, y, radius, radius, 0.0, start_angle, end_angle, counterclockwise);
    }

    /// Elliptical arc, emitted as cubic Béziers of at most a quarter turn each
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
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
        let (rx, ry) = (rx.abs(), ry.abs());
        let sweep = arc_sweep(start_angle, end_angle, counterclockwise);
        let (rot_sin, rot_cos) = rotation.sin_cos();
        let point = |ux: f64, uy: f64| {
            (
                x + rx * ux * rot_cos - ry * uy * rot_sin,
                y + rx * ux * rot_sin + ry * uy * rot_cos,
            )
        };

        let (sx, sy) = point(start_angle.cos(), start_angle.sin());
        if self.current.is_some() {
            self.line_to(sx, sy);
        } else {
            self.move_to(sx, sy);
        }
        if sweep == 0.0 {
            return;
        }

        let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        let mut theta = start_angle;
        for _ in 0..segments {
            let next = theta + step;
            let (s0, c0) = theta.sin_cos();
            let (s1, c1) = next.sin_cos();
            let (cp1x, cp1y) = point(c0 - k * s0, s0 + k * c0);
            let (cp2x, cp2y) = point(c1 + k * s1, s1 - k * c1);
            let (ex, ey) = point(c1, s1);
            self.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, ex, ey);
            theta = next;
        }
    }

    /// Arc tangent to the lines (current → p1) and (p1 → p2)
    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        let Some((x0, y0)) = self.current_point() else {
            self.move_to(x1, y1);
            return;
        };

        let (v1x, v1y) = (x0 - x1, y0 - y1);
        let (v2x, v2y) = (x2 - x1, y2 - y1);
        let len1 = v1x.hypot(v1y);
        let len2 = v2x.hypot(v2y);
        let cross = v1x * v2y - v1y * v2x;

        if radius <= 0.0 || len1 < 1e-9 || len2 < 1e-9 || cross.abs() < 1e-9 {
            self.line_to(x1, y1);
            return;
        }

        let (u1x, u1y) = (v1x / len1, v1y / len1);
        let (u2x, u2y) = (v2x / len2, v2y / len2);
        let angle = (u1x * u2x + u1y * u2y).clamp(-1.0, 1.0).acos();
        let tangent = radius / (angle / 2.0).tan();

        let (t1x, t1y) = (x1 + u1x * tangent, y1 + u1y * tangent);
        let (t2x, t2y) = (x1 + u2x * tangent, y1 + u2y * tangent);

        let (bx, by) = (u1x + u2x, u1y + u2y);
        let blen = bx.hypot(by);
        let center_dist = radius / (angle / 2.0).sin();
        let (cx, cy) = (x1 + bx / blen * center_dist, y1 + by / blen * center_dist);

        let start = (t1y - cy).atan2(t1x - cx);
        let end = (t2y - cy).atan2(t2x - cx);
        // Turning right (y down) sweeps clockwise
        let counterclockwise = cross > 0.0;

        self.line_to(t1x, t1y);
        self.arc(cx, cy, radius, start, end, counterclockwise);
    }

    /// Closed rectangular subpath
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    pub fn close_path(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.commands.push(PathCommand::ClosePath);
        self.current = Some(self.start);
    }

    /// Append another path's segments
    pub fn add_path(&mut self, path: &Path2D) {
        self.commands.extend_from_slice(&path.commands);
        if path.current.is_some() {
            self.current = path.current;
            self.start = path.start;
        }
    }

    fn ensure_subpath(&mut self, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x, y);
        }
    }

    /// Flatten into device-space polylines; the flag marks closed subpaths
    pub fn flatten(&self) -> Vec<(Vec<(f64, f64)>, bool)> {
        let mut subpaths = Vec::new();
        let mut points: Vec<(f64, f64)> = Vec::new();
        let mut closed = false;

        let mut finish = |points: &mut Vec<(f64, f64)>, closed: bool| {
            if points.len() > 1 {
                subpaths.push((std::mem::take(points), closed));
            } else {
                points.clear();
            }
        };

        for command in &self.commands {
            let last = points.last().copied().unwrap_or((0.0, 0.0));
            match *command {
                PathCommand::MoveTo(x, y) => {
                    finish(&mut points, closed);
                    closed = false;
                    points.push((x, y));
                }
                PathCommand::LineTo(x, y) => points.push((x, y)),
                PathCommand::QuadraticCurveTo { cpx, cpy, x, y } => {
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f64 / CURVE_SEGMENTS as f64;
                        let mt = 1.0 - t;
                        points.push((
                            mt * mt * last.0 + 2.0 * mt * t * cpx + t * t * x,
                            mt * mt * last.1 + 2.0 * mt * t * cpy + t * t * y,
                        ));
                    }
                }
                PathCommand::BezierCurveTo { cp1x, cp1y, cp2x, cp2y, x, y } => {
                    for i in 1..=CURVE_SEGMENTS {
                        let t = i as f64 / CURVE_SEGMENTS as f64;
                        let mt = 1.0 - t;
                        let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
                        points.push((
                            a * last.0 + b * cp1x + c * cp2x + d * x,
                            a * last.1 + b * cp1y + c * cp2y + d * y,
                        ));
                    }
                }
                PathCommand::ClosePath => {
                    let start = points.first().copied();
                    finish(&mut points, true);
                    closed = false;
                    // Drawing continues from the subpath start
                    if let Some(start) = start {
                        points.push(start);
                    }
                }
            }
        }
        finish(&mut points, closed);
        subpaths
    }

    /// Whether the device-space point is inside the filled path
    pub fn contains(&self, x: f64, y: f64, rule: FillRule) -> bool {
        let mut winding = 0i32;
        for (points, _) in self.flatten() {
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if a.1 <= y {
                    if b.1 > y && is_left(a, b, (x, y)) > 0.0 {
                        winding += 1;
                    }
                } else if b.1 <= y && is_left(a, b, (x, y)) < 0.0 {
                    winding -= 1;
                }
            }
        }
        match rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    /// Whether the device-space point lies within `width / 2` of the outline
    pub fn stroke_contains(&self, x: f64, y: f64, width: f64) -> bool {
        let half = width / 2.0;
        self.flatten().iter().any(|(points, closed)| {
            let open_segments = points.windows(2).map(|w| (w[0], w[1]));
            let closing = closed
                .then(|| points.last().zip(points.first()).map(|(a, b)| (*a, *b)))
                .flatten();
            open_segments
                .chain(closing)
                .any(|(a, b)| segment_distance(a, b, (x, y)) <= half)
        })
    }
}

/// Signed sweep for an arc following the canvas angle rules
fn arc_sweep(start: f64, end: f64, counterclockwise: bool) -> f64 {
    if !counterclockwise && end - start >= TAU {
        TAU
    } else if counterclockwise && start - end >= TAU {
        -TAU
    } else if counterclockwise {
        -(start - end).rem_euclid(TAU)
    } else {
        (end - start).rem_euclid(TAU)
    }
}

fn is_left(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (p.0 - a.0) * (b.1 - a.1)
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rect_is_closed() {
        let mut path = Path2D::new();
        path.rect(0.0, 0.0, 50.0, 50.0);
        assert_eq!(path.commands().len(), 5);
        assert_eq!(path.commands()[4], PathCommand::ClosePath);
        assert_eq!(path.current_point(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_transform_applies_at_build_time() {
        let mut path = Path2D::new();
        path.set_transform(TransformMatrix::translate(10.0, 5.0));
        path.move_to(1.0, 1.0);
        path.set_transform(TransformMatrix::identity());
        path.line_to(1.0, 1.0);
        assert_eq!(
            path.commands(),
            &[PathCommand::MoveTo(11.0, 6.0), PathCommand::LineTo(1.0, 1.0)]
        );
    }

    #[test]
    fn test_full_circle_uses_four_curves() {
        let mut path = Path2D::new();
        path.arc(0.0, 0.0, 10.0, 0.0, 2.0 * PI, false);
        let curves = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::BezierCurveTo { .. }))
            .count();
        assert_eq!(curves, 4);
        assert!(path.contains(0.0, 0.0, FillRule::NonZero));
        assert!(!path.contains(9.0, 9.0, FillRule::NonZero));
    }

    #[test]
    fn test_arc_sweep_rules() {
        assert_eq!(arc_sweep(0.0, 3.0 * PI, false), TAU);
        assert!((arc_sweep(0.0, PI / 2.0, true) + 1.5 * PI).abs() < 1e-12);
        assert!((arc_sweep(0.0, -PI / 2.0, false) - 1.5 * PI).abs() < 1e-12);
        assert_eq!(arc_sweep(1.0, 1.0, false), 0.0);
    }

    #[test]
    fn test_arc_to_tangent_points() {
        let mut path = Path2D::new();
        path.move_to(0.0, 0.0);
        path.arc_to(10.0, 0.0, 10.0, 10.0, 5.0);
        let PathCommand::LineTo(tx, ty) = path.commands()[1] else {
            panic!("expected a line to the first tangent point");
        };
        assert!((tx - 5.0).abs() < 1e-9 && ty.abs() < 1e-9);
        let (x, y) = path.current_point().unwrap();
        assert!((x - 10.0).abs() < 1e-9 && (y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_even_odd_hole() {
        let mut path = Path2D::new();
        path.rect(0.0, 0.0, 30.0, 30.0);
        path.rect(10.0, 10.0, 10.0, 10.0);
        assert!(path.contains(15.0, 15.0, FillRule::NonZero));
        assert!(!path.contains(15.0, 15.0, FillRule::EvenOdd));
        assert!(path.contains(5.0, 5.0, FillRule::EvenOdd));
    }

    #[test]
    fn test_stroke_contains() {
        let mut path = Path2D::new();
        path.move_to(0.0, 0.0);
        path.line_to(100.0, 0.0);
        assert!(path.stroke_contains(50.0, 1.0, 4.0));
        assert!(!path.stroke_contains(50.0, 3.0, 4.0));
    }
}
