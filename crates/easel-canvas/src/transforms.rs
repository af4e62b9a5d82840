//! Transform Matrix
//!
//! Current transformation matrix of a drawing context.

/// 2D affine transform
/// | a c e |
/// | b d f |
/// | 0 0 1 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl TransformMatrix {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self { e: tx, f: ty, ..Self::IDENTITY }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Rotation matrix (angle in radians, clockwise in y-down space)
    pub fn rotate(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    /// `self × other`: `other` is applied to points first
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-10 {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Uniform scale estimate, used to scale stroke widths into device space
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        const EPS: f64 = 1e-10;
        (self.a - 1.0).abs() < EPS
            && self.b.abs() < EPS
            && self.c.abs() < EPS
            && (self.d - 1.0).abs() < EPS
            && self.e.abs() < EPS
            && self.f.abs() < EPS
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_translate_then_scale() {
        // ctx.translate(10, 0); ctx.scale(2, 2)
        let m = TransformMatrix::identity()
            .multiply(&TransformMatrix::translate(10.0, 0.0))
            .multiply(&TransformMatrix::scale(2.0, 2.0));
        assert_eq!(m.transform_point(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let m = TransformMatrix::rotate(std::f64::consts::FRAC_PI_2);
        assert!(close(m.transform_point(1.0, 0.0), (0.0, 1.0)));
    }

    #[test]
    fn test_invert() {
        let m = TransformMatrix::translate(100.0, 50.0).multiply(&TransformMatrix::scale(2.0, 4.0));
        let inv = m.invert().unwrap();
        assert!(m.multiply(&inv).is_identity());
        assert!(TransformMatrix::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(TransformMatrix::scale(2.0, 8.0).scale_factor(), 4.0);
    }
}
