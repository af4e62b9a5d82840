//! Convolution kernels

use crate::{FilterError, Result};

/// Square convolution matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
    side: usize,
}

impl Kernel {
    /// Build a kernel, requiring a non-empty odd square number of weights
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        let len = weights.len();
        let side = (len as f64).sqrt().round() as usize;
        if len == 0 || side * side != len || side % 2 == 0 {
            return Err(FilterError::InvalidKernel { len });
        }
        Ok(Self { weights, side })
    }

    /// Build a kernel without validation.
    ///
    /// The side is `round(sqrt(len))`; weights outside `side * side` are ignored
    /// and missing ones read as zero, matching loose canvas filter libraries.
    pub fn from_weights_lossy(weights: Vec<f64>) -> Self {
        let side = (weights.len() as f64).sqrt().round() as usize;
        Self { weights, side }
    }

    /// Edge detection (Laplacian)
    pub fn edge() -> Self {
        Self {
            weights: vec![0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0],
            side: 3,
        }
    }

    /// Sharpen (unsharp mask)
    pub fn sharpen() -> Self {
        Self {
            weights: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
            side: 3,
        }
    }

    /// 3x3 box blur
    pub fn blur() -> Self {
        Self {
            weights: vec![1.0 / 9.0; 9],
            side: 3,
        }
    }

    /// Side length `k`
    pub fn side(&self) -> usize {
        self.side
    }

    /// Offset of the centre cell, `floor(k / 2)`
    pub fn anchor(&self) -> usize {
        self.side / 2
    }

    /// Weight at row `i`, column `j`
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights.get(i * self.side + j).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights; 1 for normalized kernels
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sizes() {
        assert_eq!(Kernel::new(vec![1.0]).unwrap().side(), 1);
        let k = Kernel::new(vec![0.0; 25]).unwrap();
        assert_eq!(k.side(), 5);
        assert_eq!(k.anchor(), 2);
    }

    #[test]
    fn test_invalid_sizes() {
        assert_eq!(Kernel::new(vec![]), Err(FilterError::InvalidKernel { len: 0 }));
        assert_eq!(Kernel::new(vec![1.0; 4]), Err(FilterError::InvalidKernel { len: 4 }));
        assert_eq!(Kernel::new(vec![1.0; 8]), Err(FilterError::InvalidKernel { len: 8 }));
    }

    #[test]
    fn test_lossy() {
        let k = Kernel::from_weights_lossy(vec![1.0; 8]);
        assert_eq!(k.side(), 3);
        assert_eq!(k.weight(2, 2), 0.0);
    }

    #[test]
    fn test_builtin_sums() {
        assert!((Kernel::blur().sum() - 1.0).abs() < 1e-12);
        assert_eq!(Kernel::sharpen().sum(), 1.0);
        assert_eq!(Kernel::edge().sum(), 0.0);
    }
}
