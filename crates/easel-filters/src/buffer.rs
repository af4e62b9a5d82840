//! PixelBuffer
//!
//! Raw RGBA pixel data, row-major, four bytes per pixel.

use crate::{FilterError, Result};

/// RGBA pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a transparent black buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Create a buffer where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self { data, width, height }
    }

    /// Wrap existing data, checking `len == width * height * 4`
    pub fn from_data(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(FilterError::InvalidDataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2], self.data[idx + 3]])
    }

    /// Set pixel at (x, y); out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    /// Store a computed channel value at byte offset `idx` with clamped semantics
    #[inline]
    pub fn store(&mut self, idx: usize, value: f64) {
        self.data[idx] = clamp_channel(value);
    }

    /// Iterate pixels as mutable RGBA quadruples
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(4)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

/// Convert a computed channel value to a byte: NaN becomes 0, values are
/// rounded half to even and clamped to `0..=255`.
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer() {
        let mut buf = PixelBuffer::new(10, 10);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 10);
        assert_eq!(buf.data().len(), 400);

        buf.set_pixel(5, 5, [255, 0, 0, 255]);
        assert_eq!(buf.get_pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(buf.get_pixel(10, 0), None);
    }

    #[test]
    fn test_from_data_length() {
        assert!(PixelBuffer::from_data(vec![0; 16], 2, 2).is_ok());
        assert_eq!(
            PixelBuffer::from_data(vec![0; 15], 2, 2),
            Err(FilterError::InvalidDataLength { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-3.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(f64::NAN), 0);
        assert_eq!(clamp_channel(1.5), 2);
        assert_eq!(clamp_channel(2.5), 2);
        assert_eq!(clamp_channel(2.6), 3);
    }

    #[test]
    fn test_filled() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(buf.pixel_count(), 6);
        assert_eq!(buf.get_pixel(2, 1), Some([1, 2, 3, 4]));
    }
}
