//! Per-pixel color maps
//!
//! Each function rewrites R, G and B of every pixel in place and leaves alpha
//! untouched. Results go through clamped storage.

use crate::buffer::clamp_channel;
use crate::PixelBuffer;

/// BT.709 luma
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

#[inline]
fn set_rgb(px: &mut [u8], value: f64) {
    let v = clamp_channel(value);
    px[0] = v;
    px[1] = v;
    px[2] = v;
}

/// Replace each channel with the pixel's luma
pub fn grayscale(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let l = luma(px[0], px[1], px[2]);
        set_rgb(px, l);
    }
}

pub fn greyscale(buffer: &mut PixelBuffer) {
    grayscale(buffer);
}

/// Classic sepia tone matrix
pub fn sepia(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
        px[0] = clamp_channel(0.393 * r + 0.769 * g + 0.189 * b);
        px[1] = clamp_channel(0.349 * r + 0.686 * g + 0.168 * b);
        px[2] = clamp_channel(0.272 * r + 0.534 * g + 0.131 * b);
    }
}

/// `255 - channel`
pub fn invert(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

/// Grayscale, then inverted
pub fn invert_grayscale(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let l = 255.0 - luma(px[0], px[1], px[2]);
        set_rgb(px, l);
    }
}

pub fn invert_greyscale(buffer: &mut PixelBuffer) {
    invert_grayscale(buffer);
}

/// Black out every pixel, keeping the alpha mask
pub fn silhouette(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        px[0] = 0;
        px[1] = 0;
        px[2] = 0;
    }
}

/// White where luma >= `value`, black elsewhere
pub fn threshold(buffer: &mut PixelBuffer, value: f64) {
    for px in buffer.pixels_mut() {
        let v = if luma(px[0], px[1], px[2]) >= value { 255.0 } else { 0.0 };
        set_rgb(px, v);
    }
}

/// Black where luma >= `value`, white elsewhere
pub fn inverted_threshold(buffer: &mut PixelBuffer, value: f64) {
    for px in buffer.pixels_mut() {
        let v = if luma(px[0], px[1], px[2]) >= value { 0.0 } else { 255.0 };
        set_rgb(px, v);
    }
}

/// Add `delta` to R, G and B
pub fn brightness(buffer: &mut PixelBuffer, delta: f64) {
    shift(buffer, delta);
}

/// Subtract `delta` from R, G and B
pub fn darkness(buffer: &mut PixelBuffer, delta: f64) {
    shift(buffer, -delta);
}

fn shift(buffer: &mut PixelBuffer, delta: f64) {
    for px in buffer.pixels_mut() {
        for c in &mut px[..3] {
            *c = clamp_channel(*c as f64 + delta);
        }
    }
}
