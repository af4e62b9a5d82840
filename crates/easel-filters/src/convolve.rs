//! Kernel convolution
//!
//! Samples that fall outside the image are left out of the weighted sum
//! entirely. Near the edges a kernel therefore sees fewer weights than in the
//! interior, so even a normalized kernel changes flat regions at the border.

use crate::buffer::PixelBuffer;
use crate::kernel::Kernel;

/// Convolve `source` with `kernel` into a new buffer of the same shape.
///
/// R, G, B and A are accumulated independently. With `preserve_transparency`
/// the output alpha is forced to fully opaque; otherwise the accumulated alpha
/// is stored as is.
pub fn convolve(source: &PixelBuffer, kernel: &Kernel, preserve_transparency: bool) -> PixelBuffer {
    let width = source.width() as i64;
    let height = source.height() as i64;
    let side = kernel.side();
    let anchor = kernel.anchor() as i64;
    let src = source.data();

    let mut output = PixelBuffer::new(source.width(), source.height());

    for row in 0..height {
        for col in 0..width {
            let mut sum = [0.0f64; 4];

            for i in 0..side {
                let sy = row + i as i64 - anchor;
                if sy < 0 || sy >= height {
                    continue;
                }
                for j in 0..side {
                    let sx = col + j as i64 - anchor;
                    if sx < 0 || sx >= width {
                        continue;
                    }
                    let idx = ((sy * width + sx) * 4) as usize;
                    let w = kernel.weight(i, j);
                    sum[0] += src[idx] as f64 * w;
                    sum[1] += src[idx + 1] as f64 * w;
                    sum[2] += src[idx + 2] as f64 * w;
                    sum[3] += src[idx + 3] as f64 * w;
                }
            }

            let out = ((row * width + col) * 4) as usize;
            output.store(out, sum[0]);
            output.store(out + 1, sum[1]);
            output.store(out + 2, sum[2]);
            let alpha = if preserve_transparency { 255.0 } else { sum[3] };
            output.store(out + 3, alpha);
        }
    }

    output
}

/// Convolve and replace the contents of `buffer`
pub fn convolve_in_place(buffer: &mut PixelBuffer, kernel: &Kernel, preserve_transparency: bool) {
    *buffer = convolve(buffer, kernel, preserve_transparency);
}

/// Edge detection, one pass
pub fn edge(buffer: &mut PixelBuffer) {
    tracing::debug!(width = buffer.width(), height = buffer.height(), "edge filter");
    convolve_in_place(buffer, &Kernel::edge(), true);
}

/// Sharpen `iterations` times
pub fn sharpen(buffer: &mut PixelBuffer, iterations: u32) {
    tracing::debug!(iterations, "sharpen filter");
    let kernel = Kernel::sharpen();
    for _ in 0..iterations {
        convolve_in_place(buffer, &kernel, true);
    }
}

/// Box blur `iterations` times
pub fn blur(buffer: &mut PixelBuffer, iterations: u32) {
    tracing::debug!(iterations, "blur filter");
    let kernel = Kernel::blur();
    for _ in 0..iterations {
        convolve_in_place(buffer, &kernel, true);
    }
}
