//! Post-processing filters run on the finished color buffer

/// A pass over an RGBA buffer, applied in place by `Framebuffer::flush`
pub trait PixelFilter {
    fn apply(&self, pixels: &mut [u8], width: usize, height: usize);
}

/// Box blur over each pixel's 3x3 neighbourhood.
/// Edge pixels average only the neighbours that exist; alpha is untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAntialiasing;

impl PixelFilter for SimpleAntialiasing {
    fn apply(&self, pixels: &mut [u8], width: usize, height: usize) {
        if pixels.len() < width * height * 4 {
            return;
        }
        let source = pixels.to_vec();

        for y in 0..height {
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(height - 1);
            for x in 0..width {
                let x0 = x.saturating_sub(1);
                let x1 = (x + 1).min(width - 1);

                let mut sum = [0u32; 3];
                let mut samples = 0u32;
                for ny in y0..=y1 {
                    for nx in x0..=x1 {
                        let idx = (ny * width + nx) * 4;
                        sum[0] += source[idx] as u32;
                        sum[1] += source[idx + 1] as u32;
                        sum[2] += source[idx + 2] as u32;
                        samples += 1;
                    }
                }

                let idx = (y * width + x) * 4;
                for c in 0..3 {
                    pixels[idx + c] = ((sum[c] as f32 / samples as f32).round()) as u8;
                }
            }
        }
    }
}
