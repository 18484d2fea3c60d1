//! Framebuffer and scan conversion
//!
//! Points, lines and Gouraud-filled triangles with a depth test.
//! Depth values are reciprocal camera distance (`1/z`), so larger is closer.

use super::filter::PixelFilter;
use super::math::Vec3;
use super::types::{CanvasSettings, Color};

/// Depth of a pixel that has never been written
pub const NO_DEPTH: f32 = f32::NEG_INFINITY;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>,   // RGBA, 4 bytes per pixel, row-major, top-left origin
    pub zbuffer: Vec<f32>, // Reciprocal depth, NO_DEPTH where unwritten
    pub width: usize,
    pub height: usize,
    background: Color,
    filters: Vec<Box<dyn PixelFilter>>,
}

impl Framebuffer {
    pub fn new(canvas: CanvasSettings) -> Self {
        let (width, height) = (canvas.width(), canvas.height());
        let mut fb = Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![NO_DEPTH; width * height],
            width,
            height,
            background: Color::WHITE,
            filters: Vec::new(),
        };
        fb.clear();
        fb
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Replace the post-processing chain run by `flush`
    pub fn set_filters(&mut self, filters: Vec<Box<dyn PixelFilter>>) {
        self.filters = filters;
    }

    /// Fill with the background color and forget all depth values
    pub fn clear(&mut self) {
        let bytes = self.background.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(NO_DEPTH);
    }

    /// Run the post-filters and hand back the finished RGBA buffer
    pub fn flush(&mut self) -> &[u8] {
        for filter in &self.filters {
            filter.apply(&mut self.pixels, self.width, self.height);
        }
        &self.pixels
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let d = self.zbuffer[y * self.width + x];
        if d == NO_DEPTH {
            None
        } else {
            Some(d)
        }
    }

    pub fn pixel_at(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2], self.pixels[idx + 3]])
    }

    /// Plot one pixel if it is closer than what is already there
    pub fn draw_point(&mut self, x: f32, y: f32, depth: f32, color: Color) {
        let (x, y) = (x.floor(), y.floor());
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 || depth.is_nan() {
            return;
        }
        let (x, y) = (x as usize, y as usize);

        let depth_idx = y * self.width + x;
        if depth <= self.zbuffer[depth_idx] {
            return;
        }
        self.zbuffer[depth_idx] = depth;

        let idx = depth_idx * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
    }

    /// Line with per-endpoint color; `z` of each endpoint carries depth.
    /// Only the part inside the canvas is walked.
    pub fn draw_line(&mut self, p0: Vec3, p1: Vec3, c0: Color, c1: Color) {
        if !p0.is_finite() || !p1.is_finite() {
            return;
        }
        let (x0, y0) = (p0.x.floor(), p0.y.floor());
        let (x1, y1) = (p1.x.floor(), p1.y.floor());

        if x0 == x1 {
            // Vertical
            let (top, bottom, ct, cb) = if y0 <= y1 { (p0, p1, c0, c1) } else { (p1, p0, c1, c0) };
            let (ys, ye) = (top.y.floor(), bottom.y.floor());
            for y in clamped_steps(ys, ye, self.height) {
                let z = sample(ys, ye, top.z, bottom.z, y);
                self.draw_point(x0, y, z, sample_color(ys, ye, ct, cb, y));
            }
        } else if y0 == y1 {
            // Horizontal
            let (left, right, cl, cr) = if x0 <= x1 { (p0, p1, c0, c1) } else { (p1, p0, c1, c0) };
            let (xs, xe) = (left.x.floor(), right.x.floor());
            for x in clamped_steps(xs, xe, self.width) {
                let z = sample(xs, xe, left.z, right.z, x);
                self.draw_point(x, y0, z, sample_color(xs, xe, cl, cr, x));
            }
        } else if (x1 - x0).abs() > (y1 - y0).abs() {
            // Shallow: one pixel per column
            let (a, b, ca, cb) = if x0 <= x1 { (p0, p1, c0, c1) } else { (p1, p0, c1, c0) };
            let (xs, xe) = (a.x.floor(), b.x.floor());
            for x in clamped_steps(xs, xe, self.width) {
                let y = sample(xs, xe, a.y, b.y, x);
                let z = sample(xs, xe, a.z, b.z, x);
                self.draw_point(x, y, z, sample_color(xs, xe, ca, cb, x));
            }
        } else {
            // Steep: one pixel per row
            let (a, b, ca, cb) = if y0 <= y1 { (p0, p1, c0, c1) } else { (p1, p0, c1, c0) };
            let (ys, ye) = (a.y.floor(), b.y.floor());
            for y in clamped_steps(ys, ye, self.height) {
                let x = sample(ys, ye, a.x, b.x, y);
                let z = sample(ys, ye, a.z, b.z, y);
                self.draw_point(x, y, z, sample_color(ys, ye, ca, cb, y));
            }
        }
    }

    /// Filled triangle with per-vertex color (Gouraud) and depth.
    /// Screen x/y are floored; `z` carries reciprocal depth. Edges are
    /// sampled only on rows inside the canvas.
    pub fn draw_filled_triangle(&mut self, p0: Vec3, p1: Vec3, p2: Vec3, c0: Color, c1: Color, c2: Color) {
        let mut v = [
            (Vec3::new(p0.x.floor(), p0.y.floor(), p0.z), c0),
            (Vec3::new(p1.x.floor(), p1.y.floor(), p1.z), c1),
            (Vec3::new(p2.x.floor(), p2.y.floor(), p2.z), c2),
        ];
        if !v.iter().all(|(p, _)| p.is_finite()) {
            return;
        }
        // Stable sort keeps the original order between equal rows
        v.sort_by(|a, b| a.0.y.total_cmp(&b.0.y));
        let [(p0, c0), (p1, c1), (p2, c2)] = v;

        if p0.y == p2.y {
            self.draw_flat_triangle(&v);
            return;
        }

        for y in clamped_steps(p0.y, p2.y, self.height) {
            // Long side p0 -> p2
            let long = (
                sample(p0.y, p2.y, p0.x, p2.x, y),
                sample(p0.y, p2.y, p0.z, p2.z, y),
                sample_color(p0.y, p2.y, c0, c2, y),
            );
            // Short side p0 -> p1 -> p2; the join row belongs to the lower half
            let short = if y < p1.y {
                (
                    sample(p0.y, p1.y, p0.x, p1.x, y),
                    sample(p0.y, p1.y, p0.z, p1.z, y),
                    sample_color(p0.y, p1.y, c0, c1, y),
                )
            } else {
                (
                    sample(p1.y, p2.y, p1.x, p2.x, y),
                    sample(p1.y, p2.y, p1.z, p2.z, y),
                    sample_color(p1.y, p2.y, c1, c2, y),
                )
            };
            self.draw_span(y, long, short);
        }
    }

    /// Zero-height triangle: a single row spanning all three vertices
    fn draw_flat_triangle(&mut self, v: &[(Vec3, Color); 3]) {
        let mut row = *v;
        row.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));
        let (left, right) = (row[0], row[2]);
        self.draw_span(left.0.y, (left.0.x, left.0.z, left.1), (right.0.x, right.0.z, right.1));
    }

    /// Fill one scanline between two edge samples (x, depth, color), in either order
    fn draw_span(&mut self, y: f32, a: (f32, f32, Color), b: (f32, f32, Color)) {
        if y < 0.0 || y >= self.height as f32 {
            return;
        }
        let (l, r) = if a.0.floor() > b.0.floor() { (b, a) } else { (a, b) };
        let (xs, xe) = (l.0.floor(), r.0.floor());
        for x in clamped_steps(xs, xe, self.width) {
            self.draw_point(x, y, sample(xs, xe, l.1, r.1, x), sample_color(xs, xe, l.2, r.2, x));
        }
    }
}

/// Integer positions from `start` to `end` (inclusive, both already floored)
/// that fall inside `[0, limit)`
fn clamped_steps(start: f32, end: f32, limit: usize) -> impl Iterator<Item = f32> {
    let lo = start.max(0.0) as i64;
    let hi = end.min(limit as f32 - 1.0) as i64;
    (lo..=hi).map(|i| i as f32)
}

/// Value at `i` of the linear function through `(i0, d0)` and `(i1, d1)`.
/// A zero-length span yields the start value.
fn sample(i0: f32, i1: f32, d0: f32, d1: f32, i: f32) -> f32 {
    if i1 == i0 {
        return d0;
    }
    d0 + (d1 - d0) * (i - i0) / (i1 - i0)
}

fn sample_color(i0: f32, i1: f32, c0: Color, c1: Color, i: f32) -> Color {
    if i1 == i0 {
        return c0;
    }
    c0.lerp(c1, (i - i0) / (i1 - i0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framebuffer(w: usize, h: usize) -> Framebuffer {
        Framebuffer::new(CanvasSettings::new(w, h).unwrap())
    }

    const WHITE_PX: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_clear_resets_color_and_depth() {
        let mut fb = framebuffer(4, 4);
        fb.draw_point(1.0, 1.0, 0.5, Color::RED);
        assert_eq!(fb.depth_at(1, 1), Some(0.5));
        fb.clear();
        assert_eq!(fb.depth_at(1, 1), None);
        assert_eq!(fb.pixel_at(1, 1), Some(WHITE_PX));
    }

    #[test]
    fn test_point_depth_test_is_strict() {
        let mut fb = framebuffer(4, 4);
        fb.draw_point(2.7, 1.2, 1.0, Color::RED);
        assert_eq!(fb.pixel_at(2, 1), Some([255, 0, 0, 255]));
        // Equal depth loses
        fb.draw_point(2.0, 1.0, 1.0, Color::BLUE);
        assert_eq!(fb.pixel_at(2, 1), Some([255, 0, 0, 255]));
        // Farther loses
        fb.draw_point(2.0, 1.0, 0.5, Color::BLUE);
        assert_eq!(fb.pixel_at(2, 1), Some([255, 0, 0, 255]));
        // Closer wins
        fb.draw_point(2.0, 1.0, 2.0, Color::BLUE);
        assert_eq!(fb.pixel_at(2, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_point_outside_canvas_is_ignored() {
        let mut fb = framebuffer(4, 4);
        fb.draw_point(-0.5, 1.0, 1.0, Color::RED);
        fb.draw_point(4.0, 1.0, 1.0, Color::RED);
        fb.draw_point(1.0, 10.0, 1.0, Color::RED);
        assert!(fb.pixels.chunks(4).all(|px| px == WHITE_PX));
    }

    #[test]
    fn test_filled_triangle_right_angle() {
        let mut fb = framebuffer(32, 32);
        let green = Color::GREEN;
        fb.draw_filled_triangle(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 0.0, 1.0),
            Vec3::new(0.0, 10.0, 1.0),
            green, green, green,
        );

        let green_px = [0, 255, 0, 255];
        for y in 0..32 {
            for x in 0..32 {
                let px = fb.pixel_at(x, y).unwrap();
                if x + y <= 10 {
                    assert_eq!(px, green_px, "({}, {}) should be filled", x, y);
                    assert_eq!(fb.depth_at(x, y), Some(1.0));
                } else {
                    assert_eq!(px, WHITE_PX, "({}, {}) should be empty", x, y);
                    assert_eq!(fb.depth_at(x, y), None);
                }
            }
        }
    }

    #[test]
    fn test_near_triangle_survives_far_triangle() {
        let (a, b, c) = (Vec3::new(2.0, 2.0, 0.0), Vec3::new(20.0, 4.0, 0.0), Vec3::new(6.0, 18.0, 0.0));
        let with_depth = |p: Vec3, z: f32| Vec3::new(p.x, p.y, z);

        // Near first, then far
        let mut fb = framebuffer(24, 24);
        fb.draw_filled_triangle(with_depth(a, 2.0), with_depth(b, 2.0), with_depth(c, 2.0), Color::RED, Color::RED, Color::RED);
        fb.draw_filled_triangle(with_depth(a, 1.0), with_depth(b, 1.0), with_depth(c, 1.0), Color::BLUE, Color::BLUE, Color::BLUE);
        assert_eq!(fb.pixel_at(8, 8), Some([255, 0, 0, 255]));
        assert_eq!(fb.depth_at(8, 8), Some(2.0));

        // Far first, then near overwrites
        let mut fb = framebuffer(24, 24);
        fb.draw_filled_triangle(with_depth(a, 1.0), with_depth(b, 1.0), with_depth(c, 1.0), Color::BLUE, Color::BLUE, Color::BLUE);
        fb.draw_filled_triangle(with_depth(a, 2.0), with_depth(b, 2.0), with_depth(c, 2.0), Color::RED, Color::RED, Color::RED);
        assert_eq!(fb.pixel_at(8, 8), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_gouraud_interpolation_across_row() {
        let mut fb = framebuffer(16, 16);
        fb.draw_filled_triangle(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 10.0, 1.0),
            Vec3::new(0.0, 10.0, 1.0),
            Color::BLACK, Color::WHITE, Color::BLACK,
        );
        // Bottom row runs black (x=0) to white (x=10)
        assert_eq!(fb.pixel_at(0, 10), Some([0, 0, 0, 255]));
        assert_eq!(fb.pixel_at(10, 10), Some([255, 255, 255, 255]));
        let mid = fb.pixel_at(5, 10).unwrap();
        assert!(mid[0] > 100 && mid[0] < 155, "{:?}", mid);
    }

    #[test]
    fn test_degenerate_triangles_do_not_panic() {
        let mut fb = framebuffer(16, 16);
        // All on one row
        fb.draw_filled_triangle(
            Vec3::new(1.0, 5.0, 1.0), Vec3::new(9.0, 5.0, 1.0), Vec3::new(4.0, 5.0, 1.0),
            Color::RED, Color::RED, Color::RED,
        );
        for x in 1..=9 {
            assert_eq!(fb.pixel_at(x, 5), Some([255, 0, 0, 255]));
        }
        // Single point
        fb.draw_filled_triangle(
            Vec3::new(3.0, 3.0, 2.0), Vec3::new(3.0, 3.0, 2.0), Vec3::new(3.0, 3.0, 2.0),
            Color::BLUE, Color::BLUE, Color::BLUE,
        );
        assert_eq!(fb.pixel_at(3, 3), Some([0, 0, 255, 255]));
        // Non-finite input is skipped
        fb.draw_filled_triangle(
            Vec3::new(f32::INFINITY, 3.0, 2.0), Vec3::new(3.0, 9.0, 2.0), Vec3::new(8.0, 3.0, 2.0),
            Color::BLUE, Color::BLUE, Color::BLUE,
        );
    }

    #[test]
    fn test_line_cases_have_no_gaps() {
        let cases = [
            (Vec3::new(3.0, 1.0, 1.0), Vec3::new(3.0, 12.0, 1.0)),   // vertical
            (Vec3::new(12.0, 4.0, 1.0), Vec3::new(1.0, 4.0, 1.0)),   // horizontal, reversed
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(14.0, 5.0, 1.0)),   // shallow
            (Vec3::new(9.0, 14.0, 1.0), Vec3::new(5.0, 0.0, 1.0)),   // steep, reversed
        ];
        for (p0, p1) in cases {
            let mut fb = framebuffer(16, 16);
            fb.draw_line(p0, p1, Color::BLACK, Color::BLACK);
            let dx = (p1.x - p0.x).abs() as usize;
            let dy = (p1.y - p0.y).abs() as usize;
            let lit = fb.pixels.chunks(4).filter(|px| px[0] == 0).count();
            assert_eq!(lit, dx.max(dy) + 1, "{:?} -> {:?}", p0, p1);
            assert_eq!(fb.pixel_at(p0.x as usize, p0.y as usize), Some([0, 0, 0, 255]));
            assert_eq!(fb.pixel_at(p1.x as usize, p1.y as usize), Some([0, 0, 0, 255]));
        }
    }

    #[test]
    fn test_line_color_follows_endpoints_when_reversed() {
        let mut fb = framebuffer(16, 4);
        fb.draw_line(Vec3::new(10.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0), Color::RED, Color::BLUE);
        assert_eq!(fb.pixel_at(10, 1), Some([255, 0, 0, 255]));
        assert_eq!(fb.pixel_at(0, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_flush_runs_filters() {
        struct Invert;
        impl PixelFilter for Invert {
            fn apply(&self, pixels: &mut [u8], _width: usize, _height: usize) {
                for px in pixels.chunks_exact_mut(4) {
                    px[0] = 255 - px[0];
                }
            }
        }
        let mut fb = framebuffer(2, 2);
        fb.set_filters(vec![Box::new(Invert)]);
        let out = fb.flush();
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 255);
    }

    #[test]
    fn test_huge_triangle_is_clipped_to_canvas() {
        let mut fb = framebuffer(16, 16);
        fb.draw_filled_triangle(
            Vec3::new(-1e8, -1e8, 1.0), Vec3::new(1e8, -1e8, 1.0), Vec3::new(0.0, 1e8, 1.0),
            Color::RED, Color::RED, Color::RED,
        );
        assert!(fb.pixels.chunks(4).all(|px| px == [255, 0, 0, 255]));
        assert!(fb.zbuffer.iter().all(|&d| d == 1.0));
    }

    #[test]
    fn test_partly_visible_triangle_keeps_its_shading() {
        // Same fill whether the triangle is drawn on a small or a large canvas
        let (a, b, c) = (Vec3::new(-20.0, -20.0, 1.0), Vec3::new(30.0, 5.0, 1.0), Vec3::new(-5.0, 30.0, 1.0));
        let mut small = framebuffer(8, 8);
        small.draw_filled_triangle(a, b, c, Color::RED, Color::GREEN, Color::BLUE);

        let offset = Vec3::new(40.0, 40.0, 0.0);
        let mut large = framebuffer(100, 100);
        large.draw_filled_triangle(a + offset, b + offset, c + offset, Color::RED, Color::GREEN, Color::BLUE);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(small.pixel_at(x, y), large.pixel_at(x + 40, y + 40), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_huge_line_is_clipped_to_canvas() {
        let mut fb = framebuffer(16, 4);
        fb.draw_line(Vec3::new(-1e8, 2.0, 1.0), Vec3::new(1e8, 2.0, 1.0), Color::BLACK, Color::BLACK);
        for x in 0..16 {
            assert_eq!(fb.pixel_at(x, 2), Some([0, 0, 0, 255]));
        }
        assert_eq!(fb.pixel_at(0, 1), Some(WHITE_PX));

        fb.draw_line(Vec3::new(3.0, -1e8, 1.0), Vec3::new(f32::NAN, 1e8, 1.0), Color::RED, Color::RED);
        assert!(fb.pixels.chunks(4).all(|px| px != [255, 0, 0, 255]));
    }
}
