//! Renderer variants
//!
//! The window drives exactly one of two renderers: the full scene pipeline,
//! or an interactive sketch pad that draws raw primitives from mouse clicks.

use std::collections::VecDeque;

use rand::Rng;

use crate::rasterizer::{Color, Framebuffer, RasterSettings, Vec3};
use crate::scene::{RenderError, RenderStats, SceneRenderer};

/// Number of clicks remembered by the sketch renderer
pub const SKETCH_POINTS: usize = 3;

/// Depth used for sketch fills; outlines and markers sit in front of it
const SKETCH_FILL_DEPTH: f32 = 1.0;
const SKETCH_LINE_DEPTH: f32 = 2.0;

/// Collects canvas clicks and turns them into a line or a filled triangle
#[derive(Debug, Clone, Default)]
pub struct SketchRenderer {
    points: VecDeque<(f32, f32)>,
}

impl SketchRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a click (oldest dropped past three) and mark it with a small cross
    pub fn add_point(&mut self, fb: &mut Framebuffer, x: f32, y: f32) {
        self.points.push_back((x, y));
        if self.points.len() > SKETCH_POINTS {
            self.points.pop_front();
        }

        for (dx, dy) in [(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
            fb.draw_point(x + dx, y + dy, SKETCH_LINE_DEPTH, Color::BLACK);
        }
    }

    /// Clear and draw the collected primitive with random vertex colors
    pub fn commit(&mut self, fb: &mut Framebuffer) -> usize {
        self.commit_with_rng(fb, &mut rand::thread_rng())
    }

    /// Like `commit` with a caller-supplied RNG. Returns the number of
    /// primitives drawn; fewer than two points draws nothing. Points are
    /// consumed either way.
    pub fn commit_with_rng<R: Rng + ?Sized>(&mut self, fb: &mut Framebuffer, rng: &mut R) -> usize {
        fb.clear();
        let points: Vec<Vec3> = self.points.drain(..).map(|(x, y)| Vec3::new(x, y, SKETCH_LINE_DEPTH)).collect();

        match points.as_slice() {
            [a, b] => {
                fb.draw_line(*a, *b, Color::BLACK, Color::BLACK);
                1
            }
            [a, b, c] => {
                let fill = |p: Vec3| Vec3::new(p.x, p.y, SKETCH_FILL_DEPTH);
                let mut random_color = || Color::new(rng.gen(), rng.gen(), rng.gen());
                let colors = [random_color(), random_color(), random_color()];
                fb.draw_filled_triangle(fill(*a), fill(*b), fill(*c), colors[0], colors[1], colors[2]);

                fb.draw_line(*a, *b, Color::BLACK, Color::BLACK);
                fb.draw_line(*b, *c, Color::BLACK, Color::BLACK);
                fb.draw_line(*c, *a, Color::BLACK, Color::BLACK);
                2
            }
            _ => 0,
        }
    }
}

/// The active renderer
pub enum Renderer {
    Scene(SceneRenderer),
    Sketch(SketchRenderer),
}

impl Renderer {
    pub fn name(&self) -> &'static str {
        match self {
            Renderer::Scene(_) => "scene",
            Renderer::Sketch(_) => "sketch",
        }
    }

    /// Produce a frame. The scene renderer redraws everything and reports
    /// stats; the sketch renderer commits its pending primitive.
    pub fn draw(&mut self, fb: &mut Framebuffer, settings: &RasterSettings) -> Result<Option<RenderStats>, RenderError> {
        match self {
            Renderer::Scene(scene) => scene.render(fb, settings).map(Some),
            Renderer::Sketch(sketch) => {
                fb.set_background(settings.background);
                sketch.commit(fb);
                Ok(None)
            }
        }
    }
}
