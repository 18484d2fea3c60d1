//! Application state and input actions
//!
//! Both renderers stay alive; `Tab` switches which one draws. Frames are
//! only re-rendered when something asks for it (first frame, a toggle,
//! a reload or an explicit redraw).

use std::path::PathBuf;

use crate::rasterizer::{CanvasSettings, Framebuffer, PixelFilter, RasterSettings, SimpleAntialiasing};
use crate::renderer::{Renderer, SketchRenderer};
use crate::scene::{RenderError, RenderStats, SceneRenderer};
use crate::world::{load_scene, SceneDescription};

/// Everything the window can ask the app to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    ToggleClipping,
    ToggleBoundingSphere,
    ToggleWireframeOnly,
    ToggleWireframeOverlay,
    ToggleLighting,
    ToggleAntialiasing,
    SwitchRenderer,
    /// Space: re-render the scene, or commit the sketch
    Redraw,
    ReloadScene,
    /// Left click at canvas coordinates
    Click(f32, f32),
}

/// Which renderer is drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scene = 0,
    Sketch = 1,
}

/// Main application state
pub struct AppState {
    pub canvas: CanvasSettings,
    pub framebuffer: Framebuffer,
    /// Feature toggles passed to every pass
    pub settings: RasterSettings,
    pub mode: Mode,
    /// Indexed by `Mode`
    renderers: [Renderer; 2],
    scene_path: Option<PathBuf>,
    /// Run the active renderer on the next frame
    needs_redraw: bool,
    /// Pixels changed outside a render pass and need uploading
    dirty: bool,
    pub last_stats: Option<RenderStats>,
}

impl AppState {
    /// Create app state around a loaded scene. `scene_path` enables reloading.
    pub fn new(scene: &SceneDescription, scene_path: Option<PathBuf>, canvas: CanvasSettings) -> Result<Self, RenderError> {
        let scene_renderer = SceneRenderer::new(scene, canvas)?;

        Ok(Self {
            canvas,
            framebuffer: Framebuffer::new(canvas),
            settings: scene.settings.clone(),
            mode: Mode::Scene,
            renderers: [Renderer::Scene(scene_renderer), Renderer::Sketch(SketchRenderer::new())],
            scene_path,
            needs_redraw: true,
            dirty: false,
            last_stats: None,
        })
    }

    pub fn active_renderer(&self) -> &Renderer {
        &self.renderers[self.mode as usize]
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::ToggleClipping => toggle(&mut self.settings.clipping, "clipping"),
            Action::ToggleBoundingSphere => toggle(&mut self.settings.bounding_sphere, "bounding sphere"),
            Action::ToggleWireframeOnly => toggle(&mut self.settings.wireframe_only, "wireframe only"),
            Action::ToggleWireframeOverlay => toggle(&mut self.settings.wireframe_overlay, "wireframe overlay"),
            Action::ToggleLighting => toggle(&mut self.settings.lighting, "lighting"),
            Action::ToggleAntialiasing => toggle(&mut self.settings.antialiasing, "antialiasing"),
            Action::SwitchRenderer => {
                self.mode = match self.mode {
                    Mode::Scene => Mode::Sketch,
                    Mode::Sketch => Mode::Scene,
                };
                println!("Renderer: {}", self.active_renderer().name());
            }
            Action::Redraw => {}
            Action::ReloadScene => self.reload_scene(),
            Action::Click(x, y) => {
                if let Renderer::Sketch(sketch) = &mut self.renderers[self.mode as usize] {
                    sketch.add_point(&mut self.framebuffer, x, y);
                    self.dirty = true;
                }
                // Clicks never re-render the scene
                return;
            }
        }
        self.needs_redraw = true;
    }

    fn reload_scene(&mut self) {
        let Some(path) = self.scene_path.clone() else {
            println!("No scene file to reload (using built-in demo)");
            return;
        };
        let renderer = load_scene(&path)
            .map_err(|e| e.to_string())
            .and_then(|scene| SceneRenderer::new(&scene, self.canvas).map(|r| (scene, r)).map_err(|e| e.to_string()));
        match renderer {
            Ok((scene, renderer)) => {
                println!("Reloaded scene {}", path.display());
                self.settings = scene.settings;
                self.renderers[Mode::Scene as usize] = Renderer::Scene(renderer);
            }
            Err(e) => eprintln!("Reload failed, keeping previous scene: {}", e),
        }
    }

    /// Render if requested. Returns the pixels to upload when anything changed.
    pub fn frame(&mut self) -> Option<&[u8]> {
        if self.needs_redraw {
            self.needs_redraw = false;
            self.dirty = false;

            let filters: Vec<Box<dyn PixelFilter>> = if self.settings.antialiasing {
                vec![Box::new(SimpleAntialiasing)]
            } else {
                Vec::new()
            };
            self.framebuffer.set_filters(filters);

            let renderer = &mut self.renderers[self.mode as usize];
            match renderer.draw(&mut self.framebuffer, &self.settings) {
                Ok(stats) => {
                    if let Some(stats) = stats {
                        println!("Rendered frame: {}", stats);
                    }
                    self.last_stats = stats;
                }
                Err(e) => eprintln!("Render failed: {}", e),
            }
            return Some(self.framebuffer.flush());
        }

        if self.dirty {
            self.dirty = false;
            return Some(&self.framebuffer.pixels);
        }

        None
    }
}

fn toggle(flag: &mut bool, label: &str) {
    *flag = !*flag;
    println!("{}: {}", label, if *flag { "on" } else { "off" });
}
