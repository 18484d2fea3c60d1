//! softpipe: a software 3D rendering pipeline
//!
//! Loads a scene (RON or JSON), renders it on the CPU into an RGBA buffer
//! and shows the buffer in a window:
//! - Welzl bounding spheres and six-plane frustum clipping
//! - Ambient + directional lighting evaluated per vertex
//! - Gouraud-shaded scanline triangles with a depth buffer
//!
//! Usage: `softpipe [scene.ron|scene.json]` (built-in demo when omitted)

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod world;
mod scene;
mod renderer;
mod app;

use macroquad::prelude::*;
use rasterizer::{CanvasSettings, HEIGHT, WIDTH};
use world::{demo_scene, load_scene, SceneDescription};
use app::{Action, AppState};
use std::path::PathBuf;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softpipe v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// Scene from the first command line argument, or the built-in demo
fn initial_scene() -> Option<(SceneDescription, Option<PathBuf>)> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match load_scene(&path) {
            Ok(scene) => {
                println!("Loaded scene {} ({} figures, {} instances)",
                    path.display(), scene.figures.len(), scene.instances.len());
                Some((scene, Some(path)))
            }
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                None
            }
        },
        None => match demo_scene() {
            Ok(scene) => {
                println!("No scene given, using built-in demo");
                Some((scene, None))
            }
            Err(e) => {
                eprintln!("Built-in demo scene is invalid: {}", e);
                None
            }
        },
    }
}

/// Keyboard and mouse input for this frame
fn poll_actions() -> Vec<Action> {
    let bindings = [
        (KeyCode::C, Action::ToggleClipping),
        (KeyCode::B, Action::ToggleBoundingSphere),
        (KeyCode::W, Action::ToggleWireframeOnly),
        (KeyCode::O, Action::ToggleWireframeOverlay),
        (KeyCode::L, Action::ToggleLighting),
        (KeyCode::A, Action::ToggleAntialiasing),
        (KeyCode::Tab, Action::SwitchRenderer),
        (KeyCode::Space, Action::Redraw),
        (KeyCode::R, Action::ReloadScene),
    ];

    let mut actions: Vec<Action> = bindings
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|&(_, action)| action)
        .collect();

    if is_mouse_button_pressed(MouseButton::Left) {
        // Window and canvas can differ on high-dpi displays
        let (mx, my) = mouse_position();
        let x = mx * WIDTH as f32 / screen_width();
        let y = my * HEIGHT as f32 / screen_height();
        actions.push(Action::Click(x, y));
    }

    actions
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let Some((scene, scene_path)) = initial_scene() else {
        std::process::exit(1);
    };

    let mut app = match AppState::new(&scene, scene_path, CanvasSettings::default()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Cannot render scene: {}", e);
            std::process::exit(1);
        }
    };

    let texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &app.framebuffer.pixels);
    texture.set_filter(FilterMode::Nearest);

    println!("=== softpipe ===");
    println!("C clip | B sphere | W wire | O overlay | L light | A aa | Tab renderer | Space draw | R reload");

    loop {
        for action in poll_actions() {
            app.apply(action);
        }

        if let Some(pixels) = app.frame() {
            texture.update_from_bytes(WIDTH as u32, HEIGHT as u32, pixels);
        }

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
