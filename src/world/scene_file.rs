//! Scene loading and saving
//!
//! Scenes are RON by default; files ending in `.json` are read as JSON.
//! Every loaded scene is validated before it reaches the renderer.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::{CameraDescription, Figure, SceneDescription};
use crate::rasterizer::ViewFrustum;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of figures in a scene
    pub const MAX_FIGURES: usize = 256;
    /// Maximum number of instances in a scene
    pub const MAX_INSTANCES: usize = 4096;
    /// Maximum vertices per figure
    pub const MAX_VERTICES: usize = 65536;
    /// Maximum triangles per figure
    pub const MAX_TRIANGLES: usize = 65536;
    /// Maximum string length for names
    pub const MAX_STRING_LEN: usize = 256;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

/// Built-in scene used when no file is given
const DEMO_SCENE: &str = include_str!("../../assets/scenes/demo.ron");

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    JsonError(serde_json::Error),
    ValidationError(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::ParseError(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::SerializeError(e)
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(e: serde_json::Error) -> Self {
        SceneError::JsonError(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::IoError(e) => write!(f, "IO error: {}", e),
            SceneError::ParseError(e) => write!(f, "Parse error: {}", e),
            SceneError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            SceneError::JsonError(e) => write!(f, "JSON error: {}", e),
            SceneError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}

/// On-disk scene encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Ron,
    Json,
}

impl SceneFormat {
    /// `.json` (any case) is JSON, everything else RON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SceneFormat::Json,
            _ => SceneFormat::Ron,
        }
    }
}

/// Check if a float is valid (finite and within coordinate limits)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_name(name: &str, context: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{}: empty name", context));
    }
    if name.len() > limits::MAX_STRING_LEN {
        return Err(format!("{}: name too long ({} > {})",
            context, name.len(), limits::MAX_STRING_LEN));
    }
    Ok(())
}

fn validate_figure(figure: &Figure, idx: usize) -> Result<(), String> {
    let context = format!("figure[{}]", idx);
    validate_name(&figure.name, &context)?;
    let context = format!("figure '{}'", figure.name);

    if figure.vertices.len() > limits::MAX_VERTICES {
        return Err(format!("{}: too many vertices ({} > {})",
            context, figure.vertices.len(), limits::MAX_VERTICES));
    }
    if figure.triangles.len() > limits::MAX_TRIANGLES {
        return Err(format!("{}: too many triangles ({} > {})",
            context, figure.triangles.len(), limits::MAX_TRIANGLES));
    }

    for (i, v) in figure.vertices.iter().enumerate() {
        let p = v.0;
        if !is_valid_float(p.x) || !is_valid_float(p.y) || !is_valid_float(p.z) {
            return Err(format!("{}: vertex {} has invalid coordinates {:?}", context, i, p));
        }
    }

    for (i, t) in figure.triangles.iter().enumerate() {
        if let Some(&bad) = t.indices.iter().find(|&&idx| idx >= figure.vertices.len()) {
            return Err(format!("{}: triangle {} index {} out of range (vertex count {})",
                context, i, bad, figure.vertices.len()));
        }
        if let Some(normals) = &t.normals {
            if normals.iter().any(|n| !n.is_finite()) {
                return Err(format!("{}: triangle {} has a non-finite normal", context, i));
            }
        }
    }

    Ok(())
}

fn validate_camera(camera: &CameraDescription) -> Result<(), String> {
    let p = camera.position;
    if !is_valid_float(p.x) || !is_valid_float(p.y) || !is_valid_float(p.z) {
        return Err(format!("camera: invalid position {:?}", p));
    }
    // Aspect comes from the canvas later; any positive value checks the rest
    ViewFrustum::new(camera.fov, camera.near, camera.far, 1.0)
        .map(|_| ())
        .map_err(|e| format!("camera: {}", e))
}

pub fn validate_scene(scene: &SceneDescription) -> Result<(), SceneError> {
    if scene.figures.len() > limits::MAX_FIGURES {
        return Err(SceneError::ValidationError(format!(
            "too many figures ({} > {})", scene.figures.len(), limits::MAX_FIGURES
        )));
    }
    if scene.instances.len() > limits::MAX_INSTANCES {
        return Err(SceneError::ValidationError(format!(
            "too many instances ({} > {})", scene.instances.len(), limits::MAX_INSTANCES
        )));
    }

    let mut names = HashSet::new();
    for (i, figure) in scene.figures.iter().enumerate() {
        validate_figure(figure, i).map_err(SceneError::ValidationError)?;
        if !names.insert(figure.name.as_str()) {
            return Err(SceneError::ValidationError(format!(
                "duplicate figure name '{}'", figure.name
            )));
        }
    }

    for (i, instance) in scene.instances.iter().enumerate() {
        if !names.contains(instance.name.as_str()) {
            return Err(SceneError::ValidationError(format!(
                "instance[{}]: unknown figure '{}'", i, instance.name
            )));
        }
        for (label, v) in [("scale", instance.scale), ("rotation", instance.rotation), ("translate", instance.translate)] {
            if !is_valid_float(v.x) || !is_valid_float(v.y) || !is_valid_float(v.z) {
                return Err(SceneError::ValidationError(format!(
                    "instance[{}]: invalid {} {:?}", i, label, v
                )));
            }
        }
    }

    validate_camera(&scene.camera).map_err(SceneError::ValidationError)?;

    Ok(())
}

/// Print the offending line of a RON parse error
fn report_ron_error(source_name: &str, contents: &str, e: &ron::error::SpannedError) {
    eprintln!("RON parse error in {}: {}", source_name, e);
    let pos = e.position;
    let lines: Vec<&str> = contents.lines().collect();
    let line_idx = pos.line.saturating_sub(1);
    if line_idx < lines.len() {
        eprintln!("  Line {}: {}", pos.line, lines[line_idx]);
    }
}

/// Parse and validate a scene from a string
pub fn parse_scene(s: &str, format: SceneFormat) -> Result<SceneDescription, SceneError> {
    let scene: SceneDescription = match format {
        SceneFormat::Ron => match ron::from_str(s) {
            Ok(scene) => scene,
            Err(e) => {
                report_ron_error("scene", s, &e);
                return Err(e.into());
            }
        },
        SceneFormat::Json => serde_json::from_str(s)?,
    };

    validate_scene(&scene)?;
    Ok(scene)
}

/// Load a scene file (RON, or JSON by extension)
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDescription, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let format = SceneFormat::from_path(path);

    match parse_scene(&contents, format) {
        Ok(scene) => Ok(scene),
        Err(e) => {
            eprintln!("Failed to load scene {}: {}", path.display(), e);
            Err(e)
        }
    }
}

/// Save a scene as pretty-printed RON
pub fn save_scene<P: AsRef<Path>>(scene: &SceneDescription, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let ron_string = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// The built-in demo scene
pub fn demo_scene() -> Result<SceneDescription, SceneError> {
    parse_scene(DEMO_SCENE, SceneFormat::Ron)
}
