//! World module - scene descriptions and scene files
//!
//! A scene is a list of named figures (meshes in model space), instances
//! placing those figures in the world, one camera and the lighting setup.
//! Files are RON (or JSON) and are validated on load.

#![allow(dead_code)]

mod description;
mod scene_file;

pub use description::*;
pub use scene_file::*;
