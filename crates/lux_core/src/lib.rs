//! Lux Core - scene description and asset loading.
//!
//! This crate provides:
//!
//! - **Scene description**: serde types for the JSON scene format
//!   (`SceneDescription`, `CameraSettings`, objects, materials, textures)
//! - **Textures**: image loading into linear float pixels with a path cache
//!
//! # Example
//!
//! ```ignore
//! use lux_core::load_scene;
//!
//! let scene = load_scene("scenes/cornell.json")?;
//! println!("{} objects, {} materials", scene.objects.len(), scene.materials.len());
//! ```

pub mod scene;
pub mod texture;

pub use scene::{
    load_scene, Background, CameraSettings, MaterialDesc, MediumDesc, ObjectDesc, SceneDescription,
    SceneError, SceneResult, ShapeDesc, TextureDesc, TextureRef, TransformDesc,
};
pub use texture::{ImageTexture, TextureCache, TextureError, TextureResult};
