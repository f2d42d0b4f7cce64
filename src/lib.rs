//! # gltf-reader
//!
//! Reader for the glTF 2.0 3D asset interchange format.
//!
//! Accepts either a textual JSON document or a binary (GLB) envelope and
//! returns an in-memory object graph faithful to the format's schema, with
//! optional post-parse passes: data-URI resolution, embedded-image decoding
//! (raster formats and KTX2 containers with their mip layout), mesh
//! decompression through external codecs, and RTC recentering.
//!
//! ## Modules
//!
//! - [`util`] - Error types
//! - [`json`] - JSON event stream, dynamic value tree, schema framework
//! - [`model`] - Typed document entities
//! - [`extensions`] - Extension registry and builtin typed extensions
//! - [`glb`] - Binary container parsing
//! - [`texture`] - Image decoding (raster + KTX2)
//! - [`codec`] - Seams for external mesh-decompression codecs
//! - [`passes`] - Post-parse pipeline stages
//!
//! ## Example
//!
//! ```ignore
//! use gltf_reader::GltfReader;
//!
//! let reader = GltfReader::new();
//! let result = reader.read(&bytes);
//! if let Some(model) = &result.model {
//!     println!("{} meshes", model.meshes.len());
//! }
//! ```

pub mod codec;
pub mod extensions;
pub mod glb;
pub mod json;
pub mod model;
pub mod passes;
pub mod reader;
pub mod texture;
pub mod util;

// Re-export the main entry points.
pub use extensions::ExtensionState;
pub use json::value::{JsonObject, JsonValue};
pub use model::Model;
pub use reader::{GltfReader, GltfReaderOptions, GltfReaderResult, ImageReaderResult};
pub use texture::{Ktx2TranscodeTargets, TranscodeTarget};
pub use util::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::extensions::{ExtensionState, ExtensionType};
    pub use crate::json::value::{JsonObject, JsonValue};
    pub use crate::model::*;
    pub use crate::reader::{GltfReader, GltfReaderOptions, GltfReaderResult, ImageReaderResult};
    pub use crate::texture::{Ktx2TranscodeTargets, TranscodeTarget};
    pub use crate::util::{Error, Result};
}
