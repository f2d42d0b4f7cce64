//! The typed glTF document model.
//!
//! The document is an arena of vectors, one per entity collection. All
//! cross-references between collections are integer indices with −1 as the
//! absent value; the reader records them verbatim and never validates
//! ranges. Every entity carries an [`EntityCommon`] with its extensions,
//! extras and captured unknown properties.

mod accessor;
mod buffer;
mod image;
mod material;
mod mesh;
mod node;

pub use accessor::{
    Accessor, AccessorSparse, AccessorType, ComponentType, SparseIndices, SparseValues,
};
pub use buffer::{Buffer, BufferTarget, BufferView};
pub use self::image::{DecodedImage, Image, MipPosition};
pub use material::{
    AlphaMode, Material, NormalTextureInfo, OcclusionTextureInfo, PbrMetallicRoughness, Sampler,
    SamplerFilter, SamplerWrap, Texture, TextureInfo,
};
pub use mesh::{Mesh, MeshPrimitive, PrimitiveMode};
pub use node::Node;

use indexmap::IndexMap;

use crate::extensions::{EntityKind, ExtensionType, ExtensionValue};
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::json::value::{JsonObject, JsonValue};
use crate::util::Result;

/// Shared per-entity storage: extensions, extras and unknown properties.
#[derive(Debug, Clone, Default)]
pub struct EntityCommon {
    /// Parsed extensions by name, typed or generic.
    pub extensions: IndexMap<String, ExtensionValue>,
    /// The entity's `extras` member.
    pub extras: JsonObject,
    /// Properties outside the entity's schema, captured when enabled.
    pub unknown_properties: JsonObject,
}

impl EntityCommon {
    /// The typed representation of a registered extension, if present.
    pub fn extension<T: ExtensionType>(&self) -> Option<&T> {
        self.extensions.get(T::NAME).and_then(T::from_extension)
    }

    /// The generic (dynamic-value) representation of an extension.
    pub fn generic_extension(&self, name: &str) -> Option<&JsonValue> {
        match self.extensions.get(name) {
            Some(ExtensionValue::Generic(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Remove an extension by name, preserving the order of the rest.
    pub fn remove_extension(&mut self, name: &str) -> Option<ExtensionValue> {
        self.extensions.shift_remove(name)
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, Default)]
pub struct Asset {
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub version: String,
    pub min_version: Option<String>,
    pub common: EntityCommon,
}

impl GltfObject for Asset {
    const TYPE_NAME: &'static str = "asset";
    const KIND: EntityKind = EntityKind::Asset;

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn read_property(
        &mut self,
        key: &str,
        src: &mut EventSource<'_>,
        cx: &mut ReadContext<'_>,
    ) -> Result<bool> {
        match key {
            "copyright" => self.copyright = reader::read_string(src, cx)?,
            "generator" => self.generator = reader::read_string(src, cx)?,
            "version" => self.version = reader::read_string(src, cx)?.unwrap_or_default(),
            "minVersion" => self.min_version = reader::read_string(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// An ordered set of root nodes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<i32>,
    pub common: EntityCommon,
}

impl GltfObject for Scene {
    const TYPE_NAME: &'static str = "scene";
    const KIND: EntityKind = EntityKind::Scene;

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn read_property(
        &mut self,
        key: &str,
        src: &mut EventSource<'_>,
        cx: &mut ReadContext<'_>,
    ) -> Result<bool> {
        match key {
            "name" => self.name = reader::read_string(src, cx)?,
            "nodes" => self.nodes = reader::read_i32_array(src, cx, -1)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// The root of the parsed document.
#[derive(Debug, Clone)]
pub struct Model {
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    pub accessors: Vec<Accessor>,
    pub asset: Asset,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub images: Vec<Image>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub samplers: Vec<Sampler>,
    /// Index of the default scene, −1 when absent.
    pub scene: i32,
    pub scenes: Vec<Scene>,
    pub textures: Vec<Texture>,
    pub common: EntityCommon,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            extensions_used: Vec::new(),
            extensions_required: Vec::new(),
            accessors: Vec::new(),
            asset: Asset::default(),
            buffers: Vec::new(),
            buffer_views: Vec::new(),
            images: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            nodes: Vec::new(),
            samplers: Vec::new(),
            scene: -1,
            scenes: Vec::new(),
            textures: Vec::new(),
            common: EntityCommon::default(),
        }
    }
}

impl Model {
    /// Indices of all root nodes, in scene order, without duplicates.
    pub fn root_node_indices(&self) -> Vec<i32> {
        let mut seen = Vec::new();
        for scene in &self.scenes {
            for &index in &scene.nodes {
                if !seen.contains(&index) {
                    seen.push(index);
                }
            }
        }
        seen
    }
}

impl GltfObject for Model {
    const TYPE_NAME: &'static str = "glTF";
    const KIND: EntityKind = EntityKind::Model;

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn read_property(
        &mut self,
        key: &str,
        src: &mut EventSource<'_>,
        cx: &mut ReadContext<'_>,
    ) -> Result<bool> {
        match key {
            "extensionsUsed" => self.extensions_used = reader::read_string_array(src, cx)?,
            "extensionsRequired" => {
                self.extensions_required = reader::read_string_array(src, cx)?
            }
            "accessors" => self.accessors = reader::read_object_array(src, cx)?,
            "asset" => self.asset = reader::read_object(src, cx)?,
            "buffers" => self.buffers = reader::read_object_array(src, cx)?,
            "bufferViews" => self.buffer_views = reader::read_object_array(src, cx)?,
            "images" => self.images = reader::read_object_array(src, cx)?,
            "materials" => self.materials = reader::read_object_array(src, cx)?,
            "meshes" => self.meshes = reader::read_object_array(src, cx)?,
            "nodes" => self.nodes = reader::read_object_array(src, cx)?,
            "samplers" => self.samplers = reader::read_object_array(src, cx)?,
            "scene" => self.scene = reader::read_index(src, cx)?,
            "scenes" => self.scenes = reader::read_object_array(src, cx)?,
            "textures" => self.textures = reader::read_object_array(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
