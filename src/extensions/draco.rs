//! KHR_draco_mesh_compression: compressed mesh geometry on a primitive.

use indexmap::IndexMap;

use crate::extensions::{EntityKind, ExtensionType, ExtensionValue, TypedExtension};
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// Compressed-geometry description attached to a mesh primitive.
///
/// `buffer_view` points at the compressed payload; `attributes` maps each
/// attribute name to its local accessor id inside that payload.
#[derive(Debug, Clone)]
pub struct DracoMeshCompression {
    pub buffer_view: i32,
    pub attributes: IndexMap<String, i32>,
    pub common: EntityCommon,
}

impl Default for DracoMeshCompression {
    fn default() -> Self {
        Self {
            buffer_view: -1,
            attributes: IndexMap::new(),
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for DracoMeshCompression {
    const TYPE_NAME: &'static str = "KHR_draco_mesh_compression";
    const KIND: EntityKind = EntityKind::Extension;

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
            "bufferView" => self.buffer_view = reader::read_index(src, cx)?,
            "attributes" => self.attributes = reader::read_index_map(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ExtensionType for DracoMeshCompression {
    const NAME: &'static str = "KHR_draco_mesh_compression";

    fn from_extension(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::Typed(TypedExtension::DracoMeshCompression(ext)) => Some(ext),
            _ => None,
        }
    }
}

pub(super) fn parse(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<TypedExtension> {
    Ok(TypedExtension::DracoMeshCompression(reader::read_object(
        src, cx,
    )?))
}
