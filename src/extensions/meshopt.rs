//! EXT_meshopt_compression: filter-transformed compressed mesh geometry.

use indexmap::IndexMap;

use crate::extensions::{EntityKind, ExtensionType, ExtensionValue, TypedExtension};
use crate::json::reader::{self, EventSource, GltfObject, NamedEnum, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// How the compressed stream is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshoptMode(pub i32);

impl MeshoptMode {
    pub const ATTRIBUTES: Self = Self(0);
    pub const TRIANGLES: Self = Self(1);
    pub const INDICES: Self = Self(2);
}

impl NamedEnum for MeshoptMode {
    const TYPE_NAME: &'static str = "mode";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ATTRIBUTES" => Some(Self::ATTRIBUTES),
            "TRIANGLES" => Some(Self::TRIANGLES),
            "INDICES" => Some(Self::INDICES),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Post-decode filter applied to reconstruct attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshoptFilter(pub i32);

impl MeshoptFilter {
    pub const NONE: Self = Self(0);
    pub const OCTAHEDRAL: Self = Self(1);
    pub const QUATERNION: Self = Self(2);
    pub const EXPONENTIAL: Self = Self(3);
}

impl NamedEnum for MeshoptFilter {
    const TYPE_NAME: &'static str = "filter";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(Self::NONE),
            "OCTAHEDRAL" => Some(Self::OCTAHEDRAL),
            "QUATERNION" => Some(Self::QUATERNION),
            "EXPONENTIAL" => Some(Self::EXPONENTIAL),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Filter-transformed compressed geometry attached to a mesh primitive.
///
/// Mirrors the Draco layout: `buffer_view` holds the payload, `attributes`
/// maps attribute names to local stream ids. Attributes listed in
/// `quantized` get their accessor min/max recomputed after decoding.
#[derive(Debug, Clone)]
pub struct MeshoptCompression {
    pub buffer_view: i32,
    pub count: i64,
    pub byte_stride: i64,
    pub mode: MeshoptMode,
    pub filter: MeshoptFilter,
    pub indices: i32,
    pub attributes: IndexMap<String, i32>,
    pub quantized: Vec<String>,
    pub common: EntityCommon,
}

impl Default for MeshoptCompression {
    fn default() -> Self {
        Self {
            buffer_view: -1,
            count: 0,
            byte_stride: 0,
            mode: MeshoptMode::ATTRIBUTES,
            filter: MeshoptFilter::NONE,
            indices: -1,
            attributes: IndexMap::new(),
            quantized: Vec::new(),
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for MeshoptCompression {
    const TYPE_NAME: &'static str = "EXT_meshopt_compression";
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
            "count" => self.count = reader::read_i64(src, cx, 0)?,
            "byteStride" => self.byte_stride = reader::read_i64(src, cx, 0)?,
            "mode" => self.mode = reader::read_enum(src, cx, MeshoptMode::ATTRIBUTES)?,
            "filter" => self.filter = reader::read_enum(src, cx, MeshoptFilter::NONE)?,
            "indices" => self.indices = reader::read_index(src, cx)?,
            "attributes" => self.attributes = reader::read_index_map(src, cx)?,
            "quantized" => self.quantized = reader::read_string_array(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ExtensionType for MeshoptCompression {
    const NAME: &'static str = "EXT_meshopt_compression";

    fn from_extension(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::Typed(TypedExtension::MeshoptCompression(ext)) => Some(ext),
            _ => None,
        }
    }
}

pub(super) fn parse(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<TypedExtension> {
    Ok(TypedExtension::MeshoptCompression(reader::read_object(
        src, cx,
    )?))
}
