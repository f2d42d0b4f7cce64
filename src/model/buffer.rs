//! Buffers and buffer views.

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, NamedEnum, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// A byte payload.
///
/// The schema carries only the length and an optional URI. The resolved
/// payload lands in `data`: the binary chunk of a GLB for the first buffer,
/// or the decoded bytes of a data URI. External URIs are left in `uri` for
/// the caller to resolve.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub byte_length: i64,
    /// Resolved payload; empty until a source is bound.
    pub data: Vec<u8>,
    pub common: EntityCommon,
}

impl GltfObject for Buffer {
    const TYPE_NAME: &'static str = "buffer";
    const KIND: EntityKind = EntityKind::Buffer;

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
            "uri" => self.uri = reader::read_string(src, cx)?,
            "byteLength" => self.byte_length = reader::read_i64(src, cx, 0)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// GPU binding hint for a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTarget(pub i32);

impl BufferTarget {
    pub const ARRAY_BUFFER: Self = Self(34962);
    pub const ELEMENT_ARRAY_BUFFER: Self = Self(34963);
}

impl NamedEnum for BufferTarget {
    const TYPE_NAME: &'static str = "target";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ARRAY_BUFFER" => Some(Self::ARRAY_BUFFER),
            "ELEMENT_ARRAY_BUFFER" => Some(Self::ELEMENT_ARRAY_BUFFER),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// A slice of a buffer.
#[derive(Debug, Clone)]
pub struct BufferView {
    pub name: Option<String>,
    pub buffer: i32,
    pub byte_offset: i64,
    pub byte_length: i64,
    pub byte_stride: Option<i64>,
    pub target: Option<BufferTarget>,
    pub common: EntityCommon,
}

impl Default for BufferView {
    fn default() -> Self {
        Self {
            name: None,
            buffer: -1,
            byte_offset: 0,
            byte_length: 0,
            byte_stride: None,
            target: None,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for BufferView {
    const TYPE_NAME: &'static str = "bufferView";
    const KIND: EntityKind = EntityKind::BufferView;

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
            "buffer" => self.buffer = reader::read_index(src, cx)?,
            "byteOffset" => self.byte_offset = reader::read_i64(src, cx, 0)?,
            "byteLength" => self.byte_length = reader::read_i64(src, cx, 0)?,
            "byteStride" => self.byte_stride = Some(reader::read_i64(src, cx, 0)?),
            "target" => self.target = reader::read_enum_opt(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
