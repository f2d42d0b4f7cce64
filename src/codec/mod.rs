//! Seams for external mesh-decompression codecs.
//!
//! The bit-level decoders live outside this crate; the decompression passes
//! talk to them through these traits. A codec consumes the compressed bytes
//! of a buffer view and produces uncompressed attribute streams keyed by
//! the local ids the owning extension refers to.

use indexmap::IndexMap;
use thiserror::Error;

use crate::extensions::{MeshoptFilter, MeshoptMode};
use crate::model::{AccessorType, ComponentType};

/// Codec failure. Never fatal: the owning pass records a warning and leaves
/// the primitive untouched.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("corrupt compressed mesh data: {0}")]
    Corrupt(String),

    #[error("unsupported compression feature: {0}")]
    Unsupported(String),
}

/// One decoded attribute or index stream.
#[derive(Debug, Clone)]
pub struct DecodedAttribute {
    pub component_type: ComponentType,
    pub element_type: AccessorType,
    pub normalized: bool,
    /// Number of elements (not components).
    pub count: i64,
    /// Tightly packed little-endian element data.
    pub data: Vec<u8>,
}

impl DecodedAttribute {
    /// Build a float stream from component values.
    pub fn from_f32s(element_type: AccessorType, values: &[f32]) -> Self {
        let components = element_type.component_count().max(1);
        Self {
            component_type: ComponentType::FLOAT,
            element_type,
            normalized: false,
            count: (values.len() / components) as i64,
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// Build an index stream from 32-bit indices.
    pub fn from_u32_indices(indices: &[u32]) -> Self {
        Self {
            component_type: ComponentType::UNSIGNED_INT,
            element_type: AccessorType::SCALAR,
            normalized: false,
            count: indices.len() as i64,
            data: bytemuck::cast_slice(indices).to_vec(),
        }
    }

    /// One component of one element as a double, when in bounds.
    pub fn component_as_f64(&self, element: usize, component: usize) -> Option<f64> {
        let components = self.element_type.component_count();
        let size = self.component_type.byte_size();
        if component >= components || size == 0 {
            return None;
        }
        let offset = (element * components + component) * size;
        let bytes = self.data.get(offset..offset + size)?;
        Some(match self.component_type {
            ComponentType::BYTE => f64::from(bytes[0] as i8),
            ComponentType::UNSIGNED_BYTE => f64::from(bytes[0]),
            ComponentType::SHORT => f64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            ComponentType::UNSIGNED_SHORT => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            ComponentType::UNSIGNED_INT => {
                f64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            ComponentType::FLOAT => {
                f64::from(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            _ => return None,
        })
    }
}

/// A fully decoded primitive payload.
#[derive(Debug, Clone, Default)]
pub struct DecodedMesh {
    /// Attribute streams by the codec's local accessor id.
    pub attributes: IndexMap<i32, DecodedAttribute>,
    /// The index stream, when the payload carries one.
    pub indices: Option<DecodedAttribute>,
}

/// Decoder for the self-describing compressed-mesh codec.
pub trait MeshDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DecodedMesh, CodecError>;
}

/// Stream layout handed to the filtered codec; the payload itself does not
/// describe it.
#[derive(Debug, Clone, Copy)]
pub struct FilteredDecodeLayout {
    pub count: i64,
    pub byte_stride: i64,
    pub mode: MeshoptMode,
    pub filter: MeshoptFilter,
}

/// Decoder for the filter-transformed compressed-mesh codec.
pub trait FilteredMeshDecoder: Send + Sync {
    fn decode(&self, data: &[u8], layout: &FilteredDecodeLayout)
        -> Result<DecodedMesh, CodecError>;
}
