//! Accessor: a typed, counted view over a buffer view.

use smallvec::SmallVec;

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, NamedEnum, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// Component storage kind of an accessor element.
///
/// Raw enumerator values from the document are preserved even when they
/// match no known constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType(pub i32);

impl ComponentType {
    pub const BYTE: Self = Self(5120);
    pub const UNSIGNED_BYTE: Self = Self(5121);
    pub const SHORT: Self = Self(5122);
    pub const UNSIGNED_SHORT: Self = Self(5123);
    pub const UNSIGNED_INT: Self = Self(5125);
    pub const FLOAT: Self = Self(5126);

    /// Size of one component in bytes; 0 for unknown enumerators.
    pub const fn byte_size(self) -> usize {
        match self.0 {
            5120 | 5121 => 1,
            5122 | 5123 => 2,
            5125 | 5126 => 4,
            _ => 0,
        }
    }
}

impl Default for ComponentType {
    fn default() -> Self {
        Self::BYTE
    }
}

impl NamedEnum for ComponentType {
    const TYPE_NAME: &'static str = "componentType";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "BYTE" => Some(Self::BYTE),
            "UNSIGNED_BYTE" => Some(Self::UNSIGNED_BYTE),
            "SHORT" => Some(Self::SHORT),
            "UNSIGNED_SHORT" => Some(Self::UNSIGNED_SHORT),
            "UNSIGNED_INT" => Some(Self::UNSIGNED_INT),
            "FLOAT" => Some(Self::FLOAT),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Element shape of an accessor: scalar, vector or matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorType(pub i32);

impl AccessorType {
    pub const SCALAR: Self = Self(0);
    pub const VEC2: Self = Self(1);
    pub const VEC3: Self = Self(2);
    pub const VEC4: Self = Self(3);
    pub const MAT2: Self = Self(4);
    pub const MAT3: Self = Self(5);
    pub const MAT4: Self = Self(6);

    /// Number of components per element; 0 for unknown enumerators.
    pub const fn component_count(self) -> usize {
        match self.0 {
            0 => 1,
            1 => 2,
            2 => 3,
            3 | 4 => 4,
            5 => 9,
            6 => 16,
            _ => 0,
        }
    }
}

impl Default for AccessorType {
    fn default() -> Self {
        Self::SCALAR
    }
}

impl NamedEnum for AccessorType {
    const TYPE_NAME: &'static str = "type";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::SCALAR),
            "VEC2" => Some(Self::VEC2),
            "VEC3" => Some(Self::VEC3),
            "VEC4" => Some(Self::VEC4),
            "MAT2" => Some(Self::MAT2),
            "MAT3" => Some(Self::MAT3),
            "MAT4" => Some(Self::MAT4),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Indices of the sparse elements that deviate from the base data.
#[derive(Debug, Clone)]
pub struct SparseIndices {
    pub buffer_view: i32,
    pub byte_offset: i64,
    pub component_type: ComponentType,
    pub common: EntityCommon,
}

impl Default for SparseIndices {
    fn default() -> Self {
        Self {
            buffer_view: -1,
            byte_offset: 0,
            component_type: ComponentType::default(),
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for SparseIndices {
    const TYPE_NAME: &'static str = "accessor sparse indices";
    const KIND: EntityKind = EntityKind::SparseIndices;

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
            "byteOffset" => self.byte_offset = reader::read_i64(src, cx, 0)?,
            "componentType" => {
                self.component_type = reader::read_enum(src, cx, ComponentType::default())?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Replacement values for the sparse elements.
#[derive(Debug, Clone)]
pub struct SparseValues {
    pub buffer_view: i32,
    pub byte_offset: i64,
    pub common: EntityCommon,
}

impl Default for SparseValues {
    fn default() -> Self {
        Self {
            buffer_view: -1,
            byte_offset: 0,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for SparseValues {
    const TYPE_NAME: &'static str = "accessor sparse values";
    const KIND: EntityKind = EntityKind::SparseValues;

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
            "byteOffset" => self.byte_offset = reader::read_i64(src, cx, 0)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Sparse storage override for an accessor.
#[derive(Debug, Clone, Default)]
pub struct AccessorSparse {
    pub count: i64,
    pub indices: SparseIndices,
    pub values: SparseValues,
    pub common: EntityCommon,
}

impl GltfObject for AccessorSparse {
    const TYPE_NAME: &'static str = "accessor sparse";
    const KIND: EntityKind = EntityKind::AccessorSparse;

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
            "count" => self.count = reader::read_i64(src, cx, 0)?,
            "indices" => self.indices = reader::read_object(src, cx)?,
            "values" => self.values = reader::read_object(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A typed view over a buffer view.
#[derive(Debug, Clone)]
pub struct Accessor {
    pub name: Option<String>,
    pub buffer_view: i32,
    pub byte_offset: i64,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub count: i64,
    pub element_type: AccessorType,
    pub max: SmallVec<[f64; 16]>,
    pub min: SmallVec<[f64; 16]>,
    pub sparse: Option<AccessorSparse>,
    pub common: EntityCommon,
}

impl Default for Accessor {
    fn default() -> Self {
        Self {
            name: None,
            buffer_view: -1,
            byte_offset: 0,
            component_type: ComponentType::default(),
            normalized: false,
            count: 0,
            element_type: AccessorType::default(),
            max: SmallVec::new(),
            min: SmallVec::new(),
            sparse: None,
            common: EntityCommon::default(),
        }
    }
}

impl Accessor {
    /// Size in bytes of one element, ignoring stride.
    pub fn element_byte_size(&self) -> usize {
        self.component_type.byte_size() * self.element_type.component_count()
    }
}

impl GltfObject for Accessor {
    const TYPE_NAME: &'static str = "accessor";
    const KIND: EntityKind = EntityKind::Accessor;

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
            "bufferView" => self.buffer_view = reader::read_index(src, cx)?,
            "byteOffset" => self.byte_offset = reader::read_i64(src, cx, 0)?,
            "componentType" => {
                self.component_type = reader::read_enum(src, cx, ComponentType::default())?
            }
            "normalized" => self.normalized = reader::read_bool(src, cx, false)?,
            "count" => self.count = reader::read_i64(src, cx, 0)?,
            "type" => self.element_type = reader::read_enum(src, cx, AccessorType::default())?,
            "max" => self.max = SmallVec::from_vec(reader::read_f64_array(src, cx)?),
            "min" => self.min = SmallVec::from_vec(reader::read_f64_array(src, cx)?),
            "sparse" => self.sparse = Some(reader::read_object(src, cx)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_sizes() {
        assert_eq!(ComponentType::UNSIGNED_BYTE.byte_size(), 1);
        assert_eq!(ComponentType::UNSIGNED_SHORT.byte_size(), 2);
        assert_eq!(ComponentType::FLOAT.byte_size(), 4);
        assert_eq!(ComponentType(9999).byte_size(), 0);
    }

    #[test]
    fn test_accessor_type_component_counts() {
        assert_eq!(AccessorType::SCALAR.component_count(), 1);
        assert_eq!(AccessorType::VEC3.component_count(), 3);
        assert_eq!(AccessorType::MAT2.component_count(), 4);
        assert_eq!(AccessorType::MAT4.component_count(), 16);
    }

    #[test]
    fn test_element_byte_size() {
        let accessor = Accessor {
            component_type: ComponentType::FLOAT,
            element_type: AccessorType::VEC3,
            ..Default::default()
        };
        assert_eq!(accessor.element_byte_size(), 12);
    }

    #[test]
    fn test_unknown_enumerators_are_preserved() {
        let t = ComponentType::from_raw(4242);
        assert_eq!(t.0, 4242);
        assert_eq!(ComponentType::from_name("UNSIGNED_BYTE"), Some(ComponentType::UNSIGNED_BYTE));
        assert_eq!(ComponentType::from_name("unsigned_byte"), None);
    }
}
