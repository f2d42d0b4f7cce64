//! Meshes and their primitives.

use indexmap::IndexMap;

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, NamedEnum, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// Primitive topology (GL enumerators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveMode(pub i32);

impl PrimitiveMode {
    pub const POINTS: Self = Self(0);
    pub const LINES: Self = Self(1);
    pub const LINE_LOOP: Self = Self(2);
    pub const LINE_STRIP: Self = Self(3);
    pub const TRIANGLES: Self = Self(4);
    pub const TRIANGLE_STRIP: Self = Self(5);
    pub const TRIANGLE_FAN: Self = Self(6);
}

impl Default for PrimitiveMode {
    fn default() -> Self {
        Self::TRIANGLES
    }
}

impl NamedEnum for PrimitiveMode {
    const TYPE_NAME: &'static str = "mode";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "POINTS" => Some(Self::POINTS),
            "LINES" => Some(Self::LINES),
            "LINE_LOOP" => Some(Self::LINE_LOOP),
            "LINE_STRIP" => Some(Self::LINE_STRIP),
            "TRIANGLES" => Some(Self::TRIANGLES),
            "TRIANGLE_STRIP" => Some(Self::TRIANGLE_STRIP),
            "TRIANGLE_FAN" => Some(Self::TRIANGLE_FAN),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// One drawable piece of a mesh.
///
/// `attributes` maps semantic names ("POSITION", "NORMAL", "TEXCOORD_0", …)
/// to accessor indices; `targets` holds the same shape per morph target.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub attributes: IndexMap<String, i32>,
    pub indices: i32,
    pub material: i32,
    pub mode: PrimitiveMode,
    pub targets: Vec<IndexMap<String, i32>>,
    pub common: EntityCommon,
}

impl Default for MeshPrimitive {
    fn default() -> Self {
        Self {
            attributes: IndexMap::new(),
            indices: -1,
            material: -1,
            mode: PrimitiveMode::TRIANGLES,
            targets: Vec::new(),
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for MeshPrimitive {
    const TYPE_NAME: &'static str = "primitive";
    const KIND: EntityKind = EntityKind::MeshPrimitive;

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
            "attributes" => self.attributes = reader::read_index_map(src, cx)?,
            "indices" => self.indices = reader::read_index(src, cx)?,
            "material" => self.material = reader::read_index(src, cx)?,
            "mode" => self.mode = reader::read_enum(src, cx, PrimitiveMode::TRIANGLES)?,
            "targets" => self.targets = reader::read_index_map_array(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// An ordered list of primitives.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<MeshPrimitive>,
    pub weights: Vec<f64>,
    pub common: EntityCommon,
}

impl GltfObject for Mesh {
    const TYPE_NAME: &'static str = "mesh";
    const KIND: EntityKind = EntityKind::Mesh;

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
            "primitives" => self.primitives = reader::read_object_array(src, cx)?,
            "weights" => self.weights = reader::read_f64_array(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
