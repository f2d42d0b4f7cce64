//! Materials, textures and samplers. Schema only; the reader attaches no
//! behavior to these entities.

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, NamedEnum, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// Texture magnification/minification filter (GL enumerators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerFilter(pub i32);

impl SamplerFilter {
    pub const NEAREST: Self = Self(9728);
    pub const LINEAR: Self = Self(9729);
    pub const NEAREST_MIPMAP_NEAREST: Self = Self(9984);
    pub const LINEAR_MIPMAP_NEAREST: Self = Self(9985);
    pub const NEAREST_MIPMAP_LINEAR: Self = Self(9986);
    pub const LINEAR_MIPMAP_LINEAR: Self = Self(9987);
}

impl NamedEnum for SamplerFilter {
    const TYPE_NAME: &'static str = "filter";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "NEAREST" => Some(Self::NEAREST),
            "LINEAR" => Some(Self::LINEAR),
            "NEAREST_MIPMAP_NEAREST" => Some(Self::NEAREST_MIPMAP_NEAREST),
            "LINEAR_MIPMAP_NEAREST" => Some(Self::LINEAR_MIPMAP_NEAREST),
            "NEAREST_MIPMAP_LINEAR" => Some(Self::NEAREST_MIPMAP_LINEAR),
            "LINEAR_MIPMAP_LINEAR" => Some(Self::LINEAR_MIPMAP_LINEAR),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Texture coordinate wrapping mode (GL enumerators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerWrap(pub i32);

impl SamplerWrap {
    pub const CLAMP_TO_EDGE: Self = Self(33071);
    pub const MIRRORED_REPEAT: Self = Self(33648);
    pub const REPEAT: Self = Self(10497);
}

impl Default for SamplerWrap {
    fn default() -> Self {
        Self::REPEAT
    }
}

impl NamedEnum for SamplerWrap {
    const TYPE_NAME: &'static str = "wrap";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "CLAMP_TO_EDGE" => Some(Self::CLAMP_TO_EDGE),
            "MIRRORED_REPEAT" => Some(Self::MIRRORED_REPEAT),
            "REPEAT" => Some(Self::REPEAT),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Texture sampling parameters.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    pub name: Option<String>,
    pub mag_filter: Option<SamplerFilter>,
    pub min_filter: Option<SamplerFilter>,
    pub wrap_s: SamplerWrap,
    pub wrap_t: SamplerWrap,
    pub common: EntityCommon,
}

impl GltfObject for Sampler {
    const TYPE_NAME: &'static str = "sampler";
    const KIND: EntityKind = EntityKind::Sampler;

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
            "magFilter" => self.mag_filter = reader::read_enum_opt(src, cx)?,
            "minFilter" => self.min_filter = reader::read_enum_opt(src, cx)?,
            "wrapS" => self.wrap_s = reader::read_enum(src, cx, SamplerWrap::REPEAT)?,
            "wrapT" => self.wrap_t = reader::read_enum(src, cx, SamplerWrap::REPEAT)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A sampler/image pairing.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: Option<String>,
    pub sampler: i32,
    pub source: i32,
    pub common: EntityCommon,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            name: None,
            sampler: -1,
            source: -1,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for Texture {
    const TYPE_NAME: &'static str = "texture";
    const KIND: EntityKind = EntityKind::Texture;

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
            "sampler" => self.sampler = reader::read_index(src, cx)?,
            "source" => self.source = reader::read_index(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Reference from a material to a texture and UV set.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub index: i32,
    pub tex_coord: i64,
    pub common: EntityCommon,
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self {
            index: -1,
            tex_coord: 0,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for TextureInfo {
    const TYPE_NAME: &'static str = "textureInfo";
    const KIND: EntityKind = EntityKind::TextureInfo;

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
            "index" => self.index = reader::read_index(src, cx)?,
            "texCoord" => self.tex_coord = reader::read_i64(src, cx, 0)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Normal map reference with its scale factor.
#[derive(Debug, Clone)]
pub struct NormalTextureInfo {
    pub index: i32,
    pub tex_coord: i64,
    pub scale: f64,
    pub common: EntityCommon,
}

impl Default for NormalTextureInfo {
    fn default() -> Self {
        Self {
            index: -1,
            tex_coord: 0,
            scale: 1.0,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for NormalTextureInfo {
    const TYPE_NAME: &'static str = "normalTextureInfo";
    const KIND: EntityKind = EntityKind::TextureInfo;

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
            "index" => self.index = reader::read_index(src, cx)?,
            "texCoord" => self.tex_coord = reader::read_i64(src, cx, 0)?,
            "scale" => self.scale = reader::read_f64(src, cx, 1.0)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Occlusion map reference with its strength factor.
#[derive(Debug, Clone)]
pub struct OcclusionTextureInfo {
    pub index: i32,
    pub tex_coord: i64,
    pub strength: f64,
    pub common: EntityCommon,
}

impl Default for OcclusionTextureInfo {
    fn default() -> Self {
        Self {
            index: -1,
            tex_coord: 0,
            strength: 1.0,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for OcclusionTextureInfo {
    const TYPE_NAME: &'static str = "occlusionTextureInfo";
    const KIND: EntityKind = EntityKind::TextureInfo;

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
            "index" => self.index = reader::read_index(src, cx)?,
            "texCoord" => self.tex_coord = reader::read_i64(src, cx, 0)?,
            "strength" => self.strength = reader::read_f64(src, cx, 1.0)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Metallic-roughness parameters of the core PBR model.
#[derive(Debug, Clone)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f64; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f64,
    pub roughness_factor: f64,
    pub metallic_roughness_texture: Option<TextureInfo>,
    pub common: EntityCommon,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for PbrMetallicRoughness {
    const TYPE_NAME: &'static str = "pbrMetallicRoughness";
    const KIND: EntityKind = EntityKind::PbrMetallicRoughness;

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
            "baseColorFactor" => {
                if let Some(factor) = reader::read_f64_fixed::<4>(src, cx)? {
                    self.base_color_factor = factor;
                }
            }
            "baseColorTexture" => self.base_color_texture = Some(reader::read_object(src, cx)?),
            "metallicFactor" => self.metallic_factor = reader::read_f64(src, cx, 1.0)?,
            "roughnessFactor" => self.roughness_factor = reader::read_f64(src, cx, 1.0)?,
            "metallicRoughnessTexture" => {
                self.metallic_roughness_texture = Some(reader::read_object(src, cx)?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Alpha rendering mode; a string enum on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlphaMode(pub i32);

impl AlphaMode {
    pub const OPAQUE: Self = Self(0);
    pub const MASK: Self = Self(1);
    pub const BLEND: Self = Self(2);
}

impl NamedEnum for AlphaMode {
    const TYPE_NAME: &'static str = "alphaMode";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "OPAQUE" => Some(Self::OPAQUE),
            "MASK" => Some(Self::MASK),
            "BLEND" => Some(Self::BLEND),
            _ => None,
        }
    }

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

/// Surface appearance of a primitive.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: [f64; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f64,
    pub double_sided: bool,
    pub common: EntityCommon,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::OPAQUE,
            alpha_cutoff: 0.5,
            double_sided: false,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for Material {
    const TYPE_NAME: &'static str = "material";
    const KIND: EntityKind = EntityKind::Material;

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
            "pbrMetallicRoughness" => {
                self.pbr_metallic_roughness = Some(reader::read_object(src, cx)?)
            }
            "normalTexture" => self.normal_texture = Some(reader::read_object(src, cx)?),
            "occlusionTexture" => self.occlusion_texture = Some(reader::read_object(src, cx)?),
            "emissiveTexture" => self.emissive_texture = Some(reader::read_object(src, cx)?),
            "emissiveFactor" => {
                if let Some(factor) = reader::read_f64_fixed::<3>(src, cx)? {
                    self.emissive_factor = factor;
                }
            }
            "alphaMode" => self.alpha_mode = reader::read_enum(src, cx, AlphaMode::OPAQUE)?,
            "alphaCutoff" => self.alpha_cutoff = reader::read_f64(src, cx, 0.5)?,
            "doubleSided" => self.double_sided = reader::read_bool(src, cx, false)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
