//! KHR_texture_basisu: textures sourced from KTX2 images.

use crate::extensions::{EntityKind, ExtensionType, ExtensionValue, TypedExtension};
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// Alternate image source for a texture carrying a KTX2 payload.
#[derive(Debug, Clone)]
pub struct TextureBasisu {
    pub source: i32,
    pub common: EntityCommon,
}

impl Default for TextureBasisu {
    fn default() -> Self {
        Self {
            source: -1,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for TextureBasisu {
    const TYPE_NAME: &'static str = "KHR_texture_basisu";
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
            "source" => self.source = reader::read_index(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ExtensionType for TextureBasisu {
    const NAME: &'static str = "KHR_texture_basisu";

    fn from_extension(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::Typed(TypedExtension::TextureBasisu(ext)) => Some(ext),
            _ => None,
        }
    }
}

pub(super) fn parse(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<TypedExtension> {
    Ok(TypedExtension::TextureBasisu(reader::read_object(src, cx)?))
}
