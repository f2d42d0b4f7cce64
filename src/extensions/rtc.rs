//! CESIUM_RTC: relative-to-center coordinates for far-from-origin models.

use crate::extensions::{EntityKind, ExtensionType, ExtensionValue, TypedExtension};
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// World-space center the model's coordinates are relative to.
#[derive(Debug, Clone, Default)]
pub struct CesiumRtc {
    pub center: [f64; 3],
    pub common: EntityCommon,
}

impl GltfObject for CesiumRtc {
    const TYPE_NAME: &'static str = "CESIUM_RTC";
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
            "center" => {
                if let Some(center) = reader::read_f64_fixed::<3>(src, cx)? {
                    self.center = center;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl ExtensionType for CesiumRtc {
    const NAME: &'static str = "CESIUM_RTC";

    fn from_extension(value: &ExtensionValue) -> Option<&Self> {
        match value {
            ExtensionValue::Typed(TypedExtension::CesiumRtc(ext)) => Some(ext),
            _ => None,
        }
    }
}

pub(super) fn parse(
    src: &mut EventSource<'_>,
    cx: &mut ReadContext<'_>,
) -> Result<TypedExtension> {
    Ok(TypedExtension::CesiumRtc(reader::read_object(src, cx)?))
}
