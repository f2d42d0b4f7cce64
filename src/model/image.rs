//! Images and their decoded pixel data.

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::model::EntityCommon;
use crate::texture::TranscodeTarget;
use crate::util::Result;

/// Position of one mip level inside a decoded pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipPosition {
    pub byte_offset: usize,
    pub byte_size: usize,
}

/// Decoded pixel data for an image.
///
/// Raster formats decode to an 8-bit-per-channel buffer with an empty mip
/// table. KTX2 containers preserve their mip layout: one entry per stored
/// level in decreasing size, or an empty table when the container asks the
/// consumer to generate the chain itself.
#[derive(Debug, Clone, Default)]
pub struct DecodedImage {
    pub width: i32,
    pub height: i32,
    pub channels: i32,
    pub bytes_per_channel: i32,
    pub pixel_data: Vec<u8>,
    pub mip_positions: Vec<MipPosition>,
    /// Set when the pixel data is in a block-compressed target format
    /// rather than linear 8-bit channels.
    pub compressed_format: Option<TranscodeTarget>,
}

/// An image entity: raster or block-compressed pixel data.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: i32,
    /// Raw encoded payload after data-URI resolution.
    pub data: Vec<u8>,
    /// Decoded pixels; unset until the image-decoding pass runs, and left
    /// unset when decoding fails.
    pub decoded: Option<DecodedImage>,
    pub common: EntityCommon,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            name: None,
            uri: None,
            mime_type: None,
            buffer_view: -1,
            data: Vec::new(),
            decoded: None,
            common: EntityCommon::default(),
        }
    }
}

impl GltfObject for Image {
    const TYPE_NAME: &'static str = "image";
    const KIND: EntityKind = EntityKind::Image;

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
            "mimeType" => self.mime_type = reader::read_string(src, cx)?,
            "bufferView" => self.buffer_view = reader::read_index(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
