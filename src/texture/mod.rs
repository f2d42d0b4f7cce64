//! Image decoding.
//!
//! Routes a payload to a decoder by declared MIME type first, then by magic
//! bytes. Raster formats decode through the `image` crate into linear
//! 8-bit channels; KTX2 containers are handled in [`ktx2`] with their mip
//! layout preserved.

pub mod ktx2;
pub mod transcode;

pub use transcode::{Ktx2TranscodeTargets, Ktx2Transcoder, TranscodeTarget, TranscodedTexture};

use image::DynamicImage;
use thiserror::Error;

use crate::model::DecodedImage;

/// Image decode failure. The owning document is still returned; only the
/// affected image stays undecoded.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("unknown image MIME type '{0}'")]
    UnknownMimeType(String),

    #[error("unrecognized image payload (leading bytes {0:02x?})")]
    UnknownPayload(Vec<u8>),

    #[error("failed to decode {format} image: {reason}")]
    Decode {
        format: &'static str,
        reason: String,
    },

    #[error("truncated KTX2 container at byte {0}")]
    Truncated(usize),

    #[error("unsupported KTX2 feature: {0}")]
    Unsupported(String),
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

#[derive(Clone, Copy)]
enum ImageKind {
    Png,
    Jpeg,
    Ktx2,
}

fn kind_from_mime(mime: &str) -> Option<ImageKind> {
    match mime {
        "image/png" => Some(ImageKind::Png),
        "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
        "image/ktx2" => Some(ImageKind::Ktx2),
        _ => None,
    }
}

fn kind_from_magic(data: &[u8]) -> Option<ImageKind> {
    if data.starts_with(&PNG_MAGIC) {
        Some(ImageKind::Png)
    } else if data.starts_with(&JPEG_MAGIC) {
        Some(ImageKind::Jpeg)
    } else if data.starts_with(&ktx2::KTX2_IDENTIFIER) {
        Some(ImageKind::Ktx2)
    } else {
        None
    }
}

/// Decode an image payload into a uniform pixel buffer.
///
/// The declared MIME type is consulted first; unrecognized or missing MIME
/// types fall back to magic sniffing. The error names whichever of the two
/// was available.
pub fn decode_image(
    data: &[u8],
    declared_mime: Option<&str>,
    targets: &Ktx2TranscodeTargets,
    transcoder: Option<&dyn Ktx2Transcoder>,
) -> Result<DecodedImage, ImageError> {
    let kind = declared_mime
        .and_then(kind_from_mime)
        .or_else(|| kind_from_magic(data));
    let Some(kind) = kind else {
        return Err(match declared_mime {
            Some(mime) => ImageError::UnknownMimeType(mime.to_string()),
            None => ImageError::UnknownPayload(data.iter().copied().take(8).collect()),
        });
    };
    match kind {
        ImageKind::Png => decode_raster(data, image::ImageFormat::Png, "PNG"),
        ImageKind::Jpeg => decode_raster(data, image::ImageFormat::Jpeg, "JPEG"),
        ImageKind::Ktx2 => ktx2::decode_ktx2(data, targets, transcoder),
    }
}

/// Decode a raster format, preserving the channel count where the source
/// is already 8-bit.
fn decode_raster(
    data: &[u8],
    format: image::ImageFormat,
    name: &'static str,
) -> Result<DecodedImage, ImageError> {
    let img = image::load_from_memory_with_format(data, format).map_err(|e| ImageError::Decode {
        format: name,
        reason: e.to_string(),
    })?;
    let width = img.width() as i32;
    let height = img.height() as i32;
    let (channels, pixel_data) = match img {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other => (4, other.to_rgba8().into_raw()),
    };
    Ok(DecodedImage {
        width,
        height,
        channels,
        bytes_per_channel: 1,
        pixel_data,
        mip_positions: Vec::new(),
        compressed_format: None,
    })
}
