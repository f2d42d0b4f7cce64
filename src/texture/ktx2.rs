//! KTX2 container parsing and decoding.
//!
//! The container is parsed entirely here: header, level index, and the
//! per-level supercompression. Uncompressed and zlib-supercompressed
//! payloads in linear 8-bit formats decode natively; Basis Universal
//! payloads are routed to the registered transcoder.

use std::io::Read;

use crate::model::{DecodedImage, MipPosition};
use crate::texture::transcode::{Ktx2TranscodeTargets, Ktx2Transcoder, TranscodeTarget};
use crate::texture::ImageError;

/// The 12-byte KTX2 file identifier.
pub const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const HEADER_SIZE: usize = 80;
const LEVEL_INDEX_ENTRY_SIZE: usize = 24;

// Supercompression schemes.
pub const SUPERCOMPRESSION_NONE: u32 = 0;
pub const SUPERCOMPRESSION_BASIS_LZ: u32 = 1;
pub const SUPERCOMPRESSION_ZSTD: u32 = 2;
pub const SUPERCOMPRESSION_ZLIB: u32 = 3;

// Vulkan formats decodable without a transcoder.
const VK_FORMAT_R8_UNORM: u32 = 9;
const VK_FORMAT_R8_SRGB: u32 = 15;
const VK_FORMAT_R8G8_UNORM: u32 = 16;
const VK_FORMAT_R8G8_SRGB: u32 = 22;
const VK_FORMAT_R8G8B8_UNORM: u32 = 23;
const VK_FORMAT_R8G8B8_SRGB: u32 = 29;
const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;
const VK_FORMAT_R8G8B8A8_SRGB: u32 = 43;

/// Fixed-size header fields.
#[derive(Debug, Clone, Copy)]
pub struct Ktx2Header {
    pub vk_format: u32,
    pub type_size: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixel_depth: u32,
    pub layer_count: u32,
    pub face_count: u32,
    /// 0 means "single stored level, generate the rest".
    pub level_count: u32,
    pub supercompression: u32,
}

/// One entry of the level index; index 0 is the base level.
#[derive(Debug, Clone, Copy)]
pub struct LevelIndexEntry {
    pub byte_offset: u64,
    pub byte_length: u64,
    pub uncompressed_byte_length: u64,
}

/// A parsed container with borrowed level payloads.
#[derive(Debug)]
pub struct Ktx2Container<'a> {
    pub header: Ktx2Header,
    pub level_index: Vec<LevelIndexEntry>,
    /// Raw (possibly supercompressed) level payloads, base level first.
    pub levels: Vec<&'a [u8]>,
    /// Supercompression global data (codebooks for BasisLZ).
    pub global_data: &'a [u8],
}

impl Ktx2Container<'_> {
    /// Number of levels physically stored in the container.
    #[inline]
    pub fn stored_level_count(&self) -> usize {
        self.levels.len()
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

/// Parse the container header, level index and payload slices.
pub fn parse_container(data: &[u8]) -> Result<Ktx2Container<'_>, ImageError> {
    if data.len() < HEADER_SIZE {
        return Err(ImageError::Truncated(data.len()));
    }
    if data[0..12] != KTX2_IDENTIFIER {
        return Err(ImageError::Decode {
            format: "KTX2",
            reason: "bad file identifier".to_string(),
        });
    }
    let header = Ktx2Header {
        vk_format: read_u32(data, 12),
        type_size: read_u32(data, 16),
        pixel_width: read_u32(data, 20),
        pixel_height: read_u32(data, 24),
        pixel_depth: read_u32(data, 28),
        layer_count: read_u32(data, 32),
        face_count: read_u32(data, 36),
        level_count: read_u32(data, 40),
        supercompression: read_u32(data, 44),
    };
    let sgd_offset = read_u64(data, 64) as usize;
    let sgd_length = read_u64(data, 72) as usize;

    let stored_levels = header.level_count.max(1) as usize;
    let index_end = HEADER_SIZE + stored_levels * LEVEL_INDEX_ENTRY_SIZE;
    if data.len() < index_end {
        return Err(ImageError::Truncated(data.len()));
    }

    let mut level_index = Vec::with_capacity(stored_levels);
    let mut levels = Vec::with_capacity(stored_levels);
    for i in 0..stored_levels {
        let base = HEADER_SIZE + i * LEVEL_INDEX_ENTRY_SIZE;
        let entry = LevelIndexEntry {
            byte_offset: read_u64(data, base),
            byte_length: read_u64(data, base + 8),
            uncompressed_byte_length: read_u64(data, base + 16),
        };
        let start = entry.byte_offset as usize;
        let end = start.checked_add(entry.byte_length as usize);
        let Some(end) = end.filter(|&end| end <= data.len()) else {
            return Err(ImageError::Truncated(start));
        };
        levels.push(&data[start..end]);
        level_index.push(entry);
    }

    let global_data = if sgd_length > 0 {
        let end = sgd_offset.checked_add(sgd_length);
        let Some(end) = end.filter(|&end| end <= data.len()) else {
            return Err(ImageError::Truncated(sgd_offset));
        };
        &data[sgd_offset..end]
    } else {
        &[]
    };

    Ok(Ktx2Container {
        header,
        level_index,
        levels,
        global_data,
    })
}

fn channels_for(vk_format: u32) -> Option<i32> {
    match vk_format {
        VK_FORMAT_R8_UNORM | VK_FORMAT_R8_SRGB => Some(1),
        VK_FORMAT_R8G8_UNORM | VK_FORMAT_R8G8_SRGB => Some(2),
        VK_FORMAT_R8G8B8_UNORM | VK_FORMAT_R8G8B8_SRGB => Some(3),
        VK_FORMAT_R8G8B8A8_UNORM | VK_FORMAT_R8G8B8A8_SRGB => Some(4),
        _ => None,
    }
}

fn level_dimensions(header: &Ktx2Header, level: usize) -> (usize, usize) {
    let w = (header.pixel_width >> level).max(1) as usize;
    let h = (header.pixel_height >> level).max(1) as usize;
    (w, h)
}

/// Decode one level payload according to the supercompression scheme.
fn inflate_level(
    payload: &[u8],
    entry: &LevelIndexEntry,
    scheme: u32,
) -> Result<Vec<u8>, ImageError> {
    match scheme {
        SUPERCOMPRESSION_NONE => Ok(payload.to_vec()),
        SUPERCOMPRESSION_ZLIB => {
            let mut out = Vec::with_capacity(entry.uncompressed_byte_length as usize);
            flate2::read::ZlibDecoder::new(payload)
                .read_to_end(&mut out)
                .map_err(|e| ImageError::Decode {
                    format: "KTX2",
                    reason: format!("zlib inflate failed: {e}"),
                })?;
            Ok(out)
        }
        SUPERCOMPRESSION_ZSTD => Err(ImageError::Unsupported(
            "zstd supercompression".to_string(),
        )),
        other => Err(ImageError::Unsupported(format!(
            "supercompression scheme {other}"
        ))),
    }
}

/// Assemble decoded level buffers into a [`DecodedImage`].
///
/// When `generate_hint` is set the container stores only a base image and
/// expects the consumer to build the chain: the mip table stays empty.
fn assemble(
    width: i32,
    height: i32,
    channels: i32,
    levels: Vec<Vec<u8>>,
    generate_hint: bool,
    compressed_format: Option<TranscodeTarget>,
) -> DecodedImage {
    let mut pixel_data = Vec::with_capacity(levels.iter().map(Vec::len).sum());
    let mut mip_positions = Vec::new();
    for level in &levels {
        mip_positions.push(MipPosition {
            byte_offset: pixel_data.len(),
            byte_size: level.len(),
        });
        pixel_data.extend_from_slice(level);
    }
    if generate_hint {
        mip_positions.clear();
    }
    DecodedImage {
        width,
        height,
        channels,
        bytes_per_channel: 1,
        pixel_data,
        mip_positions,
        compressed_format,
    }
}

/// Decode a KTX2 container, preserving its mip layout.
pub fn decode_ktx2(
    data: &[u8],
    targets: &Ktx2TranscodeTargets,
    transcoder: Option<&dyn Ktx2Transcoder>,
) -> Result<DecodedImage, ImageError> {
    let container = parse_container(data)?;
    let header = container.header;

    if header.pixel_depth > 1 {
        return Err(ImageError::Unsupported("3D textures".to_string()));
    }
    if header.face_count > 1 {
        return Err(ImageError::Unsupported("cube maps".to_string()));
    }
    if header.layer_count > 1 {
        return Err(ImageError::Unsupported("array textures".to_string()));
    }

    let width = header.pixel_width as i32;
    let height = header.pixel_height as i32;
    let generate_hint = header.level_count == 0;

    // vkFormat 0 marks a Basis Universal payload described by the DFD.
    if header.vk_format == 0 || header.supercompression == SUPERCOMPRESSION_BASIS_LZ {
        let transcoder = transcoder.ok_or_else(|| {
            ImageError::Unsupported("basis universal payload requires a transcoder".to_string())
        })?;
        let transcoded = transcoder.transcode(&container, targets)?;
        let compressed_format =
            (transcoded.format != TranscodeTarget::Rgba8).then_some(transcoded.format);
        return Ok(assemble(
            width,
            height,
            transcoded.channels,
            transcoded.levels,
            generate_hint,
            compressed_format,
        ));
    }

    let channels = channels_for(header.vk_format).ok_or_else(|| {
        ImageError::Unsupported(format!("vkFormat {}", header.vk_format))
    })?;
    if header.type_size > 1 {
        return Err(ImageError::Unsupported(format!(
            "typeSize {} for linear formats",
            header.type_size
        )));
    }

    let mut levels = Vec::with_capacity(container.levels.len());
    for (i, payload) in container.levels.iter().enumerate() {
        let decoded = inflate_level(payload, &container.level_index[i], header.supercompression)?;
        let (w, h) = level_dimensions(&header, i);
        let expected = w * h * channels as usize;
        if decoded.len() != expected {
            return Err(ImageError::Decode {
                format: "KTX2",
                reason: format!(
                    "level {i} holds {} bytes, expected {expected}",
                    decoded.len()
                ),
            });
        }
        levels.push(decoded);
    }

    Ok(assemble(width, height, channels, levels, generate_hint, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal linear-format container with the given level count
    /// semantics. Payloads are generated per stored level.
    fn build_ktx2(width: u32, height: u32, channels: u32, level_count: u32) -> Vec<u8> {
        let vk_format = match channels {
            1 => VK_FORMAT_R8_UNORM,
            2 => VK_FORMAT_R8G8_UNORM,
            3 => VK_FORMAT_R8G8B8_UNORM,
            _ => VK_FORMAT_R8G8B8A8_UNORM,
        };
        let stored = level_count.max(1) as usize;
        let mut out = Vec::new();
        out.extend_from_slice(&KTX2_IDENTIFIER);
        out.extend_from_slice(&vk_format.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes()); // typeSize
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // pixelDepth
        out.extend_from_slice(&0u32.to_le_bytes()); // layerCount
        out.extend_from_slice(&1u32.to_le_bytes()); // faceCount
        out.extend_from_slice(&level_count.to_le_bytes());
        out.extend_from_slice(&SUPERCOMPRESSION_NONE.to_le_bytes());
        out.extend_from_slice(&[0u8; 16]); // dfd + kvd offsets/lengths
        out.extend_from_slice(&[0u8; 16]); // sgd offset/length

        let mut offset = HEADER_SIZE + stored * LEVEL_INDEX_ENTRY_SIZE;
        let mut payloads = Vec::new();
        for level in 0..stored {
            let w = (width >> level).max(1) as usize;
            let h = (height >> level).max(1) as usize;
            let size = w * h * channels as usize;
            out.extend_from_slice(&(offset as u64).to_le_bytes());
            out.extend_from_slice(&(size as u64).to_le_bytes());
            out.extend_from_slice(&(size as u64).to_le_bytes());
            payloads.push(vec![level as u8; size]);
            offset += size;
        }
        for payload in payloads {
            out.extend_from_slice(&payload);
        }
        out
    }

    #[test]
    fn test_single_level() {
        let data = build_ktx2(4, 4, 4, 1);
        let image = decode_ktx2(&data, &Ktx2TranscodeTargets::default(), None).unwrap();
        assert_eq!(image.mip_positions.len(), 1);
        assert_eq!(image.mip_positions[0].byte_offset, 0);
        assert_eq!(image.mip_positions[0].byte_size, 4 * 4 * 4);
        assert_eq!(image.pixel_data.len(), 4 * 4 * 4);
    }

    #[test]
    fn test_generate_hint_empties_mip_table() {
        let data = build_ktx2(4, 4, 4, 0);
        let image = decode_ktx2(&data, &Ktx2TranscodeTargets::default(), None).unwrap();
        assert!(image.mip_positions.is_empty());
        assert_eq!(image.pixel_data.len(), 4 * 4 * 4);
    }

    #[test]
    fn test_full_chain_is_strictly_decreasing() {
        let data = build_ktx2(16, 16, 3, 5);
        let image = decode_ktx2(&data, &Ktx2TranscodeTargets::default(), None).unwrap();
        assert_eq!(image.mip_positions.len(), 5);
        assert_eq!(
            image.mip_positions[0].byte_size,
            (image.width * image.height * image.channels) as usize
        );
        for pair in image.mip_positions.windows(2) {
            assert!(pair[0].byte_size > pair[1].byte_size);
        }
        let total: usize = image.mip_positions.iter().map(|m| m.byte_size).sum();
        assert_eq!(total, image.pixel_data.len());
    }

    #[test]
    fn test_basis_payload_without_transcoder_errors() {
        let mut data = build_ktx2(4, 4, 4, 1);
        data[12..16].copy_from_slice(&0u32.to_le_bytes()); // vkFormat = UNDEFINED
        let result = decode_ktx2(&data, &Ktx2TranscodeTargets::default(), None);
        assert!(matches!(result, Err(ImageError::Unsupported(_))));
    }

    #[test]
    fn test_truncated_container() {
        let data = build_ktx2(4, 4, 4, 1);
        let result = parse_container(&data[..60]);
        assert!(matches!(result, Err(ImageError::Truncated(_))));
    }
}
