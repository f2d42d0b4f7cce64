//! Integration tests for standalone image decoding.

use gltf_reader::{GltfReader, Ktx2TranscodeTargets};

/// The 12-byte KTX2 file identifier.
const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;

/// Build a linear RGBA8 KTX2 container. `level_count == 0` marks a
/// generate-the-chain hint with a single stored level.
fn build_ktx2(width: u32, height: u32, level_count: u32) -> Vec<u8> {
    const CHANNELS: usize = 4;
    let stored = level_count.max(1) as usize;
    let mut out = Vec::new();
    out.extend_from_slice(&KTX2_IDENTIFIER);
    out.extend_from_slice(&VK_FORMAT_R8G8B8A8_UNORM.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // typeSize
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // pixelDepth
    out.extend_from_slice(&0u32.to_le_bytes()); // layerCount
    out.extend_from_slice(&1u32.to_le_bytes()); // faceCount
    out.extend_from_slice(&level_count.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // supercompression: none
    out.extend_from_slice(&[0u8; 16]); // dfd/kvd offsets and lengths
    out.extend_from_slice(&[0u8; 16]); // sgd offset and length

    let mut offset = 80 + stored * 24;
    let mut payloads = Vec::new();
    for level in 0..stored {
        let w = (width >> level).max(1) as usize;
        let h = (height >> level).max(1) as usize;
        let size = w * h * CHANNELS;
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
fn test_ktx2_single_level() {
    let data = build_ktx2(8, 8, 1);
    let result = GltfReader::read_image(&data, &Ktx2TranscodeTargets::default());
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let image = result.image.unwrap();

    assert_eq!(image.mip_positions.len(), 1);
    assert_eq!(image.mip_positions[0].byte_offset, 0);
    assert!(image.mip_positions[0].byte_size > 0);
    assert_eq!(
        image.mip_positions[0].byte_size,
        (image.width * image.height * image.channels) as usize
    );
    assert_eq!(image.mip_positions[0].byte_size, image.pixel_data.len());
}

#[test]
fn test_ktx2_generate_hint_has_no_mip_positions() {
    let data = build_ktx2(8, 8, 0);
    let result = GltfReader::read_image(&data, &Ktx2TranscodeTargets::default());
    let image = result.image.unwrap();

    assert_eq!(image.mip_positions.len(), 0);
    assert!(!image.pixel_data.is_empty());
}

#[test]
fn test_ktx2_full_mip_chain() {
    // 256×256 with a full chain down to 1×1: 9 levels.
    let data = build_ktx2(256, 256, 9);
    let result = GltfReader::read_image(&data, &Ktx2TranscodeTargets::default());
    let image = result.image.unwrap();

    assert_eq!(image.mip_positions.len(), 9);
    assert!(image.mip_positions[0].byte_size > 0);
    assert_eq!(
        image.mip_positions[0].byte_size,
        (image.width * image.height * image.channels) as usize
    );
    assert!(image.mip_positions[0].byte_size < image.pixel_data.len());

    let mut smaller_than = image.mip_positions[0].byte_size;
    for mip in &image.mip_positions[1..] {
        assert!(mip.byte_size < smaller_than);
        smaller_than = mip.byte_size;
    }
    let total: usize = image.mip_positions.iter().map(|m| m.byte_size).sum();
    assert_eq!(total, image.pixel_data.len());
}

#[test]
fn test_read_image_png() {
    let img = image::RgbaImage::from_pixel(5, 7, image::Rgba([10, 20, 30, 255]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();

    let result = GltfReader::read_image(&cursor.into_inner(), &Ktx2TranscodeTargets::default());
    assert!(result.errors.is_empty());
    let image = result.image.unwrap();
    assert_eq!(image.width, 5);
    assert_eq!(image.height, 7);
    assert_eq!(image.channels, 4);
    assert_eq!(image.bytes_per_channel, 1);
    assert!(image.mip_positions.is_empty());
    assert_eq!(image.pixel_data[0..4], [10, 20, 30, 255]);
}

#[test]
fn test_read_image_unrecognized_payload() {
    let result = GltfReader::read_image(&[1, 2, 3, 4], &Ktx2TranscodeTargets::default());
    assert!(result.image.is_none());
    assert!(!result.errors.is_empty());
}
