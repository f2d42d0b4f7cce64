//! Transcode targets and the seam to an external block-texture transcoder.

use crate::texture::ktx2::Ktx2Container;
use crate::texture::ImageError;

/// Pixel format a block-compressed payload is transcoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscodeTarget {
    /// Uncompressed 8-bit RGBA.
    #[default]
    Rgba8,
    Bc1,
    Bc3,
    Bc7,
    Etc2Rgba,
    AstcRgba4x4,
}

/// Caller-selected targets per source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ktx2TranscodeTargets {
    pub etc1s: TranscodeTarget,
    pub uastc: TranscodeTarget,
}

/// Output of a transcoder: one byte buffer per stored mip level, base level
/// first.
#[derive(Debug, Clone)]
pub struct TranscodedTexture {
    pub format: TranscodeTarget,
    pub channels: i32,
    pub levels: Vec<Vec<u8>>,
}

/// External decoder for Basis Universal payloads inside KTX2 containers.
///
/// The container parsing and mip layout stay in this crate; only the
/// block-level transcoding is delegated.
pub trait Ktx2Transcoder: Send + Sync {
    fn transcode(
        &self,
        container: &Ktx2Container<'_>,
        targets: &Ktx2TranscodeTargets,
    ) -> Result<TranscodedTexture, ImageError>;
}
