//! Error types for the glTF reader.

use thiserror::Error;

/// Fatal parse errors.
///
/// These abort the top-level parse: the reader result carries no model and
/// the rendered message is appended to its error list. Everything that can
/// be reported without giving up on the document (decode failures, lossy
/// coercions, unexpected shapes) is accumulated as strings in the result
/// lists instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The JSON text is lexically or structurally invalid
    #[error("malformed JSON at byte {offset}: {reason}")]
    MalformedJson { offset: usize, reason: String },

    /// The binary container does not start with the `glTF` magic
    #[error("invalid binary glTF: bad magic bytes")]
    InvalidMagic,

    /// The binary container declares a version other than 2
    #[error("unsupported binary glTF version: {0}")]
    UnsupportedVersion(u32),

    /// The header length field disagrees with the input span
    #[error("binary glTF length mismatch: header declares {declared} bytes, input has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// A chunk declares a length that runs past the end of the envelope
    #[error("binary glTF chunk at byte {offset} extends past the end of the input")]
    TruncatedChunk { offset: usize },

    /// The envelope carries no chunk of the required kind
    #[error("binary glTF is missing its {0} chunk")]
    MissingRequiredChunk(&'static str),
}

impl Error {
    /// Create a malformed-JSON error at the given byte offset.
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedJson {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result type alias for fatal reader operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::malformed(17, "unexpected character");
        assert!(e.to_string().contains("17"));
        assert!(e.to_string().contains("unexpected character"));

        let e = Error::LengthMismatch {
            declared: 100,
            actual: 64,
        };
        assert!(e.to_string().contains("100"));
        assert!(e.to_string().contains("64"));
    }
}
