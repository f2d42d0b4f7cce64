//! Inline data-URI resolution for buffers and images.

use base64::Engine;

use crate::model::Model;

/// Decode the payload of a `data:[<mediatype>][;base64],<payload>` URI.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let Some((header, payload)) = uri.split_once(',') else {
        return Err("malformed data URI".to_string());
    };
    if !header.contains(";base64") {
        return Err("data URI is not base64-encoded".to_string());
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("base64 decode error: {e}"))
}

/// Replace every `data:` URI on buffers and images with its decoded bytes.
///
/// External URIs are left untouched; they are not an error here. Malformed
/// data URIs record an error and keep the field as-is.
pub fn resolve_data_uris(model: &mut Model, errors: &mut Vec<String>) {
    for (i, buffer) in model.buffers.iter_mut().enumerate() {
        if let Some(uri) = buffer.uri.as_deref() {
            if uri.starts_with("data:") {
                match decode_data_uri(uri) {
                    Ok(bytes) => {
                        buffer.data = bytes;
                        buffer.uri = None;
                    }
                    Err(e) => errors.push(format!("/buffers/{i}: {e}")),
                }
            }
        }
    }
    for (i, image) in model.images.iter_mut().enumerate() {
        if let Some(uri) = image.uri.as_deref() {
            if uri.starts_with("data:") {
                match decode_data_uri(uri) {
                    Ok(bytes) => {
                        image.data = bytes;
                        image.uri = None;
                    }
                    Err(e) => errors.push(format!("/images/{i}: {e}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Buffer;

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,SGVsbG8=").unwrap();
        assert_eq!(bytes, b"Hello");
    }

    #[test]
    fn test_rejects_non_base64() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:nocomma").is_err());
    }

    #[test]
    fn test_external_uris_are_left_alone() {
        let mut model = Model::default();
        model.buffers.push(Buffer {
            uri: Some("mesh.bin".to_string()),
            byte_length: 4,
            ..Default::default()
        });
        let mut errors = Vec::new();
        resolve_data_uris(&mut model, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(model.buffers[0].uri.as_deref(), Some("mesh.bin"));
        assert!(model.buffers[0].data.is_empty());
    }

    #[test]
    fn test_buffer_uri_is_replaced() {
        let mut model = Model::default();
        model.buffers.push(Buffer {
            uri: Some("data:application/octet-stream;base64,AAECAw==".to_string()),
            byte_length: 4,
            ..Default::default()
        });
        let mut errors = Vec::new();
        resolve_data_uris(&mut model, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(model.buffers[0].uri, None);
        assert_eq!(model.buffers[0].data, vec![0, 1, 2, 3]);
    }
}
