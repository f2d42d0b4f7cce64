//! Embedded-image decoding pass.

use crate::model::{DecodedImage, Model};
use crate::passes::buffer_view_bytes;
use crate::texture::{self, Ktx2TranscodeTargets, Ktx2Transcoder};

/// Decode every image whose payload is available in-document.
///
/// Payloads come from a previously resolved data URI or from a buffer view.
/// Images that still point at an external URI are skipped; resolving them
/// is the caller's concern, and an image with neither a source nor a
/// declared MIME type is skipped the same way. Failures record an error
/// and leave the image undecoded; the document survives.
pub fn decode_images(
    model: &mut Model,
    targets: &Ktx2TranscodeTargets,
    transcoder: Option<&dyn Ktx2Transcoder>,
    errors: &mut Vec<String>,
) {
    for i in 0..model.images.len() {
        let outcome: Option<Result<DecodedImage, String>> = {
            let image = &model.images[i];
            let mime = image.mime_type.as_deref();
            let bytes: Option<&[u8]> = if !image.data.is_empty() {
                Some(&image.data)
            } else if image.buffer_view >= 0 {
                match buffer_view_bytes(model, image.buffer_view) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        errors.push(format!("/images/{i}: {}", e.into_message()));
                        None
                    }
                }
            } else if image.uri.is_some() {
                // External image; left for the caller to resolve.
                None
            } else if image.mime_type.is_some() {
                // No payload, but a declared type to report against.
                Some(&[])
            } else {
                None
            };
            bytes.map(|b| {
                texture::decode_image(b, mime, targets, transcoder).map_err(|e| e.to_string())
            })
        };
        match outcome {
            Some(Ok(decoded)) => model.images[i].decoded = Some(decoded),
            Some(Err(e)) => errors.push(format!("/images/{i}: {e}")),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Buffer, BufferView, Image};

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decodes_from_buffer_view() {
        let png = png_bytes();
        let mut model = Model::default();
        model.buffers.push(Buffer {
            byte_length: png.len() as i64,
            data: png.clone(),
            ..Default::default()
        });
        model.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: 0,
            byte_length: png.len() as i64,
            ..Default::default()
        });
        model.images.push(Image {
            buffer_view: 0,
            mime_type: Some("image/png".to_string()),
            ..Default::default()
        });
        let mut errors = Vec::new();
        decode_images(
            &mut model,
            &Ktx2TranscodeTargets::default(),
            None,
            &mut errors,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let decoded = model.images[0].decoded.as_ref().unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.channels, 4);
    }

    #[test]
    fn test_unknown_mime_records_error_without_aborting() {
        let mut model = Model::default();
        model.images.push(Image {
            mime_type: Some("image/webp".to_string()),
            ..Default::default()
        });
        let mut errors = Vec::new();
        decode_images(
            &mut model,
            &Ktx2TranscodeTargets::default(),
            None,
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("image/webp"));
        assert!(model.images[0].decoded.is_none());
    }

    #[test]
    fn test_external_images_are_skipped() {
        let mut model = Model::default();
        model.images.push(Image {
            uri: Some("textures/albedo.png".to_string()),
            ..Default::default()
        });
        let mut errors = Vec::new();
        decode_images(
            &mut model,
            &Ktx2TranscodeTargets::default(),
            None,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert!(model.images[0].decoded.is_none());
    }

    #[test]
    fn test_sourceless_untyped_images_are_skipped() {
        let mut model = Model::default();
        model.images.push(Image::default());
        let mut errors = Vec::new();
        decode_images(
            &mut model,
            &Ktx2TranscodeTargets::default(),
            None,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert!(model.images[0].decoded.is_none());
    }
}
