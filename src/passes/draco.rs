//! Decompression pass for KHR_draco_mesh_compression.

use crate::codec::MeshDecoder;
use crate::extensions::{DracoMeshCompression, ExtensionType};
use crate::model::Model;
use crate::passes::{append_decoded, buffer_view_bytes, ViewError};

/// Replace compressed primitives with uncompressed accessors.
///
/// For every primitive carrying the extension: the compressed buffer view
/// is handed to the codec, each named attribute gets a fresh buffer, buffer
/// view and accessor, and the primitive's attribute and index references
/// are rewritten. On success the extension is removed; on codec failure the
/// primitive is left untouched with a warning.
pub fn decode_draco(
    model: &mut Model,
    decoder: Option<&dyn MeshDecoder>,
    warnings: &mut Vec<String>,
    errors: &mut Vec<String>,
) {
    for mesh_index in 0..model.meshes.len() {
        for prim_index in 0..model.meshes[mesh_index].primitives.len() {
            let Some(ext) = model.meshes[mesh_index].primitives[prim_index]
                .common
                .extension::<DracoMeshCompression>()
                .cloned()
            else {
                continue;
            };
            let label = format!("/meshes/{mesh_index}/primitives/{prim_index}");

            let Some(decoder) = decoder else {
                warnings.push(format!(
                    "{label}: no decoder registered for {}",
                    DracoMeshCompression::NAME
                ));
                continue;
            };

            let payload = match buffer_view_bytes(model, ext.buffer_view) {
                Ok(bytes) => bytes.to_vec(),
                Err(e @ ViewError::Unresolved(_)) => {
                    errors.push(format!("{label}: {}", e.into_message()));
                    continue;
                }
                Err(e) => {
                    warnings.push(format!("{label}: {}", e.into_message()));
                    continue;
                }
            };

            let decoded = match decoder.decode(&payload) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warnings.push(format!("{label}: mesh decompression failed: {e}"));
                    continue;
                }
            };

            let mut updates = Vec::with_capacity(ext.attributes.len());
            for (name, local_id) in &ext.attributes {
                match decoded.attributes.get(local_id) {
                    Some(attr) => updates.push((name.clone(), append_decoded(model, attr))),
                    None => warnings.push(format!(
                        "{label}: compressed payload has no stream {local_id} for '{name}'"
                    )),
                }
            }
            let new_indices = decoded
                .indices
                .as_ref()
                .map(|attr| append_decoded(model, attr));

            let primitive = &mut model.meshes[mesh_index].primitives[prim_index];
            for (name, accessor) in updates {
                primitive.attributes.insert(name, accessor);
            }
            if let Some(accessor) = new_indices {
                primitive.indices = accessor;
            }
            primitive.common.remove_extension(DracoMeshCompression::NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, DecodedAttribute, DecodedMesh};
    use crate::extensions::{ExtensionValue, TypedExtension};
    use crate::model::{AccessorType, Buffer, BufferView, ComponentType, Mesh, MeshPrimitive};

    struct StubDecoder;

    impl MeshDecoder for StubDecoder {
        fn decode(&self, _data: &[u8]) -> Result<DecodedMesh, CodecError> {
            let mut mesh = DecodedMesh::default();
            mesh.attributes.insert(
                0,
                DecodedAttribute::from_f32s(AccessorType::VEC3, &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]),
            );
            mesh.indices = Some(DecodedAttribute::from_u32_indices(&[0, 1]));
            Ok(mesh)
        }
    }

    struct FailingDecoder;

    impl MeshDecoder for FailingDecoder {
        fn decode(&self, _data: &[u8]) -> Result<DecodedMesh, CodecError> {
            Err(CodecError::Corrupt("truncated stream".to_string()))
        }
    }

    fn compressed_model() -> Model {
        let mut model = Model::default();
        model.buffers.push(Buffer {
            byte_length: 8,
            data: vec![0u8; 8],
            ..Default::default()
        });
        model.buffer_views.push(BufferView {
            buffer: 0,
            byte_length: 8,
            ..Default::default()
        });
        let mut primitive = MeshPrimitive::default();
        let mut ext = DracoMeshCompression {
            buffer_view: 0,
            ..Default::default()
        };
        ext.attributes.insert("POSITION".to_string(), 0);
        primitive.common.extensions.insert(
            DracoMeshCompression::NAME.to_string(),
            ExtensionValue::Typed(TypedExtension::DracoMeshCompression(ext)),
        );
        model.meshes.push(Mesh {
            primitives: vec![primitive],
            ..Default::default()
        });
        model
    }

    #[test]
    fn test_rewrites_primitive_and_removes_extension() {
        let mut model = compressed_model();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_draco(&mut model, Some(&StubDecoder), &mut warnings, &mut errors);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert!(errors.is_empty());

        let primitive = &model.meshes[0].primitives[0];
        assert!(!primitive
            .common
            .has_extension(DracoMeshCompression::NAME));
        let position = primitive.attributes["POSITION"];
        let accessor = &model.accessors[position as usize];
        assert_eq!(accessor.count, 2);
        assert_eq!(accessor.component_type, ComponentType::FLOAT);
        assert_eq!(accessor.element_type, AccessorType::VEC3);
        assert!(primitive.indices >= 0);
        let index_accessor = &model.accessors[primitive.indices as usize];
        assert_eq!(index_accessor.component_type, ComponentType::UNSIGNED_INT);

        // The appended chain is internally consistent.
        let view = &model.buffer_views[accessor.buffer_view as usize];
        let buffer = &model.buffers[view.buffer as usize];
        assert_eq!(view.byte_length as usize, buffer.data.len());
    }

    #[test]
    fn test_codec_failure_leaves_primitive_untouched() {
        let mut model = compressed_model();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_draco(&mut model, Some(&FailingDecoder), &mut warnings, &mut errors);
        assert_eq!(warnings.len(), 1);
        let primitive = &model.meshes[0].primitives[0];
        assert!(primitive.common.has_extension(DracoMeshCompression::NAME));
        assert!(primitive.attributes.is_empty());
    }

    #[test]
    fn test_out_of_range_buffer_view_warns_and_skips() {
        let mut model = compressed_model();
        // Point the extension at a view that does not exist.
        let primitive = &mut model.meshes[0].primitives[0];
        let mut ext = DracoMeshCompression::default();
        ext.buffer_view = 7;
        ext.attributes.insert("POSITION".to_string(), 0);
        primitive.common.extensions.insert(
            DracoMeshCompression::NAME.to_string(),
            ExtensionValue::Typed(TypedExtension::DracoMeshCompression(ext)),
        );
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_draco(&mut model, Some(&StubDecoder), &mut warnings, &mut errors);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("out of range"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unresolved_external_buffer_is_an_error() {
        let mut model = compressed_model();
        model.buffers[0].data.clear();
        model.buffers[0].uri = Some("payload.bin".to_string());
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_draco(&mut model, Some(&StubDecoder), &mut warnings, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unresolved external"));
    }
}
