//! Decompression pass for EXT_meshopt_compression.

use smallvec::SmallVec;

use crate::codec::{DecodedAttribute, FilteredDecodeLayout, FilteredMeshDecoder};
use crate::extensions::{ExtensionType, MeshoptCompression};
use crate::model::Model;
use crate::passes::{append_decoded, buffer_view_bytes, ViewError};

/// Per-component minimum and maximum of a decoded stream, as doubles.
fn compute_min_max(attr: &DecodedAttribute) -> (SmallVec<[f64; 16]>, SmallVec<[f64; 16]>) {
    let components = attr.element_type.component_count();
    let count = usize::try_from(attr.count).unwrap_or(0);
    let mut min = SmallVec::new();
    let mut max = SmallVec::new();
    if components == 0 || count == 0 {
        return (min, max);
    }
    for component in 0..components {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for element in 0..count {
            if let Some(v) = attr.component_as_f64(element, component) {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        min.push(lo);
        max.push(hi);
    }
    (min, max)
}

/// Analogue of the Draco pass for the filter-transformed codec.
///
/// The extension supplies the stream layout the payload itself does not
/// carry; after rewriting, accessors of attributes the extension lists as
/// quantized get their min/max recomputed from the decoded data.
pub fn decode_meshopt(
    model: &mut Model,
    decoder: Option<&dyn FilteredMeshDecoder>,
    warnings: &mut Vec<String>,
    errors: &mut Vec<String>,
) {
    for mesh_index in 0..model.meshes.len() {
        for prim_index in 0..model.meshes[mesh_index].primitives.len() {
            let Some(ext) = model.meshes[mesh_index].primitives[prim_index]
                .common
                .extension::<MeshoptCompression>()
                .cloned()
            else {
                continue;
            };
            let label = format!("/meshes/{mesh_index}/primitives/{prim_index}");

            let Some(decoder) = decoder else {
                warnings.push(format!(
                    "{label}: no decoder registered for {}",
                    MeshoptCompression::NAME
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

            let layout = FilteredDecodeLayout {
                count: ext.count,
                byte_stride: ext.byte_stride,
                mode: ext.mode,
                filter: ext.filter,
            };
            let decoded = match decoder.decode(&payload, &layout) {
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

            // Recompute bounds for the quantized attributes.
            for name in &ext.quantized {
                let accessor_index = updates
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|&(_, index)| index);
                let stream = ext
                    .attributes
                    .get(name)
                    .and_then(|local_id| decoded.attributes.get(local_id));
                if let (Some(index), Some(attr)) = (accessor_index, stream) {
                    let (min, max) = compute_min_max(attr);
                    let accessor = &mut model.accessors[index as usize];
                    accessor.min = min;
                    accessor.max = max;
                } else {
                    warnings.push(format!(
                        "{label}: quantized attribute '{name}' has no decoded stream"
                    ));
                }
            }

            let primitive = &mut model.meshes[mesh_index].primitives[prim_index];
            for (name, accessor) in updates {
                primitive.attributes.insert(name, accessor);
            }
            if let Some(accessor) = new_indices {
                primitive.indices = accessor;
            }
            primitive.common.remove_extension(MeshoptCompression::NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, DecodedMesh};
    use crate::extensions::{ExtensionValue, MeshoptMode, TypedExtension};
    use crate::model::{AccessorType, Buffer, BufferView, Mesh, MeshPrimitive};

    struct StubDecoder;

    impl FilteredMeshDecoder for StubDecoder {
        fn decode(
            &self,
            _data: &[u8],
            layout: &FilteredDecodeLayout,
        ) -> Result<DecodedMesh, CodecError> {
            assert_eq!(layout.mode, MeshoptMode::ATTRIBUTES);
            let mut mesh = DecodedMesh::default();
            mesh.attributes.insert(
                0,
                DecodedAttribute::from_f32s(
                    AccessorType::VEC3,
                    &[-1.0, 0.0, 2.0, 5.0, -3.0, 0.5],
                ),
            );
            Ok(mesh)
        }
    }

    fn compressed_model() -> Model {
        let mut model = Model::default();
        model.buffers.push(Buffer {
            byte_length: 16,
            data: vec![0u8; 16],
            ..Default::default()
        });
        model.buffer_views.push(BufferView {
            buffer: 0,
            byte_length: 16,
            ..Default::default()
        });
        let mut primitive = MeshPrimitive::default();
        let mut ext = MeshoptCompression {
            buffer_view: 0,
            count: 2,
            byte_stride: 12,
            ..Default::default()
        };
        ext.attributes.insert("POSITION".to_string(), 0);
        ext.quantized.push("POSITION".to_string());
        primitive.common.extensions.insert(
            MeshoptCompression::NAME.to_string(),
            ExtensionValue::Typed(TypedExtension::MeshoptCompression(ext)),
        );
        model.meshes.push(Mesh {
            primitives: vec![primitive],
            ..Default::default()
        });
        model
    }

    #[test]
    fn test_rewrites_and_recomputes_bounds() {
        let mut model = compressed_model();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_meshopt(&mut model, Some(&StubDecoder), &mut warnings, &mut errors);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert!(errors.is_empty());

        let primitive = &model.meshes[0].primitives[0];
        assert!(!primitive.common.has_extension(MeshoptCompression::NAME));
        let accessor = &model.accessors[primitive.attributes["POSITION"] as usize];
        // Elements are (-1, 0, 2) and (5, -3, 0.5).
        assert_eq!(accessor.min.as_slice(), &[-1.0, -3.0, 0.5]);
        assert_eq!(accessor.max.as_slice(), &[5.0, 0.0, 2.0]);
    }

    #[test]
    fn test_missing_decoder_warns() {
        let mut model = compressed_model();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        decode_meshopt(&mut model, None, &mut warnings, &mut errors);
        assert_eq!(warnings.len(), 1);
        assert!(model.meshes[0].primitives[0]
            .common
            .has_extension(MeshoptCompression::NAME));
    }

    #[test]
    fn test_compute_min_max_empty_stream() {
        let attr = DecodedAttribute::from_f32s(AccessorType::VEC3, &[]);
        let (min, max) = compute_min_max(&attr);
        assert!(min.is_empty());
        assert!(max.is_empty());
    }
}
