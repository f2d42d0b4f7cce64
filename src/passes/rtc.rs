//! RTC recentering pass.

use glam::{DMat4, DVec3};

use crate::extensions::{CesiumRtc, ExtensionType};
use crate::model::Model;

/// Fold the RTC center into the scene roots.
///
/// The center is pre-multiplied as a translation into the local transform
/// of every root node, then the extension is removed from the document.
/// No-op when the extension is absent.
pub fn apply_rtc_center(model: &mut Model, warnings: &mut Vec<String>) {
    let Some(ext) = model.common.extension::<CesiumRtc>() else {
        return;
    };
    let center = ext.center;
    let translation = DVec3::from_array(center);

    for index in model.root_node_indices() {
        let Some(node) = usize::try_from(index)
            .ok()
            .and_then(|i| model.nodes.get_mut(i))
        else {
            warnings.push(format!("/scenes: root node {index} is out of range"));
            continue;
        };
        match &mut node.matrix {
            Some(m) => {
                let combined = DMat4::from_translation(translation) * DMat4::from_cols_array(m);
                *m = combined.to_cols_array();
            }
            None => {
                node.translation[0] += center[0];
                node.translation[1] += center[1];
                node.translation[2] += center[2];
            }
        }
    }

    model.common.remove_extension(CesiumRtc::NAME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionValue, TypedExtension};
    use crate::model::{Node, Scene};

    fn model_with_center(center: [f64; 3]) -> Model {
        let mut model = Model::default();
        model.common.extensions.insert(
            CesiumRtc::NAME.to_string(),
            ExtensionValue::Typed(TypedExtension::CesiumRtc(CesiumRtc {
                center,
                ..Default::default()
            })),
        );
        model
    }

    #[test]
    fn test_translates_trs_roots() {
        let mut model = model_with_center([100.0, 0.0, -5.0]);
        model.nodes.push(Node {
            translation: [1.0, 2.0, 3.0],
            ..Default::default()
        });
        model.nodes.push(Node::default());
        model.scenes.push(Scene {
            nodes: vec![0],
            ..Default::default()
        });
        let mut warnings = Vec::new();
        apply_rtc_center(&mut model, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(model.nodes[0].translation, [101.0, 2.0, -2.0]);
        // Non-root nodes are untouched.
        assert_eq!(model.nodes[1].translation, [0.0, 0.0, 0.0]);
        assert!(!model.common.has_extension(CesiumRtc::NAME));
    }

    #[test]
    fn test_premultiplies_matrix_roots() {
        let mut model = model_with_center([10.0, 0.0, 0.0]);
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        m[12] = 2.0;
        model.nodes.push(Node {
            matrix: Some(m),
            ..Default::default()
        });
        model.scenes.push(Scene {
            nodes: vec![0],
            ..Default::default()
        });
        let mut warnings = Vec::new();
        apply_rtc_center(&mut model, &mut warnings);
        let matrix = model.nodes[0].matrix.unwrap();
        assert_eq!(matrix[12], 12.0);
    }

    #[test]
    fn test_out_of_range_root_warns() {
        let mut model = model_with_center([1.0, 1.0, 1.0]);
        model.scenes.push(Scene {
            nodes: vec![3],
            ..Default::default()
        });
        let mut warnings = Vec::new();
        apply_rtc_center(&mut model, &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert!(!model.common.has_extension(CesiumRtc::NAME));
    }

    #[test]
    fn test_noop_without_extension() {
        let mut model = Model::default();
        model.nodes.push(Node::default());
        let mut warnings = Vec::new();
        apply_rtc_center(&mut model, &mut warnings);
        assert!(warnings.is_empty());
    }
}
