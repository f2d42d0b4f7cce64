//! Scene graph nodes.

use glam::{DMat4, DQuat, DVec3};

use crate::extensions::EntityKind;
use crate::json::reader::{self, EventSource, GltfObject, ReadContext};
use crate::model::EntityCommon;
use crate::util::Result;

/// A node in the scene hierarchy.
///
/// The local transform is either an explicit column-major 4×4 matrix or a
/// translation/rotation/scale triple; a document never meaningfully carries
/// both.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub children: Vec<i32>,
    /// Column-major 4×4 local transform, when given explicitly.
    pub matrix: Option<[f64; 16]>,
    pub mesh: i32,
    /// Rotation quaternion as x, y, z, w.
    pub rotation: [f64; 4],
    pub scale: [f64; 3],
    pub translation: [f64; 3],
    pub weights: Vec<f64>,
    pub common: EntityCommon,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            children: Vec::new(),
            matrix: None,
            mesh: -1,
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
            translation: [0.0, 0.0, 0.0],
            weights: Vec::new(),
            common: EntityCommon::default(),
        }
    }
}

impl Node {
    /// The local transform as a matrix, composing TRS when no explicit
    /// matrix is present.
    pub fn local_matrix(&self) -> DMat4 {
        match self.matrix {
            Some(m) => DMat4::from_cols_array(&m),
            None => DMat4::from_scale_rotation_translation(
                DVec3::from_array(self.scale),
                DQuat::from_xyzw(
                    self.rotation[0],
                    self.rotation[1],
                    self.rotation[2],
                    self.rotation[3],
                ),
                DVec3::from_array(self.translation),
            ),
        }
    }
}

impl GltfObject for Node {
    const TYPE_NAME: &'static str = "node";
    const KIND: EntityKind = EntityKind::Node;

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn read_property(
        &mut self,
        key: &str,
        src: &mut EventSource<'_>,
        cx: &mut ReadContext<'_>,
    ) -> Result<bool> {
        match key {
            "name" => self.name = reader::read_string(src, cx)?,
            "children" => self.children = reader::read_i32_array(src, cx, -1)?,
            "matrix" => self.matrix = reader::read_f64_fixed::<16>(src, cx)?,
            "mesh" => self.mesh = reader::read_index(src, cx)?,
            "rotation" => {
                if let Some(rotation) = reader::read_f64_fixed::<4>(src, cx)? {
                    self.rotation = rotation;
                }
            }
            "scale" => {
                if let Some(scale) = reader::read_f64_fixed::<3>(src, cx)? {
                    self.scale = scale;
                }
            }
            "translation" => {
                if let Some(translation) = reader::read_f64_fixed::<3>(src, cx)? {
                    self.translation = translation;
                }
            }
            "weights" => self.weights = reader::read_f64_array(src, cx)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_matrix_from_trs() {
        let node = Node {
            translation: [1.0, 2.0, 3.0],
            ..Default::default()
        };
        let m = node.local_matrix();
        assert_eq!(m.w_axis.x, 1.0);
        assert_eq!(m.w_axis.y, 2.0);
        assert_eq!(m.w_axis.z, 3.0);
    }

    #[test]
    fn test_explicit_matrix_wins() {
        let mut m = [0.0; 16];
        // Identity with a translation of (5, 0, 0).
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        m[12] = 5.0;
        let node = Node {
            matrix: Some(m),
            translation: [9.0, 9.0, 9.0],
            ..Default::default()
        };
        assert_eq!(node.local_matrix().w_axis.x, 5.0);
    }
}
