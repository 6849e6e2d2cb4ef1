use serde::Serialize;

use super::{BBox, Point3, Vec3};

/// Triangle mesh handed to renderers and exporters.
///
/// All three buffers are flat: `positions` and `normals` hold `[x, y, z]`
/// triples per vertex, `indices` holds `[a, b, c]` triples per triangle.
///
/// Side triangles are counter-clockwise seen from their strand centreline and
/// cap triangles are counter-clockwise seen from above, so faces point into
/// the vessel. Vertex normals on the sides point outward and are not derived
/// from the winding.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VaseMesh {
    pub positions: Vec<f64>,
    pub normals: Vec<f64>,
    pub indices: Vec<u32>,
}

impl VaseMesh {
    /// Empty mesh with room for `vertices` vertices and `index_count` indices.
    #[must_use]
    pub fn with_capacity(vertices: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, position: Point3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&position.to_array());
        self.normals.extend_from_slice(&normal.to_array());
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3> {
        self.positions
            .get(index * 3..index * 3 + 3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    #[must_use]
    pub fn normal(&self, index: usize) -> Option<Vec3> {
        self.normals
            .get(index * 3..index * 3 + 3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_flat_positions(&self.positions)
    }

    /// Returns true if any position or normal contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_values(&self) -> bool {
        self.positions
            .iter()
            .chain(self.normals.iter())
            .any(|v| !v.is_finite())
    }

    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertex_count() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.positions.len() % 3 != 0 {
            return Err("position buffer length is not a multiple of 3".to_string());
        }
        if self.normals.len() != self.positions.len() {
            return Err("normal buffer does not match position buffer".to_string());
        }
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_values() {
            return Err("mesh has invalid vertex data (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_vertex_returns_sequential_indices() {
        let mut mesh = VaseMesh::with_capacity(3, 3);
        let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0), Vec3::Z);
        let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0), Vec3::Z);
        let c = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0), Vec3::Z);
        mesh.push_triangle(a, b, c);

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.position(1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(mesh.normal(2), Some(Vec3::Z));
        assert_eq!(mesh.position(3), None);
        mesh.validate().expect("valid mesh");
    }

    #[test]
    fn validate_rejects_bad_buffers() {
        let mesh = VaseMesh {
            positions: vec![0.0, 0.0, 0.0],
            normals: vec![0.0, 0.0, 1.0],
            indices: vec![0, 1, 0],
        };
        assert!(mesh.validate().is_err());

        let mesh = VaseMesh {
            positions: vec![0.0, 0.0, 0.0],
            normals: vec![],
            indices: vec![],
        };
        assert!(mesh.validate().is_err());

        let mesh = VaseMesh {
            positions: vec![f64::NAN, 0.0, 0.0],
            normals: vec![0.0, 0.0, 1.0],
            indices: vec![],
        };
        assert!(mesh.validate().is_err());
    }
}
