//! Reference element kinds and their fixed geometric tables.
//!
//! Simplex vertex convention (unit coordinates):
//! - 1D: v0 = -1, v1 = 1
//! - 2D: v0 = (-1,-1), v1 = (1,-1), v2 = (-1,1)
//! - 3D: v0 = (-1,-1,-1), v1 = (1,-1,-1), v2 = (-1,1,-1), v3 = (-1,-1,1)
//!
//! Face convention (local vertex indices, ordered so that the face's own
//! reference map is fixed):
//! - 1D: face 0 = (0), face 1 = (1)
//! - 2D: face 0 = (0,1), face 1 = (2,0), face 2 = (1,2)
//! - 3D: face 0 = (0,1,2), face 1 = (0,3,1), face 2 = (0,2,3), face 3 = (1,3,2)

use faer::Mat;

use super::MeshError;
use crate::basis::MAX_SIMPLEX_DIM;

const SIMPLEX_FACES_1D: &[&[usize]] = &[&[0], &[1]];
const SIMPLEX_FACES_2D: &[&[usize]] = &[&[0, 1], &[2, 0], &[1, 2]];
const SIMPLEX_FACES_3D: &[&[usize]] = &[&[0, 1, 2], &[0, 3, 1], &[0, 2, 3], &[1, 3, 2]];

/// Kind of reference element shared by an element group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Segment, triangle or tetrahedron.
    Simplex,

    /// Segment, quadrilateral or hexahedron with tensor-product vertex order
    /// (vertex bit k set means coordinate k is +1). Only stored and
    /// orientation-checked; geometric operations are simplex-only.
    Hypercube,
}

impl ElementKind {
    /// Number of vertices of the `dim`-dimensional reference element.
    pub fn nvertices(self, dim: usize) -> usize {
        match self {
            ElementKind::Simplex => dim + 1,
            ElementKind::Hypercube => 1 << dim,
        }
    }

    /// Local vertex indices bounding each local face.
    pub fn face_vertex_indices(self, dim: usize) -> Result<&'static [&'static [usize]], MeshError> {
        match (self, dim) {
            (ElementKind::Simplex, 1) => Ok(SIMPLEX_FACES_1D),
            (ElementKind::Simplex, 2) => Ok(SIMPLEX_FACES_2D),
            (ElementKind::Simplex, 3) => Ok(SIMPLEX_FACES_3D),
            (ElementKind::Simplex, _) => Err(MeshError::UnsupportedDimension { kind: self, dim }),
            (ElementKind::Hypercube, _) => Err(MeshError::UnsupportedElementKind(self)),
        }
    }

    /// Number of faces of the `dim`-dimensional reference element.
    pub fn nfaces(self, dim: usize) -> usize {
        match self {
            ElementKind::Simplex if dim == 0 => 0,
            ElementKind::Simplex => dim + 1,
            ElementKind::Hypercube => 2 * dim,
        }
    }

    /// Reference coordinates of the vertices, one vertex per column.
    pub fn vertex_unit_coordinates(self, dim: usize) -> Result<Mat<f64>, MeshError> {
        match self {
            ElementKind::Simplex if dim <= MAX_SIMPLEX_DIM => {
                Ok(Mat::from_fn(dim, dim + 1, |d, v| if v == d + 1 { 1.0 } else { -1.0 }))
            }
            ElementKind::Simplex => Err(MeshError::UnsupportedDimension { kind: self, dim }),
            ElementKind::Hypercube => Err(MeshError::UnsupportedElementKind(self)),
        }
    }

    /// Local vertices at the end of each reference axis edge leaving vertex 0.
    ///
    /// Physical edge vectors from vertex 0 to these vertices form the columns
    /// of the (affine part of the) element Jacobian.
    pub(crate) fn axis_vertices(self, dim: usize) -> Vec<usize> {
        match self {
            ElementKind::Simplex => (1..=dim).collect(),
            ElementKind::Hypercube => (0..dim).map(|k| 1 << k).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_counts() {
        assert_eq!(ElementKind::Simplex.nvertices(0), 1);
        assert_eq!(ElementKind::Simplex.nvertices(3), 4);
        assert_eq!(ElementKind::Hypercube.nvertices(2), 4);
        assert_eq!(ElementKind::Hypercube.nvertices(3), 8);
    }

    #[test]
    fn test_face_counts() {
        assert_eq!(ElementKind::Simplex.nfaces(0), 0);
        assert_eq!(ElementKind::Hypercube.nfaces(3), 6);
        for dim in 1..=3 {
            let faces = ElementKind::Simplex.face_vertex_indices(dim).unwrap();
            assert_eq!(faces.len(), ElementKind::Simplex.nfaces(dim));
            assert!(faces.iter().all(|f| f.len() == dim));
        }
    }

    #[test]
    fn test_each_face_omits_one_vertex() {
        for dim in 1..=3 {
            let faces = ElementKind::Simplex.face_vertex_indices(dim).unwrap();
            let mut omitted: Vec<usize> = faces
                .iter()
                .map(|f| (0..=dim).find(|v| !f.contains(v)).unwrap())
                .collect();
            omitted.sort_unstable();
            assert_eq!(omitted, (0..=dim).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_triangle_vertex_coordinates() {
        let coords = ElementKind::Simplex.vertex_unit_coordinates(2).unwrap();
        let expected = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]];
        for (v, row) in expected.iter().enumerate() {
            for (d, &x) in row.iter().enumerate() {
                assert_eq!(coords[(d, v)], x);
            }
        }
    }

    #[test]
    fn test_unsupported_tables() {
        assert!(matches!(
            ElementKind::Simplex.face_vertex_indices(4),
            Err(MeshError::UnsupportedDimension { dim: 4, .. })
        ));
        assert!(matches!(
            ElementKind::Simplex.face_vertex_indices(0),
            Err(MeshError::UnsupportedDimension { dim: 0, .. })
        ));
        assert!(matches!(
            ElementKind::Hypercube.face_vertex_indices(2),
            Err(MeshError::UnsupportedElementKind(ElementKind::Hypercube))
        ));
    }

    #[test]
    fn test_axis_vertices() {
        assert_eq!(ElementKind::Simplex.axis_vertices(3), vec![1, 2, 3]);
        assert_eq!(ElementKind::Hypercube.axis_vertices(3), vec![1, 2, 4]);
    }
}
