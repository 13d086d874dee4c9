//! Face-to-face adjacency tables.
//!
//! Facial adjacency is supplied by whoever generates the mesh. For each
//! element group there is one [`FacialAdjacencyGroup`] per neighbor group,
//! plus one keyed by `None` for boundary faces. In boundary groups the
//! `neighbors` entry of a face is negative and its negation is the bitmask of
//! boundary tags attached to the face.

use std::collections::BTreeMap;

use super::MeshError;

/// Adjacency groups of one element group, keyed by neighbor group (`None` = boundary).
pub type FacialAdjacencyMap = BTreeMap<Option<usize>, FacialAdjacencyGroup>;

/// Faces of one element group that border a given neighbor group or the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacialAdjacencyGroup {
    igroup: usize,
    ineighbor_group: Option<usize>,
    elements: Vec<usize>,
    element_faces: Vec<usize>,
    neighbors: Vec<i64>,
    neighbor_faces: Vec<usize>,
}

impl FacialAdjacencyGroup {
    /// Create from parallel arrays.
    pub fn new(
        igroup: usize,
        ineighbor_group: Option<usize>,
        elements: Vec<usize>,
        element_faces: Vec<usize>,
        neighbors: Vec<i64>,
        neighbor_faces: Vec<usize>,
    ) -> Result<Self, MeshError> {
        let n = elements.len();
        if element_faces.len() != n || neighbors.len() != n || neighbor_faces.len() != n {
            return Err(MeshError::InvalidFacialAdjacency(format!(
                "array lengths differ: elements {n}, element_faces {}, neighbors {}, neighbor_faces {}",
                element_faces.len(),
                neighbors.len(),
                neighbor_faces.len()
            )));
        }

        let boundary = ineighbor_group.is_none();
        if let Some(&bad) = neighbors.iter().find(|&&nb| (nb < 0) != boundary) {
            return Err(MeshError::InvalidFacialAdjacency(format!(
                "neighbor entry {bad} in group {igroup} does not match neighbor group {ineighbor_group:?}"
            )));
        }

        Ok(Self {
            igroup,
            ineighbor_group,
            elements,
            element_faces,
            neighbors,
            neighbor_faces,
        })
    }

    /// Boundary faces given as `(element, face, tag_mask)`.
    pub fn boundary(igroup: usize, faces: &[(usize, usize, u64)]) -> Result<Self, MeshError> {
        let mut neighbors = Vec::with_capacity(faces.len());
        for &(_, _, mask) in faces {
            let mask = i64::try_from(mask)
                .ok()
                .filter(|&m| m > 0)
                .ok_or_else(|| {
                    MeshError::InvalidFacialAdjacency(format!("invalid boundary tag mask {mask:#x}"))
                })?;
            neighbors.push(-mask);
        }
        Self::new(
            igroup,
            None,
            faces.iter().map(|f| f.0).collect(),
            faces.iter().map(|f| f.1).collect(),
            neighbors,
            vec![0; faces.len()],
        )
    }

    /// Interior faces given as `(element, face, neighbor_element, neighbor_face)`.
    pub fn interior(
        igroup: usize,
        ineighbor_group: usize,
        faces: &[(usize, usize, usize, usize)],
    ) -> Result<Self, MeshError> {
        let neighbors = faces
            .iter()
            .map(|f| {
                i64::try_from(f.2).map_err(|_| {
                    MeshError::InvalidFacialAdjacency(format!("neighbor element {} too large", f.2))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(
            igroup,
            Some(ineighbor_group),
            faces.iter().map(|f| f.0).collect(),
            faces.iter().map(|f| f.1).collect(),
            neighbors,
            faces.iter().map(|f| f.3).collect(),
        )
    }

    pub fn igroup(&self) -> usize {
        self.igroup
    }

    pub fn ineighbor_group(&self) -> Option<usize> {
        self.ineighbor_group
    }

    pub fn is_boundary(&self) -> bool {
        self.ineighbor_group.is_none()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    pub fn element_faces(&self) -> &[usize] {
        &self.element_faces
    }

    pub fn neighbors(&self) -> &[i64] {
        &self.neighbors
    }

    pub fn neighbor_faces(&self) -> &[usize] {
        &self.neighbor_faces
    }

    /// Boundary tag bitmask of entry `i` (zero for interior faces).
    pub fn tag_mask(&self, i: usize) -> u64 {
        let nb = self.neighbors[i];
        if nb < 0 { nb.unsigned_abs() } else { 0 }
    }

    /// `(element, face)` pairs whose tag mask shares a bit with `bit`.
    pub fn faces_with_tag(&self, bit: u64) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len())
            .filter(move |&i| self.tag_mask(i) & bit != 0)
            .map(|i| (self.elements[i], self.element_faces[i]))
    }

    /// All `(element, face)` pairs.
    pub fn faces(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.elements
            .iter()
            .copied()
            .zip(self.element_faces.iter().copied())
    }
}
