//! Element-to-element connectivity.
//!
//! Two elements are neighbors if they share at least one vertex. Every
//! element is listed among its own neighbors.

use std::collections::BTreeSet;

use tracing::debug;

use super::{Mesh, MeshError};

/// Compressed (CSR) element adjacency in global element numbering.
///
/// The neighbors of element `i` are
/// `neighbors[neighbors_starts[i]..neighbors_starts[i + 1]]`, sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementConnectivity {
    neighbors_starts: Vec<usize>,
    neighbors: Vec<usize>,
}

impl ElementConnectivity {
    /// Create from CSR arrays, checking their structure.
    pub fn new(neighbors_starts: Vec<usize>, neighbors: Vec<usize>) -> Result<Self, MeshError> {
        match neighbors_starts.first() {
            Some(0) => {}
            _ => {
                return Err(MeshError::InvalidConnectivity(
                    "neighbors_starts must begin with 0".into(),
                ));
            }
        }
        if neighbors_starts.windows(2).any(|w| w[0] > w[1]) {
            return Err(MeshError::InvalidConnectivity(
                "neighbors_starts must be non-decreasing".into(),
            ));
        }
        if neighbors_starts.last() != Some(&neighbors.len()) {
            return Err(MeshError::InvalidConnectivity(format!(
                "neighbors_starts ends at {:?}, but there are {} neighbors",
                neighbors_starts.last(),
                neighbors.len()
            )));
        }
        Ok(Self {
            neighbors_starts,
            neighbors,
        })
    }

    pub fn nelements(&self) -> usize {
        self.neighbors_starts.len() - 1
    }

    pub fn neighbors_starts(&self) -> &[usize] {
        &self.neighbors_starts
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// Neighbors of element `el`.
    pub fn neighbors_of(&self, el: usize) -> &[usize] {
        &self.neighbors[self.neighbors_starts[el]..self.neighbors_starts[el + 1]]
    }
}

/// Derive element connectivity from shared vertices.
pub fn compute_connectivity_from_vertices(mesh: &Mesh) -> ElementConnectivity {
    // vertex -> incident elements
    let mut vertex_to_elements: Vec<Vec<usize>> = vec![Vec::new(); mesh.nvertices()];
    for grp in mesh.groups() {
        let vi = grp.vertex_indices();
        for el in 0..grp.nelements() {
            let iel = grp.element_nr_base() + el;
            for &v in vi.row(el) {
                vertex_to_elements[v].push(iel);
            }
        }
    }

    let mut neighbors_starts = Vec::with_capacity(mesh.nelements() + 1);
    let mut neighbors = Vec::new();
    neighbors_starts.push(0);
    for grp in mesh.groups() {
        let vi = grp.vertex_indices();
        for el in 0..grp.nelements() {
            let element_neighbors: BTreeSet<usize> = vi
                .row(el)
                .iter()
                .flat_map(|&v| vertex_to_elements[v].iter().copied())
                .collect();
            neighbors.extend(element_neighbors);
            neighbors_starts.push(neighbors.len());
        }
    }

    debug!(
        nelements = mesh.nelements(),
        nneighbors = neighbors.len(),
        "computed element connectivity from vertices"
    );

    ElementConnectivity {
        neighbors_starts,
        neighbors,
    }
}
