//! The mesh: element groups sharing one vertex table.

use std::sync::OnceLock;

use faer::Mat;

use super::connectivity::compute_connectivity_from_vertices;
use super::{
    BoundaryTag, ElementConnectivity, FacialAdjacencyMap, IndexWidth, MeshBuilder,
    MeshElementGroup, MeshError,
};

/// Where element connectivity comes from.
#[derive(Debug)]
pub(crate) enum ConnectivityState {
    /// Connectivity must not be used.
    Unavailable,
    /// Supplied at construction, or derived from vertices on first access.
    Available(OnceLock<ElementConnectivity>),
}

/// Unstructured mesh of curved elements.
///
/// Groups are numbered consecutively: group `i` owns the global elements
/// `element_nr_base..element_nr_base + nelements` and likewise for nodes.
#[derive(Debug)]
pub struct Mesh {
    pub(super) vertices: Mat<f64>,
    pub(super) groups: Vec<MeshElementGroup>,
    pub(super) connectivity: ConnectivityState,
    pub(super) facial_adjacency_groups: Option<Vec<FacialAdjacencyMap>>,
    pub(super) boundary_tags: Vec<BoundaryTag>,
    pub(super) vertex_id_width: IndexWidth,
    pub(super) element_id_width: IndexWidth,
}

impl Mesh {
    /// Start building a mesh over `vertices` (ambient_dim × nvertices).
    pub fn builder(vertices: Mat<f64>) -> MeshBuilder {
        MeshBuilder::new(vertices)
    }

    /// Vertex coordinates, one vertex per column.
    pub fn vertices(&self) -> &Mat<f64> {
        &self.vertices
    }

    pub fn groups(&self) -> &[MeshElementGroup] {
        &self.groups
    }

    pub fn ambient_dim(&self) -> usize {
        self.vertices.nrows()
    }

    /// Intrinsic dimension shared by all groups.
    pub fn dim(&self) -> usize {
        self.groups.first().map_or(0, MeshElementGroup::dim)
    }

    pub fn nvertices(&self) -> usize {
        self.vertices.ncols()
    }

    pub fn nelements(&self) -> usize {
        self.groups.iter().map(MeshElementGroup::nelements).sum()
    }

    pub fn nnodes(&self) -> usize {
        self.groups.iter().map(MeshElementGroup::nnodes).sum()
    }

    pub fn vertex_id_width(&self) -> IndexWidth {
        self.vertex_id_width
    }

    pub fn element_id_width(&self) -> IndexWidth {
        self.element_id_width
    }

    pub fn boundary_tags(&self) -> &[BoundaryTag] {
        &self.boundary_tags
    }

    /// Bit owned by `tag` in the boundary tag masks.
    ///
    /// [`BoundaryTag::NoBoundary`] maps to 0 and thus selects no face.
    pub fn boundary_tag_bit(&self, tag: &BoundaryTag) -> Result<u64, MeshError> {
        if tag.is_empty() {
            return Ok(0);
        }
        self.boundary_tags
            .iter()
            .position(|t| t == tag)
            .map(|i| 1u64 << i)
            .ok_or_else(|| MeshError::UnknownBoundaryTag(tag.clone()))
    }

    /// Facial adjacency per element group, if supplied.
    pub fn facial_adjacency_groups(&self) -> Result<&[FacialAdjacencyMap], MeshError> {
        self.facial_adjacency_groups
            .as_deref()
            .ok_or(MeshError::FacialAdjacencyUnavailable)
    }

    /// Element-to-element connectivity.
    ///
    /// Unless supplied explicitly, it is derived from shared vertices on first
    /// access and cached.
    pub fn element_connectivity(&self) -> Result<&ElementConnectivity, MeshError> {
        match &self.connectivity {
            ConnectivityState::Unavailable => Err(MeshError::ConnectivityUnavailable),
            ConnectivityState::Available(cell) => {
                Ok(cell.get_or_init(|| compute_connectivity_from_vertices(self)))
            }
        }
    }
}
