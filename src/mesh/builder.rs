//! Mesh construction and validation.

use std::sync::OnceLock;

use faer::Mat;
use tracing::{debug, info};

use super::consistency::{check_node_vertex_consistency, check_volume_orientation};
use super::model::ConnectivityState;
use super::{
    BoundaryTag, ElementConnectivity, FacialAdjacencyMap, IndexWidth, Mesh, MeshElementGroup,
    MeshError, UnboundElementGroup,
};

/// Largest number of boundary tags a mesh can carry.
pub const MAX_BOUNDARY_TAGS: usize = 63;

/// How a mesh obtains its element connectivity.
#[derive(Clone, Debug, Default)]
pub enum ConnectivitySource {
    /// Derive from shared vertices on first access.
    #[default]
    FromVertices,
    /// Connectivity must not be used with this mesh.
    Unavailable,
    /// Use the given connectivity.
    Explicit(ElementConnectivity),
}

/// Builder for [`Mesh`].
///
/// # Example
///
/// ```
/// use dg_mesh::mesh::{Mesh, UnboundElementGroup, VertexIndices};
/// use faer::Mat;
///
/// // one straight-sided triangle, geometry order 1
/// let vertices = Mat::from_fn(2, 3, |d, v| if v == d + 1 { 1.0 } else { 0.0 });
/// let unit_nodes = Mat::from_fn(2, 3, |d, v| if v == d + 1 { 1.0 } else { -1.0 });
/// let nodes = vec![
///     Mat::from_fn(1, 3, |_, v| vertices[(0, v)]),
///     Mat::from_fn(1, 3, |_, v| vertices[(1, v)]),
/// ];
/// let vertex_indices = VertexIndices::from_rows(&[[0, 1, 2]]).unwrap();
/// let group =
///     UnboundElementGroup::simplex(1, vertex_indices, nodes, Some(unit_nodes), None).unwrap();
///
/// let mesh = Mesh::builder(vertices).with_group(group).build().unwrap();
/// assert_eq!(mesh.nelements(), 1);
/// ```
#[derive(Debug)]
pub struct MeshBuilder {
    vertices: Mat<f64>,
    groups: Vec<UnboundElementGroup>,
    boundary_tags: Vec<BoundaryTag>,
    facial_adjacency_groups: Option<Vec<FacialAdjacencyMap>>,
    connectivity: ConnectivitySource,
    vertex_id_width: IndexWidth,
    element_id_width: IndexWidth,
    skip_tests: bool,
}

impl MeshBuilder {
    /// Start from a vertex table (ambient_dim × nvertices).
    pub fn new(vertices: Mat<f64>) -> Self {
        Self {
            vertices,
            groups: Vec::new(),
            boundary_tags: Vec::new(),
            facial_adjacency_groups: None,
            connectivity: ConnectivitySource::default(),
            vertex_id_width: IndexWidth::default(),
            element_id_width: IndexWidth::default(),
            skip_tests: false,
        }
    }

    /// Append an element group.
    pub fn with_group(mut self, group: UnboundElementGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Append several element groups.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = UnboundElementGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Register boundary tags after the builtin ones.
    pub fn with_boundary_tags(mut self, tags: impl IntoIterator<Item = BoundaryTag>) -> Self {
        self.boundary_tags.extend(tags);
        self
    }

    /// Facial adjacency, one map per element group.
    pub fn with_facial_adjacency(mut self, groups: Vec<FacialAdjacencyMap>) -> Self {
        self.facial_adjacency_groups = Some(groups);
        self
    }

    pub fn with_element_connectivity(mut self, source: ConnectivitySource) -> Self {
        self.connectivity = source;
        self
    }

    pub fn with_vertex_id_width(mut self, width: IndexWidth) -> Self {
        self.vertex_id_width = width;
        self
    }

    pub fn with_element_id_width(mut self, width: IndexWidth) -> Self {
        self.element_id_width = width;
        self
    }

    /// Skip index width, node-vertex consistency and orientation checks.
    pub fn skip_tests(mut self) -> Self {
        self.skip_tests = true;
        self
    }

    /// Validate the inputs and assemble the mesh.
    pub fn build(self) -> Result<Mesh, MeshError> {
        let first = self.groups.first().ok_or(MeshError::NoGroups)?;
        let dim = first.dim();
        let ambient_dim = self.vertices.nrows();
        let nvertices = self.vertices.ncols();

        for grp in &self.groups {
            if grp.dim() != dim {
                return Err(MeshError::InconsistentDimensions {
                    first: dim,
                    other: grp.dim(),
                });
            }
            if grp.ambient_dim() != ambient_dim {
                return Err(MeshError::ShapeMismatch(format!(
                    "group has nodes in {} dimensions, vertices have {ambient_dim}",
                    grp.ambient_dim()
                )));
            }
            for &index in grp.vertex_indices().as_slice() {
                if index >= nvertices {
                    return Err(MeshError::VertexIndexOutOfRange { index, nvertices });
                }
                if !self.vertex_id_width.fits(index) {
                    return Err(MeshError::IndexOverflow {
                        index,
                        width: self.vertex_id_width,
                    });
                }
            }
        }

        let mut groups = Vec::with_capacity(self.groups.len());
        let (mut element_nr_base, mut node_nr_base) = (0, 0);
        for grp in self.groups {
            let (nelements, nnodes) = (grp.nelements(), grp.nnodes());
            groups.push(grp.join_mesh(element_nr_base, node_nr_base));
            element_nr_base += nelements;
            node_nr_base += nnodes;
        }
        let nelements = element_nr_base;
        if !self.element_id_width.fits(nelements) {
            return Err(MeshError::IndexOverflow {
                index: nelements,
                width: self.element_id_width,
            });
        }

        let boundary_tags = register_boundary_tags(self.boundary_tags)?;

        if let Some(adjacency) = &self.facial_adjacency_groups {
            validate_facial_adjacency(&groups, adjacency)?;
        }

        let connectivity = match self.connectivity {
            ConnectivitySource::Unavailable => ConnectivityState::Unavailable,
            ConnectivitySource::FromVertices => ConnectivityState::Available(OnceLock::new()),
            ConnectivitySource::Explicit(conn) => {
                validate_connectivity(&conn, nelements)?;
                ConnectivityState::Available(OnceLock::from(conn))
            }
        };

        let mesh = Mesh {
            vertices: self.vertices,
            groups,
            connectivity,
            facial_adjacency_groups: self.facial_adjacency_groups,
            boundary_tags,
            vertex_id_width: self.vertex_id_width,
            element_id_width: self.element_id_width,
        };

        if self.skip_tests {
            debug!("mesh checks skipped");
        } else {
            for (igroup, grp) in mesh.groups.iter().enumerate() {
                if grp.index_width() != mesh.vertex_id_width {
                    return Err(MeshError::IndexWidthMismatch {
                        group: igroup,
                        expected: mesh.vertex_id_width,
                        actual: grp.index_width(),
                    });
                }
            }
            check_node_vertex_consistency(&mesh)?;
            check_volume_orientation(&mesh)?;
        }

        info!(
            dim,
            ambient_dim,
            nvertices,
            nelements,
            ngroups = mesh.groups.len(),
            "built mesh"
        );
        Ok(mesh)
    }
}

/// Builtin tags first, then user tags in order, without duplicates.
fn register_boundary_tags(user_tags: Vec<BoundaryTag>) -> Result<Vec<BoundaryTag>, MeshError> {
    let mut tags: Vec<BoundaryTag> = BoundaryTag::builtin().into();
    for tag in user_tags {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if tags.len() > MAX_BOUNDARY_TAGS {
        return Err(MeshError::TooManyBoundaryTags(tags.len()));
    }
    Ok(tags)
}

fn validate_facial_adjacency(
    groups: &[MeshElementGroup],
    adjacency: &[FacialAdjacencyMap],
) -> Result<(), MeshError> {
    if adjacency.len() != groups.len() {
        return Err(MeshError::InvalidFacialAdjacency(format!(
            "{} adjacency entries for {} element groups",
            adjacency.len(),
            groups.len()
        )));
    }

    for (igroup, (grp, map)) in groups.iter().zip(adjacency).enumerate() {
        let nfaces = grp.kind().nfaces(grp.dim());
        for (&key, fagrp) in map {
            if fagrp.igroup() != igroup || fagrp.ineighbor_group() != key {
                return Err(MeshError::InvalidFacialAdjacency(format!(
                    "entry {key:?} of group {igroup} is labelled ({}, {:?})",
                    fagrp.igroup(),
                    fagrp.ineighbor_group()
                )));
            }
            if let Some((el, face)) = fagrp
                .faces()
                .find(|&(el, face)| el >= grp.nelements() || face >= nfaces)
            {
                return Err(MeshError::InvalidFacialAdjacency(format!(
                    "face ({el}, {face}) out of range in group {igroup}"
                )));
            }
            if let Some(inb) = key {
                let nb = groups.get(inb).ok_or_else(|| {
                    MeshError::InvalidFacialAdjacency(format!("neighbor group {inb} does not exist"))
                })?;
                let nb_nfaces = nb.kind().nfaces(nb.dim());
                let bad = fagrp
                    .neighbors()
                    .iter()
                    .zip(fagrp.neighbor_faces())
                    .any(|(&nb_el, &nb_face)| {
                        usize::try_from(nb_el).map_or(true, |e| e >= nb.nelements())
                            || nb_face >= nb_nfaces
                    });
                if bad {
                    return Err(MeshError::InvalidFacialAdjacency(format!(
                        "neighbor out of range in group {igroup} facing group {inb}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_connectivity(conn: &ElementConnectivity, nelements: usize) -> Result<(), MeshError> {
    if conn.nelements() != nelements {
        return Err(MeshError::InvalidConnectivity(format!(
            "connectivity covers {} elements, mesh has {nelements}",
            conn.nelements()
        )));
    }
    if let Some(&el) = conn.neighbors().iter().find(|&&el| el >= nelements) {
        return Err(MeshError::InvalidConnectivity(format!(
            "neighbor {el} out of range for {nelements} elements"
        )));
    }
    Ok(())
}
