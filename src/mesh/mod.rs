//! Mesh representation.
//!
//! Provides the data model for unstructured meshes of curved, high-order
//! elements:
//! - Element groups with per-element nodal geometry
//! - Global element/node numbering across groups
//! - Element connectivity, derived from shared vertices on demand
//! - Facial adjacency and boundary tags
//! - Node/vertex consistency and orientation checks

mod boundary_tags;
mod builder;
mod connectivity;
mod consistency;
mod error;
mod facial_adjacency;
mod group;
mod model;
mod reference;

pub use boundary_tags::BoundaryTag;
pub use builder::{ConnectivitySource, MAX_BOUNDARY_TAGS, MeshBuilder};
pub use connectivity::{ElementConnectivity, compute_connectivity_from_vertices};
pub use consistency::{
    check_node_vertex_consistency, check_volume_orientation, consistency_tolerance,
    element_orientations, find_bounding_box, node_vertex_errors,
};
pub use error::MeshError;
pub use facial_adjacency::{FacialAdjacencyGroup, FacialAdjacencyMap};
pub use group::{IndexWidth, MeshElementGroup, UnboundElementGroup, VertexIndices};
pub use model::Mesh;
pub use reference::ElementKind;
