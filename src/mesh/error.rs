//! Error type for mesh construction and queries.

use thiserror::Error;

use super::{BoundaryTag, ElementKind, IndexWidth};
use crate::basis::BasisError;

/// Errors raised while building or querying a [`Mesh`](super::Mesh).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Element rows do not have the vertex count the element kind requires.
    #[error("vertex_indices has wrong number of vertices per element: expected {expected}, got {actual}")]
    InvalidVertexCount { expected: usize, actual: usize },

    /// Neither unit nodes nor a dimension were supplied for a group.
    #[error("'dim' must be given if 'unit_nodes' is not")]
    MissingDimension,

    /// Array shapes disagree with each other.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A mesh needs at least one element group.
    #[error("mesh has no element groups")]
    NoGroups,

    /// Element groups span different intrinsic dimensions.
    #[error("element groups disagree on dimension: {first} vs {other}")]
    InconsistentDimensions { first: usize, other: usize },

    /// A group's vertex index width differs from the mesh's.
    #[error("group {group} has vertex index width {actual:?}, mesh uses {expected:?}")]
    IndexWidthMismatch {
        group: usize,
        expected: IndexWidth,
        actual: IndexWidth,
    },

    /// An index does not fit into the declared index width.
    #[error("index {index} does not fit into {width:?}")]
    IndexOverflow { index: usize, width: IndexWidth },

    /// A vertex index points past the vertex table.
    #[error("vertex index {index} out of range for {nvertices} vertices")]
    VertexIndexOutOfRange { index: usize, nvertices: usize },

    /// Nodal coordinates do not reproduce the element vertices.
    #[error(
        "node/vertex inconsistency in group {group}: max error {max_error:e} exceeds tolerance {tolerance:e}"
    )]
    NodeVertexInconsistency {
        group: usize,
        max_error: f64,
        tolerance: f64,
    },

    /// A volume element has a negative Jacobian determinant.
    #[error("negatively oriented element found: element {element} (det = {determinant:e})")]
    NegativeOrientation { element: usize, determinant: f64 },

    /// Element connectivity was marked unavailable for this mesh.
    #[error("element connectivity is unavailable for this mesh")]
    ConnectivityUnavailable,

    /// Explicitly supplied connectivity is malformed.
    #[error("invalid element connectivity: {0}")]
    InvalidConnectivity(String),

    /// The boundary tag is not registered on the mesh.
    #[error("unknown boundary tag: {0:?}")]
    UnknownBoundaryTag(BoundaryTag),

    /// More boundary tags than bits in the tag mask.
    #[error("too many boundary tags: {0} (at most 63)")]
    TooManyBoundaryTags(usize),

    /// The mesh carries no facial adjacency information.
    #[error("facial adjacency is unavailable for this mesh")]
    FacialAdjacencyUnavailable,

    /// An element group index past the end of the mesh.
    #[error("group {group} out of range for {ngroups} element groups")]
    GroupOutOfRange { group: usize, ngroups: usize },

    /// Facial adjacency data is inconsistent with the mesh.
    #[error("invalid facial adjacency: {0}")]
    InvalidFacialAdjacency(String),

    /// The operation is not implemented for this element kind.
    #[error("unsupported element kind: {0:?}")]
    UnsupportedElementKind(ElementKind),

    /// No reference tables exist for this dimension.
    #[error("unsupported dimension {dim} for {kind:?} elements")]
    UnsupportedDimension { kind: ElementKind, dim: usize },

    /// Reference-element numerics failed.
    #[error("basis error: {0}")]
    Basis(#[from] BasisError),
}
