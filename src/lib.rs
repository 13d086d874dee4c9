//! # dg-mesh
//!
//! Unstructured meshes of curved, high-order simplex elements for nodal
//! discontinuous Galerkin methods.
//!
//! This crate provides:
//! - Reference-simplex numerics (warp-and-blend nodes, orthonormal basis,
//!   resampling)
//! - A validated mesh data model with element groups, facial adjacency and
//!   boundary tags
//! - Element connectivity derived from shared vertices
//! - Node/vertex consistency and orientation checks
//! - Face restrictions: boundary or interior face meshes together with the
//!   interpolation connection from the volume
//!
//! ## Features
//! - `parallel`: restrict element groups concurrently with rayon
//! - `burn`: keep connection index arrays in Burn tensors
//! - `burn-ndarray`: CPU Burn backend

pub mod basis;
pub mod connection;
pub mod discretization;
pub mod mesh;
pub mod polynomial;

pub use basis::{BasisError, SimplexBasis, resampling_matrix, warp_and_blend_nodes};
pub use connection::{
    ArrayContext, ConnectionError, DiscretizationConnection, FaceRestriction, HostArrayContext,
    face_vertices, make_face_restriction,
};
pub use discretization::{Discretization, ElementGroupFactory, PolynomialWarpAndBlendGroupFactory};
pub use mesh::{
    BoundaryTag, ConnectivitySource, ElementConnectivity, ElementKind, FacialAdjacencyGroup,
    IndexWidth, Mesh, MeshBuilder, MeshElementGroup, MeshError, UnboundElementGroup,
    VertexIndices,
};
