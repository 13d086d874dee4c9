//! Error type for discretization connections.

use thiserror::Error;

use crate::basis::BasisError;
use crate::mesh::MeshError;

/// Errors raised while building or applying a connection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectionError {
    /// Mesh construction or lookup failed.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Reference-element numerics failed.
    #[error("basis error: {0}")]
    Basis(#[from] BasisError),

    /// A vertex of a selected face has no counterpart in the restricted mesh.
    #[error("vertex {vertex} is not part of the restricted vertex set")]
    UnmappedVertex { vertex: usize },

    /// A connection refers to an element outside its group.
    #[error("element {element} is outside group {group}")]
    ElementOutOfRange { element: usize, group: usize },

    /// A field does not match the discretization it is applied to.
    #[error("field has length {actual}, expected {expected}")]
    FieldLength { expected: usize, actual: usize },

    /// Moving index data to or from the array context failed.
    #[error("device transfer failed: {0}")]
    DeviceTransfer(String),
}
