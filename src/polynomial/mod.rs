//! One-dimensional orthogonal polynomials and node sets.
//!
//! This module provides:
//! - Legendre polynomials (used to locate Gauss-Lobatto-Legendre nodes)
//! - Orthonormal Jacobi polynomials P_n^{(α,β)}, the building block of the
//!   simplex basis in [`crate::basis`]
//! - 1D Gauss-Lobatto-Legendre (GLL) nodes

mod jacobi;
mod legendre;
mod nodes;

pub use jacobi::jacobi_normalized;
pub use legendre::legendre_and_derivative;
pub use nodes::{equidistant_nodes, gauss_lobatto_nodes};
