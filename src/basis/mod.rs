//! Reference-simplex numerics.
//!
//! This module provides the pieces a nodal high-order mesh needs from its
//! reference element:
//! - Warp-and-blend unit nodes for simplices of dimension 0 to 3
//! - The orthonormal (PKD/Dubiner) simplex basis and its Vandermonde matrices
//! - Resampling matrices between point sets, exact on the basis span
//!
//! Reference simplices use the unit-coordinate convention with vertices at
//! -1 and the positive coordinate axes, e.g. (-1,-1), (1,-1), (-1,1) in 2D.

mod error;
mod nodes;
mod resampling;
mod simplex;

pub use error::BasisError;
pub use nodes::warp_and_blend_nodes;
pub use resampling::{apply_resampling, resampling_matrix};
pub use simplex::SimplexBasis;

/// Largest simplex dimension the reference numerics support.
pub const MAX_SIMPLEX_DIM: usize = 3;
