//! Resampling operators between point sets.
//!
//! Given values of a function sampled at `source` points, the resampling
//! matrix R produces its values at `target` points:
//!
//! R = V_target V_source^{-1}
//!
//! which is exact whenever the function lies in the span of the basis.

use faer::{Mat, MatRef, linalg::solvers::Solve};

use super::{BasisError, SimplexBasis};

/// Build the (n_target, n_source) resampling matrix for `basis`.
///
/// `target` and `source` hold points as columns in unit coordinates. The
/// source set must be unisolvent for the basis, i.e. contain exactly
/// `basis.n_modes()` well-spread points.
pub fn resampling_matrix(
    basis: &SimplexBasis,
    target: MatRef<'_, f64>,
    source: MatRef<'_, f64>,
) -> Result<Mat<f64>, BasisError> {
    if source.ncols() != basis.n_modes() {
        return Err(BasisError::NodeCountMismatch {
            expected: basis.n_modes(),
            actual: source.ncols(),
        });
    }

    let v_source = basis.vandermonde(source)?;
    let v_target = basis.vandermonde(target)?;

    // R V_s = V_t  <=>  V_sᵀ Rᵀ = V_tᵀ
    let lu = v_source.as_ref().transpose().full_piv_lu();
    let rhs = v_target.as_ref().transpose().to_owned();
    let r_t = lu.solve(&rhs);

    Ok(r_t.as_ref().transpose().to_owned())
}

/// Apply a resampling matrix to per-element nodal values.
///
/// `values` is (n_elements, n_source); the result is (n_elements, n_target).
pub fn apply_resampling(
    resampling: MatRef<'_, f64>,
    values: MatRef<'_, f64>,
) -> Result<Mat<f64>, BasisError> {
    if values.ncols() != resampling.ncols() {
        return Err(BasisError::ValueCountMismatch {
            expected: resampling.ncols(),
            actual: values.ncols(),
        });
    }
    Ok(values * resampling.transpose())
}
