//! Orthonormal polynomial basis on the reference simplex.
//!
//! The PKD (Dubiner) basis is built from Jacobi polynomials in collapsed
//! coordinates. For the triangle, (r, s) ↦ (a, b) with
//! a = 2(1+r)/(1-s) - 1, b = s, and
//!
//! φ_{ij}(r, s) = √2 P_i(a) P_j^{(2i+1,0)}(b) (1-b)^i
//!
//! The tetrahedral basis adds a third collapse and factor
//! P_k^{(2i+2j+2,0)}(c) (1-c)^{i+j}. The span of the basis of order N is
//! exactly the polynomials of total degree ≤ N.

use faer::{Mat, MatRef};
use std::f64::consts::SQRT_2;

use super::{BasisError, MAX_SIMPLEX_DIM};
use crate::polynomial::jacobi_normalized;

const COLLAPSE_TOL: f64 = 1e-14;

/// Orthonormal basis of total degree `order` on the `dim`-simplex.
#[derive(Clone, Debug)]
pub struct SimplexBasis {
    dim: usize,
    order: usize,
    /// Degree multi-index (i, j, k) of each mode; unused slots are zero.
    modes: Vec<[usize; 3]>,
}

impl SimplexBasis {
    /// Create the basis for a simplex of dimension `dim` (0 to 3).
    pub fn new(dim: usize, order: usize) -> Result<Self, BasisError> {
        if dim > MAX_SIMPLEX_DIM {
            return Err(BasisError::UnsupportedDimension(dim));
        }

        let mut modes = Vec::new();
        match dim {
            0 => modes.push([0, 0, 0]),
            1 => modes.extend((0..=order).map(|i| [i, 0, 0])),
            2 => {
                for i in 0..=order {
                    for j in 0..=order - i {
                        modes.push([i, j, 0]);
                    }
                }
            }
            _ => {
                for i in 0..=order {
                    for j in 0..=order - i {
                        for k in 0..=order - i - j {
                            modes.push([i, j, k]);
                        }
                    }
                }
            }
        }

        Ok(Self { dim, order, modes })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of basis functions, C(order + dim, dim).
    pub fn n_modes(&self) -> usize {
        self.modes.len()
    }

    /// Evaluate basis function `mode` at a point in unit coordinates.
    pub fn evaluate(&self, mode: usize, point: &[f64]) -> f64 {
        let collapsed = collapse(self.dim, point);
        evaluate_collapsed(self.dim, self.modes[mode], &collapsed)
    }

    /// Vandermonde matrix V[k, m] = φ_m(x_k) for points given as columns of a
    /// (dim, n_points) matrix.
    pub fn vandermonde(&self, points: MatRef<'_, f64>) -> Result<Mat<f64>, BasisError> {
        if points.nrows() != self.dim {
            return Err(BasisError::DimensionMismatch {
                expected: self.dim,
                actual: points.nrows(),
            });
        }

        let n_points = points.ncols();
        let mut v = Mat::zeros(n_points, self.n_modes());
        let mut point = vec![0.0; self.dim];

        for k in 0..n_points {
            for (d, x) in point.iter_mut().enumerate() {
                *x = points[(d, k)];
            }
            let collapsed = collapse(self.dim, &point);
            for (m, &degrees) in self.modes.iter().enumerate() {
                v[(k, m)] = evaluate_collapsed(self.dim, degrees, &collapsed);
            }
        }

        Ok(v)
    }
}

/// Map unit coordinates to collapsed coordinates (a, b, c).
fn collapse(dim: usize, x: &[f64]) -> [f64; 3] {
    match dim {
        0 => [0.0; 3],
        1 => [x[0], 0.0, 0.0],
        2 => {
            let (r, s) = (x[0], x[1]);
            let a = if (1.0 - s).abs() > COLLAPSE_TOL {
                2.0 * (1.0 + r) / (1.0 - s) - 1.0
            } else {
                -1.0
            };
            [a, s, 0.0]
        }
        _ => {
            let (r, s, t) = (x[0], x[1], x[2]);
            let a = if (s + t).abs() > COLLAPSE_TOL {
                2.0 * (1.0 + r) / (-s - t) - 1.0
            } else {
                -1.0
            };
            let b = if (1.0 - t).abs() > COLLAPSE_TOL {
                2.0 * (1.0 + s) / (1.0 - t) - 1.0
            } else {
                -1.0
            };
            [a, b, t]
        }
    }
}

fn evaluate_collapsed(dim: usize, [i, j, k]: [usize; 3], [a, b, c]: &[f64; 3]) -> f64 {
    match dim {
        0 => 1.0,
        1 => jacobi_normalized(i, 0, 0, *a),
        2 => {
            SQRT_2
                * jacobi_normalized(i, 0, 0, *a)
                * jacobi_normalized(j, 2 * i + 1, 0, *b)
                * (1.0 - b).powi(i as i32)
        }
        _ => {
            2.0 * SQRT_2
                * jacobi_normalized(i, 0, 0, *a)
                * jacobi_normalized(j, 2 * i + 1, 0, *b)
                * (1.0 - b).powi(i as i32)
                * jacobi_normalized(k, 2 * (i + j) + 2, 0, *c)
                * (1.0 - c).powi((i + j) as i32)
        }
    }
}
