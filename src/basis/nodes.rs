//! Warp-and-blend interpolation nodes on the reference simplex.
//!
//! Equidistant nodes on an equilateral simplex are displaced along each edge
//! by the 1D "warp" that moves equidistant points onto Gauss-Lobatto-Legendre
//! points, blended towards the interior. The blending parameters α are the
//! tabulated optimal values for low orders. The result is mapped back to unit
//! coordinates, so the vertices of the output are the reference vertices.

use faer::{Mat, linalg::solvers::Solve};
use std::f64::consts::PI;

use super::BasisError;
use crate::polynomial::{equidistant_nodes, gauss_lobatto_nodes};

/// Optimal blending parameters for triangles, orders 1..=15.
const ALPHA_OPT_2D: [f64; 15] = [
    0.0000, 0.0000, 1.4152, 0.1001, 0.2751, 0.9800, 1.0999, 1.2832, 1.3648, 1.4773, 1.4959,
    1.5743, 1.5770, 1.6223, 1.6258,
];

/// Optimal blending parameters for tetrahedra, orders 1..=15.
const ALPHA_OPT_3D: [f64; 15] = [
    0.0000, 0.0000, 0.0000, 0.1002, 1.1332, 1.5608, 1.3413, 1.2577, 1.1603, 1.10153, 0.6080,
    0.4523, 0.8856, 0.8717, 0.9655,
];

const TOL: f64 = 1e-10;

/// Warp-and-blend nodes for the `dim`-simplex at polynomial `order`.
///
/// Returns a (dim, n_nodes) matrix with n_nodes = C(order + dim, dim).
/// A 0-simplex has a single node with no coordinates. Order 0 gives the
/// centroid.
pub fn warp_and_blend_nodes(dim: usize, order: usize) -> Result<Mat<f64>, BasisError> {
    match dim {
        0 => Ok(Mat::zeros(0, 1)),
        1 => {
            let x = gauss_lobatto_nodes(order);
            Ok(Mat::from_fn(1, x.len(), |_, j| x[j]))
        }
        2 => Ok(nodes_2d(order)),
        3 => Ok(nodes_3d(order)),
        _ => Err(BasisError::UnsupportedDimension(dim)),
    }
}

/// 1D warp function evaluated in its blended form.
struct Warp {
    gll: Vec<f64>,
    equidistant: Vec<f64>,
}

impl Warp {
    fn new(order: usize) -> Self {
        Self {
            gll: gauss_lobatto_nodes(order),
            equidistant: equidistant_nodes(order),
        }
    }

    /// Interpolated displacement Σ (gll_i - eq_i) ℓ_i(r), divided by (1 - r²).
    ///
    /// Endpoint terms vanish, and the endpoint factors of every interior
    /// Lagrange polynomial cancel against (1 - r²), so the division is exact.
    fn factor(&self, r: f64) -> f64 {
        let eq = &self.equidistant;
        let n = eq.len() - 1;
        let mut warp = 0.0;
        for i in 1..n {
            let mut d = self.gll[i] - eq[i];
            for j in 1..n {
                if j != i {
                    d *= (r - eq[j]) / (eq[i] - eq[j]);
                }
            }
            d *= -1.0 / ((eq[i] - eq[0]) * (eq[i] - eq[n]));
            warp += d;
        }
        warp
    }

    /// Tangential displacement of a point with barycentric coordinates
    /// (l1, l2, l3) on the equilateral triangle with vertices
    /// (-1, -1/√3), (1, -1/√3), (0, 2/√3) carrying l2, l3, l1 respectively.
    fn shift(&self, alpha: f64, l1: f64, l2: f64, l3: f64) -> (f64, f64) {
        let warp1 = l2 * l3 * 4.0 * self.factor(l3 - l2) * (1.0 + (alpha * l1).powi(2));
        let warp2 = l1 * l3 * 4.0 * self.factor(l1 - l3) * (1.0 + (alpha * l2).powi(2));
        let warp3 = l1 * l2 * 4.0 * self.factor(l2 - l1) * (1.0 + (alpha * l3).powi(2));

        let (s2, c2) = (2.0 * PI / 3.0).sin_cos();
        let (s4, c4) = (4.0 * PI / 3.0).sin_cos();
        (warp1 + c2 * warp2 + c4 * warp3, s2 * warp2 + s4 * warp3)
    }
}

fn nodes_2d(order: usize) -> Mat<f64> {
    if order == 0 {
        return Mat::from_fn(2, 1, |_, _| -1.0 / 3.0);
    }

    let alpha = ALPHA_OPT_2D.get(order - 1).copied().unwrap_or(5.0 / 3.0);
    let warp = Warp::new(order);
    let sqrt3 = 3f64.sqrt();
    let n = order as f64;

    let mut rs = Vec::with_capacity((order + 1) * (order + 2) / 2);
    for i in 0..=order {
        for k in 0..=order - i {
            let l1 = i as f64 / n;
            let l3 = k as f64 / n;
            let l2 = 1.0 - l1 - l3;

            let (dx, dy) = warp.shift(alpha, l1, l2, l3);
            let x = -l2 + l3 + dx;
            let y = (-l2 - l3 + 2.0 * l1) / sqrt3 + dy;

            // Back to unit coordinates
            let b1 = (sqrt3 * y + 1.0) / 3.0;
            let b2 = (-3.0 * x - sqrt3 * y + 2.0) / 6.0;
            let b3 = (3.0 * x - sqrt3 * y + 2.0) / 6.0;
            rs.push((-b2 + b3 - b1, -b2 - b3 + b1));
        }
    }

    Mat::from_fn(2, rs.len(), |d, j| if d == 0 { rs[j].0 } else { rs[j].1 })
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn normalized(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

fn nodes_3d(order: usize) -> Mat<f64> {
    if order == 0 {
        return Mat::from_fn(3, 1, |_, _| -0.5);
    }

    let alpha = ALPHA_OPT_3D.get(order - 1).copied().unwrap_or(1.0);
    let warp = Warp::new(order);
    let sqrt3 = 3f64.sqrt();
    let sqrt6 = 6f64.sqrt();

    // Equilateral tetrahedron
    let v1 = [-1.0, -1.0 / sqrt3, -1.0 / sqrt6];
    let v2 = [1.0, -1.0 / sqrt3, -1.0 / sqrt6];
    let v3 = [0.0, 2.0 / sqrt3, -1.0 / sqrt6];
    let v4 = [0.0, 0.0, 3.0 / sqrt6];
    let mid = |a: [f64; 3], b: [f64; 3]| [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1]), 0.5 * (a[2] + b[2])];

    // In-face tangents, one pair per face
    let t1 = [sub(v2, v1), sub(v2, v1), sub(v3, v2), sub(v3, v1)].map(normalized);
    let t2 = [
        sub(v3, mid(v1, v2)),
        sub(v4, mid(v1, v2)),
        sub(v4, mid(v2, v3)),
        sub(v4, mid(v1, v3)),
    ]
    .map(normalized);

    let equi = equidistant_nodes(order);
    let mut xyz: Vec<[f64; 3]> = Vec::with_capacity((order + 1) * (order + 2) * (order + 3) / 6);

    for i in 0..=order {
        for j in 0..=order - i {
            for k in 0..=order - i - j {
                let (r, s, t) = (equi[k], equi[j], equi[i]);
                let l1 = (1.0 + t) / 2.0;
                let l2 = (1.0 + s) / 2.0;
                let l3 = -(1.0 + r + s + t) / 2.0;
                let l4 = (1.0 + r) / 2.0;

                let mut p = [0.0; 3];
                for d in 0..3 {
                    p[d] = l3 * v1[d] + l4 * v2[d] + l2 * v3[d] + l1 * v4[d];
                }

                let mut shift = [0.0; 3];
                let faces = [
                    (l1, l2, l3, l4),
                    (l2, l1, l3, l4),
                    (l3, l1, l4, l2),
                    (l4, l1, l3, l2),
                ];
                for (face, &(la, lb, lc, ld)) in faces.iter().enumerate() {
                    let (w1, w2) = warp.shift(alpha, lb, lc, ld);

                    let mut blend = lb * lc * ld;
                    let denom = (lb + 0.5 * la) * (lc + 0.5 * la) * (ld + 0.5 * la);
                    if denom > TOL {
                        blend = (1.0 + (alpha * la).powi(2)) * blend / denom;
                    }
                    for d in 0..3 {
                        shift[d] += blend * w1 * t1[face][d] + blend * w2 * t2[face][d];
                    }

                    // Points on the edges of this face take the pure edge warp
                    let n_positive = [lb, lc, ld].iter().filter(|&&l| l > TOL).count();
                    if la < TOL && n_positive < 3 {
                        for d in 0..3 {
                            shift[d] = w1 * t1[face][d] + w2 * t2[face][d];
                        }
                    }
                }

                for d in 0..3 {
                    p[d] += shift[d];
                }
                xyz.push(p);
            }
        }
    }

    // Solve A rst = xyz - (v2 + v3 + v4 - v1)/2 with A = [v2-v1, v3-v1, v4-v1]/2
    let a = Mat::from_fn(3, 3, |d, col| {
        let v = [v2, v3, v4][col];
        0.5 * (v[d] - v1[d])
    });
    let rhs = Mat::from_fn(3, xyz.len(), |d, j| {
        xyz[j][d] - 0.5 * (v2[d] + v3[d] + v4[d] - v1[d])
    });
    let lu = a.as_ref().full_piv_lu();
    lu.solve(&rhs)
}
