//! One-dimensional node sets on [-1, 1].
//!
//! The N+1 Gauss-Lobatto-Legendre (GLL) nodes are the roots of (1-x²)P'_N(x),
//! which includes the endpoints x = ±1. They are the 1-simplex warp-and-blend
//! nodes and the target distribution the warp function pulls equidistant nodes
//! towards in higher dimensions.

use super::legendre::legendre_and_derivative;
use std::f64::consts::PI;

/// Compute Gauss-Lobatto-Legendre nodes for polynomial order N.
///
/// Returns N+1 ascending nodes in [-1, 1], including the endpoints.
/// Uses Newton iteration starting from Chebyshev-Lobatto nodes.
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;

    if n == 0 {
        return vec![0.0];
    }
    if n == 1 {
        return vec![-1.0, 1.0];
    }

    // Chebyshev-Lobatto initial guess: x_j = -cos(π j / N)
    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    // Roots of L_N(x) = (1-x²) P'_N(x). Since L'_N(x) = -n(n+1) P_N(x), the Newton
    // update is x += (1-x²) P'_N / (n(n+1) P_N).
    for node in nodes.iter_mut().take(n).skip(1) {
        let mut x = *node;
        for _ in 0..100 {
            let (p_n, dp_n) = legendre_and_derivative(n, x);
            let update = (1.0 - x * x) * dp_n / (n as f64 * (n + 1) as f64 * p_n);
            x += update;
            if update.abs() < 1e-15 {
                break;
            }
        }
        *node = x;
    }

    nodes
}

/// Equidistant nodes -1 + 2i/N, i = 0..=N. Order 0 gives the midpoint.
pub fn equidistant_nodes(order: usize) -> Vec<f64> {
    if order == 0 {
        return vec![0.0];
    }
    (0..=order)
        .map(|i| -1.0 + 2.0 * i as f64 / order as f64)
        .collect()
}
