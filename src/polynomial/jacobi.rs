//! Orthonormal Jacobi polynomials.
//!
//! P_n^{(α,β)}(x) are orthogonal on [-1, 1] with weight (1-x)^α (1+x)^β.
//! The normalized variant satisfies
//! ∫_{-1}^{1} P_m P_n (1-x)^α (1+x)^β dx = δ_{mn}.

/// Γ(k+1) for small non-negative integers.
fn factorial(k: usize) -> f64 {
    (1..=k).fold(1.0, |acc, i| acc * i as f64)
}

/// Evaluate the orthonormal Jacobi polynomial P_n^{(α,β)}(x).
///
/// Uses the normalized three-term recurrence
/// x P_i = a_i P_{i-1} + b_i P_i + a_{i+1} P_{i+1}
/// starting from the normalized P_0 and P_1.
pub fn jacobi_normalized(n: usize, alpha: usize, beta: usize, x: f64) -> f64 {
    let a = alpha as f64;
    let b = beta as f64;

    let gamma0 = 2f64.powi((alpha + beta + 1) as i32) / (a + b + 1.0) * factorial(alpha)
        * factorial(beta)
        / factorial(alpha + beta);
    let p0 = 1.0 / gamma0.sqrt();
    if n == 0 {
        return p0;
    }

    let gamma1 = (a + 1.0) * (b + 1.0) / (a + b + 3.0) * gamma0;
    let p1 = ((a + b + 2.0) * x / 2.0 + (a - b) / 2.0) / gamma1.sqrt();
    if n == 1 {
        return p1;
    }

    let mut a_old = 2.0 / (2.0 + a + b) * ((a + 1.0) * (b + 1.0) / (a + b + 3.0)).sqrt();
    let mut p_prev = p0;
    let mut p_curr = p1;

    for i in 1..n {
        let i = i as f64;
        let h1 = 2.0 * i + a + b;
        let a_new = 2.0 / (h1 + 2.0)
            * ((i + 1.0) * (i + 1.0 + a + b) * (i + 1.0 + a) * (i + 1.0 + b)
                / (h1 + 1.0)
                / (h1 + 3.0))
                .sqrt();
        let b_new = -(a * a - b * b) / h1 / (h1 + 2.0);
        let p_next = (-a_old * p_prev + (x - b_new) * p_curr) / a_new;
        p_prev = p_curr;
        p_curr = p_next;
        a_old = a_new;
    }

    p_curr
}
