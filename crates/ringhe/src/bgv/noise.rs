//! Noise estimators.
//!
//! These are diagnostic tools: they are used by tests and benchmarks to
//! track the noise of ciphertext phases, never on the decryption path.

use num_bigint::{BigInt, BigUint};
use ringhe_math::rq::Poly;
use std::f64::consts::PI;

/// Coefficients of the polynomial remapped from [0, q) to (-q/2, q/2].
pub fn signed(p: &Poly) -> Vec<BigInt> {
    p.signed_coefficients()
}

/// Infinity norm of the centered coefficients.
pub fn norm_inf(p: &Poly) -> BigUint {
    p.norm_inf()
}

/// Canonical embedding norm: the largest magnitude of the centered
/// polynomial evaluated at the primitive 2n-th roots of unity
/// exp(i * pi * (2k + 1) / n).
pub fn norm_can(p: &Poly) -> f64 {
    let n = p.ctx().degree;
    let coefficients = signed(p)
        .iter()
        .map(ringhe_math::Coefficient::to_f64)
        .collect::<Vec<_>>();
    (0..n)
        .map(|k| {
            let angle = PI * (2 * k + 1) as f64 / n as f64;
            let (re, im) = coefficients
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(re, im), (j, c)| {
                    let theta = angle * j as f64;
                    (re + c * theta.cos(), im + c * theta.sin())
                });
            re.hypot(im)
        })
        .fold(0.0, f64::max)
}
