#![crate_name = "ringhe_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Utilities for the ringhe library: sampling and a little number theory.

mod sampling;

pub use sampling::{
    sample_biguint_below, sample_vec_cbd, sample_vec_gaussian, sample_vec_ternary,
    sample_vec_ternary_with_weight, ErrorDistribution,
};

use num_bigint::{BigInt, BigUint};
use num_bigint_dig::{prime::probably_prime, BigUint as BigUintDig};
use num_traits::{One, Signed, Zero};

/// Returns whether `p` is (probably) prime.
pub fn is_prime(p: &BigUint) -> bool {
    probably_prime(&BigUintDig::from_bytes_le(&p.to_bytes_le()), 20)
}

/// Returns the smallest prime larger than or equal to `lower_bound`.
pub fn next_prime(lower_bound: &BigUint) -> BigUint {
    let two = BigUint::from(2u64);
    if lower_bound <= &two {
        return two;
    }
    let mut candidate = lower_bound.clone();
    if !candidate.bit(0) {
        candidate += BigUint::one();
    }
    while !is_prime(&candidate) {
        candidate += &two;
    }
    candidate
}

/// Greatest common divisor of two unsigned integers.
pub const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Returns the inverse of `a` modulo `m`, if it exists.
pub fn inverse(a: u64, m: u64) -> Option<u64> {
    if m == 0 {
        return None;
    }
    if m == 1 {
        return Some(0);
    }
    let (mut old_r, mut r) = ((a % m) as i128, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        None
    } else {
        Some(old_s.rem_euclid(m as i128) as u64)
    }
}

/// Returns the inverse of `a` modulo `m` for arbitrary-precision integers, if
/// it exists.
pub fn inverse_biguint(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    if m.is_one() {
        return Some(BigUint::zero());
    }
    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a % m), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return None;
    }
    let mut inv = old_s % &modulus;
    if inv.is_negative() {
        inv += &modulus;
    }
    inv.to_biguint()
}
