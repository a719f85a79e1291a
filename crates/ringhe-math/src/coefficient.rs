//! Integer types that can be used as polynomial coefficients.

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::{CryptoRng, Rng, RngCore};
use std::fmt::Debug;

/// A signed integer type holding the coefficients of a [`crate::rq::Poly`].
///
/// All arithmetic is exact; the polynomial layer is in charge of reducing
/// the results modulo the context modulus. Implementations must be able to
/// hold the product of two reduced coefficients.
pub trait Coefficient: Clone + Debug + PartialEq + Eq + PartialOrd + Ord + Send + Sync + 'static {
    /// Largest supported modulus size in bits, if any.
    const MAX_MODULUS_BITS: Option<u64>;

    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Conversion from a machine integer.
    fn from_i64(value: i64) -> Self;

    /// Conversion from an unsigned big integer, if it fits.
    fn from_biguint(value: &BigUint) -> Option<Self>;

    /// Conversion from a big integer, if it fits.
    fn from_bigint(value: &BigInt) -> Option<Self>;

    /// Conversion to a big integer.
    fn to_bigint(&self) -> BigInt;

    /// Lossy conversion to a float.
    fn to_f64(&self) -> f64;

    /// Whether the value is zero.
    fn is_zero(&self) -> bool;

    /// Number of bits of the absolute value.
    fn bits(&self) -> u64;

    /// Addition.
    fn add_ref(&self, rhs: &Self) -> Self;

    /// Subtraction.
    fn sub_ref(&self, rhs: &Self) -> Self;

    /// Multiplication.
    fn mul_ref(&self, rhs: &Self) -> Self;

    /// Negation.
    fn neg_ref(&self) -> Self;

    /// Remainder in `[0, modulus)`.
    fn rem_euclid_ref(&self, modulus: &Self) -> Self;

    /// Quotient and remainder of the euclidean division.
    fn div_rem_euclid_ref(&self, rhs: &Self) -> (Self, Self);

    /// Uniform value in `[0, bound)`.
    fn sample_below<R: RngCore + CryptoRng>(bound: &Self, rng: &mut R) -> Self;
}

impl Coefficient for BigInt {
    const MAX_MODULUS_BITS: Option<u64> = None;

    fn zero() -> Self {
        Zero::zero()
    }

    fn one() -> Self {
        One::one()
    }

    fn from_i64(value: i64) -> Self {
        BigInt::from(value)
    }

    fn from_biguint(value: &BigUint) -> Option<Self> {
        Some(BigInt::from_biguint(Sign::Plus, value.clone()))
    }

    fn from_bigint(value: &BigInt) -> Option<Self> {
        Some(value.clone())
    }

    fn to_bigint(&self) -> BigInt {
        self.clone()
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(if self.is_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn bits(&self) -> u64 {
        self.magnitude().bits()
    }

    fn add_ref(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn sub_ref(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn mul_ref(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn neg_ref(&self) -> Self {
        -self
    }

    fn rem_euclid_ref(&self, modulus: &Self) -> Self {
        let r = self % modulus;
        if r.is_negative() {
            r + modulus
        } else {
            r
        }
    }

    fn div_rem_euclid_ref(&self, rhs: &Self) -> (Self, Self) {
        let r = self.rem_euclid_ref(rhs);
        ((self - &r) / rhs, r)
    }

    fn sample_below<R: RngCore + CryptoRng>(bound: &Self, rng: &mut R) -> Self {
        rng.gen_bigint_range(&<BigInt as Coefficient>::zero(), bound)
    }
}

impl Coefficient for i128 {
    const MAX_MODULUS_BITS: Option<u64> = Some(62);

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }

    fn from_i64(value: i64) -> Self {
        value as i128
    }

    fn from_biguint(value: &BigUint) -> Option<Self> {
        value.to_i128()
    }

    fn from_bigint(value: &BigInt) -> Option<Self> {
        value.to_i128()
    }

    fn to_bigint(&self) -> BigInt {
        BigInt::from(*self)
    }

    fn to_f64(&self) -> f64 {
        *self as f64
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn bits(&self) -> u64 {
        (128 - self.unsigned_abs().leading_zeros()) as u64
    }

    fn add_ref(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn sub_ref(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn mul_ref(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn neg_ref(&self) -> Self {
        -self
    }

    fn rem_euclid_ref(&self, modulus: &Self) -> Self {
        self.rem_euclid(*modulus)
    }

    fn div_rem_euclid_ref(&self, rhs: &Self) -> (Self, Self) {
        (self.div_euclid(*rhs), self.rem_euclid(*rhs))
    }

    fn sample_below<R: RngCore + CryptoRng>(bound: &Self, rng: &mut R) -> Self {
        rng.gen_range(0..*bound)
    }
}
