//! Polynomials in R_q\[x\] = (Z_q\[x\])/(x^n+1) with exact coefficients.

mod context;
mod ops;

pub use context::Context;

use crate::{Coefficient, Error, Result};
use itertools::{izip, Itertools};
use num_bigint::{BigInt, BigUint};
use rand::{CryptoRng, RngCore};
use ringhe_traits::{DeserializeWithContext, Serialize};
use ringhe_util::{sample_vec_ternary, ErrorDistribution};
use std::sync::Arc;
use zeroize::Zeroize;

/// Struct that holds a polynomial for a specific context.
///
/// Coefficients are always kept reduced in `[0, q)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly<C: Coefficient = BigInt> {
    ctx: Arc<Context<C>>,
    coefficients: Box<[C]>,
}

impl<C: Coefficient> Zeroize for Poly<C> {
    fn zeroize(&mut self) {
        self.coefficients
            .iter_mut()
            .for_each(|coefficient| *coefficient = C::zero());
    }
}

impl<C: Coefficient> AsRef<Poly<C>> for Poly<C> {
    fn as_ref(&self) -> &Poly<C> {
        self
    }
}

impl<C: Coefficient> AsMut<Poly<C>> for Poly<C> {
    fn as_mut(&mut self) -> &mut Poly<C> {
        self
    }
}

impl<C: Coefficient> Poly<C> {
    /// Creates a polynomial holding the constant 0.
    pub fn zero(ctx: &Arc<Context<C>>) -> Self {
        Self {
            ctx: ctx.clone(),
            coefficients: vec![C::zero(); ctx.degree].into_boxed_slice(),
        }
    }

    /// Creates a polynomial from arbitrary integer coefficients, reducing
    /// them modulo q. Missing coefficients are set to zero.
    pub fn from_coefficients(coefficients: &[C], ctx: &Arc<Context<C>>) -> Result<Self> {
        if coefficients.len() > ctx.degree {
            return Err(Error::Default(format!(
                "Too many coefficients: {} exceeds the degree {}",
                coefficients.len(),
                ctx.degree
            )));
        }
        let mut p = Self::zero(ctx);
        izip!(p.coefficients.iter_mut(), coefficients)
            .for_each(|(pi, ci)| *pi = ci.rem_euclid_ref(&ctx.q));
        Ok(p)
    }

    /// Creates a polynomial from signed machine integers.
    pub fn from_i64(coefficients: &[i64], ctx: &Arc<Context<C>>) -> Result<Self> {
        Self::from_coefficients(&coefficients.iter().map(|c| C::from_i64(*c)).collect_vec(), ctx)
    }

    /// Creates a polynomial from unsigned machine integers.
    pub fn from_u64(coefficients: &[u64], ctx: &Arc<Context<C>>) -> Result<Self> {
        Self::from_coefficients(
            &coefficients
                .iter()
                .map(|c| {
                    C::from_biguint(&BigUint::from(*c))
                        .ok_or_else(|| Error::Default(format!("{c} does not fit")))
                })
                .collect::<Result<Vec<_>>>()?,
            ctx,
        )
    }

    /// Creates a polynomial from big integers.
    pub fn from_bigints(coefficients: &[BigInt], ctx: &Arc<Context<C>>) -> Result<Self> {
        let reduced = coefficients
            .iter()
            .map(|c| {
                let r = c.rem_euclid_ref(&BigInt::from(ctx.modulus().clone()));
                C::from_bigint(&r).ok_or_else(|| Error::Default(format!("{c} does not fit")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_coefficients(&reduced, ctx)
    }

    /// Creates the monomial x^exponent, for any exponent (x^n = -1).
    pub fn monomial(ctx: &Arc<Context<C>>, exponent: usize) -> Self {
        let mut p = Self::zero(ctx);
        p.coefficients[0] = C::one();
        p.mul_monomial(exponent)
    }

    /// Generate a uniformly random polynomial.
    pub fn random<R: RngCore + CryptoRng>(ctx: &Arc<Context<C>>, rng: &mut R) -> Self {
        let mut p = Self::zero(ctx);
        p.coefficients
            .iter_mut()
            .for_each(|pi| *pi = C::sample_below(&ctx.q, rng));
        p
    }

    /// Generate a small polynomial with coefficients drawn from the error
    /// distribution.
    pub fn small<R: RngCore + CryptoRng>(
        ctx: &Arc<Context<C>>,
        distribution: &ErrorDistribution,
        rng: &mut R,
    ) -> Result<Self> {
        let coefficients = distribution
            .sample_vec(ctx.degree, rng)
            .map_err(|e| Error::Default(e.to_string()))?;
        Self::from_i64(&coefficients, ctx)
    }

    /// Generate a polynomial with uniform coefficients in {-1, 0, 1}.
    pub fn ternary<R: RngCore + CryptoRng>(ctx: &Arc<Context<C>>, rng: &mut R) -> Result<Self> {
        Self::from_i64(&sample_vec_ternary(ctx.degree, rng), ctx)
    }

    /// Access the polynomial context.
    pub fn ctx(&self) -> &Arc<Context<C>> {
        &self.ctx
    }

    /// Returns the coefficients, reduced in `[0, q)`.
    pub fn coefficients(&self) -> &[C] {
        &self.coefficients
    }

    /// Returns the coefficients remapped to the centered interval (-q/2, q/2].
    pub fn signed_coefficients(&self) -> Vec<C> {
        self.coefficients
            .iter()
            .map(|c| {
                if c > &self.ctx.half_q {
                    c.sub_ref(&self.ctx.q)
                } else {
                    c.clone()
                }
            })
            .collect_vec()
    }

    /// Returns the coefficients as big integers in `[0, q)`.
    pub fn to_bigints(&self) -> Vec<BigInt> {
        self.coefficients.iter().map(|c| c.to_bigint()).collect_vec()
    }

    /// Infinity norm of the centered representative.
    pub fn norm_inf(&self) -> BigUint {
        self.signed_coefficients()
            .iter()
            .map(|c| c.to_bigint().magnitude().clone())
            .max()
            .unwrap_or_default()
    }

    /// Returns whether all coefficients are zero.
    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|c| c.is_zero())
    }

    /// Multiplication by a scalar.
    pub fn scalar_mul(&self, scalar: &C) -> Self {
        let s = scalar.rem_euclid_ref(&self.ctx.q);
        let mut p = self.clone();
        p.coefficients
            .iter_mut()
            .for_each(|c| *c = c.mul_ref(&s).rem_euclid_ref(&self.ctx.q));
        p
    }

    /// Multiplication by the monomial x^exponent, i.e. a negacyclic rotation.
    pub fn mul_monomial(&self, exponent: usize) -> Self {
        let n = self.ctx.degree;
        let e = exponent % (2 * n);
        let mut p = Self::zero(&self.ctx);
        for (i, c) in self.coefficients.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let j = (i + e) % (2 * n);
            if j < n {
                p.coefficients[j] = c.clone();
            } else {
                p.coefficients[j - n] = c.neg_ref().rem_euclid_ref(&self.ctx.q);
            }
        }
        p
    }

    /// Substitute x by x^k, which is an automorphism of the ring when k is
    /// odd. Returns an error if k is even.
    pub fn substitute(&self, k: usize) -> Result<Self> {
        let n = self.ctx.degree;
        if k % 2 == 0 {
            return Err(Error::InvalidGaloisElement(k));
        }
        let k = k % (2 * n);
        let mut p = Self::zero(&self.ctx);
        for (i, c) in self.coefficients.iter().enumerate() {
            let j = (i * k) % (2 * n);
            if j < n {
                p.coefficients[j] = c.clone();
            } else {
                p.coefficients[j - n] = c.neg_ref().rem_euclid_ref(&self.ctx.q);
            }
        }
        Ok(p)
    }

    /// Move the polynomial to another context of the same degree, keeping the
    /// representatives in `[0, q)` and reducing them modulo the new modulus.
    pub fn switch_context(&self, ctx: &Arc<Context<C>>) -> Result<Self> {
        if ctx.degree != self.ctx.degree {
            return Err(Error::InvalidContext);
        }
        Ok(Self {
            ctx: ctx.clone(),
            coefficients: self
                .coefficients
                .iter()
                .map(|c| c.rem_euclid_ref(&ctx.q))
                .collect(),
        })
    }

    /// Move the polynomial to another context of the same degree, keeping the
    /// centered representatives.
    pub fn switch_context_centered(&self, ctx: &Arc<Context<C>>) -> Result<Self> {
        if ctx.degree != self.ctx.degree {
            return Err(Error::InvalidContext);
        }
        Self::from_coefficients(&self.signed_coefficients(), ctx)
    }

    /// Decompose the polynomial in base 2^log_base, returning the digits from
    /// the least significant one. The number of digits is the smallest `l`
    /// such that 2^(l * log_base) >= q.
    pub fn decompose(&self, log_base: usize) -> Result<Vec<Self>> {
        if log_base == 0 {
            return Err(Error::Default("The base must be at least 2".to_string()));
        }
        let base = C::from_biguint(&(BigUint::from(1u64) << log_base))
            .ok_or_else(|| Error::Default("The base does not fit".to_string()))?;
        let num_digits = self.ctx.coefficient_bits().div_ceil(log_base);

        let mut rests = self.coefficients.to_vec();
        let mut digits = Vec::with_capacity(num_digits);
        for _ in 0..num_digits {
            let mut digit = Self::zero(&self.ctx);
            izip!(digit.coefficients.iter_mut(), rests.iter_mut()).for_each(|(d, r)| {
                let (quotient, remainder) = r.div_rem_euclid_ref(&base);
                *d = remainder.rem_euclid_ref(&self.ctx.q);
                *r = quotient;
            });
            digits.push(digit);
        }
        Ok(digits)
    }
}

impl<C: Coefficient> Serialize for Poly<C> {
    /// Packs the coefficients on `ceil(log2(q))` bits each, little-endian.
    fn to_bytes(&self) -> Vec<u8> {
        let width = self.ctx.coefficient_bits();
        let mut bytes = vec![0u8; (self.ctx.degree * width).div_ceil(8)];
        let mut position = 0usize;
        for c in self.coefficients.iter() {
            let magnitude = c.to_bigint().magnitude().clone();
            for bit in 0..width as u64 {
                if magnitude.bit(bit) {
                    bytes[position / 8] |= 1 << (position % 8);
                }
                position += 1;
            }
        }
        bytes
    }
}

impl<C: Coefficient> DeserializeWithContext for Poly<C> {
    type Error = Error;
    type Context = Context<C>;

    fn from_bytes(bytes: &[u8], ctx: &Arc<Context<C>>) -> Result<Self> {
        let width = ctx.coefficient_bits();
        if bytes.len() != (ctx.degree * width).div_ceil(8) {
            return Err(Error::Serialization(format!(
                "Expected {} bytes, found {}",
                (ctx.degree * width).div_ceil(8),
                bytes.len()
            )));
        }
        let mut coefficients = Vec::with_capacity(ctx.degree);
        let mut position = 0usize;
        for _ in 0..ctx.degree {
            let mut value = BigUint::default();
            for bit in 0..width as u64 {
                if (bytes[position / 8] >> (position % 8)) & 1 == 1 {
                    value.set_bit(bit, true);
                }
                position += 1;
            }
            if &value >= ctx.modulus() {
                return Err(Error::Serialization(
                    "Coefficient larger than the modulus".to_string(),
                ));
            }
            coefficients.push(
                C::from_biguint(&value)
                    .ok_or_else(|| Error::Serialization("Invalid coefficient".to_string()))?,
            );
        }
        Ok(Self {
            ctx: ctx.clone(),
            coefficients: coefficients.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, Poly};
    use crate::Coefficient;
    use itertools::Itertools;
    use num_bigint::{BigInt, BigUint};
    use proptest::prelude::*;
    use rand::{thread_rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use ringhe_traits::{DeserializeWithContext, Serialize};
    use ringhe_util::ErrorDistribution;
    use std::{error::Error, sync::Arc};

    fn contexts() -> Vec<Arc<Context>> {
        [
            (BigUint::from(1153u64), 8),
            (BigUint::from(64u64), 16),
            ((BigUint::from(1u64) << 100) + 277u64, 16),
        ]
        .iter()
        .map(|(q, n)| Context::new_arc(q, *n).unwrap())
        .collect_vec()
    }

    /// Negacyclic product computed without any reduction, as a reference.
    fn reference_mul(a: &[i64], b: &[i64]) -> Vec<BigInt> {
        let n = a.len();
        let mut out = vec![BigInt::from(0); n];
        for i in 0..n {
            for j in 0..n {
                let p = BigInt::from(a[i]) * b[j];
                if i + j < n {
                    out[i + j] += p;
                } else {
                    out[i + j - n] -= p;
                }
            }
        }
        out
    }

    #[test]
    fn constructors() -> Result<(), Box<dyn Error>> {
        for ctx in contexts() {
            let p = Poly::zero(&ctx);
            assert!(p.is_zero());
            assert_eq!(p.coefficients().len(), ctx.degree);

            let p = Poly::from_i64(&[-1, 2], &ctx)?;
            let q = BigInt::from(ctx.modulus().clone());
            assert_eq!(p.coefficients()[0], &q - 1);
            assert_eq!(p.coefficients()[1], BigInt::from(2));
            assert_eq!(p.signed_coefficients()[0], BigInt::from(-1));
            assert_eq!(p.norm_inf(), BigUint::from(2u64));

            assert!(Poly::from_i64(&vec![0; ctx.degree + 1], &ctx).is_err());
        }
        Ok(())
    }

    #[test]
    fn random_is_reduced() {
        let mut rng = thread_rng();
        for ctx in contexts() {
            let p = Poly::random(&ctx, &mut rng);
            let q = BigInt::from(ctx.modulus().clone());
            assert!(p.coefficients().iter().all(|c| c >= &BigInt::from(0) && c < &q));

            let e = Poly::small(&ctx, &ErrorDistribution::default(), &mut rng).unwrap();
            assert!(e.norm_inf() <= BigUint::from(18u64) || ctx.modulus() < &BigUint::from(37u64));
        }
    }

    #[test]
    fn monomials() -> Result<(), Box<dyn Error>> {
        for ctx in contexts() {
            let n = ctx.degree;
            let x_n = Poly::monomial(&ctx, n);
            assert_eq!(x_n, -&Poly::from_i64(&[1], &ctx)?);
            assert_eq!(Poly::monomial(&ctx, 2 * n), Poly::from_i64(&[1], &ctx)?);

            let mut rng = thread_rng();
            let p = Poly::random(&ctx, &mut rng);
            for e in [0, 1, n - 1, n, n + 3, 2 * n - 1, 5 * n + 1] {
                assert_eq!(p.mul_monomial(e), &p * &Poly::monomial(&ctx, e));
            }
        }
        Ok(())
    }

    #[test]
    fn substitution() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for ctx in contexts() {
            let n = ctx.degree;
            let a = Poly::random(&ctx, &mut rng);
            let b = Poly::random(&ctx, &mut rng);
            assert!(a.substitute(2).is_err());
            assert_eq!(a.substitute(1)?, a);
            assert_eq!(a.substitute(2 * n + 1)?, a);
            for k in (3..2 * n).step_by(2) {
                // Ring homomorphism.
                assert_eq!((&a * &b).substitute(k)?, &a.substitute(k)? * &b.substitute(k)?);
                assert_eq!((&a + &b).substitute(k)?, &a.substitute(k)? + &b.substitute(k)?);
                // Composition.
                for l in (1..2 * n).step_by(2) {
                    assert_eq!(
                        a.substitute(k)?.substitute(l)?,
                        a.substitute((k * l) % (2 * n))?
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn switch_context() -> Result<(), Box<dyn Error>> {
        let small = Context::<BigInt>::new_arc(&BigUint::from(64u64), 16)?;
        let large = Context::<BigInt>::new_arc(&(BigUint::from(64u64) << 30), 16)?;
        let p = Poly::from_i64(&[-1, 63, 64, 65], &large)?;
        let reduced = p.switch_context(&small)?;
        assert_eq!(reduced, Poly::from_i64(&[-1, 63, 0, 1], &small)?);

        let lifted = reduced.switch_context(&large)?;
        assert_eq!(lifted, Poly::from_i64(&[63, 63, 0, 1], &large)?);
        let lifted = reduced.switch_context_centered(&large)?;
        assert_eq!(lifted, Poly::from_i64(&[-1, -1, 0, 1], &large)?);

        let other = Context::<BigInt>::new_arc(&BigUint::from(64u64), 8)?;
        assert!(p.switch_context(&other).is_err());
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for ctx in contexts() {
            let p = Poly::random(&ctx, &mut rng);
            let bytes = p.to_bytes();
            assert_eq!(bytes.len(), (ctx.degree * ctx.coefficient_bits()).div_ceil(8));
            assert_eq!(Poly::from_bytes(&bytes, &ctx)?, p);
            assert!(Poly::<BigInt>::from_bytes(&bytes[1..], &ctx).is_err());
        }
        Ok(())
    }

    #[test]
    fn exact_and_machine_coefficients_agree() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let q = BigUint::from(4611686018326724609u64);
        let ctx = Context::<BigInt>::new_arc(&q, 16)?;
        let ctx_i128 = Context::<i128>::new_arc(&q, 16)?;
        for _ in 0..20 {
            let a = Poly::random(&ctx, &mut rng);
            let b = Poly::random(&ctx, &mut rng);
            let a_i128 = Poly::from_bigints(&a.to_bigints(), &ctx_i128)?;
            let b_i128 = Poly::from_bigints(&b.to_bigints(), &ctx_i128)?;
            assert_eq!((&a * &b).to_bigints(), (&a_i128 * &b_i128).to_bigints());
            assert_eq!((&a - &b).to_bigints(), (&a_i128 - &b_i128).to_bigints());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn negacyclic_mul(a in prop::collection::vec(-1000i64..1000, 8),
                          b in prop::collection::vec(-1000i64..1000, 8)) {
            let ctx = Context::<BigInt>::new_arc(&BigUint::from(1153u64), 8).unwrap();
            let pa = Poly::from_i64(&a, &ctx).unwrap();
            let pb = Poly::from_i64(&b, &ctx).unwrap();
            let expected = Poly::from_bigints(&reference_mul(&a, &b), &ctx).unwrap();
            prop_assert_eq!(&pa * &pb, expected);
        }

        #[test]
        fn decomposition_recomposes(log_base in 1usize..20, seed: u64) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let ctx = Context::<BigInt>::new_arc(&((BigUint::from(1u64) << 70) + 25u64), 8).unwrap();
            let p = Poly::random(&ctx, &mut rng);
            let digits = p.decompose(log_base).unwrap();
            prop_assert_eq!(digits.len(), 71usize.div_ceil(log_base));
            let mut sum = Poly::zero(&ctx);
            for (j, d) in digits.iter().enumerate() {
                prop_assert!(d.norm_inf() < BigUint::from(1u64) << log_base);
                sum += &d.scalar_mul(&BigInt::from(BigUint::from(1u64) << (j * log_base)));
            }
            prop_assert_eq!(sum, p);
        }

        #[test]
        fn i128_scalar_mul(c in 0i64..1153, s: i64) {
            let ctx = Context::<i128>::new_arc(&BigUint::from(1153u64), 8).unwrap();
            let p = Poly::from_i64(&[c], &ctx).unwrap().scalar_mul(&(s as i128));
            prop_assert_eq!(p.coefficients()[0], (c as i128 * s as i128).rem_euclid(1153));
            prop_assert_eq!(Coefficient::bits(&p.coefficients()[1]), 0);
        }
    }
}
