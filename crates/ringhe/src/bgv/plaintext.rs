//! Plaintext type in the BGV encryption scheme.

use crate::bgv::BgvParameters;
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use ringhe_math::rq::{Context, Poly};
use ringhe_traits::{FheDecoder, FheEncoder, FheParametrized, FhePlaintext};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;
use zeroize::Zeroize;

/// A plaintext object, a polynomial with coefficients reduced modulo the
/// plaintext modulus t.
#[derive(Debug, Clone)]
pub struct Plaintext {
    /// The parameters of the underlying BGV encryption scheme.
    pub(crate) par: Arc<BgvParameters>,
    /// The coefficients, in [0, t).
    pub(crate) value: Box<[u64]>,
}

impl FheParametrized for Plaintext {
    type Parameters = BgvParameters;
}

impl FhePlaintext for Plaintext {}

impl Zeroize for Plaintext {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

impl PartialEq for Plaintext {
    fn eq(&self, other: &Self) -> bool {
        self.par == other.par && self.value == other.value
    }
}

impl Plaintext {
    /// Generate a zero plaintext.
    pub fn zero(par: &Arc<BgvParameters>) -> Self {
        Self {
            par: par.clone(),
            value: vec![0u64; par.degree()].into_boxed_slice(),
        }
    }

    /// Generate the plaintext holding the constant `value` mod t.
    pub fn constant(value: u64, par: &Arc<BgvParameters>) -> Self {
        let mut pt = Self::zero(par);
        pt.value[0] = value % par.plaintext();
        pt
    }

    /// The coefficients of the plaintext, in [0, t).
    pub fn value(&self) -> &[u64] {
        &self.value
    }

    /// Embed the plaintext coefficients in a polynomial of the given context.
    pub(crate) fn to_poly(&self, ctx: &Arc<Context>) -> Result<Poly> {
        Ok(Poly::from_u64(&self.value, ctx)?)
    }

    /// Read a plaintext from a polynomial, taking the centered
    /// representatives of its coefficients modulo t.
    pub(crate) fn from_poly(p: &Poly, par: &Arc<BgvParameters>) -> Result<Self> {
        let t = BigInt::from(par.plaintext());
        let value = p
            .signed_coefficients()
            .iter()
            .map(|c| {
                let r = c % &t;
                let r = if r < BigInt::from(0) { r + &t } else { r };
                r.to_u64()
                    .ok_or_else(|| Error::DefaultError("Invalid plaintext coefficient".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            par: par.clone(),
            value: value.into_boxed_slice(),
        })
    }

    fn from_plaintext_poly(p: &Poly, par: &Arc<BgvParameters>) -> Result<Self> {
        let value = p
            .coefficients()
            .iter()
            .map(|c| {
                c.to_u64()
                    .ok_or_else(|| Error::DefaultError("Invalid plaintext coefficient".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            par: par.clone(),
            value: value.into_boxed_slice(),
        })
    }

    fn binary_op(&self, other: &Self, op: impl Fn(&Poly, &Poly) -> Poly) -> Result<Self> {
        if self.par != other.par {
            return Err(Error::ArithmeticPrecondition(
                "Plaintexts with different parameters".to_string(),
            ));
        }
        let ctx = &self.par.ctx_plaintext;
        let p = op(&self.to_poly(ctx)?, &other.to_poly(ctx)?);
        Self::from_plaintext_poly(&p, &self.par)
    }

    /// Multiply two plaintexts in Z_t[x]/(x^n + 1).
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.binary_op(other, |a, b| a * b)
    }

    /// Add two plaintexts.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.binary_op(other, |a, b| a + b)
    }

    /// Subtract two plaintexts.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.binary_op(other, |a, b| a - b)
    }

    /// Apply the automorphism x -> x^k to the plaintext.
    pub fn substitute(&self, k: usize) -> Result<Self> {
        let p = self.to_poly(&self.par.ctx_plaintext)?.substitute(k)?;
        Self::from_plaintext_poly(&p, &self.par)
    }
}

impl Add<&Plaintext> for &Plaintext {
    type Output = Plaintext;

    fn add(self, rhs: &Plaintext) -> Plaintext {
        assert_eq!(self.par, rhs.par, "Incompatible parameters");
        let t = self.par.plaintext();
        Plaintext {
            par: self.par.clone(),
            value: self
                .value
                .iter()
                .zip(rhs.value.iter())
                .map(|(a, b)| (a + b) % t)
                .collect(),
        }
    }
}

impl Sub<&Plaintext> for &Plaintext {
    type Output = Plaintext;

    fn sub(self, rhs: &Plaintext) -> Plaintext {
        self + &(-rhs)
    }
}

impl Neg for &Plaintext {
    type Output = Plaintext;

    fn neg(self) -> Plaintext {
        let t = self.par.plaintext();
        Plaintext {
            par: self.par.clone(),
            value: self.value.iter().map(|a| (t - a) % t).collect(),
        }
    }
}

impl Mul<&Plaintext> for &Plaintext {
    type Output = Plaintext;

    fn mul(self, rhs: &Plaintext) -> Plaintext {
        assert_eq!(self.par, rhs.par, "Incompatible parameters");
        let t = self.par.plaintext() as u128;
        let n = self.par.degree();
        let mut out = vec![0u128; n];
        for (i, a) in self.value.iter().enumerate() {
            for (j, b) in rhs.value.iter().enumerate() {
                let p = (*a as u128 * *b as u128) % t;
                if i + j < n {
                    out[i + j] = (out[i + j] + p) % t;
                } else {
                    out[i + j - n] = (out[i + j - n] + t - p) % t;
                }
            }
        }
        Plaintext {
            par: self.par.clone(),
            value: out.into_iter().map(|c| c as u64).collect(),
        }
    }
}

impl FheEncoder<&[u64]> for Plaintext {
    type Error = Error;

    fn try_encode(value: &[u64], par: &Arc<BgvParameters>) -> Result<Self> {
        if value.len() > par.degree() {
            return Err(Error::TooManyValues(value.len(), par.degree()));
        }
        let mut pt = Self::zero(par);
        pt.value
            .iter_mut()
            .zip(value)
            .for_each(|(p, v)| *p = v % par.plaintext());
        Ok(pt)
    }
}

impl FheEncoder<&[i64]> for Plaintext {
    type Error = Error;

    fn try_encode(value: &[i64], par: &Arc<BgvParameters>) -> Result<Self> {
        if value.len() > par.degree() {
            return Err(Error::TooManyValues(value.len(), par.degree()));
        }
        let t = par.plaintext() as i128;
        let reduced = value
            .iter()
            .map(|v| (*v as i128).rem_euclid(t) as u64)
            .collect_vec();
        <Self as FheEncoder<&[u64]>>::try_encode(reduced.as_slice(), par)
    }
}

impl FheDecoder<Plaintext> for Vec<u64> {
    type Error = Error;

    fn try_decode(pt: &Plaintext) -> Result<Self> {
        Ok(pt.value.to_vec())
    }
}

impl FheDecoder<Plaintext> for Vec<i64> {
    type Error = Error;

    /// Decodes to the centered representatives in (-t/2, t/2].
    fn try_decode(pt: &Plaintext) -> Result<Self> {
        let t = pt.par.plaintext();
        Ok(pt
            .value
            .iter()
            .map(|v| {
                if *v > t / 2 {
                    -((t - v) as i64)
                } else {
                    *v as i64
                }
            })
            .collect())
    }
}
