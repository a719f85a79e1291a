//! Ciphertext type in the BGV encryption scheme.

use crate::bgv::{BgvParameters, Plaintext};
use crate::{Error, Result};
use num_bigint::BigInt;
use ringhe_math::rq::{Context, Poly};
use ringhe_traits::{
    DeserializeParametrized, DeserializeWithContext, FheCiphertext, FheParametrized, Serialize,
};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::sync::Arc;

/// A ciphertext encrypting a plaintext.
///
/// The ciphertext is a pair `(body, mask)` of polynomials of the same
/// context, such that `body - s * mask = m + t * e` for the secret key `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext {
    /// The parameters of the underlying BGV encryption scheme.
    pub(crate) par: Arc<BgvParameters>,

    /// The polynomial carrying the message.
    pub(crate) body: Poly,

    /// The polynomial multiplied by the secret key during decryption.
    pub(crate) mask: Poly,
}

impl Ciphertext {
    /// Create a ciphertext from its two polynomials, which must share a
    /// context compatible with the parameters.
    pub fn new(body: Poly, mask: Poly, par: &Arc<BgvParameters>) -> Result<Self> {
        if body.ctx() != mask.ctx() {
            return Err(Error::MathError(ringhe_math::Error::InvalidContext));
        }
        par.check_context(body.ctx())?;
        Ok(Self {
            par: par.clone(),
            body,
            mask,
        })
    }

    /// Generate the zero ciphertext at the given context.
    pub fn zero(ctx: &Arc<Context>, par: &Arc<BgvParameters>) -> Result<Self> {
        Self::new(Poly::zero(ctx), Poly::zero(ctx), par)
    }

    /// Generate the trivial (noiseless) encryption of a polynomial, i.e. the
    /// pair `(p, 0)`.
    pub fn trivial(p: &Poly, par: &Arc<BgvParameters>) -> Result<Self> {
        Self::new(p.clone(), Poly::zero(p.ctx()), par)
    }

    /// Generate the trivial encryption of a plaintext at the given context.
    pub fn trivial_plaintext(
        pt: &Plaintext,
        ctx: &Arc<Context>,
        par: &Arc<BgvParameters>,
    ) -> Result<Self> {
        Self::trivial(&pt.to_poly(ctx)?, par)
    }

    /// The polynomial context (ring degree and modulus) of the ciphertext.
    pub fn ctx(&self) -> &Arc<Context> {
        self.body.ctx()
    }

    /// The BGV parameters of the ciphertext.
    pub fn parameters(&self) -> &Arc<BgvParameters> {
        &self.par
    }

    /// The body polynomial.
    pub fn body(&self) -> &Poly {
        &self.body
    }

    /// The mask polynomial.
    pub fn mask(&self) -> &Poly {
        &self.mask
    }

    /// Checks that two ciphertexts can be combined.
    pub(crate) fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.par != other.par {
            Err(Error::ArithmeticPrecondition(
                "Ciphertexts with different parameters".to_string(),
            ))
        } else if self.ctx() != other.ctx() {
            Err(Error::ArithmeticPrecondition(format!(
                "Ciphertexts with different moduli: {} and {}",
                self.ctx().modulus(),
                other.ctx().modulus()
            )))
        } else {
            Ok(())
        }
    }

    fn check_poly(&self, p: &Poly) -> Result<()> {
        if self.ctx() != p.ctx() {
            Err(Error::ArithmeticPrecondition(format!(
                "Polynomial modulus {} does not match the ciphertext modulus {}",
                p.ctx().modulus(),
                self.ctx().modulus()
            )))
        } else {
            Ok(())
        }
    }

    /// Add two ciphertexts.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            par: self.par.clone(),
            body: &self.body + &other.body,
            mask: &self.mask + &other.mask,
        })
    }

    /// Subtract two ciphertexts.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            par: self.par.clone(),
            body: &self.body - &other.body,
            mask: &self.mask - &other.mask,
        })
    }

    /// Add a public plaintext.
    pub fn add_plain(&self, pt: &Plaintext) -> Result<Self> {
        if self.par != pt.par {
            return Err(Error::ArithmeticPrecondition(
                "Plaintext with different parameters".to_string(),
            ));
        }
        Ok(Self {
            par: self.par.clone(),
            body: &self.body + &pt.to_poly(self.ctx())?,
            mask: self.mask.clone(),
        })
    }

    /// Subtract a public plaintext.
    pub fn sub_plain(&self, pt: &Plaintext) -> Result<Self> {
        self.add_plain(&-pt)
    }

    /// Multiply both polynomials by an integer.
    pub fn scalar_mul(&self, k: &BigInt) -> Self {
        Self {
            par: self.par.clone(),
            body: self.body.scalar_mul(k),
            mask: self.mask.scalar_mul(k),
        }
    }

    /// Multiply both polynomials by a public polynomial of the same context.
    pub fn mul_poly(&self, p: &Poly) -> Result<Self> {
        self.check_poly(p)?;
        Ok(Self {
            par: self.par.clone(),
            body: &self.body * p,
            mask: &self.mask * p,
        })
    }

    /// Multiply both polynomials by the monomial x^exponent.
    pub fn mul_monomial(&self, exponent: usize) -> Self {
        Self {
            par: self.par.clone(),
            body: self.body.mul_monomial(exponent),
            mask: self.mask.mul_monomial(exponent),
        }
    }

    /// Substitute x by x^k in both polynomials. The result encrypts m(x^k)
    /// under the key s(x^k).
    pub fn substitute(&self, k: usize) -> Result<Self> {
        Ok(Self {
            par: self.par.clone(),
            body: self.body.substitute(k)?,
            mask: self.mask.substitute(k)?,
        })
    }

    /// Tensor two ciphertexts, producing a ciphertext whose phase is
    /// `d0 - s * d1 + s^2 * d2`.
    pub fn tensor(&self, other: &Self) -> Result<QuadraticCiphertext> {
        self.check_compatible(other)?;
        let d0 = &self.body * &other.body;
        let d1 = &(&self.body * &other.mask) + &(&self.mask * &other.body);
        let d2 = &self.mask * &other.mask;
        Ok(QuadraticCiphertext {
            par: self.par.clone(),
            d0,
            d1,
            d2,
        })
    }

    /// Reduce the ciphertext to a context whose modulus divides the current
    /// modulus.
    pub fn reduce_to(&self, ctx: &Arc<Context>) -> Result<Self> {
        if !self.ctx().is_multiple_of(ctx) {
            return Err(Error::ArithmeticPrecondition(format!(
                "Cannot reduce from modulus {} to modulus {}",
                self.ctx().modulus(),
                ctx.modulus()
            )));
        }
        Self::new(
            self.body.switch_context(ctx)?,
            self.mask.switch_context(ctx)?,
            &self.par,
        )
    }

    /// Lift the ciphertext to a context whose modulus is a multiple of the
    /// current modulus, keeping the representatives in [0, q).
    pub fn lift_to(&self, ctx: &Arc<Context>) -> Result<Self> {
        if !ctx.is_multiple_of(self.ctx()) {
            return Err(Error::ArithmeticPrecondition(format!(
                "Cannot lift from modulus {} to modulus {}",
                self.ctx().modulus(),
                ctx.modulus()
            )));
        }
        Self::new(
            self.body.switch_context(ctx)?,
            self.mask.switch_context(ctx)?,
            &self.par,
        )
    }
}

impl AddAssign<&Ciphertext> for Ciphertext {
    fn add_assign(&mut self, rhs: &Ciphertext) {
        assert_eq!(self.par, rhs.par);
        self.body += &rhs.body;
        self.mask += &rhs.mask;
    }
}

impl Add<&Ciphertext> for &Ciphertext {
    type Output = Ciphertext;

    fn add(self, rhs: &Ciphertext) -> Ciphertext {
        let mut self_clone = self.clone();
        self_clone += rhs;
        self_clone
    }
}

impl SubAssign<&Ciphertext> for Ciphertext {
    fn sub_assign(&mut self, rhs: &Ciphertext) {
        assert_eq!(self.par, rhs.par);
        self.body -= &rhs.body;
        self.mask -= &rhs.mask;
    }
}

impl Sub<&Ciphertext> for &Ciphertext {
    type Output = Ciphertext;

    fn sub(self, rhs: &Ciphertext) -> Ciphertext {
        let mut self_clone = self.clone();
        self_clone -= rhs;
        self_clone
    }
}

impl Neg for &Ciphertext {
    type Output = Ciphertext;

    fn neg(self) -> Ciphertext {
        Ciphertext {
            par: self.par.clone(),
            body: -&self.body,
            mask: -&self.mask,
        }
    }
}

impl FheParametrized for Ciphertext {
    type Parameters = BgvParameters;
}

impl FheCiphertext for Ciphertext {}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.ctx().to_bytes();
        bytes.extend(self.body.to_bytes());
        bytes.extend(self.mask.to_bytes());
        bytes
    }
}

impl DeserializeParametrized for Ciphertext {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<BgvParameters>) -> Result<Self> {
        let (header, read) =
            Context::<BigInt>::from_header(bytes).map_err(|_| Error::SerializationError)?;
        if header.degree != par.degree() {
            return Err(Error::SerializationError);
        }
        let ctx = par
            .context_for(header.modulus())
            .map_err(|_| Error::SerializationError)?;
        let poly_size = (ctx.degree * ctx.coefficient_bits()).div_ceil(8);
        if bytes.len() != read + 2 * poly_size {
            return Err(Error::SerializationError);
        }
        let body = Poly::from_bytes(&bytes[read..read + poly_size], &ctx)
            .map_err(|_| Error::SerializationError)?;
        let mask = Poly::from_bytes(&bytes[read + poly_size..], &ctx)
            .map_err(|_| Error::SerializationError)?;
        Self::new(body, mask, par)
    }
}

/// The result of a tensor product, a ciphertext of degree 2 in the secret
/// key, to be relinearized.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticCiphertext {
    pub(crate) par: Arc<BgvParameters>,
    pub(crate) d0: Poly,
    pub(crate) d1: Poly,
    pub(crate) d2: Poly,
}

impl QuadraticCiphertext {
    /// The polynomial context of the ciphertext.
    pub fn ctx(&self) -> &Arc<Context> {
        self.d0.ctx()
    }

    /// The three polynomials (d0, d1, d2).
    pub fn polynomials(&self) -> [&Poly; 3] {
        [&self.d0, &self.d1, &self.d2]
    }
}
