//! Secret keys for the BGV encryption scheme

use crate::bgv::{BgvParameters, Ciphertext, Plaintext, QuadraticCiphertext};
use crate::{Error, Result};
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use ringhe_math::rq::{Context, Poly};
use ringhe_traits::{FheDecrypter, FheEncrypter, FheParametrized};
use ringhe_util::sample_vec_ternary_with_weight;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret key for the BGV encryption scheme.
#[derive(Debug, PartialEq, Clone)]
pub struct SecretKey {
    /// The BGV parameters
    pub(crate) par: Arc<BgvParameters>,
    /// The secret key coefficients, in {-1, 0, 1}
    pub coeffs: Box<[i64]>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl SecretKey {
    /// Generate a random ternary [`SecretKey`] with at least `secret_weight`
    /// non-zero coefficients.
    pub fn random<R: RngCore + CryptoRng>(par: &Arc<BgvParameters>, rng: &mut R) -> Result<Self> {
        let coeffs = Zeroizing::new(sample_vec_ternary_with_weight(
            par.degree(),
            par.secret_weight(),
            rng,
        ));
        Self::new(coeffs.to_vec(), par)
    }

    /// Generate a [`SecretKey`] from its coefficients, which must be ternary.
    pub fn new(coeffs: Vec<i64>, par: &Arc<BgvParameters>) -> Result<Self> {
        if coeffs.len() != par.degree() {
            return Err(Error::DefaultError(format!(
                "Expected {} coefficients, found {}",
                par.degree(),
                coeffs.len()
            )));
        }
        if coeffs.iter().any(|c| c.abs() > 1) {
            return Err(Error::DefaultError(
                "Secret key coefficients must be in {-1, 0, 1}".to_string(),
            ));
        }
        Ok(Self {
            par: par.clone(),
            coeffs: coeffs.into_boxed_slice(),
        })
    }

    /// The secret key as a polynomial of the given context.
    pub(crate) fn poly(&self, ctx: &Arc<Context>) -> Result<Zeroizing<Poly>> {
        Ok(Zeroizing::new(Poly::from_i64(&self.coeffs, ctx)?))
    }

    /// The phase `body - s * mask` of a ciphertext.
    pub fn phase(&self, ct: &Ciphertext) -> Result<Poly> {
        if self.par != ct.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let s = self.poly(ct.ctx())?;
        Ok(&ct.body - &(&ct.mask * s.as_ref()))
    }

    /// The phase `d0 - s * d1 + s^2 * d2` of a quadratic ciphertext.
    pub fn phase_quadratic(&self, ct: &QuadraticCiphertext) -> Result<Poly> {
        if self.par != ct.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let s = self.poly(ct.ctx())?;
        let s2 = Zeroizing::new(s.as_ref() * s.as_ref());
        Ok(&(&ct.d0 - &(&ct.d1 * s.as_ref())) + &(&ct.d2 * s2.as_ref()))
    }

    /// Measure the noise in a [`Ciphertext`], i.e. the number of bits of the
    /// infinity norm of `phase - m`.
    pub fn measure_noise(&self, ct: &Ciphertext) -> Result<usize> {
        let plaintext = Zeroizing::new(self.try_decrypt(ct)?);
        let m = Zeroizing::new(plaintext.to_poly(ct.ctx())?);
        let noise = Zeroizing::new(&self.phase(ct)? - m.as_ref());
        Ok(noise.norm_inf().bits() as usize)
    }

    /// Encrypt a polynomial under the secret key, at the context of the
    /// polynomial.
    pub(crate) fn encrypt_poly<R: RngCore + CryptoRng>(
        &self,
        p: &Poly,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let ctx = p.ctx();
        self.par.check_context(ctx)?;
        let s = self.poly(ctx)?;

        let mask = Poly::random(ctx, rng);
        let e = Zeroizing::new(
            Poly::small(ctx, &self.par.error_distribution, rng)?
                .scalar_mul(&BigInt::from(self.par.plaintext())),
        );
        let mut body = &mask * s.as_ref();
        body += e.as_ref();
        body += p;

        Ciphertext::new(body, mask, &self.par)
    }

    /// Encrypt a plaintext at a given context, whose modulus must divide the
    /// bootstrapping modulus.
    pub fn try_encrypt_at<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        ctx: &Arc<Context>,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if self.par != pt.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let m = Zeroizing::new(pt.to_poly(ctx)?);
        self.encrypt_poly(m.as_ref(), rng)
    }
}

impl FheParametrized for SecretKey {
    type Parameters = BgvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.try_encrypt_at(pt, &self.par.ctx, rng)
    }
}

impl FheDecrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if self.par != ct.par {
            Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ))
        } else {
            let phase = Zeroizing::new(self.phase(ct)?);
            Plaintext::from_poly(&phase, &self.par)
        }
    }
}
