//! Public keys for the BGV encryption scheme

use crate::bgv::{BgvParameters, Ciphertext, Plaintext};
use crate::{Error, Result};
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use ringhe_math::rq::{Context, Poly};
use ringhe_traits::{DeserializeParametrized, FheEncrypter, FheParametrized, Serialize};
use std::sync::Arc;
use tracing::instrument;
use zeroize::Zeroizing;

use super::SecretKey;

/// Public key for the BGV encryption scheme: an encryption of zero at the
/// bootstrapping modulus.
#[derive(Debug, PartialEq, Clone)]
pub struct PublicKey {
    /// The BGV parameters
    pub par: Arc<BgvParameters>,
    /// The public key ciphertext
    pub c: Ciphertext,
}

impl PublicKey {
    /// Generate a new [`PublicKey`] from a [`SecretKey`].
    #[instrument(skip_all)]
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let zero = Poly::zero(&sk.par.ctx_bootstrapping);
        let c = sk.encrypt_poly(&zero, rng)?;
        Ok(Self {
            par: sk.par.clone(),
            c,
        })
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
        let pk = self.c.reduce_to(ctx)?;
        let t = BigInt::from(self.par.plaintext());

        let u = Zeroizing::new(Poly::ternary(ctx, rng)?);
        let e_a = Zeroizing::new(Poly::small(ctx, &self.par.error_distribution, rng)?.scalar_mul(&t));
        let e_b = Zeroizing::new(Poly::small(ctx, &self.par.error_distribution, rng)?.scalar_mul(&t));
        let m = Zeroizing::new(pt.to_poly(ctx)?);

        let mut body = &pk.body * u.as_ref();
        body += e_a.as_ref();
        body += m.as_ref();
        let mut mask = &pk.mask * u.as_ref();
        mask += e_b.as_ref();

        Ciphertext::new(body, mask, &self.par)
    }
}

impl FheParametrized for PublicKey {
    type Parameters = BgvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for PublicKey {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.try_encrypt_at(pt, &self.par.ctx, rng)
    }
}

impl Serialize for PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.c.to_bytes()
    }
}

impl DeserializeParametrized for PublicKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let c = Ciphertext::from_bytes(bytes, par)?;
        if c.ctx() != &par.ctx_bootstrapping {
            return Err(Error::SerializationError);
        }
        Ok(Self {
            par: par.clone(),
            c,
        })
    }
}
