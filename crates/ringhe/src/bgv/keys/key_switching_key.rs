//! Key-switching keys for the BGV encryption scheme

use crate::bgv::{BgvParameters, Ciphertext};
use crate::{Error, Result};
use itertools::izip;
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use ringhe_math::rq::Poly;
use std::sync::Arc;
use zeroize::Zeroizing;

use super::SecretKey;

/// Key switching key for the BGV encryption scheme.
///
/// Holds the encryptions `Enc_s(w^j * s')` at the bootstrapping modulus, for
/// the gadget base `w = 2^decomposition_log_base`, and switches encryptions
/// under `s'` into encryptions under `s`.
#[derive(Debug, PartialEq, Clone)]
pub struct KeySwitchingKey {
    /// The parameters of the underlying BGV encryption scheme.
    pub(crate) par: Arc<BgvParameters>,

    /// The encryptions of the scaled input key.
    pub(crate) keys: Vec<Ciphertext>,
}

impl KeySwitchingKey {
    /// Generate a [`KeySwitchingKey`] to switch from the secret polynomial
    /// `from` (at the bootstrapping modulus) to the secret key `sk`.
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, from: &Poly, rng: &mut R) -> Result<Self> {
        let par = &sk.par;
        if from.ctx() != &par.ctx_bootstrapping {
            return Err(Error::DefaultError(
                "Incorrect context for the input key".to_string(),
            ));
        }

        let keys = (0..par.key_switching_digits())
            .map(|j| {
                let power = BigInt::from(1u64) << (j * par.decomposition_log_base);
                let scaled = Zeroizing::new(from.scalar_mul(&power));
                sk.encrypt_poly(scaled.as_ref(), rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            par: par.clone(),
            keys,
        })
    }

    /// Compute an encryption of `p * s'` under `s`, at the context of `p`.
    pub fn key_switch(&self, p: &Poly) -> Result<Ciphertext> {
        let ctx = p.ctx();
        let digits = p.decompose(self.par.decomposition_log_base)?;
        if digits.len() > self.keys.len() {
            return Err(Error::TooManyValues(digits.len(), self.keys.len()));
        }

        let mut out = Ciphertext::zero(ctx, &self.par)?;
        for (digit, key) in izip!(digits.iter(), self.keys.iter()) {
            let key = key.reduce_to(ctx)?;
            out.body += &(digit * &key.body);
            out.mask += &(digit * &key.mask);
        }
        Ok(out)
    }

    /// Switch a ciphertext encrypted under `s'` into a ciphertext encrypting
    /// the same message under `s`.
    pub fn switch(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let switched = self.key_switch(&ct.mask)?;
        Ciphertext::new(&ct.body - &switched.body, -&switched.mask, &self.par)
    }
}
