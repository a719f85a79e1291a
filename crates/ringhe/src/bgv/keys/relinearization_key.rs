//! Relinearization for the BGV encryption scheme
//!
//! A product of two ciphertexts `(b1, a1)` and `(b2, a2)` is a quadratic
//! ciphertext `(d0, d1, d2)` with phase `d0 - s * d1 + s^2 * d2`. The
//! relinearization key is a key switching key from `s^2` to `s`: switching
//! the `d2` term yields an encryption of `d2 * s^2` under `s`, which is added
//! to the linear part `(d0, d1)`.

use std::sync::Arc;

use crate::bgv::{
    BgvParameters, Ciphertext, KeySwitchingKey, MultiplicationStrategy, QuadraticCiphertext,
    SecretKey,
};
use crate::{Error, Result};
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// A relinearization key, i.e. a key switching key from s^2 to s.
#[derive(Debug, PartialEq, Clone)]
pub struct RelinearizationKey {
    pub(crate) ksk: KeySwitchingKey,
}

impl RelinearizationKey {
    /// Generate a [`RelinearizationKey`] from a [`SecretKey`].
    #[instrument(skip_all)]
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let s = sk.poly(&sk.par.ctx_bootstrapping)?;
        let s2 = Zeroizing::new(s.as_ref() * s.as_ref());
        let ksk = KeySwitchingKey::new(sk, &s2, rng)?;
        debug!(digits = ksk.keys.len(), "generated relinearization key");
        Ok(Self { ksk })
    }
}

impl MultiplicationStrategy for RelinearizationKey {
    fn parameters(&self) -> &Arc<BgvParameters> {
        &self.ksk.par
    }

    /// Computes `(d0, d1) + KS(d2)`.
    fn relinearize(&self, ct: &QuadraticCiphertext) -> Result<Ciphertext> {
        if ct.par != self.ksk.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let c2 = self.ksk.key_switch(&ct.d2)?;
        Ciphertext::new(&ct.d0 + &c2.body, &ct.d1 + &c2.mask, &ct.par)
    }
}
