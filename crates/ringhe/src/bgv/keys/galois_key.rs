//! Galois keys for the BGV encryption scheme

use std::collections::HashMap;
use std::sync::Arc;

use crate::bgv::{BgvParameters, Ciphertext, KeySwitchingKey, SecretKey};
use crate::{Error, ParametersError, Result};
use itertools::Itertools;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// Galois key for the BGV encryption scheme.
/// A Galois key is a special type of key switching key, which switches from
/// `s(x^k)` to `s(x)` where `s(x)` is the secret key.
#[derive(Debug, PartialEq, Clone)]
pub struct GaloisKey {
    pub(crate) element: usize,
    pub(crate) ksk: KeySwitchingKey,
}

impl GaloisKey {
    /// Generate a [`GaloisKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, element: usize, rng: &mut R) -> Result<Self> {
        let element = normalize_element(element, sk.par.degree())?;
        let s = sk.poly(&sk.par.ctx_bootstrapping)?;
        let s_sub = Zeroizing::new(s.substitute(element)?);
        let ksk = KeySwitchingKey::new(sk, &s_sub, rng)?;
        Ok(Self { element, ksk })
    }

    /// The Galois element k, in [1, 2n).
    pub fn element(&self) -> usize {
        self.element
    }

    /// Relinearize a [`Ciphertext`] using the [`GaloisKey`]: the result
    /// encrypts m(x^k).
    pub fn apply(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        if ct.par != self.ksk.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let substituted = ct.substitute(self.element)?;
        self.ksk.switch(&substituted)
    }
}

/// Reduce a Galois element modulo 2n, rejecting even elements.
fn normalize_element(element: usize, degree: usize) -> Result<usize> {
    if element % 2 == 0 {
        return Err(Error::ParametersError(
            ParametersError::InvalidGaloisElement(element),
        ));
    }
    Ok(element % (2 * degree))
}

/// A set of Galois keys indexed by their element.
#[derive(Debug, PartialEq, Clone)]
pub struct AutomorphismKeys {
    pub(crate) par: Arc<BgvParameters>,
    keys: HashMap<usize, GaloisKey>,
}

impl AutomorphismKeys {
    /// Generate the Galois keys for the given elements. The keys are
    /// generated in parallel, each from its own generator seeded by `rng`.
    #[instrument(skip_all)]
    pub fn new<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        elements: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        let n = sk.par.degree();
        let elements = elements
            .iter()
            .map(|k| normalize_element(*k, n))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .filter(|k| *k != 1)
            .unique()
            .collect_vec();
        let seeds = elements
            .iter()
            .map(|_| {
                let mut seed = <ChaCha8Rng as SeedableRng>::Seed::default();
                rng.fill(&mut seed);
                seed
            })
            .collect_vec();

        let keys = elements
            .into_par_iter()
            .zip(seeds)
            .map(|(k, seed)| {
                let mut rng = ChaCha8Rng::from_seed(seed);
                GaloisKey::new(sk, k, &mut rng).map(|key| (k, key))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        debug!(count = keys.len(), "generated automorphism keys");

        Ok(Self {
            par: sk.par.clone(),
            keys,
        })
    }

    /// Generate the Galois keys for every non-trivial element of (Z/2nZ)*.
    pub fn all<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let elements = (3..2 * sk.par.degree()).step_by(2).collect_vec();
        Self::new(sk, &elements, rng)
    }

    /// Generate the Galois keys used by repacking, i.e. for the elements
    /// 2^l + 1 with 1 <= l <= log2(n).
    pub fn for_repacking<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        Self::new(sk, &repacking_elements(sk.par.degree()), rng)
    }

    /// Returns the Galois key for the element, if it exists.
    pub fn get(&self, element: usize) -> Option<&GaloisKey> {
        self.keys.get(&(element % (2 * self.par.degree())))
    }

    /// The elements for which a key exists, in increasing order.
    pub fn elements(&self) -> Vec<usize> {
        self.keys.keys().copied().sorted().collect()
    }

    /// Evaluate the automorphism x -> x^k on a ciphertext.
    ///
    /// Fails with a parameter error when k is even, and when no key exists
    /// for k. The identity (k = 1 mod 2n) needs no key.
    pub fn eval_auto(&self, ct: &Ciphertext, element: usize) -> Result<Ciphertext> {
        let k = normalize_element(element, self.par.degree())?;
        if k == 1 {
            return Ok(ct.clone());
        }
        self.get(k)
            .ok_or(Error::ParametersError(
                ParametersError::InvalidGaloisElement(element),
            ))?
            .apply(ct)
    }
}

/// The Galois elements 2^l + 1 for 1 <= l <= log2(n).
pub(crate) fn repacking_elements(degree: usize) -> Vec<usize> {
    (1..=degree.ilog2()).map(|l| (1usize << l) + 1).collect()
}

#[cfg(test)]
mod tests {
    use super::{AutomorphismKeys, GaloisKey};
    use crate::bgv::{BgvParameters, Ciphertext, Plaintext, SecretKey};
    use crate::{Error, ParametersError};
    use rand::{thread_rng, Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use ringhe_traits::{FheDecrypter, FheEncoder, FheEncrypter};
    use std::error::Error as StdError;

    #[test]
    fn eval_auto() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        for params in [BgvParameters::default_arc(8), BgvParameters::bootstrapping_arc()] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let keys = AutomorphismKeys::all(&sk, &mut rng)?;
            assert_eq!(keys.elements(), (3..16).step_by(2).collect::<Vec<_>>());

            let values: Vec<u64> = (0..params.degree())
                .map(|_| rng.gen_range(0..params.plaintext()))
                .collect();
            let pt = Plaintext::try_encode(values.as_slice(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;

            for k in (1..2 * params.degree()).step_by(2) {
                let ct2 = keys.eval_auto(&ct, k)?;
                println!("Noise: {}", sk.measure_noise(&ct2)?);
                assert_eq!(sk.try_decrypt(&ct2)?, pt.substitute(k)?);

                // Elements are taken modulo 2n.
                let ct3 = keys.eval_auto(&ct, k + 2 * params.degree())?;
                assert_eq!(sk.try_decrypt(&ct3)?, pt.substitute(k)?);
            }

            // At the bootstrapping modulus as well.
            let ct = sk.try_encrypt_at(&pt, &params.ctx_bootstrapping, &mut rng)?;
            let ct2 = keys.eval_auto(&ct, 5)?;
            assert_eq!(ct2.ctx(), &params.ctx_bootstrapping);
            assert_eq!(sk.try_decrypt(&ct2)?, pt.substitute(5)?);
        }
        Ok(())
    }

    #[test]
    fn errors() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(8);
        let sk = SecretKey::random(&params, &mut rng)?;
        let keys = AutomorphismKeys::for_repacking(&sk, &mut rng)?;
        assert_eq!(keys.elements(), vec![3, 5, 9]);

        let ct: Ciphertext = sk.try_encrypt(&Plaintext::constant(3, &params), &mut rng)?;
        assert_eq!(
            keys.eval_auto(&ct, 4).err(),
            Some(Error::ParametersError(ParametersError::InvalidGaloisElement(4)))
        );
        assert_eq!(
            keys.eval_auto(&ct, 7).err(),
            Some(Error::ParametersError(ParametersError::InvalidGaloisElement(7)))
        );
        assert_eq!(keys.eval_auto(&ct, 17)?, ct);
        assert!(GaloisKey::new(&sk, 2, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn deterministic_generation() -> Result<(), Box<dyn StdError>> {
        let params = BgvParameters::default_arc(8);
        let sk = SecretKey::random(&params, &mut thread_rng())?;
        let keys1 = AutomorphismKeys::for_repacking(&sk, &mut ChaCha8Rng::seed_from_u64(1))?;
        let keys2 = AutomorphismKeys::for_repacking(&sk, &mut ChaCha8Rng::seed_from_u64(1))?;
        assert_eq!(keys1, keys2);
        Ok(())
    }
}
