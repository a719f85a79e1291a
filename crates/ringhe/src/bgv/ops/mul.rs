use std::fmt::Debug;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rand::{CryptoRng, RngCore};
use ringhe_util::gcd;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use crate::{
    bgv::{BgvParameters, Ciphertext, KeySwitchingKey, QuadraticCiphertext, SecretKey},
    Error, ParametersError, Result,
};

use super::rescale::rescale;

/// A way to fold the quadratic term of a ciphertext product back into a
/// linear ciphertext. Implementations are interchangeable: they differ by
/// the key material they hold, not by their result.
pub trait MultiplicationStrategy: Debug + Send + Sync {
    /// The parameters of the key material.
    fn parameters(&self) -> &Arc<BgvParameters>;

    /// Fold a quadratic ciphertext into a linear ciphertext encrypting the
    /// same message.
    fn relinearize(&self, ct: &QuadraticCiphertext) -> Result<Ciphertext>;

    /// Multiply two ciphertexts.
    fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        let tensor = lhs.tensor(rhs)?;
        self.relinearize(&tensor)
    }
}

/// Multiplication using direct switching keys for s and s^2: the product is
/// `(d0, 0) - KS_s(d1) + KS_{s^2}(d2)`.
#[derive(Debug, PartialEq, Clone)]
pub struct SwitchKeyMultiplicationKey {
    ksk_s: KeySwitchingKey,
    ksk_s2: KeySwitchingKey,
}

impl SwitchKeyMultiplicationKey {
    /// Generate the switching keys for s and s^2 from a [`SecretKey`].
    #[instrument(skip_all)]
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let s = sk.poly(&sk.par.ctx_bootstrapping)?;
        let s2 = Zeroizing::new(s.as_ref() * s.as_ref());
        Ok(Self {
            ksk_s: KeySwitchingKey::new(sk, &s, rng)?,
            ksk_s2: KeySwitchingKey::new(sk, &s2, rng)?,
        })
    }
}

impl MultiplicationStrategy for SwitchKeyMultiplicationKey {
    fn parameters(&self) -> &Arc<BgvParameters> {
        &self.ksk_s.par
    }

    fn relinearize(&self, ct: &QuadraticCiphertext) -> Result<Ciphertext> {
        if &ct.par != self.parameters() {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let c1 = self.ksk_s.key_switch(&ct.d1)?;
        let c2 = self.ksk_s2.key_switch(&ct.d2)?;
        Ciphertext::new(
            &(&ct.d0 - &c1.body) + &c2.body,
            &c2.mask - &c1.mask,
            &ct.par,
        )
    }
}

/// Multiplicator that applies a multiplication strategy and optionally
/// rescales the product to a smaller modulus.
#[derive(Debug, Clone)]
pub struct Multiplicator {
    strategy: Arc<dyn MultiplicationStrategy>,
    rescaling_factor: Option<BigUint>,
}

impl Multiplicator {
    /// Construct a multiplicator from a strategy.
    pub fn new(strategy: Arc<dyn MultiplicationStrategy>) -> Self {
        Self {
            strategy,
            rescaling_factor: None,
        }
    }

    /// Rescale every product, dividing its modulus by `factor`. The factor
    /// must be larger than 1 and coprime to the plaintext modulus.
    pub fn enable_rescaling(&mut self, factor: &BigUint) -> Result<()> {
        let t = BigUint::from(self.strategy.parameters().plaintext());
        if factor <= &BigUint::one() {
            return Err(Error::ParametersError(ParametersError::InvalidModulus(
                format!("The rescaling factor {factor} must be larger than 1"),
            )));
        }
        let r = (factor % &t).to_u64().unwrap_or_default();
        if gcd(r, self.strategy.parameters().plaintext()) != 1 {
            return Err(Error::ParametersError(ParametersError::InvalidModulus(
                format!("The rescaling factor {factor} is not coprime to {t}"),
            )));
        }
        self.rescaling_factor = Some(factor.clone());
        Ok(())
    }

    /// Multiply two ciphertexts using the defined multiplication strategy.
    #[instrument(skip_all)]
    pub fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        let product = self.strategy.multiply(lhs, rhs)?;
        match &self.rescaling_factor {
            None => Ok(product),
            Some(factor) => {
                let modulus = product.ctx().modulus();
                if !(modulus % factor).is_zero() {
                    return Err(Error::ParametersError(ParametersError::InvalidModulus(
                        format!("The rescaling factor {factor} does not divide {modulus}"),
                    )));
                }
                let target = modulus / factor;
                debug!(bits = target.bits(), "rescaling the product");
                let ctx = product.par.context_for(&target)?;
                rescale(&product, &ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MultiplicationStrategy, Multiplicator, SwitchKeyMultiplicationKey};
    use crate::bgv::{
        BgvParameters, BgvParametersBuilder, Ciphertext, Plaintext, PowerOfTwo,
        RelinearizationKey, SecretKey,
    };
    use crate::{Error, ParametersError};
    use num_bigint::BigUint;
    use rand::{thread_rng, Rng};
    use ringhe_traits::{FheDecrypter, FheEncoder, FheEncrypter};
    use std::{error::Error as StdError, sync::Arc};

    fn random_plaintext<R: Rng>(
        params: &Arc<BgvParameters>,
        rng: &mut R,
    ) -> Result<Plaintext, Box<dyn StdError>> {
        let values: Vec<u64> = (0..params.degree())
            .map(|_| rng.gen_range(0..params.plaintext()))
            .collect();
        Ok(Plaintext::try_encode(values.as_slice(), params)?)
    }

    #[test]
    fn strategies_agree() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        for params in [BgvParameters::default_arc(8), BgvParameters::bootstrapping_arc()] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let strategies: Vec<Arc<dyn MultiplicationStrategy>> = vec![
                Arc::new(RelinearizationKey::new(&sk, &mut rng)?),
                Arc::new(SwitchKeyMultiplicationKey::new(&sk, &mut rng)?),
            ];
            for _ in 0..10 {
                let pa = random_plaintext(&params, &mut rng)?;
                let pb = random_plaintext(&params, &mut rng)?;
                let ct_a: Ciphertext = sk.try_encrypt(&pa, &mut rng)?;
                let ct_b: Ciphertext = sk.try_encrypt(&pb, &mut rng)?;
                let expected = &pa * &pb;
                for strategy in &strategies {
                    let product = Multiplicator::new(strategy.clone()).multiply(&ct_a, &ct_b)?;
                    println!("Noise: {}", sk.measure_noise(&product)?);
                    assert_eq!(sk.try_decrypt(&product)?, expected);
                }
            }
        }
        Ok(())
    }

    // Multiplication with relinearization over n = 16, t = 8, q = 2^6.
    #[test]
    fn small_power_of_two_scenario() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BgvParametersBuilder::new()
            .set_degree(16)
            .set_plaintext_modulus(8)
            .set_ciphertext_modulus_size(6)
            .set_modulus_chooser(PowerOfTwo)
            .build_arc()?;
        let sk = SecretKey::random(&params, &mut rng)?;
        let rk = RelinearizationKey::new(&sk, &mut rng)?;
        let multiplicator = Multiplicator::new(Arc::new(rk));
        for _ in 0..100 {
            let pa = random_plaintext(&params, &mut rng)?;
            let pb = random_plaintext(&params, &mut rng)?;
            let ct_a: Ciphertext = sk.try_encrypt(&pa, &mut rng)?;
            let ct_b: Ciphertext = sk.try_encrypt(&pb, &mut rng)?;
            let product = multiplicator.multiply(&ct_a, &ct_b)?;
            assert_eq!(sk.try_decrypt(&product)?, &pa * &pb);
        }
        Ok(())
    }

    #[test]
    fn rescaling() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        // q = 3^40, so that products can be rescaled by 3 ten times over.
        let q = BigUint::from(3u64).pow(40);
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_ciphertext_modulus(&q)
            .build_arc()?;
        let sk = SecretKey::random(&params, &mut rng)?;
        let rk = Arc::new(RelinearizationKey::new(&sk, &mut rng)?);

        let mut multiplicator = Multiplicator::new(rk.clone());
        assert_eq!(
            multiplicator.enable_rescaling(&BigUint::from(4u64)).err(),
            Some(Error::ParametersError(ParametersError::InvalidModulus(
                "The rescaling factor 4 is not coprime to 2".to_string()
            )))
        );
        assert!(multiplicator.enable_rescaling(&BigUint::from(1u64)).is_err());
        multiplicator.enable_rescaling(&BigUint::from(3u64).pow(10))?;

        let pa = Plaintext::try_encode(&[1u64, 0, 1] as &[u64], &params)?;
        let pb = Plaintext::try_encode(&[1u64, 1] as &[u64], &params)?;
        let ct_a: Ciphertext = sk.try_encrypt(&pa, &mut rng)?;
        let ct_b: Ciphertext = sk.try_encrypt(&pb, &mut rng)?;

        let product = multiplicator.multiply(&ct_a, &ct_b)?;
        assert_eq!(product.ctx().modulus(), &BigUint::from(3u64).pow(30));
        println!("Noise: {}", sk.measure_noise(&product)?);
        assert_eq!(sk.try_decrypt(&product)?, &pa * &pb);

        // A second level of multiplication at the smaller modulus.
        let product = multiplicator.multiply(&product, &product)?;
        assert_eq!(product.ctx().modulus(), &BigUint::from(3u64).pow(20));
        let expected = &(&pa * &pb) * &(&pa * &pb);
        assert_eq!(sk.try_decrypt(&product)?, expected);
        Ok(())
    }
}
