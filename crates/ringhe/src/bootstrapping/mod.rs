/*!
Bootstrapping of BGV ciphertexts.

A ciphertext at modulus q is split as `ct = ct1 + q1 * ctprep`, where `ct1`
has coefficients in [0, q1). The phase of `ctprep` is extracted coefficient
by coefficient into LWE samples; each sample blindly rotates a test
polynomial whose constant coefficient ends up encrypting `q1 * u / n mod t`.
The n rotated accumulators are repacked into one ciphertext at the
bootstrapping modulus, to which `ct1` is added back.

The noise of the result only depends on the parameters and the split factor,
not on the noise of the input.
*/

mod blind_rotation;
mod extract;
mod repack;

pub use blind_rotation::{BlindRotation, ExternalProductRotation, SelectorRotation};
pub use extract::{embed, extract, ExtractedSample};
pub use repack::{repack, repack_normalized};

use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use rayon::prelude::*;
use ringhe_math::rq::{Context, Poly};
use ringhe_util::{gcd, inverse};
use tracing::{debug, instrument};

use crate::bgv::{repacking_elements, AutomorphismKeys, BgvParameters, Ciphertext};
use crate::{Error, ParametersError, Result};

/// The split factor q1 used by bootstrapping, validated against the BGV
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrappingParameters {
    par: Arc<BgvParameters>,
    split: BigUint,
    ctx_split: Arc<Context>,
    lookup_factor: u64,
}

impl BootstrappingParameters {
    /// Validate the split factor q1. It must divide the bootstrapping modulus,
    /// t must divide 2 * q1 and gcd(n, t) must divide q1.
    pub fn new(par: &Arc<BgvParameters>, split: &BigUint) -> Result<Self> {
        let n = par.degree() as u64;
        let t = par.plaintext();
        if split < &BigUint::from(2u64) {
            return Err(invalid_split(format!("The split factor {split} is below 2")));
        }
        if !(par.bootstrapping_modulus() % split).is_zero() {
            return Err(invalid_split(format!(
                "The split factor {split} does not divide the bootstrapping modulus {}",
                par.bootstrapping_modulus()
            )));
        }
        if !((split << 1usize) % t).is_zero() {
            return Err(invalid_split(format!(
                "The plaintext modulus {t} does not divide twice the split factor {split}"
            )));
        }
        let g = gcd(n, t);
        if !(split % g).is_zero() {
            return Err(invalid_split(format!(
                "gcd({n}, {t}) = {g} does not divide the split factor {split}"
            )));
        }

        // The lookup factor h1 satisfies n * h1 = q1 (mod t).
        let reduced_t = t / g;
        let split_factor = ((split / g) % reduced_t)
            .to_u64()
            .ok_or_else(|| Error::DefaultError("Could not reduce the split factor".to_string()))?;
        let degree_inverse = inverse((n / g) % reduced_t, reduced_t).ok_or_else(|| {
            Error::DefaultError(format!("{} is not invertible modulo {reduced_t}", n / g))
        })?;
        let lookup_factor =
            ((split_factor as u128 * degree_inverse as u128) % reduced_t as u128) as u64;

        Ok(Self {
            par: par.clone(),
            split: split.clone(),
            ctx_split: Context::new_arc(split, par.degree())?,
            lookup_factor,
        })
    }

    /// The split factor q1.
    pub fn split(&self) -> &BigUint {
        &self.split
    }

    /// The factor h1 of the lookup table `u -> u * h1 mod t`.
    pub fn lookup_factor(&self) -> u64 {
        self.lookup_factor
    }

    /// The lookup value h(u) for u in [0, n), centered modulo t.
    fn lookup(&self, u: usize) -> i64 {
        let t = self.par.plaintext();
        let h = ((u as u128 * self.lookup_factor as u128) % t as u128) as i64;
        if h > (t / 2) as i64 {
            h - t as i64
        } else {
            h
        }
    }

    /// The test polynomial f at the bootstrapping modulus: the constant
    /// coefficient of `f * x^u` is h(u), and `n * h(u) = q1 * u (mod t)` for
    /// every exponent u.
    pub fn test_polynomial(&self) -> Result<Poly> {
        let n = self.par.degree();
        let mut coefficients = vec![0i64; n];
        for u in 1..n {
            coefficients[n - u] = -self.lookup(u);
        }
        Ok(Poly::from_i64(&coefficients, &self.par.ctx_bootstrapping)?)
    }

    /// Split a ciphertext at modulus q into `ct1` (coefficients in [0, q1),
    /// lifted to the bootstrapping modulus) and `ctprep` at modulus q / q1,
    /// such that `ct = ct1 + q1 * ctprep` over the integers.
    pub fn split_ciphertext(&self, ct: &Ciphertext) -> Result<(Ciphertext, Ciphertext)> {
        if ct.par != self.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let modulus = ct.ctx().modulus();
        let t = self.par.plaintext();
        if !(modulus % &self.split).is_zero() || modulus <= &self.split {
            return Err(invalid_split(format!(
                "The split factor {} does not properly divide the modulus {modulus}",
                self.split
            )));
        }
        if !(modulus % t).is_zero() {
            return Err(invalid_split(format!(
                "The plaintext modulus {t} does not divide the modulus {modulus}"
            )));
        }

        let low = ct
            .reduce_to(&self.ctx_split)?
            .lift_to(&self.par.ctx_bootstrapping)?;

        let ctx_high = self.par.context_for(&(modulus / &self.split))?;
        let split = BigInt::from(self.split.clone());
        let divide = |p: &Poly| -> Result<Poly> {
            let coefficients = p.to_bigints().iter().map(|c| c / &split).collect::<Vec<_>>();
            Ok(Poly::from_bigints(&coefficients, &ctx_high)?)
        };
        let high = Ciphertext::new(divide(ct.body())?, divide(ct.mask())?, &self.par)?;
        Ok((low, high))
    }
}

fn invalid_split(message: String) -> Error {
    Error::ParametersError(ParametersError::InvalidSplit(message))
}

/// Refreshes ciphertexts with a blind rotation strategy and the automorphism
/// keys used for repacking.
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    params: BootstrappingParameters,
    test_polynomial: Poly,
    rotation: Arc<dyn BlindRotation>,
    automorphism_keys: Arc<AutomorphismKeys>,
}

impl Bootstrapper {
    /// Create a bootstrapper. The automorphism keys must contain the
    /// repacking elements 2^l + 1.
    pub fn new(
        params: BootstrappingParameters,
        rotation: Arc<dyn BlindRotation>,
        automorphism_keys: Arc<AutomorphismKeys>,
    ) -> Result<Self> {
        if rotation.parameters() != &params.par || automorphism_keys.par != params.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        if let Some(k) = repacking_elements(params.par.degree())
            .into_iter()
            .find(|k| automorphism_keys.get(*k).is_none())
        {
            return Err(Error::ParametersError(
                ParametersError::InvalidGaloisElement(k),
            ));
        }
        let test_polynomial = params.test_polynomial()?;
        Ok(Self {
            params,
            test_polynomial,
            rotation,
            automorphism_keys,
        })
    }

    /// The bootstrapping parameters.
    pub fn parameters(&self) -> &BootstrappingParameters {
        &self.params
    }

    /// Refresh a ciphertext. The result encrypts the same message at the
    /// bootstrapping modulus, with a noise independent of the input noise.
    #[instrument(skip_all)]
    pub fn bootstrap(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let (low, high) = self.params.split_ciphertext(ct)?;
        debug!(
            modulus_bits = ct.ctx().modulus().bits(),
            split_bits = self.params.split.bits(),
            "split"
        );

        let samples = extract(&high);
        let accumulators = samples
            .into_par_iter()
            .map(|sample| self.rotation.blind_rotate(&self.test_polynomial, &sample))
            .collect::<Result<Vec<_>>>()?;
        debug!(samples = accumulators.len(), "blind rotation");

        let packed = repack(&accumulators, &self.automorphism_keys)?;
        debug!(levels = self.params.par.degree().ilog2(), "repacking");
        Ok(&low + &packed)
    }
}
