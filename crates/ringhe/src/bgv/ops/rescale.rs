//! Modulus switching for BGV ciphertexts.

use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use ringhe_math::rq::{Context, Poly};
use ringhe_util::inverse_biguint;

use crate::{bgv::Ciphertext, Error, ParametersError, Result};

/// Switch a ciphertext from modulus q to a modulus q' dividing q.
///
/// With p = q / q', every coefficient c is replaced by
/// `[p]_t * (c + delta) / p`, where `delta = -c mod p`, `delta = 0 mod t`,
/// `|delta| <= t * p / 2` and `[p]_t` is the centered remainder of p modulo
/// t. The message is preserved exactly and the noise is divided by about
/// `p / |[p]_t|`.
pub fn rescale(ct: &Ciphertext, ctx: &Arc<Context>) -> Result<Ciphertext> {
    let q = ct.ctx().modulus();
    let q_new = ctx.modulus();
    if ctx.degree != ct.ctx().degree {
        return Err(Error::ParametersError(ParametersError::InvalidModulus(
            "The target context has a different degree".to_string(),
        )));
    }
    if q_new == q || !(q % q_new).is_zero() {
        return Err(Error::ParametersError(ParametersError::InvalidModulus(
            format!("Cannot rescale from {q} to {q_new}"),
        )));
    }
    let p = q / q_new;
    let t = BigUint::from(ct.par.plaintext());
    let t_inv = inverse_biguint(&t, &p).ok_or_else(|| {
        Error::ParametersError(ParametersError::InvalidModulus(format!(
            "The rescaling factor {p} is not coprime to {t}"
        )))
    })?;

    let p = BigInt::from(p);
    let t = BigInt::from(t);
    let minus_t_inv = -BigInt::from(t_inv);
    let half_p = &p >> 1usize;
    let mut p_mod_t = &p % &t;
    if p_mod_t > (&t >> 1usize) {
        p_mod_t -= &t;
    }

    let switch = |poly: &Poly| -> Result<Poly> {
        let coefficients = poly
            .to_bigints()
            .into_iter()
            .map(|c| {
                let mut x = (&c * &minus_t_inv) % &p;
                if x < BigInt::zero() {
                    x += &p;
                }
                if x > half_p {
                    x -= &p;
                }
                ((c + &t * x) / &p) * &p_mod_t
            })
            .collect::<Vec<_>>();
        Ok(Poly::from_bigints(&coefficients, ctx)?)
    };

    Ciphertext::new(switch(&ct.body)?, switch(&ct.mask)?, &ct.par)
}

impl Ciphertext {
    /// Rescale the ciphertext to a context whose modulus divides the current
    /// modulus. See [`rescale`].
    pub fn rescale_to(&self, ctx: &Arc<Context>) -> Result<Ciphertext> {
        rescale(self, ctx)
    }

    /// Returns whether the ciphertext can be rescaled by the factor `p`.
    pub fn can_rescale_by(&self, p: &BigUint) -> bool {
        p > &BigUint::one()
            && (self.ctx().modulus() % p).is_zero()
            && inverse_biguint(&BigUint::from(self.par.plaintext()), p).is_some()
    }
}
