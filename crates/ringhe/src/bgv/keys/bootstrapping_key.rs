//! RGSW encryptions and bootstrapping keys.

use std::sync::Arc;

use crate::bgv::{BgvParameters, Ciphertext, SecretKey};
use crate::{Error, Result};
use itertools::{izip, Itertools};
use num_bigint::BigInt;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use ringhe_math::rq::Poly;
use tracing::{debug, instrument};

/// RGSW encryption of a small integer μ at the bootstrapping modulus.
///
/// Row j of the body part encrypts `μ * w^j`, row j of the mask part encrypts
/// `μ * w^j * s`, for the gadget base `w = 2^decomposition_log_base`.
#[derive(Debug, PartialEq, Clone)]
pub struct RgswCiphertext {
    pub(crate) par: Arc<BgvParameters>,
    pub(crate) body_rows: Vec<Ciphertext>,
    pub(crate) mask_rows: Vec<Ciphertext>,
}

impl RgswCiphertext {
    /// Encrypt μ under the secret key.
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, mu: i64, rng: &mut R) -> Result<Self> {
        let par = &sk.par;
        let ctx = &par.ctx_bootstrapping;
        let zero = Poly::zero(ctx);

        let mut body_rows = Vec::with_capacity(par.key_switching_digits());
        let mut mask_rows = Vec::with_capacity(par.key_switching_digits());
        for j in 0..par.key_switching_digits() {
            let gadget = Poly::from_bigints(
                &[BigInt::from(mu) << (j * par.decomposition_log_base)],
                ctx,
            )?;

            let mut row = sk.encrypt_poly(&zero, rng)?;
            row.body += &gadget;
            body_rows.push(row);

            let mut row = sk.encrypt_poly(&zero, rng)?;
            row.mask -= &gadget;
            mask_rows.push(row);
        }

        Ok(Self {
            par: par.clone(),
            body_rows,
            mask_rows,
        })
    }

    /// The first body row, an RLWE encryption of μ.
    pub fn rlwe(&self) -> &Ciphertext {
        &self.body_rows[0]
    }

    /// External product with an RLWE ciphertext whose modulus divides the
    /// bootstrapping modulus: the result encrypts `μ * m`.
    pub fn external_product(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        if ct.par != self.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        let ctx = ct.ctx();
        let log_base = self.par.decomposition_log_base;
        let body_digits = ct.body.decompose(log_base)?;
        let mask_digits = ct.mask.decompose(log_base)?;

        let mut out = Ciphertext::zero(ctx, &self.par)?;
        for (digit, row) in izip!(body_digits.iter(), self.body_rows.iter()) {
            let row = if row.ctx() == ctx { row.clone() } else { row.reduce_to(ctx)? };
            out.body += &(digit * &row.body);
            out.mask += &(digit * &row.mask);
        }
        for (digit, row) in izip!(mask_digits.iter(), self.mask_rows.iter()) {
            let row = if row.ctx() == ctx { row.clone() } else { row.reduce_to(ctx)? };
            out.body -= &(digit * &row.body);
            out.mask -= &(digit * &row.mask);
        }
        Ok(out)
    }
}

/// Bootstrapping key: for every secret key coefficient s_i, the RGSW
/// encryptions of the predicates `s_i == 1` and `s_i == -1`.
#[derive(Debug, PartialEq, Clone)]
pub struct BootstrappingKey {
    pub(crate) par: Arc<BgvParameters>,
    pub(crate) plus: Vec<RgswCiphertext>,
    pub(crate) minus: Vec<RgswCiphertext>,
}

impl BootstrappingKey {
    /// Generate a [`BootstrappingKey`] from a [`SecretKey`]. The 2n RGSW
    /// ciphertexts are generated in parallel.
    #[instrument(skip_all)]
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let seeds = (0..sk.par.degree())
            .map(|_| {
                let mut seed = <ChaCha8Rng as SeedableRng>::Seed::default();
                rng.fill(&mut seed);
                seed
            })
            .collect_vec();

        let pairs = seeds
            .into_par_iter()
            .enumerate()
            .map(|(i, seed)| {
                let mut rng = ChaCha8Rng::from_seed(seed);
                let si = sk.coeffs[i];
                let plus = RgswCiphertext::new(sk, (si == 1) as i64, &mut rng)?;
                let minus = RgswCiphertext::new(sk, (si == -1) as i64, &mut rng)?;
                Ok((plus, minus))
            })
            .collect::<Result<Vec<_>>>()?;
        let (plus, minus): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        debug!(
            rows = sk.par.key_switching_digits(),
            count = plus.len(),
            "generated bootstrapping key"
        );

        Ok(Self {
            par: sk.par.clone(),
            plus,
            minus,
        })
    }

    /// The RGSW encryptions of `s_i == 1` and `s_i == -1`.
    pub fn get(&self, i: usize) -> Option<(&RgswCiphertext, &RgswCiphertext)> {
        Some((self.plus.get(i)?, self.minus.get(i)?))
    }

    /// The number of secret key coefficients covered by the key.
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    /// Returns whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }
}
