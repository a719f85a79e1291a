//! Blind rotation of a test polynomial by the phase of an LWE sample.

use std::fmt::Debug;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use ringhe_math::rq::Poly;

use crate::bgv::{BgvParameters, BootstrappingKey, Ciphertext, MultiplicationStrategy};
use crate::{Error, Result};

use super::ExtractedSample;

/// Reduce an integer modulo 2n.
fn exponent(value: &BigInt, degree: usize) -> usize {
    let modulus = BigInt::from(2 * degree);
    let mut e = value % &modulus;
    if e < BigInt::default() {
        e += &modulus;
    }
    // In [0, 2n) by construction.
    e.to_usize().unwrap_or_default()
}

/// A way to multiply an accumulator by `x^(-b_j * s_j)` without knowing the
/// secret coefficient s_j.
///
/// Both implementations compute the same rotation; they differ by how the
/// encrypted selection of the exponent is combined with the accumulator.
pub trait BlindRotation: Debug + Send + Sync {
    /// The parameters of the key material.
    fn parameters(&self) -> &Arc<BgvParameters>;

    /// Multiply the accumulator by `x^(c * s_j)`, where `c` is in (0, 2n).
    fn rotate_step(&self, acc: &Ciphertext, j: usize, c: usize) -> Result<Ciphertext>;

    /// Compute an encryption at the bootstrapping modulus of
    /// `test * x^(a - <b, s>)`.
    fn blind_rotate(&self, test: &Poly, sample: &ExtractedSample) -> Result<Ciphertext> {
        let par = self.parameters();
        let n = par.degree();
        if sample.b.len() != n {
            return Err(Error::ArithmeticPrecondition(format!(
                "The sample has dimension {}, expected {n}",
                sample.b.len()
            )));
        }

        let mut acc = Ciphertext::trivial(&test.mul_monomial(exponent(&sample.a, n)), par)?;
        for (j, b) in sample.b.iter().enumerate() {
            let c = exponent(&-b, n);
            if c != 0 {
                acc = self.rotate_step(&acc, j, c)?;
            }
        }
        Ok(acc)
    }
}

/// Blind rotation through external products:
/// `acc + (x^c - 1) * (acc ⊡ RGSW(s_j == 1)) + (x^-c - 1) * (acc ⊡ RGSW(s_j == -1))`.
#[derive(Debug, Clone)]
pub struct ExternalProductRotation {
    key: Arc<BootstrappingKey>,
}

impl ExternalProductRotation {
    /// Create a rotation from a bootstrapping key.
    pub fn new(key: &Arc<BootstrappingKey>) -> Self {
        Self { key: key.clone() }
    }
}

impl BlindRotation for ExternalProductRotation {
    fn parameters(&self) -> &Arc<BgvParameters> {
        &self.key.par
    }

    fn rotate_step(&self, acc: &Ciphertext, j: usize, c: usize) -> Result<Ciphertext> {
        let (plus, minus) = self
            .key
            .get(j)
            .ok_or_else(|| Error::DefaultError(format!("No bootstrapping key for index {j}")))?;
        let n = self.key.par.degree();

        let selected_plus = plus.external_product(acc)?;
        let selected_minus = minus.external_product(acc)?;

        let mut out = acc.clone();
        out += &selected_plus.mul_monomial(c);
        out -= &selected_plus;
        out += &selected_minus.mul_monomial(2 * n - c);
        out -= &selected_minus;
        Ok(out)
    }
}

/// Blind rotation through a selector ciphertext
/// `1 + (x^c - 1) * RLWE(s_j == 1) + (x^-c - 1) * RLWE(s_j == -1)`,
/// which encrypts `x^(c * s_j)` and is multiplied into the accumulator.
#[derive(Debug, Clone)]
pub struct SelectorRotation {
    key: Arc<BootstrappingKey>,
    strategy: Arc<dyn MultiplicationStrategy>,
}

impl SelectorRotation {
    /// Create a rotation from a bootstrapping key and a multiplication
    /// strategy for the same parameters.
    pub fn new(
        key: &Arc<BootstrappingKey>,
        strategy: Arc<dyn MultiplicationStrategy>,
    ) -> Result<Self> {
        if strategy.parameters() != &key.par {
            return Err(Error::ArithmeticPrecondition(
                "Incompatible BGV parameters".to_string(),
            ));
        }
        Ok(Self {
            key: key.clone(),
            strategy,
        })
    }
}

impl BlindRotation for SelectorRotation {
    fn parameters(&self) -> &Arc<BgvParameters> {
        &self.key.par
    }

    fn rotate_step(&self, acc: &Ciphertext, j: usize, c: usize) -> Result<Ciphertext> {
        let (plus, minus) = self
            .key
            .get(j)
            .ok_or_else(|| Error::DefaultError(format!("No bootstrapping key for index {j}")))?;
        let par = &self.key.par;
        let n = par.degree();

        let plus = plus.rlwe();
        let minus = minus.rlwe();
        let mut selector = Ciphertext::trivial(&Poly::monomial(plus.ctx(), 0), par)?;
        selector += &plus.mul_monomial(c);
        selector -= plus;
        selector += &minus.mul_monomial(2 * n - c);
        selector -= minus;

        let selector = if selector.ctx() == acc.ctx() {
            selector
        } else {
            selector.reduce_to(acc.ctx())?
        };
        self.strategy.multiply(acc, &selector)
    }
}
