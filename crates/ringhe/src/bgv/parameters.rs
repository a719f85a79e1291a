//! Create parameters for the BGV encryption scheme

use crate::{Error, ParametersError, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use ringhe_math::rq::Context;
use ringhe_traits::FheParameters;
use ringhe_util::{next_prime, ErrorDistribution};
use std::fmt::Debug;
use std::sync::Arc;

/// Strategy selecting a ciphertext modulus of a given size.
pub trait ModulusChooser: Debug + Send + Sync {
    /// Returns a modulus of about `bits` bits suitable for polynomials of
    /// degree `degree` and the plaintext modulus `plaintext`, if one exists.
    fn choose(&self, bits: usize, degree: usize, plaintext: u64) -> Option<BigUint>;
}

/// Selects the smallest prime larger than 2^bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmallestPrime;

impl ModulusChooser for SmallestPrime {
    fn choose(&self, bits: usize, _degree: usize, _plaintext: u64) -> Option<BigUint> {
        if bits < 2 {
            return None;
        }
        Some(next_prime(&(BigUint::from(1u64) << bits)))
    }
}

/// Selects exactly 2^bits, so that power-of-two plaintext moduli divide the
/// ciphertext modulus and decryption is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerOfTwo;

impl ModulusChooser for PowerOfTwo {
    fn choose(&self, bits: usize, _degree: usize, _plaintext: u64) -> Option<BigUint> {
        if bits == 0 {
            return None;
        }
        Some(BigUint::from(1u64) << bits)
    }
}

/// Parameters for the BGV encryption scheme.
#[derive(PartialEq)]
pub struct BgvParameters {
    /// Number of coefficients in a polynomial.
    polynomial_degree: usize,

    /// Modulus of the plaintext.
    plaintext_modulus: u64,

    /// Distribution of the encryption errors.
    pub(crate) error_distribution: ErrorDistribution,

    /// Minimum number of non-zero coefficients in a secret key.
    pub(crate) secret_weight: usize,

    /// Logarithm of the gadget decomposition base.
    pub(crate) decomposition_log_base: usize,

    /// Context of the ciphertext modulus q.
    pub ctx: Arc<Context>,

    /// Context of the bootstrapping modulus Q, a multiple of q.
    pub ctx_bootstrapping: Arc<Context>,

    /// Context of the plaintext modulus t.
    pub(crate) ctx_plaintext: Arc<Context>,
}

impl Debug for BgvParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgvParameters")
            .field("polynomial_degree", &self.polynomial_degree)
            .field("plaintext_modulus", &self.plaintext_modulus)
            .field("ciphertext_modulus", self.ctx.modulus())
            .field("bootstrapping_modulus", self.ctx_bootstrapping.modulus())
            // .field("error_distribution", &self.error_distribution)
            // .field("secret_weight", &self.secret_weight)
            .finish()
    }
}

impl FheParameters for BgvParameters {}

impl BgvParameters {
    /// Returns the underlying polynomial degree
    pub const fn degree(&self) -> usize {
        self.polynomial_degree
    }

    /// Returns the plaintext modulus
    pub const fn plaintext(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Returns the ciphertext modulus q
    pub fn ciphertext_modulus(&self) -> &BigUint {
        self.ctx.modulus()
    }

    /// Returns the bootstrapping modulus Q
    pub fn bootstrapping_modulus(&self) -> &BigUint {
        self.ctx_bootstrapping.modulus()
    }

    /// Returns the error distribution
    pub const fn error_distribution(&self) -> &ErrorDistribution {
        &self.error_distribution
    }

    /// Returns the minimum number of non-zero secret key coefficients
    pub const fn secret_weight(&self) -> usize {
        self.secret_weight
    }

    /// Returns the logarithm of the gadget decomposition base
    pub const fn decomposition_log_base(&self) -> usize {
        self.decomposition_log_base
    }

    /// Number of gadget digits of a switching key, i.e. the smallest `l` such
    /// that 2^(l * log_base) covers the bootstrapping modulus.
    pub fn key_switching_digits(&self) -> usize {
        self.ctx_bootstrapping
            .coefficient_bits()
            .div_ceil(self.decomposition_log_base)
    }

    /// Returns whether keys generated at the bootstrapping modulus can be
    /// used at the given modulus.
    pub fn supports_modulus(&self, modulus: &BigUint) -> bool {
        !modulus.is_zero() && (self.bootstrapping_modulus() % modulus).is_zero()
    }

    /// Returns a context for the given modulus, reusing the parameter
    /// contexts when possible. The modulus must divide the bootstrapping
    /// modulus.
    pub fn context_for(&self, modulus: &BigUint) -> Result<Arc<Context>> {
        if modulus == self.ctx.modulus() {
            Ok(self.ctx.clone())
        } else if modulus == self.ctx_bootstrapping.modulus() {
            Ok(self.ctx_bootstrapping.clone())
        } else if self.supports_modulus(modulus) {
            Ok(Context::new_arc(modulus, self.polynomial_degree)?)
        } else {
            Err(Error::ArithmeticPrecondition(format!(
                "The modulus {modulus} does not divide the bootstrapping modulus"
            )))
        }
    }

    /// Checks that a context can hold ciphertexts for these parameters.
    pub(crate) fn check_context(&self, ctx: &Context) -> Result<()> {
        if ctx.degree != self.polynomial_degree {
            Err(Error::ArithmeticPrecondition(format!(
                "The degree {} does not match the parameters degree {}",
                ctx.degree, self.polynomial_degree
            )))
        } else if !self.supports_modulus(ctx.modulus()) {
            Err(Error::ArithmeticPrecondition(format!(
                "The modulus {} does not divide the bootstrapping modulus",
                ctx.modulus()
            )))
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    #[allow(missing_docs)]
    pub fn default_arc(degree: usize) -> Arc<Self> {
        if !degree.is_power_of_two() || degree < 2 {
            panic!("Invalid degree");
        }
        BgvParametersBuilder::new()
            .set_degree(degree)
            .set_plaintext_modulus(1153)
            .set_ciphertext_modulus_size(61)
            .set_bootstrapping_extension(64)
            .build_arc()
            .unwrap()
    }

    /// Small power-of-two parameters used for bootstrapping tests.
    #[cfg(test)]
    #[allow(missing_docs)]
    pub fn bootstrapping_arc() -> Arc<Self> {
        BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(16)
            .set_ciphertext_modulus(&BigUint::from(1u64 << 10))
            .set_bootstrapping_modulus(&(BigUint::from(1u64) << 80))
            .set_decomposition_log_base(16)
            .build_arc()
            .unwrap()
    }
}

/// Builder for parameters for the BGV encryption scheme.
#[derive(Debug)]
pub struct BgvParametersBuilder {
    degree: usize,
    plaintext: u64,
    ciphertext_modulus: Option<BigUint>,
    ciphertext_modulus_size: Option<usize>,
    modulus_chooser: Arc<dyn ModulusChooser>,
    bootstrapping_modulus: Option<BigUint>,
    bootstrapping_extension: Option<usize>,
    error_distribution: ErrorDistribution,
    secret_weight: Option<usize>,
    decomposition_log_base: usize,
}

impl BgvParametersBuilder {
    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            degree: Default::default(),
            plaintext: Default::default(),
            ciphertext_modulus: None,
            ciphertext_modulus_size: None,
            modulus_chooser: Arc::new(SmallestPrime),
            bootstrapping_modulus: None,
            bootstrapping_extension: None,
            error_distribution: ErrorDistribution::default(),
            secret_weight: None,
            decomposition_log_base: 16,
        }
    }

    /// Sets the polynomial degree. Building fails if the degree is not a
    /// power of two larger or equal to 2.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Sets the plaintext modulus. Building fails if it is smaller than 2 or
    /// not smaller than the ciphertext modulus.
    pub fn set_plaintext_modulus(&mut self, plaintext: u64) -> &mut Self {
        self.plaintext = plaintext;
        self
    }

    /// Sets the ciphertext modulus q.
    /// Only one of `set_ciphertext_modulus` and `set_ciphertext_modulus_size`
    /// can be specified.
    pub fn set_ciphertext_modulus(&mut self, modulus: &BigUint) -> &mut Self {
        self.ciphertext_modulus = Some(modulus.clone());
        self
    }

    /// Sets the size of the ciphertext modulus, which is then selected by the
    /// modulus chooser.
    /// Only one of `set_ciphertext_modulus` and `set_ciphertext_modulus_size`
    /// can be specified.
    pub fn set_ciphertext_modulus_size(&mut self, bits: usize) -> &mut Self {
        self.ciphertext_modulus_size = Some(bits);
        self
    }

    /// Sets the strategy selecting the ciphertext modulus from its size.
    /// Defaults to [`SmallestPrime`].
    pub fn set_modulus_chooser<M: ModulusChooser + 'static>(&mut self, chooser: M) -> &mut Self {
        self.modulus_chooser = Arc::new(chooser);
        self
    }

    /// Sets the bootstrapping modulus Q, which must be a multiple of the
    /// ciphertext modulus.
    /// Only one of `set_bootstrapping_modulus` and
    /// `set_bootstrapping_extension` can be specified; without either, Q = q.
    pub fn set_bootstrapping_modulus(&mut self, modulus: &BigUint) -> &mut Self {
        self.bootstrapping_modulus = Some(modulus.clone());
        self
    }

    /// Sets the bootstrapping modulus to Q = q * 2^bits.
    pub fn set_bootstrapping_extension(&mut self, bits: usize) -> &mut Self {
        self.bootstrapping_extension = Some(bits);
        self
    }

    /// Sets the error distribution.
    pub fn set_error_distribution(&mut self, distribution: ErrorDistribution) -> &mut Self {
        self.error_distribution = distribution;
        self
    }

    /// Sets the minimum number of non-zero coefficients of the secret key.
    /// Defaults to half the degree.
    pub fn set_secret_weight(&mut self, weight: usize) -> &mut Self {
        self.secret_weight = Some(weight);
        self
    }

    /// Sets the logarithm of the gadget decomposition base used by all
    /// switching keys. Defaults to 16.
    pub fn set_decomposition_log_base(&mut self, log_base: usize) -> &mut Self {
        self.decomposition_log_base = log_base;
        self
    }

    /// Build a new `BgvParameters` inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<BgvParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new `BgvParameters`.
    pub fn build(&self) -> Result<BgvParameters> {
        // Check that the degree is a power of 2 (and large enough).
        if self.degree < 2 || !self.degree.is_power_of_two() {
            return Err(Error::ParametersError(ParametersError::InvalidDegree(
                self.degree,
            )));
        }

        if self.plaintext < 2 {
            return Err(Error::ParametersError(ParametersError::InvalidPlaintext(
                format!("{} is smaller than 2", self.plaintext),
            )));
        }

        let q = match (&self.ciphertext_modulus, self.ciphertext_modulus_size) {
            (Some(_), Some(_)) => {
                return Err(Error::ParametersError(ParametersError::TooManySpecified(
                    "Only one of `ciphertext_modulus` and `ciphertext_modulus_size` can be specified"
                        .to_string(),
                )))
            }
            (None, None) => {
                return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                    "One of `ciphertext_modulus` and `ciphertext_modulus_size` must be specified"
                        .to_string(),
                )))
            }
            (Some(q), None) => q.clone(),
            (None, Some(bits)) => self
                .modulus_chooser
                .choose(bits, self.degree, self.plaintext)
                .ok_or(Error::ParametersError(ParametersError::NotEnoughPrimes(
                    bits,
                    self.degree,
                )))?,
        };

        // The scale q / t must not collapse to zero.
        if q <= BigUint::from(self.plaintext) {
            return Err(Error::ParametersError(ParametersError::InvalidModulus(
                format!(
                    "The ciphertext modulus {q} must exceed the plaintext modulus {}",
                    self.plaintext
                ),
            )));
        }

        let bootstrapping_modulus =
            match (&self.bootstrapping_modulus, self.bootstrapping_extension) {
                (Some(_), Some(_)) => {
                    return Err(Error::ParametersError(ParametersError::TooManySpecified(
                        "Only one of `bootstrapping_modulus` and `bootstrapping_extension` can be specified"
                            .to_string(),
                    )))
                }
                (Some(big_q), None) => {
                    if !(big_q % &q).is_zero() {
                        return Err(Error::ParametersError(ParametersError::InvalidModulus(
                            format!("The bootstrapping modulus {big_q} is not a multiple of {q}"),
                        )));
                    }
                    big_q.clone()
                }
                (None, Some(bits)) => &q << bits,
                (None, None) => q.clone(),
            };

        self.error_distribution
            .validate()
            .map_err(|e| Error::ParametersError(ParametersError::InvalidDistribution(e.to_string())))?;

        let secret_weight = self.secret_weight.unwrap_or(self.degree / 2);
        if secret_weight > self.degree {
            return Err(Error::ParametersError(ParametersError::InvalidDistribution(
                format!(
                    "The secret weight {secret_weight} exceeds the degree {}",
                    self.degree
                ),
            )));
        }

        if self.decomposition_log_base == 0 {
            return Err(Error::ParametersError(
                ParametersError::InvalidDecompositionBase(self.decomposition_log_base),
            ));
        }

        let ctx = Context::new_arc(&q, self.degree)?;
        let ctx_bootstrapping = if bootstrapping_modulus == q {
            ctx.clone()
        } else {
            Context::new_arc(&bootstrapping_modulus, self.degree)?
        };
        let ctx_plaintext = Context::new_arc(&BigUint::from(self.plaintext), self.degree)?;

        Ok(BgvParameters {
            polynomial_degree: self.degree,
            plaintext_modulus: self.plaintext,
            error_distribution: self.error_distribution,
            secret_weight,
            decomposition_log_base: self.decomposition_log_base,
            ctx,
            ctx_bootstrapping,
            ctx_plaintext,
        })
    }
}
