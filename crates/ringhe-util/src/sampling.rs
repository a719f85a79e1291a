//! Samplers for secret, error and uniform polynomials.

use num_bigint::{BigUint, RandBigInt};
use rand::seq::index;
use rand::{CryptoRng, Rng, RngCore};
use rand_distr::{Distribution, Normal};

/// Distribution of the error polynomials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorDistribution {
    /// Rounded Gaussian with standard deviation `sigma`, rejecting samples
    /// of magnitude larger than `tail * sigma`.
    Gaussian {
        /// Standard deviation.
        sigma: f64,
        /// Tail cut, in multiples of the standard deviation.
        tail: f64,
    },
    /// Centered binomial distribution of the given variance (between 1 and 16).
    CenteredBinomial {
        /// Variance of the distribution.
        variance: usize,
    },
}

impl Default for ErrorDistribution {
    fn default() -> Self {
        Self::Gaussian {
            sigma: 3.0,
            tail: 6.0,
        }
    }
}

impl ErrorDistribution {
    /// Returns the largest magnitude a sample can take.
    pub fn bound(&self) -> u64 {
        match self {
            Self::Gaussian { sigma, tail } => (sigma * tail).floor() as u64,
            Self::CenteredBinomial { variance } => 2 * *variance as u64,
        }
    }

    /// Check that the distribution can be sampled from.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Gaussian { sigma, tail } => {
                if !sigma.is_finite() || *sigma <= 0.0 {
                    Err("The standard deviation should be positive")
                } else if !tail.is_finite() || *tail < 1.0 {
                    Err("The tail cut should be at least one standard deviation")
                } else {
                    Ok(())
                }
            }
            Self::CenteredBinomial { variance } => {
                if (1..=16).contains(variance) {
                    Ok(())
                } else {
                    Err("The variance should be between 1 and 16")
                }
            }
        }
    }

    /// Sample a vector of `size` independent errors.
    pub fn sample_vec<R: RngCore + CryptoRng>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Result<Vec<i64>, &'static str> {
        match self {
            Self::Gaussian { sigma, tail } => sample_vec_gaussian(size, *sigma, *tail, rng),
            Self::CenteredBinomial { variance } => sample_vec_cbd(size, *variance, rng),
        }
    }
}

/// Sample a vector of independent centered binomial distributions of a given
/// variance. Returns an error if the variance is strictly larger than 16.
pub fn sample_vec_cbd<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: usize,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !(1..=16).contains(&variance) {
        return Err("The variance should be between 1 and 16");
    }

    let number_bits = 4 * variance;
    let mask_add = (u64::MAX >> (64 - 2 * variance)) as u128;
    let mask_sub = mask_add << (2 * variance);

    let mut out = Vec::with_capacity(vector_size);
    let mut pool = 0u128;
    let mut pool_nbits = 0;
    for _ in 0..vector_size {
        if pool_nbits < number_bits {
            pool |= (rng.next_u64() as u128) << pool_nbits;
            pool_nbits += 64;
        }
        out.push((pool & mask_add).count_ones() as i64 - (pool & mask_sub).count_ones() as i64);
        pool >>= number_bits;
        pool_nbits -= number_bits;
    }
    Ok(out)
}

/// Sample a vector of rounded Gaussians of standard deviation `sigma`,
/// rejecting any sample larger than `tail * sigma` in absolute value.
pub fn sample_vec_gaussian<R: RngCore + CryptoRng>(
    vector_size: usize,
    sigma: f64,
    tail: f64,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    ErrorDistribution::Gaussian { sigma, tail }.validate()?;
    let normal = Normal::new(0.0, sigma).map_err(|_| "Invalid standard deviation")?;
    let bound = (sigma * tail).floor();

    let mut out = Vec::with_capacity(vector_size);
    while out.len() < vector_size {
        let x: f64 = normal.sample(rng).round();
        if x.abs() <= bound {
            out.push(x as i64);
        }
    }
    Ok(out)
}

/// Sample a vector of uniform coefficients in {-1, 0, 1}.
pub fn sample_vec_ternary<R: RngCore + CryptoRng>(vector_size: usize, rng: &mut R) -> Vec<i64> {
    (0..vector_size).map(|_| rng.gen_range(-1i64..=1)).collect()
}

/// Sample a vector of coefficients in {-1, 0, 1} with at least
/// `min(weight, vector_size)` non-zero coefficients.
///
/// The vector is drawn uniformly, then zero coefficients at uniformly chosen
/// positions are replaced by a random sign until the weight is reached.
pub fn sample_vec_ternary_with_weight<R: RngCore + CryptoRng>(
    vector_size: usize,
    weight: usize,
    rng: &mut R,
) -> Vec<i64> {
    let mut v = sample_vec_ternary(vector_size, rng);
    let zeros = (0..vector_size).filter(|i| v[*i] == 0).collect::<Vec<_>>();
    let missing = weight
        .min(vector_size)
        .saturating_sub(vector_size - zeros.len());
    for i in index::sample(rng, zeros.len(), missing) {
        v[zeros[i]] = if rng.gen::<bool>() { 1 } else { -1 };
    }
    v
}

/// Sample a uniform integer in `[0, bound)`.
pub fn sample_biguint_below<R: RngCore + CryptoRng>(bound: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_below(bound)
}

#[cfg(test)]
mod tests {
    use super::{
        sample_biguint_below, sample_vec_cbd, sample_vec_gaussian, sample_vec_ternary,
        sample_vec_ternary_with_weight, ErrorDistribution,
    };
    use itertools::Itertools;
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use rand::{thread_rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn cbd() {
        let mut rng = thread_rng();
        assert!(sample_vec_cbd(10, 0, &mut rng).is_err());
        assert!(sample_vec_cbd(10, 17, &mut rng).is_err());

        for var in 1..=16 {
            let v = sample_vec_cbd(10000, var, &mut rng).unwrap();
            assert!(v.iter().all(|vi| vi.unsigned_abs() as usize <= 2 * var));
            let mean = v.iter().sum::<i64>() as f64 / v.len() as f64;
            let variance =
                v.iter().map(|vi| (*vi as f64 - mean).powi(2)).sum::<f64>() / v.len() as f64;
            assert!(mean.abs() < 0.2);
            assert!((variance - var as f64).abs() < 0.2 * var as f64 + 0.2);
        }
    }

    #[test]
    fn gaussian_respects_tail() {
        let mut rng = thread_rng();
        let v = sample_vec_gaussian(10000, 3.0, 2.0, &mut rng).unwrap();
        assert!(v.iter().all(|vi| vi.abs() <= 6));
        // With a tail of two standard deviations, some samples hit the bound.
        assert!(v.iter().any(|vi| vi.abs() >= 4));
        assert!(sample_vec_gaussian(10, -1.0, 6.0, &mut rng).is_err());
        assert!(sample_vec_gaussian(10, 3.0, 0.5, &mut rng).is_err());
    }

    #[test]
    fn distribution_is_reproducible() {
        let dist = ErrorDistribution::default();
        let a = dist.sample_vec(64, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = dist.sample_vec(64, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(dist.bound(), 18);
    }

    #[test]
    fn ternary() {
        let mut rng = thread_rng();
        let v = sample_vec_ternary(3000, &mut rng);
        let counts = v.iter().counts();
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|c| *c > 800));
    }

    #[test]
    fn ternary_with_weight() {
        let mut rng = thread_rng();
        for size in [1, 16, 1024] {
            for weight in [0, size / 2, 3 * size / 4, size, size + 1] {
                let v = sample_vec_ternary_with_weight(size, weight, &mut rng);
                assert_eq!(v.len(), size);
                assert!(v.iter().all(|vi| vi.abs() <= 1));
                assert!(v.iter().filter(|vi| **vi != 0).count() >= weight.min(size));
            }
        }
        // Full weight keeps both signs.
        let counts = sample_vec_ternary_with_weight(3000, 3000, &mut rng)
            .into_iter()
            .counts();
        assert_eq!(counts.len(), 2);
        assert!(counts.values().all(|c| *c > 1300));
    }

    proptest! {
        #[test]
        fn uniform_below(bound in 1u64..) {
            let x = sample_biguint_below(&BigUint::from(bound), &mut thread_rng());
            prop_assert!(x < BigUint::from(bound));
        }
    }
}
