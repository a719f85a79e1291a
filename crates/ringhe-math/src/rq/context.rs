use num_bigint::{BigInt, BigUint};
use num_traits::One;
use ringhe_traits::Serialize;
use std::{fmt::Debug, sync::Arc};

use crate::{Coefficient, Error, Result};

/// Struct that holds the context associated with elements in rq.
#[derive(Clone, PartialEq, Eq)]
pub struct Context<C: Coefficient = BigInt> {
    /// Polynomial degree (must be power of 2)
    pub degree: usize,
    /// The modulus, in the coefficient type
    pub(crate) q: C,
    /// The modulus as an unsigned big integer
    modulus: BigUint,
    /// floor(q / 2), the largest non-negative centered representative
    pub(crate) half_q: C,
}

impl<C: Coefficient> Debug for Context<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("degree", &self.degree)
            .field("modulus", &self.modulus)
            .finish()
    }
}

impl<C: Coefficient> Context<C> {
    /// Creates a context from a modulus and a polynomial degree.
    ///
    /// Returns an error if the degree is not a power of two, if the modulus is
    /// smaller than 2, or if it does not fit the coefficient type.
    pub fn new(modulus: &BigUint, degree: usize) -> Result<Self> {
        if !degree.is_power_of_two() || degree < 2 {
            return Err(Error::Default(
                "The degree is not a power of two larger or equal to 2".to_string(),
            ));
        }
        if modulus <= &BigUint::one() {
            return Err(Error::InvalidModulus(modulus.to_string()));
        }
        if let Some(max_bits) = C::MAX_MODULUS_BITS {
            if modulus.bits() > max_bits {
                return Err(Error::InvalidModulus(format!(
                    "{modulus} does not fit in {max_bits} bits"
                )));
            }
        }
        let q = C::from_biguint(modulus).ok_or_else(|| Error::InvalidModulus(modulus.to_string()))?;
        let half_q = C::from_biguint(&(modulus >> 1usize))
            .ok_or_else(|| Error::InvalidModulus(modulus.to_string()))?;
        Ok(Self {
            degree,
            q,
            modulus: modulus.clone(),
            half_q,
        })
    }

    /// Creates a context in an `Arc`.
    pub fn new_arc(modulus: &BigUint, degree: usize) -> Result<Arc<Self>> {
        Self::new(modulus, degree).map(Arc::new)
    }

    /// Returns the modulus as a BigUint.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the modulus in the coefficient type.
    pub fn modulus_coefficient(&self) -> &C {
        &self.q
    }

    /// Returns the number of bits needed to write any reduced coefficient.
    pub fn coefficient_bits(&self) -> usize {
        (&self.modulus - BigUint::one()).bits().max(1) as usize
    }

    /// Returns the polynomial degree.
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Returns whether `other` has the same degree and a modulus dividing
    /// this one.
    pub fn is_multiple_of(&self, other: &Context<C>) -> bool {
        self.degree == other.degree && (&self.modulus % &other.modulus) == BigUint::default()
    }

    /// Parses a context header written by [`Serialize::to_bytes`], returning
    /// the context and the number of bytes read.
    pub fn from_header(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < 8 {
            return Err(Error::Serialization("Invalid context header".to_string()));
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[..4]);
        let degree = u32::from_le_bytes(word) as usize;
        word.copy_from_slice(&bytes[4..8]);
        let modulus_len = u32::from_le_bytes(word) as usize;
        if bytes.len() < 8 + modulus_len {
            return Err(Error::Serialization("Invalid context header".to_string()));
        }
        let modulus = BigUint::from_bytes_le(&bytes[8..8 + modulus_len]);
        Ok((Self::new(&modulus, degree)?, 8 + modulus_len))
    }
}

impl<C: Coefficient> Serialize for Context<C> {
    fn to_bytes(&self) -> Vec<u8> {
        let modulus = self.modulus.to_bytes_le();
        let mut bytes = Vec::with_capacity(8 + modulus.len());
        bytes.extend_from_slice(&(self.degree as u32).to_le_bytes());
        bytes.extend_from_slice(&(modulus.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&modulus);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::rq::Context;
    use num_bigint::{BigInt, BigUint};
    use ringhe_traits::Serialize;

    #[test]
    fn context_constructor() {
        let q = BigUint::from(1153u64);
        assert!(Context::<BigInt>::new(&q, 8).is_ok());
        assert!(Context::<i128>::new(&q, 8).is_ok());
        assert!(Context::<BigInt>::new(&q, 12).is_err());
        assert!(Context::<BigInt>::new(&q, 1).is_err());
        assert!(Context::<BigInt>::new(&BigUint::from(1u64), 8).is_err());

        // Large moduli are only supported with exact coefficients.
        let big = BigUint::from(1u64) << 200;
        assert!(Context::<BigInt>::new(&big, 16).is_ok());
        assert_eq!(
            Context::<i128>::new(&big, 16).err(),
            Some(crate::Error::InvalidModulus(format!(
                "{big} does not fit in 62 bits"
            )))
        );
    }

    #[test]
    fn divisibility() -> Result<(), Box<dyn Error>> {
        let ctx_big = Context::<BigInt>::new(&(BigUint::from(1u64) << 40), 16)?;
        let ctx_small = Context::<BigInt>::new(&BigUint::from(64u64), 16)?;
        let ctx_other = Context::<BigInt>::new(&BigUint::from(63u64), 16)?;
        assert!(ctx_big.is_multiple_of(&ctx_small));
        assert!(!ctx_big.is_multiple_of(&ctx_other));
        assert_eq!(ctx_small.coefficient_bits(), 6);
        assert_eq!(ctx_other.coefficient_bits(), 6);
        Ok(())
    }

    #[test]
    fn header() -> Result<(), Box<dyn Error>> {
        let ctx = Context::<BigInt>::new(&((BigUint::from(1u64) << 80) + 13u64), 32)?;
        let mut bytes = ctx.to_bytes();
        bytes.extend_from_slice(&[1, 2, 3]);
        let (parsed, read) = Context::<BigInt>::from_header(&bytes)?;
        assert_eq!(parsed, ctx);
        assert_eq!(read, bytes.len() - 3);
        assert!(Context::<BigInt>::from_header(&bytes[..5]).is_err());
        Ok(())
    }
}
