//! Repacking of n ciphertexts into one, keeping the constant coefficient of
//! each input.

use num_bigint::{BigInt, BigUint};
use tracing::instrument;

use crate::bgv::{repacking_elements, AutomorphismKeys, Ciphertext};
use crate::{Error, ParametersError, Result};

/// Combine n ciphertexts `c_0, ..., c_{n-1}` at the same modulus into one
/// ciphertext whose phase is `n * sum_i v_i * x^i`, where v_i is the constant
/// coefficient of the phase of c_i.
///
/// The other coefficients of the inputs are cancelled by the automorphisms
/// `x -> x^(2^l + 1)`, whose keys must be in `keys`.
#[instrument(skip_all)]
pub fn repack(inputs: &[Ciphertext], keys: &AutomorphismKeys) -> Result<Ciphertext> {
    let n = keys.par.degree();
    if inputs.len() != n {
        return Err(Error::ArithmeticPrecondition(format!(
            "Repacking requires {n} ciphertexts, got {}",
            inputs.len()
        )));
    }
    for ct in &inputs[1..] {
        ct.check_compatible(&inputs[0])?;
    }
    if inputs[0].par != keys.par {
        return Err(Error::ArithmeticPrecondition(
            "Incompatible BGV parameters".to_string(),
        ));
    }

    let log_n = n.ilog2() as usize;
    let elements = repacking_elements(n);
    let mut current = inputs.to_vec();
    for (l, element) in (1..=log_n).zip(elements) {
        let half = 1 << (log_n - l);
        let mut next = Vec::with_capacity(half);
        for r in 0..half {
            let shifted = current[r + half].mul_monomial(half);
            let sum = &current[r] + &shifted;
            let difference = &current[r] - &shifted;
            next.push(&sum + &keys.eval_auto(&difference, element)?);
        }
        current = next;
    }
    Ok(current.swap_remove(0))
}

/// Same as [`repack`], with the inputs first multiplied by n^-1 modulo their
/// modulus so that the output phase is `sum_i v_i * x^i`. Requires n to be
/// invertible modulo the ciphertext modulus.
pub fn repack_normalized(inputs: &[Ciphertext], keys: &AutomorphismKeys) -> Result<Ciphertext> {
    let first = inputs.first().ok_or_else(|| {
        Error::ArithmeticPrecondition("Repacking requires ciphertexts".to_string())
    })?;
    let n = BigUint::from(keys.par.degree());
    let modulus = first.ctx().modulus();
    let inverse = ringhe_util::inverse_biguint(&n, modulus).ok_or_else(|| {
        Error::ParametersError(ParametersError::InvalidModulus(format!(
            "The degree {n} is not invertible modulo {modulus}"
        )))
    })?;
    let inverse = BigInt::from(inverse);
    let scaled = inputs.iter().map(|ct| ct.scalar_mul(&inverse)).collect::<Vec<_>>();
    repack(&scaled, keys)
}

#[cfg(test)]
mod tests {
    use super::{repack, repack_normalized};
    use crate::bgv::{
        AutomorphismKeys, BgvParameters, BgvParametersBuilder, Ciphertext, Plaintext, SecretKey,
    };
    use crate::bootstrapping::{embed, extract};
    use crate::{Error, ParametersError};
    use rand::{thread_rng, Rng};
    use ringhe_traits::{FheDecrypter, FheEncoder, FheEncrypter};
    use std::error::Error as StdError;

    #[test]
    fn repack_constant_coefficients() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BgvParameters::default_arc(8);
        let n = params.degree();
        let t = params.plaintext();
        let sk = SecretKey::random(&params, &mut rng)?;
        let keys = AutomorphismKeys::for_repacking(&sk, &mut rng)?;

        let mut constants = Vec::with_capacity(n);
        let mut inputs = Vec::with_capacity(n);
        for _ in 0..n {
            let values: Vec<u64> = (0..n).map(|_| rng.gen_range(0..t)).collect();
            constants.push(values[0]);
            let pt = Plaintext::try_encode(values.as_slice(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;
            inputs.push(ct);
        }

        let packed = repack(&inputs, &keys)?;
        let expected = constants.iter().map(|v| (v * n as u64) % t).collect::<Vec<_>>();
        let pt: Plaintext = sk.try_decrypt(&packed)?;
        assert_eq!(pt.value(), expected.as_slice());
        println!("Noise: {}", sk.measure_noise(&packed)?);

        let packed = repack_normalized(&inputs, &keys)?;
        let pt: Plaintext = sk.try_decrypt(&packed)?;
        assert_eq!(pt.value(), constants.as_slice());
        Ok(())
    }

    #[test]
    fn extract_then_repack() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(16)
            .set_ciphertext_modulus_size(60)
            .set_bootstrapping_extension(80)
            .build_arc()?;
        let sk = SecretKey::random(&params, &mut rng)?;
        let keys = AutomorphismKeys::for_repacking(&sk, &mut rng)?;

        for _ in 0..5 {
            let values: Vec<u64> = (0..params.degree())
                .map(|_| rng.gen_range(0..params.plaintext()))
                .collect();
            let pt = Plaintext::try_encode(values.as_slice(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;

            let embedded = extract(&ct)
                .iter()
                .map(|sample| embed(sample, ct.ctx(), &params))
                .collect::<crate::Result<Vec<_>>>()?;
            let packed = repack_normalized(&embedded, &keys)?;
            assert_eq!(packed.ctx(), ct.ctx());
            assert_eq!(sk.try_decrypt(&packed)?, pt);
            println!("Noise: {}", sk.measure_noise(&packed)?);
        }
        Ok(())
    }

    #[test]
    fn errors() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = BgvParameters::bootstrapping_arc();
        let sk = SecretKey::random(&params, &mut rng)?;
        let ct: Ciphertext = sk.try_encrypt(&Plaintext::constant(1, &params), &mut rng)?;

        // Missing keys.
        let keys = AutomorphismKeys::new(&sk, &[3], &mut rng)?;
        let inputs = vec![ct.clone(); params.degree()];
        assert_eq!(
            repack(&inputs, &keys).err(),
            Some(Error::ParametersError(ParametersError::InvalidGaloisElement(5)))
        );

        // Wrong number of inputs.
        let keys = AutomorphismKeys::for_repacking(&sk, &mut rng)?;
        assert!(matches!(
            repack(&inputs[1..], &keys),
            Err(Error::ArithmeticPrecondition(_))
        ));

        // The degree is not invertible modulo a power of two.
        assert!(matches!(
            repack_normalized(&inputs, &keys),
            Err(Error::ParametersError(ParametersError::InvalidModulus(_)))
        ));
        Ok(())
    }
}
