//! Extraction of LWE samples from the coefficients of a ciphertext.

use std::sync::Arc;

use num_bigint::BigInt;
use ringhe_math::rq::{Context, Poly};

use crate::bgv::{BgvParameters, Ciphertext};
use crate::Result;

/// An LWE sample `(a, b)` over the coefficient vector of the secret key:
/// `a - <b, s>` is one coefficient of the phase of the ciphertext it was
/// extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSample {
    /// The public scalar.
    pub a: BigInt,
    /// The public vector, with n entries.
    pub b: Box<[BigInt]>,
}

/// Extract the n samples of a ciphertext, one per coefficient of its phase.
///
/// The values are integers, taken from the representatives in [0, q) of the
/// ciphertext coefficients: sample i satisfies `a - <b, s> = phase[i]` over
/// the integers, up to a multiple of q.
pub fn extract(ct: &Ciphertext) -> Vec<ExtractedSample> {
    let n = ct.ctx().degree;
    let body = ct.body().to_bigints();
    let mask = ct.mask().to_bigints();
    (0..n)
        .map(|i| {
            let b = (0..n)
                .map(|j| {
                    if j <= i {
                        mask[i - j].clone()
                    } else {
                        -&mask[n + i - j]
                    }
                })
                .collect();
            ExtractedSample {
                a: body[i].clone(),
                b,
            }
        })
        .collect()
}

/// Embed a sample as a ciphertext at the given context, whose phase has
/// `a - <b, s>` as constant coefficient.
pub fn embed(
    sample: &ExtractedSample,
    ctx: &Arc<Context>,
    par: &Arc<BgvParameters>,
) -> Result<Ciphertext> {
    let n = ctx.degree;
    let mut mask = vec![BigInt::default(); n];
    mask[0] = sample.b[0].clone();
    for j in 1..n {
        mask[n - j] = -&sample.b[j];
    }
    Ciphertext::new(
        Poly::from_bigints(&[sample.a.clone()], ctx)?,
        Poly::from_bigints(&mask, ctx)?,
        par,
    )
}

#[cfg(test)]
mod tests {
    use super::{embed, extract};
    use crate::bgv::{BgvParameters, Ciphertext, Plaintext, SecretKey};
    use num_bigint::BigInt;
    use rand::{thread_rng, Rng};
    use ringhe_traits::{FheDecrypter, FheEncoder, FheEncrypter};
    use std::error::Error;

    #[test]
    fn samples_match_phase() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        for params in [BgvParameters::default_arc(8), BgvParameters::bootstrapping_arc()] {
            let sk = SecretKey::random(&params, &mut rng)?;
            let values: Vec<u64> = (0..params.degree())
                .map(|_| rng.gen_range(0..params.plaintext()))
                .collect();
            let pt = Plaintext::try_encode(values.as_slice(), &params)?;
            let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;

            let phase = sk.phase(&ct)?.to_bigints();
            let q = BigInt::from(params.ciphertext_modulus().clone());
            let samples = extract(&ct);
            assert_eq!(samples.len(), params.degree());
            for (i, sample) in samples.iter().enumerate() {
                let inner: BigInt = sample
                    .b
                    .iter()
                    .zip(sk.coeffs.iter())
                    .map(|(b, s)| b * *s)
                    .sum();
                let mut value = (&sample.a - inner) % &q;
                if value < BigInt::from(0) {
                    value += &q;
                }
                assert_eq!(value, phase[i]);

                // The embedding decrypts to the i-th coefficient.
                let embedded = embed(sample, &params.ctx, &params)?;
                let decrypted: Plaintext = sk.try_decrypt(&embedded)?;
                assert_eq!(decrypted.value()[0], values[i]);
            }
        }
        Ok(())
    }
}
