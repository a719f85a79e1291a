//! Boolean gates over encrypted bits.
//!
//! A bit is the constant coefficient of the plaintext, encoded as 0 or 1 for
//! any plaintext modulus t >= 2.

use std::sync::Arc;

use tracing::instrument;

use crate::bgv::{BgvParameters, Ciphertext, MultiplicationStrategy, Plaintext};
use crate::Result;

/// Evaluates boolean gates with a multiplication strategy.
#[derive(Debug, Clone)]
pub struct GateEvaluator {
    strategy: Arc<dyn MultiplicationStrategy>,
    one: Plaintext,
}

impl GateEvaluator {
    /// Create a gate evaluator.
    pub fn new(strategy: Arc<dyn MultiplicationStrategy>) -> Self {
        let one = Plaintext::constant(1, strategy.parameters());
        Self { strategy, one }
    }

    /// The parameters of the evaluator.
    pub fn parameters(&self) -> &Arc<BgvParameters> {
        self.strategy.parameters()
    }

    /// NOT(a) = 1 - a.
    pub fn not(&self, a: &Ciphertext) -> Result<Ciphertext> {
        (-a).add_plain(&self.one)
    }

    /// AND(a, b) = a * b.
    #[instrument(skip_all)]
    pub fn and(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.strategy.multiply(a, b)
    }

    /// OR(a, b) = NOT(AND(NOT a, NOT b)).
    pub fn or(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.not(&self.and(&self.not(a)?, &self.not(b)?)?)
    }

    /// NAND(a, b) = NOT(AND(a, b)).
    pub fn nand(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.not(&self.and(a, b)?)
    }

    /// NOR(a, b) = NOT(OR(a, b)).
    pub fn nor(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.not(&self.or(a, b)?)
    }

    /// XOR(a, b) = AND(OR(a, b), NAND(a, b)).
    pub fn xor(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.and(&self.or(a, b)?, &self.nand(a, b)?)
    }

    /// XNOR(a, b) = NOT(XOR(a, b)).
    pub fn xnor(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.not(&self.xor(a, b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::GateEvaluator;
    use crate::bgv::{
        BgvParametersBuilder, Ciphertext, KeySet, Plaintext, PowerOfTwo,
        SwitchKeyMultiplicationKey,
    };
    use rand::thread_rng;
    use ringhe_traits::{FheDecrypter, FheEncrypter};
    use std::error::Error;
    use std::sync::Arc;

    type Gate = fn(&GateEvaluator, &Ciphertext, &Ciphertext) -> crate::Result<Ciphertext>;

    const GATES: [(&str, Gate, fn(bool, bool) -> bool); 6] = [
        ("and", GateEvaluator::and, |a, b| a & b),
        ("or", GateEvaluator::or, |a, b| a | b),
        ("xor", GateEvaluator::xor, |a, b| a ^ b),
        ("nand", GateEvaluator::nand, |a, b| !(a & b)),
        ("nor", GateEvaluator::nor, |a, b| !(a | b)),
        ("xnor", GateEvaluator::xnor, |a, b| a == b),
    ];

    #[test]
    fn truth_tables() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        let params = BgvParametersBuilder::new()
            .set_degree(8)
            .set_plaintext_modulus(2)
            .set_ciphertext_modulus_size(8)
            .set_modulus_chooser(PowerOfTwo)
            .build_arc()?;

        for _ in 0..100 {
            let keys = KeySet::generate_basic(&params, &mut rng)?;
            let gates = GateEvaluator::new(keys.relinearization_key().clone());
            let bits = [false, true]
                .into_iter()
                .map(|bit| {
                    let pt = Plaintext::constant(bit as u64, &params);
                    keys.public_key().try_encrypt(&pt, &mut rng)
                })
                .collect::<crate::Result<Vec<Ciphertext>>>()?;

            for a in [false, true] {
                let ct_a = &bits[a as usize];
                let not: Plaintext = keys.secret_key().try_decrypt(&gates.not(ct_a)?)?;
                assert_eq!(not.value()[0], !a as u64);

                for b in [false, true] {
                    let ct_b = &bits[b as usize];
                    for (name, gate, expected) in GATES {
                        let pt: Plaintext = keys.secret_key().try_decrypt(&gate(&gates, ct_a, ct_b)?)?;
                        assert_eq!(pt.value()[0], expected(a, b) as u64, "{name}({a}, {b})");
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn switch_key_strategy() -> Result<(), Box<dyn Error>> {
        let mut rng = thread_rng();
        // A prime modulus, so that decryption depends on the noise.
        let params = BgvParametersBuilder::new()
            .set_degree(16)
            .set_plaintext_modulus(3)
            .set_ciphertext_modulus_size(100)
            .build_arc()?;
        let keys = KeySet::generate_basic(&params, &mut rng)?;
        let strategy = SwitchKeyMultiplicationKey::new(keys.secret_key(), &mut rng)?;
        let gates = GateEvaluator::new(Arc::new(strategy));

        for a in [false, true] {
            for b in [false, true] {
                let ct_a: Ciphertext = keys
                    .secret_key()
                    .try_encrypt(&Plaintext::constant(a as u64, &params), &mut rng)?;
                let ct_b: Ciphertext = keys
                    .secret_key()
                    .try_encrypt(&Plaintext::constant(b as u64, &params), &mut rng)?;
                for (name, gate, expected) in GATES {
                    let result = gate(&gates, &ct_a, &ct_b)?;
                    let pt: Plaintext = keys.secret_key().try_decrypt(&result)?;
                    assert_eq!(pt, Plaintext::constant(expected(a, b) as u64, &params), "{name}");
                    println!("Noise: {}", keys.secret_key().measure_noise(&result)?);
                }
            }
        }
        Ok(())
    }
}
