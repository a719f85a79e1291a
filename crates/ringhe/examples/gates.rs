// Evaluates a one-bit full adder on encrypted bits, then refreshes the
// carry with bootstrapping.

use num_bigint::BigUint;
use rand::thread_rng;
use ringhe::bgv::{BgvParametersBuilder, Ciphertext, KeySet, Plaintext};
use ringhe::bootstrapping::{Bootstrapper, BootstrappingParameters, ExternalProductRotation};
use ringhe::gates::GateEvaluator;
use ringhe_traits::{FheDecrypter, FheEncrypter};
use std::error::Error;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut rng = thread_rng();
    let params = BgvParametersBuilder::new()
        .set_degree(8)
        .set_plaintext_modulus(16)
        .set_ciphertext_modulus(&BigUint::from(1u64 << 10))
        .set_bootstrapping_modulus(&(BigUint::from(1u64) << 80))
        .build_arc()?;
    info!(?params, "parameters");

    let keys = KeySet::generate(&params, &mut rng)?;
    let gates = GateEvaluator::new(keys.relinearization_key().clone());
    let bootstrapper = Bootstrapper::new(
        BootstrappingParameters::new(&params, &BigUint::from(8u64))?,
        Arc::new(ExternalProductRotation::new(
            keys.bootstrapping_key().ok_or("missing bootstrapping key")?,
        )),
        keys.automorphism_keys()
            .ok_or("missing automorphism keys")?
            .clone(),
    )?;

    let decrypt_bit = |ct: &Ciphertext| -> Result<u64, Box<dyn Error>> {
        let pt: Plaintext = keys.secret_key().try_decrypt(ct)?;
        Ok(pt.value()[0])
    };

    for (a, b, carry_in) in [(0u64, 0u64, 1u64), (1, 0, 1), (1, 1, 0), (1, 1, 1)] {
        let [ct_a, ct_b, ct_c] = [a, b, carry_in].map(|bit| {
            keys.public_key()
                .try_encrypt(&Plaintext::constant(bit, &params), &mut thread_rng())
        });
        let (ct_a, ct_b, ct_c) = (ct_a?, ct_b?, ct_c?);

        let partial = gates.xor(&ct_a, &ct_b)?;
        let sum = gates.xor(&partial, &ct_c)?;
        let carry = gates.or(&gates.and(&ct_a, &ct_b)?, &gates.and(&partial, &ct_c)?)?;
        let noise = keys.secret_key().measure_noise(&carry)?;
        let carry = bootstrapper.bootstrap(&carry)?;

        info!(
            a,
            b,
            carry_in,
            sum = decrypt_bit(&sum)?,
            carry = decrypt_bit(&carry)?,
            noise_before = noise,
            noise_after = keys.secret_key().measure_noise(&carry)?,
            "full adder"
        );
    }
    Ok(())
}
