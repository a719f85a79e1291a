#![warn(missing_docs, unused_imports)]

//! The BGV homomorphic encryption scheme, with plaintexts encoded in the
//! least significant bits of the phase.

mod ciphertext;
mod keys;
mod ops;
mod parameters;
mod plaintext;

pub mod noise;

pub use ciphertext::{Ciphertext, QuadraticCiphertext};
pub(crate) use keys::repacking_elements;
pub use keys::{
    AutomorphismKeys, BootstrappingKey, GaloisKey, KeySet, KeySwitchingKey, PublicKey,
    RelinearizationKey, RgswCiphertext, SecretKey,
};
pub use ops::{rescale, MultiplicationStrategy, Multiplicator, SwitchKeyMultiplicationKey};
pub use parameters::{
    BgvParameters, BgvParametersBuilder, ModulusChooser, PowerOfTwo, SmallestPrime,
};
pub use plaintext::Plaintext;
