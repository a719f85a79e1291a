//! Keys for the BGV encryption scheme

mod bootstrapping_key;
mod galois_key;
mod key_set;
mod key_switching_key;
mod public_key;
mod relinearization_key;
mod secret_key;

pub use bootstrapping_key::{BootstrappingKey, RgswCiphertext};
pub use galois_key::{AutomorphismKeys, GaloisKey};
pub(crate) use galois_key::repacking_elements;
pub use key_set::KeySet;
pub use key_switching_key::KeySwitchingKey;
pub use public_key::PublicKey;
pub use relinearization_key::RelinearizationKey;
pub use secret_key::SecretKey;
