//! Operations over ciphertexts.

mod mul;
mod rescale;

pub use mul::{MultiplicationStrategy, Multiplicator, SwitchKeyMultiplicationKey};
pub use rescale::rescale;
