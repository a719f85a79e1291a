use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error in the underlying library was encountered.
    #[error("{0}")]
    Default(String),

    /// Indicates that the polynomials do not share the same context.
    #[error("Invalid context provided.")]
    InvalidContext,

    /// Indicates an invalid modulus.
    #[error("Invalid modulus: {0}")]
    InvalidModulus(String),

    /// Indicates that an automorphism index is not a unit modulo 2n.
    #[error("Invalid Galois element: {0} is not coprime to twice the degree")]
    InvalidGaloisElement(usize),

    /// Indicates a serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
