use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error from the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(ringhe_math::Error),

    /// Indicates a serialization error.
    #[error("Serialization error")]
    SerializationError,

    /// Indicates that too many values were provided.
    #[error("Too many values provided: {0} exceeds limit {1}")]
    TooManyValues(usize, usize),

    /// Indicates that too few values were provided.
    #[error("Too few values provided: {0} is below limit {1}")]
    TooFewValues(usize, usize),

    /// Indicates that two operands, or an operand and a key, do not live in
    /// the same parameter set or modulus.
    #[error("Arithmetic precondition violated: {0}")]
    ArithmeticPrecondition(String),

    /// Indicates a parameter error.
    #[error("{0}")]
    ParametersError(ParametersError),

    /// Indicates a default error
    #[error("{0}")]
    DefaultError(String),
}

impl From<ringhe_math::Error> for Error {
    fn from(e: ringhe_math::Error) -> Self {
        match e {
            ringhe_math::Error::InvalidGaloisElement(k) => {
                Error::ParametersError(ParametersError::InvalidGaloisElement(k))
            }
            e => Error::MathError(e),
        }
    }
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2 larger or equal to 2")]
    InvalidDegree(usize),

    /// Indicates that the plaintext modulus is invalid.
    #[error("Invalid plaintext: {0}")]
    InvalidPlaintext(String),

    /// Indicates that a ciphertext modulus is invalid.
    #[error("Invalid modulus: {0}")]
    InvalidModulus(String),

    /// Indicates that a modulus does not split as requested.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Indicates that an automorphism index is not coprime to twice the
    /// degree.
    #[error("Invalid Galois element: {0}")]
    InvalidGaloisElement(usize),

    /// Indicates that the gadget decomposition base is invalid.
    #[error("Invalid decomposition base: 2^{0}")]
    InvalidDecompositionBase(usize),

    /// Indicates that a sampling distribution is invalid.
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Indicates that no modulus of the requested size could be found.
    #[error("No modulus of {0} bits for polynomials of degree {1}")]
    NotEnoughPrimes(usize, usize),

    /// Indicates that too few parameters were specified.
    #[error("{0}")]
    TooFewSpecified(String),

    /// Indicates that too many parameters were specified.
    #[error("{0}")]
    TooManySpecified(String),
}
