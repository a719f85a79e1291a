#![crate_name = "ringhe_math"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Mathematical utilities for the ringhe library: exact integer arithmetic
//! in the negacyclic ring Z_q[x]/(x^n + 1).

mod coefficient;
mod errors;

pub mod rq;

pub use coefficient::Coefficient;
pub use errors::{Error, Result};
