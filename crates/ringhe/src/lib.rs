#![crate_name = "ringhe"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]
#![doc = include_str!("../README.md")]

mod errors;

pub mod bgv;
pub mod bootstrapping;
pub mod gates;
pub use errors::{Error, ParametersError, Result};

// Test the source code included in the README.
#[macro_use]
extern crate doc_comment;
doctest!("../README.md");
