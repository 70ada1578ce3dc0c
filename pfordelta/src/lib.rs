#![doc = include_str!("../README.md")]
#![deny(clippy::unused_unit)]
#![deny(dead_code)]

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
struct ReadmeDoctest;

pub use codec::{dispatch, dispatch_default, Codec, CodecId};
pub use config::EncodeConfig;
pub use errors::{ErrorKind, PfdError, PfdResult};
pub use gap::{gap_decode, gap_encode, OrderingViolation};
pub use progress::{BuildProgress, Progress};

/// for packaging posting lists into the two-file container format
pub mod container;

mod bitio;
mod bits;
mod codec;
mod config;
mod constants;
mod errors;
mod gap;
mod progress;

#[cfg(test)]
mod tests;
