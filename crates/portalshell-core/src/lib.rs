//! Portal Shell Core: shared abstractions.
//!
//! This crate defines the identifiers, wire protocol, and host ports that the
//! shell and its embedded frames agree on. It contains no runtime code.

pub mod address;
pub mod clock;
pub mod error;
pub mod host;
pub mod ids;
pub mod protocol;
pub mod rng;
pub mod scheduler;
