//! Strata Registry - the algorithm catalog
//!
//! This crate implements the function registry the client bootstraps from:
//! - Signature loading, synchronous or on the async runtime
//! - Bound/unbound bookkeeping as proxy types import their API
//! - Call construction from positional or named arguments

pub mod catalog;
pub mod registry;
pub mod source;

pub use catalog::*;
pub use registry::*;
pub use source::*;
