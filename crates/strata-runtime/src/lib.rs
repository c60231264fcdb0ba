//! Strata Runtime - Client bootstrap and type coercion
//!
//! This crate implements the client core:
//! 1. Initialization controller (sync/async bootstrap, callback coalescing)
//! 2. Hand-written class hooks
//! 3. Class generation from the algorithm catalog
//! 4. Unbound algorithm namespace
//! 5. Type promotion and proxy construction
//! 6. Process-wide default client

pub mod classes;
pub mod classify;
pub mod client;
mod construct;
pub mod generator;
pub mod global;
pub mod namespace;
mod promote;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use classes::*;
pub use classify::*;
pub use client::*;
pub use generator::*;
pub use namespace::*;
pub use types::*;

pub use strata_core::{EndpointConfig, InitState, StrataError, StrataResult, Value, TILE_SIZE};
