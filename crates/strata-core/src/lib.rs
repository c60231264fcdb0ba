//! Strata Core - Fundamental types shared by the client crates
//!
//! This crate defines:
//! - Dynamic argument values and computed expressions
//! - Proxy values, capability tags, and proxy type descriptors
//! - Algorithm signatures and the catalog wire format
//! - Initialization state and endpoint configuration

pub mod class;
pub mod config;
pub mod error;
pub mod signature;
pub mod state;
pub mod value;

pub use class::*;
pub use config::*;
pub use error::*;
pub use signature::*;
pub use state::*;
pub use value::*;
