//! Strata Transport Layer - endpoint state and catalog fetching
//!
//! This crate provides:
//! - The `Transport` lifecycle contract used by the client bootstrap
//! - `EndpointTransport`, which tracks the configured endpoints
//! - A blocking fetch of the algorithm catalog over HTTP

pub mod endpoint;
pub mod http;

pub use endpoint::*;
