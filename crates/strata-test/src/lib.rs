//! Strata Test Harness - Lifecycle and promotion validation
//!
//! This crate provides:
//! - A fixture algorithm catalog
//! - A registry whose async loads complete on demand
//! - A transport that records its configuration
//! - Hand-written classes whose hooks fail
//! - End-to-end bootstrap and promotion scenarios

pub mod fixtures;
pub mod harness;
pub mod integration;

pub use fixtures::*;
pub use harness::*;
pub use integration::*;
