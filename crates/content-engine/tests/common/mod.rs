//! Shared test utilities for content-engine integration tests.
//!
//! - `replies`: canned provider replies for every stage
//! - `builders`: scripted clients and engines wired from those replies

pub mod builders;
pub mod replies;

pub use builders::*;
