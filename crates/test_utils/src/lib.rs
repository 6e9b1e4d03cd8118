//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! policy tracker test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, clocks and amounts
//! - `builders`: Builder patterns for policy test data
//! - `harness`: A policy store wired to in-memory ports

pub mod fixtures;
pub mod builders;
pub mod harness;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
