//! Core Kernel - Foundational types and utilities for the policy tracker
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Opaque identifiers
//! - Calendar helpers (ages, renewals, month labels) and the `Clock` port
//! - The shared port error type and health check primitives

pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use temporal::{
    AgeGroup, Clock, ManualClock, SystemClock, TemporalError, Timezone,
    DEFAULT_DUE_SOON_DAYS,
    age_group, calculate_age, days_until_renewal, is_renewal_due_soon, month_label,
    next_anniversary,
};
pub use identifiers::{PolicyId, ReminderId};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
pub use error::CoreError;
