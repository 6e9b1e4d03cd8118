//! Infrastructure Storage Layer
//!
//! This crate provides the persistence adapter for the policy store. The
//! whole policy list is one unit of storage: it is read once when the store
//! loads and rewritten on every change.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_storage::JsonFileRepository;
//! use std::sync::Arc;
//!
//! let repository = Arc::new(JsonFileRepository::new("data/policies.json"));
//! let store = PolicyStore::new(repository, dispatcher, clock, settings);
//! ```

pub mod error;
pub mod json_file;

pub use error::StorageError;
pub use json_file::JsonFileRepository;
