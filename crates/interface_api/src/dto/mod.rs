//! Request/response data transfer objects

pub mod policy;
