//! # Crewboard Shared Library
//!
//! This crate contains the types and business logic shared across the
//! Crewboard API server and tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Authentication and authorization primitives
//! - `db`: Connection pool and migration runner
//! - `board`: Optimistic client board state

pub mod auth;
pub mod board;
pub mod db;
pub mod models;

/// Current version of the Crewboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
