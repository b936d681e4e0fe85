//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define synchronous data access contracts over the embedded database.
//! - Isolate SQLite query details from the async store adapter.
//!
//! # Invariants
//! - Repositories only accept connections with the latest schema applied.

pub mod app_data_repo;
