//! Core use-case services.
//!
//! # Responsibility
//! - Bind the in-memory roster to its persisted store key.
//! - Keep front-ends decoupled from storage and parsing details.

pub mod roster_service;
