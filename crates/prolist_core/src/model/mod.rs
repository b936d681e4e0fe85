//! Domain model for the professional roster.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field-level validation of professional names.
//!
//! # Invariants
//! - Every professional is identified by a stable `ProfessionalId`.
//! - Stored names are trimmed and non-empty.

pub mod professional;
