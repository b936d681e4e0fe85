//! Professional domain model.
//!
//! # Responsibility
//! - Define the record persisted for each professional.
//! - Validate and normalize name input before it reaches the roster.
//!
//! # Invariants
//! - `id` is generated once and never changes.
//! - `first_name` and `last_name` are trimmed and non-empty.
//! - `created_at` is set at creation and preserved by edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a professional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessionalId(Uuid);

impl ProfessionalId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for ProfessionalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for ProfessionalId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

impl From<Uuid> for ProfessionalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Field-level validation failure for professional names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("first name must not be empty")]
    EmptyFirstName,
    #[error("last name must not be empty")]
    EmptyLastName,
}

/// Validated request to create (or rename) a professional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfessional {
    first_name: String,
    last_name: String,
}

impl NewProfessional {
    /// Trims both names and rejects blank ones.
    pub fn new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.as_ref().trim();
        let last_name = last_name.as_ref().trim();
        if first_name.is_empty() {
            return Err(ValidationError::EmptyFirstName);
        }
        if last_name.is_empty() {
            return Err(ValidationError::EmptyLastName);
        }
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

/// One entry of the roster.
///
/// Serialized with camelCase keys (`firstName`, `lastName`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: ProfessionalId,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl Professional {
    /// Creates a professional with a fresh id and the current timestamp.
    pub fn create(request: NewProfessional) -> Self {
        Self::create_at(request, Utc::now())
    }

    /// Creates a professional with a fresh id and a caller-provided timestamp.
    pub fn create_at(request: NewProfessional, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ProfessionalId::generate(),
            first_name: request.first_name,
            last_name: request.last_name,
            created_at,
        }
    }

    /// Replaces both names, keeping `id` and `created_at`.
    pub fn rename(&mut self, request: NewProfessional) {
        self.first_name = request.first_name;
        self.last_name = request.last_name;
    }

    /// `First Last`, as shown in list views.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Creation date in French short format (`dd/mm/YYYY`).
    pub fn created_on_label(&self) -> String {
        self.created_at.format("%d/%m/%Y").to_string()
    }
}
