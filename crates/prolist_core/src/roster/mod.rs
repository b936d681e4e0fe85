//! In-memory roster of professionals.
//!
//! # Responsibility
//! - Hold the ordered collection and implement add/edit/delete/import.
//! - Reject invalid input without touching the collection.
//!
//! # Invariants
//! - Insertion order is preserved; edits happen in place.
//! - Ids are unique within the collection and never change.
//! - A failed operation leaves the collection exactly as it was.
//! - Stored arrays are checked on decode; one bad entry rejects the whole array.

use crate::model::professional::{NewProfessional, Professional, ProfessionalId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Failure of a roster operation. The collection is unchanged when returned.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("professional not found: {0}")]
    NotFound(ProfessionalId),
    #[error("duplicate professional id in stored roster: {0}")]
    DuplicateId(ProfessionalId),
    #[error("stored professional {id} is invalid: {source}")]
    InvalidEntry {
        id: ProfessionalId,
        #[source]
        source: ValidationError,
    },
    #[error("no valid professional found; expected one `first,last` pair per line")]
    NoValidRecords,
    #[error("failed to read import file `{}`: {source}", .path.display())]
    ImportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered collection of professionals, persisted as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Professional>", into = "Vec<Professional>")]
pub struct Roster {
    entries: Vec<Professional>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Professional> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Professional] {
        &self.entries
    }

    pub fn get(&self, id: ProfessionalId) -> Option<&Professional> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Appends a professional with a fresh id and the current timestamp.
    pub fn add(&mut self, first_name: &str, last_name: &str) -> Result<Professional, RosterError> {
        let request = NewProfessional::new(first_name, last_name)?;
        let professional = Professional::create(request);
        self.entries.push(professional.clone());
        Ok(professional)
    }

    /// Renames the professional with `id` in place.
    ///
    /// Name validation runs before the lookup.
    pub fn edit(
        &mut self,
        id: ProfessionalId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Professional, RosterError> {
        let request = NewProfessional::new(first_name, last_name)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(RosterError::NotFound(id))?;
        entry.rename(request);
        Ok(entry.clone())
    }

    /// Removes the professional with `id`, returning it when it existed.
    pub fn delete(&mut self, id: ProfessionalId) -> Option<Professional> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Appends one professional per request, in input order.
    ///
    /// Returns the number of appended entries.
    pub fn import_batch(&mut self, entries: impl IntoIterator<Item = NewProfessional>) -> usize {
        let before = self.entries.len();
        self.entries
            .extend(entries.into_iter().map(Professional::create));
        self.entries.len() - before
    }
}

impl TryFrom<Vec<Professional>> for Roster {
    type Error = RosterError;

    /// Accepts a decoded array only when ids are unique and names are non-blank.
    fn try_from(entries: Vec<Professional>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(RosterError::DuplicateId(entry.id));
            }
            NewProfessional::new(&entry.first_name, &entry.last_name).map_err(|source| {
                RosterError::InvalidEntry {
                    id: entry.id,
                    source,
                }
            })?;
        }
        Ok(Self { entries })
    }
}

impl From<Roster> for Vec<Professional> {
    fn from(roster: Roster) -> Self {
        roster.entries
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Professional;
    type IntoIter = std::slice::Iter<'a, Professional>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
