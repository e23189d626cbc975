//! Owner-scoped access control.
//!
//! A single policy governs both what a caller can list and what a caller can
//! modify: a record is visible and writable only through the identity stored
//! as its owner. Repositories bind [`OwnerScope::owner_id`] into every query,
//! and handlers pass loaded records through [`OwnerScope::authorize`]. Records
//! owned by someone else are reported as not found, never as forbidden, so
//! callers cannot discover the existence of other users' ids.

use crate::error::CoreError;
use crate::types::DbId;

/// A record that belongs to exactly one user.
pub trait Owned {
    /// Entity name used in not-found errors (e.g. `"Project"`).
    const ENTITY: &'static str;

    fn id(&self) -> DbId;

    fn owner_id(&self) -> DbId;
}

/// The identity that every scoped read and write runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    owner_id: DbId,
}

impl OwnerScope {
    pub fn new(owner_id: DbId) -> Self {
        Self { owner_id }
    }

    pub fn owner_id(&self) -> DbId {
        self.owner_id
    }

    pub fn permits(&self, owner_id: DbId) -> bool {
        self.owner_id == owner_id
    }

    /// Object-level check for a loaded record.
    pub fn authorize<T: Owned>(&self, record: T) -> Result<T, CoreError> {
        if self.permits(record.owner_id()) {
            Ok(record)
        } else {
            Err(Self::not_found::<T>(record.id()))
        }
    }

    /// Resolve an optional scoped lookup, mapping `None` to the same error a
    /// foreign record produces.
    pub fn require<T: Owned>(&self, record: Option<T>, id: DbId) -> Result<T, CoreError> {
        match record {
            Some(record) => self.authorize(record),
            None => Err(Self::not_found::<T>(id)),
        }
    }

    fn not_found<T: Owned>(id: DbId) -> CoreError {
        CoreError::NotFound {
            entity: T::ENTITY,
            id,
        }
    }
}
