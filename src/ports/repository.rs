//! Repository port for trained table persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage used to checkpoint Q and visit tables between training runs.

use std::path::Path;

use crate::{Result, q_learning::SavedAgent};

/// Port for persisting and loading trained agents.
///
/// The format is opaque to callers. Implementations must return exactly the
/// tables that were saved under a path.
///
/// # Examples
///
/// ```no_run
/// use qbert::ports::TableRepository;
/// use qbert::q_learning::SavedAgent;
/// use std::path::Path;
///
/// fn checkpoint<R: TableRepository>(
///     repo: &R,
///     saved: &SavedAgent,
///     path: &Path,
/// ) -> qbert::Result<()> {
///     repo.save(saved, path)
/// }
/// ```
pub trait TableRepository {
    /// Save an agent's tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, saved: &SavedAgent, path: &Path) -> Result<()>;

    /// Load previously saved tables.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is stored at `path`, the stored bytes
    /// cannot be decoded, or they were written by another format version.
    fn load(&self, path: &Path) -> Result<SavedAgent>;
}
