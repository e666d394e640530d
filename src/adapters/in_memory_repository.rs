//! In-memory table repository for testing.
//!
//! Saved agents are kept as MessagePack bytes in a shared map, so tests
//! exercise the same encoding as the file adapter without touching disk.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, error::Error, ports::TableRepository, q_learning::SavedAgent};

/// In-memory repository keyed by path.
///
/// All clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use qbert::adapters::InMemoryRepository;
/// use qbert::agents::AgentType;
/// use qbert::ports::TableRepository;
/// use qbert::q_learning::{SavedAgent, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let saved = SavedAgent::new(AgentType::Block, Vec::new(), TrainingMetadata::default());
/// repo.save(&saved, Path::new("tables"))?;
/// assert_eq!(repo.load(Path::new("tables"))?.agent_type, AgentType::Block);
/// # Ok::<(), qbert::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved agents currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl TableRepository for InMemoryRepository {
    fn save(&self, agent: &SavedAgent, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(agent).map_err(|e| Error::SerializationContext {
            operation: "serialize Q-tables for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent> {
        let storage = self.storage();
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load Q-tables from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let agent: SavedAgent =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize Q-tables from in-memory storage".to_string(),
                message: e.to_string(),
            })?;
        agent.check_version()?;
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{agents::AgentType, q_learning::TrainingMetadata};

    fn saved(agent_type: AgentType) -> SavedAgent {
        SavedAgent::new(
            agent_type,
            Vec::new(),
            TrainingMetadata {
                episodes_trained: 7,
                ..TrainingMetadata::default()
            },
        )
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("tables");
        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&saved(AgentType::Enemy), path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        let loaded = repo.load(path).unwrap();
        assert_eq!(loaded.agent_type, AgentType::Enemy);
        assert_eq!(loaded.metadata.episodes_trained, 7);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        assert!(repo.load(Path::new("nonexistent")).is_err());
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();
        repo1.save(&saved(AgentType::Block), Path::new("shared")).unwrap();

        assert_eq!(repo2.load(Path::new("shared")).unwrap().agent_type, AgentType::Block);
        repo2.clear();
        assert_eq!(repo1.count(), 0);
    }
}
