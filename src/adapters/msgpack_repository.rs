//! MessagePack implementation of the table repository.
//!
//! Saved agents are written with rmp_serde, which keeps large Q-tables
//! compact and quick to reload between training sessions.

use std::{fs::File, io::BufWriter, path::Path};

use tracing::debug;

use crate::{Result, error::Error, ports::TableRepository, q_learning::SavedAgent};

/// MessagePack-based table repository.
///
/// # Examples
///
/// ```no_run
/// use qbert::adapters::MsgPackRepository;
/// use qbert::ports::TableRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let saved = repo.load(Path::new("tables.msgpack"))?;
/// repo.save(&saved, Path::new("tables-copy.msgpack"))?;
/// # Ok::<(), qbert::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl TableRepository for MsgPackRepository {
    fn save(&self, agent: &SavedAgent, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, agent).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize Q-tables to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(path = %path.display(), entries = agent.table_size(), "saved Q-tables");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let agent: SavedAgent =
            rmp_serde::decode::from_read(file).map_err(|e| Error::SerializationContext {
                operation: "deserialize Q-tables from MessagePack".to_string(),
                message: e.to_string(),
            })?;
        agent.check_version()?;

        debug!(path = %path.display(), entries = agent.table_size(), "loaded Q-tables");
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        abstraction::{PolicyKind, PolicyReprs},
        agents::{AgentType, SubsumptionAgent},
        board::{Cell, Move, Observation},
        ports::Agent,
        q_learning::{LearnerConfig, TrainingMetadata},
        subsumption::Decision,
    };

    fn trained() -> SavedAgent {
        let mut agent =
            SubsumptionAgent::new(LearnerConfig::default().with_seed(Some(5)), PolicyReprs::default())
                .unwrap();
        let before = Observation::new(4);
        let mut after = before.projected(Cell::new(1, 1).unwrap());
        after.reward.block = 25;
        let decision = Decision {
            action: Move::Right,
            source: PolicyKind::Block,
            enemy_active: false,
            friendly_active: false,
        };
        agent.learn(&decision, &before, &after).unwrap();
        SavedAgent::new(
            AgentType::Subsumption,
            agent.snapshot(),
            TrainingMetadata::default(),
        )
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("tables.msgpack");

        let repo = MsgPackRepository::new();
        let saved = trained();
        repo.save(&saved, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded.agent_type, AgentType::Subsumption);
        assert_eq!(loaded.policies.len(), 3);
        assert_eq!(loaded.table_size(), saved.table_size());
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_12345.msgpack"));
        assert!(result.is_err());
    }

    #[test]
    fn test_newer_version_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("future.msgpack");
        let mut saved = trained();
        saved.version = SavedAgent::VERSION + 1;

        let repo = MsgPackRepository::new();
        repo.save(&saved, &file_path).unwrap();
        assert!(matches!(
            repo.load(&file_path),
            Err(Error::UnsupportedVersion { .. })
        ));
    }
}
