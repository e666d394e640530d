//! Dependency injection container for the Qbert application.
//!
//! The container owns infrastructure dependencies (the table repository) and
//! provides factory methods for agents.

use std::{path::Path, sync::Arc};

use tracing::info;

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::MsgPackRepository,
    agents::{PolicyAgent, SubsumptionAgent},
    ports::{Agent, TableRepository},
    q_learning::{SavedAgent, TrainingMetadata},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use qbert::agents::AgentType;
/// use qbert::app::{AgentConfig, App};
///
/// let app = App::new();
/// let agent = app.create_agent(AgentConfig::new(AgentType::Subsumption).with_seed(42))?;
/// assert_eq!(agent.table_size(), 0);
/// # Ok::<(), qbert::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use qbert::app::App;
/// use qbert::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    table_repository: Arc<dyn TableRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: `MsgPackRepository` and no
    /// default seed.
    pub fn new() -> Self {
        Self {
            table_repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Builder for an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn table_repository(&self) -> Arc<dyn TableRepository + Send + Sync> {
        Arc::clone(&self.table_repository)
    }

    /// Create a fresh agent of the configured type.
    ///
    /// The config seed wins over the container default; either one also
    /// seeds the learner when it carries no seed of its own.
    pub fn create_agent(&self, config: AgentConfig) -> Result<Box<dyn Agent>> {
        let seed = config.seed.or(self.default_seed).or(config.learner.seed);
        let learner = config.learner.with_seed(seed);

        let agent: Box<dyn Agent> = match config.agent_type.policy_kind() {
            None => Box::new(SubsumptionAgent::new(learner, config.reprs)?),
            Some(kind) => Box::new(PolicyAgent::new(
                config.agent_type,
                learner,
                config.reprs.get(kind),
            )?),
        };
        Ok(agent)
    }

    /// Load saved tables into a new agent of the saved type.
    ///
    /// `config.agent_type` is ignored in favor of the type recorded in the
    /// file; learner parameters and seed still come from `config`.
    pub fn load_agent(
        &self,
        config: AgentConfig,
        path: &Path,
    ) -> Result<(Box<dyn Agent>, TrainingMetadata)> {
        let saved = self.table_repository.load(path)?;
        let mut agent = self.create_agent(AgentConfig {
            agent_type: saved.agent_type,
            ..config
        })?;
        agent.restore(&saved)?;
        info!(
            path = %path.display(),
            agent = %saved.agent_type,
            table_size = agent.table_size(),
            episodes_trained = saved.metadata.episodes_trained,
            "loaded agent"
        );
        Ok((agent, saved.metadata))
    }

    /// Save an agent's tables together with training metadata.
    pub fn save_agent(
        &self,
        agent: &dyn Agent,
        metadata: TrainingMetadata,
        path: &Path,
    ) -> Result<()> {
        let saved = SavedAgent::new(agent.agent_type(), agent.snapshot(), metadata);
        self.table_repository.save(&saved, path)
    }

    /// Read a saved agent without building it.
    pub fn inspect(&self, path: &Path) -> Result<SavedAgent> {
        self.table_repository.load(path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
pub struct AppBuilder {
    table_repository: Option<Arc<dyn TableRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            table_repository: None,
            default_seed: None,
        }
    }

    pub fn with_repository<R: TableRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.table_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app; falls back to `MsgPackRepository` when no repository
    /// was given.
    pub fn build(self) -> App {
        App {
            table_repository: self
                .table_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstraction::{PolicyKind, PolicyReprs, StateRepr},
        adapters::InMemoryRepository,
        agents::AgentType,
        board::{Cell, Observation},
        error::Error,
        subsumption::Decision,
    };

    fn exercised(agent: &mut dyn Agent) {
        let before = Observation::new(4);
        let decision = agent.decide(&before).unwrap();
        let mut after = before.projected(Cell::TOP.neighbor(decision.action).unwrap());
        after.reward.block = 25;
        agent.learn(&decision, &before, &after).unwrap();
    }

    #[test]
    fn test_app_creates_every_agent_type() {
        let app = App::new();
        for agent_type in [
            AgentType::Block,
            AgentType::Enemy,
            AgentType::Friendly,
            AgentType::Subsumption,
            AgentType::CombinedVerbose,
        ] {
            let agent = app.create_agent(AgentConfig::new(agent_type)).unwrap();
            assert_eq!(agent.agent_type(), agent_type);
        }
    }

    #[test]
    fn test_save_and_load_through_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing()
            .with_repository(repo.clone())
            .with_default_seed(42)
            .build();

        let mut agent = app
            .create_agent(
                AgentConfig::new(AgentType::Subsumption)
                    .with_reprs(PolicyReprs::uniform(StateRepr::Simple)),
            )
            .unwrap();
        exercised(agent.as_mut());
        let metadata = TrainingMetadata {
            episodes_trained: 3,
            ..TrainingMetadata::default()
        };
        app.save_agent(agent.as_ref(), metadata, Path::new("tables"))
            .unwrap();
        assert!(repo.contains(Path::new("tables")));

        let (loaded, metadata) = app
            .load_agent(AgentConfig::new(AgentType::Block), Path::new("tables"))
            .unwrap();
        assert_eq!(loaded.agent_type(), AgentType::Subsumption);
        assert_eq!(loaded.table_size(), agent.table_size());
        assert_eq!(metadata.episodes_trained, 3);

        let saved = app.inspect(Path::new("tables")).unwrap();
        assert_eq!(
            saved.policy(PolicyKind::Enemy).map(|p| p.repr),
            Some(StateRepr::Simple)
        );
    }

    #[test]
    fn test_restore_refuses_other_layouts() {
        let app = App::for_testing()
            .with_repository(InMemoryRepository::new())
            .build();
        let block = app.create_agent(AgentConfig::new(AgentType::Block)).unwrap();
        app.save_agent(block.as_ref(), TrainingMetadata::default(), Path::new("block"))
            .unwrap();

        let mut subsumption = app
            .create_agent(AgentConfig::new(AgentType::Subsumption))
            .unwrap();
        let saved = app.inspect(Path::new("block")).unwrap();
        assert!(matches!(
            subsumption.restore(&saved),
            Err(Error::IncompatibleSave { .. })
        ));
    }

    #[test]
    fn test_default_seed_makes_agents_repeatable() {
        let app = App::for_testing().with_default_seed(7).build();
        let decide = || {
            let mut agent = app.create_agent(AgentConfig::default()).unwrap();
            let obs = Observation::new(4);
            (0..10)
                .map(|_| agent.decide(&obs).unwrap())
                .collect::<Vec<Decision>>()
        };
        assert_eq!(decide(), decide());
    }
}
