//! Train command - Train a Qbert agent on the board simulator

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;
use tracing::info;

use crate::{
    abstraction::{PolicyReprs, StateRepr},
    adapters::{BoardSimulator, SimulatorConfig},
    agents::AgentType,
    app::{AgentConfig, App},
    board::StepReward,
    cli::output::{format_number, print_kv, print_section},
    pipeline::{
        EpisodeSummary, LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver,
        ScoreCsvObserver, TrainingConfig, TrainingPipeline, TrainingResult,
    },
    ports::Observer,
    q_learning::{DistanceMetric, ExplorationMode, LearnerConfig, TrainingMetadata},
    subsumption::{Decision, stream_seed},
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes (games)
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Agent layout (block, enemy, friendly, subsumption, combined_verbose)
    #[arg(long, short = 'a', default_value = "subsumption")]
    pub agent: String,

    /// Exploration mode (none, random, optimistic, combined)
    #[arg(long, short = 'x', default_value = "combined")]
    pub exploration: String,

    /// Distance metric for value propagation (none, manhattan, hamming, same_result)
    #[arg(long, short = 'd', default_value = "none")]
    pub distance_metric: String,

    /// State representation for every sub-policy (simple, adjacent,
    /// adjacent_conservative, along_direction, verbose)
    #[arg(long, short = 's')]
    pub state_repr: Option<String>,

    /// Override the block policy's state representation
    #[arg(long)]
    pub block_repr: Option<String>,

    /// Override the enemy policy's state representation
    #[arg(long)]
    pub enemy_repr: Option<String>,

    /// Override the friendly policy's state representation
    #[arg(long)]
    pub friendly_repr: Option<String>,

    /// Learning rate α
    #[arg(long, default_value_t = 0.1)]
    pub alpha: f64,

    /// Discount factor γ
    #[arg(long, default_value_t = 0.9)]
    pub gamma: f64,

    /// Exploration probability ε
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Continue training from saved Q-tables
    #[arg(long, short = 'l')]
    pub load: Option<PathBuf>,

    /// Output file for the trained Q-tables
    #[arg(long, short = 'O')]
    pub save: Option<PathBuf>,

    /// Optional CSV file receiving one row per episode
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 123)]
    pub seed: u64,

    /// Abort an episode after this many moves
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Lives per game in the simulator
    #[arg(long, default_value_t = 4)]
    pub lives: u32,

    /// Log every episode instead of drawing a progress bar
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    decisions: &'a MetricsSummary,
    metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    agent_type: AgentType,
    exploration: ExplorationMode,
    distance_metric: DistanceMetric,
    reprs: PolicyReprs,
    learner: LearnerConfig,
    seed: u64,
    episodes_trained: usize,
}

/// Forwards pipeline events to a metrics observer the command reads back.
struct SharedMetrics(Arc<Mutex<MetricsObserver>>);

impl Observer for SharedMetrics {
    fn on_step(
        &mut self,
        episode: usize,
        step: usize,
        decision: &Decision,
        reward: &StepReward,
    ) -> crate::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_step(episode, step, decision, reward)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> crate::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_episode_end(summary)
    }
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name means a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn parse_repr(value: Option<&str>, flag: &str) -> Result<Option<StateRepr>> {
    value
        .map(|raw| raw.parse::<StateRepr>().with_context(|| format!("parsing {flag}")))
        .transpose()
}

/// Per-policy representations: the shared `--state-repr` first, then overrides.
fn policy_reprs(args: &TrainArgs) -> Result<PolicyReprs> {
    let mut reprs = parse_repr(args.state_repr.as_deref(), "--state-repr")?
        .map(PolicyReprs::uniform)
        .unwrap_or_default();
    if let Some(repr) = parse_repr(args.block_repr.as_deref(), "--block-repr")? {
        reprs.block = repr;
    }
    if let Some(repr) = parse_repr(args.enemy_repr.as_deref(), "--enemy-repr")? {
        reprs.enemy = repr;
    }
    if let Some(repr) = parse_repr(args.friendly_repr.as_deref(), "--friendly-repr")? {
        reprs.friendly = repr;
    }
    Ok(reprs)
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let agent_type: AgentType = args.agent.parse()?;
    let exploration: ExplorationMode = args.exploration.parse()?;
    let distance_metric: DistanceMetric = args.distance_metric.parse()?;
    let reprs = policy_reprs(&args)?;

    let learner = LearnerConfig::default()
        .with_learning_rate(args.alpha)
        .with_discount_factor(args.gamma)
        .with_epsilon(args.epsilon)
        .with_exploration(exploration)
        .with_distance_metric(distance_metric);
    learner.validate()?;

    let agent_config = AgentConfig::new(agent_type)
        .with_reprs(reprs)
        .with_learner(learner)
        .with_seed(args.seed);

    let app = App::new();
    let (mut agent, prior) = match &args.load {
        Some(path) => app
            .load_agent(agent_config, path)
            .with_context(|| format!("loading Q-tables from {}", path.display()))?,
        None => (app.create_agent(agent_config)?, TrainingMetadata::default()),
    };

    let mut env = BoardSimulator::new(SimulatorConfig {
        lives: args.lives,
        seed: Some(stream_seed(args.seed, 5)),
        ..SimulatorConfig::default()
    })?;

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        num_episodes: args.episodes,
        seed: Some(args.seed),
        max_steps_per_episode: args.max_steps,
    })
    .with_observer(Box::new(SharedMetrics(Arc::clone(&metrics))));
    pipeline = if args.quiet {
        pipeline.with_observer(Box::new(LoggingObserver))
    } else {
        pipeline.with_observer(Box::new(ProgressObserver::new()))
    };
    if let Some(path) = &args.csv {
        pipeline = pipeline.with_observer(Box::new(
            ScoreCsvObserver::new(path)
                .with_context(|| format!("creating {}", path.display()))?,
        ));
    }

    info!(
        agent = %agent.agent_type(),
        %exploration,
        %distance_metric,
        episodes = args.episodes,
        seed = args.seed,
        "starting training"
    );
    let result = pipeline.run(agent.as_mut(), &mut env)?;
    let decisions = metrics
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .summary();

    print_section("Training Complete");
    print_kv("Agent", &agent.agent_type().to_string());
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv("Moves", &format_number(result.total_steps));
    print_kv("Max score", &result.max_score.to_string());
    print_kv(
        "Mean score",
        &format!("{:.1} ± {:.1}", result.mean_score, result.std_dev),
    );
    print_kv("Max level", &result.max_level.to_string());
    print_kv("Q-table size", &format_number(result.table_size));
    print_kv(
        "Decisions",
        &format!(
            "enemy {} / friendly {} / block {}",
            decisions.enemy_decisions, decisions.friendly_decisions, decisions.block_decisions
        ),
    );

    let metadata = TrainingMetadata {
        episodes_trained: prior.episodes_trained + result.total_episodes,
        seed: Some(args.seed),
        exploration: Some(exploration),
        distance_metric: Some(distance_metric),
        max_score: Some(prior.max_score.unwrap_or(0).max(result.max_score)),
        max_level: Some(prior.max_level.unwrap_or(1).max(result.max_level)),
    };

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let summary = TrainingSummaryFile {
            training: &result,
            decisions: &decisions,
            metadata: SummaryMetadata {
                agent_type: agent.agent_type(),
                exploration,
                distance_metric,
                reprs,
                learner,
                seed: args.seed,
                episodes_trained: metadata.episodes_trained,
            },
        };
        to_writer_pretty(file, &summary)?;
        print_kv("Summary", &path.display().to_string());
    }

    if let Some(path) = &args.save {
        app.save_agent(agent.as_ref(), metadata, path)
            .with_context(|| format!("saving Q-tables to {}", path.display()))?;
        print_kv("Saved", &path.display().to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> TrainArgs {
        let mut argv = vec!["train"];
        argv.extend_from_slice(extra);
        TrainArgs::parse_from(argv)
    }

    #[test]
    fn test_summary_path_gets_json_extension() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/")),
            PathBuf::from("out/training_summary.json")
        );
    }

    #[test]
    fn test_repr_overrides_apply_after_shared_repr() {
        let reprs = policy_reprs(&args(&["--state-repr", "verbose", "--enemy-repr", "simple"]))
            .unwrap();
        assert_eq!(reprs.block, StateRepr::Verbose);
        assert_eq!(reprs.friendly, StateRepr::Verbose);
        assert_eq!(reprs.enemy, StateRepr::Simple);

        assert_eq!(policy_reprs(&args(&[])).unwrap(), PolicyReprs::default());
        assert!(policy_reprs(&args(&["--block-repr", "fancy"])).is_err());
    }

    #[test]
    fn test_state_repr_help_lists_every_accepted_name() {
        use clap::CommandFactory;

        let command = TrainArgs::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "state_repr")
            .and_then(|arg| arg.get_help())
            .unwrap()
            .to_string();
        for name in [
            "simple",
            "adjacent",
            "adjacent_conservative",
            "along_direction",
            "verbose",
        ] {
            assert!(help.contains(name), "{name} missing from: {help}");
            let reprs = policy_reprs(&args(&["--state-repr", name])).unwrap();
            assert_eq!(reprs, PolicyReprs::uniform(name.parse().unwrap()));
        }
    }

    #[test]
    fn test_train_writes_tables_and_scores() {
        let dir = tempfile::TempDir::new().unwrap();
        let tables = dir.path().join("tables.msgpack");
        let scores = dir.path().join("scores.csv");
        let summary = dir.path().join("summary.json");

        execute(args(&[
            "--episodes",
            "3",
            "--quiet",
            "--max-steps",
            "200",
            "--distance-metric",
            "manhattan",
            "--save",
            tables.to_str().unwrap(),
            "--csv",
            scores.to_str().unwrap(),
            "--summary",
            summary.to_str().unwrap(),
        ]))
        .unwrap();

        let saved = App::new().inspect(&tables).unwrap();
        assert_eq!(saved.agent_type, AgentType::Subsumption);
        assert_eq!(saved.metadata.episodes_trained, 3);
        assert!(saved.table_size() > 0);
        assert_eq!(crate::export::read_scores(&scores).unwrap().len(), 3);
        assert!(summary.exists());

        execute(args(&[
            "--episodes",
            "2",
            "--quiet",
            "--max-steps",
            "200",
            "--load",
            tables.to_str().unwrap(),
            "--save",
            tables.to_str().unwrap(),
        ]))
        .unwrap();
        let saved = App::new().inspect(&tables).unwrap();
        assert_eq!(saved.metadata.episodes_trained, 5);
    }
}
