//! Inspect command - Summarise saved Q-tables

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    abstraction::{PolicyKind, StateRepr},
    agents::AgentType,
    app::App,
    board::Move,
    cli::output::{format_number, print_kv, print_section, print_subsection},
    q_learning::{SavedAgent, SavedPolicy, TrainingMetadata},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect saved Q-tables")]
pub struct InspectArgs {
    /// Saved Q-table file
    pub path: PathBuf,

    /// Highest-valued entries to list per policy
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PolicyReport {
    kind: PolicyKind,
    repr: StateRepr,
    entries: usize,
    states: usize,
    total_visits: u64,
    non_finite: usize,
    top: Vec<TopEntry>,
}

#[derive(Debug, Serialize)]
struct TopEntry {
    state: String,
    action: Move,
    value: f64,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    version: u32,
    agent_type: AgentType,
    table_size: usize,
    metadata: TrainingMetadata,
    policies: Vec<PolicyReport>,
}

fn policy_report(policy: &SavedPolicy, top: usize) -> PolicyReport {
    let mut entries: Vec<TopEntry> = policy
        .q_table
        .iter()
        .filter(|(_, _, value)| value.is_finite())
        .map(|(state, action, value)| TopEntry {
            state: state.to_string(),
            action,
            value,
        })
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(top);

    let mut states: Vec<_> = policy.q_table.iter().map(|(state, _, _)| state).collect();
    states.sort_by_key(|state| state.to_string());
    states.dedup();

    PolicyReport {
        kind: policy.kind,
        repr: policy.repr,
        entries: policy.q_table.size(),
        states: states.len(),
        total_visits: policy.visits.total_visits(),
        non_finite: policy.q_table.non_finite_count(),
        top: entries,
    }
}

fn report(saved: &SavedAgent, top: usize) -> InspectReport {
    InspectReport {
        version: saved.version,
        agent_type: saved.agent_type,
        table_size: saved.table_size(),
        metadata: saved.metadata.clone(),
        policies: saved
            .policies
            .iter()
            .map(|policy| policy_report(policy, top))
            .collect(),
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let saved = App::new()
        .inspect(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let report = report(&saved, args.top);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section(&format!("Q-tables: {}", args.path.display()));
    print_kv("Agent", &report.agent_type.to_string());
    print_kv("Format version", &report.version.to_string());
    print_kv("Entries", &format_number(report.table_size));
    print_kv(
        "Episodes trained",
        &format_number(report.metadata.episodes_trained),
    );
    if let Some(seed) = report.metadata.seed {
        print_kv("Seed", &seed.to_string());
    }
    if let Some(max_score) = report.metadata.max_score {
        print_kv("Max score", &max_score.to_string());
    }
    if let Some(max_level) = report.metadata.max_level {
        print_kv("Max level", &max_level.to_string());
    }

    for policy in &report.policies {
        print_subsection(&format!("{} policy ({})", policy.kind, policy.repr));
        print_kv("Entries", &format_number(policy.entries));
        print_kv("States", &format_number(policy.states));
        print_kv("Visits", &policy.total_visits.to_string());
        if policy.non_finite > 0 {
            print_kv("Non-finite", &policy.non_finite.to_string());
        }
        for entry in &policy.top {
            println!("    {:>10.2}  {:<6} {}", entry.value, entry.action, entry.state);
        }
    }
    Ok(())
}
