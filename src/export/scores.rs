//! CSV export of per-episode scores

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Result, pipeline::EpisodeSummary};

/// A single row in the score CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// 1-based episode number
    pub episode: usize,
    pub score: i64,
    pub total_reward: f64,
    pub steps: usize,
    pub level: u32,
    pub lives_lost: u32,
}

impl From<&EpisodeSummary> for ScoreRecord {
    fn from(summary: &EpisodeSummary) -> Self {
        Self {
            episode: summary.episode + 1,
            score: summary.score,
            total_reward: summary.total_reward,
            steps: summary.steps,
            level: summary.level,
            lives_lost: summary.lives_lost,
        }
    }
}

/// Streaming writer; each record is flushed so partial runs stay readable.
pub struct ScoreCsvWriter {
    writer: csv::Writer<File>,
}

impl ScoreCsvWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, record: &ScoreRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Write every record to `path`, replacing any existing file.
pub fn write_scores<P: AsRef<Path>>(path: P, records: &[ScoreRecord]) -> Result<()> {
    let mut writer = ScoreCsvWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    Ok(())
}

/// Read a score CSV written by [`write_scores`] or [`ScoreCsvWriter`].
pub fn read_scores<P: AsRef<Path>>(path: P) -> Result<Vec<ScoreRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}
