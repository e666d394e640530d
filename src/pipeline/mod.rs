//! Training pipeline abstractions
//!
//! This module provides the episode driver that plays an [`Agent`] against
//! an [`Environment`], plus the observers that record what happened.

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver, ScoreCsvObserver,
};
pub use training::{EpisodeSummary, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Agent, Environment, Observer};
