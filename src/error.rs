//! Error types for the qbert crate

use thiserror::Error;

/// Main error type for the qbert crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cell ({row}, {col}) is not on the pyramid (need 0 <= col <= row < {rows})")]
    InvalidCell { row: i32, col: i32, rows: usize },

    #[error("action code {code} is not a joystick action")]
    InvalidActionCode { code: u8 },

    #[error("action '{action}' does not move Qbert")]
    NotAMove { action: String },

    #[error("move {action} leaves the pyramid from {cell}")]
    IllegalMove { action: String, cell: String },

    #[error("no valid actions available in state {state}")]
    NoValidActions { state: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid exploration mode '{input}'. Expected one of: {expected}")]
    ParseExplorationMode { input: String, expected: String },

    #[error("invalid distance metric '{input}'. Expected one of: {expected}")]
    ParseDistanceMetric { input: String, expected: String },

    #[error("invalid state representation '{input}'. Expected one of: {expected}")]
    ParseStateRepr { input: String, expected: String },

    #[error("invalid agent type '{input}'. Expected one of: {expected}")]
    ParseAgentType { input: String, expected: String },

    #[error("agent '{agent}' cannot restore tables saved by '{saved}'")]
    IncompatibleSave { agent: String, saved: String },

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("emulator failure: {message}")]
    Emulator { message: String },

    #[error("frame buffer has {got} bytes, expected {expected} for {width}x{height} RGB")]
    FrameSize {
        expected: usize,
        got: usize,
        width: usize,
        height: usize,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
