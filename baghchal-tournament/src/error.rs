//! Error types for arena persistence and configuration

/// Errors raised outside of game play.
///
/// Game failures never surface here; they are recorded as termination
/// reasons on the game record.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed record {0}")]
    Malformed(String),
}

impl ArenaError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ArenaError::Io { context: context.into(), source }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        ArenaError::Json { context: context.into(), source }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        ArenaError::Csv { context: context.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ArenaError>;
