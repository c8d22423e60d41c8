use super::config::ConfigError;
use super::correspondence::TableError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSide {
    Reference,
    Query,
}

impl fmt::Display for SequenceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SequenceSide::Reference => "reference",
                SequenceSide::Query => "query",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("No sequence source resolves for structure '{label}': {reason}")]
    Lookup { label: String, reason: String },

    #[error("Cannot align: the {side} sequence is empty")]
    Alignment { side: SequenceSide },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Reference structure '{label}' could not be prepared: {source}")]
    ReferenceFailed {
        label: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("No query structure survived sequence resolution and alignment")]
    NoSurvivingStructures,

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<TableError> for EngineError {
    fn from(e: TableError) -> Self {
        EngineError::Internal(e.to_string())
    }
}
