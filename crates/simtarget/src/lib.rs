pub mod mcp;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid device identifier: {0}")]
    InvalidIdentifier(String),

    #[error("no device matched the given filters")]
    NoMatch {
        name: Option<String>,
        runtime: Option<String>,
    },

    #[error("no confident UI match (best score {best_score})")]
    NoConfidentMatch { best_score: u32 },

    #[error("automation dependency unavailable: {0}")]
    AutomationUnavailable(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TargetError>;
