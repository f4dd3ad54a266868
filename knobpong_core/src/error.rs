//! Match setup errors.

/// Fatal configuration problems detected while setting up a match.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("unknown opponent: {0}")]
    UnknownOpponent(String),
    #[error("invalid court geometry: {0}")]
    InvalidGeometry(String),
}
