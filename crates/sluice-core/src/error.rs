use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Plan error: {0}")]
    Plan(String),

    #[error("Schema error: {0}")]
    Schema(String),
}
