use thiserror::Error;

/// Errors surfaced by the library outside the round controller.
///
/// The controller itself never fails: bad selections are normalized and
/// storage problems are logged. These variants cover configuration,
/// persistence and the login hand-off.
#[derive(Debug, Error)]
pub enum SprintError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("login failed: {0}")]
    Auth(String),
    #[error("no usable browser: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, SprintError>;
