use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    /// Broken deployment: browser binary missing, CDP endpoint never came
    /// up. Not retried within a check; the scheduler may try again on the
    /// next interval.
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
