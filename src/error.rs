use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    #[error("Azure DevOps API error: {0}")]
    AzureDevOpsApi(String),

    #[error("GitLab project {0} not found, does the token have access to it?")]
    ProjectNotFound(u64),

    #[error("Import request failed: {0}")]
    ImportFailed(String),

    #[error("Import request abandoned")]
    ImportAbandoned,

    #[error("Import request did not finish within {0} seconds")]
    ImportTimedOut(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
