use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("not initialized: run 'forge init'")]
    NotInitialized,

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task already exists: {0}")]
    TaskExists(String),

    #[error("unknown AI assistant '{0}'")]
    UnknownAgent(String),

    #[error("invalid stack tag '{0}': expected <category>/<name>")]
    InvalidTag(String),

    #[error("quality gates failed: {}", .0.join(", "))]
    GatesFailed(Vec<String>),

    #[error("directory already exists: {0}")]
    ProjectExists(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
