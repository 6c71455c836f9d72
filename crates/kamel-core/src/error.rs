use thiserror::Error;

#[derive(Debug, Error)]
pub enum KamelError {
    #[error("invalid value '{value}' for option '{key}' of trait '{trait_id}': {reason}")]
    Configuration {
        trait_id: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("build failed: {0}")]
    Build(String),

    #[error("apply failed: {0}")]
    Apply(String),

    #[error("status read failed: {0}")]
    StatusRead(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid name '{0}': must be a lowercase RFC 1123 label")]
    InvalidName(String),

    #[error("invalid operator configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl KamelError {
    /// True for failures raised by an external collaborator inside an action.
    pub fn is_action_error(&self) -> bool {
        matches!(
            self,
            KamelError::Build(_) | KamelError::Apply(_) | KamelError::StatusRead(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, KamelError>;
