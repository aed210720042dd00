use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Crop not found: {0}")]
    CropNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl PlanError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlanError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
