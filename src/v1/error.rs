use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing configuration key: {0}")]
    Missing(String),
    #[error("Empty value for configuration key: {0}")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("Unable to assume delegated role: {0}")]
    IdentityAssumption(String),
    #[error("Unable to invoke remote function: {0}")]
    RemoteInvocation(String),
    #[error("Malformed response from remote function: {0}")]
    MalformedResponse(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
