use std::collections::HashMap;
use std::env;

use super::error::ConfigError;

pub const ROLE_ARN_KEY: &str = "VPCE_PERM_ROLE_ARN";
pub const FUNCTION_NAME_KEY: &str = "FUNC_NAME";
pub const REGION_KEY: &str = "AWS_REGION";
pub const LOG_FILTER_KEY: &str = "RUST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Key/value lookup the relay reads its settings from.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment, optionally seeded from a `.env` file.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl EnvSource {
    pub fn load() -> Self {
        // Runs before the subscriber exists; a missing file is not an error.
        dotenv::dotenv().ok();
        EnvSource
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub role_arn: String,
    pub function_name: String,
}

impl RelayConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            role_arn: required(source, ROLE_ARN_KEY)?,
            function_name: required(source, FUNCTION_NAME_KEY)?,
        })
    }
}

fn required(source: &dyn ConfigSource, key: &str) -> Result<String, ConfigError> {
    let value = source
        .get(key)
        .ok_or_else(|| ConfigError::Missing(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key.to_string()));
    }
    Ok(value)
}

/// Region override; `None` leaves region resolution to the SDK default chain.
pub fn region(source: &dyn ConfigSource) -> Option<String> {
    source.get(REGION_KEY).filter(|r| !r.trim().is_empty())
}

pub fn log_filter(source: &dyn ConfigSource) -> String {
    source
        .get(LOG_FILTER_KEY)
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}
