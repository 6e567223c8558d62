use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_sts::error::DisplayErrorContext;

use crate::v1::error::RelayError;

/// Session name presented to STS for every delegated call.
pub const SESSION_NAME: &str = "VPCE_PERMISSIONS";

/// Short-lived credentials for the hub account. Scoped to one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<SystemTime>,
}

impl TemporaryCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration: None,
        }
    }
    pub fn into_provider(self) -> Credentials {
        Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            Some(self.session_token),
            self.expiration,
            SESSION_NAME,
        )
    }
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl From<&aws_sdk_sts::types::Credentials> for TemporaryCredentials {
    fn from(value: &aws_sdk_sts::types::Credentials) -> Self {
        Self {
            access_key_id: value.access_key_id().to_string(),
            secret_access_key: value.secret_access_key().to_string(),
            session_token: value.session_token().to_string(),
            expiration: SystemTime::try_from(*value.expiration()).ok(),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn assume_identity(&self, role_arn: &str) -> Result<TemporaryCredentials, RelayError>;
}

pub struct StsIdentityProvider {
    client: aws_sdk_sts::Client,
}

impl StsIdentityProvider {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for StsIdentityProvider {
    async fn assume_identity(&self, role_arn: &str) -> Result<TemporaryCredentials, RelayError> {
        if role_arn.trim().is_empty() {
            return Err(RelayError::IdentityAssumption(
                "role reference is empty".to_string(),
            ));
        }
        tracing::info!(role_arn, session = SESSION_NAME, "Assuming role in hub account");
        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(SESSION_NAME)
            .send()
            .await
            .map_err(|e| RelayError::IdentityAssumption(DisplayErrorContext(&e).to_string()))?;
        output
            .credentials()
            .map(TemporaryCredentials::from)
            .ok_or_else(|| {
                RelayError::IdentityAssumption(format!(
                    "AssumeRole for {} returned no credentials",
                    role_arn
                ))
            })
    }
}
