use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumString;

use crate::v1::aws::lambda::invoke::{RemoteInvocationResult, RemoteInvoker};
use crate::v1::aws::sts::assume_role::IdentityProvider;
use crate::v1::config::{ConfigSource, RelayConfig};
use crate::v1::error::RelayError;

const TRANSPORT_OK: i32 = 200;
const REMOTE_OK: f64 = 200.0;
const FLATTENED_FAILURE: i32 = 400;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// The only shape callers of the relay ever see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub event: Value,
    pub status_code: i32,
    pub response_status: ResponseStatus,
    pub body: String,
}

impl NormalizedResult {
    /// Failure whose body is a JSON-encoded diagnostic string.
    fn remote_failure(event: Value, diagnostic: &str) -> Result<Self, RelayError> {
        Ok(Self {
            event,
            status_code: FLATTENED_FAILURE,
            response_status: ResponseStatus::Failed,
            body: serde_json::to_string(diagnostic)?,
        })
    }
    fn fault(event: Value, error: &RelayError) -> Self {
        Self {
            event,
            status_code: FLATTENED_FAILURE,
            response_status: ResponseStatus::Failed,
            body: error.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseMetadata<'a> {
    status_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    executed_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
    payload: &'a Value,
}

pub fn decode_log_result(log_result: &str) -> Result<String, RelayError> {
    let bytes = STANDARD
        .decode(log_result.trim())
        .map_err(|e| RelayError::MalformedResponse(format!("log tail is not base64: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| RelayError::MalformedResponse(format!("log tail is not UTF-8: {}", e)))
}

/// Maps a raw hub response onto a [`NormalizedResult`].
///
/// A raised function or a nested `statusCode` other than 200 is always
/// reported as 400, whatever the nested code was. Otherwise the transport
/// status code is passed through and decides the status tag.
pub fn classify(event: Value, raw: &RemoteInvocationResult) -> Result<NormalizedResult, RelayError> {
    let payload: Value = serde_json::from_slice(&raw.payload)
        .map_err(|e| RelayError::MalformedResponse(format!("payload is not JSON: {}", e)))?;
    let nested_status = payload
        .get("statusCode")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            RelayError::MalformedResponse("payload has no numeric statusCode".to_string())
        })?;
    tracing::info!(nested_status, "StatusCode from the hub lambda function");

    if raw.function_error.is_some() || nested_status != REMOTE_OK {
        tracing::error!(
            function_error = raw.function_error.as_deref(),
            nested_status,
            "Remote invocation error"
        );
        tracing::error!(?raw, "Full response");
        let diagnostic = match raw.log_result.as_deref() {
            Some(log_result) => decode_log_result(log_result)?,
            None => String::from_utf8_lossy(&raw.payload).into_owned(),
        };
        return NormalizedResult::remote_failure(event, &diagnostic);
    }

    let body = serde_json::to_string(&ResponseMetadata {
        status_code: raw.status_code,
        executed_version: raw.executed_version.as_deref(),
        request_id: raw.request_id.as_deref(),
        payload: &payload,
    })?;
    Ok(NormalizedResult {
        event,
        status_code: raw.status_code,
        response_status: if raw.status_code == TRANSPORT_OK {
            ResponseStatus::Success
        } else {
            ResponseStatus::Failed
        },
        body,
    })
}

/// Forwards events to the hub account function under an assumed role.
pub struct DelegatedInvoker<I, R> {
    identity: I,
    remote: R,
    source: Box<dyn ConfigSource>,
}

impl<I: IdentityProvider, R: RemoteInvoker> DelegatedInvoker<I, R> {
    pub fn new(identity: I, remote: R, source: impl ConfigSource + 'static) -> Self {
        Self {
            identity,
            remote,
            source: Box::new(source),
        }
    }

    /// Never fails: every error becomes a `FAILED` result with status 400.
    pub async fn handle(&self, event: Value) -> NormalizedResult {
        match self.relay(&event).await {
            Ok(result) => {
                tracing::info!(
                    status_code = result.status_code,
                    response_status = %result.response_status,
                    "Relay finished"
                );
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "Relay failed");
                NormalizedResult::fault(event, &e)
            }
        }
    }

    async fn relay(&self, event: &Value) -> Result<NormalizedResult, RelayError> {
        let config = RelayConfig::from_source(self.source.as_ref())?;
        let credentials = self.identity.assume_identity(&config.role_arn).await?;
        match self
            .remote
            .invoke(&credentials, &config.function_name, event)
            .await
        {
            Ok(raw) => {
                tracing::info!(
                    status_code = raw.status_code,
                    "StatusCode from the hub lambda function invocation"
                );
                classify(event.clone(), &raw)
            }
            Err(RelayError::RemoteInvocation(detail)) => {
                let message = format!(
                    "Unable to invoke VPC Endpoint permission Lambda function in NETWORK account: {}",
                    detail
                );
                tracing::error!("{}", message);
                NormalizedResult::remote_failure(event.clone(), &message)
            }
            Err(e) => Err(e),
        }
    }
}
