use std::fmt;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::operation::RequestId;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType};
use aws_sdk_lambda::Client;
use serde_json::Value;

use crate::v1::aws::sts::assume_role::TemporaryCredentials;
use crate::v1::error::RelayError;

/// What the hub function handed back, before any interpretation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RemoteInvocationResult {
    pub status_code: i32,
    /// Set by Lambda when the function itself raised.
    pub function_error: Option<String>,
    /// Base64 tail of the execution log.
    pub log_result: Option<String>,
    pub executed_version: Option<String>,
    pub request_id: Option<String>,
    pub payload: Vec<u8>,
}

impl fmt::Debug for RemoteInvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteInvocationResult")
            .field("status_code", &self.status_code)
            .field("function_error", &self.function_error)
            .field("log_result", &self.log_result)
            .field("executed_version", &self.executed_version)
            .field("request_id", &self.request_id)
            .field("payload", &String::from_utf8_lossy(&self.payload))
            .finish()
    }
}

impl From<InvokeOutput> for RemoteInvocationResult {
    fn from(output: InvokeOutput) -> Self {
        Self {
            status_code: output.status_code(),
            function_error: output.function_error().map(str::to_string),
            log_result: output.log_result().map(str::to_string),
            executed_version: output.executed_version().map(str::to_string),
            request_id: output.request_id().map(str::to_string),
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
pub trait RemoteInvoker: Send + Sync {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        event: &Value,
    ) -> Result<RemoteInvocationResult, RelayError>;
}

/// Calls the hub function with a client bound to the delegated credentials.
pub struct LambdaInvoker {
    config: SdkConfig,
}

impl LambdaInvoker {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
    fn client(&self, credentials: &TemporaryCredentials) -> Client {
        let config = aws_sdk_lambda::config::Builder::from(&self.config)
            .credentials_provider(credentials.clone().into_provider())
            .build();
        Client::from_conf(config)
    }
}

#[async_trait]
impl RemoteInvoker for LambdaInvoker {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        function_name: &str,
        event: &Value,
    ) -> Result<RemoteInvocationResult, RelayError> {
        let payload = serde_json::to_vec(event)?;
        tracing::info!(
            function_name,
            "Invoking a Lambda function in NETWORK account to manage permission to VPC Endpoint Service"
        );
        self.client(credentials)
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .log_type(LogType::Tail)
            .payload(Blob::new(payload))
            .send()
            .await
            .map(RemoteInvocationResult::from)
            .map_err(|e| RelayError::RemoteInvocation(DisplayErrorContext(&e).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::v1::aws::test_support::capturing_provider;

    fn delegated() -> TemporaryCredentials {
        TemporaryCredentials::new("ASIAHUBEXAMPLE", "hub-secret", "hub-session-token")
    }

    #[tokio::test]
    async fn invoke_requests_synchronous_call_with_log_tail() {
        let (aws, requests) = capturing_provider();
        let event = json!({
            "Action": "Grant",
            "ServiceId": "vpce-123",
            "Principal": "arn:aws:iam::111111111111:root"
        });

        let raw = LambdaInvoker::new(aws.config())
            .invoke(&delegated(), "vpce-permission-manager", &event)
            .await
            .unwrap();
        assert_eq!(raw.status_code, 200);

        let request = requests.expect_request();
        assert!(request
            .uri()
            .contains("/functions/vpce-permission-manager/invocations"));
        assert_eq!(request.headers().get("x-amz-log-type"), Some("Tail"));
        assert_eq!(
            request.headers().get("x-amz-invocation-type"),
            Some("RequestResponse")
        );
        let body: Value = serde_json::from_slice(request.body().bytes().unwrap()).unwrap();
        assert_eq!(body, event);
    }

    #[tokio::test]
    async fn invoke_signs_with_delegated_credentials() {
        let (aws, requests) = capturing_provider();

        LambdaInvoker::new(aws.config())
            .invoke(&delegated(), "vpce-permission-manager", &json!({}))
            .await
            .unwrap();

        let request = requests.expect_request();
        assert_eq!(
            request.headers().get("x-amz-security-token"),
            Some("hub-session-token")
        );
        let authorization = request.headers().get("authorization").unwrap();
        assert!(authorization.contains("Credential=ASIAHUBEXAMPLE/"));
        assert!(!authorization.contains("AKIASPOKE"));
    }

    #[test]
    fn output_fields_are_carried_over() {
        let output = InvokeOutput::builder()
            .status_code(200)
            .function_error("Unhandled")
            .log_result("bG9n")
            .executed_version("$LATEST")
            .payload(Blob::new(br#"{"statusCode":200}"#.to_vec()))
            .build();
        let raw = RemoteInvocationResult::from(output);
        assert_eq!(raw.status_code, 200);
        assert_eq!(raw.function_error.as_deref(), Some("Unhandled"));
        assert_eq!(raw.log_result.as_deref(), Some("bG9n"));
        assert_eq!(raw.executed_version.as_deref(), Some("$LATEST"));
        assert_eq!(raw.payload, br#"{"statusCode":200}"#.to_vec());
    }

    #[test]
    fn debug_output_shows_payload_as_text() {
        let raw = RemoteInvocationResult {
            status_code: 200,
            function_error: Some("Unhandled".to_string()),
            payload: br#"{"statusCode":403,"body":"denied"}"#.to_vec(),
            ..Default::default()
        };
        let printed = format!("{:?}", raw);
        assert!(printed.contains(r#"payload: "{\"statusCode\":403,\"body\":\"denied\"}""#));
        assert!(!printed.contains("123, 34"));
    }

    #[test]
    fn missing_payload_becomes_empty() {
        let raw = RemoteInvocationResult::from(InvokeOutput::builder().status_code(200).build());
        assert!(raw.payload.is_empty());
        assert!(raw.function_error.is_none());
    }
}
