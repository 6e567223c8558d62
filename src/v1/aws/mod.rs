pub mod lambda;
pub mod sts;

use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};

/// Shared SDK configuration for the clients the relay builds. Every
/// invocation is a single attempt.
#[derive(Clone, Debug)]
pub struct AwsProvider {
    config: SdkConfig,
}

impl AwsProvider {
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(1));
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        Self {
            config: loader.load().await,
        }
    }
    pub fn from_config(config: SdkConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }
    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(&self.config)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};
    use aws_credential_types::{provider::SharedCredentialsProvider, Credentials};
    use aws_smithy_runtime::client::http::test_util::{capture_request, CaptureRequestReceiver};

    use super::AwsProvider;

    /// Provider whose clients hand every request to a capture handler that
    /// answers with an empty 200.
    pub(crate) fn capturing_provider() -> (AwsProvider, CaptureRequestReceiver) {
        let (http_client, requests) = capture_request(None);
        let config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIASPOKE",
                "spoke-secret",
                None,
                None,
                "test",
            )))
            .retry_config(RetryConfig::standard().with_max_attempts(1))
            .http_client(http_client)
            .build();
        (AwsProvider::from_config(config), requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clients_make_a_single_attempt() {
        let aws = AwsProvider::new(Some("us-east-1".to_string())).await;
        assert_eq!(
            aws.config().retry_config().map(|r| r.max_attempts()),
            Some(1)
        );
        assert_eq!(
            aws.config().region().map(|r| r.to_string()),
            Some("us-east-1".to_string())
        );
    }
}
