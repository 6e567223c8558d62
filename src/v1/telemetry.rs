use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber for the Lambda process. CloudWatch adds the
/// ingestion time, so timestamps and targets are left out.
pub fn init(filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .finish()
        .try_init()
}
