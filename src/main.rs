use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::Instrument;
use vpce_relay::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let source = EnvSource::load();
    telemetry::init(&log_filter(&source))?;

    let aws = AwsProvider::new(region(&source)).await;
    let invoker = DelegatedInvoker::new(
        StsIdentityProvider::new(aws.sts_client()),
        LambdaInvoker::new(aws.config()),
        source,
    );
    let invoker = &invoker;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let span = tracing::info_span!("relay", request_id = %event.context.request_id);
        Ok::<NormalizedResult, Error>(invoker.handle(event.payload).instrument(span).await)
    }))
    .await
}
