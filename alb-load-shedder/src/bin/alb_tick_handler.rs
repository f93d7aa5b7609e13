// alb-load-shedder/src/bin/alb_tick_handler.rs
//
// Lambda entry point for delayed self-scheduled reconciliation ticks —
// every step after the first.

use alb_load_shedder::adapters::aws::{CloudWatchAlarm, ElbLoadBalancer, SqsWorkQueue};
use alb_load_shedder::handlers::TickHandler;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

async fn function_handler(event: LambdaEvent<serde_json::Value>) -> Result<serde_json::Value, Error> {
    let sdk_config = aws_config::load_from_env().await;

    let lb = ElbLoadBalancer::new(aws_sdk_elasticloadbalancingv2::Client::new(&sdk_config));
    let alarm = CloudWatchAlarm::new(aws_sdk_cloudwatch::Client::new(&sdk_config));
    let queue = SqsWorkQueue::new(aws_sdk_sqs::Client::new(&sdk_config));

    let (payload, _context) = event.into_parts();
    let raw_body = payload.to_string();

    let handler = TickHandler::new(&lb, &alarm, &queue);
    let response = handler.handle(&raw_body).await?;

    Ok(serde_json::to_value(response)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("alb_load_shedder=info".parse()?))
        .json()
        .init();

    lambda_runtime::run(service_fn(function_handler)).await
}
