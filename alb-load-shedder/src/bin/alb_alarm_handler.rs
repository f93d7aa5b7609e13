// alb-load-shedder/src/bin/alb_alarm_handler.rs
//
// Lambda entry point for CloudWatch alarm state-change notifications — the
// first step of a shed/restore episode.

use alb_load_shedder::adapters::aws::{ElbLoadBalancer, SqsWorkQueue};
use alb_load_shedder::config::Config;
use alb_load_shedder::handlers::{AlarmEventHandler, AlarmStateChangeEvent};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

async fn function_handler(event: LambdaEvent<AlarmStateChangeEvent>) -> Result<serde_json::Value, Error> {
    let config = Config::from_env()?;
    let sdk_config = aws_config::load_from_env().await;

    let lb = ElbLoadBalancer::new(aws_sdk_elasticloadbalancingv2::Client::new(&sdk_config));
    let queue = SqsWorkQueue::new(aws_sdk_sqs::Client::new(&sdk_config));

    let handler = AlarmEventHandler::new(&lb, &queue, &config);
    let response = handler.handle(&event.into_parts().0).await?;

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
