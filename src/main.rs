use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error};
use shopping_cart_service::adapter::driven::AwsClients;
use shopping_cart_service::adapter::driver::function_handler;
use shopping_cart_service::adapter::ServiceConfig;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env()?;
    if config.table_name.is_none() || config.topic_arn.is_none() {
        tracing::warn!(
            table_configured = config.table_name.is_some(),
            topic_configured = config.topic_arn.is_some(),
            "Dependencies are not fully configured; affected requests will fail"
        );
    }

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let clients = AwsClients::new(&sdk_config, &config);

    run(service_fn(|event| function_handler(&clients, &config, event))).await
}
