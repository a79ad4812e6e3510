use plugin_common::{settings::Settings, util::tracing::setup_tracing};
use plugin_operator::{error::OperatorResult, operator::operator};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> OperatorResult<()> {
    let settings = Settings::load(None)?;
    setup_tracing(Some(settings.log_level))?;

    let client = kube::Client::try_default().await?;
    operator(client, &settings).await
}
