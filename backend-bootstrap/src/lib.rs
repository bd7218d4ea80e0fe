pub mod context;
pub mod lifecycle;
pub mod telemetry;

pub use lifecycle::run_standalone;

pub async fn run() -> anyhow::Result<()> {
    let config = backend_infrastructure::AppConfig::load().await?;
    run_standalone(config).await
}
