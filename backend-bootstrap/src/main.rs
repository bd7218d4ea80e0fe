use anyhow::Result;
use clap::Parser;

use backend_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "empire-backend")]
#[command(about = "Empire Run cloud log, report and save service", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load_from(args.config.as_deref()).await?;
    let _log_guard = backend_bootstrap::telemetry::init_tracing(&config)?;

    backend_bootstrap::run_standalone(config).await
}
