use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use blobdir::cli::{self, Args};
use blobdir::config::load_storage_config;
use blobdir::error::Result;
use blobdir::storage::StorageClient;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        if e.is_config_error() {
            eprintln!("{}", Args::command().render_usage());
        }
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_storage_config(&args.container)?;
    let client = StorageClient::new(config).await?;
    cli::run(args, client).await?;
    Ok(())
}
