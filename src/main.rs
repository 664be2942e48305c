use anyhow::{Context, Result};
use clap::Parser;
use ip_logbook::appender::LogAppender;
use ip_logbook::config;
use ip_logbook::handler::App;
use ip_logbook::store::{ContentStore, GitHubStore};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_utc_timestamps()
        .env()
        .init()?;

    info!("Starting ip-logbook");

    // Parse command-line arguments
    let cli = config::Cli::parse();

    // Load configuration
    let config = config::load_config(&cli)?;
    info!(
        "Configuration loaded: {}/{} -> {} (strategy {:?})",
        config.repo_owner, config.repo_name, config.file_path, config.strategy
    );

    let store: Box<dyn ContentStore> = Box::new(GitHubStore::from_config(&config)?);
    let appender = LogAppender::new(store, config.file_path.clone());
    let app = App::new(appender, config.strategy).router();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server terminated unexpectedly")?;

    Ok(())
}
