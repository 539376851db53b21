//! AgriAid Server
//!
//! HTTP API for crop leaf disease diagnosis. Loads one classifier per crop at
//! start-up, then serves prediction requests with remediation guidance.

mod error;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use agriaid::backend::{backend_name, default_device};
use agriaid::utils::logging::{init_logging, LogConfig, LogLevel};
use agriaid::{Diagnoser, DiseaseDatabase, ModelRegistry};

use crate::state::{AppState, ServerConfig};

/// AgriAid Server
#[derive(Parser, Debug)]
#[command(name = "agriaid-server")]
#[command(version)]
#[command(about = "HTTP API for crop disease diagnosis")]
struct Cli {
    /// JSON configuration file, applied before the other options
    #[arg(short, long, env = "AGRIAID_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "AGRIAID_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "AGRIAID_HOST")]
    host: Option<String>,

    /// Directory containing <crop>_model.{mpk,pth} files
    #[arg(long, env = "AGRIAID_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Disease database JSON file
    #[arg(long, env = "AGRIAID_DATABASE")]
    database: Option<PathBuf>,

    /// Directory of static front-end assets served at /
    #[arg(long, env = "AGRIAID_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Maximum upload size in bytes
    #[arg(long, env = "AGRIAID_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGRIAID_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Resolve the configuration: defaults, then config file, then flags
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(host) = &self.host {
            config.host = host.clone();
        }

        if let Some(models_dir) = &self.models_dir {
            config.models_dir = models_dir.clone();
        }

        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }

        if let Some(static_dir) = &self.static_dir {
            config.static_dir = Some(static_dir.clone());
        }

        if let Some(max_upload_bytes) = self.max_upload_bytes {
            config.max_upload_bytes = max_upload_bytes;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_config = LogConfig::production().with_level(LogLevel::parse(&cli.log_level));
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    // Build configuration
    let config = cli.server_config()?;

    info!("AgriAid Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Backend:     {}", backend_name());
    info!("  Models dir:  {:?}", config.models_dir);
    info!("  Database:    {:?}", config.database_path);
    info!("  Static dir:  {:?}", config.static_dir);
    info!("  Upload limit: {} bytes", config.max_upload_bytes);

    if !config.models_dir.is_dir() {
        warn!(
            "Models directory {:?} does not exist. Every crop will be unavailable.",
            config.models_dir
        );
    }

    // Load models and disease database once
    let registry = ModelRegistry::load(&config.models_dir, default_device());
    let database = DiseaseDatabase::load_or_empty(&config.database_path);
    let diagnoser = Diagnoser::new(registry, database);

    // Create shared state
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(config, diagnoser));

    // Build router
    let app = routes::router(state);

    // Start server
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
