//! Application state for the AgriAid server
//!
//! Holds the server configuration and the diagnosis pipeline. Everything in
//! here is built once at start-up and only read by request handlers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use agriaid::remediation::DEFAULT_DATABASE_FILE;
use agriaid::{Diagnoser, DEFAULT_MODELS_DIR, MAX_UPLOAD_BYTES};

/// Server configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory containing `<crop>_model.{mpk,pth}` files
    pub models_dir: PathBuf,
    /// Disease database JSON file
    pub database_path: PathBuf,
    /// Optional directory of static front-end assets served at `/`
    pub static_dir: Option<PathBuf>,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            static_dir: None,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file; missing keys keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Socket address to listen on
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Model registry and disease database
    pub diagnoser: Diagnoser,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, diagnoser: Diagnoser) -> Self {
        Self {
            config,
            diagnoser,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
