//! Logging Module
//!
//! `tracing` output shared by the CLI and the HTTP server. `RUST_LOG`, when
//! set, replaces the configured filter entirely.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Targets of the tensor backends, which are chatty at debug level
const BACKEND_TARGETS: [&str; 3] = ["burn", "cubecl", "burn_import"];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for AgriAid's own events
    pub level: LogLevel,
    /// Level for tensor backend events
    pub backend_level: LogLevel,
    pub timestamps: bool,
    /// Show the module path of each event
    pub show_target: bool,
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            backend_level: LogLevel::Warn,
            timestamps: true,
            show_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Debug output for tracking down model loading problems
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            backend_level: LogLevel::Info,
            show_target: true,
            ..Self::default()
        }
    }

    /// Errors only
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Error,
            backend_level: LogLevel::Error,
            timestamps: false,
            ..Self::default()
        }
    }

    /// Server logs, usually redirected to a file
    pub fn production() -> Self {
        Self {
            ansi_colors: false,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// `EnvFilter` directives for this config, e.g. `info,burn=warn,cubecl=warn`
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.as_str().to_string()];
        directives.extend(
            BACKEND_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, self.backend_level.as_str())),
        );
        directives.join(",")
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.filter_directives()))
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive spelling used by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a level name, falling back to `Info` for anything unrecognised
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Install the global subscriber
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let builder = FmtSubscriber::builder()
        .with_env_filter(config.env_filter())
        .with_ansi(config.ansi_colors)
        .with_target(config.show_target)
        .compact();

    let result = if config.timestamps {
        tracing::subscriber::set_global_default(builder.finish())
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish())
    };

    result.map_err(|e| format!("Failed to initialize logging: {}", e))
}
