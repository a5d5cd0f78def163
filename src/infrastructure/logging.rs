use std::fs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for console and file logging
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: Option<String>,
    pub log_level: Level,
    pub enable_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: Level::INFO,
            enable_console: true,
        }
    }
}

impl LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> String {
        format!(
            "{}={level},tower_http={level},sqlx=warn",
            env!("CARGO_PKG_NAME"),
            level = self.log_level
        )
    }
}

/// Installs the global subscriber. The returned guard must be held for the
/// lifetime of the process when file logging is enabled, or buffered lines
/// are lost on exit.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();

    if config.enable_console {
        let console_layer = fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true);
        layers.push(Box::new(console_layer));
    }

    let mut guard = None;
    if let Some(log_dir) = &config.log_dir {
        fs::create_dir_all(log_dir)?;
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "gobank.log");
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);
        layers.push(Box::new(file_layer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(guard)
}
