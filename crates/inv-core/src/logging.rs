//! Logging setup for hosts embedding the engine.
//!
//! The engine crates only emit `tracing` events. A host that wants them
//! written somewhere calls [`init_logging`] once with the `[logging]`
//! section of its [`InventoryConfig`](crate::InventoryConfig).
//!
//! # Log Levels
//!
//! - `error`: failed saves, read-only lockout
//! - `warn`: discarded snapshots, rollback problems
//! - `info`: imports, exports, restores, logins
//! - `debug`: saves, index rebuilds, individual assignments
//! - `trace`: per-chunk ingestion progress, every session event
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//! file = "/var/log/inventario.log"
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Targets that follow the configured level; everything else stays at warn.
const ENGINE_TARGETS: [&str; 5] = [
    "inv_archive",
    "inv_core",
    "inv_ingest",
    "inv_model",
    "inv_persistence",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per line.
    Json,
}

/// The `[logging]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub timestamps: bool,
    /// Show the module path of each event.
    pub targets: bool,
    /// Colored output. Ignored for JSON and for files.
    pub ansi: bool,
    /// Append here instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            timestamps: true,
            targets: false,
            ansi: true,
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Cannot open log file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global logger is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG`, when set, replaces the configured level.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            let config = LogConfig {
                ansi: false,
                ..config.clone()
            };
            init_logging_with_writer(&config, Mutex::new(file))
        }
        None => init_logging_with_writer(config, io::stderr),
    }
}

/// Install the global subscriber writing to `writer`.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> Result<(), LoggingError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(output_layer(config, writer))
        .with(env_filter(config.level))
        .try_init()?;
    tracing::debug!(level = config.level.as_directive(), format = ?config.format, "logging ready");
    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn output_layer<W>(config: &LogConfig, writer: W) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(config.targets)
        .with_ansi(config.ansi && config.format != LogFormat::Json);

    match (config.format, config.timestamps) {
        (LogFormat::Json, _) => base.json().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => base.boxed(),
        (LogFormat::Pretty, false) => base.without_time().boxed(),
    }
}

/// `"warn,inv_archive=<level>,..."`
fn engine_directives(level: LogLevel) -> String {
    ENGINE_TARGETS
        .iter()
        .fold(String::from("warn"), |mut directives, target| {
            directives.push(',');
            directives.push_str(target);
            directives.push('=');
            directives.push_str(level.as_directive());
            directives
        })
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(engine_directives(level)))
}
