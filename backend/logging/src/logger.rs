//! Structured Logger
//!
//! Wraps `tracing` to provide console output, an optional rolling NDJSON
//! file, and environment-based level control.

use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix; the appender adds `.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "discovery.log";

/// Per-user log directory (`~/.local/share/discovery/logs` on Linux).
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("discovery").join("logs"))
}

/// Initialize the global structured logger.
///
/// Console output goes to stderr so it never interleaves with chat replies
/// on stdout. When `log_dir` is set, JSON lines are also written to a daily
/// rolling file there. `RUST_LOG` overrides `level`.
pub fn init_logger(log_dir: Option<&Path>, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = log_dir
        .and_then(|dir| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .map_err(|e| eprintln!("Log file disabled: cannot open {}: {e}", dir.display()))
                .ok()
        })
        .map(|appender| fmt::layer().json().with_writer(appender).with_ansi(false));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
