//! Tracing setup: stderr plus a daily rolling file under `<root>/logs/`.

use std::io;

use comport_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEBUG_ENV_VAR: &str = "COMPORT_NOTIFY_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "comport-notify.log";

fn debug_forced() -> bool {
    matches!(
        std::env::var(DEBUG_ENV_VAR).as_deref(),
        Ok("1" | "true" | "TRUE" | "yes" | "YES")
    )
}

fn env_filter() -> EnvFilter {
    if debug_forced() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// or buffered file output is lost.
pub fn init() -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let logs_dir = StorageConfig::from_env()
        .and_then(|storage| storage.ensure_logs_dir())
        .ok();

    let Some(logs_dir) = logs_dir else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(stderr_layer)
            .init();
        return None;
    };

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!(dir = %logs_dir.display(), "File logging enabled");
    Some(guard)
}
