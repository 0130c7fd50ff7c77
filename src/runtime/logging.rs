use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{LoggingSettings, default_log_path};

/// Filter directives: `SPINDLE_LOG` wins over the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env("SPINDLE_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send `tracing` output to the log file. The terminal belongs to the UI, so
/// without a usable file nothing is logged. Returns the file in use.
pub fn configure_logging(
    settings: &LoggingSettings,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let Some(path) = settings.file.clone().or_else(default_log_path) else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(fmt_layer)
        .try_init()?;
    Ok(Some(path))
}
