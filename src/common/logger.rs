use std::{fs, path::Path};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::configs::Config;

/// Initializes the global tracing subscriber: a stdout layer plus an
/// optional plain-text file layer when `logging.file` is configured.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &Config) {
    let log_level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.as_deref())
        .unwrap_or("info");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stdout_layer = fmt::layer().with_ansi(true);

    let file_layer = config
        .logging
        .as_ref()
        .and_then(|l| l.file.as_deref())
        .and_then(|path| {
            if let Some(parent) = Path::new(path).parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!("Failed to create log directory: {}", e);
                    return None;
                }
            }
            match fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(fmt::layer().with_writer(file).with_ansi(false)),
                Err(e) => {
                    eprintln!("Failed to open log file {}: {}", path, e);
                    None
                }
            }
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
