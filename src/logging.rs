//! @acp:module "Logging"
//! @acp:summary "Tracing subscriber setup"
//! @acp:domain cli
//! @acp:layer config
//!
//! Logging setup
//!
//! Diagnostics go through `tracing`; the subscriber writes to stderr and is
//! installed at most once per process.

use std::sync::Once;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Levels accepted by `--loglevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `level`
pub fn init(level: LogLevel) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("gemtools={}", level.as_str())));
        // Another subscriber may already be installed (tests, embedding)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(console::colors_enabled_stderr())
            .try_init();
    });
}
