use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line and environment configuration for the sidecar.
#[derive(Debug, Clone, Parser)]
#[command(name = "gradebookd", version, about = "Grading & assessment release engine sidecar")]
pub struct Cli {
    /// Workspace directory to open at startup (otherwise wait for workspace.select).
    #[arg(long, env = "GRADEBOOKD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// How long a write waits on a locked database before failing.
    #[arg(long, env = "GRADEBOOKD_BUSY_TIMEOUT_MS", default_value_t = 2000)]
    pub busy_timeout_ms: u64,

    /// Emit newline-delimited JSON logs on stderr.
    #[arg(long, env = "GRADEBOOKD_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, env = "GRADEBOOKD_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

/// Settings applied to every database connection the sidecar opens.
#[derive(Debug, Clone, Copy)]
pub struct DbSettings {
    pub busy_timeout: Duration,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(2000),
        }
    }
}

impl Cli {
    pub fn db_settings(&self) -> DbSettings {
        DbSettings {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}
