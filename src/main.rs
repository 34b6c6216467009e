mod attendance_sync;
mod backup;
mod calc;
mod config;
mod context;
mod db;
mod error;
mod grading_config;
mod ipc;
mod ledger;
mod registry;
mod release;
mod scale;
mod telemetry;
#[cfg(test)]
mod test_support;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    let cli = config::Cli::parse();
    telemetry::init_tracing(cli.log_json, cli.log_level);

    let mut state = ipc::AppState::new(cli.db_settings());
    if let Some(workspace) = cli.workspace.as_ref() {
        let conn = db::open_db(workspace, state.db_settings)?;
        state.workspace = Some(workspace.clone());
        state.db = Some(conn);
        info!(workspace = %workspace.display(), "workspace opened at startup");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "gradebookd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to reply to; answer with a bare envelope.
                warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(stdout, "{}", resp);
        let _ = stdout.flush();
    }
    Ok(())
}
