//! tasktrack - personal task tracker CLI
//!
//! Log in with a username, then manage tasks from the command line or the
//! interactive terminal dashboard.

use clap::Parser;
use tasktrack::cli::Cli;
use tasktrack::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG or --verbose.
    // Keep startup robust: ignore invalid/huge filters.
    let default_filter = if cli.verbose { "tasktrack=debug" } else { "off" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
