mod activity;
mod cli;
mod config;
mod engine;
mod error;
mod llm;
mod model;
mod report;
mod roster;
mod util;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let rest = args.get(1..).unwrap_or_default();

    match args.first().map(String::as_str) {
        Some("suggest") => cli::handle_suggest(rest).await,
        Some("plan") => cli::handle_plan(rest).await,
        Some("report") => cli::handle_report(rest),
        Some("history") => cli::handle_history(rest),
        Some("help") | Some("-h") | Some("--help") | None => {
            cli::print_help();
            Ok(())
        }
        Some(other) => {
            cli::print_help();
            anyhow::bail!("Unknown command: {other}")
        }
    }
}
