//! flex-console entry point.
//!
//! Parses `--radio`, loads environment tuning, connects and runs the
//! interactive session until input ends, the client stops or Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flex_console::config::{Cli, ConsoleConfig};
use flex_console::input::stdin_input;
use flex_console::render::Theme;
use flex_console::session;
use flex_console::sink::{LineSink, Prompt, TerminalSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with console lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env(cli.radio).context("invalid configuration")?;
    tracing::info!(radio = %config.radio, "starting flex-console");

    let theme = Theme::new(config.color);
    let prompt = Arc::new(Prompt::new(theme.prompt(&config.prompt)));
    let input = stdin_input(Arc::clone(&prompt));
    let sink: Arc<dyn LineSink> =
        Arc::new(TerminalSink::new(theme).with_prompt(Arc::clone(&prompt)));

    let outcome = session::start(&config, sink, input).await;
    if let Err(e) = prompt.dismiss() {
        tracing::warn!(error = %e, "cannot clear prompt");
    }
    let report = outcome.with_context(|| format!("cannot connect to radio {}", config.radio))?;

    tracing::info!(
        commands = report.commands_sent,
        interrupted = report.interrupted,
        "console exited"
    );
    Ok(())
}
