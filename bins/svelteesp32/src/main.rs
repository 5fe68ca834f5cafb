mod args;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Cli;
use svelteesp32_pack::config::rc;
use svelteesp32_pack::{Options, WriteOutcome};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();

    let cli = Cli::parse();

    let file_options = match rc::discover(cli.config.as_deref())? {
        Some(path) => {
            tracing::info!("using {}", path.display());
            rc::load(&path)?
        }
        None => Options::default(),
    };

    let mut config = file_options
        .merge(cli.options())
        .resolve()
        .context("invalid options")?;
    config.command_line = Some(command_line());

    let summary = svelteesp32_pack::build(&config)
        .with_context(|| format!("failed to pack {}", config.source_path.display()))?;

    let state = match summary.outcome {
        WriteOutcome::Written => "written",
        WriteOutcome::Unchanged => "unchanged",
        WriteOutcome::DryRun => "not written (dry run)",
    };
    tracing::info!(
        "{} {}: {} files, {} handlers, {} bytes",
        summary.output_file.display(),
        state,
        summary.files,
        summary.handler_count,
        summary.output_size
    );
    Ok(())
}

/// Arguments as typed, recorded in the generated header.
fn command_line() -> String {
    std::env::args().skip(1).collect::<Vec<_>>().join(" ")
}
