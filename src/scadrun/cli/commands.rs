use super::print::print_messages;
use super::setup::Cli;
use clap::Parser;
use scadrun::error::Result;
use scadrun::init::initialize;
use tracing_subscriber::{fmt, EnvFilter};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = initialize()?;
    if let Some(path) = &ctx.config_path {
        tracing::debug!(config = %path.display(), "using config");
    }

    let result = if cli.build {
        ctx.api.build_file(&cli.file)?
    } else {
        ctx.api.run_file(&cli.file)?
    };

    print_messages(&result.messages);
    Ok(())
}

/// Logs go to stderr so they never mix with the user-facing messages.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "scadrun=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
