use anyhow::Result;
use clap::Parser;
use cli::args::Cli;
use cli::run::run;
use mailsort_core::config;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let cfg = config::load(cli.config.as_deref())?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    run(&cli, cfg, &mut stdout.lock(), &mut stderr.lock())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
