//! cfz: generate fuzz allocators and a call-site driver for C sources.

use clap::Parser;

mod cli;
mod compile_db;
mod pipeline;

fn main() {
    if let Err(error) = run() {
        eprintln!("cfz error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match &cli.command {
        cli::Commands::Generate(args) => pipeline::run_generate(args),
        cli::Commands::Signatures(args) => pipeline::run_signatures(args),
    }
}

fn init_tracing(quiet: bool, verbose: u8) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CFZ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr; stdout carries generated code only.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
