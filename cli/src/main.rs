mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{cluster, simulate};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub async fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Cluster(args) => cluster::run(&cli, args).await,
        Commands::Simulate(args) => simulate::run(&cli, args).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> { run().await }
