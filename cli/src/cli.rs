use std::path::PathBuf;

use binroute::{Criterion, DEFAULT_SIMILARITY_THRESHOLD};

/// Waste collection route planning and truck proximity alerts
#[derive(clap::Parser, Debug)]
#[command(name = "binroute", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Group addresses into street routes and rank them
    Cluster(ClusterArgs),

    /// Replay a recorded truck track and print the alerts it would send
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ClusterArgs {
    /// JSON array of address documents
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub addresses: PathBuf,

    /// Street similarity needed to join a route, in [0, 1]
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    /// Ranking criterion: efficient, fastest, most-users, fuel-saving
    #[arg(short, long, default_value_t = Criterion::Efficient)]
    pub criterion: Criterion,

    /// Scoring parameters JSON, defaults to built-in constants
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub params: Option<PathBuf>,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    /// JSON array of position samples, oldest first
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub track: PathBuf,

    /// JSON array of resident documents on the route
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub residents: PathBuf,

    /// Route being driven
    #[arg(long)]
    pub route: String,

    /// Driver name shown in alerts
    #[arg(long)]
    pub driver: String,

    /// Truck unit shown in alerts
    #[arg(long, default_value = "")]
    pub unit: String,

    /// Tracker config JSON (radii, cadence, timeouts)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}
