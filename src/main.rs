use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use mtz_tour::config::Config;
use mtz_tour::instances::random_euclidean;
use mtz_tour::problem::Problem;
use mtz_tour::solver::MicroLpSolver;
use mtz_tour::utils::{format_route, save_route};
use mtz_tour::RouteOptimizer;

/// Solve a closed-tour routing problem exactly with an MTZ formulation.
#[derive(Debug, Parser)]
#[command(name = "mtz-tour", version, about)]
struct Cli {
    /// JSON problem file with `name`, `locations` and `costs`
    #[arg(short, long, conflicts_with = "random", required_unless_present = "random")]
    input: Option<PathBuf>,

    /// Generate a random Euclidean instance with this many locations
    #[arg(long)]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Time budget in seconds forwarded to the solver. The bundled microlp
    /// backend ignores it and always solves to proven optimality.
    #[arg(long)]
    time_limit: Option<u64>,

    /// Fail unless the solver proves optimality
    #[arg(long)]
    require_optimal: bool,

    /// Write a route report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> mtz_tour::error::Result<()> {
    let problem = match (&cli.input, cli.random) {
        (Some(path), _) => {
            info!("loading problem from {}", path.display());
            Problem::from_file(path)?
        }
        (None, Some(n)) => Problem::unnamed(
            format!("random-{}-{}", n, cli.seed),
            random_euclidean(n, cli.seed)?,
        ),
        (None, None) => unreachable!("clap requires --input or --random"),
    };

    let mut config = Config::new().with_require_optimal(cli.require_optimal);
    if let Some(seconds) = cli.time_limit {
        config = config.with_time_limit(Duration::from_secs(seconds));
    }

    let mut optimizer = RouteOptimizer::new(config);
    let route = optimizer.optimize_labeled(&problem, &MicroLpSolver::new())?;

    println!("{}", format_route(&route));
    println!("Total cost: {:.2}", route.total_cost);
    println!("Proven optimal: {}", route.proven_optimal);
    info!("{}", optimizer.statistics.format());

    if let Some(path) = &cli.output {
        save_route(&route, &problem.matrix, &problem.name, path)?;
        info!("route report written to {}", path.display());
    }

    Ok(())
}
