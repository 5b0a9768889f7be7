//! Basic example of using the MTZ-Tour library.

use mtz_tour::config::Config;
use mtz_tour::matrix::CostMatrix;
use mtz_tour::problem::Problem;
use mtz_tour::solver::MicroLpSolver;
use mtz_tour::utils::{format_duration, format_route, save_route};
use mtz_tour::RouteOptimizer;
use std::env;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Load the problem from a file if given, otherwise use a small built-in instance
    let args: Vec<String> = env::args().collect();
    let problem = if args.len() > 1 {
        println!("Loading problem from: {}", args[1]);
        Problem::from_file(&args[1])?
    } else {
        let matrix = CostMatrix::from_dense(&[
            vec![0.0, 10.0, 15.0, 20.0],
            vec![10.0, 0.0, 35.0, 25.0],
            vec![15.0, 35.0, 0.0, 30.0],
            vec![20.0, 25.0, 30.0, 0.0],
        ])?;
        Problem::new(
            "four-cities".to_string(),
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            matrix,
        )?
    };
    println!("Loaded problem: {} with {} locations", problem.name, problem.len());

    let config = Config::new().with_time_limit(Duration::from_secs(60));
    let mut optimizer = RouteOptimizer::new(config);

    let start_time = Instant::now();
    let route = optimizer.optimize_labeled(&problem, &MicroLpSolver::new())?;
    let runtime = start_time.elapsed();

    println!("Solved in {}", format_duration(runtime));
    println!("Route: {}", format_route(&route));
    println!("Total cost: {:.2}", route.total_cost);
    println!("Proven optimal: {}", route.proven_optimal);
    println!("{}", optimizer.statistics.format());

    let output_path = format!("{}.route", problem.name);
    println!("Saving route to: {}", output_path);
    save_route(&route, &problem.matrix, &problem.name, &output_path)?;

    Ok(())
}
