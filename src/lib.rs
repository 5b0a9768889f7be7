//! # MTZ-Tour
//!
//! Exact minimum-cost closed tours over a directed cost matrix.
//!
//! A [`CostMatrix`](matrix::CostMatrix) is turned into a mixed-integer linear program
//! for the asymmetric traveling-salesman problem, with Miller-Tucker-Zemlin order
//! variables eliminating subtours. Any [`SolverAdapter`](solver::SolverAdapter) can
//! solve the model; the raw edge assignment is then walked back into a
//! [`Tour`](solution::Tour) and validated as a single Hamiltonian cycle whose cost
//! matches the solver's objective.

pub mod config;
pub mod error;
pub mod formulation;
pub mod instances;
pub mod matrix;
pub mod output;
pub mod problem;
pub mod solution;
pub mod solver;
pub mod utils;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::formulation::FormulationBuilder;
use crate::matrix::CostMatrix;
use crate::output::LabeledRoute;
use crate::problem::Problem;
use crate::solution::{SolutionExtractor, Tour};
use crate::solver::{SolveStatus, SolverAdapter};
use crate::utils::RunStatistics;

use log::{info, warn};
use std::time::Instant;

/// Runs the build, solve and extract pipeline for one instance at a time.
///
/// Every call to [`optimize`](Self::optimize) builds its own model; only the
/// statistics of the most recent run are kept.
pub struct RouteOptimizer {
    pub config: Config,
    pub statistics: RunStatistics,
}

impl RouteOptimizer {
    /// Create an optimizer with the given configuration.
    pub fn new(config: Config) -> Self {
        RouteOptimizer {
            config,
            statistics: RunStatistics::default(),
        }
    }

    /// Find a minimum-cost tour over `matrix` using `solver`.
    pub fn optimize(&mut self, matrix: &CostMatrix, solver: &dyn SolverAdapter) -> Result<Tour> {
        self.statistics = RunStatistics {
            solver: solver.name().to_string(),
            ..RunStatistics::default()
        };

        let start = Instant::now();
        let formulation = FormulationBuilder::build(matrix)?;
        self.statistics.formulation = formulation.stats;
        self.statistics.build_time = start.elapsed();

        if self.config.precheck_connectivity {
            precheck(matrix)?;
        }

        let start = Instant::now();
        let response = solver.solve(&formulation.model, &self.config.limits());
        self.statistics.solve_time = start.elapsed();
        self.statistics.status = Some(response.status);

        let detail = response.detail.clone().unwrap_or_default();
        match response.status {
            SolveStatus::Optimal => {}
            SolveStatus::Feasible if self.config.require_optimal => {
                return Err(Error::SolverUnavailable {
                    solver: solver.name().to_string(),
                    status: response.status,
                    detail: "solver stopped before proving optimality".to_string(),
                });
            }
            SolveStatus::Feasible => {
                warn!(
                    "solver `{}` returned a tour without proving optimality",
                    solver.name()
                );
            }
            SolveStatus::Infeasible => {
                return Err(Error::infeasible(
                    matrix.n(),
                    format!("solver `{}` proved the model infeasible: {}", solver.name(), detail),
                ));
            }
            SolveStatus::Unbounded | SolveStatus::Error => {
                return Err(Error::SolverUnavailable {
                    solver: solver.name().to_string(),
                    status: response.status,
                    detail,
                });
            }
        }

        let start = Instant::now();
        let tour = SolutionExtractor::from_config(&self.config).extract(
            &formulation,
            matrix,
            response.status,
            response.assignment.as_ref(),
        )?;
        self.statistics.extract_time = start.elapsed();
        self.statistics.total_cost = Some(tour.cost);

        info!(
            "solved {} locations with `{}` ({}): cost {:.2}",
            matrix.n(),
            solver.name(),
            response.status,
            tour.cost
        );

        Ok(tour)
    }

    /// Optimize a named problem and return the route in its location names.
    pub fn optimize_labeled(
        &mut self,
        problem: &Problem,
        solver: &dyn SolverAdapter,
    ) -> Result<LabeledRoute<String>> {
        let tour = self.optimize(&problem.matrix, solver)?;
        LabeledRoute::from_tour(&tour, &problem.locations)
    }
}

/// Reject instances that provably have no closed tour.
fn precheck(matrix: &CostMatrix) -> Result<()> {
    let n = matrix.n();
    for location in 0..n {
        if matrix.successors(location).next().is_none() {
            return Err(Error::infeasible(
                n,
                format!("location {} cannot reach any other location", location),
            ));
        }
        if matrix.predecessors(location).next().is_none() {
            return Err(Error::infeasible(
                n,
                format!("location {} is unreachable from every other location", location),
            ));
        }
    }

    if !matrix.strongly_connected() {
        return Err(Error::infeasible(
            n,
            "reachable edges do not connect every pair of locations",
        ));
    }

    Ok(())
}
