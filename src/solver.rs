//! Solver adapter boundary and the bundled pure-Rust MILP backend.

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::formulation::{Model, Sense, VarKind};

/// Terminal status reported by a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Best found within the resource budget, optimality not proven.
    Feasible,
    Infeasible,
    Unbounded,
    Error,
}

impl SolveStatus {
    /// Whether an assignment accompanies this status.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Resource budget handed to the solver untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveLimits {
    pub time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
}

impl SolveLimits {
    pub fn is_unlimited(&self) -> bool {
        self.time_limit.is_none() && self.node_limit.is_none()
    }
}

/// Variable values indexed by model variable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub values: Vec<f64>,
    pub objective: f64,
}

/// What a solver hands back for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    pub status: SolveStatus,
    /// Present only when `status` is `Optimal` or `Feasible`.
    pub assignment: Option<Assignment>,
    /// Free-form message from the backend.
    pub detail: Option<String>,
}

impl SolverResponse {
    pub fn solved(status: SolveStatus, assignment: Assignment) -> Self {
        SolverResponse {
            status,
            assignment: Some(assignment),
            detail: None,
        }
    }

    pub fn failed(status: SolveStatus, detail: impl Into<String>) -> Self {
        SolverResponse {
            status,
            assignment: None,
            detail: Some(detail.into()),
        }
    }
}

/// Anything that can solve a [`Model`]: an exact MILP solver, a commercial backend,
/// or a heuristic under a time budget.
pub trait SolverAdapter {
    fn name(&self) -> &str;

    fn solve(&self, model: &Model, limits: &SolveLimits) -> SolverResponse;
}

/// Exact branch-and-bound through `good_lp`'s pure-Rust `microlp` backend.
///
/// The backend has no budget controls, so it always runs to proven optimality.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        MicroLpSolver
    }
}

impl SolverAdapter for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model, limits: &SolveLimits) -> SolverResponse {
        if !limits.is_unlimited() {
            warn!("microlp backend ignores solve limits {:?}", limits);
        }

        // Constant rows would reach the backend as `0 = rhs`; decide them here.
        if let Some(row) = model
            .constraints
            .iter()
            .find(|c| c.terms.is_empty() && !c.is_satisfied_by(&[], 1e-9))
        {
            return SolverResponse::failed(
                SolveStatus::Infeasible,
                format!("constraint {} has no variables and cannot hold", row.name),
            );
        }

        let mut vars = ProblemVariables::new();
        let lp_vars: Vec<good_lp::Variable> = model
            .variables
            .iter()
            .map(|v| match v.kind {
                VarKind::Binary => vars.add(variable().binary().name(v.name.clone())),
                VarKind::Continuous { lower, upper } => {
                    vars.add(variable().min(lower).max(upper).name(v.name.clone()))
                }
            })
            .collect();

        let objective: Expression = model
            .objective
            .iter()
            .map(|&(var, coefficient)| coefficient * lp_vars[var])
            .sum();

        let mut problem = vars.minimise(objective).using(good_lp::microlp);
        for row in model.constraints.iter().filter(|c| !c.terms.is_empty()) {
            let lhs: Expression = row
                .terms
                .iter()
                .map(|&(var, coefficient)| coefficient * lp_vars[var])
                .sum();
            problem = problem.with(match row.sense {
                Sense::Eq => constraint::eq(lhs, row.rhs),
                Sense::Le => constraint::leq(lhs, row.rhs),
            });
        }

        debug!(
            "submitting {} variables and {} constraints to microlp",
            model.variable_count(),
            model.constraint_count()
        );

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = lp_vars.iter().map(|&v| solution.value(v)).collect();
                let objective = model.evaluate_objective(&values);
                SolverResponse::solved(SolveStatus::Optimal, Assignment { values, objective })
            }
            Err(ResolutionError::Infeasible) => {
                SolverResponse::failed(SolveStatus::Infeasible, "microlp proved the model infeasible")
            }
            Err(ResolutionError::Unbounded) => {
                SolverResponse::failed(SolveStatus::Unbounded, "microlp reported an unbounded objective")
            }
            Err(other) => SolverResponse::failed(SolveStatus::Error, other.to_string()),
        }
    }
}
