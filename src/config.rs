//! Configuration parameters for a route optimization run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::solver::SolveLimits;

/// Configuration settings for [`RouteOptimizer`](crate::RouteOptimizer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Optional wall-clock budget forwarded to the solver
    pub time_limit: Option<Duration>,
    /// Optional branch-and-bound node budget forwarded to the solver
    pub node_limit: Option<u64>,
    /// Edge variables above this value count as selected
    pub edge_threshold: f64,
    /// Relative tolerance between solver objective and recomputed tour cost
    pub objective_tolerance: f64,
    /// Reject tours the solver did not prove optimal
    pub require_optimal: bool,
    /// Reject instances whose reachable-edge graph is not strongly connected before solving
    pub precheck_connectivity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            time_limit: None,
            node_limit: None,
            edge_threshold: 0.5,
            objective_tolerance: 1e-6,
            require_optimal: false,
            precheck_connectivity: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Set the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Set the edge selection threshold.
    pub fn with_edge_threshold(mut self, threshold: f64) -> Self {
        self.edge_threshold = threshold;
        self
    }

    /// Set the objective cross-check tolerance.
    pub fn with_objective_tolerance(mut self, tolerance: f64) -> Self {
        self.objective_tolerance = tolerance;
        self
    }

    /// Require a proven optimum.
    pub fn with_require_optimal(mut self, required: bool) -> Self {
        self.require_optimal = required;
        self
    }

    /// Enable or disable the connectivity pre-check.
    pub fn with_precheck_connectivity(mut self, enabled: bool) -> Self {
        self.precheck_connectivity = enabled;
        self
    }

    /// The budget handed to the solver.
    pub fn limits(&self) -> SolveLimits {
        SolveLimits {
            time_limit: self.time_limit,
            node_limit: self.node_limit,
        }
    }
}
