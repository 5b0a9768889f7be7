//! MILP formulation of the asymmetric TSP with Miller-Tucker-Zemlin subtour elimination.
//!
//! The builder produces an immutable, solver-agnostic [`Model`]. Edge variables come
//! first (ids `0..edge_count`), followed by one order variable per non-anchor
//! location. Variables and constraints are emitted in a fixed order so that two
//! builds of the same matrix are identical.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::CostMatrix;

/// Index of a variable inside a [`Model`].
pub type VarId = usize;

/// The location every tour starts from and returns to.
pub const ANCHOR: usize = 0;

/// Domain of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VarKind {
    Binary,
    Continuous { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
}

/// Relation between the left-hand side and the right-hand side of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Eq,
    Le,
}

/// `sum(coefficient * variable) <sense> rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Check the constraint against concrete variable values.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var])
            .sum();
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs() <= tolerance,
            Sense::Le => lhs <= self.rhs + tolerance,
        }
    }
}

/// A minimisation MILP described independently of any solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub variables: Vec<Variable>,
    pub objective: Vec<(VarId, f64)>,
    pub constraints: Vec<LinearConstraint>,
}

impl Model {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value for concrete variable values.
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var])
            .sum()
    }
}

/// Mapping between edge variables and the directed location pairs they decide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMap {
    n: usize,
    edges: Vec<(usize, usize)>,
    lookup: Vec<Option<VarId>>,
}

impl EdgeMap {
    fn new(n: usize) -> Self {
        EdgeMap {
            n,
            edges: Vec::new(),
            lookup: vec![None; n * n],
        }
    }

    fn insert(&mut self, from: usize, to: usize) -> VarId {
        let var = self.edges.len();
        self.edges.push((from, to));
        self.lookup[from * self.n + to] = Some(var);
        var
    }

    /// The variable deciding `from -> to`, or `None` if the edge is excluded.
    pub fn var(&self, from: usize, to: usize) -> Option<VarId> {
        self.lookup[from * self.n + to]
    }

    /// The edge decided by `var`, if `var` is an edge variable.
    pub fn edge(&self, var: VarId) -> Option<(usize, usize)> {
        self.edges.get(var).copied()
    }

    /// All `(var, from, to)` triples in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, usize, usize)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(var, &(from, to))| (var, from, to))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Size summary of a built formulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulationStats {
    pub locations: usize,
    pub edge_variables: usize,
    pub order_variables: usize,
    pub excluded_edges: usize,
    pub degree_constraints: usize,
    pub mtz_constraints: usize,
}

/// A built model together with the maps needed to read its solution back.
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub n: usize,
    pub model: Model,
    pub edges: EdgeMap,
    /// Order variable of each location; `None` for the anchor.
    pub order_vars: Vec<Option<VarId>>,
    pub stats: FormulationStats,
}

/// Builds the ATSP + MTZ model for a cost matrix.
pub struct FormulationBuilder;

impl FormulationBuilder {
    /// Build the model.
    ///
    /// Self-loops never get a variable, and neither do unreachable edges: an
    /// infinite coefficient would poison the objective, so those edges are simply
    /// absent and every constraint sums over the edges that exist.
    pub fn build(matrix: &CostMatrix) -> Result<Formulation> {
        let n = matrix.n();
        if n < 2 {
            return Err(Error::Formulation {
                n,
                reason: "a tour needs at least two locations".to_string(),
            });
        }

        let mut variables = Vec::with_capacity(n * n);
        let mut objective = Vec::with_capacity(n * n);
        let mut edges = EdgeMap::new(n);

        for (from, to, cost) in matrix.finite_edges() {
            let var = edges.insert(from, to);
            variables.push(Variable {
                name: format!("x_{}_{}", from, to),
                kind: VarKind::Binary,
            });
            objective.push((var, cost));
        }
        let excluded_edges = n * (n - 1) - edges.len();

        let upper = (n - 1) as f64;
        let mut order_vars = vec![None; n];
        for (location, slot) in order_vars.iter_mut().enumerate().skip(1) {
            *slot = Some(variables.len());
            variables.push(Variable {
                name: format!("u_{}", location),
                kind: VarKind::Continuous { lower: 0.0, upper },
            });
        }

        let mut constraints = Vec::with_capacity(2 * n + (n - 1) * (n - 2));

        for from in 0..n {
            constraints.push(LinearConstraint {
                name: format!("out_{}", from),
                terms: (0..n)
                    .filter_map(|to| edges.var(from, to))
                    .map(|var| (var, 1.0))
                    .collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }
        for to in 0..n {
            constraints.push(LinearConstraint {
                name: format!("in_{}", to),
                terms: (0..n)
                    .filter_map(|from| edges.var(from, to))
                    .map(|var| (var, 1.0))
                    .collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }
        let degree_constraints = constraints.len();

        // u_i - u_j + n * x_ij <= n - 1 for non-anchor i != j. Without x_ij the
        // inequality is implied by the bounds on u, so excluded edges emit nothing.
        let big_m = n as f64;
        for i in 1..n {
            for j in 1..n {
                let Some(x) = edges.var(i, j) else {
                    continue;
                };
                let (Some(u_i), Some(u_j)) = (order_vars[i], order_vars[j]) else {
                    continue;
                };
                constraints.push(LinearConstraint {
                    name: format!("mtz_{}_{}", i, j),
                    terms: vec![(u_i, 1.0), (u_j, -1.0), (x, big_m)],
                    sense: Sense::Le,
                    rhs: upper,
                });
            }
        }
        let mtz_constraints = constraints.len() - degree_constraints;

        let stats = FormulationStats {
            locations: n,
            edge_variables: edges.len(),
            order_variables: n - 1,
            excluded_edges,
            degree_constraints,
            mtz_constraints,
        };
        debug!(
            "built MTZ model: {} locations, {} edge vars ({} excluded), {} order vars, {} constraints",
            n,
            stats.edge_variables,
            stats.excluded_edges,
            stats.order_variables,
            constraints.len()
        );

        Ok(Formulation {
            n,
            model: Model {
                variables,
                objective,
                constraints,
            },
            edges,
            order_vars,
            stats,
        })
    }
}
