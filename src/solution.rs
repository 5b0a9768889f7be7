//! Tour representation and reconstruction from a solver assignment.

use itertools::Itertools;
use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::error::{AssignmentSnapshot, Error, Invariant, Result};
use crate::formulation::{Formulation, ANCHOR};
use crate::matrix::CostMatrix;
use crate::solver::{Assignment, SolveStatus};

/// A closed tour visiting every location exactly once.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    /// Locations in visiting order, starting at the anchor. The return leg is implicit.
    pub order: Vec<usize>,
    /// Cost recomputed along the tour, including the return leg
    pub cost: f64,
    /// Objective value reported by the solver
    pub solver_objective: f64,
    /// Whether the solver proved this tour optimal
    pub proven_optimal: bool,
}

impl Tour {
    /// Number of locations on the tour.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Directed legs of the closed tour, including the return to the start.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        closed_legs(&self.order)
    }

    /// Recompute the cost of this tour under a matrix.
    pub fn cost_under(&self, matrix: &CostMatrix) -> f64 {
        tour_cost(matrix, &self.order)
    }

    /// The same cycle listed from `start`, or `None` if `start` is not on the tour.
    pub fn rotated_to(&self, start: usize) -> Option<Vec<usize>> {
        let position = self.order.iter().position(|&location| location == start)?;
        let mut rotated = self.order.clone();
        rotated.rotate_left(position);
        Some(rotated)
    }

    /// The cycle travelled in the opposite direction, still starting at the same location.
    pub fn reversed(&self) -> Vec<usize> {
        let mut reversed = self.order.clone();
        if reversed.len() > 1 {
            reversed[1..].reverse();
        }
        reversed
    }
}

impl fmt::Debug for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tour:")?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Solver Objective: {:.2}", self.solver_objective)?;
        writeln!(f, "  Proven Optimal: {}", self.proven_optimal)?;
        writeln!(f, "  Order: {:?}", self.order)
    }
}

/// Consecutive pairs of a location sequence, wrapping around to the first entry.
pub fn closed_legs(order: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    order.iter().copied().circular_tuple_windows::<(usize, usize)>()
}

/// Total cost of visiting `order` and returning to its first location.
pub fn tour_cost(matrix: &CostMatrix, order: &[usize]) -> f64 {
    if order.len() < 2 {
        return 0.0;
    }
    closed_legs(order).map(|(from, to)| matrix.cost(from, to)).sum()
}

/// Turns a raw solver assignment into a validated [`Tour`].
#[derive(Debug, Clone, Copy)]
pub struct SolutionExtractor {
    /// Edge values above this count as selected
    pub edge_threshold: f64,
    /// Relative tolerance for the objective cross-check
    pub objective_tolerance: f64,
}

impl Default for SolutionExtractor {
    fn default() -> Self {
        SolutionExtractor {
            edge_threshold: 0.5,
            objective_tolerance: 1e-6,
        }
    }
}

impl SolutionExtractor {
    pub fn new(edge_threshold: f64, objective_tolerance: f64) -> Self {
        SolutionExtractor {
            edge_threshold,
            objective_tolerance,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.edge_threshold, config.objective_tolerance)
    }

    /// Walk the selected edges from the anchor and check that they form one
    /// Hamiltonian cycle whose cost matches the solver objective.
    pub fn extract(
        &self,
        formulation: &Formulation,
        matrix: &CostMatrix,
        status: SolveStatus,
        assignment: Option<&Assignment>,
    ) -> Result<Tour> {
        let n = formulation.n;
        if matrix.n() != n {
            return Err(Error::invalid_matrix(format!(
                "matrix has {} locations, formulation was built for {}",
                matrix.n(),
                n
            )));
        }

        let Some(assignment) = assignment else {
            return Err(inconsistent(
                Invariant::MissingAssignment,
                AssignmentSnapshot {
                    n,
                    ..AssignmentSnapshot::default()
                },
            ));
        };

        let expected = formulation.model.variable_count();
        if assignment.values.len() < expected {
            return Err(inconsistent(
                Invariant::TruncatedAssignment {
                    expected,
                    got: assignment.values.len(),
                },
                AssignmentSnapshot {
                    n,
                    selected_edges: Vec::new(),
                    objective: Some(assignment.objective),
                },
            ));
        }

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut selected = Vec::with_capacity(n);
        for (var, from, to) in formulation.edges.iter() {
            let value = assignment.values[var];
            if !value.is_finite() {
                return Err(inconsistent(
                    Invariant::NonFiniteValue { variable: var },
                    AssignmentSnapshot {
                        n,
                        selected_edges: selected,
                        objective: Some(assignment.objective),
                    },
                ));
            }
            if value > self.edge_threshold {
                successors[from].push(to);
                selected.push((from, to, value));
            }
        }
        let snapshot = AssignmentSnapshot {
            n,
            selected_edges: selected,
            objective: Some(assignment.objective),
        };

        let next_of = |location: usize| -> Result<usize> {
            match successors[location].as_slice() {
                [next] => Ok(*next),
                [] => Err(inconsistent(
                    Invariant::NoOutgoingEdge { location },
                    snapshot.clone(),
                )),
                targets => Err(inconsistent(
                    Invariant::MultipleOutgoingEdges {
                        location,
                        targets: targets.to_vec(),
                    },
                    snapshot.clone(),
                )),
            }
        };

        let mut order = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut current = ANCHOR;
        order.push(current);
        visited[current] = true;

        // At most n - 1 steps: a revisit before then means a sub-cycle.
        for _ in 1..n {
            let next = next_of(current)?;
            if visited[next] {
                return Err(inconsistent(
                    Invariant::Subtour {
                        cycles: find_cycles(n, &snapshot.selected_edges),
                    },
                    snapshot.clone(),
                ));
            }
            visited[next] = true;
            order.push(next);
            current = next;
        }

        if next_of(current)? != ANCHOR {
            return Err(inconsistent(
                Invariant::OpenTour { last: current },
                snapshot.clone(),
            ));
        }

        let cost = tour_cost(matrix, &order);
        let reported = assignment.objective;
        let scale = 1.0_f64.max(reported.abs()).max(cost.abs());
        if (reported - cost).abs() > self.objective_tolerance * scale {
            return Err(inconsistent(
                Invariant::ObjectiveMismatch {
                    reported,
                    recomputed: cost,
                },
                snapshot,
            ));
        }

        debug!("extracted tour {:?} with cost {}", order, cost);

        Ok(Tour {
            order,
            cost,
            solver_objective: reported,
            proven_optimal: status == SolveStatus::Optimal,
        })
    }
}

fn inconsistent(invariant: Invariant, snapshot: AssignmentSnapshot) -> Error {
    Error::InconsistentSolution {
        invariant,
        snapshot,
    }
}

/// Cycles formed by the selected edges, each listed in ascending order.
fn find_cycles(n: usize, selected: &[(usize, usize, f64)]) -> Vec<Vec<usize>> {
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(n, selected.len());
    for _ in 0..n {
        graph.add_node(());
    }
    for &(from, to, _) in selected {
        graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
    }

    tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            component
                .into_iter()
                .map(|node| node.index())
                .sorted()
                .collect::<Vec<_>>()
        })
        .sorted()
        .collect()
}
