//! Validated square matrix of directed travel costs.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Cost used for pairs with no usable route.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// An n×n matrix where entry (i, j) is the cost of driving directly from i to j.
///
/// Off-diagonal entries are non-negative or [`UNREACHABLE`]. Diagonal entries are
/// stored as zero but are never traversable. The matrix may be asymmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<Option<f64>>>",
    into = "Vec<Vec<Option<f64>>>"
)]
pub struct CostMatrix {
    n: usize,
    costs: Vec<f64>,
}

impl CostMatrix {
    /// Build a matrix from raw pairwise observations.
    ///
    /// Every ordered pair `(i, j)` with `i != j` must be present. An observation of
    /// `None` means the cost provider found no route, and becomes [`UNREACHABLE`].
    pub fn from_observations(
        n: usize,
        observations: &HashMap<(usize, usize), Option<f64>>,
    ) -> Result<Self> {
        if n == 0 {
            return Err(Error::invalid_matrix("matrix has no locations"));
        }

        if let Some(&(i, j)) = observations.keys().find(|&&(i, j)| i >= n || j >= n) {
            return Err(Error::invalid_matrix(format!(
                "observation ({}, {}) is outside a {}x{} matrix",
                i, j, n, n
            )));
        }

        let mut costs = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let observed = observations.get(&(i, j)).ok_or_else(|| {
                    Error::invalid_matrix(format!("missing cost for pair ({}, {})", i, j))
                })?;
                costs[i * n + j] = normalize(i, j, *observed)?;
            }
        }

        Ok(CostMatrix { n, costs })
    }

    /// Build a matrix from rows where `None` marks an unreachable pair.
    pub fn from_rows(rows: &[Vec<Option<f64>>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::invalid_matrix("matrix has no locations"));
        }

        let mut costs = vec![0.0; n * n];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(Error::invalid_matrix(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if i != j {
                    costs[i * n + j] = normalize(i, j, value)?;
                }
            }
        }

        Ok(CostMatrix { n, costs })
    }

    /// Build a matrix from plain rows where `f64::INFINITY` marks an unreachable pair.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self> {
        let rows: Vec<Vec<Option<f64>>> = rows
            .iter()
            .map(|row| row.iter().map(|&v| Some(v)).collect())
            .collect();
        Self::from_rows(&rows)
    }

    /// Build a symmetric matrix of Euclidean distances between planar points.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self> {
        let rows: Vec<Vec<f64>> = points
            .iter()
            .map(|&(x1, y1)| {
                points
                    .iter()
                    .map(|&(x2, y2)| ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        Self::from_dense(&rows)
    }

    /// Number of locations.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Cost of travelling directly from `from` to `to`.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.n + to]
    }

    /// Whether the direct edge `from -> to` may appear in a tour.
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        from != to && self.cost(from, to).is_finite()
    }

    /// Check whether cost(i, j) equals cost(j, i) for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.cost(i, j) == self.cost(j, i)))
    }

    /// All traversable directed edges in row-major order.
    pub fn finite_edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n).flat_map(move |i| {
            (0..self.n)
                .filter(move |&j| self.is_reachable(i, j))
                .map(move |j| (i, j, self.cost(i, j)))
        })
    }

    /// Locations directly reachable from `from`.
    pub fn successors(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&to| self.is_reachable(from, to))
    }

    /// Locations that can reach `to` directly.
    pub fn predecessors(&self, to: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&from| self.is_reachable(from, to))
    }

    /// Whether every location can reach every other over traversable edges.
    ///
    /// A closed tour exists only if this holds, so a `false` here proves infeasibility.
    pub fn strongly_connected(&self) -> bool {
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(self.n, self.n * self.n);
        for _ in 0..self.n {
            graph.add_node(());
        }
        for (i, j, _) in self.finite_edges() {
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
        }
        tarjan_scc(&graph).len() == 1
    }
}

fn normalize(i: usize, j: usize, observed: Option<f64>) -> Result<f64> {
    match observed {
        None => Ok(UNREACHABLE),
        Some(v) if v.is_nan() => Err(Error::invalid_matrix(format!(
            "cost for pair ({}, {}) is NaN",
            i, j
        ))),
        Some(v) if v < 0.0 => Err(Error::invalid_matrix(format!(
            "cost for pair ({}, {}) is negative: {}",
            i, j, v
        ))),
        Some(v) => Ok(v),
    }
}

impl TryFrom<Vec<Vec<Option<f64>>>> for CostMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        CostMatrix::from_rows(&rows)
    }
}

impl From<CostMatrix> for Vec<Vec<Option<f64>>> {
    fn from(matrix: CostMatrix) -> Self {
        matrix
            .costs
            .chunks(matrix.n)
            .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
            .collect()
    }
}
