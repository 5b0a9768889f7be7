//! Projection of a tour onto the caller's location identities.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::CostMatrix;
use crate::solution::{closed_legs, Tour};

/// A validated tour expressed in caller identities, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRoute<L> {
    /// Identities in visiting order, starting at the anchor
    pub stops: Vec<L>,
    /// Index of each stop in the original location list
    pub indices: Vec<usize>,
    pub total_cost: f64,
    pub proven_optimal: bool,
}

impl<L: Clone> LabeledRoute<L> {
    /// Map `tour` onto `labels`, where `labels[i]` names location `i`.
    pub fn from_tour(tour: &Tour, labels: &[L]) -> Result<Self> {
        if labels.len() != tour.len() {
            return Err(Error::LabelMismatch {
                expected: tour.len(),
                got: labels.len(),
            });
        }

        let stops = tour
            .order
            .iter()
            .map(|&i| {
                labels.get(i).cloned().ok_or(Error::LocationOutOfRange {
                    index: i,
                    n: labels.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LabeledRoute {
            stops,
            indices: tour.order.clone(),
            total_cost: tour.cost,
            proven_optimal: tour.proven_optimal,
        })
    }
}

impl<L> LabeledRoute<L> {
    /// Every leg of the route including the return to the start, with its cost.
    pub fn closed_legs<'a>(
        &'a self,
        matrix: &'a CostMatrix,
    ) -> impl Iterator<Item = (&'a L, &'a L, f64)> + 'a {
        let n = self.indices.len();
        closed_legs(&self.indices)
            .enumerate()
            .map(move |(k, (from, to))| {
                (
                    &self.stops[k],
                    &self.stops[(k + 1) % n],
                    matrix.cost(from, to),
                )
            })
    }
}
