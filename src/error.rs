//! Error taxonomy for the route optimization core.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::solver::SolveStatus;

/// Everything that can go wrong between a raw cost input and a validated tour.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete cost input. The caller must fix the input.
    #[error("invalid cost matrix: {0}")]
    InvalidMatrix(String),

    /// Degenerate instance that cannot be formulated.
    #[error("cannot formulate instance with {n} location(s): {reason}")]
    Formulation { n: usize, reason: String },

    /// The solver backend is missing, crashed, or returned a non-usable status.
    #[error("solver `{solver}` failed with status {status}: {detail}")]
    SolverUnavailable {
        solver: String,
        status: SolveStatus,
        detail: String,
    },

    /// No closed tour exists for this instance.
    #[error("no tour exists over {n} locations: {reason}")]
    InfeasibleInstance { n: usize, reason: String },

    /// The solver assignment does not describe a single Hamiltonian cycle.
    #[error("inconsistent solver assignment ({invariant}): {snapshot}")]
    InconsistentSolution {
        invariant: Invariant,
        snapshot: AssignmentSnapshot,
    },

    /// The identities handed to the output adapter do not match the tour.
    #[error("expected {expected} location labels, got {got}")]
    LabelMismatch { expected: usize, got: usize },

    /// A tour refers to a location that has no label.
    #[error("tour visits location {index}, but only {n} labels were given")]
    LocationOutOfRange { index: usize, n: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix(message.into())
    }

    pub fn infeasible(n: usize, reason: impl Into<String>) -> Self {
        Self::InfeasibleInstance {
            n,
            reason: reason.into(),
        }
    }

    /// None of the failures change on a second attempt with the same input.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Whether this error points at a bug in the formulation or a solver adapter
    /// rather than at the input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Error::InconsistentSolution { .. })
    }
}

/// The tour invariant that an assignment violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Invariant {
    /// Status claimed a solution but no assignment was attached.
    MissingAssignment,
    /// The assignment has fewer values than the model has variables.
    TruncatedAssignment { expected: usize, got: usize },
    /// A variable value is NaN or infinite.
    NonFiniteValue { variable: usize },
    /// A location has no selected outgoing edge.
    NoOutgoingEdge { location: usize },
    /// A location has more than one selected outgoing edge.
    MultipleOutgoingEdges { location: usize, targets: Vec<usize> },
    /// The walk from the anchor returned to a visited location early.
    Subtour { cycles: Vec<Vec<usize>> },
    /// After visiting every location, the closing edge to the anchor is not selected.
    OpenTour { last: usize },
    /// The solver objective disagrees with the cost recomputed along the tour.
    ObjectiveMismatch { reported: f64, recomputed: f64 },
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::MissingAssignment => write!(f, "solver reported success without an assignment"),
            Invariant::TruncatedAssignment { expected, got } => {
                write!(f, "assignment has {} values, model has {} variables", got, expected)
            }
            Invariant::NonFiniteValue { variable } => {
                write!(f, "variable {} has a non-finite value", variable)
            }
            Invariant::NoOutgoingEdge { location } => {
                write!(f, "location {} has no selected outgoing edge", location)
            }
            Invariant::MultipleOutgoingEdges { location, targets } => write!(
                f,
                "location {} has {} selected outgoing edges {:?}",
                location,
                targets.len(),
                targets
            ),
            Invariant::Subtour { cycles } => write!(f, "selected edges form sub-cycles {:?}", cycles),
            Invariant::OpenTour { last } => {
                write!(f, "edge {} -> 0 closing the tour is not selected", last)
            }
            Invariant::ObjectiveMismatch {
                reported,
                recomputed,
            } => write!(
                f,
                "solver objective {} differs from recomputed tour cost {}",
                reported, recomputed
            ),
        }
    }
}

/// Raw view of an assignment at the moment extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSnapshot {
    /// Number of locations in the instance
    pub n: usize,
    /// Edges whose value exceeded the selection threshold, with that value
    pub selected_edges: Vec<(usize, usize, f64)>,
    /// Objective reported by the solver, if any
    pub objective: Option<f64>,
}

impl fmt::Display for AssignmentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}, objective=", self.n)?;
        match self.objective {
            Some(objective) => write!(f, "{}", objective)?,
            None => write!(f, "none")?,
        }
        write!(f, ", selected=[")?;
        for (k, (i, j, value)) in self.selected_edges.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}->{}:{:.3}", i, j, value)?;
        }
        write!(f, "]")
    }
}
