//! Named routing instances and file loading.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::matrix::CostMatrix;

/// A cost matrix together with the caller's names for its locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub name: String,
    pub locations: Vec<String>,
    #[serde(rename = "costs")]
    pub matrix: CostMatrix,
}

/// On-disk shape of a problem, before the costs are validated.
#[derive(Debug, Deserialize)]
struct ProblemFile {
    name: String,
    locations: Vec<String>,
    costs: Vec<Vec<Option<f64>>>,
}

impl TryFrom<ProblemFile> for Problem {
    type Error = Error;

    fn try_from(file: ProblemFile) -> Result<Self> {
        let matrix = CostMatrix::from_rows(&file.costs)?;
        Problem::new(file.name, file.locations, matrix)
    }
}

impl Problem {
    /// Create a new problem, checking that every matrix row has a name.
    pub fn new(name: String, locations: Vec<String>, matrix: CostMatrix) -> Result<Self> {
        if locations.len() != matrix.n() {
            return Err(Error::invalid_matrix(format!(
                "{} location names for a {}x{} matrix",
                locations.len(),
                matrix.n(),
                matrix.n()
            )));
        }

        Ok(Problem {
            name,
            locations,
            matrix,
        })
    }

    /// Create a problem whose locations are named by their index.
    pub fn unnamed(name: String, matrix: CostMatrix) -> Self {
        let locations = (0..matrix.n()).map(|i| i.to_string()).collect();
        Problem {
            name,
            locations,
            matrix,
        }
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.matrix.n()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Load a problem from a JSON file.
    ///
    /// Expected shape: `{"name": ..., "locations": [...], "costs": [[...], ...]}`
    /// with `null` for pairs that have no route.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let raw: ProblemFile = serde_json::from_reader(BufReader::new(file))?;
        Problem::try_from(raw)
    }

    /// Parse a problem from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: ProblemFile = serde_json::from_str(json)?;
        Problem::try_from(raw)
    }
}
