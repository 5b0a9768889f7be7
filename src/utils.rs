//! Reporting helpers for optimized routes.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::formulation::FormulationStats;
use crate::matrix::CostMatrix;
use crate::output::LabeledRoute;
use crate::solver::SolveStatus;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Render a route as `A -> B -> C -> A`.
pub fn format_route<L: std::fmt::Display>(route: &LabeledRoute<L>) -> String {
    let mut text = route
        .stops
        .iter()
        .map(|stop| stop.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    if let Some(first) = route.stops.first() {
        text.push_str(&format!(" -> {}", first));
    }
    text
}

/// Save a route report to a file.
pub fn save_route<L: std::fmt::Display, P: AsRef<Path>>(
    route: &LabeledRoute<L>,
    matrix: &CostMatrix,
    name: &str,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "Route for instance: {}", name)?;
    writeln!(file, "Total Cost: {:.2}", route.total_cost)?;
    writeln!(file, "Proven Optimal: {}", route.proven_optimal)?;
    writeln!(file, "Stops: {}", route.stops.len())?;
    writeln!(file)?;
    writeln!(file, "{}", format_route(route))?;
    writeln!(file)?;

    for (k, (from, to, cost)) in route.closed_legs(matrix).enumerate() {
        writeln!(file, "Leg #{}: {} -> {} ({:.2})", k + 1, from, to, cost)?;
    }

    Ok(())
}

/// Timings and model size of one optimization run.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    pub formulation: FormulationStats,
    pub solver: String,
    pub status: Option<SolveStatus>,
    pub build_time: Duration,
    pub solve_time: Duration,
    pub extract_time: Duration,
    pub total_cost: Option<f64>,
}

impl RunStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "not solved".to_string());
        let cost = self
            .total_cost
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Run Statistics:
- Locations: {}
- Edge Variables: {} ({} excluded)
- Constraints: {} degree, {} MTZ
- Solver: {} ({})
- Build Time: {:?}
- Solve Time: {}
- Extract Time: {:?}
- Total Cost: {}",
            self.formulation.locations,
            self.formulation.edge_variables,
            self.formulation.excluded_edges,
            self.formulation.degree_constraints,
            self.formulation.mtz_constraints,
            self.solver,
            status,
            self.build_time,
            format_duration(self.solve_time),
            self.extract_time,
            cost
        )
    }
}
